use crate::check::{
    DEFAULT_EVIDENCE_LINES, DEFAULT_REMOTE, DEFAULT_SSH_DIAGNOSTIC_LINES,
    DEFAULT_STAGED_LINE_THRESHOLD, Settings,
};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub debug: Option<bool>,
    pub default_remote: Option<String>,
    pub fetch: Option<bool>,
    pub strict: Option<bool>,
    pub staged_line_threshold: Option<u64>,
    pub evidence_lines: Option<usize>,
    pub ssh_diagnostic_lines: Option<usize>,
}

impl Config {
    pub fn load() -> color_eyre::eyre::Result<Self> {
        Self::load_from(&Self::get_config_path())
    }

    pub fn load_from(config_path: &Path) -> color_eyre::eyre::Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            color_eyre::eyre::eyre!("Invalid config file {}: {}", config_path.display(), e)
        })?;
        Ok(config)
    }

    fn get_config_path() -> PathBuf {
        config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("healthcheck")
            .join("config.json")
    }

    pub fn merge_with_args(&self, args: &Args) -> Self {
        Self {
            debug: if args.debug { Some(true) } else { self.debug },
            default_remote: args
                .default_remote
                .clone()
                .or_else(|| self.default_remote.clone()),
            fetch: if args.no_fetch { Some(false) } else { self.fetch },
            strict: if args.strict { Some(true) } else { self.strict },
            staged_line_threshold: self.staged_line_threshold,
            evidence_lines: self.evidence_lines,
            ssh_diagnostic_lines: self.ssh_diagnostic_lines,
        }
    }

    /// Resolves every option to a concrete value.
    pub fn settings(&self) -> Settings {
        Settings {
            default_remote: self
                .default_remote
                .clone()
                .unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
            fetch: self.fetch.unwrap_or(true),
            strict: self.strict.unwrap_or(false),
            staged_line_threshold: self
                .staged_line_threshold
                .unwrap_or(DEFAULT_STAGED_LINE_THRESHOLD),
            evidence_lines: self.evidence_lines.unwrap_or(DEFAULT_EVIDENCE_LINES),
            ssh_diagnostic_lines: self
                .ssh_diagnostic_lines
                .unwrap_or(DEFAULT_SSH_DIAGNOSTIC_LINES),
        }
    }
}

#[derive(Debug, Clone, clap::Parser)]
#[command(name = "healthcheck")]
#[command(about = "Pre-push repository health check")]
pub struct Args {
    #[arg(help = "Remote to fall back to when the branch has none configured (default: origin)")]
    pub default_remote: Option<String>,

    #[arg(short = 'C', long = "repo", help = "Repository directory to inspect")]
    pub repo: Option<PathBuf>,

    #[arg(short, long, help = "Print version information and exit")]
    pub version: bool,

    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    #[arg(long, help = "Skip fetching the upstream remote")]
    pub no_fetch: bool,

    #[arg(long, help = "Exit non-zero when any check fails, not only on aborts")]
    pub strict: bool,

    #[arg(long, help = "Print the report as JSON")]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_settings() {
        let settings = Config::default().settings();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.default_remote, "origin");
        assert_eq!(settings.staged_line_threshold, 100_000);
        assert!(settings.fetch);
        assert!(!settings.strict);
    }

    #[test]
    fn test_args_parsing_minimal() {
        let args = Args::parse_from(["healthcheck"]);

        assert!(args.default_remote.is_none());
        assert!(args.repo.is_none());
        assert!(!args.debug);
        assert!(!args.no_fetch);
        assert!(!args.strict);
        assert!(!args.json);
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from([
            "healthcheck",
            "upstream",
            "-C",
            "/work/repo",
            "--debug",
            "--no-fetch",
            "--strict",
            "--json",
        ]);

        assert_eq!(args.default_remote.as_deref(), Some("upstream"));
        assert_eq!(args.repo, Some(PathBuf::from("/work/repo")));
        assert!(args.debug);
        assert!(args.no_fetch);
        assert!(args.strict);
        assert!(args.json);
    }

    #[test]
    fn test_merge_with_args() {
        let config = Config {
            default_remote: Some("github".to_string()),
            fetch: Some(true),
            staged_line_threshold: Some(5_000),
            ..Default::default()
        };

        let args = Args::parse_from(["healthcheck", "--no-fetch", "--strict"]);
        let settings = config.merge_with_args(&args).settings();

        assert_eq!(settings.default_remote, "github"); // From config
        assert!(!settings.fetch); // CLI takes precedence
        assert!(settings.strict); // From args
        assert_eq!(settings.staged_line_threshold, 5_000); // From config
    }

    #[test]
    fn test_positional_remote_overrides_config() {
        let config = Config {
            default_remote: Some("github".to_string()),
            ..Default::default()
        };
        let args = Args::parse_from(["healthcheck", "gitlab"]);
        assert_eq!(config.merge_with_args(&args).settings().default_remote, "gitlab");
    }

    #[test]
    fn test_config_deserialize_partial() {
        let json = r#"{"strict": true, "evidence_lines": 5}"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.strict, Some(true));
        assert_eq!(config.evidence_lines, Some(5));
        assert_eq!(config.debug, None);
        assert_eq!(config.settings().ssh_diagnostic_lines, 15);
    }

    #[test]
    fn test_load_from_missing_and_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());

        fs::write(&path, r#"{"default_remote": "upstream"}"#).unwrap();
        assert_eq!(
            Config::load_from(&path).unwrap().default_remote.as_deref(),
            Some("upstream")
        );
    }
}
