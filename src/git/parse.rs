//! Pure classifiers over the text printed by `git`, `git-lfs` and `gpg`.
//!
//! Nothing in here spawns a process; every function is tested against fixture
//! strings.

use super::types::{SignatureState, StagedDelta, Transport};
use color_eyre::eyre::{Result, eyre};

/// Prefixes removed, in order, before the host is cut out of a remote URL.
const HOST_PREFIXES: &[&str] = &["ssh://", "git@", "https://", "http://"];

/// Marker `git lfs env` prints once the clean filter has been installed.
pub const LFS_FILTER_KEY: &str = "filter.lfs.clean";
pub const LFS_FILTER_VALUE: &str = "git-lfs clean";

const BAD_SIGNATURE_PATTERNS: &[&str] = &["BAD signature", "Bad signature", "BADSIG"];
const EXPIRED_KEY_PATTERNS: &[&str] = &[
    "EXPKEYSIG",
    "expired key",
    "Expired key",
    "key has expired",
    "[expired]",
];
const GOOD_SIGNATURE_PATTERNS: &[&str] = &["Good signature", "Good \"git\" signature"];

/// Host part of a remote URL: `git@host:path`, `ssh://git@host[:port]/path`,
/// `http(s)://[user[:token]@]host/path`.
pub fn extract_host(url: &str) -> String {
    let mut rest = url.trim();
    for prefix in HOST_PREFIXES {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped;
        }
    }

    // userinfo only counts when it comes before the path
    if let Some(at) = rest.find('@') {
        let path_start = rest.find('/').unwrap_or(rest.len());
        if at < path_start {
            rest = &rest[at + 1..];
        }
    }

    let end = rest.find([':', '/']).unwrap_or(rest.len());
    rest[..end].to_string()
}

/// Port of an `ssh://` URL, when one is spelled out.
pub fn extract_ssh_port(url: &str) -> Option<u16> {
    let rest = url.trim().strip_prefix("ssh://")?;
    let authority = rest.split('/').next()?;
    let host_port = authority.rsplit('@').next()?;
    let (_, port) = host_port.split_once(':')?;
    port.parse().ok()
}

/// Login user of an SSH remote (`user@host:path` or `ssh://user@host/path`).
pub fn extract_ssh_user(url: &str) -> Option<String> {
    let url = url.trim();
    let rest = url.strip_prefix("ssh://").unwrap_or(url);
    let authority = rest.split('/').next()?;
    let (user, _) = authority.split_once('@')?;
    (!user.is_empty()).then(|| user.to_string())
}

pub fn classify_transport(url: &str) -> Transport {
    let url = url.trim();
    if url.starts_with("git@") || url.starts_with("ssh://") {
        Transport::Ssh
    } else if url.starts_with("https://") || url.starts_with("http://") {
        Transport::Https
    } else {
        Transport::Unknown
    }
}

/// Classifies signature-verification output of the latest commit.
///
/// | pattern                                        | state     |
/// |------------------------------------------------|-----------|
/// | `BAD signature`, `Bad signature`, `BADSIG`     | `Bad`     |
/// | `EXPKEYSIG`, `expired key`, `key has expired`  | `Expired` |
/// | `Good signature`, `Good "git" signature`       | `Good`    |
/// | any other mention of `signature` or `gpg:`     | `Unclear` |
/// | nothing                                        | `Absent`  |
///
/// Bad and expired are tested first: gpg reports a good signature made by an
/// expired key as `Good signature ... [expired]`.
pub fn classify_signature(output: &str) -> SignatureState {
    let contains_any = |patterns: &[&str]| patterns.iter().any(|p| output.contains(p));

    if contains_any(BAD_SIGNATURE_PATTERNS) {
        SignatureState::Bad
    } else if contains_any(EXPIRED_KEY_PATTERNS) {
        SignatureState::Expired
    } else if contains_any(GOOD_SIGNATURE_PATTERNS) {
        SignatureState::Good
    } else if output.to_lowercase().contains("signature") || output.contains("gpg:") {
        SignatureState::Unclear
    } else {
        SignatureState::Absent
    }
}

/// The line naming the signing key, with any `gpg:` prefix removed.
pub fn signature_key_info(output: &str) -> Option<String> {
    let clean = |line: &str| line.trim().trim_start_matches("gpg:").trim().to_string();
    let lines: Vec<&str> = output.lines().collect();

    lines
        .iter()
        .find(|line| line.contains("using") && line.contains("key"))
        .or_else(|| lines.iter().find(|line| line.contains(" key ")))
        .map(|line| clean(line))
}

/// Sums `git diff --numstat` rows. Binary files (`-\t-\tpath`) and any other
/// non-numeric column count as zero.
pub fn parse_numstat(output: &str) -> StagedDelta {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .fold(StagedDelta::default(), |mut delta, line| {
            let mut columns = line.split('\t');
            let added = columns.next().and_then(|c| c.trim().parse::<u64>().ok());
            let deleted = columns.next().and_then(|c| c.trim().parse::<u64>().ok());
            delta.added += added.unwrap_or(0);
            delta.deleted += deleted.unwrap_or(0);
            delta
        })
}

/// Parses `git rev-list --left-right --count <upstream>...HEAD`, whose left
/// column counts upstream-only commits. Returns `(ahead, behind)`.
pub fn parse_ahead_behind(output: &str) -> Result<(usize, usize)> {
    let mut fields = output.split_whitespace();
    let behind = fields.next().and_then(|f| f.parse::<usize>().ok());
    let ahead = fields.next().and_then(|f| f.parse::<usize>().ok());

    match (ahead, behind) {
        (Some(ahead), Some(behind)) => Ok((ahead, behind)),
        _ => Err(eyre!(
            "unexpected ahead/behind output: {:?}",
            output.trim()
        )),
    }
}

/// Whether `git status --short --branch` lists anything besides the `##` header.
pub fn status_is_dirty(output: &str) -> bool {
    status_entries(output).next().is_some()
}

pub fn status_entries(output: &str) -> impl Iterator<Item = &str> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with("##"))
}

pub fn lfs_initialized(env_output: &str) -> bool {
    env_output
        .lines()
        .any(|line| line.contains(LFS_FILTER_KEY) && line.contains(LFS_FILTER_VALUE))
}

/// First `Endpoint=...` line of `git lfs env`.
pub fn lfs_endpoint(env_output: &str) -> Option<String> {
    env_output
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("Endpoint") && line.contains('='))
        .map(str::to_string)
}

pub fn count_lines(output: &str) -> usize {
    output.lines().filter(|line| !line.trim().is_empty()).count()
}

/// Up to `limit` meaningful lines of verification output, skipping the bare
/// commit hash printed by `--format=%H`.
pub fn evidence(output: &str, limit: usize) -> Vec<String> {
    output
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty() && !is_object_id(line.trim()))
        .take(limit)
        .map(str::to_string)
        .collect()
}

fn is_object_id(s: &str) -> bool {
    (s.len() == 40 || s.len() == 64) && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Interprets a git boolean config value.
pub fn config_bool(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_lowercase()).as_deref(),
        Some("true" | "yes" | "on" | "1")
    )
}
