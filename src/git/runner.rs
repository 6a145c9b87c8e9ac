//! External process execution.
//!
//! Every check talks to `git`, `git-lfs` and `ssh` through [`CommandRunner`] so
//! the pipeline can be driven by canned output in tests.

use color_eyre::eyre::{Result, WrapErr, eyre};
use log::debug;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

/// A single external command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            envs: Vec::new(),
        }
    }

    pub fn git<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("git", args)
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    /// The command line without environment, used as a lookup key and in messages.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                line.push('\'');
                line.push_str(arg);
                line.push('\'');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: &str) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: &str) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout followed by stderr, for tools that split their report across both.
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr.trim_end()),
            (false, true) => self.stdout.clone(),
            (true, _) => self.stderr.clone(),
        }
    }
}

pub trait CommandRunner {
    /// Runs the command to completion. Errors only when the process could not be
    /// started; a non-zero exit is reported through [`CommandOutput::code`].
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;

    /// Looks a program up on the execution path.
    fn find_program(&self, name: &str) -> Option<PathBuf>;

    /// Runs a command whose failure must abort the whole health check.
    fn run_checked(&self, invocation: &Invocation) -> Result<String> {
        let output = self.run(invocation)?;
        if output.is_success() {
            return Ok(output.stdout);
        }

        let code = output
            .code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        let stderr = output.stderr.trim();
        if stderr.is_empty() {
            Err(eyre!("`{invocation}` failed (exit {code})"))
        } else {
            Err(eyre!("`{invocation}` failed (exit {code}): {stderr}"))
        }
    }

    /// Runs a command and returns its trimmed stdout only when it succeeded with output.
    fn run_optional(&self, invocation: &Invocation) -> Option<String> {
        match self.run(invocation) {
            Ok(output) if output.is_success() => {
                let value = output.stdout.trim();
                if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            Ok(_) => None,
            Err(e) => {
                debug!("Could not run `{invocation}`: {e}");
                None
            }
        }
    }
}

/// Runs real processes inside a repository directory.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    workdir: PathBuf,
}

impl SystemRunner {
    pub fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        debug!("Running: {invocation}");

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&self.workdir)
            .output()
            .wrap_err_with(|| format!("could not start `{invocation}`"))?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        debug!("`{invocation}` exited with {:?}", result.code);
        Ok(result)
    }

    fn find_program(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }
}
