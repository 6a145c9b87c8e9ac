use super::{Finding, Stage, StageReport};
use crate::git::parse::{count_lines, lfs_endpoint, lfs_initialized};
use crate::git::{CommandRunner, Invocation};
use log::debug;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LfsStatus {
    NotInstalled,
    EnvUnavailable {
        reason: String,
    },
    NotInitialized,
    Ready {
        endpoint: Option<String>,
        tracked_files: Option<usize>,
    },
}

/// Never fails the run: every problem becomes a status.
pub fn audit<R: CommandRunner + ?Sized>(runner: &R) -> LfsStatus {
    let Some(path) = runner.find_program("git-lfs") else {
        return LfsStatus::NotInstalled;
    };
    debug!("git-lfs found at {path:?}");

    let env = match runner.run(&Invocation::git(["lfs", "env"])) {
        Ok(output) if output.is_success() => output.combined(),
        Ok(output) => {
            return LfsStatus::EnvUnavailable {
                reason: output.stderr.trim().to_string(),
            };
        }
        Err(e) => {
            return LfsStatus::EnvUnavailable {
                reason: e.to_string(),
            };
        }
    };

    if !lfs_initialized(&env) {
        return LfsStatus::NotInitialized;
    }

    let tracked_files = match runner.run(&Invocation::git(["lfs", "ls-files"])) {
        Ok(output) if output.is_success() => Some(count_lines(&output.stdout)),
        _ => None,
    };

    LfsStatus::Ready {
        endpoint: lfs_endpoint(&env),
        tracked_files,
    }
}

pub fn report(status: &LfsStatus) -> StageReport {
    let mut report = StageReport::new(Stage::LargeFiles);

    match status {
        LfsStatus::NotInstalled => {
            report.push(
                Finding::warning("git-lfs is not installed; large-file checks skipped")
                    .with_details([
                        "Install it from https://git-lfs.com, then run: git lfs install",
                    ]),
            );
        }
        LfsStatus::EnvUnavailable { reason } => {
            report.push(
                Finding::warning("git-lfs is installed but `git lfs env` failed")
                    .with_details(Some(reason.clone()).filter(|r| !r.is_empty())),
            );
        }
        LfsStatus::NotInitialized => {
            report.push(
                Finding::warning("git-lfs is installed but not initialized")
                    .with_details([
                        "Run: git lfs install",
                        "Then track patterns with: git lfs track \"*.bin\"",
                    ]),
            );
        }
        LfsStatus::Ready {
            endpoint,
            tracked_files,
        } => {
            report.push(Finding::ok("git-lfs installed and initialized"));

            match endpoint {
                Some(endpoint) => report.push(Finding::ok(format!("LFS {endpoint}"))),
                None => report.push(Finding::info(
                    "No LFS endpoint configured; the main remote URL will be used",
                )),
            }

            match tracked_files {
                Some(0) => report.push(Finding::info("No files tracked by LFS")),
                Some(count) => report.push(Finding::ok(format!("{count} file(s) tracked by LFS"))),
                None => report.push(Finding::warning("Could not list LFS-tracked files")),
            }
        }
    }

    report
}
