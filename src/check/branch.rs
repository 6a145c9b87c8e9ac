use super::{Finding, Settings, Stage, StageReport};
use crate::git::parse::{parse_ahead_behind, status_entries, status_is_dirty};
use crate::git::{BranchStatus, CommandRunner, Invocation};
use color_eyre::eyre::Result;
use log::{debug, warn};

/// Which remote the upstream belongs to, and how it was determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRemote {
    pub name: String,
    pub from_branch_config: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInspection {
    pub status: BranchStatus,
    pub default_remote: String,
    pub remote: Option<UpstreamRemote>,
    pub fetched: bool,
    pub status_lines: Vec<String>,
}

pub fn inspect<R: CommandRunner + ?Sized>(
    runner: &R,
    settings: &Settings,
) -> Result<BranchInspection> {
    let (name, detached) = current_branch(runner)?;
    debug!("Current branch: {name} (detached: {detached})");

    let upstream = if detached {
        None
    } else {
        runner.run_optional(&Invocation::git([
            "rev-parse",
            "--abbrev-ref",
            "--symbolic-full-name",
            "@{u}",
        ]))
    };

    let mut remote = None;
    let mut fetched = false;
    let (mut ahead, mut behind) = (0, 0);

    if let Some(upstream) = &upstream {
        let resolved = match runner.run_optional(&Invocation::git([
            "config".to_string(),
            "--get".to_string(),
            format!("branch.{name}.remote"),
        ])) {
            Some(remote) => UpstreamRemote {
                name: remote,
                from_branch_config: true,
            },
            None => {
                warn!("No remote configured for branch {name}; using {}", settings.default_remote);
                UpstreamRemote {
                    name: settings.default_remote.clone(),
                    from_branch_config: false,
                }
            }
        };

        if settings.fetch {
            runner.run_checked(&Invocation::git(["fetch", resolved.name.as_str()]))?;
            fetched = true;
        }

        let range = format!("{upstream}...HEAD");
        let counts = runner.run_checked(&Invocation::git([
            "rev-list",
            "--left-right",
            "--count",
            range.as_str(),
        ]))?;
        (ahead, behind) = parse_ahead_behind(&counts)?;
        remote = Some(resolved);
    }

    let status_output = runner.run_checked(&Invocation::git(["status", "--short", "--branch"]))?;

    Ok(BranchInspection {
        status: BranchStatus {
            name,
            detached,
            upstream,
            ahead,
            behind,
            dirty: status_is_dirty(&status_output),
        },
        default_remote: settings.default_remote.clone(),
        remote,
        fetched,
        status_lines: status_entries(&status_output)
            .map(str::to_string)
            .collect(),
    })
}

/// Branch name, or the short commit hash when HEAD is detached.
fn current_branch<R: CommandRunner + ?Sized>(runner: &R) -> Result<(String, bool)> {
    let symbolic = Invocation::git(["symbolic-ref", "--short", "-q", "HEAD"]);
    if let Some(name) = runner.run_optional(&symbolic) {
        return Ok((name, false));
    }

    let hash = runner.run_checked(&Invocation::git(["rev-parse", "--short", "HEAD"]))?;
    Ok((hash.trim().to_string(), true))
}

/// The two commands printed when a branch has no upstream.
pub fn upstream_hints(remote: &str, branch: &str) -> [String; 2] {
    [
        format!("git push -u {remote} {branch}"),
        format!("git branch --set-upstream-to={remote}/{branch} {branch}"),
    ]
}

pub fn report(inspection: &BranchInspection) -> StageReport {
    let mut report = StageReport::new(Stage::Branch);
    let status = &inspection.status;

    if status.detached {
        report.push(Finding::info(format!("Detached HEAD at {}", status.name)));
    } else {
        report.push(Finding::ok(format!("Current branch: {}", status.name)));
    }

    match (&status.upstream, &inspection.remote) {
        (Some(upstream), Some(remote)) => {
            report.push(Finding::ok(format!("Upstream: {upstream}")));
            if !remote.from_branch_config {
                report.push(Finding::warning(format!(
                    "Could not resolve the remote of '{}'; using default remote '{}'",
                    status.name, remote.name
                )));
            }
            if inspection.fetched {
                report.push(Finding::ok(format!("Fetched from '{}'", remote.name)));
            } else {
                report.push(Finding::info(format!(
                    "Fetch skipped; comparing against the last known state of '{upstream}'"
                )));
            }
            report.push(Finding::info(format!(
                "Ahead/Behind: {}/{}",
                status.ahead, status.behind
            )));
        }
        _ if status.detached => {
            report.push(Finding::warning(
                "HEAD is detached; no upstream to compare against",
            ));
        }
        _ => {
            report.push(
                Finding::warning(format!(
                    "No upstream configured for '{}'; ahead/behind skipped. Set one with:",
                    status.name
                ))
                .with_details(upstream_hints(&inspection.default_remote, &status.name)),
            );
        }
    }

    if status.dirty {
        report.push(
            Finding::info("Working tree has changes:")
                .with_details(inspection.status_lines.iter().cloned()),
        );
    } else {
        report.push(Finding::ok("Working tree clean"));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Severity;

    fn inspection(upstream: Option<&str>, ahead: usize, behind: usize) -> BranchInspection {
        BranchInspection {
            status: BranchStatus {
                name: "main".to_string(),
                detached: false,
                upstream: upstream.map(str::to_string),
                ahead,
                behind,
                dirty: false,
            },
            default_remote: "origin".to_string(),
            remote: upstream.map(|_| UpstreamRemote {
                name: "origin".to_string(),
                from_branch_config: true,
            }),
            fetched: upstream.is_some(),
            status_lines: vec![],
        }
    }

    #[test]
    fn test_report_in_sync_and_clean() {
        let report = report(&inspection(Some("origin/main"), 0, 0));
        let messages: Vec<_> = report.findings.iter().map(|f| f.message.as_str()).collect();

        assert!(messages.contains(&"Ahead/Behind: 0/0"));
        assert!(messages.contains(&"Working tree clean"));
        assert_eq!(report.worst(), Some(Severity::Info));
    }

    #[test]
    fn test_report_no_upstream_prints_hints() {
        let report = report(&inspection(None, 0, 0));
        let warning = report
            .findings
            .iter()
            .find(|f| f.severity == Severity::Warning)
            .unwrap();

        assert_eq!(
            warning.details,
            vec![
                "git push -u origin main".to_string(),
                "git branch --set-upstream-to=origin/main main".to_string(),
            ]
        );
        assert!(!report.findings.iter().any(|f| f.message.starts_with("Ahead/Behind")));
    }

    #[test]
    fn test_report_fallback_remote_warns() {
        let mut inspection = inspection(Some("origin/main"), 2, 1);
        inspection.remote = Some(UpstreamRemote {
            name: "origin".to_string(),
            from_branch_config: false,
        });

        let report = report(&inspection);
        assert!(report.findings.iter().any(|f| f.severity == Severity::Warning
            && f.message.contains("using default remote 'origin'")));
        assert!(report.findings.iter().any(|f| f.message == "Ahead/Behind: 2/1"));
    }

    #[test]
    fn test_report_dirty_lists_entries() {
        let mut inspection = inspection(Some("origin/main"), 0, 0);
        inspection.status.dirty = true;
        inspection.status_lines = vec![" M src/lib.rs".to_string(), "?? notes.txt".to_string()];

        let report = report(&inspection);
        let dirty = report.findings.last().unwrap();
        assert_eq!(dirty.message, "Working tree has changes:");
        assert_eq!(dirty.details.len(), 2);
    }
}
