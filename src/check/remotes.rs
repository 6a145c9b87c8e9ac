use super::{Finding, Settings, Stage, StageReport};
use crate::git::parse::{extract_ssh_port, extract_ssh_user};
use crate::git::{CommandRunner, Invocation, Remote, Transport};
use color_eyre::eyre::Result;
use log::{debug, warn};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Reachable,
    /// SSH probe failed; `diagnostic` holds the tail of a verbose ssh session.
    SshFailed { diagnostic: Vec<String> },
    /// HTTPS probe failed; `reason` is the first line git printed.
    HttpsFailed { reason: Option<String> },
    UnknownTransport,
    UrlUnavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteProbe {
    pub name: String,
    pub remote: Option<Remote>,
    pub outcome: ProbeOutcome,
}

/// Probes every configured remote. Only failing to list the remotes is fatal;
/// each remote's own failures are recorded and the loop moves on.
pub fn probe_all<R: CommandRunner + ?Sized>(
    runner: &R,
    settings: &Settings,
) -> Result<Vec<RemoteProbe>> {
    let names = runner.run_checked(&Invocation::git(["remote"]))?;

    Ok(names
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| probe_remote(runner, settings, name))
        .collect())
}

fn probe_remote<R: CommandRunner + ?Sized>(
    runner: &R,
    settings: &Settings,
    name: &str,
) -> RemoteProbe {
    let url = match runner.run(&Invocation::git(["remote", "get-url", name])) {
        Ok(output) if output.is_success() && !output.stdout.trim().is_empty() => {
            output.stdout.trim().to_string()
        }
        Ok(output) => {
            return RemoteProbe {
                name: name.to_string(),
                remote: None,
                outcome: ProbeOutcome::UrlUnavailable {
                    reason: output.stderr.trim().to_string(),
                },
            };
        }
        Err(e) => {
            return RemoteProbe {
                name: name.to_string(),
                remote: None,
                outcome: ProbeOutcome::UrlUnavailable {
                    reason: e.to_string(),
                },
            };
        }
    };

    let remote = Remote::from_url(name, &url);
    debug!(
        "Remote {} -> host {} via {}",
        remote.name, remote.host, remote.transport
    );

    let outcome = match remote.transport {
        Transport::Unknown => ProbeOutcome::UnknownTransport,
        Transport::Ssh => match list_heads(runner, name) {
            Ok(()) => ProbeOutcome::Reachable,
            Err(_) => {
                warn!("SSH probe of remote {name} failed");
                ProbeOutcome::SshFailed {
                    diagnostic: ssh_diagnostic(runner, &remote, settings.ssh_diagnostic_lines),
                }
            }
        },
        Transport::Https => match list_heads(runner, name) {
            Ok(()) => ProbeOutcome::Reachable,
            Err(reason) => {
                warn!("HTTPS probe of remote {name} failed");
                ProbeOutcome::HttpsFailed { reason }
            }
        },
    };

    RemoteProbe {
        name: name.to_string(),
        remote: Some(remote),
        outcome,
    }
}

/// `git ls-remote --heads <remote>` with interactive prompts disabled.
/// On failure returns the first line of its error output.
fn list_heads<R: CommandRunner + ?Sized>(runner: &R, name: &str) -> Result<(), Option<String>> {
    let invocation =
        Invocation::git(["ls-remote", "--heads", name]).env("GIT_TERMINAL_PROMPT", "0");

    match runner.run(&invocation) {
        Ok(output) if output.is_success() => Ok(()),
        Ok(output) => Err(output
            .stderr
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)),
        Err(e) => Err(Some(e.to_string())),
    }
}

/// Last `limit` lines of `ssh -vT <user>@<host>`, where the user comes from
/// the remote URL and defaults to `git`.
fn ssh_diagnostic<R: CommandRunner + ?Sized>(
    runner: &R,
    remote: &Remote,
    limit: usize,
) -> Vec<String> {
    let mut args = vec![
        "-vT".to_string(),
        "-o".to_string(),
        "BatchMode=yes".to_string(),
    ];
    if let Some(port) = extract_ssh_port(&remote.url) {
        args.push("-p".to_string());
        args.push(port.to_string());
    }
    let user = extract_ssh_user(&remote.url).unwrap_or_else(|| "git".to_string());
    args.push(format!("{user}@{}", remote.host));

    let text = match runner.run(&Invocation::new("ssh", args)) {
        Ok(output) => output.combined(),
        Err(e) => return vec![format!("could not run ssh: {e}")],
    };

    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(limit);
    lines[start..].iter().map(|l| l.to_string()).collect()
}

pub fn report(probes: &[RemoteProbe]) -> StageReport {
    let mut report = StageReport::new(Stage::Remotes);

    if probes.is_empty() {
        report.push(Finding::warning("No remotes configured"));
        return report;
    }

    for probe in probes {
        let Some(remote) = &probe.remote else {
            if let ProbeOutcome::UrlUnavailable { reason } = &probe.outcome {
                report.push(
                    Finding::failure(format!("{}: could not resolve URL", probe.name))
                        .with_details(Some(reason.clone()).filter(|r| !r.is_empty())),
                );
            }
            continue;
        };

        let label = format!("{} ({}, {})", remote.name, remote.transport, remote.host);
        let finding = match &probe.outcome {
            ProbeOutcome::Reachable => Finding::ok(format!("{label}: reachable")),
            ProbeOutcome::SshFailed { diagnostic } => Finding::failure(format!(
                "{label}: SSH authentication failed; verbose ssh output:"
            ))
            .with_details(diagnostic.iter().cloned()),
            ProbeOutcome::HttpsFailed { reason } => Finding::failure(format!(
                "{label}: unreachable; credentials may be missing or invalid \
                 (check your credential helper or access token)"
            ))
            .with_details(reason.iter().cloned()),
            ProbeOutcome::UnknownTransport => Finding::info(format!(
                "{}: unrecognized transport for {}; probe skipped",
                remote.name, remote.url
            )),
            ProbeOutcome::UrlUnavailable { reason } => {
                Finding::failure(format!("{}: {reason}", remote.name))
            }
        };
        report.push(finding);
    }

    report
}
