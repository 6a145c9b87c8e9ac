//! The pre-push check pipeline.
//!
//! Stages run strictly in [`Stage::ALL`] order. Each stage turns external tool
//! output into a typed observation and a [`StageReport`]; printing is left to
//! [`crate::report`]. A stage returning `Err` aborts the run, everything else is
//! recorded as findings.

pub mod branch;
pub mod lfs;
pub mod remotes;
pub mod signature;
pub mod staged;
pub mod version;

use crate::git::{BranchStatus, CommandRunner, SignatureStatus, StagedDelta};
use color_eyre::eyre::Result;
use log::{error, info};
use serde::Serialize;

pub use lfs::LfsStatus;
pub use remotes::{ProbeOutcome, RemoteProbe};

pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_STAGED_LINE_THRESHOLD: u64 = 100_000;
pub const DEFAULT_EVIDENCE_LINES: usize = 3;
pub const DEFAULT_SSH_DIAGNOSTIC_LINES: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Info,
    Warning,
    Failure,
}

impl Severity {
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Ok => "✅",
            Severity::Info => "ℹ️",
            Severity::Warning => "⚠️",
            Severity::Failure => "❌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl Finding {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(Severity::Ok, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(Severity::Failure, message)
    }

    pub fn with_details<I, S>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.details.extend(details.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Version,
    Branch,
    Remotes,
    LargeFiles,
    Signature,
    StagedSize,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Version,
        Stage::Branch,
        Stage::Remotes,
        Stage::LargeFiles,
        Stage::Signature,
        Stage::StagedSize,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Stage::Version => "Git version",
            Stage::Branch => "Branch / upstream",
            Stage::Remotes => "Remotes / authentication",
            Stage::LargeFiles => "Git LFS",
            Stage::Signature => "Commit signature",
            Stage::StagedSize => "Staged changes",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub findings: Vec<Finding>,
}

impl StageReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            findings: Vec::new(),
        }
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    pub fn worst(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }
}

/// Resolved run options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub default_remote: String,
    pub fetch: bool,
    pub strict: bool,
    pub staged_line_threshold: u64,
    pub evidence_lines: usize,
    pub ssh_diagnostic_lines: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_remote: DEFAULT_REMOTE.to_string(),
            fetch: true,
            strict: false,
            staged_line_threshold: DEFAULT_STAGED_LINE_THRESHOLD,
            evidence_lines: DEFAULT_EVIDENCE_LINES,
            ssh_diagnostic_lines: DEFAULT_SSH_DIAGNOSTIC_LINES,
        }
    }
}

/// Typed results of the stages that completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Observations {
    pub version: Option<String>,
    pub branch: Option<BranchStatus>,
    pub remotes: Vec<RemoteProbe>,
    pub lfs: Option<LfsStatus>,
    pub signature: Option<SignatureStatus>,
    pub staged: Option<StagedDelta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aborted {
    pub stage: Stage,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub reports: Vec<StageReport>,
    pub observations: Observations,
    pub aborted: Option<Aborted>,
}

impl Outcome {
    pub fn count(&self, severity: Severity) -> usize {
        self.reports.iter().map(|r| r.count(severity)).sum()
    }

    /// 1 when a stage aborted, or in strict mode when any check failed.
    pub fn exit_code(&self, strict: bool) -> u8 {
        if self.aborted.is_some() || (strict && self.count(Severity::Failure) > 0) {
            1
        } else {
            0
        }
    }
}

pub struct HealthCheck<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    settings: &'a Settings,
}

impl<'a, R: CommandRunner + ?Sized> HealthCheck<'a, R> {
    pub fn new(runner: &'a R, settings: &'a Settings) -> Self {
        Self { runner, settings }
    }

    pub fn run(&self) -> Outcome {
        self.run_with(&mut |_| {})
    }

    /// Runs every stage, handing each report to `on_report` as soon as it is ready.
    pub fn run_with(&self, on_report: &mut dyn FnMut(&StageReport)) -> Outcome {
        let mut outcome = Outcome::default();

        for stage in Stage::ALL {
            info!("Running stage: {stage}");
            match self.run_stage(stage, &mut outcome.observations) {
                Ok(report) => {
                    on_report(&report);
                    outcome.reports.push(report);
                }
                Err(e) => {
                    error!("Stage '{stage}' aborted the health check: {e:?}");
                    outcome.aborted = Some(Aborted {
                        stage,
                        error: e
                            .chain()
                            .map(|cause| cause.to_string())
                            .collect::<Vec<_>>()
                            .join(": "),
                    });
                    break;
                }
            }
        }

        outcome
    }

    fn run_stage(&self, stage: Stage, observations: &mut Observations) -> Result<StageReport> {
        let runner = self.runner;
        let settings = self.settings;

        let report = match stage {
            Stage::Version => {
                let version = version::probe(runner)?;
                let report = version::report(&version);
                observations.version = Some(version);
                report
            }
            Stage::Branch => {
                let inspection = branch::inspect(runner, settings)?;
                let report = branch::report(&inspection);
                observations.branch = Some(inspection.status);
                report
            }
            Stage::Remotes => {
                let probes = remotes::probe_all(runner, settings)?;
                let report = remotes::report(&probes);
                observations.remotes = probes;
                report
            }
            Stage::LargeFiles => {
                let status = lfs::audit(runner);
                let report = lfs::report(&status);
                observations.lfs = Some(status);
                report
            }
            Stage::Signature => {
                let audit = signature::audit(runner, settings);
                let report = signature::report(&audit);
                observations.signature = Some(audit.status);
                report
            }
            Stage::StagedSize => {
                let audit = staged::audit(runner);
                let report = staged::report(&audit, settings.staged_line_threshold);
                if let staged::StagedAudit::Measured(delta) = audit {
                    observations.staged = Some(delta);
                }
                report
            }
        };

        Ok(report)
    }
}
