use super::{Finding, Stage, StageReport};
use crate::git::parse::parse_numstat;
use crate::git::{CommandRunner, Invocation, StagedDelta};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedAudit {
    Measured(StagedDelta),
    Unavailable(String),
}

pub fn audit<R: CommandRunner + ?Sized>(runner: &R) -> StagedAudit {
    match runner.run(&Invocation::git(["diff", "--cached", "--numstat"])) {
        Ok(output) if output.is_success() => StagedAudit::Measured(parse_numstat(&output.stdout)),
        Ok(output) => StagedAudit::Unavailable(output.stderr.trim().to_string()),
        Err(e) => StagedAudit::Unavailable(e.to_string()),
    }
}

/// Staged diffs above `threshold` added lines only warn.
pub fn report(audit: &StagedAudit, threshold: u64) -> StageReport {
    let mut report = StageReport::new(Stage::StagedSize);

    let finding = match audit {
        StagedAudit::Unavailable(reason) => Finding::warning("Could not measure staged changes")
            .with_details(Some(reason.clone()).filter(|r| !r.is_empty())),
        StagedAudit::Measured(delta) if delta.added > threshold => Finding::warning(format!(
            "Staged changes are very large: +{} / -{} lines (threshold {threshold})",
            delta.added, delta.deleted
        )),
        StagedAudit::Measured(delta) if delta.is_empty() => Finding::ok("No staged changes"),
        StagedAudit::Measured(delta) => Finding::ok(format!(
            "Staged changes: +{} / -{} lines",
            delta.added, delta.deleted
        )),
    };
    report.push(finding);

    report
}
