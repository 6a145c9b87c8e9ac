use super::{Finding, Stage, StageReport};
use crate::git::{CommandRunner, Invocation};
use color_eyre::eyre::{Result, WrapErr};

/// `git --version`. A missing `git` is fatal for the whole run.
pub fn probe<R: CommandRunner + ?Sized>(runner: &R) -> Result<String> {
    let output = runner
        .run_checked(&Invocation::git(["--version"]))
        .wrap_err("git is required but could not be run")?;
    Ok(output.trim().to_string())
}

pub fn report(version: &str) -> StageReport {
    let mut report = StageReport::new(Stage::Version);
    report.push(Finding::ok(version));
    report
}
