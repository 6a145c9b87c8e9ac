//! Human-readable and JSON rendering of check results.

use crate::check::{Aborted, Outcome, Severity, StageReport};
use color_eyre::eyre::Result;
use serde::Serialize;
use std::fmt::Write;

pub fn render_stage(report: &StageReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", report.stage.title());
    for finding in &report.findings {
        let _ = writeln!(out, "{} {}", finding.severity.symbol(), finding.message);
        for detail in &finding.details {
            let _ = writeln!(out, "    {detail}");
        }
    }
    out.push('\n');
    out
}

pub fn render_abort(aborted: &Aborted) -> String {
    format!("❌ Aborted during {}: {}", aborted.stage.title(), aborted.error)
}

pub fn render_summary(outcome: &Outcome, strict: bool) -> String {
    if let Some(aborted) = &outcome.aborted {
        return format!(
            "❌ Health check aborted during {}; do not push until it passes.",
            aborted.stage.title()
        );
    }

    let warnings = outcome.count(Severity::Warning);
    let failures = outcome.count(Severity::Failure);

    match (failures, warnings) {
        (0, 0) => "✅ All checks passed. Safe to push.".to_string(),
        (0, w) => format!("✅ Safe to push ({w} warning(s) above)."),
        (f, w) if strict => {
            format!("❌ {f} check(s) failed, {w} warning(s); push blocked (strict mode).")
        }
        (f, w) => format!("⚠️ {f} check(s) failed, {w} warning(s); review before pushing."),
    }
}

pub fn render_text(outcome: &Outcome, strict: bool) -> String {
    let mut out: String = outcome.reports.iter().map(render_stage).collect();
    if let Some(aborted) = &outcome.aborted {
        out.push_str(&render_abort(aborted));
        out.push('\n');
    }
    out.push_str(&render_summary(outcome, strict));
    out.push('\n');
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    stages: &'a [StageReport],
    observations: &'a crate::check::Observations,
    #[serde(skip_serializing_if = "Option::is_none")]
    aborted: Option<&'a Aborted>,
    exit_code: u8,
}

pub fn render_json(outcome: &Outcome, exit_code: u8) -> Result<String> {
    let report = JsonReport {
        stages: &outcome.reports,
        observations: &outcome.observations,
        aborted: outcome.aborted.as_ref(),
        exit_code,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
