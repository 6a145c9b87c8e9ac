use super::{Finding, Settings, Stage, StageReport};
use crate::git::parse::{classify_signature, config_bool, evidence, signature_key_info};
use crate::git::{CommandRunner, Invocation, SignatureState, SignatureStatus};
use log::debug;

/// Local signing configuration, only gathered for unsigned commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningConfig {
    pub gpgsign: bool,
    pub signing_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureAudit {
    pub status: SignatureStatus,
    pub evidence: Vec<String>,
    pub signing: Option<SigningConfig>,
}

impl SignatureAudit {
    fn terminal(state: SignatureState) -> Self {
        Self {
            status: SignatureStatus::from_state(state, None),
            evidence: Vec::new(),
            signing: None,
        }
    }
}

pub fn audit<R: CommandRunner + ?Sized>(runner: &R, settings: &Settings) -> SignatureAudit {
    let has_history = runner
        .run(&Invocation::git(["rev-parse", "--verify", "-q", "HEAD"]))
        .map(|output| output.is_success())
        .unwrap_or(false);
    if !has_history {
        return SignatureAudit::terminal(SignatureState::NoHistory);
    }

    let output = match runner.run(&Invocation::git([
        "log",
        "-1",
        "--show-signature",
        "--format=%H",
    ])) {
        Ok(output) if output.is_success() => output.combined(),
        Ok(output) => {
            debug!("Signature verification failed: {}", output.stderr.trim());
            return SignatureAudit::terminal(SignatureState::Unknown);
        }
        Err(e) => {
            debug!("Signature verification could not run: {e}");
            return SignatureAudit::terminal(SignatureState::Unknown);
        }
    };

    if output.trim().is_empty() {
        return SignatureAudit::terminal(SignatureState::Unknown);
    }

    let state = classify_signature(&output);
    debug!("Latest commit signature state: {state:?}");

    let signing = (state == SignatureState::Absent).then(|| SigningConfig {
        gpgsign: config_bool(
            runner
                .run_optional(&Invocation::git(["config", "--get", "commit.gpgsign"]))
                .as_deref(),
        ),
        signing_key: runner.run_optional(&Invocation::git(["config", "--get", "user.signingkey"])),
    });

    let key_info = match state {
        SignatureState::Absent => None,
        _ => signature_key_info(&output),
    };

    SignatureAudit {
        status: SignatureStatus::from_state(state, key_info),
        evidence: match state {
            SignatureState::Absent => Vec::new(),
            _ => evidence(&output, settings.evidence_lines),
        },
        signing,
    }
}

pub fn report(audit: &SignatureAudit) -> StageReport {
    let mut report = StageReport::new(Stage::Signature);
    let evidence = audit.evidence.iter().cloned();

    match audit.status.state {
        SignatureState::NoHistory => {
            report.push(Finding::info("No commits yet; signature check skipped"));
        }
        SignatureState::Unknown => {
            report.push(Finding::info(
                "Signature verification output unavailable for the latest commit",
            ));
        }
        SignatureState::Good => {
            report.push(Finding::ok("Latest commit has a good signature").with_details(evidence));
        }
        SignatureState::Bad => {
            report.push(
                Finding::warning("Latest commit has a BAD signature").with_details(evidence),
            );
        }
        SignatureState::Expired => {
            report.push(
                Finding::warning("Latest commit is signed with an expired key")
                    .with_details(evidence),
            );
        }
        SignatureState::Unclear => {
            report.push(
                Finding::info("Latest commit carries a signature with an unclear status")
                    .with_details(evidence),
            );
        }
        SignatureState::Absent => {
            report.push(Finding::warning("Latest commit is not signed"));
            if let Some(signing) = &audit.signing {
                push_signing_advice(&mut report, signing);
            }
        }
    }

    report
}

fn push_signing_advice(report: &mut StageReport, signing: &SigningConfig) {
    if signing.gpgsign {
        report.push(Finding::info(
            "commit.gpgsign is enabled but this commit is unsigned; check whether it was \
             made with --no-gpg-sign or by a tool that bypasses signing",
        ));
    } else {
        report.push(
            Finding::info("Commit signing is disabled. To enable it:").with_details([
                "1. Create or import a signing key (e.g. gpg --full-generate-key)",
                "2. git config user.signingkey <key-id>",
                "3. git config commit.gpgsign true",
            ]),
        );
    }

    if let Some(key) = &signing.signing_key {
        report.push(Finding::info(format!("user.signingkey is set to {key}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Severity;

    fn audit_for(state: SignatureState, signing: Option<SigningConfig>) -> SignatureAudit {
        SignatureAudit {
            status: SignatureStatus::from_state(state, None),
            evidence: vec!["gpg: line".to_string()],
            signing,
        }
    }

    #[test]
    fn test_report_severity_per_state() {
        let cases = [
            (SignatureState::NoHistory, Severity::Info),
            (SignatureState::Unknown, Severity::Info),
            (SignatureState::Good, Severity::Ok),
            (SignatureState::Bad, Severity::Warning),
            (SignatureState::Expired, Severity::Warning),
            (SignatureState::Unclear, Severity::Info),
            (SignatureState::Absent, Severity::Warning),
        ];

        for (state, severity) in cases {
            let report = report(&audit_for(state, None));
            assert_eq!(report.findings[0].severity, severity, "state: {state:?}");
        }
    }

    #[test]
    fn test_good_signature_shows_evidence() {
        let report = report(&audit_for(SignatureState::Good, None));
        assert_eq!(report.findings[0].details, vec!["gpg: line"]);
    }

    #[test]
    fn test_absent_with_signing_disabled_prints_setup_steps() {
        let report = report(&audit_for(
            SignatureState::Absent,
            Some(SigningConfig {
                gpgsign: false,
                signing_key: None,
            }),
        ));

        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.findings[1].details.len(), 3);
        assert!(report.findings[1].details[2].contains("commit.gpgsign true"));
    }

    #[test]
    fn test_absent_with_signing_enabled_suggests_investigation() {
        let report = report(&audit_for(
            SignatureState::Absent,
            Some(SigningConfig {
                gpgsign: true,
                signing_key: Some("ABCDEF01".to_string()),
            }),
        ));

        assert!(report.findings[1].message.contains("commit.gpgsign is enabled"));
        assert_eq!(report.findings[2].message, "user.signingkey is set to ABCDEF01");
    }

    #[test]
    fn test_status_flags() {
        let good = SignatureStatus::from_state(SignatureState::Good, None);
        assert!(good.present);
        assert_eq!(good.valid, Some(true));

        let expired = SignatureStatus::from_state(SignatureState::Expired, None);
        assert_eq!(expired.valid, Some(false));

        let absent = SignatureStatus::from_state(SignatureState::Absent, None);
        assert!(!absent.present);
    }
}
