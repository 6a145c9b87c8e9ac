// Library interface for healthcheck (pre-push repository health check)
// This exposes modules for integration testing

pub mod check;
pub mod config;
pub mod git;
pub mod logging;
pub mod report;

// Re-export commonly used types for easier testing
pub use check::{HealthCheck, Outcome, Settings, Severity, Stage, StageReport};
pub use git::{CommandOutput, CommandRunner, Invocation, SystemRunner};
