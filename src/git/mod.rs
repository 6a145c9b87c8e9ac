pub mod parse;
pub mod runner;
pub mod types;

pub use runner::{CommandOutput, CommandRunner, Invocation, SystemRunner};
pub use types::*;
