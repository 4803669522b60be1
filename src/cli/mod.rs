//! CLI shell around the registry workflows
//!
//! The shell collects field values from arguments, invokes the three
//! workflow entry points and surfaces the outcome as process exit status.
//! It contains no business rules of its own.

mod args;
mod commands;
pub mod errors;

pub use args::{Cli, Command};
pub use commands::run;
pub use errors::{CliError, CliResult};
