//! CLI layer: argument parsing, command dispatch and the interactive shell

pub mod args;
pub mod commands;
pub mod error;
pub mod output;
pub mod render;
pub mod shell;

pub use args::{ClmCommand, Cli, Commands};
pub use commands::{execute_command, run_clm};
pub use error::{CliError, CliResult};
