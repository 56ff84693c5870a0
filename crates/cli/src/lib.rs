//! fedshare CLI library
//!
//! The binary is a thin wrapper: it parses [`cli::Cli`], initialises
//! [`tracing`](crate::tracing), loads the [`commands::Workspace`] and prints
//! whatever the command returns.

pub mod cli;
pub mod commands;
pub mod tracing;

pub use cli::{CliError, EXIT_CLI, EXIT_OK, EXIT_RESOLVE, exit_code_for, render_error};
