//! fedshare CLI Application
//!
//! Resolves the shared-dependency configuration of a federated project and
//! prints it for the bundler integration.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

use fedshare::cli::{self, Cli, CliError, EXIT_OK, exit_code_for, render_error};
use fedshare::commands::{self, Workspace};
use fedshare::tracing::{TracingConfig, init_tracing};
use std::io::{self, Write};

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic, so we use the most reliable output method.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();

    let tracing_config = TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
    };
    if let Err(error) = init_tracing(tracing_config) {
        eprintln!("{error:?}");
    }

    let exit_code = match run(&cli) {
        Ok(()) => EXIT_OK,
        Err(error) => {
            let code = exit_code_for(&error);
            render_error(error);
            code
        }
    };
    std::process::exit(exit_code);
}

#[tracing::instrument(name = "fedshare", skip_all)]
fn run(cli: &Cli) -> Result<(), CliError> {
    let workspace = Workspace::load(&cli.workspace_root, &cli.graph, cli.tsconfig.as_deref())?;
    let output = commands::execute(&workspace, &cli.command)?;

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| CliError::other(format!("Failed to write output: {e}")))
}
