use clap::{Parser, Subcommand, ValueEnum};
use miette::{Diagnostic, Report};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Resolution or I/O error exit code
pub const EXIT_RESOLVE: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(fedshare::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },

    /// Resolution failed on workspace inputs (exit code 3)
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(fedshare_core::Error),

    /// Other unexpected error (exit code 3)
    #[error("Unexpected error: {message}")]
    #[diagnostic(code(fedshare::cli::other))]
    Other {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new other error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: None,
        }
    }
}

/// Convert `fedshare_core::Error` to appropriate `CliError` variant.
///
/// Invalid resolver input and unknown `additionalShared` names are user
/// configuration issues (exit code 2); everything else keeps its diagnostic
/// (exit code 3).
impl From<fedshare_core::Error> for CliError {
    fn from(err: fedshare_core::Error) -> Self {
        match err {
            // Extract just the message to avoid "Configuration error: Configuration error:"
            fedshare_core::Error::Configuration { message } => Self::config(message),
            fedshare_core::Error::UnknownAdditionalDependency { .. } => Self::config_with_help(
                err.to_string(),
                "Check your additionalShared configuration and make sure you are including valid workspace projects or npm packages",
            ),
            fedshare_core::Error::Workspace(_) => Self::Resolve(err),
        }
    }
}

impl From<fedshare_workspaces::Error> for CliError {
    fn from(err: fedshare_workspaces::Error) -> Self {
        fedshare_core::Error::from(err).into()
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Resolve(_) | CliError::Other { .. } => EXIT_RESOLVE,
    }
}

/// Render error through miette on stderr
#[allow(clippy::print_stderr)]
pub fn render_error(err: CliError) {
    let report = Report::new(err);
    eprintln!("{report:?}");
    let _ = io::stderr().flush();
}

/// Output format for command results
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ValueEnum, Default)]
pub enum OutputFormat {
    /// JSON output format
    Json,
    /// Plain text format
    #[default]
    Text,
}

/// Resolve shared dependencies for federated module builds.
#[derive(Parser, Debug)]
#[command(name = "fedshare")]
#[command(about = "Resolve shared dependencies for federated module builds")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory.
    #[arg(
        long,
        short = 'w',
        global = true,
        env = "FEDSHARE_WORKSPACE_ROOT",
        default_value = ".",
        help = "Workspace root directory"
    )]
    pub workspace_root: PathBuf,

    /// Project graph snapshot, relative to the workspace root.
    #[arg(
        long,
        global = true,
        default_value = "graph.json",
        help = "Project graph JSON file"
    )]
    pub graph: PathBuf,

    /// File declaring `compilerOptions.paths`.
    #[arg(
        long,
        global = true,
        env = "FEDSHARE_TSCONFIG_PATH",
        help = "tsconfig file with the path aliases (default: tsconfig.base.json, then tsconfig.json)"
    )]
    pub tsconfig: Option<PathBuf>,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: crate::tracing::LogLevel,

    /// Log output format.
    #[arg(
        long,
        global = true,
        help = "Set log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: crate::tracing::TracingFormat,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the aliases and shared config of a project.
    #[command(about = "Print the aliases and shared config of a project")]
    Resolve {
        /// Project to resolve.
        #[arg(long, short = 'p', help = "Project name in the graph")]
        project: String,

        /// Federation config file.
        #[arg(
            long,
            short = 'c',
            help = "Federation config file (default: <project root>/federation.json)"
        )]
        config: Option<PathBuf>,

        /// Output format.
        #[arg(long, short = 'o', default_value = "text", value_enum)]
        format: OutputFormat,
    },

    /// Print where a relative import is redirected to.
    #[command(about = "Print where a relative import is redirected to")]
    Rewrite {
        /// Project whose shared libraries apply.
        #[arg(long, short = 'p', help = "Project name in the graph")]
        project: String,

        /// Federation config file.
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Import request as written in the source.
        #[arg(long, help = "Relative import request, e.g. ../../libs/ui/src/button")]
        request: String,

        /// File containing the import.
        #[arg(long, help = "File containing the import, relative to the workspace root")]
        issuer: PathBuf,
    },
}

/// Parse command line arguments
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
