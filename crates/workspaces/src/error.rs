//! Error types for workspace collaborator operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for workspace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading workspace inputs.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Dependency manifest not found.
    #[error("Could not find {} to determine dependency versions", path.display())]
    #[diagnostic(
        code(fedshare::workspaces::manifest_not_found),
        help(
            "Ensure a 'package.json' exists at the workspace root and in the project root of the application being built"
        )
    )]
    ManifestNotFound {
        /// The path where the manifest was expected.
        path: PathBuf,
    },

    /// Path mapping configuration file not found.
    #[error("Path mapping configuration not found at path: {}", path.display())]
    #[diagnostic(
        code(fedshare::workspaces::path_mappings_not_found),
        help(
            "Point --tsconfig (or FEDSHARE_TSCONFIG_PATH) at the file declaring 'compilerOptions.paths', usually 'tsconfig.base.json'"
        )
    )]
    PathMappingsNotFound {
        /// The path that was searched.
        path: PathBuf,
    },

    /// Path mapping configuration could not be interpreted.
    #[error("Invalid path mapping configuration at {}: {message}", path.display())]
    #[diagnostic(
        code(fedshare::workspaces::invalid_path_mappings),
        help("'compilerOptions.paths' must map each alias to an array of relative paths")
    )]
    InvalidPathMappings {
        /// Path to the invalid configuration file.
        path: PathBuf,
        /// Description of what is invalid.
        message: String,
    },

    /// I/O error occurred.
    #[error("I/O error during {operation}{}: {source}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(fedshare::workspaces::io_error),
        help("Check that the referenced paths exist and that you have permission to read them")
    )]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Optional path where the error occurred.
        path: Option<PathBuf>,
        /// Description of the operation being performed.
        operation: String,
    },

    /// JSON parsing error.
    #[error("JSON parsing error{}: {source}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(fedshare::workspaces::json_error),
        help("Ensure the JSON has valid syntax and matches the expected shape")
    )]
    Json {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
        /// Optional path to the file being parsed.
        path: Option<PathBuf>,
    },
}
