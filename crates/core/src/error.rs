//! Error types for share resolution.

use crate::policy::SharedConfigMap;
use miette::Diagnostic;
use thiserror::Error;

/// Result type for share resolution.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort share resolution.
///
/// Recoverable conditions (a package without a version, a library whose build
/// output cannot be read) never surface here; they degrade the affected entry
/// and are reported through the [`Logger`](crate::Logger).
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Reading a workspace input failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Workspace(#[from] fedshare_workspaces::Error),

    /// A name listed in `additionalShared` is neither a workspace project nor
    /// a package known to the project graph.
    #[error(
        "The specified dependency \"{name}\" in the additionalShared configuration does not exist in the project graph"
    )]
    #[diagnostic(
        code(fedshare::core::unknown_additional_dependency),
        help(
            "Check your additionalShared configuration and make sure you are including valid workspace projects or npm packages"
        )
    )]
    UnknownAdditionalDependency {
        /// The offending name.
        name: String,
        /// The shared config as it stood after every earlier entry was applied.
        applied: Box<SharedConfigMap>,
    },

    /// Invalid resolver input.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(fedshare::core::configuration))]
    Configuration {
        /// What is wrong.
        message: String,
    },
}

impl Error {
    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
