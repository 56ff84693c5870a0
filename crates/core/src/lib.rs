//! Shared-dependency resolution for federated module builds.
//!
//! Given a project graph, its manifests and the workspace's path alias table,
//! [`ShareResolver`] computes one deterministic sharing configuration for a
//! federated project:
//!
//! 1. workspace libraries, shared by alias ([`libraries`]), together with the
//!    alias map and the [`RequestRewriteRule`] for relative imports
//! 2. third-party packages at their effective versions ([`packages`],
//!    [`version`])
//! 3. the user transform and `additionalShared` entries ([`overrides`])
//!
//! Recoverable misses are reported through the injected [`Logger`]; anything
//! else aborts the resolution with an [`Error`].
//!
//! # Example
//!
//! ```rust,ignore
//! use fedshare_core::{FederationConfig, ShareResolver};
//! use fedshare_workspaces::{FsManifestSource, ProjectGraph, read_path_mappings};
//!
//! let graph = ProjectGraph::from_file(&root.join("graph.json"))?;
//! let mappings = read_path_mappings(&root.join("tsconfig.base.json"))?;
//! let config = FederationConfig::load(&root.join("apps/shell"))?;
//!
//! let resolved = ShareResolver::new(&root, &graph, &FsManifestSource)
//!     .resolve("shell", &mappings, &config)?;
//! println!("{}", serde_json::to_string_pretty(&resolved.shared)?);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod error;
pub mod libraries;
pub mod logger;
pub mod overrides;
pub mod packages;
pub mod policy;
pub mod resolver;
pub mod rewrite;
pub mod version;

pub use config::FederationConfig;
pub use error::{Error, Result};
pub use libraries::{AliasRecord, SharedWorkspaceLibraryConfig, expand_path_mappings};
pub use logger::{Logger, RecordingLogger, TracingLogger};
pub use overrides::{
    AdditionalShared, NormalizedShared, ShareDecision, SharedFunction, apply_additional_shared,
    apply_shared_function,
};
pub use packages::share_packages;
pub use policy::{RequiredVersion, SharedConfigMap, SharingPolicy};
pub use resolver::{FederationShareConfig, ShareResolver};
pub use rewrite::RequestRewriteRule;
pub use version::{effective_version, npm_share_policy};
