//! Workspace collaborators for federated module sharing.
//!
//! This crate reads everything the share resolver needs to know about a
//! workspace, without interpreting any of it:
//!
//! - [`manifest`] - dependency manifests (`package.json`) behind the
//!   [`ManifestSource`] capability, with filesystem and in-memory sources
//! - [`tsconfig`] - compile-time path alias tables (`compilerOptions.paths`)
//! - [`graph`] - the project graph snapshot and the [`WorkspaceLibrary`]
//!   records derived from it
//! - [`entry_points`] - secondary entry points of libraries and packages
//! - [`paths`] - lexical join/normalize helpers
//!
//! # Example
//!
//! ```rust,ignore
//! use fedshare_workspaces::{FsManifestSource, ManifestReader};
//! use std::path::Path;
//!
//! let root = Path::new("/path/to/workspace");
//! let reader = ManifestReader::new(&FsManifestSource, root);
//! let manifest = reader.read_project(Path::new("apps/shell"))?;
//!
//! if let Some(version) = manifest.dependency_version("react") {
//!     println!("react {version}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod entry_points;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod paths;
pub mod tsconfig;

pub use entry_points::{
    LibraryEntryPoint, NoSecondaryEntryPoints, PackageEntryPoint, SecondaryEntryPoints,
    WorkspaceEntryPoints,
};
pub use error::{Error, Result};
pub use graph::{
    ExternalNode, ProjectConfiguration, ProjectGraph, ProjectGraphNode, TargetConfiguration,
    WorkspaceLibrary, workspace_libraries,
};
pub use manifest::{
    FsManifestSource, InMemoryManifestSource, ManifestReader, ManifestSource, PackageManifest,
};
pub use paths::{join_normalized, normalize_path};
pub use tsconfig::{PathMappings, find_root_tsconfig, read_path_mappings};
