//! User overrides layered on top of the baseline shared config.
//!
//! Two passes run in order, each consuming the map and returning a new one:
//!
//! 1. [`apply_shared_function`] lets a caller keep, remove or replace every
//!    entry.
//! 2. [`apply_additional_shared`] adds entries the caller explicitly opted
//!    into sharing.

use crate::error::{Error, Result};
use crate::logger::Logger;
use crate::policy::{SharedConfigMap, SharingPolicy};
use crate::version::{effective_version, npm_share_policy};
use fedshare_workspaces::{ManifestReader, PackageManifest, ProjectGraph};
use serde::Deserialize;
use std::path::Path;

/// Outcome of the user transform for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareDecision {
    /// Leave the entry unchanged.
    Keep,
    /// Drop the entry from the shared config.
    Remove,
    /// Replace the entry's policy.
    Replace(SharingPolicy),
}

/// User transform applied to every `(name, policy)` entry.
pub type SharedFunction<'a> = dyn Fn(&str, &SharingPolicy) -> ShareDecision + 'a;

/// Runs `function` over every entry of `shared`, in key order.
///
/// Without a function the map is returned as is.
#[must_use]
pub fn apply_shared_function(
    shared: SharedConfigMap,
    function: Option<&SharedFunction<'_>>,
) -> SharedConfigMap {
    let Some(function) = function else {
        return shared;
    };

    shared
        .into_iter()
        .filter_map(|(name, policy)| match function(&name, &policy) {
            ShareDecision::Keep => Some((name, policy)),
            ShareDecision::Remove => {
                tracing::debug!(name = %name, "Removed by shared function");
                None
            }
            ShareDecision::Replace(replacement) => {
                tracing::debug!(name = %name, "Replaced by shared function");
                Some((name, replacement))
            }
        })
        .collect()
}

/// One entry of the `additionalShared` configuration.
///
/// ```json
/// "additionalShared": [
///     "some-workspace-lib",
///     ["rxjs", { "requiredVersion": "^7.8.0", "singleton": true }],
///     { "libraryName": "zone.js", "sharedConfig": { "requiredVersion": false, "eager": true } }
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AdditionalShared {
    /// Resolved through the project graph.
    Name(String),
    /// Literal `[name, policy]` pair.
    Pair(String, SharingPolicy),
    /// Literal `{ libraryName, sharedConfig }` object.
    Named {
        /// Dependency name.
        #[serde(rename = "libraryName")]
        library_name: String,
        /// Policy to set.
        #[serde(rename = "sharedConfig")]
        shared_config: SharingPolicy,
    },
}

/// An [`AdditionalShared`] entry reduced to its name and, for literal
/// entries, its policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedShared<'a> {
    /// Dependency name.
    pub name: &'a str,
    /// Literal policy; `None` when the name must be resolved through the graph.
    pub policy: Option<&'a SharingPolicy>,
}

impl AdditionalShared {
    /// Reduces the entry to its normalized form.
    #[must_use]
    pub fn normalize(&self) -> NormalizedShared<'_> {
        match self {
            Self::Name(name) => NormalizedShared { name, policy: None },
            Self::Pair(name, policy)
            | Self::Named {
                library_name: name,
                shared_config: policy,
            } => NormalizedShared {
                name,
                policy: Some(policy),
            },
        }
    }
}

impl From<&str> for AdditionalShared {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Layers `entries` on top of `shared`, in order.
///
/// Literal entries are set verbatim. A bare name that is a workspace project
/// is shared without version check. A bare name known only as an external
/// package node gets the strict singleton policy at its resolved version:
/// the project manifest, then the root manifest, then the version recorded
/// in the graph. Packages without any version are dropped with a warning.
///
/// # Errors
///
/// Returns [`Error::UnknownAdditionalDependency`] for a bare name that is
/// neither a workspace project nor an external node. The error carries the
/// map with every earlier entry applied. Manifest read failures are
/// propagated.
pub fn apply_additional_shared(
    shared: SharedConfigMap,
    entries: &[AdditionalShared],
    graph: &ProjectGraph,
    reader: &ManifestReader<'_>,
    project_root: &Path,
    logger: &dyn Logger,
) -> Result<SharedConfigMap> {
    let mut acc = shared;
    let mut manifests: Option<(PackageManifest, PackageManifest)> = None;

    for entry in entries {
        let NormalizedShared { name, policy } = entry.normalize();

        if let Some(policy) = policy {
            acc.insert(name.to_string(), policy.clone());
            continue;
        }

        if graph.node(name).is_some() {
            acc.insert(name.to_string(), SharingPolicy::unversioned(None));
            continue;
        }

        let Some(external) = graph.external_node(name) else {
            return Err(Error::UnknownAdditionalDependency {
                name: name.to_string(),
                applied: Box::new(acc),
            });
        };

        if manifests.is_none() {
            manifests = Some((reader.read_root()?, reader.read_project(project_root)?));
        }
        let version = manifests
            .as_ref()
            .and_then(|(root_manifest, project_manifest)| {
                effective_version(name, project_manifest, root_manifest)
            })
            .or(external.data.version.as_deref());

        if let Some(policy) = npm_share_policy(name, version, project_root, logger) {
            acc.insert(name.to_string(), policy);
        }
    }

    Ok(acc)
}
