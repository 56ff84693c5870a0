//! Workspace libraries: alias expansion and library sharing policies.

use crate::error::Result;
use crate::logger::Logger;
use crate::policy::{SharedConfigMap, SharingPolicy};
use crate::rewrite::RequestRewriteRule;
use fedshare_workspaces::graph::BUILD_TARGET;
use fedshare_workspaces::{
    ManifestReader, PathMappings, ProjectGraph, SecondaryEntryPoints, WorkspaceLibrary,
    join_normalized,
};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One compile-time alias pointing at a workspace library or one of its
/// secondary entry points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasRecord {
    /// Alias the code imports.
    pub name: String,
    /// Absolute path of the entry file.
    pub absolute_path: PathBuf,
    /// Project owning the alias. Only used to look up build metadata.
    pub owner_library: String,
}

/// Flattens the path-mapping table into alias records.
///
/// Aliases without a matching library are skipped. For each matching library
/// its secondary entry points come first, followed by the primary alias built
/// from the first candidate path. Later candidates are ignored.
///
/// # Errors
///
/// Returns an error if secondary entry point metadata cannot be read.
pub fn expand_path_mappings(
    workspace_root: &Path,
    libraries: &[WorkspaceLibrary],
    mappings: &PathMappings,
    entry_points: &dyn SecondaryEntryPoints,
) -> Result<Vec<AliasRecord>> {
    let mut records = Vec::new();

    for (key, candidates) in mappings {
        let Some(library) = libraries.iter().find(|lib| &lib.import_key == key) else {
            continue;
        };

        records.extend(
            entry_points
                .library_entry_points(library, mappings)?
                .into_iter()
                .map(|entry_point| AliasRecord {
                    name: entry_point.name,
                    absolute_path: entry_point.path,
                    owner_library: library.name.clone(),
                }),
        );

        let Some(primary) = candidates.first() else {
            tracing::debug!(alias = %key, "Alias has no candidate paths");
            continue;
        };

        records.push(AliasRecord {
            name: key.clone(),
            absolute_path: join_normalized(workspace_root, primary),
            owner_library: library.name.clone(),
        });
    }

    Ok(records)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SharedLibrary {
    record: AliasRecord,
    build_version: Option<String>,
}

/// Sharing configuration for workspace libraries.
///
/// Built once per resolution; every accessor is pure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedWorkspaceLibraryConfig {
    libraries: Vec<SharedLibrary>,
    rewrite: RequestRewriteRule,
}

impl SharedWorkspaceLibraryConfig {
    /// The configuration used when no workspace library is federated: no
    /// aliases, no libraries and a rule that never rewrites.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the configuration for `records`.
    ///
    /// Libraries with a working build target are probed for the version in
    /// their built manifest. A missing or unreadable build output is not
    /// fatal; the library falls back to unversioned sharing with a warning.
    /// Each library is probed once, however many entry points it has.
    #[must_use]
    pub fn new(
        records: Vec<AliasRecord>,
        graph: &ProjectGraph,
        reader: &ManifestReader<'_>,
        logger: &dyn Logger,
    ) -> Self {
        let rewrite = RequestRewriteRule::from_records(&records);
        let mut versions: HashMap<String, Option<String>> = HashMap::new();
        let libraries = records
            .into_iter()
            .map(|record| {
                let build_version = versions
                    .entry(record.owner_library.clone())
                    .or_insert_with(|| build_version(&record.owner_library, graph, reader, logger))
                    .clone();
                SharedLibrary {
                    record,
                    build_version,
                }
            })
            .collect();

        Self { libraries, rewrite }
    }

    /// The alias records, in table order.
    pub fn records(&self) -> impl Iterator<Item = &AliasRecord> {
        self.libraries.iter().map(|library| &library.record)
    }

    /// Alias name to absolute source path, for bundler module resolution.
    #[must_use]
    pub fn aliases(&self) -> IndexMap<String, PathBuf> {
        self.records()
            .map(|record| (record.name.clone(), record.absolute_path.clone()))
            .collect()
    }

    /// Sharing policy per alias.
    ///
    /// Built libraries share their output version without being forced
    /// singleton; everything else is shared unconditionally with the given
    /// eagerness.
    #[must_use]
    pub fn libraries(&self, eager: Option<bool>) -> SharedConfigMap {
        self.libraries
            .iter()
            .map(|library| {
                let policy = match &library.build_version {
                    Some(version) => SharingPolicy::versioned_library(version.clone()),
                    None => SharingPolicy::unversioned(eager),
                };
                (library.record.name.clone(), policy)
            })
            .collect()
    }

    /// The request rewrite rule for these libraries.
    #[must_use]
    pub fn rewrite_rule(&self) -> &RequestRewriteRule {
        &self.rewrite
    }
}

fn build_version(
    library: &str,
    graph: &ProjectGraph,
    reader: &ManifestReader<'_>,
    logger: &dyn Logger,
) -> Option<String> {
    let project = &graph.node(library)?.data;
    if !project.is_buildable(BUILD_TARGET) {
        return None;
    }

    let Some(output_path) = project.build_output_path() else {
        logger.warn(&format!(
            "Library \"{library}\" has a build target without an outputPath; its entry points will be shared without a version check."
        ));
        return None;
    };

    match reader.read_build_output(&output_path) {
        Ok(manifest) => match manifest.version.filter(|v| !v.is_empty()) {
            Some(version) => Some(version),
            None => {
                logger.warn(&format!(
                    "The build output of \"{library}\" at {} declares no version; its entry points will be shared without a version check.",
                    output_path.display()
                ));
                None
            }
        },
        Err(err) => {
            logger.warn(&format!(
                "Could not read the build output of \"{library}\" ({err}); its entry points will be shared without a version check."
            ));
            None
        }
    }
}
