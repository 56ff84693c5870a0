//! Secondary entry points of workspace libraries and installed packages.
//!
//! A secondary entry point is an importable sub-path next to the primary
//! entry (`@acme/ui/testing`, `rxjs/operators`). Each one needs its own alias
//! or sharing record, otherwise the bundler treats it as unrelated code.

use crate::error::Result;
use crate::graph::WorkspaceLibrary;
use crate::manifest::{MANIFEST_FILE, ManifestSource, load_optional};
use crate::paths::join_normalized;
use crate::tsconfig::{PathMappings, is_wildcard_alias};
use std::path::{Path, PathBuf};

/// Marker file of libraries packaged with secondary entry points.
pub const NG_PACKAGE_FILE: &str = "ng-package.json";

/// A secondary entry point of a workspace library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntryPoint {
    /// Alias the entry point is imported under.
    pub name: String,
    /// Absolute path of the entry file.
    pub path: PathBuf,
}

/// A secondary entry point of an installed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntryPoint {
    /// `<package>/<subpath>`.
    pub name: String,
    /// Version inherited from the package.
    pub version: String,
}

/// Enumerates secondary entry points.
pub trait SecondaryEntryPoints {
    /// Secondary entry points declared by a workspace library.
    ///
    /// # Errors
    ///
    /// Returns an error when library metadata exists but cannot be read.
    fn library_entry_points(
        &self,
        library: &WorkspaceLibrary,
        mappings: &PathMappings,
    ) -> Result<Vec<LibraryEntryPoint>>;

    /// Secondary entry points exported by an installed package.
    ///
    /// # Errors
    ///
    /// Returns an error when the package manifest exists but cannot be parsed.
    fn package_entry_points(
        &self,
        package: &str,
        version: &str,
        project_root: &Path,
    ) -> Result<Vec<PackageEntryPoint>>;
}

/// Reports no secondary entry points.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSecondaryEntryPoints;

impl SecondaryEntryPoints for NoSecondaryEntryPoints {
    fn library_entry_points(
        &self,
        _library: &WorkspaceLibrary,
        _mappings: &PathMappings,
    ) -> Result<Vec<LibraryEntryPoint>> {
        Ok(Vec::new())
    }

    fn package_entry_points(
        &self,
        _package: &str,
        _version: &str,
        _project_root: &Path,
    ) -> Result<Vec<PackageEntryPoint>> {
        Ok(Vec::new())
    }
}

/// Discovers secondary entry points from workspace metadata.
///
/// Libraries opt in with an `ng-package.json` in their root; their secondary
/// entry points are the aliases nested under the library's import key whose
/// primary path lies inside the library. Packages contribute the subpaths of
/// their `exports` map, looked up in the project's `node_modules` first and
/// the workspace's second.
#[derive(Clone, Copy)]
pub struct WorkspaceEntryPoints<'a> {
    workspace_root: &'a Path,
    manifests: &'a dyn ManifestSource,
}

impl<'a> WorkspaceEntryPoints<'a> {
    /// Creates a discovery rooted at `workspace_root`.
    #[must_use]
    pub fn new(workspace_root: &'a Path, manifests: &'a dyn ManifestSource) -> Self {
        Self {
            workspace_root,
            manifests,
        }
    }
}

impl SecondaryEntryPoints for WorkspaceEntryPoints<'_> {
    fn library_entry_points(
        &self,
        library: &WorkspaceLibrary,
        mappings: &PathMappings,
    ) -> Result<Vec<LibraryEntryPoint>> {
        let library_root = self.workspace_root.join(&library.root);
        if !library_root.join(NG_PACKAGE_FILE).is_file() {
            return Ok(Vec::new());
        }

        let prefix = format!("{}/", library.import_key);
        let entry_points: Vec<LibraryEntryPoint> = mappings
            .iter()
            .filter(|(alias, candidates)| {
                alias.starts_with(&prefix) && !is_wildcard_alias(alias, candidates)
            })
            .filter_map(|(alias, candidates)| {
                let path = join_normalized(self.workspace_root, candidates.first()?);
                path.starts_with(&library_root).then(|| LibraryEntryPoint {
                    name: alias.clone(),
                    path,
                })
            })
            .collect();

        tracing::debug!(
            library = %library.name,
            count = entry_points.len(),
            "Collected library secondary entry points"
        );

        Ok(entry_points)
    }

    fn package_entry_points(
        &self,
        package: &str,
        version: &str,
        project_root: &Path,
    ) -> Result<Vec<PackageEntryPoint>> {
        let candidates = [
            self.workspace_root.join(project_root),
            self.workspace_root.to_path_buf(),
        ];

        for base in candidates {
            let manifest_path = join_normalized(
                &base.join("node_modules").join(package),
                MANIFEST_FILE,
            );
            let Some(manifest) = load_optional(self.manifests, &manifest_path)? else {
                continue;
            };

            return Ok(manifest
                .export_subpaths()
                .into_iter()
                .map(|subpath| PackageEntryPoint {
                    name: format!("{package}/{subpath}"),
                    version: version.to_string(),
                })
                .collect());
        }

        tracing::trace!(package, "Package manifest not installed, no entry points");
        Ok(Vec::new())
    }
}
