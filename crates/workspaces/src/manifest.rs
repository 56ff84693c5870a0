//! Dependency manifests (`package.json`) and the sources they are read from.
//!
//! Only the keys the resolver consumes are modelled; everything else in a
//! manifest is ignored. Dependency maps keep their on-disk key order.

use crate::error::{Error, Result};
use crate::paths::{join_normalized, normalize_path};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of a dependency manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// The subset of a `package.json` used for share resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    /// Package name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Package version. Present on built library outputs and installed packages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Runtime dependencies, name to version requirement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<IndexMap<String, String>>,

    /// Development dependencies, name to version requirement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_dependencies: Option<IndexMap<String, String>>,

    /// Package entry point map, kept raw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<serde_json::Value>,
}

impl PackageManifest {
    /// Looks up the declared version of `name`, `dependencies` before
    /// `devDependencies`.
    ///
    /// A name present in `dependencies` shadows `devDependencies` even when its
    /// value is empty.
    #[must_use]
    pub fn dependency_version(&self, name: &str) -> Option<&str> {
        self.dependencies
            .as_ref()
            .and_then(|deps| deps.get(name))
            .or_else(|| self.dev_dependencies.as_ref().and_then(|deps| deps.get(name)))
            .map(String::as_str)
    }

    /// Subpaths declared in `exports`, excluding the root entry, the manifest
    /// itself and wildcard patterns. Returned without the leading `./`.
    #[must_use]
    pub fn export_subpaths(&self) -> Vec<String> {
        let Some(serde_json::Value::Object(exports)) = &self.exports else {
            return Vec::new();
        };

        exports
            .keys()
            .filter(|key| key.as_str() != "." && key.as_str() != "./package.json")
            .filter(|key| !key.contains('*'))
            .filter_map(|key| key.strip_prefix("./"))
            .filter(|subpath| !subpath.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// A capability that loads dependency manifests.
///
/// Resolution logic only ever talks to this trait, so it can run against the
/// real filesystem or against manifests fabricated in memory.
pub trait ManifestSource {
    /// Loads the manifest stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestNotFound`] when no manifest exists at `path`, or
    /// a parse error when the manifest is not well-formed JSON.
    fn load(&self, path: &Path) -> Result<PackageManifest>;
}

/// Loads `path` from `source`, mapping a missing manifest to `None`.
///
/// # Errors
///
/// Propagates every error other than [`Error::ManifestNotFound`].
pub fn load_optional(source: &dyn ManifestSource, path: &Path) -> Result<Option<PackageManifest>> {
    match source.load(path) {
        Ok(manifest) => Ok(Some(manifest)),
        Err(Error::ManifestNotFound { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Reads manifests from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsManifestSource;

impl ManifestSource for FsManifestSource {
    fn load(&self, path: &Path) -> Result<PackageManifest> {
        if !path.is_file() {
            return Err(Error::ManifestNotFound {
                path: path.to_path_buf(),
            });
        }

        tracing::trace!(path = %path.display(), "Reading manifest");
        read_json_file(path)
    }
}

/// Serves manifests from memory, keyed by normalized path.
#[derive(Debug, Default, Clone)]
pub struct InMemoryManifestSource {
    manifests: HashMap<PathBuf, PackageManifest>,
}

impl InMemoryManifestSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `manifest` at `path`, replacing any previous one.
    pub fn insert(&mut self, path: impl AsRef<Path>, manifest: PackageManifest) {
        self.manifests
            .insert(normalize_path(path.as_ref()), manifest);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, path: impl AsRef<Path>, manifest: PackageManifest) -> Self {
        self.insert(path, manifest);
        self
    }
}

impl ManifestSource for InMemoryManifestSource {
    fn load(&self, path: &Path) -> Result<PackageManifest> {
        self.manifests
            .get(&normalize_path(path))
            .cloned()
            .ok_or_else(|| Error::ManifestNotFound {
                path: path.to_path_buf(),
            })
    }
}

/// Binds a [`ManifestSource`] to a workspace root.
#[derive(Clone, Copy)]
pub struct ManifestReader<'a> {
    source: &'a dyn ManifestSource,
    workspace_root: &'a Path,
}

impl<'a> ManifestReader<'a> {
    /// Creates a reader resolving relative locations against `workspace_root`.
    #[must_use]
    pub fn new(source: &'a dyn ManifestSource, workspace_root: &'a Path) -> Self {
        Self {
            source,
            workspace_root,
        }
    }

    /// Reads `<workspace root>/package.json`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestNotFound`] when the root manifest is absent.
    pub fn read_root(&self) -> Result<PackageManifest> {
        self.source
            .load(&join_normalized(self.workspace_root, MANIFEST_FILE))
    }

    /// Reads `<project root>/package.json`, the project root being relative to
    /// the workspace root unless absolute.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestNotFound`] when the project manifest is absent.
    pub fn read_project(&self, project_root: &Path) -> Result<PackageManifest> {
        self.source.load(&self.manifest_path(project_root))
    }

    /// Reads the manifest emitted into a library's build output directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestNotFound`] when the library has not been built.
    pub fn read_build_output(&self, output_path: &Path) -> Result<PackageManifest> {
        self.source.load(&self.manifest_path(output_path))
    }

    fn manifest_path(&self, dir: &Path) -> PathBuf {
        join_normalized(&self.workspace_root.join(dir), MANIFEST_FILE)
    }
}

/// Reads and parses a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed as valid JSON.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| Error::Io {
        source: e,
        path: Some(path.to_path_buf()),
        operation: "reading json file".to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| Error::Json {
        source: e,
        path: Some(path.to_path_buf()),
    })
}
