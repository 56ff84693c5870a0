//! Project graph snapshot and the workspace libraries derived from it.
//!
//! The graph is produced by the workspace tooling and handed to the resolver
//! as JSON. Only node roots, build targets and external package nodes are
//! consumed.

use crate::error::Result;
use crate::manifest::read_json_file;
use crate::paths::normalize_path;
use crate::tsconfig::{PathMappings, is_wildcard_alias};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix of external (package manager) node names in the graph.
pub const NPM_NODE_PREFIX: &str = "npm:";

/// Name of the target whose output is inspected for a library version.
pub const BUILD_TARGET: &str = "build";

/// Snapshot of the workspace project graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGraph {
    /// Workspace projects keyed by project name.
    #[serde(default)]
    pub nodes: IndexMap<String, ProjectGraphNode>,

    /// Third-party packages keyed by `npm:<name>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_nodes: Option<IndexMap<String, ExternalNode>>,
}

impl ProjectGraph {
    /// Loads a graph snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        read_json_file(path)
    }

    /// Looks up a workspace project by name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&ProjectGraphNode> {
        self.nodes.get(name)
    }

    /// Looks up the external node for package `name`.
    #[must_use]
    pub fn external_node(&self, name: &str) -> Option<&ExternalNode> {
        self.external_nodes
            .as_ref()
            .and_then(|nodes| nodes.get(&format!("{NPM_NODE_PREFIX}{name}")))
    }
}

/// A workspace project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGraphNode {
    /// Project name.
    #[serde(default)]
    pub name: String,

    /// Project kind (`app`, `lib`, `e2e`).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Project configuration.
    pub data: ProjectConfiguration,
}

impl ProjectGraphNode {
    /// Whether the project is a library.
    #[must_use]
    pub fn is_library(&self) -> bool {
        self.kind.as_deref() == Some("lib")
    }
}

/// Configuration of a workspace project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfiguration {
    /// Project root, relative to the workspace root.
    pub root: PathBuf,

    /// Targets keyed by target name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<IndexMap<String, TargetConfiguration>>,
}

impl ProjectConfiguration {
    /// Creates a project configuration without targets.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            targets: None,
        }
    }

    /// Looks up a target by name.
    #[must_use]
    pub fn target(&self, name: &str) -> Option<&TargetConfiguration> {
        self.targets.as_ref().and_then(|targets| targets.get(name))
    }

    /// Whether `target` exists with a non-empty executor.
    #[must_use]
    pub fn is_buildable(&self, target: &str) -> bool {
        self.target(target)
            .and_then(|t| t.executor.as_deref())
            .is_some_and(|executor| !executor.is_empty())
    }

    /// `outputPath` option of the build target.
    #[must_use]
    pub fn build_output_path(&self) -> Option<PathBuf> {
        self.target(BUILD_TARGET)?
            .options
            .as_ref()?
            .get("outputPath")?
            .as_str()
            .map(PathBuf::from)
    }
}

/// A project target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetConfiguration {
    /// Executor running the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,

    /// Executor options, kept raw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

/// A third-party package node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalNode {
    /// Node name (`npm:<package>`).
    #[serde(default)]
    pub name: String,

    /// Node kind.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Package data.
    #[serde(default)]
    pub data: ExternalNodeData,
}

/// Package data of an external node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalNodeData {
    /// Installed version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Package name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
}

/// A workspace library eligible for sharing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceLibrary {
    /// Project name in the graph.
    pub name: String,

    /// Alias key under which the library is imported.
    pub import_key: String,

    /// Project root, relative to the workspace root.
    pub root: PathBuf,
}

/// Derives the shareable workspace libraries of `graph`.
///
/// A library's import key is the outermost alias whose primary candidate path
/// lies inside the library root: among matching aliases, the first one not
/// nested under another (`@acme/ui` over `@acme/ui/testing`). Wildcard aliases
/// never qualify. Libraries without such an alias are not shareable and are
/// left out. `only` restricts the result to the named
/// projects, in graph order.
#[must_use]
pub fn workspace_libraries(
    graph: &ProjectGraph,
    mappings: &PathMappings,
    only: Option<&[String]>,
) -> Vec<WorkspaceLibrary> {
    graph
        .nodes
        .iter()
        .filter(|(name, node)| match only {
            Some(names) => names.iter().any(|n| n == *name),
            None => node.is_library(),
        })
        .filter_map(|(name, node)| {
            let root = normalize_path(&node.data.root);
            let matching: Vec<&String> = mappings
                .iter()
                .filter(|(alias, candidates)| {
                    !is_wildcard_alias(alias, candidates)
                        && candidates
                            .first()
                            .is_some_and(|primary| normalize_path(Path::new(primary)).starts_with(&root))
                })
                .map(|(alias, _)| alias)
                .collect();
            let import_key = matching
                .iter()
                .find(|alias| {
                    !matching
                        .iter()
                        .any(|outer| alias.strip_prefix(outer.as_str()).is_some_and(|rest| rest.starts_with('/')))
                })
                .map(|alias| (*alias).clone())?;

            Some(WorkspaceLibrary {
                name: name.clone(),
                import_key,
                root: node.data.root.clone(),
            })
        })
        .collect()
}
