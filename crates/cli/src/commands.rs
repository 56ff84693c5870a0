//! Command implementations.
//!
//! Each command loads the workspace inputs from disk, runs the resolver and
//! returns the text to print on stdout.

use crate::cli::{CliError, Commands, OutputFormat};
use fedshare_core::{FederationConfig, FederationShareConfig, ShareResolver};
use fedshare_workspaces::{
    FsManifestSource, PathMappings, ProjectGraph, WorkspaceEntryPoints, find_root_tsconfig,
    join_normalized, normalize_path, read_path_mappings,
};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Workspace inputs shared by every command.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    graph: ProjectGraph,
    mappings: PathMappings,
}

impl Workspace {
    /// Loads the graph and path mappings of the workspace at `root`.
    ///
    /// `graph` and `tsconfig` are resolved against the workspace root. Without
    /// an explicit tsconfig the root is searched; a workspace without one
    /// has no path aliases.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace root cannot be made absolute, or if
    /// the graph or the path mappings cannot be read.
    pub fn load(root: &Path, graph: &Path, tsconfig: Option<&Path>) -> Result<Self, CliError> {
        let root = std::path::absolute(root)
            .map(|absolute| normalize_path(&absolute))
            .map_err(|e| {
                CliError::config(format!("Invalid workspace root {}: {e}", root.display()))
            })?;
        let graph = ProjectGraph::from_file(&join_normalized(&root, graph))?;

        let tsconfig = tsconfig
            .map(|path| join_normalized(&root, path))
            .or_else(|| find_root_tsconfig(&root));
        let mappings = match tsconfig {
            Some(path) => read_path_mappings(&path)?,
            None => {
                tracing::debug!(root = %root.display(), "No tsconfig found, no path aliases");
                PathMappings::new()
            }
        };

        Ok(Self {
            root,
            graph,
            mappings,
        })
    }

    /// Absolute workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn config_for(
        &self,
        project: &str,
        config: Option<&Path>,
    ) -> Result<FederationConfig, CliError> {
        let loaded = match config {
            Some(path) => FederationConfig::from_file(&join_normalized(&self.root, path))?,
            None => {
                let resolver = ShareResolver::new(&self.root, &self.graph, &FsManifestSource);
                FederationConfig::load(&self.root.join(resolver.project_root(project)?))?
            }
        };
        Ok(loaded)
    }

    /// Resolves the shared configuration of `project`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or resolution
    /// fails.
    pub fn resolve(
        &self,
        project: &str,
        config: Option<&Path>,
    ) -> Result<FederationShareConfig, CliError> {
        let config = self.config_for(project, config)?;
        let entry_points = WorkspaceEntryPoints::new(&self.root, &FsManifestSource);
        let resolver = ShareResolver::new(&self.root, &self.graph, &FsManifestSource)
            .with_entry_points(&entry_points);

        Ok(resolver.resolve(project, &self.mappings, &config)?)
    }
}

/// Runs `command` against `workspace` and returns the output.
///
/// # Errors
///
/// Returns an error if the command fails.
pub fn execute(workspace: &Workspace, command: &Commands) -> Result<String, CliError> {
    match command {
        Commands::Resolve {
            project,
            config,
            format,
        } => {
            let resolved = workspace.resolve(project, config.as_deref())?;
            render_resolved(&resolved, *format)
        }
        Commands::Rewrite {
            project,
            config,
            request,
            issuer,
        } => {
            let resolved = workspace.resolve(project, config.as_deref())?;
            let issuer = join_normalized(workspace.root(), issuer);
            let rewritten = resolved.rewrite.apply(request, &issuer);
            tracing::debug!(
                request = %request,
                rewritten = %rewritten,
                issuer = %issuer.display(),
                "Applied rewrite rule"
            );
            Ok(format!("{rewritten}\n"))
        }
    }
}

#[derive(Serialize)]
struct PolicyRow<'a> {
    name: &'a str,
    #[serde(flatten)]
    policy: &'a fedshare_core::SharingPolicy,
}

/// Formats a resolved configuration.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_resolved(
    resolved: &FederationShareConfig,
    format: OutputFormat,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(resolved)
            .map(|json| format!("{json}\n"))
            .map_err(|e| CliError::other(format!("Failed to serialize output: {e}"))),
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(out, "aliases:");
            for (name, path) in &resolved.aliases {
                let _ = writeln!(out, "  {name} -> {}", path.display());
            }
            let _ = writeln!(out, "shared:");
            for (name, policy) in &resolved.shared {
                let row = serde_json::to_string(&PolicyRow { name, policy })
                    .map_err(|e| CliError::other(format!("Failed to serialize output: {e}")))?;
                let _ = writeln!(out, "  {row}");
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fedshare_core::{RequestRewriteRule, SharedConfigMap, SharingPolicy};

    fn resolved() -> FederationShareConfig {
        FederationShareConfig {
            aliases: [(
                "@acme/ui".to_string(),
                PathBuf::from("/ws/libs/ui/src/index.ts"),
            )]
            .into_iter()
            .collect(),
            shared: SharedConfigMap::from_iter([
                ("@acme/ui".to_string(), SharingPolicy::unversioned(Some(true))),
                ("react".to_string(), SharingPolicy::singleton("^18.2.0")),
            ]),
            rewrite: RequestRewriteRule::noop(),
        }
    }

    #[test]
    fn test_render_text() {
        let text = render_resolved(&resolved(), OutputFormat::Text).unwrap();

        assert_eq!(
            text,
            "aliases:\n  @acme/ui -> /ws/libs/ui/src/index.ts\nshared:\n  \
             {\"name\":\"@acme/ui\",\"requiredVersion\":false,\"eager\":true}\n  \
             {\"name\":\"react\",\"requiredVersion\":\"^18.2.0\",\"singleton\":true,\"strictVersion\":true}\n"
        );
    }

    #[test]
    fn test_render_json() {
        let json = render_resolved(&resolved(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["aliases"]["@acme/ui"], "/ws/libs/ui/src/index.ts");
        assert_eq!(value["shared"]["react"]["singleton"], true);
        assert!(value.get("rewrite").is_none());
    }
}
