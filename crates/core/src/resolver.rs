//! The share resolver: every pass wired together.

use crate::config::FederationConfig;
use crate::error::{Error, Result};
use crate::libraries::{SharedWorkspaceLibraryConfig, expand_path_mappings};
use crate::logger::{Logger, TracingLogger};
use crate::overrides::{self, AdditionalShared, SharedFunction, apply_shared_function};
use crate::packages;
use crate::policy::SharedConfigMap;
use crate::rewrite::RequestRewriteRule;
use fedshare_workspaces::{
    ManifestReader, ManifestSource, NoSecondaryEntryPoints, PathMappings, ProjectGraph,
    SecondaryEntryPoints, WorkspaceLibrary, workspace_libraries,
};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Everything the bundler integration needs for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FederationShareConfig {
    /// Alias name to absolute source path.
    pub aliases: IndexMap<String, PathBuf>,
    /// Dependency name to sharing policy.
    pub shared: SharedConfigMap,
    /// Redirects relative imports into shared libraries.
    #[serde(skip)]
    pub rewrite: RequestRewriteRule,
}

/// Resolves shared-dependency configuration for the projects of one
/// workspace.
///
/// All collaborators are injected; the resolver holds no state of its own
/// and every call computes a fresh result.
///
/// ```rust,ignore
/// let resolver = ShareResolver::new(root, &graph, &FsManifestSource)
///     .with_entry_points(&WorkspaceEntryPoints::new(root, &FsManifestSource));
/// let resolved = resolver.resolve("shell", &mappings, &config)?;
/// ```
#[derive(Clone, Copy)]
pub struct ShareResolver<'a> {
    workspace_root: &'a Path,
    graph: &'a ProjectGraph,
    manifests: &'a dyn ManifestSource,
    entry_points: &'a dyn SecondaryEntryPoints,
    logger: &'a dyn Logger,
}

impl<'a> ShareResolver<'a> {
    /// Creates a resolver without secondary entry point discovery that logs
    /// through `tracing`.
    #[must_use]
    pub fn new(
        workspace_root: &'a Path,
        graph: &'a ProjectGraph,
        manifests: &'a dyn ManifestSource,
    ) -> Self {
        Self {
            workspace_root,
            graph,
            manifests,
            entry_points: &NoSecondaryEntryPoints,
            logger: &TracingLogger,
        }
    }

    /// Uses `entry_points` to discover secondary entry points.
    #[must_use]
    pub fn with_entry_points(mut self, entry_points: &'a dyn SecondaryEntryPoints) -> Self {
        self.entry_points = entry_points;
        self
    }

    /// Sends warnings to `logger`.
    #[must_use]
    pub fn with_logger(mut self, logger: &'a dyn Logger) -> Self {
        self.logger = logger;
        self
    }

    fn reader(&self) -> ManifestReader<'a> {
        ManifestReader::new(self.manifests, self.workspace_root)
    }

    /// Root directory of `project`, relative to the workspace root.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the project is not in the graph.
    pub fn project_root(&self, project: &str) -> Result<&'a Path> {
        self.graph
            .node(project)
            .map(|node| node.data.root.as_path())
            .ok_or_else(|| {
                Error::configuration(format!("project '{project}' is not in the project graph"))
            })
    }

    /// Sharing configuration of `libraries` as aliased by `mappings`.
    ///
    /// An empty alias table short-circuits to
    /// [`SharedWorkspaceLibraryConfig::empty`].
    ///
    /// # Errors
    ///
    /// Returns an error if secondary entry point metadata cannot be read.
    pub fn share_workspace_libraries(
        &self,
        libraries: &[WorkspaceLibrary],
        mappings: &PathMappings,
    ) -> Result<SharedWorkspaceLibraryConfig> {
        if mappings.is_empty() {
            tracing::debug!("No path mappings, no workspace libraries to share");
            return Ok(SharedWorkspaceLibraryConfig::empty());
        }

        let records =
            expand_path_mappings(self.workspace_root, libraries, mappings, self.entry_points)?;
        tracing::debug!(
            libraries = libraries.len(),
            aliases = records.len(),
            "Expanded path mappings"
        );

        Ok(SharedWorkspaceLibraryConfig::new(
            records,
            self.graph,
            &self.reader(),
            self.logger,
        ))
    }

    /// Sharing configuration of third-party `packages` for the project at
    /// `project_root`. See [`packages::share_packages`].
    ///
    /// # Errors
    ///
    /// Returns an error if the root or project manifest is missing.
    pub fn share_packages(
        &self,
        packages: &[String],
        project_root: &Path,
    ) -> Result<SharedConfigMap> {
        packages::share_packages(
            packages,
            project_root,
            &self.reader(),
            self.entry_points,
            self.logger,
        )
    }

    /// Layers `entries` on top of `shared`. See
    /// [`overrides::apply_additional_shared`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAdditionalDependency`] for names missing from
    /// the graph.
    pub fn apply_additional_shared(
        &self,
        shared: SharedConfigMap,
        entries: &[AdditionalShared],
        project_root: &Path,
    ) -> Result<SharedConfigMap> {
        overrides::apply_additional_shared(
            shared,
            entries,
            self.graph,
            &self.reader(),
            project_root,
            self.logger,
        )
    }

    /// Resolves the shared configuration of `project`, using the
    /// configuration's `exclude` and `overrides` as the shared function.
    ///
    /// # Errors
    ///
    /// See [`resolve_with`](Self::resolve_with).
    pub fn resolve(
        &self,
        project: &str,
        mappings: &PathMappings,
        config: &FederationConfig,
    ) -> Result<FederationShareConfig> {
        let function: &SharedFunction<'_> = &config.shared_function();
        let function = config.has_overrides().then_some(function);
        self.resolve_with(project, mappings, config, function)
    }

    /// Resolves the shared configuration of `project` with an explicit
    /// shared function.
    ///
    /// Workspace libraries come first, then third-party packages (a package
    /// named like a library replaces its policy), then the shared function,
    /// then `additionalShared`.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not in the graph, a required
    /// manifest is missing, or an `additionalShared` name is unknown.
    #[tracing::instrument(name = "resolve", skip_all, fields(project = %project))]
    pub fn resolve_with(
        &self,
        project: &str,
        mappings: &PathMappings,
        config: &FederationConfig,
        function: Option<&SharedFunction<'_>>,
    ) -> Result<FederationShareConfig> {
        let project_root = self.project_root(project)?;

        let libraries = workspace_libraries(self.graph, mappings, config.shared_libraries.as_deref());
        let library_config = self.share_workspace_libraries(&libraries, mappings)?;

        let mut shared = library_config.libraries(config.eager);
        shared.extend(self.share_packages(&config.shared_packages, project_root)?);

        let shared = apply_shared_function(shared, function);
        let shared = self.apply_additional_shared(shared, &config.additional_shared, project_root)?;

        tracing::info!(
            aliases = library_config.aliases().len(),
            shared = shared.len(),
            "Resolved shared dependencies"
        );

        Ok(FederationShareConfig {
            aliases: library_config.aliases(),
            shared,
            rewrite: library_config.rewrite_rule().clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logger::RecordingLogger;
    use crate::overrides::ShareDecision;
    use crate::policy::SharingPolicy;
    use fedshare_workspaces::{InMemoryManifestSource, PackageManifest};
    use serde_json::json;

    fn graph() -> ProjectGraph {
        serde_json::from_value(json!({
            "nodes": {
                "shell": { "name": "shell", "type": "app", "data": { "root": "apps/shell" } },
                "ui": {
                    "name": "ui",
                    "type": "lib",
                    "data": {
                        "root": "libs/ui",
                        "targets": {
                            "build": { "executor": "@nx/vite:build", "options": { "outputPath": "dist/libs/ui" } }
                        }
                    }
                },
                "data": { "name": "data", "type": "lib", "data": { "root": "libs/data" } }
            },
            "externalNodes": {
                "npm:zone.js": { "name": "npm:zone.js", "type": "npm", "data": { "version": "0.14.2" } }
            }
        }))
        .unwrap()
    }

    fn mappings() -> PathMappings {
        PathMappings::from([
            ("@acme/ui".to_string(), vec!["libs/ui/src/index.ts".to_string()]),
            ("@acme/data".to_string(), vec!["libs/data/src/index.ts".to_string()]),
            ("@acme/legacy".to_string(), vec!["libs/legacy/src/index.ts".to_string()]),
        ])
    }

    fn manifest(value: serde_json::Value) -> PackageManifest {
        serde_json::from_value(value).unwrap()
    }

    fn manifests() -> InMemoryManifestSource {
        InMemoryManifestSource::new()
            .with(
                "/ws/package.json",
                manifest(json!({ "dependencies": { "react": "^18.0.0", "lodash": "^4.17.21" } })),
            )
            .with(
                "/ws/apps/shell/package.json",
                manifest(json!({ "dependencies": { "react": "^18.2.0" } })),
            )
            .with(
                "/ws/dist/libs/ui/package.json",
                manifest(json!({ "name": "@acme/ui", "version": "1.2.3" })),
            )
    }

    fn config() -> FederationConfig {
        FederationConfig {
            shared_packages: vec!["react".to_string(), "lodash".to_string()],
            ..FederationConfig::default()
        }
    }

    #[test]
    fn test_resolve_full_pipeline() {
        let root = PathBuf::from("/ws");
        let graph = graph();
        let source = manifests();
        let logger = RecordingLogger::new();
        let resolver = ShareResolver::new(&root, &graph, &source).with_logger(&logger);

        let resolved = resolver.resolve("shell", &mappings(), &config()).unwrap();

        let keys: Vec<&str> = resolved.shared.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["@acme/ui", "@acme/data", "react", "lodash"]);
        assert_eq!(
            resolved.shared["@acme/ui"],
            SharingPolicy::versioned_library("1.2.3")
        );
        assert_eq!(
            resolved.shared["@acme/data"],
            SharingPolicy::unversioned(None)
        );
        assert_eq!(resolved.shared["react"], SharingPolicy::singleton("^18.2.0"));
        assert_eq!(
            resolved.aliases["@acme/ui"],
            PathBuf::from("/ws/libs/ui/src/index.ts")
        );
        assert!(!resolved.aliases.contains_key("@acme/legacy"));
        assert!(logger.warnings().is_empty());
    }

    #[test]
    fn test_resolve_applies_function_then_additional_shared() {
        let root = PathBuf::from("/ws");
        let graph = graph();
        let source = manifests();
        let logger = RecordingLogger::new();
        let resolver = ShareResolver::new(&root, &graph, &source).with_logger(&logger);
        let config = FederationConfig {
            additional_shared: vec![AdditionalShared::from("zone.js")],
            eager: Some(true),
            ..config()
        };
        let function: &SharedFunction<'_> = &|name, _| match name {
            "lodash" => ShareDecision::Remove,
            _ => ShareDecision::Keep,
        };

        let resolved = resolver
            .resolve_with("shell", &mappings(), &config, Some(function))
            .unwrap();

        assert!(!resolved.shared.contains_key("lodash"));
        assert_eq!(
            resolved.shared["@acme/data"],
            SharingPolicy::unversioned(Some(true))
        );
        assert_eq!(resolved.shared["zone.js"], SharingPolicy::singleton("0.14.2"));
        assert_eq!(resolved.shared.keys().last().map(String::as_str), Some("zone.js"));
    }

    #[test]
    fn test_resolve_uses_config_overrides() {
        let root = PathBuf::from("/ws");
        let graph = graph();
        let source = manifests();
        let logger = RecordingLogger::new();
        let resolver = ShareResolver::new(&root, &graph, &source).with_logger(&logger);
        let config = FederationConfig {
            exclude: vec!["@acme/data".to_string()],
            overrides: SharedConfigMap::from([(
                "react".to_string(),
                SharingPolicy::unversioned(Some(true)),
            )]),
            ..config()
        };

        let resolved = resolver.resolve("shell", &mappings(), &config).unwrap();

        assert!(!resolved.shared.contains_key("@acme/data"));
        assert_eq!(resolved.shared["react"], SharingPolicy::unversioned(Some(true)));
        assert!(resolved.aliases.contains_key("@acme/data"));
    }

    #[test]
    fn test_empty_mappings_yield_empty_library_config() {
        let root = PathBuf::from("/ws");
        let graph = graph();
        let source = manifests();
        let resolver = ShareResolver::new(&root, &graph, &source);

        let libraries = resolver
            .share_workspace_libraries(&[], &PathMappings::new())
            .unwrap();

        assert!(libraries.aliases().is_empty());
        assert!(libraries.libraries(Some(true)).is_empty());
        assert!(libraries.rewrite_rule().is_noop());
        assert_eq!(
            libraries
                .rewrite_rule()
                .rewrite("../../libs/ui/src/index", Path::new("/ws/apps/shell/src/main.ts")),
            None
        );
    }

    #[test]
    fn test_rewrite_rule_is_exposed() {
        let root = PathBuf::from("/ws");
        let graph = graph();
        let source = manifests();
        let logger = RecordingLogger::new();
        let resolver = ShareResolver::new(&root, &graph, &source).with_logger(&logger);

        let resolved = resolver.resolve("shell", &mappings(), &config()).unwrap();

        assert_eq!(
            resolved
                .rewrite
                .rewrite("../../../libs/ui/src/lib/button", Path::new("/ws/apps/shell/src/main.ts")),
            Some("@acme/ui")
        );
    }

    #[test]
    fn test_unknown_project_is_configuration_error() {
        let root = PathBuf::from("/ws");
        let graph = graph();
        let source = manifests();
        let resolver = ShareResolver::new(&root, &graph, &source);

        let err = resolver
            .resolve("missing", &mappings(), &config())
            .unwrap_err();

        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("'missing'"));
    }

    #[test]
    fn test_serialized_shape() {
        let root = PathBuf::from("/ws");
        let graph = graph();
        let source = manifests();
        let logger = RecordingLogger::new();
        let resolver = ShareResolver::new(&root, &graph, &source).with_logger(&logger);

        let resolved = resolver.resolve("shell", &mappings(), &config()).unwrap();
        let value = serde_json::to_value(&resolved).unwrap();

        assert_eq!(value["aliases"]["@acme/data"], json!("/ws/libs/data/src/index.ts"));
        assert_eq!(
            value["shared"]["react"],
            json!({ "requiredVersion": "^18.2.0", "singleton": true, "strictVersion": true })
        );
        assert!(value.get("rewrite").is_none());
    }
}
