//! Sharing third-party packages.

use crate::error::Result;
use crate::logger::Logger;
use crate::policy::SharedConfigMap;
use crate::version::{effective_version, npm_share_policy};
use fedshare_workspaces::{ManifestReader, SecondaryEntryPoints};
use std::path::Path;

/// Builds the shared config for `packages` as seen from the project at
/// `project_root`.
///
/// Versions come from the project's manifest first and the workspace root
/// manifest second. Each package with a version also contributes its
/// secondary entry points at the same version. Packages without a version are
/// dropped with a warning. Output order follows `packages`, each package
/// followed by its entry points; repeated names keep their first position.
///
/// # Errors
///
/// Returns [`fedshare_workspaces::Error::ManifestNotFound`] when the root or
/// project manifest is missing.
pub fn share_packages(
    packages: &[String],
    project_root: &Path,
    reader: &ManifestReader<'_>,
    entry_points: &dyn SecondaryEntryPoints,
    logger: &dyn Logger,
) -> Result<SharedConfigMap> {
    let root_manifest = reader.read_root()?;
    let project_manifest = reader.read_project(project_root)?;

    let mut collected: Vec<(String, Option<String>)> = Vec::with_capacity(packages.len());

    for package in packages {
        let version = effective_version(package, &project_manifest, &root_manifest);
        push_unique(&mut collected, package.clone(), version.map(str::to_string));

        let Some(version) = version else {
            continue;
        };
        for entry_point in entry_points.package_entry_points(package, version, project_root)? {
            push_unique(&mut collected, entry_point.name, Some(entry_point.version));
        }
    }

    let shared: SharedConfigMap = collected
        .into_iter()
        .filter_map(|(name, version)| {
            npm_share_policy(&name, version.as_deref(), project_root, logger)
                .map(|policy| (name, policy))
        })
        .collect();

    tracing::debug!(
        project = %project_root.display(),
        requested = packages.len(),
        shared = shared.len(),
        "Shared npm packages"
    );

    Ok(shared)
}

fn push_unique(collected: &mut Vec<(String, Option<String>)>, name: String, version: Option<String>) {
    if !collected.iter().any(|(existing, _)| *existing == name) {
        collected.push((name, version));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logger::RecordingLogger;
    use crate::policy::SharingPolicy;
    use fedshare_workspaces::{
        Error as WorkspaceError, InMemoryManifestSource, NoSecondaryEntryPoints, PackageManifest,
        WorkspaceEntryPoints,
    };
    use std::path::PathBuf;

    fn manifest(json: &str) -> PackageManifest {
        serde_json::from_str(json).unwrap()
    }

    fn manifests() -> InMemoryManifestSource {
        InMemoryManifestSource::new()
            .with(
                "/ws/package.json",
                manifest(
                    r#"{
                        "dependencies": { "react": "^18.0.0", "react-dom": "^18.0.0", "rxjs": "^7.8.0" },
                        "devDependencies": { "lodash": "^4.17.21" }
                    }"#,
                ),
            )
            .with(
                "/ws/apps/shell/package.json",
                manifest(r#"{ "dependencies": { "react": "^18.2.0" } }"#),
            )
    }

    fn names(packages: &[&str]) -> Vec<String> {
        packages.iter().map(|p| (*p).to_string()).collect()
    }

    #[test]
    fn test_project_version_wins() {
        let root = PathBuf::from("/ws");
        let source = manifests();
        let reader = ManifestReader::new(&source, &root);
        let logger = RecordingLogger::new();

        let shared = share_packages(
            &names(&["react", "react-dom", "lodash"]),
            Path::new("apps/shell"),
            &reader,
            &NoSecondaryEntryPoints,
            &logger,
        )
        .unwrap();

        assert_eq!(shared["react"], SharingPolicy::singleton("^18.2.0"));
        assert_eq!(shared["react-dom"], SharingPolicy::singleton("^18.0.0"));
        assert_eq!(shared["lodash"], SharingPolicy::singleton("^4.17.21"));
        let keys: Vec<&str> = shared.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["react", "react-dom", "lodash"]);
        assert!(logger.warnings().is_empty());
    }

    #[test]
    fn test_unknown_package_is_excluded_with_one_warning() {
        let root = PathBuf::from("/ws");
        let source = manifests();
        let reader = ManifestReader::new(&source, &root);
        let logger = RecordingLogger::new();

        let shared = share_packages(
            &names(&["react", "left-pad"]),
            Path::new("apps/shell"),
            &reader,
            &NoSecondaryEntryPoints,
            &logger,
        )
        .unwrap();

        assert!(!shared.contains_key("left-pad"));
        assert_eq!(shared.len(), 1);
        let warnings = logger.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("\"left-pad\""));
        assert!(warnings[0].contains("apps/shell"));
    }

    #[test]
    fn test_secondary_entry_points_follow_their_package() {
        let root = PathBuf::from("/ws");
        let source = manifests().with(
            "/ws/node_modules/rxjs/package.json",
            manifest(r#"{ "exports": { ".": "./index.js", "./operators": "./operators/index.js" } }"#),
        );
        let reader = ManifestReader::new(&source, &root);
        let entry_points = WorkspaceEntryPoints::new(&root, &source);
        let logger = RecordingLogger::new();

        let shared = share_packages(
            &names(&["rxjs", "react"]),
            Path::new("apps/shell"),
            &reader,
            &entry_points,
            &logger,
        )
        .unwrap();

        let keys: Vec<&str> = shared.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["rxjs", "rxjs/operators", "react"]);
        assert_eq!(shared["rxjs/operators"], SharingPolicy::singleton("^7.8.0"));
    }

    #[test]
    fn test_duplicate_package_is_shared_once() {
        let root = PathBuf::from("/ws");
        let source = manifests();
        let reader = ManifestReader::new(&source, &root);
        let logger = RecordingLogger::new();

        let shared = share_packages(
            &names(&["vue", "react", "vue"]),
            Path::new("apps/shell"),
            &reader,
            &NoSecondaryEntryPoints,
            &logger,
        )
        .unwrap();

        assert_eq!(shared.len(), 1);
        assert_eq!(logger.warnings().len(), 1);
    }

    #[test]
    fn test_missing_project_manifest_is_fatal() {
        let root = PathBuf::from("/ws");
        let source = manifests();
        let reader = ManifestReader::new(&source, &root);
        let logger = RecordingLogger::new();

        let err = share_packages(
            &names(&["react"]),
            Path::new("apps/remote"),
            &reader,
            &NoSecondaryEntryPoints,
            &logger,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            crate::Error::Workspace(WorkspaceError::ManifestNotFound { .. })
        ));
    }
}
