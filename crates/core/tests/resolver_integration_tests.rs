//! End-to-end share resolution against a workspace on disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use fedshare_core::{
    Error, FederationConfig, RecordingLogger, ShareResolver, SharedConfigMap, SharingPolicy,
};
use fedshare_workspaces::{
    FsManifestSource, ProjectGraph, WorkspaceEntryPoints, find_root_tsconfig, read_path_mappings,
};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A workspace with one app, a built library with a secondary entry point,
/// an unbuilt library and an installed package exporting subpaths.
fn workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(
        root,
        "package.json",
        r#"{
            "name": "acme",
            "dependencies": { "react": "^18.0.0", "rxjs": "^7.8.0" },
            "devDependencies": { "lodash": "^4.17.21" }
        }"#,
    );
    write(
        root,
        "tsconfig.base.json",
        r#"{
            // shared aliases
            "compilerOptions": {
                "paths": {
                    "@acme/ui": ["libs/ui/src/index.ts"],
                    "@acme/ui/testing": ["libs/ui/testing/src/index.ts"],
                    "@acme/ui/*": ["libs/ui/*"],
                    "@acme/data": ["libs/data/src/index.ts", "libs/data/legacy.ts"],
                    "@acme/tools": ["tools/src/index.ts"],
                },
            },
        }"#,
    );
    write(
        root,
        "graph.json",
        &json!({
            "nodes": {
                "shell": { "name": "shell", "type": "app", "data": { "root": "apps/shell" } },
                "ui": {
                    "name": "ui",
                    "type": "lib",
                    "data": {
                        "root": "libs/ui",
                        "targets": {
                            "build": { "executor": "@nx/angular:package", "options": { "outputPath": "dist/libs/ui" } }
                        }
                    }
                },
                "data": { "name": "data", "type": "lib", "data": { "root": "libs/data" } }
            },
            "externalNodes": {
                "npm:zone.js": { "name": "npm:zone.js", "type": "npm", "data": { "version": "0.14.2" } }
            }
        })
        .to_string(),
    );
    write(
        root,
        "apps/shell/package.json",
        r#"{ "dependencies": { "react": "^18.2.0" } }"#,
    );
    write(root, "libs/ui/ng-package.json", "{}");
    write(root, "dist/libs/ui/package.json", r#"{ "name": "@acme/ui", "version": "1.2.3" }"#);
    write(
        root,
        "node_modules/rxjs/package.json",
        r#"{
            "name": "rxjs",
            "exports": { ".": "./dist/index.js", "./operators": "./dist/operators/index.js", "./package.json": "./package.json" }
        }"#,
    );

    temp
}

fn resolve(root: &Path, config: &FederationConfig) -> (fedshare_core::Result<SharedConfigMap>, Vec<String>) {
    let graph = ProjectGraph::from_file(&root.join("graph.json")).unwrap();
    let tsconfig = find_root_tsconfig(root).expect("tsconfig.base.json exists");
    let mappings = read_path_mappings(&tsconfig).unwrap();
    let entry_points = WorkspaceEntryPoints::new(root, &FsManifestSource);
    let logger = RecordingLogger::new();

    let resolver = ShareResolver::new(root, &graph, &FsManifestSource)
        .with_entry_points(&entry_points)
        .with_logger(&logger);
    let shared = resolver
        .resolve("shell", &mappings, config)
        .map(|resolved| resolved.shared);

    (shared, logger.warnings())
}

#[test]
fn test_resolve_workspace_on_disk() {
    let temp = workspace();
    let config = FederationConfig {
        shared_packages: vec!["react".to_string(), "rxjs".to_string(), "lodash".to_string()],
        ..FederationConfig::default()
    };

    let (shared, warnings) = resolve(temp.path(), &config);
    let shared = shared.unwrap();

    let keys: Vec<&str> = shared.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "@acme/ui/testing",
            "@acme/ui",
            "@acme/data",
            "react",
            "rxjs",
            "rxjs/operators",
            "lodash"
        ]
    );
    assert_eq!(shared["@acme/ui"], SharingPolicy::versioned_library("1.2.3"));
    assert_eq!(
        shared["@acme/ui/testing"],
        SharingPolicy::versioned_library("1.2.3")
    );
    assert_eq!(shared["@acme/data"], SharingPolicy::unversioned(None));
    assert_eq!(shared["react"], SharingPolicy::singleton("^18.2.0"));
    assert_eq!(shared["rxjs/operators"], SharingPolicy::singleton("^7.8.0"));
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
}

#[test]
fn test_resolve_with_config_file() {
    let temp = workspace();
    write(
        temp.path(),
        "apps/shell/federation.json",
        r#"{
            "sharedPackages": ["react", "lodash", "left-pad"],
            "sharedLibraries": ["data"],
            "additionalShared": ["zone.js", { "libraryName": "tslib", "sharedConfig": { "requiredVersion": false } }],
            "eager": true,
            "exclude": ["lodash"]
        }"#,
    );
    let config = FederationConfig::load(&temp.path().join("apps/shell")).unwrap();

    let (shared, warnings) = resolve(temp.path(), &config);
    let shared = shared.unwrap();

    let keys: Vec<&str> = shared.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["@acme/data", "react", "zone.js", "tslib"]);
    assert_eq!(shared["@acme/data"], SharingPolicy::unversioned(Some(true)));
    assert_eq!(shared["zone.js"], SharingPolicy::singleton("0.14.2"));
    assert_eq!(shared["tslib"], SharingPolicy::unversioned(None));
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("\"left-pad\""));
}

#[test]
fn test_unknown_additional_shared_aborts() {
    let temp = workspace();
    let config: FederationConfig = serde_json::from_value(json!({
        "sharedPackages": ["react"],
        "additionalShared": ["zone.js", "some-workspace-lib"]
    }))
    .unwrap();

    let (shared, _) = resolve(temp.path(), &config);

    match shared.unwrap_err() {
        Error::UnknownAdditionalDependency { name, applied } => {
            assert_eq!(name, "some-workspace-lib");
            assert!(applied.contains_key("react"));
            assert!(applied.contains_key("zone.js"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_project_manifest_aborts() {
    let temp = workspace();
    fs::remove_file(temp.path().join("apps/shell/package.json")).unwrap();
    let config = FederationConfig {
        shared_packages: vec!["react".to_string()],
        ..FederationConfig::default()
    };

    let (shared, _) = resolve(temp.path(), &config);

    assert!(matches!(
        shared.unwrap_err(),
        Error::Workspace(fedshare_workspaces::Error::ManifestNotFound { .. })
    ));
}

#[test]
fn test_missing_build_output_degrades_with_warning() {
    let temp = workspace();
    fs::remove_dir_all(temp.path().join("dist")).unwrap();

    let (shared, warnings) = resolve(temp.path(), &FederationConfig::default());
    let shared = shared.unwrap();

    assert_eq!(shared["@acme/ui"], SharingPolicy::unversioned(None));
    assert_eq!(shared["@acme/ui/testing"], SharingPolicy::unversioned(None));
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("\"ui\""));
}

#[test]
fn test_secondary_alias_listed_before_primary() {
    let temp = workspace();
    write(
        temp.path(),
        "tsconfig.base.json",
        r#"{
            "compilerOptions": {
                "paths": {
                    "@acme/ui/*": ["libs/ui/*"],
                    "@acme/ui/testing": ["libs/ui/testing/src/index.ts"],
                    "@acme/ui": ["libs/ui/src/index.ts"]
                }
            }
        }"#,
    );

    let (shared, warnings) = resolve(temp.path(), &FederationConfig::default());
    let shared = shared.unwrap();

    let keys: Vec<&str> = shared.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["@acme/ui/testing", "@acme/ui"]);
    assert_eq!(shared["@acme/ui"], SharingPolicy::versioned_library("1.2.3"));
    assert!(!shared.contains_key("@acme/ui/*"));
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
}
