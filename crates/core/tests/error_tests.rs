//! Tests for error types

use fedshare_core::{Error, SharedConfigMap, SharingPolicy};
use miette::Diagnostic;
use std::path::PathBuf;

#[test]
fn test_configuration_error() {
    let error = Error::configuration("config is invalid");
    assert_eq!(error.to_string(), "Configuration error: config is invalid");

    let error = Error::configuration(String::from("another config error"));
    assert_eq!(
        error.to_string(),
        "Configuration error: another config error"
    );
    assert_eq!(
        error.code().map(|c| c.to_string()),
        Some("fedshare::core::configuration".to_string())
    );
}

#[test]
fn test_unknown_additional_dependency_error() {
    let applied = SharedConfigMap::from([("react".to_string(), SharingPolicy::singleton("^18.2.0"))]);
    let error = Error::UnknownAdditionalDependency {
        name: "some-workspace-lib".to_string(),
        applied: Box::new(applied),
    };

    assert_eq!(
        error.to_string(),
        "The specified dependency \"some-workspace-lib\" in the additionalShared configuration does not exist in the project graph"
    );
    assert_eq!(
        error.code().map(|c| c.to_string()),
        Some("fedshare::core::unknown_additional_dependency".to_string())
    );
    assert!(
        error
            .help()
            .map(|h| h.to_string())
            .is_some_and(|h| h.contains("additionalShared"))
    );
}

#[test]
fn test_manifest_not_found_conversion() {
    let error = Error::from(fedshare_workspaces::Error::ManifestNotFound {
        path: PathBuf::from("/ws/apps/shell/package.json"),
    });

    assert!(error.to_string().contains("/ws/apps/shell/package.json"));
    assert!(error.help().is_some());
}

#[test]
fn test_io_error_conversion() {
    use std::io;

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
    let error = Error::from(fedshare_workspaces::Error::Io {
        source: io_error,
        path: Some(PathBuf::from("/ws/tsconfig.base.json")),
        operation: "reading tsconfig".to_string(),
    });
    assert!(error.to_string().contains("I/O"));
    assert!(error.to_string().contains("tsconfig.base.json"));
}
