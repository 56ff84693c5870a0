//! Version resolution for third-party packages.

use crate::logger::Logger;
use crate::policy::SharingPolicy;
use fedshare_workspaces::PackageManifest;
use std::path::Path;

/// Effective version of `package` for a project.
///
/// The project's own manifest wins over the workspace root manifest; within a
/// manifest `dependencies` wins over `devDependencies`. Empty requirements
/// count as absent.
#[must_use]
pub fn effective_version<'m>(
    package: &str,
    project: &'m PackageManifest,
    root: &'m PackageManifest,
) -> Option<&'m str> {
    let declared = |manifest: &'m PackageManifest| {
        manifest
            .dependency_version(package)
            .filter(|version| !version.is_empty())
    };

    declared(project).or_else(|| declared(root))
}

/// Builds the sharing policy for `package` at `version`.
///
/// Without a version the package is left out of the shared map (it stays
/// bundled by whichever application imports it) and a warning naming the
/// package and the project root that was searched is logged.
#[must_use]
pub fn npm_share_policy(
    package: &str,
    version: Option<&str>,
    project_root: &Path,
    logger: &dyn Logger,
) -> Option<SharingPolicy> {
    match version.filter(|version| !version.is_empty()) {
        Some(version) => Some(SharingPolicy::singleton(version)),
        None => {
            logger.warn(&format!(
                "Could not find a version for \"{package}\" in \"package.json\" files from {} \
                 when collecting shared packages for the Module Federation setup. \
                 The package will not be shared.",
                project_root.display()
            ));
            None
        }
    }
}
