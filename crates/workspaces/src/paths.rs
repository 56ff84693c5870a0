//! Lexical path helpers.
//!
//! Paths coming out of path-mapping tables and bundler requests are joined and
//! normalized without touching the filesystem, so that a library folder and an
//! import target compare equal regardless of `.`/`..` segments or whether the
//! referenced file exists yet.

use std::path::{Component, Path, PathBuf};

/// Normalizes a path lexically, resolving `.` and `..` segments.
///
/// `..` above the root of an absolute path is dropped; `..` at the start of a
/// relative path is kept.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                Some(Component::ParentDir | Component::CurDir) | None => {
                    normalized.push("..");
                }
            },
            Component::Normal(segment) => normalized.push(segment),
        }
    }

    normalized
}

/// Joins `fragment` onto `base` and normalizes the result.
#[must_use]
pub fn join_normalized(base: &Path, fragment: impl AsRef<Path>) -> PathBuf {
    normalize_path(&base.join(fragment))
}
