//! Request rewriting for relative imports that cross into a shared library.
//!
//! When application code reaches into a shared library through a relative
//! path (`../../libs/ui/src/button`), the bundler would otherwise load a
//! private copy of that file. The rule redirects such requests to the
//! library's shared module name. Relative imports inside the library itself
//! are left alone, otherwise the shared module would import itself.

use crate::libraries::AliasRecord;
use fedshare_workspaces::normalize_path;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
struct LibraryBoundary {
    folder: PathBuf,
    name: String,
}

/// Rewrites relative requests crossing a shared library folder boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestRewriteRule {
    boundaries: Vec<LibraryBoundary>,
}

impl RequestRewriteRule {
    /// A rule that never rewrites.
    #[must_use]
    pub fn noop() -> Self {
        Self::default()
    }

    /// Builds the rule from alias records. Each record's folder is the
    /// directory containing its entry file.
    #[must_use]
    pub fn from_records(records: &[AliasRecord]) -> Self {
        let boundaries = records
            .iter()
            .map(|record| LibraryBoundary {
                folder: normalize_path(
                    record
                        .absolute_path
                        .parent()
                        .unwrap_or(&record.absolute_path),
                ),
                name: record.name.clone(),
            })
            .collect();

        Self { boundaries }
    }

    /// Whether the rule can never rewrite anything.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Shared module name `request` should be redirected to, if any.
    ///
    /// `issuer` is the absolute path of the file containing the import. Only
    /// relative requests are considered. When several libraries match, the
    /// last one in alias order wins.
    #[must_use]
    pub fn rewrite(&self, request: &str, issuer: &Path) -> Option<&str> {
        if !request.starts_with('.') {
            return None;
        }

        let context = issuer.parent().unwrap_or(issuer);
        let from = normalize_path(issuer);
        let to = normalize_path(&context.join(request));

        let rewritten = self
            .boundaries
            .iter()
            .filter(|boundary| !from.starts_with(&boundary.folder) && to.starts_with(&boundary.folder))
            .map(|boundary| boundary.name.as_str())
            .last();

        if let Some(name) = rewritten {
            tracing::trace!(request, issuer = %issuer.display(), name, "Rewrote request");
        }
        rewritten
    }

    /// `request`, or the shared module name it is redirected to.
    #[must_use]
    pub fn apply<'a>(&'a self, request: &'a str, issuer: &Path) -> &'a str {
        self.rewrite(request, issuer).unwrap_or(request)
    }
}
