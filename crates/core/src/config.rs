//! Declarative federation configuration.
//!
//! Projects describe what they share in a `federation.json` next to their
//! `package.json`:
//!
//! ```json
//! {
//!   "sharedPackages": ["react", "react-dom", "rxjs"],
//!   "sharedLibraries": ["ui", "data-access"],
//!   "additionalShared": ["zone.js"],
//!   "eager": true,
//!   "exclude": ["lodash"],
//!   "overrides": { "rxjs": { "requiredVersion": "^7.8.0", "singleton": true } }
//! }
//! ```

use crate::error::Result;
use crate::overrides::{AdditionalShared, ShareDecision};
use crate::policy::{SharedConfigMap, SharingPolicy};
use fedshare_workspaces::manifest::read_json_file;
use serde::Deserialize;
use std::path::Path;

/// Federation settings of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FederationConfig {
    /// Third-party packages to share.
    #[serde(default)]
    pub shared_packages: Vec<String>,

    /// Workspace libraries to share. Every library with an alias when unset.
    #[serde(default)]
    pub shared_libraries: Option<Vec<String>>,

    /// Entries layered on top after the user transform.
    #[serde(default)]
    pub additional_shared: Vec<AdditionalShared>,

    /// Eagerness of unversioned workspace libraries.
    #[serde(default)]
    pub eager: Option<bool>,

    /// Names removed from the shared config.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Policies replacing the resolved ones.
    #[serde(default)]
    pub overrides: SharedConfigMap,
}

impl FederationConfig {
    /// Default configuration file name.
    pub const FILE_NAME: &'static str = "federation.json";

    /// Loads the configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config = read_json_file(path)?;
        tracing::debug!(path = %path.display(), "Loaded federation config");
        Ok(config)
    }

    /// Loads `federation.json` from `dir`, or the default configuration when
    /// there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(Self::FILE_NAME);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            tracing::debug!(path = %path.display(), "No federation config, using defaults");
            Ok(Self::default())
        }
    }

    /// Whether `exclude` or `overrides` change anything.
    #[must_use]
    pub fn has_overrides(&self) -> bool {
        !self.exclude.is_empty() || !self.overrides.is_empty()
    }

    /// Decision of `exclude` and `overrides` for one entry. Exclusion wins.
    #[must_use]
    pub fn decide(&self, name: &str, _policy: &SharingPolicy) -> ShareDecision {
        if self.exclude.iter().any(|excluded| excluded == name) {
            return ShareDecision::Remove;
        }
        self.overrides
            .get(name)
            .map_or(ShareDecision::Keep, |policy| {
                ShareDecision::Replace(policy.clone())
            })
    }

    /// [`decide`](Self::decide) as a shared function.
    pub fn shared_function(&self) -> impl Fn(&str, &SharingPolicy) -> ShareDecision + '_ {
        move |name: &str, policy: &SharingPolicy| self.decide(name, policy)
    }
}
