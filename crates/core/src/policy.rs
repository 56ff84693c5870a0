//! Sharing policies and the shared-config map.
//!
//! A [`SharingPolicy`] serializes to the bundler's shared-module shape:
//!
//! ```json
//! { "requiredVersion": "^18.2.0", "singleton": true, "strictVersion": true }
//! { "requiredVersion": false, "eager": true }
//! ```

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dependency name to sharing policy, in insertion order.
///
/// Re-inserting a name keeps its original position and replaces the policy.
pub type SharedConfigMap = IndexMap<String, SharingPolicy>;

/// Version requirement of a shared module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum RequiredVersion {
    /// Shared without version negotiation (`false`).
    #[default]
    Unchecked,
    /// Semver requirement every consumer must satisfy.
    Version(String),
}

impl RequiredVersion {
    /// The requirement string, if version checking is enabled.
    #[must_use]
    pub fn as_version(&self) -> Option<&str> {
        match self {
            Self::Unchecked => None,
            Self::Version(version) => Some(version),
        }
    }
}

impl fmt::Display for RequiredVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchecked => f.write_str("false"),
            Self::Version(version) => f.write_str(version),
        }
    }
}

impl Serialize for RequiredVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unchecked => serializer.serialize_bool(false),
            Self::Version(version) => serializer.serialize_str(version),
        }
    }
}

impl<'de> Deserialize<'de> for RequiredVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Version(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(false) => Ok(Self::Unchecked),
            Raw::Flag(true) => Err(de::Error::custom(
                "requiredVersion must be a version string or false",
            )),
            Raw::Version(version) => Ok(Self::Version(version)),
        }
    }
}

/// How one dependency is shared between federated bundles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharingPolicy {
    /// Version every consumer must satisfy, or [`RequiredVersion::Unchecked`].
    #[serde(default)]
    pub required_version: RequiredVersion,

    /// Only one instance may be loaded workspace-wide.
    #[serde(default)]
    pub singleton: Option<bool>,

    /// Fail instead of warn when a loaded version does not satisfy the requirement.
    #[serde(default)]
    pub strict_version: Option<bool>,

    /// Load synchronously rather than on demand.
    #[serde(default)]
    pub eager: Option<bool>,
}

impl SharingPolicy {
    /// Policy for third-party packages: one strict instance of `version`.
    #[must_use]
    pub fn singleton(version: impl Into<String>) -> Self {
        Self {
            required_version: RequiredVersion::Version(version.into()),
            singleton: Some(true),
            strict_version: Some(true),
            eager: None,
        }
    }

    /// Policy for a built workspace library: strict on `version`, but
    /// independently versioned builds may coexist.
    #[must_use]
    pub fn versioned_library(version: impl Into<String>) -> Self {
        Self {
            required_version: RequiredVersion::Version(version.into()),
            singleton: Some(false),
            strict_version: Some(true),
            eager: None,
        }
    }

    /// Shares unconditionally, without version negotiation.
    #[must_use]
    pub fn unversioned(eager: Option<bool>) -> Self {
        Self {
            required_version: RequiredVersion::Unchecked,
            singleton: None,
            strict_version: None,
            eager,
        }
    }

    /// Whether a version requirement is enforced.
    #[must_use]
    pub fn is_versioned(&self) -> bool {
        matches!(self.required_version, RequiredVersion::Version(_))
    }

    /// Effective singleton flag. Meaningless, and therefore `None`, without a
    /// version requirement.
    #[must_use]
    pub fn effective_singleton(&self) -> Option<bool> {
        self.singleton.filter(|_| self.is_versioned())
    }

    /// Effective strict-version flag. `None` without a version requirement.
    #[must_use]
    pub fn effective_strict_version(&self) -> Option<bool> {
        self.strict_version.filter(|_| self.is_versioned())
    }
}

impl Serialize for SharingPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Wire<'a> {
            required_version: &'a RequiredVersion,
            #[serde(skip_serializing_if = "Option::is_none")]
            singleton: Option<bool>,
            #[serde(skip_serializing_if = "Option::is_none")]
            strict_version: Option<bool>,
            #[serde(skip_serializing_if = "Option::is_none")]
            eager: Option<bool>,
        }

        Wire {
            required_version: &self.required_version,
            singleton: self.effective_singleton(),
            strict_version: self.effective_strict_version(),
            eager: self.eager,
        }
        .serialize(serializer)
    }
}
