//! Compile-time path alias tables (`compilerOptions.paths`).
//!
//! Tsconfig files are JSON with comments and trailing commas, so they are read
//! with `jsonc-parser` and converted into `serde_json` values. Alias order is
//! preserved because it determines the order of the generated alias records.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Alias key to ordered candidate paths, relative to the workspace root.
pub type PathMappings = IndexMap<String, Vec<String>>;

/// Tsconfig file names probed in the workspace root, in order.
pub const TSCONFIG_CANDIDATES: [&str; 2] = ["tsconfig.base.json", "tsconfig.json"];

/// Whether an alias is a wildcard pattern (`@acme/ui/*`) rather than a module.
#[must_use]
pub fn is_wildcard_alias(alias: &str, candidates: &[String]) -> bool {
    alias.contains('*') || candidates.first().is_some_and(|primary| primary.contains('*'))
}

/// Finds the workspace's root tsconfig.
#[must_use]
pub fn find_root_tsconfig(workspace_root: &Path) -> Option<PathBuf> {
    TSCONFIG_CANDIDATES
        .iter()
        .map(|name| workspace_root.join(name))
        .find(|path| path.is_file())
}

/// Reads the path alias table from a tsconfig file.
///
/// A file without `compilerOptions.paths` yields an empty table.
///
/// # Errors
///
/// Returns [`Error::PathMappingsNotFound`] if the file does not exist, and
/// [`Error::InvalidPathMappings`] if it cannot be parsed or an alias does not
/// map to an array of strings.
pub fn read_path_mappings(tsconfig: &Path) -> Result<PathMappings> {
    if !tsconfig.is_file() {
        return Err(Error::PathMappingsNotFound {
            path: tsconfig.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(tsconfig).map_err(|source| Error::Io {
        source,
        path: Some(tsconfig.to_path_buf()),
        operation: "reading tsconfig".to_string(),
    })?;

    parse_path_mappings(&contents, tsconfig)
}

/// Parses the path alias table out of tsconfig contents.
///
/// # Errors
///
/// Returns [`Error::InvalidPathMappings`] on malformed input.
pub fn parse_path_mappings(contents: &str, origin: &Path) -> Result<PathMappings> {
    let invalid = |message: String| Error::InvalidPathMappings {
        path: origin.to_path_buf(),
        message,
    };

    let parsed = jsonc_parser::parse_to_value(contents, &jsonc_parser::ParseOptions::default())
        .map_err(|err| invalid(format!("Failed to parse as JSONC: {err:?}")))?;
    let Some(parsed) = parsed else {
        return Ok(PathMappings::new());
    };

    let value = convert_jsonc_to_serde_value(parsed);
    let Some(paths) = value
        .get("compilerOptions")
        .and_then(|options| options.get("paths"))
    else {
        return Ok(PathMappings::new());
    };

    let Value::Object(paths) = paths else {
        return Err(invalid("'compilerOptions.paths' is not an object".to_string()));
    };

    let mut mappings = PathMappings::with_capacity(paths.len());
    for (alias, candidates) in paths {
        let Value::Array(candidates) = candidates else {
            return Err(invalid(format!("alias '{alias}' is not an array")));
        };

        let candidates = candidates
            .iter()
            .map(|candidate| {
                candidate
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(format!("alias '{alias}' has a non-string path")))
            })
            .collect::<Result<Vec<_>>>()?;

        mappings.insert(alias.clone(), candidates);
    }

    tracing::debug!(
        path = %origin.display(),
        aliases = mappings.len(),
        "Read path mappings"
    );

    Ok(mappings)
}

// Convert jsonc_parser::JsonValue to serde_json::Value
fn convert_jsonc_to_serde_value(jsonc_value: jsonc_parser::JsonValue) -> Value {
    match jsonc_value {
        jsonc_parser::JsonValue::Null => Value::Null,
        jsonc_parser::JsonValue::Boolean(b) => Value::Bool(b),
        jsonc_parser::JsonValue::Number(n) => {
            if let Ok(i) = n.parse::<i64>() {
                Value::Number(i.into())
            } else if let Ok(f) = n.parse::<f64>() {
                serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
            } else {
                Value::Null
            }
        }
        jsonc_parser::JsonValue::String(s) => Value::String(s.to_string()),
        jsonc_parser::JsonValue::Array(arr) => {
            Value::Array(arr.into_iter().map(convert_jsonc_to_serde_value).collect())
        }
        jsonc_parser::JsonValue::Object(obj) => {
            let mut map = serde_json::Map::new();
            for (key, value) in obj {
                map.insert(key, convert_jsonc_to_serde_value(value));
            }
            Value::Object(map)
        }
    }
}
