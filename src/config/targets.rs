//! Export targets loaded from the YAML document.
//!
//! ```yaml
//! spaces:
//!   - ENG                 # whole space
//!   - OPS:                # named pages and their descendants
//!       - "Runbooks"
//!       - "On-call"
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

use super::ConfigError;
use crate::hierarchy::{PageSelection, SpaceTarget};

#[derive(Debug, Deserialize)]
struct TargetDocument {
    #[serde(default)]
    spaces: Option<Vec<Value>>,
}

/// Loads export targets from a YAML file.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file is missing, unreadable, malformed,
/// or defines no spaces.
pub fn load_targets(path: &Path) -> Result<Vec<SpaceTarget>, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::ConfigFileNotFound {
            path: path.to_path_buf(),
        });
    }
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_targets(&raw, path)
}

/// Parses export targets from YAML text. `origin` is only used in error messages.
///
/// # Errors
///
/// Returns [`ConfigError`] for malformed YAML, unsupported entries, or an empty list.
pub fn parse_targets(raw: &str, origin: &Path) -> Result<Vec<SpaceTarget>, ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::NoSpaces {
            path: origin.to_path_buf(),
        });
    }
    let document: Option<TargetDocument> =
        serde_yaml::from_str(raw).map_err(|source| ConfigError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })?;

    let entries = document.and_then(|d| d.spaces).unwrap_or_default();
    let mut targets = Vec::new();
    for (position, entry) in entries.iter().enumerate() {
        targets.extend(entry_targets(position + 1, entry)?);
    }

    if targets.is_empty() {
        return Err(ConfigError::NoSpaces {
            path: origin.to_path_buf(),
        });
    }
    debug!(path = %origin.display(), targets = targets.len(), "loaded export targets");
    Ok(targets)
}

fn entry_targets(index: usize, entry: &Value) -> Result<Vec<SpaceTarget>, ConfigError> {
    if let Some(space_key) = scalar_text(entry) {
        return Ok(vec![SpaceTarget::new(
            space_key_or_error(index, space_key)?,
            PageSelection::WholeSpace,
        )]);
    }

    let Value::Mapping(mapping) = entry else {
        return Err(ConfigError::invalid_entry(
            index,
            "expected a space key or a mapping of space key to page titles",
        ));
    };

    let mut targets = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let space_key = scalar_text(key)
            .ok_or_else(|| ConfigError::invalid_entry(index, "space key must be a string"))?;
        let space_key = space_key_or_error(index, space_key)?;
        let selection = match value {
            Value::Null => PageSelection::WholeSpace,
            Value::Sequence(items) => {
                let titles = items
                    .iter()
                    .map(|item| {
                        scalar_text(item).ok_or_else(|| {
                            ConfigError::invalid_entry(
                                index,
                                format!("page titles under `{space_key}` must be strings"),
                            )
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                PageSelection::from_titles(titles)
            }
            _ => {
                return Err(ConfigError::invalid_entry(
                    index,
                    format!("`{space_key}` must map to a list of page titles"),
                ));
            }
        };
        targets.push(SpaceTarget::new(space_key, selection));
    }
    Ok(targets)
}

fn space_key_or_error(index: usize, raw: String) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::invalid_entry(index, "space key is empty"));
    }
    Ok(trimmed.to_string())
}

/// YAML turns unquoted titles like `2024` or `yes` into numbers and booleans.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
