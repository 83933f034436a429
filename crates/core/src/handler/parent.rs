//! `Parent_Config` inheritance declarations shared by the structured handlers
//!
//! ```toml
//! [Parent_Config]
//! relative_path = "../shared/config.toml"
//! override_full_sections = ["Index", "Authentication"]
//! merge_array_settings = true
//! ```

use crate::config::MergeStrategy;
use crate::error::{Error, Result};
use crate::location::ConfigLocation;
use serde_json::{Map, Value};
use std::path::PathBuf;

pub(crate) const PARENT_CONFIG_SECTION: &str = "Parent_Config";

#[derive(Debug, Default, PartialEq)]
pub(crate) struct ParentConfig {
    pub parent_location: Option<ConfigLocation>,
    pub merge_strategy: Option<MergeStrategy>,
}

/// Remove the `Parent_Config` section from `data` and interpret it
pub(crate) fn extract_parent_config(
    location: &ConfigLocation,
    data: &mut Map<String, Value>,
) -> Result<ParentConfig> {
    let section = match data.shift_remove(PARENT_CONFIG_SECTION) {
        None | Some(Value::Null) => return Ok(ParentConfig::default()),
        Some(Value::Object(section)) => section,
        Some(_) => {
            return Err(Error::parse(
                &location.path(),
                format!("{PARENT_CONFIG_SECTION} must be a section"),
            ));
        }
    };

    let parent_path = if let Some(path) = section.get("path").and_then(Value::as_str) {
        Some(PathBuf::from(path))
    } else {
        section
            .get("relative_path")
            .and_then(Value::as_str)
            .map(|relative| location.base_path().join(relative))
    };

    let parent_location = match parent_path {
        Some(path) => Some(parent_location_on_path(location, path)),
        None if flag(&section, "use_parent_dir") => location.dir_locations_parent().cloned(),
        None => None,
    };

    let override_full_sections = list_setting(section.get("override_full_sections"));
    let merge_array_settings = flag(&section, "merge_array_settings");
    let merge_strategy = if override_full_sections.is_empty() && !merge_array_settings {
        None
    } else {
        Some(MergeStrategy::Sectioned {
            override_full_sections,
            merge_array_settings,
        })
    };

    if let Some(parent) = &parent_location {
        tracing::debug!("{} declares parent {}", location, parent);
    }

    Ok(ParentConfig {
        parent_location,
        merge_strategy,
    })
}

/// A parent keeps the child's config name and directory-stack parent.
///
/// Missing parents are still returned so the loader reports them as
/// `NotFound` with the offending path.
fn parent_location_on_path(child: &ConfigLocation, path: PathBuf) -> ConfigLocation {
    ConfigLocation::on_path(&path)
        .unwrap_or_else(|| ConfigLocation::file(&path))
        .with_config_name(child.config_name())
        .with_dir_locations_parent(child.dir_locations_parent().cloned())
}

fn flag(section: &Map<String, Value>, key: &str) -> bool {
    match section.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "yes" | "on"),
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    }
}

/// Accepts `["A", "B"]` or `"A, B"`
fn list_setting(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(Value::String(list)) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}
