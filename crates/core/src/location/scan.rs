//! Directory scanning for configuration locations

use super::ConfigLocation;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Backups (`config.json.bak.1700000000`) and templates (`DirLocations.toml.dist`)
static IGNORED_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^\.{1,2}$|\.(bak|dist)(\.|$))").expect("valid ignore pattern"));

/// Whether a directory entry is skipped when scanning for configs
pub fn is_ignored_entry(name: &str) -> bool {
    IGNORED_ENTRY.is_match(name)
}

/// All configuration locations directly inside `path`, in file name order.
///
/// A missing or unreadable directory yields an empty list.
pub fn config_locations_in_path(path: &Path) -> Vec<ConfigLocation> {
    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| !is_ignored_entry(name))
        .collect();
    names.sort();

    names
        .into_iter()
        .filter_map(|name| ConfigLocation::on_path(path.join(name)))
        .collect()
}

/// Find the location for `config_name` inside `path`.
///
/// An entry whose file name equals `config_name` wins; otherwise the last
/// entry (in file name order) whose config name matches is used.
pub fn matching_config_location(path: &Path, config_name: &str) -> Option<ConfigLocation> {
    let mut name_match = None;
    for location in config_locations_in_path(path) {
        if location.file_name() == config_name {
            return Some(location);
        }
        if location.config_name() == config_name {
            name_match = Some(location);
        }
    }
    name_match
}
