use super::{ConfigHandler, RawConfigRecord};
use crate::error::Result;
use crate::location::{ConfigLocation, config_locations_in_path, matching_config_location};
use crate::manager::ConfigManager;
use serde_json::{Map, Value};

/// Handler for configuration directories.
///
/// Every entry with a registered handler becomes one key of the result,
/// named by its config name. Entries are loaded through the manager so each
/// file is resolved (and cached) on its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryHandler;

impl DirectoryHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigHandler for DirectoryHandler {
    fn name(&self) -> &'static str {
        "directory"
    }

    fn parse_config(
        &self,
        location: &ConfigLocation,
        _handle_parent_config: bool,
        manager: &ConfigManager,
    ) -> Result<RawConfigRecord> {
        let mut data = Map::new();

        for entry in config_locations_in_path(&location.path()) {
            if !manager.handlers().has_for_location(&entry) {
                tracing::debug!("No handler for {}, skipping", entry);
                continue;
            }
            // same entry one level down the local stack, for use_parent_dir
            let lower = location
                .dir_locations_parent()
                .and_then(|parent| matching_config_location(&parent.path(), entry.file_name()));
            let entry = entry.with_dir_locations_parent(lower);

            let value = manager.load_config_from_location(&entry, true, false)?;
            data.insert(entry.config_name().to_string(), value);
        }

        Ok(RawConfigRecord::new(Value::Object(data)))
    }
}
