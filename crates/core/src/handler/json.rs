use super::parent::extract_parent_config;
use super::{ConfigHandler, RawConfigRecord, backup_file, read_file};
use crate::error::{Error, Result};
use crate::location::ConfigLocation;
use crate::manager::ConfigManager;
use serde_json::Value;
use std::fs;

/// Handler for `.json` files
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonHandler;

impl JsonHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigHandler for JsonHandler {
    fn name(&self) -> &'static str {
        "json"
    }

    fn parse_config(
        &self,
        location: &ConfigLocation,
        handle_parent_config: bool,
        _manager: &ConfigManager,
    ) -> Result<RawConfigRecord> {
        let path = location.path();
        let content = read_file(&path)?;
        let mut data: Value =
            serde_json::from_str(&content).map_err(|e| Error::parse(&path, e))?;

        let parent = match &mut data {
            Value::Object(map) if handle_parent_config => extract_parent_config(location, map)?,
            _ => Default::default(),
        };

        Ok(RawConfigRecord::new(data)
            .with_parent(parent.parent_location)
            .with_merge_strategy(parent.merge_strategy))
    }

    fn write_config(
        &self,
        destination: &ConfigLocation,
        config: &Value,
        _base: Option<&ConfigLocation>,
    ) -> Result<()> {
        let path = destination.path();
        let mut content = serde_json::to_string_pretty(config)?;
        content.push('\n');

        fs::create_dir_all(destination.base_path())?;
        backup_file(&path)?;
        fs::write(&path, content)?;
        tracing::debug!("Wrote JSON config to {:?}", path);
        Ok(())
    }
}
