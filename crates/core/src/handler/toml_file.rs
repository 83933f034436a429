use super::parent::extract_parent_config;
use super::{ConfigHandler, RawConfigRecord, backup_file, read_file};
use crate::error::{Error, Result};
use crate::location::ConfigLocation;
use crate::manager::ConfigManager;
use serde_json::{Number, Value};
use std::fs;

/// Handler for `.toml` files
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlHandler;

impl TomlHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigHandler for TomlHandler {
    fn name(&self) -> &'static str {
        "toml"
    }

    fn parse_config(
        &self,
        location: &ConfigLocation,
        handle_parent_config: bool,
        _manager: &ConfigManager,
    ) -> Result<RawConfigRecord> {
        let path = location.path();
        let content = read_file(&path)?;
        let table: toml::Table = toml::from_str(&content).map_err(|e| Error::parse(&path, e))?;

        let mut data = table_to_json(table);
        let parent = if handle_parent_config {
            extract_parent_config(location, &mut data)?
        } else {
            Default::default()
        };

        Ok(RawConfigRecord::new(Value::Object(data))
            .with_parent(parent.parent_location)
            .with_merge_strategy(parent.merge_strategy))
    }

    fn write_config(
        &self,
        destination: &ConfigLocation,
        config: &Value,
        _base: Option<&ConfigLocation>,
    ) -> Result<()> {
        if !config.is_object() {
            return Err(Error::InvalidWriteData {
                handler: self.name().to_string(),
                reason: "TOML documents must be a mapping".to_string(),
            });
        }
        let content = toml::to_string_pretty(config).map_err(|e| Error::InvalidWriteData {
            handler: self.name().to_string(),
            reason: e.to_string(),
        })?;

        let path = destination.path();
        fs::create_dir_all(destination.base_path())?;
        backup_file(&path)?;
        fs::write(&path, content)?;
        tracing::debug!("Wrote TOML config to {:?}", path);
        Ok(())
    }
}

fn table_to_json(table: toml::Table) -> serde_json::Map<String, Value> {
    table
        .into_iter()
        .map(|(key, value)| (key, toml_to_json(value)))
        .collect()
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(table_to_json(table)),
    }
}
