use super::{ConfigHandler, RawConfigRecord, backup_file, read_file};
use crate::error::{Error, Result};
use crate::location::ConfigLocation;
use crate::manager::ConfigManager;
use serde_json::Value;
use std::fs;

/// Handler for any other file; the content is a single string value
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericFileHandler;

impl GenericFileHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigHandler for GenericFileHandler {
    fn name(&self) -> &'static str {
        "generic_file"
    }

    fn parse_config(
        &self,
        location: &ConfigLocation,
        _handle_parent_config: bool,
        _manager: &ConfigManager,
    ) -> Result<RawConfigRecord> {
        let content = read_file(&location.path())?;
        Ok(RawConfigRecord::new(Value::String(content.trim().to_string())))
    }

    fn write_config(
        &self,
        destination: &ConfigLocation,
        config: &Value,
        _base: Option<&ConfigLocation>,
    ) -> Result<()> {
        let Value::String(content) = config else {
            return Err(Error::InvalidWriteData {
                handler: self.name().to_string(),
                reason: "plain files hold a single string".to_string(),
            });
        };

        let path = destination.path();
        fs::create_dir_all(destination.base_path())?;
        backup_file(&path)?;
        fs::write(&path, content)?;
        Ok(())
    }
}
