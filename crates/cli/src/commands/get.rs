use anyhow::{Context, Result};
use confstack_core::{ConfigManager, LoadOptions};
use tracing::debug;

use crate::display::{OutputFormat, format_value};

pub fn get_command(
    manager: &ConfigManager,
    config_path: &str,
    options: &LoadOptions,
    format: OutputFormat,
) -> Result<()> {
    debug!("Resolving {} with {:?}", config_path, options);

    let value = manager
        .get_config_with(config_path, options)
        .with_context(|| format!("Failed to resolve {config_path}"))?;
    println!("{}", format_value(&value, format)?);
    Ok(())
}
