//! Configuration handlers
//!
//! A handler turns one [`ConfigLocation`] into a [`RawConfigRecord`]: the
//! decoded data plus, optionally, the location it inherits from and the merge
//! strategy to fold it with. Handlers are looked up by [`HandlerKind`] in a
//! [`HandlerRegistry`].

pub mod dir;
pub mod generic;
pub mod json;
mod parent;
pub mod toml_file;

use crate::config::MergeStrategy;
use crate::error::{Error, Result};
use crate::location::{ConfigLocation, HandlerKind};
use crate::manager::ConfigManager;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub use dir::DirectoryHandler;
pub use generic::GenericFileHandler;
pub use json::JsonHandler;
pub use toml_file::TomlHandler;

/// Result of parsing a single location
#[derive(Debug, Clone, PartialEq)]
pub struct RawConfigRecord {
    pub data: Value,
    pub parent_location: Option<ConfigLocation>,
    pub merge_strategy: Option<MergeStrategy>,
}

impl RawConfigRecord {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            parent_location: None,
            merge_strategy: None,
        }
    }

    pub fn with_parent(mut self, parent: Option<ConfigLocation>) -> Self {
        self.parent_location = parent;
        self
    }

    pub fn with_merge_strategy(mut self, strategy: Option<MergeStrategy>) -> Self {
        self.merge_strategy = strategy;
        self
    }
}

/// Reads (and optionally writes) one kind of configuration location
pub trait ConfigHandler: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &'static str;

    /// Parse the configuration at `location`.
    ///
    /// `manager` is available for handlers that load nested locations.
    fn parse_config(
        &self,
        location: &ConfigLocation,
        handle_parent_config: bool,
        manager: &ConfigManager,
    ) -> Result<RawConfigRecord>;

    /// Write `config` to `destination`; `base` may provide extra structure
    fn write_config(
        &self,
        _destination: &ConfigLocation,
        _config: &Value,
        _base: Option<&ConfigLocation>,
    ) -> Result<()> {
        Err(Error::UnsupportedWrite {
            handler: self.name().to_string(),
        })
    }
}

/// Registry of handlers by location kind
#[derive(Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerKind, Arc<dyn ConfigHandler>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerRegistry {
    /// Create a registry with the built-in handlers
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(HandlerKind::Json, Arc::new(JsonHandler::new()));
        registry.register(HandlerKind::Toml, Arc::new(TomlHandler::new()));
        registry.register(HandlerKind::GenericFile, Arc::new(GenericFileHandler::new()));
        registry.register(HandlerKind::Directory, Arc::new(DirectoryHandler::new()));
        registry
    }

    /// Create a registry without any handlers
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register (or replace) the handler for a kind
    pub fn register(&mut self, kind: HandlerKind, handler: Arc<dyn ConfigHandler>) {
        self.handlers.insert(kind, handler);
    }

    pub fn get(&self, kind: HandlerKind) -> Option<Arc<dyn ConfigHandler>> {
        self.handlers.get(&kind).cloned()
    }

    pub fn has_for_location(&self, location: &ConfigLocation) -> bool {
        self.handlers.contains_key(&location.kind())
    }

    pub fn for_location(&self, location: &ConfigLocation) -> Result<Arc<dyn ConfigHandler>> {
        self.get(location.kind()).ok_or_else(|| Error::NoHandler {
            path: location.path(),
        })
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::IoError(e)
        }
    })
}

/// Copy an existing file to `<file>.bak.<unix-seconds>` before overwriting it
pub(crate) fn backup_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let mut backup = path.as_os_str().to_owned();
    backup.push(format!(".bak.{stamp}"));
    std::fs::copy(path, &backup)?;
    tracing::debug!("Backed up {:?} to {:?}", path, backup);
    Ok(())
}
