//! Configuration manager
//!
//! Turns a config path such as `config/Site/title` into a resolved value:
//! the first segment names the configuration, the rest select a subsection.
//! Parent chains are walked from the requested location up to the root,
//! then folded from the root down so more specific files win.

use crate::cache::{CachedConfig, ConfigCache, MemoryCache};
use crate::config::{Config, MergeStrategy};
use crate::error::{Error, Result};
use crate::handler::{HandlerRegistry, RawConfigRecord};
use crate::location::ConfigLocation;
use crate::resolver::PathResolver;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

thread_local! {
    /// Canonical paths being loaded on this thread, outermost first.
    ///
    /// Directory configs load their entries through the manager again, so a
    /// chain can leave one `collect_records` call and re-enter through another.
    static LOADING: RefCell<Vec<PathBuf>> = const { RefCell::new(Vec::new()) };
}

/// Paths pushed onto [`LOADING`] by one chain walk, popped on drop
struct LoadingGuard {
    depth: usize,
}

impl LoadingGuard {
    fn enter() -> Self {
        Self {
            depth: LOADING.with_borrow(Vec::len),
        }
    }

    fn push(&self, path: PathBuf) -> Result<()> {
        LOADING.with_borrow_mut(|stack| {
            if stack.contains(&path) {
                return Err(Error::CyclicInheritance {
                    path,
                    stack: stack.clone(),
                });
            }
            stack.push(path);
            Ok(())
        })
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        LOADING.with_borrow_mut(|stack| stack.truncate(self.depth));
    }
}

/// Settings fixed for the lifetime of a manager
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagerOptions {
    /// Reload cached documents whose file modification time changed
    pub reload_on_file_change: bool,
}

/// Per-request options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub force_reload: bool,
    pub use_local_config: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            force_reload: false,
            use_local_config: true,
        }
    }
}

pub struct ConfigManager {
    resolver: PathResolver,
    handlers: HandlerRegistry,
    cache: Arc<dyn ConfigCache>,
    options: ManagerOptions,
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("resolver", &self.resolver)
            .field("handlers", &self.handlers)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ConfigManager {
    /// Create a manager with the built-in handlers and an unbounded cache
    pub fn new(resolver: PathResolver) -> Self {
        Self {
            resolver,
            handlers: HandlerRegistry::new(),
            cache: Arc::new(MemoryCache::new()),
            options: ManagerOptions::default(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ConfigCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn with_options(mut self, options: ManagerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path_resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Location for a config path, with the subsection attached
    pub fn config_location(
        &self,
        config_path: &str,
        use_local_config: bool,
    ) -> Option<ConfigLocation> {
        let mut segments = config_path.split('/').filter(|s| !s.is_empty());
        let config_name = segments.next()?;
        self.resolver
            .config_location(config_name, use_local_config)
            .map(|location| location.with_subsection(segments))
    }

    pub fn get_config(&self, config_path: &str) -> Result<Value> {
        self.get_config_with(config_path, &LoadOptions::default())
    }

    /// Resolve a config path; a configuration that exists nowhere is `{}`
    pub fn get_config_with(&self, config_path: &str, options: &LoadOptions) -> Result<Value> {
        match self.config_location(config_path, options.use_local_config) {
            Some(location) => self.load_config_from_location(&location, true, options.force_reload),
            None => {
                tracing::debug!("No configuration found for {}", config_path);
                Ok(Value::Object(Map::new()))
            }
        }
    }

    /// Resolve a config path that must yield a mapping
    pub fn get_config_map(
        &self,
        config_path: &str,
        options: &LoadOptions,
    ) -> Result<Map<String, Value>> {
        match self.get_config_with(config_path, options)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::NotAMapping {
                config_path: config_path.to_string(),
            }),
        }
    }

    /// Resolve a config path into a read-only [`Config`] view
    pub fn get_config_object(&self, config_path: &str, options: &LoadOptions) -> Result<Config> {
        self.get_config_map(config_path, options).map(Config::new)
    }

    /// Load a location directly, bypassing name resolution
    pub fn load_config_from_location(
        &self,
        location: &ConfigLocation,
        handle_parent_config: bool,
        force_reload: bool,
    ) -> Result<Value> {
        let key = cache_key(location, handle_parent_config);

        if !force_reload {
            if let Some(cached) = self.cache.get(&key) {
                if self.is_fresh(location, &cached) {
                    tracing::debug!("Config cache hit for {}", location);
                    return Ok(slice(&cached.value, location.subsection()));
                }
                tracing::debug!("{} changed on disk, reloading", location);
            }
        }

        tracing::debug!("Loading config from {}", location);
        let modified = modified_time(location);
        let records = self.collect_records(location, handle_parent_config)?;
        let document = fold_records(records);
        let value = slice(&document, location.subsection());

        self.cache
            .set(key, Arc::new(CachedConfig::new(document, modified)));
        Ok(value)
    }

    /// Write `config` to `destination` with the handler for its kind
    pub fn write_config(
        &self,
        destination: &ConfigLocation,
        config: &Value,
        base: Option<&ConfigLocation>,
    ) -> Result<()> {
        let handler = self.handlers.for_location(destination)?;
        tracing::debug!("Writing {} with {} handler", destination, handler.name());
        handler.write_config(destination, config, base)?;
        self.invalidate(destination);
        Ok(())
    }

    /// Drop cached documents for a location
    pub fn invalidate(&self, location: &ConfigLocation) {
        self.cache.invalidate(&cache_key(location, true));
        self.cache.invalidate(&cache_key(location, false));
    }

    /// Drop every cached document
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Walk the parent chain, most specific record first.
    ///
    /// Every location on the chain stays on the thread's loading stack until
    /// the walk ends, so nested loads that come back to it fail as cycles.
    fn collect_records(
        &self,
        location: &ConfigLocation,
        handle_parent_config: bool,
    ) -> Result<Vec<RawConfigRecord>> {
        let loading = LoadingGuard::enter();
        let mut records = Vec::new();
        let mut current = Some(location.clone());

        while let Some(loc) = current.take() {
            let canonical = loc
                .canonical_path()
                .ok_or_else(|| Error::NotFound { path: loc.path() })?;
            loading.push(canonical)?;

            let handler = self.handlers.for_location(&loc)?;
            tracing::debug!("Parsing {} with {} handler", loc, handler.name());
            let record = handler.parse_config(&loc, handle_parent_config, self)?;

            if handle_parent_config {
                current = record.parent_location.clone();
            }
            records.push(record);
        }

        Ok(records)
    }

    fn is_fresh(&self, location: &ConfigLocation, cached: &CachedConfig) -> bool {
        !self.options.reload_on_file_change || modified_time(location) == cached.modified
    }
}

fn cache_key(location: &ConfigLocation, handle_parent_config: bool) -> String {
    let key = location.cache_key();
    if handle_parent_config {
        key
    } else {
        format!("{key}#noparent")
    }
}

fn modified_time(location: &ConfigLocation) -> Option<SystemTime> {
    std::fs::metadata(location.path()).and_then(|m| m.modified()).ok()
}

/// Fold records from the root parent down to the most specific one
fn fold_records(records: Vec<RawConfigRecord>) -> Value {
    let mut document = Map::new();

    for record in records.into_iter().rev() {
        match record.data {
            Value::Object(data) => {
                let strategy = record.merge_strategy.unwrap_or(MergeStrategy::Recursive);
                document = strategy.merge(document, data);
            }
            scalar if document.is_empty() => return scalar,
            _ => tracing::warn!("Ignoring scalar configuration on top of structured parent"),
        }
    }

    Value::Object(document)
}

/// Descend into `subsection`; anything missing yields `Null`
fn slice(document: &Value, subsection: &[String]) -> Value {
    let mut current = document;
    for key in subsection {
        let next = match current {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Value::Null,
        }
    }
    current.clone()
}
