//! confstack - hierarchical configuration resolution
//!
//! This crate provides functionality to:
//! - Resolve configuration names against a base directory and a stack of local override directories
//! - Follow `Parent_Config` inheritance chains with cycle detection
//! - Merge the chain into one document and narrow it to a subsection
//! - Cache resolved documents and expose them through a read-only view
pub mod cache;
pub mod config;
pub mod error;
pub mod handler;
pub mod location;
pub mod manager;
pub mod resolver;

// Re-export commonly used types and traits
pub use cache::{CachedConfig, ConfigCache, LruConfigCache, MemoryCache};
pub use config::{Config, ConfigEntry, MergeStrategy, merge_recursive};
pub use error::{Error, Result};
pub use handler::{ConfigHandler, HandlerRegistry, RawConfigRecord};
pub use location::{ConfigLocation, HandlerKind};
pub use manager::{ConfigManager, LoadOptions, ManagerOptions};
pub use resolver::{DEFAULT_CONFIG_SUBDIR, DirectorySpec, PathResolver};
