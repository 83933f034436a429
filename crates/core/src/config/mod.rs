//! Resolved configuration data: merging and the read-only view

pub mod merge;
pub mod view;

pub use merge::{MergeStrategy, merge_recursive};
pub use view::{Config, ConfigEntry};
