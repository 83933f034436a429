use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while resolving configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration does not exist: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error(
        "Configuration already loaded: {}\nLoaded config stack:\n  {}",
        .path.display(),
        format_stack(.stack)
    )]
    CyclicInheritance { path: PathBuf, stack: Vec<PathBuf> },

    #[error("Configuration on path {config_path} is not a mapping")]
    NotAMapping { config_path: String },

    #[error("Config is immutable; cannot set {key} to {value}")]
    ImmutableSet { key: String, value: String },

    #[error("Config is immutable; cannot unset {key}")]
    ImmutableUnset { key: String },

    #[error("Config cannot be converted to string")]
    NotStringConvertible,

    #[error("Parse error in {}: {message}", .path.display())]
    ParseError { path: PathBuf, message: String },

    #[error("Writing is not supported by handler: {handler}")]
    UnsupportedWrite { handler: String },

    #[error("{handler} handler cannot write this config: {reason}")]
    InvalidWriteData { handler: String, reason: String },

    #[error("No config handler registered for {}", .path.display())]
    NoHandler { path: PathBuf },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn parse(path: &Path, message: impl ToString) -> Self {
        Error::ParseError {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

fn format_stack(stack: &[PathBuf]) -> String {
    stack
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n  ")
}

/// Result type alias for confstack operations
pub type Result<T> = std::result::Result<T, Error>;
