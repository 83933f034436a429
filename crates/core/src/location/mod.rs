//! Configuration locations
//!
//! A [`ConfigLocation`] names one configuration source on disk: a file or a
//! directory, optionally narrowed to a subsection. For
//! `/srv/app/local/config/config.json` the base path is
//! `/srv/app/local/config`, the file name is `config.json` and the config name
//! is `config`. A parent file `shared.json` declared by `config.json` keeps the
//! config name `config`, so the config name is not always derivable from the
//! file name.

pub mod scan;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub use scan::{config_locations_in_path, is_ignored_entry, matching_config_location};

/// The handler family that knows how to read a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    Json,
    Toml,
    GenericFile,
    Directory,
}

impl HandlerKind {
    /// Pick the handler kind for a file name by its extension
    pub fn for_file_name(file_name: &str) -> Self {
        match Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => HandlerKind::Json,
            Some("toml") => HandlerKind::Toml,
            _ => HandlerKind::GenericFile,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HandlerKind::Json => "json",
            HandlerKind::Toml => "toml",
            HandlerKind::GenericFile => "generic_file",
            HandlerKind::Directory => "directory",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single configuration source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    base_path: PathBuf,
    file_name: String,
    config_name: String,
    kind: HandlerKind,
    subsection: Vec<String>,
    dir_locations_parent: Option<Box<ConfigLocation>>,
}

impl ConfigLocation {
    /// Create a location for a path with an explicit handler kind
    pub fn new(path: impl AsRef<Path>, kind: HandlerKind) -> Self {
        let path = path.as_ref();
        let base_path = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let config_name = match kind {
            HandlerKind::Directory => file_name.clone(),
            _ => Path::new(&file_name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| file_name.clone()),
        };

        Self {
            base_path,
            file_name,
            config_name,
            kind,
            subsection: Vec::new(),
            dir_locations_parent: None,
        }
    }

    /// Create a file location, choosing the handler by extension
    pub fn file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let kind = path
            .file_name()
            .map(|n| HandlerKind::for_file_name(&n.to_string_lossy()))
            .unwrap_or(HandlerKind::GenericFile);
        Self::new(path, kind)
    }

    /// Create a directory location
    pub fn directory(path: impl AsRef<Path>) -> Self {
        Self::new(path, HandlerKind::Directory)
    }

    /// Location of whatever exists at `path`, if anything
    pub fn on_path(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Some(Self::directory(path))
        } else if path.exists() {
            Some(Self::file(path))
        } else {
            None
        }
    }

    pub fn with_config_name(mut self, config_name: impl Into<String>) -> Self {
        self.config_name = config_name.into();
        self
    }

    pub fn with_subsection<I, S>(mut self, subsection: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subsection = subsection.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dir_locations_parent(mut self, parent: Option<ConfigLocation>) -> Self {
        self.dir_locations_parent = parent.map(Box::new);
        self
    }

    /// The complete path
    pub fn path(&self) -> PathBuf {
        self.base_path.join(&self.file_name)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    pub fn subsection(&self) -> &[String] {
        &self.subsection
    }

    /// The same logical config one level down the local directory stack
    pub fn dir_locations_parent(&self) -> Option<&ConfigLocation> {
        self.dir_locations_parent.as_deref()
    }

    /// Symlink- and `..`-free path, or `None` if nothing exists there
    pub fn canonical_path(&self) -> Option<PathBuf> {
        std::fs::canonicalize(self.path()).ok()
    }

    /// Key identifying the physical source, independent of the subsection
    pub fn cache_key(&self) -> String {
        let path = self.canonical_path().unwrap_or_else(|| self.path());
        path.to_string_lossy().into_owned()
    }
}

impl fmt::Display for ConfigLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())?;
        if !self.subsection.is_empty() {
            write!(f, " [{}]", self.subsection.join("/"))?;
        }
        Ok(())
    }
}
