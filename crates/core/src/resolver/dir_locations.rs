//! Local directory stacks chained through `DirLocations.toml`
//!
//! ```toml
//! [Local_Dir]
//! config_subdir = "config/custom"
//!
//! [Parent_Dir]
//! path = "../shared"
//! is_relative_path = true
//! ```

use super::{DEFAULT_CONFIG_SUBDIR, DirectorySpec};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DIR_LOCATIONS_FILE: &str = "DirLocations.toml";

#[derive(Debug, Default, Deserialize)]
struct DirLocations {
    #[serde(rename = "Local_Dir", default)]
    local_dir: LocalDir,
    #[serde(rename = "Parent_Dir", default)]
    parent_dir: ParentDir,
}

#[derive(Debug, Default, Deserialize)]
struct LocalDir {
    config_subdir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ParentDir {
    path: Option<String>,
    #[serde(default)]
    is_relative_path: bool,
}

impl DirLocations {
    fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(DIR_LOCATIONS_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|e| Error::parse(&path, e))
    }

    fn parent_of(&self, dir: &Path) -> Option<PathBuf> {
        let parent = self.parent_dir.path.as_deref().filter(|p| !p.is_empty())?;
        Some(if self.parent_dir.is_relative_path {
            dir.join(parent)
        } else {
            PathBuf::from(parent)
        })
    }
}

/// Build the local directory stack starting at `local_dir`.
///
/// The returned stack is ordered least specific first, so `local_dir` itself
/// is the last entry. A directory that does not exist, or one that is already
/// part of the stack, ends the walk with a warning.
pub fn local_dir_stack(
    local_dir: Option<&Path>,
    local_subdir: Option<&str>,
) -> Result<Vec<DirectorySpec>> {
    let mut stack = Vec::new();
    let mut seen: Vec<PathBuf> = Vec::new();
    let mut current = local_dir.filter(|d| !d.as_os_str().is_empty()).map(Path::to_path_buf);

    while let Some(dir) = current.take() {
        let Ok(canonical) = fs::canonicalize(&dir) else {
            tracing::warn!("Configured local directory does not exist: {:?}", dir);
            break;
        };
        if seen.contains(&canonical) {
            tracing::warn!("Directory already included in the local stack: {:?}", dir);
            break;
        }
        seen.push(canonical);

        let locations = DirLocations::load(&dir)?;
        let subdir = locations
            .local_dir
            .config_subdir
            .as_deref()
            .or(local_subdir)
            .unwrap_or(DEFAULT_CONFIG_SUBDIR);
        tracing::debug!("Local config directory {:?} (subdir {})", dir, subdir);

        current = locations.parent_of(&dir);
        stack.insert(0, DirectorySpec::new(dir).with_config_subdir(subdir));
    }

    Ok(stack)
}
