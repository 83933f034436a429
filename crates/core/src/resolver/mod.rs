//! Resolution of configuration names to locations
//!
//! A resolver knows one base directory and a stack of local directories.
//! Local directories override the base one, and later entries of the stack
//! override earlier ones.

pub mod dir_locations;

use crate::error::Result;
use crate::location::{ConfigLocation, matching_config_location};
use std::path::{Path, PathBuf};

pub use dir_locations::local_dir_stack;

/// Subdirectory holding configuration when none is configured
pub const DEFAULT_CONFIG_SUBDIR: &str = "config";

/// A directory plus the subdirectory its configuration lives in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySpec {
    directory: PathBuf,
    default_config_subdir: String,
}

impl DirectorySpec {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            default_config_subdir: DEFAULT_CONFIG_SUBDIR.to_string(),
        }
    }

    pub fn with_config_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.default_config_subdir = subdir.into();
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn default_config_subdir(&self) -> &str {
        &self.default_config_subdir
    }

    /// `directory/<subdir or default>[/file]`
    pub fn build_path(&self, subdir: Option<&str>, file: Option<&str>) -> PathBuf {
        let mut path = self
            .directory
            .join(subdir.unwrap_or(&self.default_config_subdir));
        if let Some(file) = file {
            path.push(file);
        }
        path
    }
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    base: DirectorySpec,
    /// Least specific first
    local_stack: Vec<DirectorySpec>,
    base_as_dir_parent: bool,
}

impl PathResolver {
    pub fn new(base: DirectorySpec, local_stack: Vec<DirectorySpec>) -> Self {
        Self {
            base,
            local_stack,
            base_as_dir_parent: false,
        }
    }

    /// Link the base location below the least specific local match, so
    /// `use_parent_dir` in the lowest local file inherits from base.
    ///
    /// Off by default: the local chain then ends at the local stack.
    pub fn with_base_as_dir_parent(mut self, enabled: bool) -> Self {
        self.base_as_dir_parent = enabled;
        self
    }

    /// Build a resolver from a base directory and an optional local directory,
    /// following `DirLocations.toml` parents of the local one
    pub fn for_directories(
        base_dir: impl Into<PathBuf>,
        local_dir: Option<&Path>,
        base_subdir: Option<&str>,
        local_subdir: Option<&str>,
    ) -> Result<Self> {
        let mut base = DirectorySpec::new(base_dir);
        if let Some(subdir) = base_subdir {
            base = base.with_config_subdir(subdir);
        }
        Ok(Self::new(base, local_dir_stack(local_dir, local_subdir)?))
    }

    /// Location for `config_name`, preferring local directories.
    ///
    /// See [`PathResolver::with_base_as_dir_parent`] for how the base
    /// location joins the local chain.
    pub fn config_location(
        &self,
        config_name: &str,
        use_local_config: bool,
    ) -> Option<ConfigLocation> {
        let base = self.base_config_location(config_name, None);
        if !use_local_config {
            return base;
        }
        let below = if self.base_as_dir_parent {
            base.clone()
        } else {
            None
        };
        self.local_chain(config_name, None, below).or(base)
    }

    /// Most specific local location for `config_name`.
    ///
    /// Each match links the match from the previous stack level as its
    /// directory-stack parent.
    pub fn local_config_location(
        &self,
        config_name: &str,
        subdir: Option<&str>,
    ) -> Option<ConfigLocation> {
        self.local_chain(config_name, subdir, None)
    }

    fn local_chain(
        &self,
        config_name: &str,
        subdir: Option<&str>,
        below: Option<ConfigLocation>,
    ) -> Option<ConfigLocation> {
        let mut current = below;
        let mut found = false;
        for spec in &self.local_stack {
            if let Some(location) = self.config_location_from_spec(config_name, spec, subdir) {
                current = Some(location.with_dir_locations_parent(current.take()));
                found = true;
            }
        }
        if found { current } else { None }
    }

    pub fn base_config_location(
        &self,
        config_name: &str,
        subdir: Option<&str>,
    ) -> Option<ConfigLocation> {
        self.config_location_from_spec(config_name, &self.base, subdir)
    }

    pub fn config_location_from_spec(
        &self,
        config_name: &str,
        spec: &DirectorySpec,
        subdir: Option<&str>,
    ) -> Option<ConfigLocation> {
        matching_config_location(&spec.build_path(subdir, None), config_name)
    }

    /// Most specific existing local path for `filename`.
    ///
    /// With `force`, the most specific local directory is used even if the
    /// file does not exist there yet.
    pub fn local_config_path(
        &self,
        filename: &str,
        subdir: Option<&str>,
        force: bool,
    ) -> Option<PathBuf> {
        let mut fallback = None;
        for spec in self.local_stack.iter().rev() {
            let path = spec.build_path(subdir, Some(filename));
            if path.exists() {
                return Some(path);
            }
            if force && fallback.is_none() {
                fallback = Some(path);
            }
        }
        fallback
    }

    pub fn base_config_path(&self, filename: &str, subdir: Option<&str>) -> PathBuf {
        self.base.build_path(subdir, Some(filename))
    }

    /// Local path if one exists, otherwise the base path
    pub fn config_path(&self, filename: &str, subdir: Option<&str>) -> PathBuf {
        self.local_config_path(filename, subdir, false)
            .unwrap_or_else(|| self.base_config_path(filename, subdir))
    }

    pub fn base_config_dir_path(&self) -> PathBuf {
        self.base.build_path(None, None)
    }

    /// Config directory of the most specific local directory
    pub fn local_config_dir_path(&self) -> Option<PathBuf> {
        self.local_stack.last().map(|spec| spec.build_path(None, None))
    }

    pub fn local_config_dir_stack(&self) -> &[DirectorySpec] {
        &self.local_stack
    }

    pub fn base_directory(&self) -> &DirectorySpec {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        base: PathBuf,
        lower: PathBuf,
        upper: PathBuf,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("base");
        let lower = temp_dir.path().join("lower");
        let upper = temp_dir.path().join("upper");
        for dir in [&base, &lower, &upper] {
            fs::create_dir_all(dir.join("config")).unwrap();
        }
        Fixture {
            _temp_dir: temp_dir,
            base,
            lower,
            upper,
        }
    }

    fn resolver(f: &Fixture) -> PathResolver {
        PathResolver::new(
            DirectorySpec::new(&f.base),
            vec![DirectorySpec::new(&f.lower), DirectorySpec::new(&f.upper)],
        )
    }

    #[test]
    fn test_build_path() {
        let spec = DirectorySpec::new("/srv/app").with_config_subdir("conf");
        assert_eq!(spec.build_path(None, None), PathBuf::from("/srv/app/conf"));
        assert_eq!(
            spec.build_path(Some("other"), Some("a.json")),
            PathBuf::from("/srv/app/other/a.json")
        );
    }

    #[test]
    fn test_most_specific_local_wins_and_links_parents() {
        let f = fixture();
        fs::write(f.base.join("config/config.json"), "{}").unwrap();
        fs::write(f.lower.join("config/config.json"), "{}").unwrap();
        fs::write(f.upper.join("config/config.toml"), "").unwrap();

        let location = resolver(&f).config_location("config", true).unwrap();

        assert_eq!(location.path(), f.upper.join("config/config.toml"));
        let parent = location.dir_locations_parent().unwrap();
        assert_eq!(parent.path(), f.lower.join("config/config.json"));
        assert!(parent.dir_locations_parent().is_none());

        let local_only = resolver(&f).local_config_location("config", None).unwrap();
        let lower = local_only.dir_locations_parent().unwrap();
        assert!(lower.dir_locations_parent().is_none());
    }

    #[test]
    fn test_base_as_dir_parent_opt_in() {
        let f = fixture();
        fs::write(f.base.join("config/config.json"), "{}").unwrap();
        fs::write(f.lower.join("config/config.json"), "{}").unwrap();
        let resolver = resolver(&f).with_base_as_dir_parent(true);

        let location = resolver.config_location("config", true).unwrap();
        assert_eq!(location.path(), f.lower.join("config/config.json"));
        let base = location.dir_locations_parent().unwrap();
        assert_eq!(base.path(), f.base.join("config/config.json"));
        assert!(base.dir_locations_parent().is_none());

        // local lookups alone never reach the base directory
        let local_only = resolver.local_config_location("config", None).unwrap();
        assert!(local_only.dir_locations_parent().is_none());
    }

    #[test]
    fn test_base_fallback_and_no_local() {
        let f = fixture();
        fs::write(f.base.join("config/searches.json"), "{}").unwrap();
        fs::write(f.upper.join("config/config.json"), "{}").unwrap();
        let resolver = resolver(&f);

        assert_eq!(
            resolver.config_location("searches", true).unwrap().path(),
            f.base.join("config/searches.json")
        );
        assert!(resolver.config_location("config", false).is_none());
        assert!(resolver.config_location("missing", true).is_none());
    }

    #[test]
    fn test_local_config_path_force() {
        let f = fixture();
        fs::write(f.lower.join("config/only_lower.json"), "{}").unwrap();
        let resolver = resolver(&f);

        assert_eq!(
            resolver.local_config_path("only_lower.json", None, false),
            Some(f.lower.join("config/only_lower.json"))
        );
        assert_eq!(resolver.local_config_path("new.json", None, false), None);
        assert_eq!(
            resolver.local_config_path("new.json", None, true),
            Some(f.upper.join("config/new.json"))
        );
        assert_eq!(
            resolver.config_path("new.json", None),
            f.base.join("config/new.json")
        );
    }

    #[test]
    fn test_directory_paths() {
        let f = fixture();
        let resolver = resolver(&f);

        assert_eq!(resolver.base_config_dir_path(), f.base.join("config"));
        assert_eq!(resolver.local_config_dir_path(), Some(f.upper.join("config")));
        assert_eq!(resolver.local_config_dir_stack().len(), 2);

        let base_only = PathResolver::new(DirectorySpec::new(&f.base), Vec::new());
        assert_eq!(base_only.local_config_dir_path(), None);
    }

    #[test]
    fn test_for_directories() {
        let f = fixture();
        let resolver =
            PathResolver::for_directories(&f.base, Some(f.upper.as_path()), Some("etc"), None)
                .unwrap();

        assert_eq!(resolver.base_config_dir_path(), f.base.join("etc"));
        assert_eq!(resolver.local_config_dir_path(), Some(f.upper.join("config")));
    }
}
