//! Integration tests for parent inheritance, merging and subsection lookup

use confstack::handler::{ConfigHandler, JsonHandler};
use confstack::{
    ConfigLocation, ConfigManager, DirectorySpec, Error, HandlerKind, HandlerRegistry, LoadOptions,
    PathResolver, RawConfigRecord,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

fn config_dir(root: &Path) -> PathBuf {
    let dir = root.join("config");
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn manager(root: &Path) -> ConfigManager {
    ConfigManager::new(PathResolver::new(DirectorySpec::new(root), Vec::new()))
}

#[derive(Default)]
struct CountingJson {
    parses: AtomicUsize,
}

impl ConfigHandler for CountingJson {
    fn name(&self) -> &'static str {
        "counting_json"
    }

    fn parse_config(
        &self,
        location: &ConfigLocation,
        handle_parent_config: bool,
        manager: &ConfigManager,
    ) -> confstack::Result<RawConfigRecord> {
        self.parses.fetch_add(1, Ordering::SeqCst);
        JsonHandler::new().parse_config(location, handle_parent_config, manager)
    }
}

#[test]
fn test_repeated_resolution_hits_cache() {
    let temp_dir = TempDir::new().unwrap();
    let dir = config_dir(temp_dir.path());
    fs::write(dir.join("config.json"), r#"{"Site": {"title": "Library Catalog"}}"#).unwrap();

    let counter = Arc::new(CountingJson::default());
    let mut handlers = HandlerRegistry::new();
    handlers.register(HandlerKind::Json, counter.clone());
    let manager = manager(temp_dir.path()).with_handlers(handlers);

    let first = manager.get_config("config").unwrap();
    let second = manager.get_config("config").unwrap();

    assert_eq!(first, second);
    assert_eq!(counter.parses.load(Ordering::SeqCst), 1);
}

#[test]
fn test_child_overrides_parent_per_key() {
    let temp_dir = TempDir::new().unwrap();
    let dir = config_dir(temp_dir.path());
    fs::write(dir.join("parent.json"), r#"{"Section": {"a": 1, "b": 2}}"#).unwrap();
    fs::write(
        dir.join("config.json"),
        r#"{"Parent_Config": {"relative_path": "parent.json"}, "Section": {"b": 3}}"#,
    )
    .unwrap();

    let value = manager(temp_dir.path()).get_config("config").unwrap();
    assert_eq!(value, json!({"Section": {"a": 1, "b": 3}}));
}

#[test]
fn test_full_section_override() {
    let temp_dir = TempDir::new().unwrap();
    let dir = config_dir(temp_dir.path());
    fs::write(
        dir.join("parent.toml"),
        "[Section1]\na = 1\n\n[Section2]\nc = 2\n",
    )
    .unwrap();
    fs::write(
        dir.join("config.toml"),
        r#"
[Parent_Config]
relative_path = "parent.toml"
override_full_sections = "Section1"

[Section1]
j = 10

[Section2]
d = 4
"#,
    )
    .unwrap();

    let manager = manager(temp_dir.path());
    assert_eq!(manager.get_config("config/Section1").unwrap(), json!({"j": 10}));
    assert_eq!(manager.get_config("config/Section2").unwrap(), json!({"c": 2, "d": 4}));
}

#[test]
fn test_merge_array_settings() {
    let temp_dir = TempDir::new().unwrap();
    let dir = config_dir(temp_dir.path());
    fs::write(dir.join("parent.json"), r#"{"Index": {"hosts": ["a"], "port": 1}}"#).unwrap();
    fs::write(
        dir.join("config.json"),
        r#"{
            "Parent_Config": {"relative_path": "parent.json", "merge_array_settings": true},
            "Index": {"hosts": ["b"]}
        }"#,
    )
    .unwrap();

    let value = manager(temp_dir.path()).get_config("config/Index").unwrap();
    assert_eq!(value, json!({"hosts": ["a", "b"], "port": 1}));
}

#[test]
fn test_subsection_extraction_and_type_mismatch() {
    let temp_dir = TempDir::new().unwrap();
    let dir = config_dir(temp_dir.path());
    fs::write(dir.join("config.json"), r#"{"Site": {"title": "Library Catalog"}}"#).unwrap();
    let manager = manager(temp_dir.path());
    let options = LoadOptions::default();

    assert_eq!(manager.get_config("config/Site/title").unwrap(), json!("Library Catalog"));
    assert_eq!(
        manager.get_config_map("config/Site", &options).unwrap(),
        json!({"title": "Library Catalog"}).as_object().unwrap().clone()
    );

    let err = manager.get_config_map("config/Site/title", &options).unwrap_err();
    assert!(matches!(err, Error::NotAMapping { .. }));
    assert!(err.to_string().contains("config/Site/title"));
}

#[test]
fn test_cycle_names_both_files() {
    let temp_dir = TempDir::new().unwrap();
    let dir = config_dir(temp_dir.path());
    fs::write(dir.join("a.json"), r#"{"Parent_Config": {"relative_path": "b.json"}}"#).unwrap();
    fs::write(dir.join("b.json"), r#"{"Parent_Config": {"relative_path": "a.json"}}"#).unwrap();

    let message = manager(temp_dir.path()).get_config("a").unwrap_err().to_string();
    assert!(message.contains("a.json"));
    assert!(message.contains("b.json"));
}

#[test]
fn test_missing_top_level_is_empty_but_missing_parent_fails() {
    let temp_dir = TempDir::new().unwrap();
    let dir = config_dir(temp_dir.path());
    fs::write(
        dir.join("child.json"),
        r#"{"Parent_Config": {"path": "/definitely/not/here.json"}}"#,
    )
    .unwrap();
    let manager = manager(temp_dir.path());

    assert_eq!(manager.get_config("nonexistent").unwrap(), json!({}));
    assert!(matches!(
        manager.get_config("child"),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn test_config_view_is_immutable() {
    let temp_dir = TempDir::new().unwrap();
    let dir = config_dir(temp_dir.path());
    fs::write(dir.join("config.json"), r#"{"Site": {"title": "X"}}"#).unwrap();
    let manager = manager(temp_dir.path());

    let config = manager
        .get_config_object("config", &LoadOptions::default())
        .unwrap();
    let site = config.section("Site").unwrap();

    assert!(matches!(site.set("title", "Y"), Err(Error::ImmutableSet { .. })));
    assert_eq!(site.get("title").unwrap().as_str(), Some("X"));
    assert_eq!(manager.get_config("config/Site/title").unwrap(), json!("X"));
}

#[test]
fn test_scalar_file_passthrough() {
    let temp_dir = TempDir::new().unwrap();
    let dir = config_dir(temp_dir.path());
    fs::write(dir.join("message"), "some config").unwrap();
    let manager = manager(temp_dir.path());

    assert_eq!(manager.get_config("message").unwrap(), json!("some config"));
    assert_eq!(manager.get_config("message/deeper").unwrap(), serde_json::Value::Null);
}

#[test]
fn test_typed_section() {
    #[derive(serde::Deserialize)]
    struct Index {
        url: String,
        timeout: u64,
    }

    let temp_dir = TempDir::new().unwrap();
    let dir = config_dir(temp_dir.path());
    fs::write(
        dir.join("config.toml"),
        "[Index]\nurl = \"http://localhost:8983\"\ntimeout = 30\n",
    )
    .unwrap();

    let index: Index = manager(temp_dir.path())
        .get_config_object("config/Index", &LoadOptions::default())
        .unwrap()
        .deserialize()
        .unwrap();
    assert_eq!(index.url, "http://localhost:8983");
    assert_eq!(index.timeout, 30);
}
