//! Integration tests for local directory stacks, caching options and writers

use confstack::{
    ConfigLocation, ConfigManager, DirectorySpec, Error, LoadOptions, LruConfigCache,
    ManagerOptions, PathResolver,
};
use serde_json::json;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn write(path: impl AsRef<Path>, content: &str) {
    let path = path.as_ref();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_most_specific_directory_wins() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root.join("base/config/foo.json"), r#"{"from": "base"}"#);
    write(root.join("base/config/only_base.json"), r#"{"from": "base"}"#);
    write(root.join("dir_a/config/foo.json"), r#"{"from": "a"}"#);
    write(root.join("dir_a/config/only_a.json"), r#"{"from": "a"}"#);
    write(root.join("dir_b/config/foo.json"), r#"{"from": "b"}"#);

    let manager = ConfigManager::new(PathResolver::new(
        DirectorySpec::new(root.join("base")),
        vec![
            DirectorySpec::new(root.join("dir_a")),
            DirectorySpec::new(root.join("dir_b")),
        ],
    ));

    assert_eq!(manager.get_config("foo/from").unwrap(), json!("b"));
    assert_eq!(manager.get_config("only_a/from").unwrap(), json!("a"));
    assert_eq!(manager.get_config("only_base/from").unwrap(), json!("base"));

    let no_local = LoadOptions {
        use_local_config: false,
        ..LoadOptions::default()
    };
    assert_eq!(manager.get_config_with("foo/from", &no_local).unwrap(), json!("base"));
}

#[test]
fn test_use_parent_dir_walks_the_stack() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(
        root.join("base/config/searches.toml"),
        "[General]\nlimit = 20\ntheme = \"plain\"\nsort = \"relevance\"\n",
    );
    write(
        root.join("shared/config/searches.toml"),
        "[Parent_Config]\nuse_parent_dir = true\n\n[General]\nlimit = 50\n",
    );
    write(
        root.join("site/config/searches.json"),
        r#"{"Parent_Config": {"use_parent_dir": true}, "General": {"theme": "dark"}}"#,
    );
    write(
        root.join("site/DirLocations.toml"),
        "[Parent_Dir]\npath = \"../shared\"\nis_relative_path = true\n",
    );

    let site = root.join("site");
    let resolver =
        PathResolver::for_directories(root.join("base"), Some(site.as_path()), None, None)
            .unwrap();
    assert_eq!(resolver.local_config_dir_stack().len(), 2);

    // the local chain ends at the least specific local directory
    let manager = ConfigManager::new(resolver.clone());
    assert_eq!(
        manager.get_config("searches/General").unwrap(),
        json!({"limit": 50, "theme": "dark"})
    );

    let manager = ConfigManager::new(resolver.with_base_as_dir_parent(true));
    assert_eq!(
        manager.get_config("searches/General").unwrap(),
        json!({"limit": 50, "theme": "dark", "sort": "relevance"})
    );
}

#[test]
fn test_dir_locations_custom_subdir() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root.join("local/DirLocations.toml"), "[Local_Dir]\nconfig_subdir = \"etc/app\"\n");
    write(root.join("local/etc/app/config.json"), r#"{"Site": {"title": "Local"}}"#);
    fs::create_dir_all(root.join("base/config")).unwrap();

    let local = root.join("local");
    let resolver = PathResolver::for_directories(
        root.join("base"),
        Some(local.as_path()),
        None,
        Some("ignored"),
    )
    .unwrap();

    assert_eq!(resolver.local_config_dir_path(), Some(root.join("local/etc/app")));
    assert_eq!(
        ConfigManager::new(resolver).get_config("config/Site/title").unwrap(),
        json!("Local")
    );
}

#[test]
fn test_reload_on_file_change() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config/config.json");
    write(&path, r#"{"Site": {"title": "Old"}}"#);

    let resolver = PathResolver::new(DirectorySpec::new(temp_dir.path()), Vec::new());
    let manager = ConfigManager::new(resolver).with_options(ManagerOptions {
        reload_on_file_change: true,
    });
    assert_eq!(manager.get_config("config/Site/title").unwrap(), json!("Old"));

    fs::write(&path, r#"{"Site": {"title": "New"}}"#).unwrap();
    fs::File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(60))
        .unwrap();

    assert_eq!(manager.get_config("config/Site/title").unwrap(), json!("New"));
}

#[test]
fn test_bounded_cache_still_resolves() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path().join("config/a.json"), r#"{"v": 1}"#);
    write(temp_dir.path().join("config/b.json"), r#"{"v": 2}"#);

    let cache = Arc::new(LruConfigCache::new(NonZeroUsize::new(1).unwrap()));
    let resolver = PathResolver::new(DirectorySpec::new(temp_dir.path()), Vec::new());
    let manager = ConfigManager::new(resolver).with_cache(cache.clone());

    assert_eq!(manager.get_config("a/v").unwrap(), json!(1));
    assert_eq!(manager.get_config("b/v").unwrap(), json!(2));
    assert_eq!(manager.get_config("a/v").unwrap(), json!(1));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_directory_config() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root.join("config/Formatter/html.json"), r#"{"indent": 2}"#);
    write(root.join("config/Formatter/text.toml"), "width = 80\n");
    write(root.join("config/Formatter/html.json.dist"), r#"{"indent": 0}"#);

    let manager = ConfigManager::new(PathResolver::new(DirectorySpec::new(root), Vec::new()));

    assert_eq!(
        manager.get_config("Formatter").unwrap(),
        json!({"html": {"indent": 2}, "text": {"width": 80}})
    );
    assert_eq!(manager.get_config("Formatter/text/width").unwrap(), json!(80));
}

#[test]
fn test_write_to_forced_local_path() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root.join("base/config/config.json"), r#"{"Site": {"title": "Base"}}"#);
    fs::create_dir_all(root.join("local")).unwrap();

    let manager = ConfigManager::new(PathResolver::new(
        DirectorySpec::new(root.join("base")),
        vec![DirectorySpec::new(root.join("local"))],
    ));
    assert_eq!(manager.get_config("config/Site/title").unwrap(), json!("Base"));

    let target = manager
        .path_resolver()
        .local_config_path("config.json", None, true)
        .unwrap();
    assert_eq!(target, root.join("local/config/config.json"));

    let base = manager.config_location("config", true);
    manager
        .write_config(
            &ConfigLocation::file(&target),
            &json!({"Parent_Config": {"use_parent_dir": true}, "Site": {"title": "Local"}}),
            base.as_ref(),
        )
        .unwrap();

    // the name now resolves to the new local file
    assert_eq!(manager.get_config("config/Site/title").unwrap(), json!("Local"));
}

#[test]
fn test_writers_refuse_mismatched_data() {
    let temp_dir = TempDir::new().unwrap();
    let resolver = PathResolver::new(DirectorySpec::new(temp_dir.path()), Vec::new());
    let manager = ConfigManager::new(resolver);

    let toml_target = ConfigLocation::file(temp_dir.path().join("config/out.toml"));
    assert!(matches!(
        manager.write_config(&toml_target, &json!(["not", "a", "mapping"]), None),
        Err(Error::InvalidWriteData { .. })
    ));

    let dir_target = ConfigLocation::directory(temp_dir.path().join("config"));
    assert!(matches!(
        manager.write_config(&dir_target, &json!({}), None),
        Err(Error::UnsupportedWrite { .. })
    ));
}
