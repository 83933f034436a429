use anyhow::Result;
use confstack_core::location::is_ignored_entry;
use confstack_core::{ConfigLocation, PathResolver};
use std::collections::BTreeSet;
use tracing::debug;
use walkdir::WalkDir;

pub fn list_command(resolver: &PathResolver) -> Result<()> {
    let mut dirs = vec![resolver.base_config_dir_path()];
    dirs.extend(
        resolver
            .local_config_dir_stack()
            .iter()
            .map(|spec| spec.build_path(None, None)),
    );

    let mut names = BTreeSet::new();
    for dir in dirs.iter().filter(|d| d.is_dir()) {
        debug!("Scanning {:?}", dir);
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if is_ignored_entry(&entry.file_name().to_string_lossy()) {
                continue;
            }
            if let Some(location) = ConfigLocation::on_path(entry.path()) {
                names.insert(location.config_name().to_string());
            }
        }
    }

    for name in names {
        if let Some(location) = resolver.config_location(&name, true) {
            println!("{name:<24} {}", location.path().display());
        }
    }
    Ok(())
}
