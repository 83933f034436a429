use anyhow::{Context, Result};
use confstack_core::{ConfigManager, LoadOptions};
use notify::{EventKind, RecursiveMode, Watcher};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::display::{OutputFormat, format_value};

pub fn watch_command(
    manager: &ConfigManager,
    config_path: &str,
    use_local_config: bool,
    format: OutputFormat,
) -> Result<()> {
    let resolver = manager.path_resolver();
    let mut roots: Vec<PathBuf> = vec![resolver.base_config_dir_path()];
    if use_local_config {
        roots.extend(
            resolver
                .local_config_dir_stack()
                .iter()
                .map(|spec| spec.build_path(None, None)),
        );
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })?;
    for root in roots.iter().filter(|p| p.exists()) {
        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", root.display()))?;
        debug!("Watching {:?}", root);
    }

    let options = LoadOptions {
        force_reload: false,
        use_local_config,
    };
    print_resolved(manager, config_path, &options, format);

    for res in rx {
        match res {
            Ok(event)
                if matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) =>
            {
                debug!("Change detected: {:?}", event.paths);
                // directory entries are cached separately from the directory itself
                manager.clear_cache();
                print_resolved(manager, config_path, &options, format);
            }
            Ok(_) => {}
            Err(e) => warn!("Watch error: {}", e),
        }
    }
    Ok(())
}

/// Resolution errors are reported without ending the watch
fn print_resolved(
    manager: &ConfigManager,
    config_path: &str,
    options: &LoadOptions,
    format: OutputFormat,
) {
    let rendered = manager
        .get_config_with(config_path, options)
        .map_err(anyhow::Error::from)
        .and_then(|value| format_value(&value, format));
    match rendered {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("error: {e:#}"),
    }
}
