use anyhow::{Result, bail};
use confstack_core::PathResolver;

pub fn locate_command(resolver: &PathResolver, name: &str, use_local_config: bool) -> Result<()> {
    let Some(location) = resolver.config_location(name, use_local_config) else {
        bail!("No configuration named {name}");
    };

    println!("{} ({})", location.path().display(), location.kind());

    let mut parent = location.dir_locations_parent();
    while let Some(lower) = parent {
        println!("  overrides {} ({})", lower.path().display(), lower.kind());
        parent = lower.dir_locations_parent();
    }
    Ok(())
}
