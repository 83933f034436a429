use anyhow::Result;
use confstack_core::PathResolver;

pub fn stack_command(resolver: &PathResolver) -> Result<()> {
    println!("base:  {}", resolver.base_config_dir_path().display());

    let stack = resolver.local_config_dir_stack();
    if stack.is_empty() {
        println!("local: (none)");
    }
    // least specific first, so the last line wins
    for (level, spec) in stack.iter().enumerate() {
        println!("local[{}]: {}", level, spec.build_path(None, None).display());
    }
    Ok(())
}
