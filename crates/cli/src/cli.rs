use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use confstack_core::{ConfigManager, LoadOptions, PathResolver};
use std::path::PathBuf;

use crate::commands::{get_command, list_command, locate_command, stack_command, watch_command};
use crate::display::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "confstack")]
#[command(version, about = "Resolve layered configuration files", long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    #[command(flatten)]
    pub dirs: DirArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where configuration is looked up
#[derive(Args, Debug, Clone)]
pub struct DirArgs {
    /// Base directory holding the default configuration
    #[arg(long, env = "CONFSTACK_BASE_DIR", default_value = ".", global = true)]
    pub base_dir: PathBuf,

    /// Local override directory; its DirLocations.toml may chain further parents
    #[arg(long, env = "CONFSTACK_LOCAL_DIR", global = true)]
    pub local_dir: Option<PathBuf>,

    /// Config subdirectory of the base directory
    #[arg(long, env = "CONFSTACK_BASE_SUBDIR", global = true)]
    pub base_subdir: Option<String>,

    /// Config subdirectory of local directories without their own setting
    #[arg(long, env = "CONFSTACK_LOCAL_SUBDIR", global = true)]
    pub local_subdir: Option<String>,

    /// Let `use_parent_dir` in the least specific local file reach the base directory
    #[arg(long, env = "CONFSTACK_INHERIT_BASE", global = true)]
    pub inherit_base: bool,
}

impl DirArgs {
    pub fn resolver(&self) -> Result<PathResolver> {
        let resolver = PathResolver::for_directories(
            &self.base_dir,
            self.local_dir.as_deref(),
            self.base_subdir.as_deref(),
            self.local_subdir.as_deref(),
        )
        .context("Failed to build the local directory stack")?;
        Ok(resolver.with_base_as_dir_parent(self.inherit_base))
    }

    pub fn manager(&self) -> Result<ConfigManager> {
        Ok(ConfigManager::new(self.resolver()?))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a config path (e.g. config/Site/title) and print it
    #[command(visible_alias = "g")]
    Get {
        config_path: String,

        /// Ignore local override directories
        #[arg(long)]
        no_local: bool,

        /// Bypass the cache
        #[arg(short, long)]
        force: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Show which file provides a configuration
    Locate {
        name: String,

        /// Ignore local override directories
        #[arg(long)]
        no_local: bool,
    },
    /// Show the base directory and the local directory stack
    Stack,
    /// List every configuration name and the file that provides it
    #[command(visible_alias = "ls")]
    List,
    /// Print a config path again whenever configuration files change
    Watch {
        config_path: String,

        /// Ignore local override directories
        #[arg(long)]
        no_local: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

impl Cli {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        self.command.execute(&self.dirs)
    }
}

impl Commands {
    pub fn execute(self, dirs: &DirArgs) -> Result<()> {
        match self {
            Commands::Get {
                config_path,
                no_local,
                force,
                format,
            } => {
                let options = LoadOptions {
                    force_reload: force,
                    use_local_config: !no_local,
                };
                get_command(&dirs.manager()?, &config_path, &options, format)
            }
            Commands::Locate { name, no_local } => {
                locate_command(&dirs.resolver()?, &name, !no_local)
            }
            Commands::Stack => stack_command(&dirs.resolver()?),
            Commands::List => list_command(&dirs.resolver()?),
            Commands::Watch {
                config_path,
                no_local,
                format,
            } => watch_command(&dirs.manager()?, &config_path, !no_local, format),
        }
    }
}
