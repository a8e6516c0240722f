use crate::config::toml_config::MapConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "florida-branch-map.toml";

#[derive(Debug, Clone, Parser)]
#[command(name = "florida-branch-map")]
#[command(about = "Render Fortiline Waterworks branches over Florida county boundaries")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory the HTML map is written to
    #[arg(long)]
    pub output_dir: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage per stage")]
    pub monitor: bool,

    /// Show the resolved configuration and branch list without any network access
    #[arg(long)]
    pub dry_run: bool,
}

impl CliConfig {
    /// `--config` if given, else `florida-branch-map.toml` if present, else built-in defaults.
    pub fn load_map_config(&self) -> Result<MapConfig> {
        let mut config = match &self.config {
            Some(path) => MapConfig::from_file(path)?,
            None if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() => {
                MapConfig::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => MapConfig::default(),
        };

        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }

        Ok(config)
    }
}
