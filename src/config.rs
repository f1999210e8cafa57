//! Runtime configuration.
//!
//! Resolution order for every setting: CLI flag, then `TASKDECK_*`
//! environment variable, then `taskdeck.toml` in the workspace root,
//! then the built-in default. The config file is optional.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 4400;
pub const DEFAULT_HOST: &str = "127.0.0.1";

const CONFIG_FILE: &str = "taskdeck.toml";

/// Optional settings from `taskdeck.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    port: Option<u16>,
    host: Option<String>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub workspace_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub verbose: bool,
}

impl Config {
    /// Resolve configuration from CLI arguments, environment and the
    /// optional workspace config file.
    pub fn load(workspace: Option<PathBuf>, port: Option<u16>, verbose: bool) -> Result<Self> {
        let workspace_dir = match workspace
            .or_else(|| std::env::var("TASKDECK_WORKSPACE").ok().map(PathBuf::from))
        {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to resolve current directory")?,
        };

        let file = Self::load_file(&workspace_dir)?;

        let port = match port {
            Some(p) => p,
            None => match std::env::var("TASKDECK_PORT") {
                Ok(raw) => raw
                    .parse()
                    .with_context(|| format!("Invalid TASKDECK_PORT value '{}'", raw))?,
                Err(_) => file.port.unwrap_or(DEFAULT_PORT),
            },
        };

        let host = std::env::var("TASKDECK_HOST")
            .ok()
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Ok(Self {
            workspace_dir,
            host,
            port,
            verbose,
        })
    }

    fn load_file(workspace_dir: &std::path::Path) -> Result<FileConfig> {
        let path = workspace_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(FileConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config at {}", path.display()))
    }
}
