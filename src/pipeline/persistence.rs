// Called on startup and quit; keeps the config (never patterns) next to the project.
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::pipeline::config::Config;

pub const GEOBEAT_DIR: &str = ".geobeat";
const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "geobeat.log";

// <project_dir>/.geobeat/config.json
fn config_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(GEOBEAT_DIR).join(CONFIG_FILE)
}

pub fn log_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(GEOBEAT_DIR).join(LOG_FILE)
}

/// Missing, unreadable or invalid configs all fall back to the defaults.
pub fn load_config(project_dir: &Path) -> Config {
    let path = config_file_path(project_dir);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(_) => {
            log::info!("no config at {}, using defaults", path.display());
            return Config::default();
        }
    };
    let config: Config = match serde_json::from_str(&data) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("could not parse {}: {e}; using defaults", path.display());
            return Config::default();
        }
    };
    match config.validate() {
        Ok(()) => config,
        Err(e) => {
            log::warn!("invalid config {}: {e}; using defaults", path.display());
            Config::default()
        }
    }
}

// Save the config to disk, making the directory if it doesn't exist already
pub fn save_config(project_dir: &Path, config: &Config) -> anyhow::Result<()> {
    let path = config_file_path(project_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
