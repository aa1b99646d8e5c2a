//! Configuration module for research-search
//!
//! Handles loading and validating settings from YAML files and environment variables.
//! Settings are built once at startup and handed to the components that need them.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_ENV: &str = "RESEARCH_SEARCH_SETTINGS_PATH";

/// Default locations searched for a settings file, in order
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("research-search/settings.yml"));
    }
    paths
}

/// Load settings from an explicit path, the environment, a default location,
/// or fall back to defaults. Environment variables are always merged last.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("settings file not found: {}", path.display());
        }
    }

    let env_path = std::env::var(SETTINGS_PATH_ENV).ok().map(PathBuf::from);

    let candidates = explicit
        .map(Path::to_path_buf)
        .into_iter()
        .chain(env_path)
        .chain(default_paths());

    let mut settings = match candidates.into_iter().find(|p| p.exists()) {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(&path)?
        }
        None => {
            info!("No settings file found, using defaults");
            Settings::default()
        }
    };

    settings.merge_env();
    Ok(settings)
}
