//! Liftoff configuration
//!
//! Resolves the [`StageConfig`] shared by every provisioner and locates the
//! optional YAML config file that sits between CLI flags and built-in
//! defaults.

pub mod error;
pub mod stage;

pub use error::*;
pub use stage::{DEFAULT_PREFIX, PREFIX_TOKEN, StageConfig, StageOverrides};

use std::path::{Path, PathBuf};

/// Environment variable pointing directly at a config file.
pub const CONFIG_PATH_ENV: &str = "LIFTOFF_CONFIG_PATH";

const CANDIDATES: [&str; 3] = ["liftoff.local.yaml", "liftoff.yaml", ".liftoff.yaml"];

/// Liftoff's global config directory (`~/.config/liftoff` on Linux).
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("liftoff"))
}

/// Locate the config file, if any.
///
/// Search order:
/// 1. `LIFTOFF_CONFIG_PATH`
/// 2. current directory: liftoff.local.yaml, liftoff.yaml, .liftoff.yaml
/// 3. `./.liftoff/` with the same names
/// 4. `<config_dir>/liftoff/liftoff.yaml`
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        tracing::warn!("{} points at a missing file: {}", CONFIG_PATH_ENV, path.display());
    }

    let current_dir = std::env::current_dir()?;
    if let Some(path) = first_existing(&current_dir) {
        return Ok(Some(path));
    }

    let local_dir = current_dir.join(".liftoff");
    if local_dir.is_dir() {
        if let Some(path) = first_existing(&local_dir) {
            return Ok(Some(path));
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global = config_dir.join("liftoff.yaml");
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Parse a config file into an override layer.
pub fn load_overrides(path: &Path) -> Result<StageOverrides> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(StageOverrides::default());
    }

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Find and parse the config file. A missing file yields an empty layer.
pub fn load_file_layer() -> Result<(Option<PathBuf>, StageOverrides)> {
    match find_config_file()? {
        Some(path) => {
            tracing::debug!("Loading config file: {}", path.display());
            let overrides = load_overrides(&path)?;
            Ok((Some(path), overrides))
        }
        None => Ok((None, StageOverrides::default())),
    }
}
