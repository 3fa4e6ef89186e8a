//! Configuration loading and data root resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Data root resolution priority order:
/// 1. Caller-supplied override (highest priority)
/// 2. ROLLBOOK_ROOT environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_root(override_path: Option<&str>) -> Result<PathBuf> {
    // Priority 1: caller-supplied override
    if let Some(path) = override_path {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: environment variable
    if let Ok(path) = std::env::var("ROLLBOOK_ROOT") {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(root_folder));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_data_root())
}

/// Database file location under the data root
pub fn database_path(root: &Path) -> PathBuf {
    root.join("rollbook.db")
}

/// Locate the configuration file for the platform
///
/// Checks the per-user config directory first, then /etc on Unix.
fn find_config_file() -> Result<PathBuf> {
    if let Some(path) = dirs::config_dir().map(|d| d.join("rollbook").join("config.toml")) {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/rollbook/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// OS-dependent default data root path
fn default_data_root() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("rollbook"))
        .unwrap_or_else(|| PathBuf::from("./rollbook_data"))
}
