//! Configuration loading and root folder resolution

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Name of the SQLite database file inside the root folder
pub const DATABASE_FILE: &str = "yumelog.db";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. YUMELOG_ROOT environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("YUMELOG_ROOT") {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(root_folder));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_root_folder())
}

/// Database file path inside the resolved root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Locate the platform configuration file
fn locate_config_file() -> Result<PathBuf> {
    let path = dirs::config_dir()
        .map(|d| d.join("yumelog").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("Config file not found: {path:?}")))
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("yumelog"))
        .unwrap_or_else(|| PathBuf::from("./yumelog_data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_cli_arg_wins() {
        std::env::set_var("YUMELOG_ROOT", "/tmp/from-env");
        let root = resolve_root_folder(Some("/tmp/from-cli")).unwrap();
        assert_eq!(root, PathBuf::from("/tmp/from-cli"));
        std::env::remove_var("YUMELOG_ROOT");
    }

    #[test]
    #[serial]
    fn test_env_var_beats_default() {
        std::env::set_var("YUMELOG_ROOT", "/tmp/from-env");
        let root = resolve_root_folder(None).unwrap();
        assert_eq!(root, PathBuf::from("/tmp/from-env"));
        std::env::remove_var("YUMELOG_ROOT");
    }

    #[test]
    #[serial]
    fn test_default_fallback_is_usable() {
        std::env::remove_var("YUMELOG_ROOT");
        let root = resolve_root_folder(None).unwrap();
        assert!(!root.as_os_str().is_empty());
        assert!(database_path(&root).ends_with(DATABASE_FILE));
    }
}
