//! Where vimkeys reads and writes its files
//!
//! Everything user-level lives in one directory:
//! - `$VIMKEYS_CONFIG_DIR` when set (tests, portable installs)
//! - Unix/macOS: `$XDG_CONFIG_HOME/vimkeys/` or `~/.config/vimkeys/`
//! - Windows: `%APPDATA%\vimkeys\`
//!
//! Project-local mappings are read from the working directory.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "vimkeys";

/// Overrides the platform config directory
pub const CONFIG_DIR_ENV: &str = "VIMKEYS_CONFIG_DIR";

const CONFIG_FILE: &str = "config.yaml";
const MAPPINGS_FILE: &str = "mappings.yaml";
const LOGS_DIR: &str = "logs";

pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    platform_config_home().map(|base| base.join(APP_DIR))
}

#[cfg(target_os = "windows")]
fn platform_config_home() -> Option<PathBuf> {
    env::var_os("APPDATA").map(PathBuf::from)
}

#[cfg(not(target_os = "windows"))]
fn platform_config_home() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
}

/// Engine settings (leader, belloff)
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// User mapping layer
pub fn mappings_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(MAPPINGS_FILE))
}

/// Project mapping layer, relative to the working directory
pub fn project_mappings_file() -> PathBuf {
    PathBuf::from(MAPPINGS_FILE)
}

/// Daily-rotated debug logs
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(LOGS_DIR))
}

fn ensure_dir(path: &Path) -> Result<PathBuf, String> {
    fs::create_dir_all(path)
        .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))?;
    Ok(path.to_path_buf())
}

pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let logs = logs_dir().ok_or_else(|| "No config directory available".to_string())?;
    ensure_dir(&logs)
}
