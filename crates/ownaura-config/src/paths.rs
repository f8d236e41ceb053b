//! Platform-specific configuration paths.
//!
//! # Directory Structure
//!
//! - **User config**: `~/.config/ownaura/` (Linux), `~/Library/Application Support/ownaura/` (macOS), `%APPDATA%\ownaura\` (Windows)
//!
//! # Example
//!
//! ```rust,no_run
//! use ownaura_config::paths;
//!
//! println!("User config: {:?}", paths::user_config_file());
//! ```

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::validation::validate_config;

/// Application name used for directory paths.
const APP_NAME: &str = "ownaura";

/// File name of the user configuration.
const CONFIG_FILE: &str = "config.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the path of the user configuration file.
pub fn user_config_file() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

/// Ensure the user config directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_config_dir() -> Result<PathBuf> {
    let dir = user_config_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}

/// Locate the configuration file to use.
///
/// Searches in the following order:
/// 1. `explicit`, which must exist when given
/// 2. The user configuration file
///
/// Returns `Ok(None)` when neither applies and built-in defaults are used.
pub fn find_config(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(Some(path.to_path_buf()))
        } else {
            Err(ConfigError::NotFound(path.to_path_buf()))
        };
    }

    let user = user_config_file();
    Ok(user.is_file().then_some(user))
}

/// Load and validate the configuration following [`find_config`].
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let config = match find_config(explicit)? {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    validate_config(&config)?;
    Ok(config)
}
