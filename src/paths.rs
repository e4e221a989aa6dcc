//! Common paths for glimpse data storage
//!
//! All glimpse data is stored under ~/.config/glimpse/ on all platforms:
//! - config.toml - User configuration
//! - credentials.enc - Encrypted identity grant

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the glimpse data directory (~/.config/glimpse/)
///
/// This is consistent across all platforms for simplicity.
pub fn glimpse_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let dir = home.join(".config").join("glimpse");
    fs::create_dir_all(&dir).context("Failed to create glimpse directory")?;
    Ok(dir)
}

/// Get the config file path (~/.config/glimpse/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(glimpse_dir()?.join("config.toml"))
}

/// Get the credentials file path (~/.config/glimpse/credentials.enc)
pub fn credentials_path() -> Result<PathBuf> {
    Ok(glimpse_dir()?.join("credentials.enc"))
}
