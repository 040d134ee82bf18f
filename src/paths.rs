//! Centralized path resolution
//!
//! All files the client touches live under one per-user data directory,
//! resolved through platform conventions:
//! - **macOS**: `~/Library/Application Support/Postsiva/`
//! - **Windows**: `%APPDATA%\Postsiva\`
//! - **Linux**: `$XDG_DATA_HOME/Postsiva/` (fallback `~/.local/share/Postsiva/`)
//!
//! ```text
//! Postsiva/
//! ├── config.json
//! └── response_cache.json
//! ```

use std::fs;
use std::path::PathBuf;

use crate::errors::{ClientError, ClientResult};

const APP_DIR_NAME: &str = "Postsiva";

/// Base data directory for config and cache files.
///
/// Falls back to `./data` when the platform directory cannot be resolved
/// (e.g. stripped-down containers without a home directory).
pub fn data_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(base) => base.join(APP_DIR_NAME),
        None => PathBuf::from("data"),
    }
}

/// Create the data directory if it does not exist yet.
pub fn ensure_data_dir() -> ClientResult<PathBuf> {
    let dir = data_dir();
    fs::create_dir_all(&dir).map_err(|e| {
        ClientError::Config(format!(
            "Failed to create data directory {}: {}",
            dir.display(),
            e
        ))
    })?;
    Ok(dir)
}

/// Default location of the JSON configuration file.
pub fn config_file() -> PathBuf {
    data_dir().join("config.json")
}

/// Default location of the persisted response-cache snapshot.
pub fn cache_snapshot_file() -> PathBuf {
    data_dir().join("response_cache.json")
}
