use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use crate::error::MemoirError;

pub const APP_QUALIFIER: &str = "io";
pub const APP_ORG: &str = "memoir";
pub const APP_NAME: &str = "memoir";

pub const KEY_FILE_NAME: &str = "secret.key";
pub const PIN_FILE_NAME: &str = "pin.json";
pub const DATA_FILE_NAME: &str = "memories.json";

/// Per-user data directory. `MEMOIR_DATA_DIR` overrides the platform default.
pub fn data_dir() -> Result<PathBuf, MemoirError> {
    if let Ok(override_path) = std::env::var("MEMOIR_DATA_DIR") {
        return Ok(PathBuf::from(override_path));
    }
    let dirs = ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .ok_or_else(|| MemoirError::Storage("cannot determine data directory".into()))?;
    Ok(dirs.data_dir().to_path_buf())
}

pub fn key_file(dir: &Path) -> PathBuf {
    dir.join(KEY_FILE_NAME)
}

pub fn pin_file(dir: &Path) -> PathBuf {
    dir.join(PIN_FILE_NAME)
}

pub fn data_file(dir: &Path) -> PathBuf {
    dir.join(DATA_FILE_NAME)
}
