//! KeyStore: the single symmetric key used for every entry.
//!
//! Generated once on first use and persisted as 32 raw bytes with
//! restrictive permissions. The same key must be used for the life of the
//! data directory; replacing it leaves prior entries undecryptable.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use zeroize::Zeroizing;

use crate::crypto::{self, KEY_LEN};
use crate::error::MemoirError;

pub struct KeyStore {
    key: Zeroizing<[u8; KEY_LEN]>,
    path: PathBuf,
}

impl KeyStore {
    /// Load the key file, creating it (and its parent directory) on first
    /// use. The key is cached in the returned handle for the process
    /// lifetime. Fails if an existing file is not exactly 32 bytes.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, MemoirError> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            let bytes = fs::read(&path)?;
            let key: [u8; KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
                MemoirError::Storage(format!(
                    "key file {} is {} bytes, expected {}",
                    path.display(),
                    bytes.len(),
                    KEY_LEN
                ))
            })?;
            return Ok(Self {
                key: Zeroizing::new(key),
                path,
            });
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let key = crypto::generate_key();
        write_restricted(&path, key.as_slice())?;
        info!("generated new encryption key at {}", path.display());
        Ok(Self { key, path })
    }

    pub fn key(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    /// Short fingerprint for display; the key itself never leaves the store
    /// except through `key()`.
    pub fn fingerprint(&self) -> String {
        crypto::key_fingerprint(&self.key)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn write_restricted(path: &Path, bytes: &[u8]) -> Result<(), MemoirError> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(())
}

#[cfg(not(unix))]
fn write_restricted(path: &Path, bytes: &[u8]) -> Result<(), MemoirError> {
    fs::write(path, bytes)?;
    Ok(())
}
