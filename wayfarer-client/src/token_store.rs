//! Session token persisted as a small JSON file.

use std::sync::{Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use wayfarer_core::TokenStore;
use wayfarer_core::service::TokenStoreError;

/// Key under which the token is stored.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    token: String,
}

/// [`TokenStore`] backed by `{"token": "..."}` on disk.
///
/// Reads go to the file each time so several processes observe the same
/// session; the mutex serialises access within one process.
#[derive(Debug)]
pub struct FileTokenStore {
    path: Utf8PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    /// Store persisting to `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// File holding the token.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let text = match wayfarer_fs::read_optional_string(&self.path) {
            Ok(text) => text?,
            Err(err) => {
                log::warn!("failed to read session file {}: {err}", self.path);
                return None;
            }
        };
        match serde_json::from_str::<TokenFile>(&text) {
            Ok(file) if !file.token.trim().is_empty() => Some(file.token),
            Ok(_) => None,
            Err(err) => {
                log::warn!("ignoring unreadable session file {}: {err}", self.path);
                None
            }
        }
    }

    fn store(&self, token: &str) -> Result<(), TokenStoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let body = serde_json::to_vec(&TokenFile {
            token: token.to_owned(),
        })
        .map_err(|err| TokenStoreError {
            message: err.to_string(),
        })?;
        wayfarer_fs::write_bytes(&self.path, &body).map_err(|err| TokenStoreError {
            message: format!("{}: {err}", self.path),
        })
    }

    fn clear(&self) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = wayfarer_fs::remove_if_exists(&self.path) {
            log::warn!("failed to remove session file {}: {err}", self.path);
        }
    }
}
