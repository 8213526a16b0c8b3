//! Token pair persistence on the client machine.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use pluribus_auth::TokenPair;

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("failed to read persisted tokens: {0}")]
    Read(String),
    #[error("failed to write persisted tokens: {0}")]
    Write(String),
}

/// Where the gateway keeps the persisted pair between runs.
///
/// `load` of an absent pair is `Ok(None)`, not an error; a client that has
/// never logged in is a normal state.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<TokenPair>, TokenStoreError>;
    fn save(&self, pair: &TokenPair) -> Result<(), TokenStoreError>;
    fn clear(&self) -> Result<(), TokenStoreError>;
}

impl<S> TokenStore for Arc<S>
where
    S: TokenStore + ?Sized,
{
    fn load(&self) -> Result<Option<TokenPair>, TokenStoreError> {
        (**self).load()
    }

    fn save(&self, pair: &TokenPair) -> Result<(), TokenStoreError> {
        (**self).save(pair)
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        (**self).clear()
    }
}

/// Process-local store for tests and short-lived tools.
#[derive(Default)]
pub struct MemoryTokenStore {
    inner: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<TokenPair>, TokenStoreError> {
        Ok(self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn save(&self, pair: &TokenPair) -> Result<(), TokenStoreError> {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(pair.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

/// JSON file store; the pair survives process restarts.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<TokenPair>, TokenStoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TokenStoreError::Read(e.to_string())),
        };

        match serde_json::from_str(&raw) {
            Ok(pair) => Ok(Some(pair)),
            Err(e) => {
                // A corrupt file is treated as no session; the next login
                // overwrites it.
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable token file");
                Ok(None)
            }
        }
    }

    fn save(&self, pair: &TokenPair) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TokenStoreError::Write(e.to_string()))?;
        }

        let raw = serde_json::to_string(pair).map_err(|e| TokenStoreError::Write(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| TokenStoreError::Write(e.to_string()))
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TokenStoreError::Write(e.to_string())),
        }
    }
}
