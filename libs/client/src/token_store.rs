//! Persistent storage for the bearer token
//!
//! The token is keyed singly, not per-user, mirroring the single storage
//! slot of the hosted client. Stores are synchronous; callers treat failures
//! as advisory (a session can live without persistence).

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use common::config::ClientConfig;

/// Storage behind the session's persisted bearer token
pub trait TokenStore: Send + Sync {
    /// Read the persisted token, if any.
    fn load(&self) -> Result<Option<String>>;

    /// Persist the token, replacing any previous one.
    fn save(&self, token: &str) -> Result<()>;

    /// Remove the persisted token; a no-op when none exists.
    fn clear(&self) -> Result<()>;
}

/// Pick the store the configuration asks for: file-backed when a token file
/// path is set, in-memory otherwise.
pub fn from_config(config: &ClientConfig) -> Box<dyn TokenStore> {
    match &config.token_file {
        Some(path) => Box::new(FileTokenStore::new(path.clone())),
        None => Box::new(MemoryTokenStore::default()),
    }
}

#[derive(Serialize, Deserialize)]
struct TokenRecord {
    token: String,
}

/// File-backed token store
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read token file {}", self.path.display()))?;
        let record: TokenRecord =
            serde_json::from_str(&raw).context("token file holds unexpected content")?;
        Ok(Some(record.token))
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let record = TokenRecord {
            token: token.to_string(),
        };
        fs::write(&self.path, serde_json::to_string(&record)?)
            .with_context(|| format!("failed to write token file {}", self.path.display()))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("failed to remove token file {}", self.path.display())
            }),
        }
    }
}

/// In-memory token store for tests and short-lived processes
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.lock().expect("token store lock poisoned").clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.lock().expect("token store lock poisoned") = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().expect("token store lock poisoned") = None;
        Ok(())
    }
}
