//! Durable single-slot storage for the bearer token.
//!
//! Exactly one token is stored at a time under a fixed file name in the
//! application data directory. A new save overwrites the previous token.
//! Nothing else about the session is persisted; identity is always
//! re-derived from the token on load.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Token file name in the data directory
const TOKEN_FILE: &str = "token";

pub struct CredentialStore {
    data_dir: PathBuf,
}

impl CredentialStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Persist the raw token, replacing any previous one.
    pub fn save(&self, token: &str) -> Result<()> {
        let path = self.token_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, token).context("Failed to write token file")?;
        Ok(())
    }

    /// Load the stored token, if any.
    pub fn load(&self) -> Result<Option<String>> {
        let path = self.token_path();
        if !path.exists() {
            return Ok(None);
        }
        let token = std::fs::read_to_string(&path).context("Failed to read token file")?;
        let token = token.trim().to_string();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token))
    }

    /// Remove the stored token. Safe to call when nothing is stored.
    pub fn clear(&self) -> Result<()> {
        let path = self.token_path();
        if path.exists() {
            std::fs::remove_file(&path).context("Failed to remove token file")?;
        }
        Ok(())
    }

    fn token_path(&self) -> PathBuf {
        self.data_dir.join(TOKEN_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> CredentialStore {
        let dir = std::env::temp_dir()
            .join("staydesk-test")
            .join(format!("{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        CredentialStore::new(dir)
    }

    #[test]
    fn round_trip() {
        let store = temp_store("round_trip");
        assert_eq!(store.load().unwrap(), None);

        store.save("abc.def.ghi").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc.def.ghi"));

        // Last writer wins
        store.save("second.token.here").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("second.token.here"));
    }

    #[test]
    fn clear_is_idempotent() {
        let store = temp_store("clear");
        store.save("abc.def.ghi").unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);

        // Clearing an empty store is not an error
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
