//! Encrypted local fallback store. A single `credentials.enc` file holds
//! one [`crate::crypto::SealedBlob`]
//! whose plaintext is a JSON map keyed `"<provider>:<kind>"`; every write
//! re-derives a fresh salt and nonce, so the whole map is re-sealed on
//! each `store`/`delete`.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use cmdforge_core::error::AppError;
use cmdforge_core::error::AppResult;
use cmdforge_core::error::ErrorKind;

use crate::crypto;
use crate::crypto::SealedBlob;

const COMPONENT: &str = "cmdforge-credentials";

fn key(provider: &str, kind: &str) -> String {
    format!("{provider}:{kind}")
}

fn machine_passphrase() -> Vec<u8> {
    let hostname = gethostname::gethostname().to_string_lossy().into_owned();
    let user = std::env::var("USER").or_else(|_| std::env::var("USERNAME")).unwrap_or_default();
    format!("{hostname}:{user}:{}", std::env::consts::OS).into_bytes()
}

fn io_error(operation: &'static str, err: std::io::Error) -> AppError {
    AppError::new(ErrorKind::Configuration, COMPONENT, operation, "credential store I/O failed").with_cause(err)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

pub struct FileStore {
    path: PathBuf,
    passphrase: Vec<u8>,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            passphrase: machine_passphrase(),
        }
    }

    async fn load_map(&self) -> AppResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| io_error("load", e))?;
        let blob: SealedBlob = serde_json::from_slice(&bytes).map_err(|e| {
            AppError::new(ErrorKind::Configuration, COMPONENT, "load", "malformed credentials.enc").with_cause(e)
        })?;
        let plaintext = crypto::unseal(&self.passphrase, &blob).map_err(|e| {
            AppError::new(ErrorKind::Configuration, COMPONENT, "load", "could not decrypt credential store").with_cause(e)
        })?;
        serde_json::from_slice(&plaintext).map_err(|e| {
            AppError::new(ErrorKind::Configuration, COMPONENT, "load", "corrupted credential store payload").with_cause(e)
        })
    }

    async fn save_map(&self, map: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| io_error("save", e))?;
            restrict_permissions(parent, 0o700).map_err(|e| io_error("save", e))?;
        }
        let plaintext = serde_json::to_vec(map)
            .map_err(|e| AppError::new(ErrorKind::Internal, COMPONENT, "save", "could not serialize credential map").with_cause(e))?;
        let blob = crypto::seal(&self.passphrase, &plaintext);
        let json = serde_json::to_vec_pretty(&blob)
            .map_err(|e| AppError::new(ErrorKind::Internal, COMPONENT, "save", "could not serialize sealed blob").with_cause(e))?;

        tokio::fs::write(&self.path, json).await.map_err(|e| io_error("save", e))?;
        restrict_permissions(&self.path, 0o600).map_err(|e| io_error("save", e))?;
        Ok(())
    }

    pub async fn get(&self, provider: &str, kind: &str) -> AppResult<Option<String>> {
        Ok(self.load_map().await?.get(&key(provider, kind)).cloned())
    }

    pub async fn set(&self, provider: &str, kind: &str, secret: &str) -> AppResult<()> {
        let mut map = self.load_map().await?;
        map.insert(key(provider, kind), secret.to_string());
        self.save_map(&map).await
    }

    pub async fn delete(&self, provider: &str, kind: &str) -> AppResult<()> {
        let mut map = self.load_map().await?;
        map.remove(&key(provider, kind));
        self.save_map(&map).await
    }

    pub async fn list(&self, service: &str) -> AppResult<Vec<String>> {
        let prefix = format!("{service}:");
        Ok(self
            .load_map()
            .await?
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("credentials.enc"));

        assert_eq!(store.get("openai", "api_key").await.unwrap(), None);

        store.set("openai", "api_key", "sk-test").await.unwrap();
        assert_eq!(store.get("openai", "api_key").await.unwrap().as_deref(), Some("sk-test"));

        let accounts = store.list("openai").await.unwrap();
        assert_eq!(accounts, vec!["api_key".to_string()]);

        store.delete("openai", "api_key").await.unwrap();
        assert_eq!(store.get("openai", "api_key").await.unwrap(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_mode_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.enc");
        let store = FileStore::new(path.clone());
        store.set("openai", "api_key", "sk-test").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
