//! C1 — Credential Resolver.
//!
//! Grounded in the `keyring-store`/`secrets` crates for the dependency
//! choices (`keyring` for the OS layer) and generalized with a raw
//! AES-256-GCM + PBKDF2 construction for the encrypted local fallback,
//! since an `age`-based secrets crate solves a different
//! (passphrase/recipient envelope) problem than the one faced here.

mod crypto;
mod env;
mod file_store;
mod keychain;

use std::path::PathBuf;

use async_trait::async_trait;
use cmdforge_core::error::AppResult;
use cmdforge_core::traits::CredentialResolver;
use file_store::FileStore;
use tracing::instrument;

/// Resolves `(provider, kind)` through env vars, then the OS keychain (if
/// a startup probe succeeds), then the encrypted local file, in that
/// order.
pub struct DefaultCredentialResolver {
    file_store: FileStore,
    keychain_available: bool,
}

impl DefaultCredentialResolver {
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            keychain_available: keychain::probe_available(),
            file_store: FileStore::new(config_dir.join("credentials.enc")),
        }
    }

    /// Accounts stored for `service` in the encrypted file. The keychain
    /// has no portable enumeration API, so `list` only ever reflects the
    /// local fallback store, matching what an operator can actually
    /// recover without per-OS keychain tooling.
    pub async fn list(&self, service: &str) -> AppResult<Vec<String>> {
        self.file_store.list(service).await
    }
}

#[async_trait]
impl CredentialResolver for DefaultCredentialResolver {
    #[instrument(skip(self))]
    async fn retrieve(&self, provider: &str, kind: &str) -> AppResult<Option<String>> {
        if let Some(value) = env::resolve(provider, kind) {
            return Ok(Some(value));
        }
        if self.keychain_available {
            if let Some(value) = keychain::get(provider, kind) {
                return Ok(Some(value));
            }
        }
        self.file_store.get(provider, kind).await
    }

    #[instrument(skip(self, secret))]
    async fn store(&self, provider: &str, kind: &str, secret: &str) -> AppResult<()> {
        if self.keychain_available && keychain::set(provider, kind, secret).is_ok() {
            return Ok(());
        }
        self.file_store.set(provider, kind, secret).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, provider: &str, kind: &str) -> AppResult<()> {
        if self.keychain_available {
            // Best-effort: the keychain entry may simply not exist there.
            let _ = keychain::delete(provider, kind);
        }
        self.file_store.delete(provider, kind).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The OS keychain is unavailable in CI/sandboxed test environments,
    // so these exercise the resolver with the probe forced off by
    // constructing the file store directly rather than through `new`.
    fn resolver_without_keychain(config_dir: PathBuf) -> DefaultCredentialResolver {
        DefaultCredentialResolver {
            keychain_available: false,
            file_store: FileStore::new(config_dir.join("credentials.enc")),
        }
    }

    #[tokio::test]
    async fn env_var_takes_precedence_over_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver_without_keychain(dir.path().to_path_buf());
        resolver.store("openai", "api_key", "from-file").await.unwrap();

        std::env::set_var("OPENAI_API_KEY", "from-env");
        let resolved = resolver.retrieve("openai", "api_key").await.unwrap();
        std::env::remove_var("OPENAI_API_KEY");

        assert_eq!(resolved.as_deref(), Some("from-env"));
    }

    #[tokio::test]
    async fn falls_back_to_file_store_when_env_unset() {
        std::env::remove_var("OPENAI_API_KEY_API_KEY");
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("OPENAI_API_KEY_KEY");
        std::env::remove_var("OPENAI_KEY");
        std::env::remove_var("OPENAI_API_KEY_TOKEN");
        std::env::remove_var("OPENAI_TOKEN");

        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver_without_keychain(dir.path().to_path_buf());
        resolver.store("openai", "api_key", "from-file").await.unwrap();

        assert_eq!(resolver.retrieve("openai", "api_key").await.unwrap().as_deref(), Some("from-file"));
    }

    #[tokio::test]
    async fn unconfigured_credential_resolves_to_none() {
        std::env::remove_var("ACME_API_KEY_API_KEY");
        std::env::remove_var("ACME_API_KEY");
        std::env::remove_var("ACME_API_KEY_KEY");
        std::env::remove_var("ACME_KEY");
        std::env::remove_var("ACME_API_KEY_TOKEN");
        std::env::remove_var("ACME_TOKEN");

        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver_without_keychain(dir.path().to_path_buf());
        assert_eq!(resolver.retrieve("acme", "api_key").await.unwrap(), None);
    }
}
