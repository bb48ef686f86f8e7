//! AES-256-GCM encryption with a PBKDF2-HMAC-SHA256 derived key. A
//! `codex-secrets`-style crate might reach for `age` instead, which solves
//! a different problem (passphrase/recipient envelope encryption); this
//! construction is deliberately the narrower raw AEAD the fallback store
//! actually needs.

use aes_gcm::aead::Aead;
use aes_gcm::aead::KeyInit;
use aes_gcm::aead::OsRng;
use aes_gcm::Aes256Gcm;
use aes_gcm::Key;
use aes_gcm::Nonce;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::RngCore;
use sha2::Sha256;

pub const SALT_LEN: usize = 32;
pub const NONCE_LEN: usize = 12;
const PBKDF2_ROUNDS: u32 = 100_000;

/// `{salt, nonce, encrypted}` tuple, each persisted base64-encoded (spec
/// §6 persisted-state layout).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SealedBlob {
    pub salt: String,
    pub nonce: String,
    pub encrypted: String,
}

fn derive_key(passphrase: &[u8], salt: &[u8]) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase, salt, PBKDF2_ROUNDS, &mut key);
    key
}

/// Encrypts `plaintext` under key material derived from `passphrase`, with
/// a fresh random 32-byte salt and 12-byte nonce on every write.
pub fn seal(passphrase: &[u8], plaintext: &[u8]) -> SealedBlob {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let key_bytes = derive_key(passphrase, &salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
    let nonce = Nonce::from_slice(&nonce_bytes);
    // Only ever fails on message length overflow, which never happens for
    // the small JSON credential maps this crate encrypts.
    let encrypted = cipher
        .encrypt(nonce, plaintext)
        .unwrap_or_else(|_| panic!("aes-gcm encryption of a bounded credential blob cannot fail"));

    SealedBlob {
        salt: BASE64.encode(salt),
        nonce: BASE64.encode(nonce_bytes),
        encrypted: BASE64.encode(encrypted),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UnsealError {
    #[error("malformed base64 in encrypted credential store: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("credential store decryption failed (wrong passphrase or corrupted file)")]
    Decrypt,
}

/// Decrypts a [`SealedBlob`] previously produced by [`seal`] with the same
/// `passphrase`.
pub fn unseal(passphrase: &[u8], blob: &SealedBlob) -> Result<Vec<u8>, UnsealError> {
    let salt = BASE64.decode(&blob.salt)?;
    let nonce_bytes = BASE64.decode(&blob.nonce)?;
    let ciphertext = BASE64.decode(&blob.encrypted)?;

    let key_bytes = derive_key(passphrase, &salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
    let nonce = Nonce::from_slice(&nonce_bytes);
    cipher.decrypt(nonce, ciphertext.as_ref()).map_err(|_| UnsealError::Decrypt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let passphrase = b"machine-specific-material";
        let blob = seal(passphrase, b"{\"openai:api_key\":\"sk-test\"}");
        let recovered = unseal(passphrase, &blob).unwrap();
        assert_eq!(recovered, b"{\"openai:api_key\":\"sk-test\"}");
    }

    #[test]
    fn wrong_passphrase_fails() {
        let blob = seal(b"right", b"payload");
        assert!(unseal(b"wrong", &blob).is_err());
    }

    #[test]
    fn each_seal_uses_a_fresh_salt_and_nonce() {
        let a = seal(b"pass", b"payload");
        let b = seal(b"pass", b"payload");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.nonce, b.nonce);
    }
}
