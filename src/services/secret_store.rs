// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access token storage.
//!
//! The store holds at most one token. [`EncryptedFileStore`] keeps it
//! encrypted at rest with AES-256-GCM under a key derived (HKDF-SHA256) from a
//! configured passphrase. [`MemorySecretStore`] keeps it in memory only.

use crate::error::AppError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hkdf::Hkdf;
use parking_lot::Mutex;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Durable single-token store.
///
/// Implementations must make each call atomic; callers never read-modify-write.
pub trait SecretStore: Send + Sync {
    /// The stored token, if any.
    fn get(&self) -> Result<Option<String>, AppError>;

    /// Replace the stored token; `None` deletes it.
    fn set(&self, token: Option<&str>) -> Result<(), AppError>;

    fn clear(&self) -> Result<(), AppError> {
        self.set(None)
    }
}

/// In-memory token store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemorySecretStore {
    token: Mutex<Option<String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `token`.
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self) -> Result<Option<String>, AppError> {
        Ok(self.token.lock().clone())
    }

    fn set(&self, token: Option<&str>) -> Result<(), AppError> {
        *self.token.lock() = token.map(String::from);
        Ok(())
    }
}

/// File-backed token store, encrypted at rest.
///
/// File contents: base64(nonce || ciphertext || tag).
pub struct EncryptedFileStore {
    path: PathBuf,
    key: LessSafeKey,
    rng: SystemRandom,
    /// Serializes writers within this process
    io_lock: Mutex<()>,
}

impl EncryptedFileStore {
    const HKDF_SALT: &'static [u8] = b"photofeed-token-store-v1";
    const HKDF_INFO: &'static [u8] = b"access-token";
    /// Bound into every ciphertext so a blob from another purpose won't open.
    const AAD: &'static [u8] = b"photofeed:access_token";

    /// Open (or prepare to create) the store at `path`.
    pub fn new(path: impl Into<PathBuf>, passphrase: &str) -> Result<Self, AppError> {
        if passphrase.is_empty() {
            return Err(AppError::SecretStore(
                "Token store passphrase must not be empty".to_string(),
            ));
        }

        let mut key_bytes = [0u8; 32];
        Hkdf::<Sha256>::new(Some(Self::HKDF_SALT), passphrase.as_bytes())
            .expand(Self::HKDF_INFO, &mut key_bytes)
            .map_err(|e| AppError::SecretStore(format!("Key derivation failed: {}", e)))?;

        let unbound = UnboundKey::new(&AES_256_GCM, &key_bytes)
            .map_err(|_| AppError::SecretStore("Invalid AES-256-GCM key".to_string()))?;

        Ok(Self {
            path: path.into(),
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
            io_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encrypt(&self, plaintext: &str) -> Result<String, AppError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| AppError::SecretStore("Random nonce generation failed".to_string()))?;

        let mut in_out = plaintext.as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::from(Self::AAD),
                &mut in_out,
            )
            .map_err(|_| AppError::SecretStore("Encryption failed".to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + in_out.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&in_out);
        Ok(BASE64.encode(blob))
    }

    fn decrypt(&self, encoded: &str) -> Result<String, AppError> {
        let blob = BASE64
            .decode(encoded.trim())
            .map_err(|e| AppError::SecretStore(format!("Base64 decode failed: {}", e)))?;

        if blob.len() < NONCE_LEN {
            return Err(AppError::SecretStore("Stored token is truncated".to_string()));
        }

        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| AppError::SecretStore("Stored nonce is malformed".to_string()))?;

        let mut in_out = ciphertext.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::from(Self::AAD), &mut in_out)
            .map_err(|_| {
                AppError::SecretStore("Decryption failed (wrong key or tampered file)".to_string())
            })?;

        String::from_utf8(plaintext.to_vec())
            .map_err(|e| AppError::SecretStore(format!("UTF-8 decode failed: {}", e)))
    }

    fn write_atomically(&self, contents: &str) -> Result<(), AppError> {
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, contents)
            .map_err(|e| AppError::SecretStore(format!("Write {} failed: {}", tmp.display(), e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).map_err(
                |e| AppError::SecretStore(format!("chmod {} failed: {}", tmp.display(), e)),
            )?;
        }

        std::fs::rename(&tmp, &self.path).map_err(|e| {
            AppError::SecretStore(format!("Rename to {} failed: {}", self.path.display(), e))
        })
    }
}

impl SecretStore for EncryptedFileStore {
    fn get(&self) -> Result<Option<String>, AppError> {
        let _guard = self.io_lock.lock();

        let encoded = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::SecretStore(format!(
                    "Read {} failed: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        self.decrypt(&encoded).map(Some)
    }

    fn set(&self, token: Option<&str>) -> Result<(), AppError> {
        let _guard = self.io_lock.lock();

        match token {
            Some(token) => {
                let encoded = self.encrypt(token)?;
                self.write_atomically(&encoded)?;
                tracing::debug!(path = %self.path.display(), "Access token stored");
            }
            None => match std::fs::remove_file(&self.path) {
                Ok(()) => tracing::debug!(path = %self.path.display(), "Access token deleted"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(AppError::SecretStore(format!(
                        "Delete {} failed: {}",
                        self.path.display(),
                        e
                    )))
                }
            },
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_clear() {
        let store = MemorySecretStore::new();
        assert_eq!(store.get().unwrap(), None);

        store.set(Some("tok")).unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("tok"));

        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_encrypt_decrypt_uses_fresh_nonces() {
        let store = EncryptedFileStore::new("/nonexistent/token", "passphrase").unwrap();
        let a = store.encrypt("secret-token").unwrap();
        let b = store.encrypt("secret-token").unwrap();

        assert_ne!(a, b, "Each seal should use a new nonce");
        assert!(!a.contains("secret-token"));
        assert_eq!(store.decrypt(&a).unwrap(), "secret-token");
        assert_eq!(store.decrypt(&b).unwrap(), "secret-token");
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let store = EncryptedFileStore::new("/nonexistent/token", "right").unwrap();
        let other = EncryptedFileStore::new("/nonexistent/token", "wrong").unwrap();
        let sealed = store.encrypt("secret-token").unwrap();

        assert!(matches!(other.decrypt(&sealed), Err(AppError::SecretStore(_))));
        assert!(matches!(store.decrypt("AAAA"), Err(AppError::SecretStore(_))));
    }

    #[test]
    fn test_empty_passphrase_rejected() {
        assert!(matches!(
            EncryptedFileStore::new("/tmp/x", ""),
            Err(AppError::SecretStore(_))
        ));
    }
}
