//! API key encryption for the bearer credential.
//!
//! Wire layout, base64 encoded:
//! ```text
//! version (1 byte) | iv (16 bytes) | tag (16 bytes) | ciphertext
//! ```
//! AES-256-GCM with a fresh random 16-byte IV per call, so the same key
//! never produces the same token twice.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit, OsRng};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;
use thiserror::Error;

use crate::config::SecurityConfig;

type Aes256Gcm16 = AesGcm<Aes256, U16>;

const IV_LEN: usize = 16;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = 1 + IV_LEN + TAG_LEN;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("invalid encryption key: {0}")]
    InvalidKey(String),

    #[error("Invalid key version {0}")]
    UnknownVersion(u8),

    #[error("malformed ciphertext")]
    Malformed,

    #[error("encryption failed")]
    Encrypt,

    #[error("decryption failed")]
    Decrypt,
}

/// Versioned AES-256-GCM key ring.
#[derive(Clone)]
pub struct ApiKeyCipher {
    current: u8,
    keys: HashMap<u8, Aes256Gcm16>,
}

impl ApiKeyCipher {
    /// Cipher using `key` (32 bytes) under `version`.
    pub fn with_key(version: u8, key: &[u8]) -> Result<Self, CipherError> {
        let cipher = Aes256Gcm16::new_from_slice(key)
            .map_err(|_| CipherError::InvalidKey(format!("expected 32 bytes, got {}", key.len())))?;
        Ok(Self {
            current: version,
            keys: HashMap::from([(version, cipher)]),
        })
    }

    /// Cipher with a key generated for this process only.
    pub fn random(version: u8) -> Self {
        let key = Aes256Gcm16::generate_key(&mut OsRng);
        Self {
            current: version,
            keys: HashMap::from([(version, Aes256Gcm16::new(&key))]),
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, CipherError> {
        match &config.encryption_key {
            Some(encoded) => {
                let key = STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| CipherError::InvalidKey(e.to_string()))?;
                Self::with_key(config.key_version, &key)
            }
            None => {
                tracing::warn!(
                    key_version = config.key_version,
                    "No encryption key configured, using a random per-process key"
                );
                Ok(Self::random(config.key_version))
            }
        }
    }

    /// Register an additional key that can still decrypt older tokens.
    pub fn add_key(&mut self, version: u8, key: &[u8]) -> Result<(), CipherError> {
        let cipher = Aes256Gcm16::new_from_slice(key)
            .map_err(|_| CipherError::InvalidKey(format!("expected 32 bytes, got {}", key.len())))?;
        self.keys.insert(version, cipher);
        Ok(())
    }

    pub fn version(&self) -> u8 {
        self.current
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let cipher = self
            .keys
            .get(&self.current)
            .ok_or(CipherError::UnknownVersion(self.current))?;

        let iv = Aes256Gcm16::generate_nonce(&mut OsRng);
        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = cipher
            .encrypt_in_place_detached(&iv, b"", &mut buffer)
            .map_err(|_| CipherError::Encrypt)?;

        let mut out = Vec::with_capacity(HEADER_LEN + buffer.len());
        out.push(self.current);
        out.extend_from_slice(&iv);
        out.extend_from_slice(&tag);
        out.extend_from_slice(&buffer);
        Ok(STANDARD.encode(out))
    }

    pub fn decrypt(&self, token: &str) -> Result<String, CipherError> {
        let data = STANDARD.decode(token).map_err(|_| CipherError::Malformed)?;
        if data.len() < HEADER_LEN {
            return Err(CipherError::Malformed);
        }

        let version = data[0];
        let cipher = self
            .keys
            .get(&version)
            .ok_or(CipherError::UnknownVersion(version))?;

        let iv = GenericArray::from_slice(&data[1..1 + IV_LEN]);
        let tag = GenericArray::from_slice(&data[1 + IV_LEN..HEADER_LEN]);
        let mut buffer = data[HEADER_LEN..].to_vec();
        cipher
            .decrypt_in_place_detached(iv, b"", &mut buffer, tag)
            .map_err(|_| CipherError::Decrypt)?;

        String::from_utf8(buffer).map_err(|_| CipherError::Decrypt)
    }
}

impl std::fmt::Debug for ApiKeyCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut versions: Vec<_> = self.keys.keys().copied().collect();
        versions.sort_unstable();
        f.debug_struct("ApiKeyCipher")
            .field("current", &self.current)
            .field("versions", &versions)
            .finish()
    }
}
