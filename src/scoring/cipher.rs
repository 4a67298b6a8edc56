// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use std::fmt;

use crate::errors::ScoringError;

/// Length of a blob encryption key in bytes
pub const KEY_LEN: usize = 32;
/// Length of the per-blob nonce prefixed to every sealed blob
pub const NONCE_LEN: usize = 12;

/// Authenticated encryption for blobs stored with `encrypt = true`.
///
/// Sealed blobs are laid out as `nonce || ciphertext`. The storage key is
/// bound as associated data, so a sealed blob only opens under the key it was
/// stored with.
///
/// # Example
/// ```
/// use spacejar::scoring::BlobCipher;
///
/// let cipher = BlobCipher::new(&[42u8; 32]);
/// let sealed = cipher.seal("custom_key", b"custom data").unwrap();
/// assert_ne!(&sealed[..], b"custom data");
/// assert_eq!(cipher.open("custom_key", &sealed).unwrap(), b"custom data");
/// ```
pub struct BlobCipher {
    cipher: ChaCha20Poly1305,
}

impl BlobCipher {
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(key)),
        }
    }

    /// Cipher with a fresh random key; blobs sealed with it cannot outlive the process.
    pub fn generate() -> Self {
        let key = ChaCha20Poly1305::generate_key(&mut OsRng);
        Self {
            cipher: ChaCha20Poly1305::new(&key),
        }
    }

    pub fn seal(&self, key: &str, plaintext: &[u8]) -> Result<Vec<u8>, ScoringError> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let payload = Payload {
            msg: plaintext,
            aad: key.as_bytes(),
        };
        let ciphertext = self
            .cipher
            .encrypt(&nonce, payload)
            .map_err(|_| ScoringError::storage(key, "encryption failed"))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(nonce.as_slice());
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    pub fn open(&self, key: &str, sealed: &[u8]) -> Result<Vec<u8>, ScoringError> {
        if sealed.len() < NONCE_LEN {
            return Err(ScoringError::storage(key, "sealed blob shorter than its nonce"));
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let payload = Payload {
            msg: ciphertext,
            aad: key.as_bytes(),
        };
        self.cipher
            .decrypt(Nonce::from_slice(nonce), payload)
            .map_err(|_| ScoringError::storage(key, "decryption failed"))
    }
}

impl Default for BlobCipher {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Debug for BlobCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobCipher").finish_non_exhaustive()
    }
}
