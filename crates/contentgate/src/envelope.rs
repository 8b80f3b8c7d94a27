//! Encrypted object envelopes.
//!
//! Encrypted content is stored off-chain as a CBOR [`EncryptedObject`]
//! wrapping ChaCha20-Poly1305 ciphertext. [`DecryptingFetcher`] unwraps it
//! for any fetcher that returns raw stored bytes.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use contentgate_core::{ContentHash, ContentReference, EncryptionType, OutputFormat};

use crate::fetch::{ContentFetcher, FetchError};

/// A 256-bit symmetric content key for ChaCha20-Poly1305.
#[derive(Clone)]
pub struct ContentKey([u8; 32]);

impl ContentKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.0))
    }
}

impl std::fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ContentKey(..)")
    }
}

/// Format identifier for encrypted objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum EnvelopeFormat {
    /// ChaCha20-Poly1305 with 256-bit key.
    ChaCha20Poly1305 = 1,
}

/// An encrypted off-chain object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedObject {
    pub format: EnvelopeFormat,

    /// Unique per encryption.
    pub nonce: [u8; 12],

    /// Ciphertext including the authentication tag.
    pub ciphertext: Vec<u8>,
}

impl EncryptedObject {
    /// Encrypt plaintext with the given key under a fresh nonce.
    pub fn seal(plaintext: &[u8], key: &ContentKey) -> Result<Self, FetchError> {
        let mut nonce = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = key
            .cipher()
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| FetchError::Backend(anyhow::anyhow!("encryption failed: {e}")))?;

        Ok(Self {
            format: EnvelopeFormat::ChaCha20Poly1305,
            nonce,
            ciphertext,
        })
    }

    /// Decrypt with the given key.
    pub fn open(&self, key: &ContentKey) -> Result<Vec<u8>, FetchError> {
        match self.format {
            EnvelopeFormat::ChaCha20Poly1305 => key
                .cipher()
                .decrypt(Nonce::from_slice(&self.nonce), self.ciphertext.as_slice())
                .map_err(|_| FetchError::Decryption("authentication failed".into())),
        }
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FetchError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| FetchError::Backend(anyhow::anyhow!("envelope encoding failed: {e}")))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FetchError> {
        ciborium::from_reader(bytes)
            .map_err(|e| FetchError::Decryption(format!("malformed envelope: {e}")))
    }
}

/// Content keys held by the viewing service, keyed by content hash.
#[derive(Default)]
pub struct KeyRing {
    keys: RwLock<HashMap<ContentHash, ContentKey>>,
}

impl KeyRing {
    /// Create an empty key ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the key for a content hash, replacing any previous key.
    pub fn insert(&self, hash: ContentHash, key: ContentKey) {
        // A poisoned ring still holds valid keys.
        let mut keys = self.keys.write().unwrap_or_else(|e| e.into_inner());
        keys.insert(hash, key);
    }

    /// Look up the key for a content hash.
    pub fn get(&self, hash: &ContentHash) -> Option<ContentKey> {
        let keys = self.keys.read().unwrap_or_else(|e| e.into_inner());
        keys.get(hash).cloned()
    }
}

/// Wraps a fetcher of stored bytes, opening envelopes of encrypted content.
pub struct DecryptingFetcher<F> {
    inner: F,
    keys: KeyRing,
}

impl<F: ContentFetcher> DecryptingFetcher<F> {
    /// Wrap `inner`, decrypting with keys from `keys`.
    pub fn new(inner: F, keys: KeyRing) -> Self {
        Self { inner, keys }
    }
}

#[async_trait]
impl<F: ContentFetcher> ContentFetcher for DecryptingFetcher<F> {
    async fn fetch(
        &self,
        content: &ContentReference,
        format: OutputFormat,
    ) -> Result<Bytes, FetchError> {
        let stored = self.inner.fetch(content, format).await?;
        if !content.encrypted {
            return Ok(stored);
        }

        match &content.encryption_type {
            Some(EncryptionType::ChaCha20Poly1305) | None => {}
            Some(other) => {
                return Err(FetchError::Decryption(format!("unsupported scheme {other}")));
            }
        }

        let key = self
            .keys
            .get(&content.content_hash)
            .ok_or_else(|| FetchError::Decryption(format!("no key for {}", content.content_hash)))?;

        let plaintext = EncryptedObject::from_bytes(&stored)?.open(&key)?;
        Ok(Bytes::from(plaintext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentgate_core::{ContentRegistration, ContentType, StorageNetwork};

    struct Stored(Bytes);

    #[async_trait]
    impl ContentFetcher for Stored {
        async fn fetch(&self, _: &ContentReference, _: OutputFormat) -> Result<Bytes, FetchError> {
            Ok(self.0.clone())
        }
    }

    fn encrypted_content(scheme: EncryptionType) -> ContentReference {
        ContentRegistration::new("H1", ContentType::Image, 4, StorageNetwork::Private, "alice")
            .encrypted(scheme)
            .build(0)
    }

    #[test]
    fn test_seal_open() {
        let key = ContentKey::generate();
        let sealed = EncryptedObject::seal(b"pixels", &key).unwrap();

        let bytes = sealed.to_bytes().unwrap();
        let parsed = EncryptedObject::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.open(&key).unwrap(), b"pixels");

        assert!(matches!(
            parsed.open(&ContentKey::generate()),
            Err(FetchError::Decryption(_))
        ));
    }

    #[tokio::test]
    async fn test_decrypting_fetcher_opens_envelope() {
        let key = ContentKey::from_bytes([7; 32]);
        let sealed = EncryptedObject::seal(b"pixels", &key).unwrap().to_bytes().unwrap();

        let ring = KeyRing::new();
        ring.insert("H1".into(), key);
        let fetcher = DecryptingFetcher::new(Stored(Bytes::from(sealed)), ring);

        let bytes = fetcher
            .fetch(&encrypted_content(EncryptionType::ChaCha20Poly1305), OutputFormat::Png)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"pixels");
    }

    #[tokio::test]
    async fn test_missing_key_is_decryption_failure() {
        let sealed = EncryptedObject::seal(b"pixels", &ContentKey::generate())
            .unwrap()
            .to_bytes()
            .unwrap();
        let fetcher = DecryptingFetcher::new(Stored(Bytes::from(sealed)), KeyRing::new());

        let result = fetcher
            .fetch(&encrypted_content(EncryptionType::ChaCha20Poly1305), OutputFormat::Png)
            .await;
        assert!(matches!(result, Err(FetchError::Decryption(_))));
    }

    #[tokio::test]
    async fn test_unencrypted_passthrough_and_unsupported_scheme() {
        let fetcher = DecryptingFetcher::new(Stored(Bytes::from_static(b"raw")), KeyRing::new());

        let plain =
            ContentRegistration::new("H2", ContentType::Image, 3, StorageNetwork::Ipfs, "alice")
                .build(0);
        let bytes = fetcher.fetch(&plain, OutputFormat::Jpeg).await.unwrap();
        assert_eq!(&bytes[..], b"raw");

        let result = fetcher
            .fetch(&encrypted_content(EncryptionType::Aes256Gcm), OutputFormat::Jpeg)
            .await;
        assert!(matches!(result, Err(FetchError::Decryption(_))));
    }
}
