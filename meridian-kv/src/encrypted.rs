use crate::error::{KvError, Result};
use crate::store::{KvEvent, KvStore};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use async_trait::async_trait;
use rand::RngCore;
use std::pin::Pin;
use std::time::Duration;
use tokio_stream::Stream;

const NONCE_LEN: usize = 12;

/// Encryption-at-rest decorator over any `KvStore`, grounded on the
/// teacher's `encrypted-session` feature intent. Values are stored as
/// `nonce || ciphertext`; watch events pass through untouched since keys
/// are never encrypted.
pub struct EncryptedKvStore<S: KvStore> {
    inner: S,
    cipher: Aes256Gcm,
}

impl<S: KvStore> EncryptedKvStore<S> {
    /// `key` must be exactly 32 bytes (AES-256).
    pub fn new(inner: S, key: &[u8; 32]) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
        Self { inner, cipher }
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| KvError::Crypto(e.to_string()))?;
        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn decrypt(&self, stored: &[u8]) -> Result<Vec<u8>> {
        if stored.len() < NONCE_LEN {
            return Err(KvError::Crypto("stored value shorter than nonce".into()));
        }
        let (nonce_bytes, ciphertext) = stored.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        self.cipher.decrypt(nonce, ciphertext).map_err(|e| KvError::Crypto(e.to_string()))
    }
}

#[async_trait]
impl<S: KvStore> KvStore for EncryptedKvStore<S> {
    async fn connect(&self) -> Result<()> {
        self.inner.connect().await
    }

    async fn disconnect(&self) -> Result<()> {
        self.inner.disconnect().await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let encrypted = self.encrypt(&value)?;
        self.inner.set(key, encrypted, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.inner.get(key).await? {
            Some(stored) => Ok(Some(self.decrypt(&stored)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key).await
    }

    fn watch(&self, prefix: &str) -> Pin<Box<dyn Stream<Item = KvEvent> + Send>> {
        self.inner.watch(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryKvStore;

    #[tokio::test]
    async fn roundtrips_through_encryption() {
        let key = [7u8; 32];
        let store = EncryptedKvStore::new(InMemoryKvStore::new(), &key);
        store.set("/services/secret", b"top secret".to_vec(), None).await.unwrap();
        assert_eq!(store.get("/services/secret").await.unwrap(), Some(b"top secret".to_vec()));
    }

    #[tokio::test]
    async fn ciphertext_is_not_plaintext_on_the_wire() {
        let key = [7u8; 32];
        let inner = InMemoryKvStore::new();
        inner.set("/marker", b"unused".to_vec(), None).await.unwrap();
        let store = EncryptedKvStore::new(inner, &key);
        store.set("/services/secret", b"top secret".to_vec(), None).await.unwrap();
        let raw = store.inner.get("/services/secret").await.unwrap().unwrap();
        assert_ne!(raw, b"top secret".to_vec());
    }
}
