use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use device_binding_types::binding::{AccessControl, DeviceBindingError};
use p256::ecdsa::{signature::Signer, Signature, SigningKey};
use uuid::Uuid;

/// A handle to a private signing key.
///
/// The handle only signs; the key bytes never leave the key store that
/// produced it and debug output is redacted. Cloning shares the same
/// underlying key.
#[derive(Clone)]
pub struct SigningHandle {
    key: Arc<SigningKey>,
}

impl SigningHandle {
    pub(crate) fn new(key: SigningKey) -> Self {
        Self { key: Arc::new(key) }
    }

    /// Sign `message` with ES256, returning the raw `r || s` signature bytes.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, DeviceBindingError> {
        let signature: Signature = self
            .key
            .try_sign(message)
            .map_err(|err| DeviceBindingError::SigningFailed(err.to_string()))?;
        Ok(signature.to_bytes().to_vec())
    }
}

impl fmt::Debug for SigningHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningHandle").field(&"[REDACTED]").finish()
    }
}

/// An asymmetric key pair held by a key store under a named alias.
///
/// The public half and the alias are plain data; the private half is only
/// reachable through the sign-only [`SigningHandle`].
#[derive(Debug, Clone)]
pub struct KeyPair {
    alias: String,
    public_key: p256::PublicKey,
    private: SigningHandle,
}

impl KeyPair {
    /// Package a generated signing key under `alias`. For use by key store
    /// implementations.
    pub fn new(alias: impl Into<String>, signing_key: SigningKey) -> Self {
        let public_key = p256::PublicKey::from(*signing_key.verifying_key());
        Self {
            alias: alias.into(),
            public_key,
            private: SigningHandle::new(signing_key),
        }
    }

    /// The alias this pair is stored under, also the kid of its record.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The public half of the pair.
    pub fn public_key(&self) -> &p256::PublicKey {
        &self.public_key
    }

    /// The sign-only handle to the private half.
    pub fn signer(&self) -> &SigningHandle {
        &self.private
    }
}

/// Use this on a type that provides key material: generation, lookup and
/// removal of asymmetric key pairs under named aliases.
///
/// Platform adapters put secure enclave or keystore calls behind this seam;
/// [`MemoryKeyStore`] is the in-memory stand-in for tests.
#[cfg_attr(any(test, feature = "testable"), mockall::automock)]
#[async_trait::async_trait]
pub trait KeyStore: Send + Sync {
    /// Create a fresh P-256 key pair under `alias`, protected by
    /// `access_control` when one is given.
    ///
    /// Fails with [`DeviceBindingError::KeyGenerationFailed`] when the
    /// platform denies creation: the access control is unsatisfiable, the
    /// alias collides with existing material, or hardware key storage is
    /// unavailable. Creation is atomic; on error no key material remains.
    async fn generate_key_pair(
        &self,
        alias: &str,
        access_control: Option<AccessControl>,
    ) -> Result<KeyPair, DeviceBindingError>;

    /// Look up the key pair stored under `alias`, `None` when absent.
    async fn retrieve_key_pair(&self, alias: &str) -> Option<KeyPair>;

    /// Remove the key material under `alias`. Idempotent; absence is not an
    /// error.
    async fn delete_key_pair(&self, alias: &str);
}

struct StoredKey {
    signing_key: SigningKey,
    access_control: Option<AccessControl>,
}

/// In-memory key store.
///
/// Useful for tests and as the reference behavior for platform adapters. It
/// accepts every access control descriptor and records it alongside the key.
#[derive(Default)]
pub struct MemoryKeyStore {
    keys: Mutex<HashMap<String, StoredKey>>,
}

impl MemoryKeyStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The access control a stored pair was generated under.
    pub fn access_control(&self, alias: &str) -> Option<AccessControl> {
        self.keys().get(alias).and_then(|key| key.access_control)
    }

    /// True when no key material is stored.
    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    fn keys(&self) -> MutexGuard<'_, HashMap<String, StoredKey>> {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl KeyStore for MemoryKeyStore {
    async fn generate_key_pair(
        &self,
        alias: &str,
        access_control: Option<AccessControl>,
    ) -> Result<KeyPair, DeviceBindingError> {
        let mut keys = self.keys();
        if keys.contains_key(alias) {
            return Err(DeviceBindingError::KeyGenerationFailed(Some(format!(
                "alias {alias} already holds key material"
            ))));
        }
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        keys.insert(
            alias.to_owned(),
            StoredKey {
                signing_key: signing_key.clone(),
                access_control,
            },
        );
        Ok(KeyPair::new(alias, signing_key))
    }

    async fn retrieve_key_pair(&self, alias: &str) -> Option<KeyPair> {
        self.keys()
            .get(alias)
            .map(|stored| KeyPair::new(alias, stored.signing_key.clone()))
    }

    async fn delete_key_pair(&self, alias: &str) {
        self.keys().remove(alias);
    }
}

/// A key store handle bound to one alias.
///
/// Minting the alias here, at key creation time, is what makes a record's
/// kid equal its keystore alias: the registry adopts the alias as the kid
/// when the pair is persisted.
pub struct CryptoKey {
    key_alias: String,
    store: Arc<dyn KeyStore>,
}

impl CryptoKey {
    /// Bind a fresh alias. Each binding attempt gets its own, so repeated
    /// registrations never collide in the key store.
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self {
            key_alias: Uuid::new_v4().to_string(),
            store,
        }
    }

    /// Bind an existing alias, e.g. the kid of a persisted record.
    pub fn with_alias(alias: impl Into<String>, store: Arc<dyn KeyStore>) -> Self {
        Self {
            key_alias: alias.into(),
            store,
        }
    }

    /// The alias this handle operates on.
    pub fn key_alias(&self) -> &str {
        &self.key_alias
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn KeyStore> {
        &self.store
    }

    /// Generate the pair under the bound alias.
    pub async fn create_key_pair(
        &self,
        access_control: Option<AccessControl>,
    ) -> Result<KeyPair, DeviceBindingError> {
        self.store
            .generate_key_pair(&self.key_alias, access_control)
            .await
    }

    /// Look up the pair under the bound alias.
    pub async fn retrieve_key_pair(&self) -> Option<KeyPair> {
        self.store.retrieve_key_pair(&self.key_alias).await
    }

    /// Remove the key material under the bound alias.
    pub async fn delete_keys(&self) {
        self.store.delete_key_pair(&self.key_alias).await;
    }
}

impl fmt::Debug for CryptoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoKey")
            .field("key_alias", &self.key_alias)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use p256::ecdsa::{signature::Verifier, Signature, VerifyingKey};

    use super::*;

    #[tokio::test]
    async fn generate_then_retrieve_yields_the_same_key() {
        let store = MemoryKeyStore::new();
        let generated = store
            .generate_key_pair("alias-1", Some(AccessControl::USER_PRESENCE))
            .await
            .unwrap();

        let retrieved = store.retrieve_key_pair("alias-1").await.unwrap();
        assert_eq!(generated.public_key(), retrieved.public_key());
        assert_eq!(retrieved.alias(), "alias-1");
        assert_eq!(
            store.access_control("alias-1"),
            Some(AccessControl::USER_PRESENCE)
        );
    }

    #[tokio::test]
    async fn alias_collision_is_a_key_generation_failure() {
        let store = MemoryKeyStore::new();
        store.generate_key_pair("alias-1", None).await.unwrap();

        let err = store.generate_key_pair("alias-1", None).await.unwrap_err();
        assert!(matches!(err, DeviceBindingError::KeyGenerationFailed(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_absence_is_none() {
        let store = MemoryKeyStore::new();
        assert!(store.retrieve_key_pair("missing").await.is_none());

        store.generate_key_pair("alias-1", None).await.unwrap();
        store.delete_key_pair("alias-1").await;
        store.delete_key_pair("alias-1").await;
        assert!(store.retrieve_key_pair("alias-1").await.is_none());
    }

    #[tokio::test]
    async fn signing_handle_signs_verifiably_and_redacts_debug() {
        let store = MemoryKeyStore::new();
        let pair = store.generate_key_pair("alias-1", None).await.unwrap();

        let message = b"header.payload";
        let signature_bytes = pair.signer().sign(message).unwrap();
        let signature = Signature::from_slice(&signature_bytes).unwrap();
        VerifyingKey::from(*pair.public_key())
            .verify(message, &signature)
            .expect("failed to verify signature");

        let debug = format!("{:?}", pair.signer());
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn crypto_key_mints_unique_aliases() {
        let store: Arc<dyn KeyStore> = Arc::new(MemoryKeyStore::new());
        let first = CryptoKey::new(Arc::clone(&store));
        let second = CryptoKey::new(store);
        assert_ne!(first.key_alias(), second.key_alias());
        assert!(!first.key_alias().is_empty());
    }
}
