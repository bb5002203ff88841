//! Where the per-user key records live.
//!
//! Storage is a pluggable [`UserKeyRepository`] holding one opaque serialized
//! blob per record, addressed by kid. [`UserKeyService`] is the domain view
//! over it: records decode with an all-fields-or-error step at construction,
//! and every query after that runs against the in-memory view.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use device_binding_types::binding::{
    DeviceBindingAuthenticationType, DeviceBindingError, KeyFoundStatus, UserKey,
};

use crate::key_store::{KeyPair, KeyStore};

/// Pluggable storage for serialized user key records.
///
/// Implementations only move blobs; what is in them is [`UserKeyService`]'s
/// concern. Durable platform adapters (keychain, preferences store) implement
/// this; [`MemoryUserKeyRepository`] is the in-memory stand-in.
#[cfg_attr(any(test, feature = "testable"), mockall::automock)]
#[async_trait]
pub trait UserKeyRepository: Send + Sync {
    /// Persist one serialized record under `kid`.
    ///
    /// A kid is written once; saving under an existing kid is an error
    /// rather than an overwrite.
    async fn save(&mut self, kid: &str, record: String) -> Result<(), DeviceBindingError>;

    /// Every stored record as a `(kid, blob)` pair.
    async fn load_all(&self) -> Vec<(String, String)>;

    /// Remove the record under `kid`, reporting whether one existed.
    async fn remove(&mut self, kid: &str) -> bool;
}

/// In-memory [`UserKeyRepository`].
pub type MemoryUserKeyRepository = HashMap<String, String>;

#[async_trait]
impl UserKeyRepository for MemoryUserKeyRepository {
    async fn save(&mut self, kid: &str, record: String) -> Result<(), DeviceBindingError> {
        if self.contains_key(kid) {
            return Err(DeviceBindingError::Storage(format!(
                "a record already exists under {kid}"
            )));
        }
        self.insert(kid.to_owned(), record);
        Ok(())
    }

    async fn load_all(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(kid, record)| (kid.clone(), record.clone()))
            .collect()
    }

    async fn remove(&mut self, kid: &str) -> bool {
        self.remove_entry(kid).is_some()
    }
}

#[cfg(any(feature = "tokio", test))]
#[async_trait]
impl<R: UserKeyRepository + Send + Sync> UserKeyRepository for Arc<tokio::sync::Mutex<R>> {
    async fn save(&mut self, kid: &str, record: String) -> Result<(), DeviceBindingError> {
        self.lock().await.save(kid, record).await
    }

    async fn load_all(&self) -> Vec<(String, String)> {
        self.lock().await.load_all().await
    }

    async fn remove(&mut self, kid: &str) -> bool {
        self.lock().await.remove(kid).await
    }
}

#[cfg(any(feature = "tokio", test))]
#[async_trait]
impl<R: UserKeyRepository + Send + Sync> UserKeyRepository for Arc<tokio::sync::RwLock<R>> {
    async fn save(&mut self, kid: &str, record: String) -> Result<(), DeviceBindingError> {
        self.write().await.save(kid, record).await
    }

    async fn load_all(&self) -> Vec<(String, String)> {
        self.read().await.load_all().await
    }

    async fn remove(&mut self, kid: &str) -> bool {
        self.write().await.remove(kid).await
    }
}

/// The registry of user keys on this device.
///
/// The in-memory view is loaded once at construction and mutated only by
/// [`persist`](Self::persist) and [`delete`](Self::delete); concurrent
/// callers wrap the repository in one of the `Arc` impls above and keep a
/// single service per process.
pub struct UserKeyService<R> {
    repository: R,
    user_keys: Vec<UserKey>,
}

impl<R: UserKeyRepository> UserKeyService<R> {
    /// Build the registry view over `repository`.
    ///
    /// A record failing the schema decode is skipped with a warning; one bad
    /// blob does not take down the registry.
    pub async fn new(repository: R) -> Self {
        let mut user_keys = Vec::new();
        for (kid, record) in repository.load_all().await {
            match serde_json::from_str::<UserKey>(&record) {
                Ok(user_key) => user_keys.push(user_key),
                Err(err) => log::warn!("skipping undecodable user key record {kid}: {err}"),
            }
        }
        Self {
            repository,
            user_keys,
        }
    }

    /// Every record in the registry. Order is stable within a session and
    /// not otherwise significant.
    pub fn get_all(&self) -> &[UserKey] {
        &self.user_keys
    }

    /// Write one record for a freshly generated pair and return it.
    ///
    /// The pair's alias becomes the record's kid, keeping the kid-equals-alias
    /// invariant by construction. Repeated calls for the same user accumulate
    /// records; reconciliation is the caller's call via
    /// [`KeyFoundStatus::MultipleKeysFound`].
    pub async fn persist(
        &mut self,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        key_pair: &KeyPair,
        auth_type: DeviceBindingAuthenticationType,
        created_at: f64,
    ) -> Result<UserKey, DeviceBindingError> {
        let user_key = UserKey::new(user_id, user_name, key_pair.alias(), auth_type, created_at);
        let record = serde_json::to_string(&user_key)
            .map_err(|err| DeviceBindingError::Storage(err.to_string()))?;
        self.repository.save(&user_key.kid, record).await?;
        self.user_keys.push(user_key.clone());
        Ok(user_key)
    }

    /// Remove exactly the record with `user_key`'s kid. Removing an unknown
    /// kid is a no-op.
    pub async fn delete(&mut self, user_key: &UserKey) {
        self.repository.remove(&user_key.kid).await;
        self.user_keys.retain(|key| key.kid != user_key.kid);
    }

    /// The zero/one/many status of the registry.
    ///
    /// A non-empty `user_id` narrows to that user's records first; `None` or
    /// an empty string computes the status over the whole registry.
    pub fn get_key_status(&self, user_id: Option<&str>) -> KeyFoundStatus {
        let keys = match user_id {
            Some(user_id) if !user_id.is_empty() => self
                .user_keys
                .iter()
                .filter(|key| key.user_id == user_id)
                .cloned()
                .collect(),
            _ => self.user_keys.clone(),
        };
        KeyFoundStatus::from_keys(keys)
    }
}

/// Caller-facing view tying the registry to the key store, so revoking a
/// record always revokes its key material too.
pub struct UserKeys<R> {
    service: UserKeyService<R>,
    store: Arc<dyn KeyStore>,
}

impl<R: UserKeyRepository> UserKeys<R> {
    /// A revocation view over `service` and the store its keys live in.
    pub fn new(service: UserKeyService<R>, store: Arc<dyn KeyStore>) -> Self {
        Self { service, store }
    }

    /// Every record in the registry.
    pub fn load_all(&self) -> &[UserKey] {
        self.service.get_all()
    }

    /// The zero/one/many status, optionally narrowed to one user.
    pub fn get_key_status(&self, user_id: Option<&str>) -> KeyFoundStatus {
        self.service.get_key_status(user_id)
    }

    /// Remove `user_key`'s registry record and its key material.
    ///
    /// Key material goes first; a record must never outlive its key, and
    /// both removals are no-ops when already gone.
    pub async fn delete(&mut self, user_key: &UserKey) {
        self.store.delete_key_pair(user_key.key_alias()).await;
        self.service.delete(user_key).await;
    }
}

#[cfg(test)]
mod tests {
    use p256::ecdsa::SigningKey;
    use uuid::Uuid;

    use super::*;
    use crate::key_store::MemoryKeyStore;

    fn fresh_pair() -> KeyPair {
        KeyPair::new(
            Uuid::new_v4().to_string(),
            SigningKey::random(&mut rand::thread_rng()),
        )
    }

    fn record_json(user_id: &str, kid: &str) -> String {
        serde_json::json!({
            "userId": user_id,
            "userName": "jane",
            "kid": kid,
            "authType": "NONE",
            "createdAt": 1_700_000_000.0,
        })
        .to_string()
    }

    #[tokio::test]
    async fn persist_then_get_all_round_trips_every_field() {
        // Arrange
        let mut service = UserKeyService::new(MemoryUserKeyRepository::new()).await;
        let pair = fresh_pair();

        // Act
        let persisted = service
            .persist(
                "u1",
                "user one",
                &pair,
                DeviceBindingAuthenticationType::BiometricOnly,
                1_700_000_000.5,
            )
            .await
            .unwrap();

        // Assert
        let all = service.get_all();
        assert_eq!(all, [persisted.clone()]);
        assert_eq!(persisted.user_id, "u1");
        assert_eq!(persisted.user_name, "user one");
        assert_eq!(persisted.kid, pair.alias());
        assert_eq!(
            persisted.auth_type,
            DeviceBindingAuthenticationType::BiometricOnly
        );
        assert_eq!(persisted.created_at, 1_700_000_000.5);
    }

    #[tokio::test]
    async fn persist_assigns_a_distinct_kid_per_pair() {
        let mut service = UserKeyService::new(MemoryUserKeyRepository::new()).await;

        let first = service
            .persist(
                "u1",
                "user one",
                &fresh_pair(),
                DeviceBindingAuthenticationType::None,
                1.0,
            )
            .await
            .unwrap();
        let second = service
            .persist(
                "u1",
                "user one",
                &fresh_pair(),
                DeviceBindingAuthenticationType::None,
                2.0,
            )
            .await
            .unwrap();

        assert!(!first.kid.is_empty());
        assert!(!second.kid.is_empty());
        assert_ne!(first.kid, second.kid);
        assert_eq!(service.get_all().len(), 2);
    }

    #[tokio::test]
    async fn persist_rejects_a_duplicate_kid() {
        let mut service = UserKeyService::new(MemoryUserKeyRepository::new()).await;
        let pair = fresh_pair();

        service
            .persist(
                "u1",
                "user one",
                &pair,
                DeviceBindingAuthenticationType::None,
                1.0,
            )
            .await
            .unwrap();
        let err = service
            .persist(
                "u1",
                "user one",
                &pair,
                DeviceBindingAuthenticationType::None,
                2.0,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DeviceBindingError::Storage(_)));
        assert_eq!(service.get_all().len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_exactly_that_record_and_is_idempotent() {
        // Arrange
        let mut service = UserKeyService::new(MemoryUserKeyRepository::new()).await;
        let keep = service
            .persist(
                "u1",
                "user one",
                &fresh_pair(),
                DeviceBindingAuthenticationType::None,
                1.0,
            )
            .await
            .unwrap();
        let gone = service
            .persist(
                "u2",
                "user two",
                &fresh_pair(),
                DeviceBindingAuthenticationType::None,
                2.0,
            )
            .await
            .unwrap();

        // Act
        service.delete(&gone).await;
        service.delete(&gone).await;

        // Assert
        assert_eq!(service.get_all(), [keep]);
    }

    #[tokio::test]
    async fn key_status_applies_the_zero_one_many_rule() {
        let mut service = UserKeyService::new(MemoryUserKeyRepository::new()).await;
        assert_eq!(service.get_key_status(None), KeyFoundStatus::NoKeysFound);

        let first = service
            .persist(
                "u1",
                "user one",
                &fresh_pair(),
                DeviceBindingAuthenticationType::None,
                1.0,
            )
            .await
            .unwrap();
        assert_eq!(
            service.get_key_status(None),
            KeyFoundStatus::SingleKeyFound(first.clone())
        );

        let second = service
            .persist(
                "u2",
                "user two",
                &fresh_pair(),
                DeviceBindingAuthenticationType::None,
                2.0,
            )
            .await
            .unwrap();
        assert_eq!(
            service.get_key_status(None),
            KeyFoundStatus::MultipleKeysFound(vec![first, second])
        );
    }

    #[tokio::test]
    async fn key_status_narrows_to_the_requested_user() {
        let mut service = UserKeyService::new(MemoryUserKeyRepository::new()).await;
        let a = service
            .persist(
                "A",
                "user a",
                &fresh_pair(),
                DeviceBindingAuthenticationType::None,
                1.0,
            )
            .await
            .unwrap();
        service
            .persist(
                "B",
                "user b",
                &fresh_pair(),
                DeviceBindingAuthenticationType::None,
                2.0,
            )
            .await
            .unwrap();

        assert_eq!(
            service.get_key_status(Some("A")),
            KeyFoundStatus::SingleKeyFound(a)
        );
        assert_eq!(
            service.get_key_status(Some("C")),
            KeyFoundStatus::NoKeysFound
        );
        // an empty user id means the whole registry
        assert!(matches!(
            service.get_key_status(Some("")),
            KeyFoundStatus::MultipleKeysFound(_)
        ));
    }

    #[tokio::test]
    async fn key_status_reports_duplicates_for_one_user() {
        let mut service = UserKeyService::new(MemoryUserKeyRepository::new()).await;
        for created_at in [1.0, 2.0] {
            service
                .persist(
                    "u1",
                    "user one",
                    &fresh_pair(),
                    DeviceBindingAuthenticationType::None,
                    created_at,
                )
                .await
                .unwrap();
        }

        let status = service.get_key_status(Some("u1"));

        match status {
            KeyFoundStatus::MultipleKeysFound(keys) => assert_eq!(keys.len(), 2),
            other => panic!("expected MultipleKeysFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn construction_loads_existing_records() {
        // Arrange
        let mut repository = MemoryUserKeyRepository::new();
        repository.insert("kid-1".to_owned(), record_json("u1", "kid-1"));

        // Act
        let service = UserKeyService::new(repository).await;

        // Assert
        assert_eq!(service.get_all().len(), 1);
        assert_eq!(service.get_all()[0].kid, "kid-1");
        assert_eq!(service.get_all()[0].user_name, "jane");
    }

    #[tokio::test]
    async fn construction_skips_undecodable_records() {
        // Arrange: one good record, one blob missing required fields
        let mut repository = MemoryUserKeyRepository::new();
        repository.insert("kid-1".to_owned(), record_json("u1", "kid-1"));
        repository.insert(
            "kid-2".to_owned(),
            r#"{"userId":"u2","kid":"kid-2"}"#.to_owned(),
        );

        // Act
        let service = UserKeyService::new(repository).await;

        // Assert
        assert_eq!(service.get_all().len(), 1);
        assert_eq!(service.get_all()[0].kid, "kid-1");
    }

    #[tokio::test]
    async fn repository_works_behind_arc_mutex() {
        let repository = Arc::new(tokio::sync::Mutex::new(MemoryUserKeyRepository::new()));
        let mut service = UserKeyService::new(Arc::clone(&repository)).await;

        service
            .persist(
                "u1",
                "user one",
                &fresh_pair(),
                DeviceBindingAuthenticationType::None,
                1.0,
            )
            .await
            .unwrap();

        assert_eq!(repository.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn user_keys_delete_removes_record_and_key_material() {
        // Arrange
        let store = Arc::new(MemoryKeyStore::new());
        let pair = store
            .generate_key_pair(&Uuid::new_v4().to_string(), None)
            .await
            .unwrap();
        let mut service = UserKeyService::new(MemoryUserKeyRepository::new()).await;
        let user_key = service
            .persist(
                "u1",
                "user one",
                &pair,
                DeviceBindingAuthenticationType::None,
                1.0,
            )
            .await
            .unwrap();
        let mut user_keys = UserKeys::new(service, store.clone());

        // Act
        user_keys.delete(&user_key).await;

        // Assert
        assert!(user_keys.load_all().is_empty());
        assert!(store.retrieve_key_pair(user_key.key_alias()).await.is_none());
        assert_eq!(
            user_keys.get_key_status(Some("u1")),
            KeyFoundStatus::NoKeysFound
        );
    }
}
