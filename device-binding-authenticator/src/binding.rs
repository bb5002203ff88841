//! The binding and signing flows end to end.
//!
//! [`BindingClient`] wires the factory, the key store behind it, and the
//! registry into the two operations a host SDK calls: answer a
//! [`BindingChallenge`] by minting and persisting a new key, or answer a
//! [`SigningChallenge`] with a key that already exists.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use device_binding_types::{
    binding::{
        BindingChallenge, DeviceBindingError, KeyFoundStatus, SigningChallenge, UserKey,
    },
    jose::AssertionClaims,
};

use crate::{
    authenticator::{AuthenticatorFactory, DeviceAuthenticator},
    registry::{UserKeyRepository, UserKeyService},
};

/// Gate timeout and assertion lifetime, in seconds, when the challenge does
/// not carry its own.
pub const DEFAULT_TIMEOUT_SECS: u32 = 60;

/// Outcome of a successful bind: the assertion to hand back to the server
/// and the record now in the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundAssertion {
    /// The compact three segment assertion.
    pub assertion: String,

    /// The persisted record; its kid is the alias of the key that signed.
    pub user_key: UserKey,
}

/// Orchestrates one device binding or signing attempt per call.
///
/// Each attempt is single flight: one gate evaluation, at most one key
/// generation, one signature, resolved sequentially. Failures after key
/// material exists roll that material back, so an errored bind leaves
/// neither a key nor a record behind.
pub struct BindingClient<R> {
    factory: AuthenticatorFactory,
    service: UserKeyService<R>,
    issuer: String,
}

impl<R: UserKeyRepository> BindingClient<R> {
    /// A client issuing assertions for `issuer`, usually the application
    /// identifier the server expects in the `iss` claim.
    pub fn new(
        factory: AuthenticatorFactory,
        service: UserKeyService<R>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            factory,
            service,
            issuer: issuer.into(),
        }
    }

    /// Read access to the registry view, for status queries between flows.
    pub fn service(&self) -> &UserKeyService<R> {
        &self.service
    }

    /// Exclusive access to the registry view.
    pub fn service_mut(&mut self) -> &mut UserKeyService<R> {
        &mut self.service
    }

    /// Answer a binding challenge: gate the user, mint a key pair under the
    /// challenge's policy, sign, and persist the record.
    ///
    /// The record is only written after a successful signature, and a
    /// signing or persistence failure deletes the just-created key material,
    /// so no partial state survives an error.
    pub async fn bind(
        &mut self,
        challenge: &BindingChallenge,
    ) -> Result<BoundAssertion, DeviceBindingError> {
        let authenticator = self.factory.select(
            challenge.auth_type,
            &challenge.user_id,
            challenge.prompt.clone().unwrap_or_default(),
        );
        if !authenticator.is_supported() {
            return Err(DeviceBindingError::unsupported(format!(
                "{} is not supported on this device",
                challenge.auth_type
            )));
        }

        let timeout = challenge.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
        authenticator
            .authenticate(Duration::from_secs(u64::from(timeout)))
            .await?;

        // claims are built before any key material exists, so the only
        // error paths needing rollback are signing and persistence
        let now = now()?;
        let claims = self.claims(&challenge.user_id, &challenge.challenge, now, timeout)?;

        let key_pair = authenticator.generate_keys().await?;
        let assertion = match authenticator.sign(&key_pair, key_pair.alias(), &claims) {
            Ok(assertion) => assertion,
            Err(err) => {
                authenticator.delete_keys().await;
                return Err(err);
            }
        };

        let persisted = self
            .service
            .persist(
                challenge.user_id.as_str(),
                challenge.user_name.as_str(),
                &key_pair,
                challenge.auth_type,
                now.as_secs_f64(),
            )
            .await;
        match persisted {
            Ok(user_key) => Ok(BoundAssertion {
                assertion,
                user_key,
            }),
            Err(err) => {
                authenticator.delete_keys().await;
                Err(err)
            }
        }
    }

    /// Answer a signing challenge with an already bound key.
    ///
    /// The key is picked by the challenge's optional user id: no matching
    /// record is [`ClientNotRegistered`](DeviceBindingError::ClientNotRegistered),
    /// one record signs, and of several records the oldest in the registry
    /// signs. Callers wanting a different resolution query
    /// [`get_key_status`](UserKeyService::get_key_status) themselves and call
    /// [`sign_with_key`](Self::sign_with_key).
    pub async fn sign(&self, challenge: &SigningChallenge) -> Result<String, DeviceBindingError> {
        let user_key = match self.service.get_key_status(challenge.user_id.as_deref()) {
            KeyFoundStatus::NoKeysFound => return Err(DeviceBindingError::ClientNotRegistered),
            KeyFoundStatus::SingleKeyFound(user_key) => user_key,
            KeyFoundStatus::MultipleKeysFound(mut user_keys) => user_keys.remove(0),
        };
        self.sign_with_key(&user_key, challenge).await
    }

    /// Answer a signing challenge with a specific record, gating the user
    /// under the policy the record was bound with.
    pub async fn sign_with_key(
        &self,
        user_key: &UserKey,
        challenge: &SigningChallenge,
    ) -> Result<String, DeviceBindingError> {
        let authenticator = self.factory.select(
            user_key.auth_type,
            &user_key.user_id,
            challenge.prompt.clone().unwrap_or_default(),
        );
        let timeout = challenge.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
        authenticator
            .authenticate(Duration::from_secs(u64::from(timeout)))
            .await?;

        let claims = self.claims(&user_key.user_id, &challenge.challenge, now()?, timeout)?;
        authenticator.sign_with_user_key(user_key, &claims).await
    }

    fn claims(
        &self,
        user_id: &str,
        challenge: &str,
        now: Duration,
        timeout_secs: u32,
    ) -> Result<AssertionClaims, DeviceBindingError> {
        if self.issuer.is_empty() {
            return Err(DeviceBindingError::unsupported("no issuer configured"));
        }
        let exp = i64::try_from(now.as_secs() + u64::from(timeout_secs)).map_err(|_| {
            DeviceBindingError::SigningFailed("expiry does not fit an i64".to_owned())
        })?;
        Ok(AssertionClaims::new(
            user_id,
            challenge,
            exp,
            self.issuer.as_str(),
        ))
    }
}

fn now() -> Result<Duration, DeviceBindingError> {
    SystemTime::now().duration_since(UNIX_EPOCH).map_err(|_| {
        DeviceBindingError::SigningFailed("system clock predates the epoch".to_owned())
    })
}
