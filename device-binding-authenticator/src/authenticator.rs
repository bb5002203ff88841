//! Authenticator strategies and their selection.
//!
//! Each [`DeviceBindingAuthenticationType`] maps to one strategy: what it
//! demands of the device, how it gates the user, and which access control its
//! key material is generated under. [`AuthenticatorFactory::select`] performs
//! that mapping.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use device_binding_types::{
    binding::{
        AccessControl, DeviceBindingAuthenticationType, DeviceBindingError, Prompt, UserKey,
    },
    jose::AssertionClaims,
};

use crate::{
    jws,
    key_store::{CryptoKey, KeyPair, KeyStore},
    user_validation::{PinCollector, UserValidationMethod},
};

mod application_pin;
mod biometric;
mod none;

pub use self::{
    application_pin::ApplicationPinDeviceAuthenticator,
    biometric::{BiometricAndDeviceCredential, BiometricOnly},
    none::NoneAuthenticator,
};

#[cfg(test)]
mod tests;

/// A device binding strategy.
///
/// One instance serves one binding or signing attempt: the factory constructs
/// it already bound to a fresh keystore alias, [`initialize`](Self::initialize)
/// ties it to a user and prompt, and the terminal outcome of
/// [`authenticate`](Self::authenticate) is final for that attempt. A retry
/// means selecting a new instance.
#[async_trait]
pub trait DeviceAuthenticator: Send + Sync {
    /// The authentication type this strategy realizes.
    fn auth_type(&self) -> DeviceBindingAuthenticationType;

    /// Whether the current device and configuration can evaluate this
    /// strategy's gate. Probing only, no side effects.
    fn is_supported(&self) -> bool;

    /// The access control demanded of key material generated by this
    /// strategy, or `None` when its keys are usable without a user gate.
    fn access_control(&self) -> Option<AccessControl>;

    /// The handle to this instance's key material.
    fn key(&self) -> &CryptoKey;

    /// Bind this instance to the user it operates for and the text its gate
    /// displays.
    fn initialize(&mut self, user_id: &str, prompt: Prompt);

    /// Present the strategy's user-facing gate and wait for its outcome.
    ///
    /// Resolves exactly once: `Ok(())` on an affirmative gate,
    /// [`UserCancelled`](DeviceBindingError::UserCancelled) or
    /// [`Timeout`](DeviceBindingError::Timeout) when the user did not
    /// complete it. Strategies without a gate resolve immediately.
    async fn authenticate(&self, timeout: Duration) -> Result<(), DeviceBindingError>;

    /// Generate a fresh key pair under this strategy's access control.
    ///
    /// Fails with [`Unsupported`](DeviceBindingError::Unsupported) when the
    /// device cannot satisfy the strategy, without touching the key store.
    async fn generate_keys(&self) -> Result<KeyPair, DeviceBindingError> {
        if !self.is_supported() {
            return Err(DeviceBindingError::unsupported(format!(
                "{} is not supported on this device",
                self.auth_type()
            )));
        }
        self.key().create_key_pair(self.access_control()).await
    }

    /// Remove the key material this instance is bound to. Absence is not an
    /// error.
    async fn delete_keys(&self) {
        self.key().delete_keys().await;
    }

    /// Sign `claims` with a key pair in hand, producing the compact
    /// assertion. `kid` names the pair in both the header and its embedded
    /// JWK.
    fn sign(
        &self,
        key_pair: &KeyPair,
        kid: &str,
        claims: &AssertionClaims,
    ) -> Result<String, DeviceBindingError> {
        jws::sign_assertion(key_pair, Some(kid), claims)
    }

    /// Sign `claims` with the key material a registry record points at.
    ///
    /// Fails with [`ClientNotRegistered`](DeviceBindingError::ClientNotRegistered)
    /// when no key material exists under the record's alias any more.
    async fn sign_with_user_key(
        &self,
        user_key: &UserKey,
        claims: &AssertionClaims,
    ) -> Result<String, DeviceBindingError> {
        let key_pair = self
            .key()
            .store()
            .retrieve_key_pair(user_key.key_alias())
            .await
            .ok_or(DeviceBindingError::ClientNotRegistered)?;
        self.sign(&key_pair, user_key.key_alias(), claims)
    }
}

/// Maps a declared authentication type to the strategy realizing it.
///
/// Construction is pure: nothing touches the key store or the user until the
/// returned authenticator's operations are called.
pub struct AuthenticatorFactory {
    store: Arc<dyn KeyStore>,
    user_validation: Arc<dyn UserValidationMethod>,
    pin_collector: Option<Arc<dyn PinCollector>>,
}

impl AuthenticatorFactory {
    /// A factory over a key store and a user gate.
    ///
    /// [`DeviceBindingAuthenticationType::ApplicationPin`] additionally needs
    /// a [`PinCollector`]; without one its strategy reports itself
    /// unsupported.
    pub fn new(store: Arc<dyn KeyStore>, user_validation: Arc<dyn UserValidationMethod>) -> Self {
        Self {
            store,
            user_validation,
            pin_collector: None,
        }
    }

    /// Builder method providing the collector backing the application PIN
    /// strategy.
    pub fn pin_collector(self, pin_collector: Arc<dyn PinCollector>) -> Self {
        Self {
            pin_collector: Some(pin_collector),
            ..self
        }
    }

    /// Select the strategy for `auth_type`, initialized for `user_id` and
    /// displaying `prompt`.
    pub fn select(
        &self,
        auth_type: DeviceBindingAuthenticationType,
        user_id: &str,
        prompt: Prompt,
    ) -> Box<dyn DeviceAuthenticator> {
        let mut authenticator: Box<dyn DeviceAuthenticator> = match auth_type {
            DeviceBindingAuthenticationType::BiometricOnly => Box::new(BiometricOnly::new(
                Arc::clone(&self.store),
                Arc::clone(&self.user_validation),
            )),
            DeviceBindingAuthenticationType::BiometricAllowFallback => Box::new(
                BiometricAndDeviceCredential::new(
                    Arc::clone(&self.store),
                    Arc::clone(&self.user_validation),
                ),
            ),
            DeviceBindingAuthenticationType::ApplicationPin => {
                Box::new(ApplicationPinDeviceAuthenticator::new(
                    Arc::clone(&self.store),
                    self.pin_collector.clone(),
                ))
            }
            DeviceBindingAuthenticationType::None => {
                Box::new(NoneAuthenticator::new(Arc::clone(&self.store)))
            }
        };
        authenticator.initialize(user_id, prompt);
        authenticator
    }
}
