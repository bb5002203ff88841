//! The two biometric strategies.
//!
//! Both hand the user gate to a [`UserValidationMethod`], differing only in
//! the policy they evaluate and the access control their keys demand.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use device_binding_types::binding::{
    AccessControl, DeviceBindingAuthenticationType, DeviceBindingError, Prompt,
};

use super::DeviceAuthenticator;
use crate::{
    key_store::{CryptoKey, KeyStore},
    user_validation::{UserValidationMethod, UserVerificationPolicy},
};

/// State the two biometric strategies share: the gate, the policy it
/// evaluates, and the alias-bound key handle.
struct BiometricCore {
    policy: UserVerificationPolicy,
    user_validation: Arc<dyn UserValidationMethod>,
    key: CryptoKey,
    prompt: Option<Prompt>,
}

impl BiometricCore {
    fn new(
        policy: UserVerificationPolicy,
        store: Arc<dyn KeyStore>,
        user_validation: Arc<dyn UserValidationMethod>,
    ) -> Self {
        Self {
            policy,
            user_validation,
            key: CryptoKey::new(store),
            prompt: None,
        }
    }

    fn initialize(&mut self, user_id: &str, prompt: Prompt) {
        log::debug!(
            "binding {:?} gate to user {user_id} under alias {}",
            self.policy,
            self.key.key_alias()
        );
        self.prompt = Some(prompt);
    }

    fn is_supported(&self) -> bool {
        self.user_validation.can_evaluate(self.policy)
    }

    fn hardware_backed(&self) -> bool {
        self.user_validation.is_hardware_backed()
    }

    async fn authenticate(&self, timeout: Duration) -> Result<(), DeviceBindingError> {
        let prompt = self
            .prompt
            .as_ref()
            .ok_or_else(|| DeviceBindingError::unsupported("authenticator has no prompt text"))?;
        if !self.is_supported() {
            return Err(DeviceBindingError::unsupported(format!(
                "device cannot evaluate {:?}",
                self.policy
            )));
        }
        self.user_validation
            .evaluate(self.policy, prompt, timeout)
            .await
    }
}

/// Strategy for `BIOMETRIC_ONLY`: only the currently enrolled biometric set
/// passes the gate, and the generated key is invalidated if that set changes.
pub struct BiometricOnly {
    core: BiometricCore,
}

impl BiometricOnly {
    /// A biometric-only strategy over `store`, gated by `user_validation`.
    pub fn new(store: Arc<dyn KeyStore>, user_validation: Arc<dyn UserValidationMethod>) -> Self {
        Self {
            core: BiometricCore::new(UserVerificationPolicy::Biometrics, store, user_validation),
        }
    }
}

#[async_trait]
impl DeviceAuthenticator for BiometricOnly {
    fn auth_type(&self) -> DeviceBindingAuthenticationType {
        DeviceBindingAuthenticationType::BiometricOnly
    }

    fn is_supported(&self) -> bool {
        self.core.is_supported()
    }

    fn access_control(&self) -> Option<AccessControl> {
        Some(AccessControl::biometry_current_set(
            self.core.hardware_backed(),
        ))
    }

    fn key(&self) -> &CryptoKey {
        &self.core.key
    }

    fn initialize(&mut self, user_id: &str, prompt: Prompt) {
        self.core.initialize(user_id, prompt);
    }

    async fn authenticate(&self, timeout: Duration) -> Result<(), DeviceBindingError> {
        self.core.authenticate(timeout).await
    }
}

/// Strategy for `BIOMETRIC_ALLOW_FALLBACK`: biometrics when available, the
/// device credential otherwise. The generated key demands user presence
/// rather than a particular biometric set.
pub struct BiometricAndDeviceCredential {
    core: BiometricCore,
}

impl BiometricAndDeviceCredential {
    /// A biometric-or-credential strategy over `store`, gated by
    /// `user_validation`.
    pub fn new(store: Arc<dyn KeyStore>, user_validation: Arc<dyn UserValidationMethod>) -> Self {
        Self {
            core: BiometricCore::new(
                UserVerificationPolicy::BiometricsOrDeviceCredential,
                store,
                user_validation,
            ),
        }
    }
}

#[async_trait]
impl DeviceAuthenticator for BiometricAndDeviceCredential {
    fn auth_type(&self) -> DeviceBindingAuthenticationType {
        DeviceBindingAuthenticationType::BiometricAllowFallback
    }

    fn is_supported(&self) -> bool {
        self.core.is_supported()
    }

    fn access_control(&self) -> Option<AccessControl> {
        Some(AccessControl::user_presence(self.core.hardware_backed()))
    }

    fn key(&self) -> &CryptoKey {
        &self.core.key
    }

    fn initialize(&mut self, user_id: &str, prompt: Prompt) {
        self.core.initialize(user_id, prompt);
    }

    async fn authenticate(&self, timeout: Duration) -> Result<(), DeviceBindingError> {
        self.core.authenticate(timeout).await
    }
}
