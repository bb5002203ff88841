//! The application PIN strategy.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use device_binding_types::binding::{
    AccessControl, DeviceBindingAuthenticationType, DeviceBindingError, Prompt,
};

use super::DeviceAuthenticator;
use crate::{
    key_store::{CryptoKey, KeyStore},
    user_validation::PinCollector,
};

/// Strategy for `APPLICATION_PIN`: the gate is a PIN collected through the
/// application's own [`PinCollector`], with no platform biometric involved.
/// PIN verification is the application's concern; an affirmatively collected,
/// non-empty PIN passes the gate here.
pub struct ApplicationPinDeviceAuthenticator {
    pin_collector: Option<Arc<dyn PinCollector>>,
    key: CryptoKey,
    prompt: Option<Prompt>,
}

impl ApplicationPinDeviceAuthenticator {
    /// An application PIN strategy over `store`.
    ///
    /// With `pin_collector` absent the strategy reports itself unsupported;
    /// collecting a PIN is a required part of its gate.
    pub fn new(store: Arc<dyn KeyStore>, pin_collector: Option<Arc<dyn PinCollector>>) -> Self {
        Self {
            pin_collector,
            key: CryptoKey::new(store),
            prompt: None,
        }
    }
}

#[async_trait]
impl DeviceAuthenticator for ApplicationPinDeviceAuthenticator {
    fn auth_type(&self) -> DeviceBindingAuthenticationType {
        DeviceBindingAuthenticationType::ApplicationPin
    }

    fn is_supported(&self) -> bool {
        self.pin_collector.is_some()
    }

    fn access_control(&self) -> Option<AccessControl> {
        Some(AccessControl::application_password())
    }

    fn key(&self) -> &CryptoKey {
        &self.key
    }

    fn initialize(&mut self, user_id: &str, prompt: Prompt) {
        log::debug!(
            "binding PIN gate to user {user_id} under alias {}",
            self.key.key_alias()
        );
        self.prompt = Some(prompt);
    }

    async fn authenticate(&self, timeout: Duration) -> Result<(), DeviceBindingError> {
        let collector = self
            .pin_collector
            .as_ref()
            .ok_or_else(|| DeviceBindingError::unsupported("no pin collector configured"))?;
        let prompt = self
            .prompt
            .as_ref()
            .ok_or_else(|| DeviceBindingError::unsupported("authenticator has no prompt text"))?;

        let pin = collector.collect_pin(prompt, timeout).await?;
        if pin.is_empty() {
            return Err(DeviceBindingError::UserCancelled);
        }
        Ok(())
    }
}
