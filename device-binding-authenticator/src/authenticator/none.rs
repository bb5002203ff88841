//! The ungated strategy.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use device_binding_types::binding::{
    AccessControl, DeviceBindingAuthenticationType, DeviceBindingError, Prompt,
};

use super::DeviceAuthenticator;
use crate::key_store::{CryptoKey, KeyStore};

/// Strategy for `NONE`: no user gate, keys usable without interaction.
/// [`authenticate`](DeviceAuthenticator::authenticate) resolves immediately.
pub struct NoneAuthenticator {
    key: CryptoKey,
}

impl NoneAuthenticator {
    /// An ungated strategy over `store`.
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self {
            key: CryptoKey::new(store),
        }
    }
}

#[async_trait]
impl DeviceAuthenticator for NoneAuthenticator {
    fn auth_type(&self) -> DeviceBindingAuthenticationType {
        DeviceBindingAuthenticationType::None
    }

    fn is_supported(&self) -> bool {
        true
    }

    fn access_control(&self) -> Option<AccessControl> {
        None
    }

    fn key(&self) -> &CryptoKey {
        &self.key
    }

    fn initialize(&mut self, user_id: &str, _prompt: Prompt) {
        log::debug!(
            "binding ungated key to user {user_id} under alias {}",
            self.key.key_alias()
        );
    }

    async fn authenticate(&self, _timeout: Duration) -> Result<(), DeviceBindingError> {
        Ok(())
    }
}
