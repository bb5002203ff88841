use std::time::Duration;

use device_binding_types::binding::{DeviceBindingError, Pin, Prompt};

#[cfg(doc)]
use crate::DeviceAuthenticator;

/// Platform gate policies a [`UserValidationMethod`] can be asked to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserVerificationPolicy {
    /// Only the currently enrolled biometric set may pass the gate.
    Biometrics,

    /// Biometrics when available, falling back to the device credential.
    BiometricsOrDeviceCredential,
}

/// Pluggable trait for a [`DeviceAuthenticator`] to do user interaction and
/// verification.
///
/// Implementations wrap whatever the platform offers, a biometric prompt, a
/// lock screen credential sheet. The gate may suspend for as long as the
/// caller-bounded `timeout` allows; it must resolve exactly once and must not
/// block unrelated work while waiting.
#[cfg_attr(any(test, feature = "testable"), mockall::automock)]
#[async_trait::async_trait]
pub trait UserValidationMethod: Send + Sync {
    /// Present the gate for `policy` and wait for the user to complete it.
    ///
    /// * `prompt` - Display text shown on the gate.
    /// * `timeout` - How long the user gets before the attempt resolves to
    ///   [`DeviceBindingError::Timeout`].
    ///
    /// A dismissed gate resolves to [`DeviceBindingError::UserCancelled`].
    async fn evaluate(
        &self,
        policy: UserVerificationPolicy,
        prompt: &Prompt,
        timeout: Duration,
    ) -> Result<(), DeviceBindingError>;

    /// Whether this device can evaluate `policy` at all. Probes capability
    /// without side effects and without showing anything to the user.
    fn can_evaluate(&self, policy: UserVerificationPolicy) -> bool;

    /// Whether keys guarded by this gate live in dedicated hardware.
    ///
    /// Simulated and otherwise headless environments return `false`, which
    /// degrades the access control of generated keys instead of failing key
    /// generation.
    fn is_hardware_backed(&self) -> bool;
}

/// Pluggable trait supplying the application PIN for the `APPLICATION_PIN`
/// policy. PIN verification stays with the application; this library only
/// requires that a PIN was affirmatively collected.
#[cfg_attr(any(test, feature = "testable"), mockall::automock)]
#[async_trait::async_trait]
pub trait PinCollector: Send + Sync {
    /// Collect the application PIN from the user, waiting up to `timeout`.
    async fn collect_pin(&self, prompt: &Prompt, timeout: Duration)
        -> Result<Pin, DeviceBindingError>;
}

#[cfg(any(test, feature = "testable"))]
impl MockUserValidationMethod {
    /// Sets up the mock for a hardware backed device whose user passes the
    /// gate `times` times.
    pub fn verified_user(times: usize) -> Self {
        let mut user_mock = MockUserValidationMethod::new();
        user_mock
            .expect_can_evaluate()
            .returning(|_| true)
            .times(..);
        user_mock
            .expect_is_hardware_backed()
            .returning(|| true)
            .times(..);
        user_mock
            .expect_evaluate()
            .returning(|_, _, _| Ok(()))
            .times(times);
        user_mock
    }

    /// Sets up the mock for a device that cannot evaluate any gate policy.
    pub fn unsupported_device() -> Self {
        let mut user_mock = MockUserValidationMethod::new();
        user_mock
            .expect_can_evaluate()
            .returning(|_| false)
            .times(..);
        user_mock
            .expect_is_hardware_backed()
            .returning(|| false)
            .times(..);
        user_mock
    }

    /// Sets up the mock for a user who dismisses the gate.
    pub fn cancelling_user() -> Self {
        let mut user_mock = MockUserValidationMethod::new();
        user_mock
            .expect_can_evaluate()
            .returning(|_| true)
            .times(..);
        user_mock
            .expect_is_hardware_backed()
            .returning(|| true)
            .times(..);
        user_mock
            .expect_evaluate()
            .returning(|_, _, _| Err(DeviceBindingError::UserCancelled))
            .times(1);
        user_mock
    }
}

#[cfg(any(test, feature = "testable"))]
impl MockPinCollector {
    /// Sets up the mock to hand back `pin` once.
    pub fn returning_pin(pin: &'static str) -> Self {
        let mut collector = MockPinCollector::new();
        collector
            .expect_collect_pin()
            .returning(move |_, _| Ok(Pin::new(pin)))
            .times(1);
        collector
    }
}
