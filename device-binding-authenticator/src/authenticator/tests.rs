use std::{sync::Arc, time::Duration};

use device_binding_types::{
    binding::{
        AccessControl, DeviceBindingAuthenticationType, DeviceBindingError, Prompt, UserKey,
    },
    jose::AssertionClaims,
};

use super::{AuthenticatorFactory, BiometricOnly, DeviceAuthenticator};
use crate::{
    key_store::{KeyStore, MemoryKeyStore},
    user_validation::{MockPinCollector, MockUserValidationMethod},
};

const TIMEOUT: Duration = Duration::from_secs(60);

fn prompt() -> Prompt {
    Prompt::new("Verify", "", "Authenticate to bind this device")
}

#[test]
fn select_returns_the_requested_auth_type() {
    let factory = AuthenticatorFactory::new(
        Arc::new(MemoryKeyStore::new()),
        Arc::new(MockUserValidationMethod::verified_user(0)),
    )
    .pin_collector(Arc::new(MockPinCollector::new()));

    for auth_type in [
        DeviceBindingAuthenticationType::BiometricOnly,
        DeviceBindingAuthenticationType::BiometricAllowFallback,
        DeviceBindingAuthenticationType::ApplicationPin,
        DeviceBindingAuthenticationType::None,
    ] {
        let authenticator = factory.select(auth_type, "u1", prompt());
        assert_eq!(authenticator.auth_type(), auth_type);
    }
}

#[test]
fn access_control_follows_hardware_backing() {
    let hardware = AuthenticatorFactory::new(
        Arc::new(MemoryKeyStore::new()),
        Arc::new(MockUserValidationMethod::verified_user(0)),
    );
    let biometric = hardware.select(DeviceBindingAuthenticationType::BiometricOnly, "u1", prompt());
    assert_eq!(
        biometric.access_control(),
        Some(AccessControl::BIOMETRY_CURRENT_SET | AccessControl::PRIVATE_KEY_USAGE)
    );
    let fallback = hardware.select(
        DeviceBindingAuthenticationType::BiometricAllowFallback,
        "u1",
        prompt(),
    );
    assert_eq!(
        fallback.access_control(),
        Some(AccessControl::USER_PRESENCE | AccessControl::PRIVATE_KEY_USAGE)
    );

    // a headless environment degrades to the same policy without the
    // hardware flag
    let headless = AuthenticatorFactory::new(
        Arc::new(MemoryKeyStore::new()),
        Arc::new(MockUserValidationMethod::unsupported_device()),
    );
    let degraded = headless.select(DeviceBindingAuthenticationType::BiometricOnly, "u1", prompt());
    assert_eq!(
        degraded.access_control(),
        Some(AccessControl::BIOMETRY_CURRENT_SET)
    );
}

#[tokio::test]
async fn generate_keys_fails_cleanly_on_an_unsupported_device() {
    // Arrange
    let store = Arc::new(MemoryKeyStore::new());
    let factory = AuthenticatorFactory::new(
        store.clone(),
        Arc::new(MockUserValidationMethod::unsupported_device()),
    );
    let authenticator =
        factory.select(DeviceBindingAuthenticationType::BiometricOnly, "u1", prompt());
    assert!(!authenticator.is_supported());

    // Act
    let err = authenticator.generate_keys().await.unwrap_err();

    // Assert
    assert_eq!(
        err,
        DeviceBindingError::Unsupported(Some(
            "BIOMETRIC_ONLY is not supported on this device".to_owned()
        ))
    );
    assert!(store
        .retrieve_key_pair(authenticator.key().key_alias())
        .await
        .is_none());
}

#[tokio::test]
async fn generated_keys_carry_the_strategy_access_control() {
    // Arrange
    let store = Arc::new(MemoryKeyStore::new());
    let factory = AuthenticatorFactory::new(
        store.clone(),
        Arc::new(MockUserValidationMethod::verified_user(0)),
    );
    let authenticator =
        factory.select(DeviceBindingAuthenticationType::BiometricOnly, "u1", prompt());

    // Act
    let pair = authenticator.generate_keys().await.unwrap();

    // Assert
    assert_eq!(pair.alias(), authenticator.key().key_alias());
    assert_eq!(
        store.access_control(pair.alias()),
        Some(AccessControl::BIOMETRY_CURRENT_SET | AccessControl::PRIVATE_KEY_USAGE)
    );
}

#[tokio::test]
async fn authenticate_propagates_cancellation() {
    let factory = AuthenticatorFactory::new(
        Arc::new(MemoryKeyStore::new()),
        Arc::new(MockUserValidationMethod::cancelling_user()),
    );
    let authenticator = factory.select(
        DeviceBindingAuthenticationType::BiometricAllowFallback,
        "u1",
        prompt(),
    );

    let err = authenticator.authenticate(TIMEOUT).await.unwrap_err();

    assert_eq!(err, DeviceBindingError::UserCancelled);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn authenticate_propagates_a_gate_timeout() {
    // Arrange
    let mut user_mock = MockUserValidationMethod::new();
    user_mock.expect_can_evaluate().returning(|_| true).times(..);
    user_mock
        .expect_evaluate()
        .returning(|_, _, _| Err(DeviceBindingError::Timeout))
        .times(1);
    let factory =
        AuthenticatorFactory::new(Arc::new(MemoryKeyStore::new()), Arc::new(user_mock));
    let authenticator =
        factory.select(DeviceBindingAuthenticationType::BiometricOnly, "u1", prompt());

    // Act
    let err = authenticator.authenticate(TIMEOUT).await.unwrap_err();

    // Assert
    assert_eq!(err, DeviceBindingError::Timeout);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn authenticate_requires_initialization() {
    // built directly, never initialized with a prompt
    let authenticator = BiometricOnly::new(
        Arc::new(MemoryKeyStore::new()),
        Arc::new(MockUserValidationMethod::verified_user(0)),
    );

    let err = authenticator.authenticate(TIMEOUT).await.unwrap_err();

    assert_eq!(
        err,
        DeviceBindingError::Unsupported(Some("authenticator has no prompt text".to_owned()))
    );
}

#[tokio::test]
async fn ungated_strategy_resolves_without_interaction() {
    let factory = AuthenticatorFactory::new(
        Arc::new(MemoryKeyStore::new()),
        Arc::new(MockUserValidationMethod::verified_user(0)),
    );
    let authenticator = factory.select(DeviceBindingAuthenticationType::None, "u1", prompt());

    assert!(authenticator.is_supported());
    assert_eq!(authenticator.access_control(), None);
    assert!(authenticator.authenticate(TIMEOUT).await.is_ok());
}

#[tokio::test]
async fn pin_gate_requires_a_collector() {
    let factory = AuthenticatorFactory::new(
        Arc::new(MemoryKeyStore::new()),
        Arc::new(MockUserValidationMethod::verified_user(0)),
    );
    let authenticator =
        factory.select(DeviceBindingAuthenticationType::ApplicationPin, "u1", prompt());

    assert!(!authenticator.is_supported());
    assert_eq!(
        authenticator.generate_keys().await.unwrap_err(),
        DeviceBindingError::Unsupported(Some(
            "APPLICATION_PIN is not supported on this device".to_owned()
        ))
    );
}

#[tokio::test]
async fn pin_gate_accepts_a_collected_pin() {
    let factory = AuthenticatorFactory::new(
        Arc::new(MemoryKeyStore::new()),
        Arc::new(MockUserValidationMethod::verified_user(0)),
    )
    .pin_collector(Arc::new(MockPinCollector::returning_pin("2580")));
    let authenticator =
        factory.select(DeviceBindingAuthenticationType::ApplicationPin, "u1", prompt());

    assert!(authenticator.is_supported());
    assert!(authenticator.authenticate(TIMEOUT).await.is_ok());
}

#[tokio::test]
async fn pin_gate_treats_an_empty_pin_as_dismissal() {
    let factory = AuthenticatorFactory::new(
        Arc::new(MemoryKeyStore::new()),
        Arc::new(MockUserValidationMethod::verified_user(0)),
    )
    .pin_collector(Arc::new(MockPinCollector::returning_pin("")));
    let authenticator =
        factory.select(DeviceBindingAuthenticationType::ApplicationPin, "u1", prompt());

    let err = authenticator.authenticate(TIMEOUT).await.unwrap_err();

    assert_eq!(err, DeviceBindingError::UserCancelled);
}

#[tokio::test]
async fn sign_with_user_key_fails_once_material_is_gone() {
    // Arrange
    let factory = AuthenticatorFactory::new(
        Arc::new(MemoryKeyStore::new()),
        Arc::new(MockUserValidationMethod::verified_user(0)),
    );
    let authenticator = factory.select(DeviceBindingAuthenticationType::None, "u1", prompt());
    let pair = authenticator.generate_keys().await.unwrap();
    let user_key = UserKey::new(
        "u1",
        "user one",
        pair.alias(),
        DeviceBindingAuthenticationType::None,
        1_700_000_000.0,
    );
    let claims = AssertionClaims::new("u1", "abc123", 1_700_000_030, "com.example.app");
    assert!(authenticator
        .sign_with_user_key(&user_key, &claims)
        .await
        .is_ok());

    // Act
    authenticator.delete_keys().await;

    // Assert
    assert_eq!(
        authenticator
            .sign_with_user_key(&user_key, &claims)
            .await
            .unwrap_err(),
        DeviceBindingError::ClientNotRegistered
    );
}
