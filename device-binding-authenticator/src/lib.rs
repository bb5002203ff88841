//! # Device Binding Authenticator
//!
//! [![github]](https://github.com/1Password/device-binding-rs/tree/main/device-binding-authenticator)
//! [![version]](https://crates.io/crates/device-binding-authenticator)
//! [![documentation]](https://docs.rs/device-binding-authenticator/)
//!
//! This crate implements the device binding flows of an authentication SDK.
//! A [`BindingClient`] answers server challenges by minting an on-device key
//! pair behind a user gate, signing a compact time-bound assertion with it,
//! and keeping a registry of which keys belong to which user. The parts that
//! vary between platforms are defined through traits — key storage
//! ([`KeyStore`]), the user gate ([`UserValidationMethod`]), PIN collection
//! ([`PinCollector`]) and record storage ([`UserKeyRepository`]) — while the
//! strategy selection, signing, and rollback logic stay shared.
//!
//! Signing is pure-Rust ES256 through the [RustCrypto] p256 implementation,
//! which keeps the crate portable to any target the host SDK builds for.
//!
//! [github]: https://img.shields.io/badge/GitHub-1Password%2Fdevice--binding--rs%2Fdevice--binding--authenticator-informational?logo=github&style=flat
//! [version]: https://img.shields.io/crates/v/device-binding-authenticator?logo=rust&style=flat
//! [documentation]: https://img.shields.io/docsrs/device-binding-authenticator/latest?logo=docs.rs&style=flat
//! [RustCrypto]: https://github.com/RustCrypto

mod authenticator;
mod binding;
mod jws;
mod key_store;
mod registry;
mod user_validation;

pub use self::{
    authenticator::{
        ApplicationPinDeviceAuthenticator, AuthenticatorFactory, BiometricAndDeviceCredential,
        BiometricOnly, DeviceAuthenticator, NoneAuthenticator,
    },
    binding::{BindingClient, BoundAssertion, DEFAULT_TIMEOUT_SECS},
    jws::{jwk_from_public_key, sign_assertion},
    key_store::{CryptoKey, KeyPair, KeyStore, MemoryKeyStore, SigningHandle},
    registry::{MemoryUserKeyRepository, UserKeyRepository, UserKeyService, UserKeys},
    user_validation::{PinCollector, UserValidationMethod, UserVerificationPolicy},
};

#[cfg(feature = "testable")]
pub use self::{
    key_store::MockKeyStore,
    registry::MockUserKeyRepository,
    user_validation::{MockPinCollector, MockUserValidationMethod},
};
