//! # Device-Binding-RS by 1Password
//!
//! [![github]](https://github.com/1Password/device-binding-rs/tree/main/device-binding/)
//! [![version]](https://crates.io/crates/device-binding/)
//! [![documentation]](https://docs.rs/device-binding/)
//!
//! The `device-binding-rs` library is a collection of Rust libraries for binding user
//! identities to signing keys that never leave the device, and answering server
//! challenges with signed, time-bound assertions in the compact [JWS] format. It is
//! comprised of two sub-libraries:
//!
//! - `device-binding-authenticator` - a library, usable as [`authenticator`], which
//!   implements the authenticator strategies, the key store and registry seams, and
//!   the binding and signing flows.
//! - `device-binding-types` - type definitions, usable as [`types`]: challenges, key
//!   records, access control descriptors, the error taxonomy and the JOSE types of
//!   the assertion format.
//!
//! Conceptually, device binding is registration plus proof of possession: the server
//! declares which user gate it wants (biometrics, biometrics with a device credential
//! fallback, an application PIN, or none), the device mints a key pair behind that
//! gate, and every subsequent challenge is answered by signing it with the bound key.
//! How challenges and assertions travel between your application and the server is an
//! implementation detail for users of these crates.
//!
//! You can think of the pieces as a chain:
//!
//! Server <-> [`BindingClient`](authenticator::BindingClient) <->
//! [`DeviceAuthenticator`](authenticator::DeviceAuthenticator) <->
//! [`KeyStore`](authenticator::KeyStore) / [`UserKeyRepository`](authenticator::UserKeyRepository)
//!
//! The [`BindingClient`](authenticator::BindingClient) marshals challenges into gate
//! evaluations, key generation, signing and record keeping. It provides the following
//! API:
//!
//! - [`bind()`](authenticator::BindingClient::bind) - mint and persist a key for a
//!   binding challenge, returning the first assertion signed with it.
//! - [`sign()`](authenticator::BindingClient::sign) - answer a signing challenge with
//!   a key bound earlier.
//!
//! The client does not itself hold key material. Key pairs live behind the
//! [`KeyStore`](authenticator::KeyStore) trait, user records behind
//! [`UserKeyRepository`](authenticator::UserKeyRepository), and user interaction
//! behind [`UserValidationMethod`](authenticator::UserValidationMethod) and
//! [`PinCollector`](authenticator::PinCollector); in-memory implementations of the
//! storage traits ship in the [`authenticator`] library and platform adapters are
//! yours to provide.
//!
//! A runnable demonstration binary is provided in `device-binding/examples/usage.rs`.
//!
//! [github]: https://img.shields.io/badge/GitHub-1Password%2Fdevice--binding--rs%2Fdevice--binding-informational?logo=github&style=flat
//! [version]: https://img.shields.io/crates/v/device-binding?logo=rust&style=flat
//! [documentation]: https://img.shields.io/docsrs/device-binding/latest?logo=docs.rs&style=flat
//! [JWS]: https://www.rfc-editor.org/rfc/rfc7515
//!
//! ### Example: Using the BindingClient for server challenges
//!
//! The highest-level type in these libraries is the
//! [`BindingClient`](authenticator::BindingClient). Creating one from scratch means
//! choosing a key store, a user key repository, and a user validation method, then
//! handing them to an [`AuthenticatorFactory`](authenticator::AuthenticatorFactory).
//!
//! In this example the `challenge` struct would usually be deserialized straight from
//! the server's callback payload; here it is built by hand.
//! ```
//! use std::{sync::Arc, time::Duration};
//!
//! use device_binding::{
//!     authenticator::{
//!         AuthenticatorFactory, BindingClient, MemoryKeyStore, MemoryUserKeyRepository,
//!         UserKeyService, UserValidationMethod, UserVerificationPolicy,
//!     },
//!     types::binding::{
//!         BindingChallenge, DeviceBindingAuthenticationType, DeviceBindingError, Prompt,
//!         SigningChallenge,
//!     },
//! };
//! #
//! # // AlwaysVerified is a stub impl of the UserValidationMethod trait, used later.
//! # struct AlwaysVerified;
//! # #[async_trait::async_trait]
//! # impl UserValidationMethod for AlwaysVerified {
//! #     async fn evaluate(
//! #         &self,
//! #         _policy: UserVerificationPolicy,
//! #         _prompt: &Prompt,
//! #         _timeout: Duration,
//! #     ) -> Result<(), DeviceBindingError> {
//! #         Ok(())
//! #     }
//! #
//! #     fn can_evaluate(&self, _policy: UserVerificationPolicy) -> bool {
//! #         true
//! #     }
//! #
//! #     fn is_hardware_backed(&self) -> bool {
//! #         true
//! #     }
//! # }
//!
//! // Example of how to set up, bind and sign with a `BindingClient`.
//! # tokio_test::block_on(async {
//! let store = Arc::new(MemoryKeyStore::new());
//! let factory = AuthenticatorFactory::new(store, Arc::new(AlwaysVerified));
//! let service = UserKeyService::new(MemoryUserKeyRepository::new()).await;
//! let mut client = BindingClient::new(factory, service, "com.example.app");
//!
//! let challenge = BindingChallenge {
//!     challenge: "uPbJqU4OpMKLDS1HNNDMBTWtm3buGNqF".to_owned(),
//!     user_id: "u1".to_owned(),
//!     user_name: "jdoe@example.org".to_owned(),
//!     auth_type: DeviceBindingAuthenticationType::BiometricAllowFallback,
//!     timeout: Some(60),
//!     prompt: Some(Prompt::new(
//!         "Confirm it's you",
//!         "Device sign in",
//!         "Registers this device for passwordless sign in",
//!     )),
//! };
//! let bound = client.bind(&challenge).await.unwrap();
//! println!("registered key {}", bound.user_key.kid);
//!
//! // Later challenges reuse the bound key.
//! let assertion = client
//!     .sign(&SigningChallenge {
//!         challenge: "aFresherChallengeFromTheServer".to_owned(),
//!         user_id: Some("u1".to_owned()),
//!         timeout: None,
//!         prompt: None,
//!     })
//!     .await
//!     .unwrap();
//! # assert!(!assertion.is_empty());
//! # })
//! ```
//!
//! ### Example: Using a strategy directly
//!
//! The following shows the layer underneath: selecting a strategy without the client
//! and signing a claim set with a freshly minted pair.
//!
//! ```
//! # use std::sync::Arc;
//! use device_binding::{
//!     authenticator::{DeviceAuthenticator, MemoryKeyStore, NoneAuthenticator},
//!     types::jose::{AssertionClaims, DecodedAssertion},
//! };
//!
//! # tokio_test::block_on(async {
//! let authenticator = NoneAuthenticator::new(Arc::new(MemoryKeyStore::new()));
//! let key_pair = authenticator.generate_keys().await.unwrap();
//!
//! let claims = AssertionClaims::new("u1", "abc123", 1_700_000_030, "com.example.app");
//! let assertion = authenticator
//!     .sign(&key_pair, key_pair.alias(), &claims)
//!     .unwrap();
//!
//! let decoded = DecodedAssertion::parse(&assertion).unwrap();
//! assert_eq!(decoded.claims.challenge, "abc123");
//! # })
//! ```

pub use device_binding_authenticator as authenticator;
pub use device_binding_types as types;
