//! Sample App for Device Binding
use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use device_binding::{
    authenticator::{
        AuthenticatorFactory, BindingClient, BoundAssertion, DeviceAuthenticator, MemoryKeyStore,
        MemoryUserKeyRepository, NoneAuthenticator, UserKeyService, UserValidationMethod,
        UserVerificationPolicy,
    },
    types::{
        binding::{
            BindingChallenge, DeviceBindingAuthenticationType, DeviceBindingError, Prompt,
            SigningChallenge,
        },
        jose::{AssertionClaims, DecodedAssertion},
        rand::random_challenge,
    },
};

// MyUserValidationMethod is a stub impl of the UserValidationMethod trait, used later.
struct MyUserValidationMethod {}
#[async_trait::async_trait]
impl UserValidationMethod for MyUserValidationMethod {
    async fn evaluate(
        &self,
        _policy: UserVerificationPolicy,
        _prompt: &Prompt,
        _timeout: Duration,
    ) -> Result<(), DeviceBindingError> {
        Ok(())
    }

    fn can_evaluate(&self, _policy: UserVerificationPolicy) -> bool {
        true
    }

    fn is_hardware_backed(&self) -> bool {
        true
    }
}

// Example of how to set up, bind and sign with a `BindingClient`.
async fn client_setup(
    challenge_from_server: String,
    auth_type_from_server: DeviceBindingAuthenticationType,
    user_id: &str,
    user_name: &str,
) -> Result<(BoundAssertion, String), DeviceBindingError> {
    // First create the collaborators for the AuthenticatorFactory to use.
    let store = Arc::new(MemoryKeyStore::new());
    let user_validation_method = Arc::new(MyUserValidationMethod {});
    let factory = AuthenticatorFactory::new(store, user_validation_method);

    // Create the registry service for the BindingClient.
    // A plain HashMap is the simplest possible implementation of UserKeyRepository
    let service = UserKeyService::new(MemoryUserKeyRepository::new()).await;

    // Create the BindingClient
    // If you are binding keys, you need to declare the BindingClient as mut
    let mut my_client = BindingClient::new(factory, service, "com.example.app");

    // The following values, provided as parameters to this function, would usually be
    // deserialized from a server callback according to the context of the application.
    let request = BindingChallenge {
        challenge: challenge_from_server,
        user_id: user_id.to_owned(),
        user_name: user_name.to_owned(),
        auth_type: auth_type_from_server,
        timeout: Some(60),
        prompt: Some(Prompt::new(
            "Confirm it's you",
            "Device sign in",
            "Registers this device for passwordless sign in",
        )),
    };

    // Now bind the key.
    let bound = my_client.bind(&request).await?;

    // Let's try and sign.
    // Create a challenge that would usually come from the server.
    let challenge_from_server = random_challenge();
    // Now try and sign
    let signing_request = SigningChallenge {
        challenge: challenge_from_server,
        user_id: Some(user_id.to_owned()),
        timeout: None,
        prompt: None,
    };

    let assertion = my_client.sign(&signing_request).await?;

    Ok((bound, assertion))
}

async fn authenticator_setup(
    user_id: &str,
    challenge_from_server: String,
    issuer: String,
) -> Result<DecodedAssertion, DeviceBindingError> {
    let store = Arc::new(MemoryKeyStore::new());

    let my_authenticator = NoneAuthenticator::new(store);

    let key_pair = my_authenticator.generate_keys().await?;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Our example should unwrap.");
    let exp = i64::try_from(now.as_secs() + 60).expect("Our example should unwrap.");
    let claims = AssertionClaims::new(user_id, challenge_from_server, exp, issuer);

    let assertion = my_authenticator.sign(&key_pair, key_pair.alias(), &claims)?;

    DecodedAssertion::parse(&assertion).map_err(|err| {
        DeviceBindingError::SigningFailed(format!("produced assertion failed to parse: {err:?}"))
    })
}

fn binding_success(bound: &BoundAssertion) {
    println!("Device binding succeeded:\n\n{:?}\n\n", bound.user_key);
}

fn signing_success(assertion: &str) {
    println!("Challenge signing succeeded:\n\n{assertion}\n\n");
}

fn binding_not_registered() {
    println!("Binding error: Client not registered.");
}

fn binding_other_error(error: DeviceBindingError) {
    println!("Binding error: Other error: {:?}", error);
}

#[tokio::main]
async fn main() -> Result<(), DeviceBindingError> {
    let user_id = "e3af7e32-5b13-4b08-9091-28fd37ef4e83";

    // Set up a client, bind a key and sign a challenge, then report results.
    let (bound, assertion) = client_setup(
        random_challenge(), // challenge_from_server
        DeviceBindingAuthenticationType::BiometricAllowFallback,
        user_id,
        "jdoe@example.org",
    )
    .await?;

    binding_success(&bound);
    signing_success(&assertion);

    // Authenticator Version
    let authenticator_result =
        authenticator_setup(user_id, random_challenge(), "com.example.app".to_owned()).await;

    match authenticator_result {
        Ok(decoded) => {
            println!("Assertion decoded:\n\n{:?}\n\n", decoded.claims);
        }
        Err(DeviceBindingError::ClientNotRegistered) => binding_not_registered(),
        Err(error) => binding_other_error(error),
    };

    Ok(())
}
