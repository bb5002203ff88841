use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Fixed tag naming the platform that produced an assertion.
pub const PLATFORM: &str = "rust";

/// Claim set embedded in an assertion payload.
///
/// Constructed per signing call and never persisted. The claims are
/// deterministic given the same inputs; only the signature over them varies.
/// Expiration is caller supplied and embedded as integer epoch seconds; the
/// signer performs no clock skew validation, that is the verifier's job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssertionClaims {
    /// Subject, the user id the key is bound to.
    pub sub: String,

    /// The opaque server challenge being answered.
    pub challenge: String,

    /// Expiry as integer epoch seconds.
    pub exp: i64,

    /// Issuer, the calling application's identifier.
    pub iss: String,

    /// Platform tag, [`PLATFORM`] for assertions produced here.
    pub platform: String,

    /// Issuer specific extension claims. An IndexMap preserves the order of
    /// keys for JSON byte serialization.
    #[serde(flatten)]
    pub extensions: IndexMap<String, serde_json::Value>,
}

impl AssertionClaims {
    /// The claim set for answering `challenge` on behalf of `sub`.
    pub fn new(
        sub: impl Into<String>,
        challenge: impl Into<String>,
        exp: i64,
        iss: impl Into<String>,
    ) -> Self {
        Self {
            sub: sub.into(),
            challenge: challenge.into(),
            exp,
            iss: iss.into(),
            platform: PLATFORM.to_owned(),
            extensions: IndexMap::new(),
        }
    }

    /// Add an issuer specific claim. Insertion order is serialization order.
    pub fn with_extension(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.extensions.insert(name.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_serialize_with_stable_names_and_order() {
        let claims = AssertionClaims::new("u1", "abc123", 1_700_000_030, "com.example.app");
        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(
            json,
            r#"{"sub":"u1","challenge":"abc123","exp":1700000030,"iss":"com.example.app","platform":"rust"}"#
        );
    }

    #[test]
    fn extension_claims_flatten_after_the_fixed_set() {
        let claims = AssertionClaims::new("u1", "abc123", 1_700_000_030, "com.example.app")
            .with_extension("deviceName", serde_json::Value::String("Pixel 9".into()));
        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.ends_with(r#""platform":"rust","deviceName":"Pixel 9"}"#));

        let decoded: AssertionClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, claims);
    }
}
