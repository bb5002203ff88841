use std::fmt;

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use super::Jwk;

/// The token type tag every assertion header carries.
pub const ASSERTION_TYP: &str = "JWS";

/// Signature algorithms assertions can be signed with.
///
/// Deliberately closed: servers negotiate nothing here, the binding protocol
/// pins ECDSA over P-256.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[typeshare(serialized_as = "String")]
pub enum SignatureAlgorithm {
    /// ECDSA using P-256 and SHA-256, serialized as `ES256`.
    #[default]
    #[serde(rename = "ES256")]
    Es256,
}

impl SignatureAlgorithm {
    /// The JOSE registry name of the algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Es256 => "ES256",
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Protected header of a compact assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JwsHeader {
    /// Algorithm the assertion is signed with.
    pub alg: SignatureAlgorithm,

    /// Key identifier of the signing key: the registry kid, or the embedded
    /// key's thumbprint when signing with an ephemeral pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Token type tag, always [`ASSERTION_TYP`].
    pub typ: String,

    /// The public half of the signing key, so the server can verify without
    /// a separate key distribution step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwk: Option<Jwk>,
}

impl JwsHeader {
    /// Header for an ES256 assertion signed by the key behind `kid`.
    pub fn new(kid: impl Into<String>, jwk: Jwk) -> Self {
        Self {
            alg: SignatureAlgorithm::Es256,
            kid: Some(kid.into()),
            typ: ASSERTION_TYP.to_owned(),
            jwk: Some(jwk),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_serializes_in_protected_order() {
        let jwk = Jwk::p256("eA", "eQ");
        let header = JwsHeader::new("kid-1", jwk);
        let json = serde_json::to_string(&header).unwrap();
        assert!(json.starts_with(r#"{"alg":"ES256","kid":"kid-1","typ":"JWS","jwk":{"#));
    }

    #[test]
    fn algorithm_displays_its_registry_name() {
        assert_eq!(SignatureAlgorithm::Es256.to_string(), "ES256");
    }
}
