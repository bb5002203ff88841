use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::SignatureAlgorithm;
use crate::encoding;

/// A JSON Web Key carrying the public half of a P-256 signing key, embedded
/// in assertion headers so servers can verify without a separate key
/// distribution step.
///
/// <https://www.rfc-editor.org/rfc/rfc7517>
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Jwk {
    /// Key type, `EC` for the keys produced here.
    pub kty: String,

    /// Curve name, `P-256` for the keys produced here.
    pub crv: String,

    /// Base64url encoded x coordinate of the public point.
    pub x: String,

    /// Base64url encoded y coordinate of the public point.
    pub y: String,

    /// Intended key use, `sig`.
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,

    /// Algorithm the key is intended for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<SignatureAlgorithm>,

    /// Key identifier. The registry kid for bound keys, or the thumbprint
    /// for ephemeral ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl Jwk {
    /// A P-256 signature key from already base64url encoded coordinates.
    pub fn p256(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            kty: "EC".to_owned(),
            crv: "P-256".to_owned(),
            x: x.into(),
            y: y.into(),
            key_use: Some("sig".to_owned()),
            alg: Some(SignatureAlgorithm::Es256),
            kid: None,
        }
    }

    /// Set an explicit key identifier.
    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// Use the key's own [thumbprint](Self::thumbprint) as its identifier,
    /// the convention for keys that exist only for one assertion.
    pub fn with_thumbprint_as_kid(mut self) -> Self {
        self.kid = Some(self.thumbprint());
        self
    }

    /// The RFC 7638 thumbprint: SHA-256 over the required members in
    /// lexicographic order, base64url encoded.
    ///
    /// The canonical form is built by hand; the member values are base64url
    /// strings and curve names, neither of which needs JSON escaping.
    ///
    /// <https://www.rfc-editor.org/rfc/rfc7638>
    pub fn thumbprint(&self) -> String {
        let canonical = format!(
            r#"{{"crv":"{}","kty":"{}","x":"{}","y":"{}"}}"#,
            self.crv, self.kty, self.x, self.y
        );
        let digest: [u8; 32] = Sha256::digest(canonical.as_bytes()).into();
        encoding::base64url(&digest)
    }
}
