//! Compact assertion signing.
//!
//! An assertion is a compact JWS: base64url encoded header and claims JSON
//! joined by `.`, signed with ES256, with the raw `r || s` signature bytes
//! appended as the third segment. The header always embeds the public half
//! of the signing key so the server can verify without a separate key
//! distribution step.

use device_binding_types::{
    binding::DeviceBindingError,
    encoding,
    jose::{AssertionClaims, Jwk, JwsHeader},
};
use p256::elliptic_curve::sec1::ToEncodedPoint;

use crate::key_store::KeyPair;

/// Convert a P-256 public key into an embeddable [`Jwk`].
pub fn jwk_from_public_key(public_key: &p256::PublicKey) -> Jwk {
    let point = public_key.to_encoded_point(false);
    // SAFETY: These unwraps are safe because the point above is not compressed
    // (false parameter) therefore x and y are guaranteed to contain values.
    let x = point.x().unwrap().as_slice();
    let y = point.y().unwrap().as_slice();
    Jwk::p256(encoding::base64url(x), encoding::base64url(y))
}

/// Sign `claims` with `key_pair`, producing the compact three segment
/// assertion.
///
/// With `Some(kid)` the header and the embedded JWK both carry that key id,
/// the convention for keys that live in the registry. With `None` the pair
/// is treated as ephemeral and both carry the JWK's own thumbprint instead.
pub fn sign_assertion(
    key_pair: &KeyPair,
    kid: Option<&str>,
    claims: &AssertionClaims,
) -> Result<String, DeviceBindingError> {
    let jwk = jwk_from_public_key(key_pair.public_key());
    let (kid, jwk) = match kid {
        Some(kid) => (kid.to_owned(), jwk.with_kid(kid)),
        None => {
            let thumbprint = jwk.thumbprint();
            (thumbprint.clone(), jwk.with_kid(thumbprint))
        }
    };
    let header = JwsHeader::new(kid, jwk);

    let header_json = serde_json::to_vec(&header)
        .map_err(|err| DeviceBindingError::SigningFailed(err.to_string()))?;
    let claims_json = serde_json::to_vec(claims)
        .map_err(|err| DeviceBindingError::SigningFailed(err.to_string()))?;

    let signing_input = format!(
        "{}.{}",
        encoding::base64url(&header_json),
        encoding::base64url(&claims_json)
    );
    let signature = key_pair.signer().sign(signing_input.as_bytes())?;
    Ok(format!("{signing_input}.{}", encoding::base64url(&signature)))
}
