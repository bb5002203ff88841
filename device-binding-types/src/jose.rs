//! Implementation of the JOSE structures making up a compact assertion:
//! the protected header, the claim set, and the embedded public key.
//!
//! Only the signing side lives in these libraries; assertion verification is
//! a server concern. The decoding helpers here exist for tests and host
//! tooling that want to look inside a produced assertion.
//!
//! <https://www.rfc-editor.org/rfc/rfc7515>

use crate::encoding;

mod claims;
mod header;
mod jwk;

// re-export types
pub use self::{claims::*, header::*, jwk::*};

/// Reasons a compact assertion failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionParseError {
    /// The token was not three dot separated segments.
    SegmentCount,
    /// A segment was not base64url encoded.
    Encoding,
    /// The header or payload JSON did not match the schema.
    Json,
}

/// A compact assertion split into its decoded parts.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAssertion {
    /// Protected header.
    pub header: JwsHeader,
    /// Claim set from the payload segment.
    pub claims: AssertionClaims,
    /// Raw signature bytes.
    pub signature: Vec<u8>,
    /// The exact text the signature covers, `<header>.<payload>` as
    /// transmitted. Kept so verification does not have to re-serialize.
    pub signing_input: String,
}

impl DecodedAssertion {
    /// Split a compact `header.payload.signature` token and decode each part.
    /// Decoding is all-or-nothing; a malformed segment rejects the token.
    pub fn parse(token: &str) -> Result<Self, AssertionParseError> {
        let (signing_input, signature) = token
            .rsplit_once('.')
            .ok_or(AssertionParseError::SegmentCount)?;
        let (header, payload) = signing_input
            .split_once('.')
            .ok_or(AssertionParseError::SegmentCount)?;
        if header.is_empty() || payload.is_empty() || signature.is_empty() {
            return Err(AssertionParseError::SegmentCount);
        }

        let header_bytes =
            encoding::try_from_base64url(header).ok_or(AssertionParseError::Encoding)?;
        let payload_bytes =
            encoding::try_from_base64url(payload).ok_or(AssertionParseError::Encoding)?;
        let signature =
            encoding::try_from_base64url(signature).ok_or(AssertionParseError::Encoding)?;

        let header: JwsHeader =
            serde_json::from_slice(&header_bytes).map_err(|_| AssertionParseError::Json)?;
        let claims: AssertionClaims =
            serde_json::from_slice(&payload_bytes).map_err(|_| AssertionParseError::Json)?;

        Ok(Self {
            header,
            claims,
            signature,
            signing_input: signing_input.to_owned(),
        })
    }
}
