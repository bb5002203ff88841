use serde::Serialize;
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "content")]
/// Errors produced by device binding operations.
///
/// Every fallible operation in these libraries reports through this taxonomy
/// so the surrounding SDK can branch on kind without string matching.
pub enum DeviceBindingError {
    /// The requested authenticator or algorithm cannot operate on this device
    /// or configuration: missing hardware, a missing required parameter, or a
    /// missing application identifier. Not retryable without changing policy.
    Unsupported(Option<String>),
    /// Signing was requested for a user with no existing key material. The
    /// caller must run key generation and registration first.
    ClientNotRegistered,
    /// The platform refused to create the key pair under the requested access
    /// control. Surfaced to the caller, never retried internally.
    KeyGenerationFailed(Option<String>),
    /// The user dismissed the gate.
    UserCancelled,
    /// The gate did not complete within the allotted time.
    Timeout,
    /// Signer construction or signature computation failed after a key was
    /// successfully obtained. Fatal for the current attempt.
    SigningFailed(String),
    /// A registry record could not be written or read.
    Storage(String),
}

impl DeviceBindingError {
    /// Shorthand for [`Self::Unsupported`] with a detail message.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::Unsupported(Some(reason.into()))
    }

    /// Whether the caller may legitimately present the gate again. Only true
    /// for the user outcomes; everything else needs a policy or state change
    /// first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UserCancelled | Self::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_a_kind_tag() {
        let json =
            serde_json::to_string(&DeviceBindingError::unsupported("biometrics not enrolled"))
                .unwrap();
        assert_eq!(
            json,
            r#"{"type":"Unsupported","content":"biometrics not enrolled"}"#
        );

        let json = serde_json::to_string(&DeviceBindingError::ClientNotRegistered).unwrap();
        assert_eq!(json, r#"{"type":"ClientNotRegistered"}"#);
    }

    #[test]
    fn only_gate_outcomes_are_retryable() {
        assert!(DeviceBindingError::UserCancelled.is_retryable());
        assert!(DeviceBindingError::Timeout.is_retryable());
        assert!(!DeviceBindingError::ClientNotRegistered.is_retryable());
        assert!(!DeviceBindingError::KeyGenerationFailed(None).is_retryable());
    }
}
