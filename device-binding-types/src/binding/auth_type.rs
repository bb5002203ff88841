use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use typeshare::typeshare;

/// The kind of user gate a server declares for a binding request. Immutable
/// once received; drives which authenticator variant is constructed and which
/// access control descriptor protects the generated key pair.
///
/// The serialized values are the wire values servers send and the `authType`
/// value stored in every user key record.
#[derive(
    Debug,
    Default,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[typeshare(serialized_as = "String")]
pub enum DeviceBindingAuthenticationType {
    /// The currently enrolled biometric set must match at key use time.
    BiometricOnly,

    /// Biometrics when available, falling back to the device credential.
    BiometricAllowFallback,

    /// An application managed PIN gates the key; no platform biometric gate.
    ApplicationPin,

    /// No user gate; the key is usable without user interaction.
    #[default]
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_are_screaming_snake_case() {
        let cases = [
            (DeviceBindingAuthenticationType::BiometricOnly, "BIOMETRIC_ONLY"),
            (
                DeviceBindingAuthenticationType::BiometricAllowFallback,
                "BIOMETRIC_ALLOW_FALLBACK",
            ),
            (DeviceBindingAuthenticationType::ApplicationPin, "APPLICATION_PIN"),
            (DeviceBindingAuthenticationType::None, "NONE"),
        ];
        for (ty, wire) in cases {
            assert_eq!(serde_json::to_string(&ty).unwrap(), format!("\"{wire}\""));
            assert_eq!(ty.to_string(), wire);
            let parsed: DeviceBindingAuthenticationType =
                serde_json::from_str(&format!("\"{wire}\"")).unwrap();
            assert_eq!(parsed, ty);
        }
    }

    #[test]
    fn unknown_wire_value_is_rejected() {
        let result = serde_json::from_str::<DeviceBindingAuthenticationType>("\"FACE_ID\"");
        assert!(result.is_err());
    }
}
