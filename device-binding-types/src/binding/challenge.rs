use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use super::{DeviceBindingAuthenticationType, Prompt};

/// A server issued request to bind a user to a fresh on-device key pair.
///
/// This is the policy input of the binding flow: which gate to present, who
/// the key belongs to, and the opaque challenge the resulting assertion must
/// answer. Challenges are time bound and single use upstream; a failed
/// attempt is retried by requesting a fresh one, never by reusing this.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct BindingChallenge {
    /// Opaque challenge string to embed in the signed assertion.
    pub challenge: String,

    /// Subject the binding is created for.
    pub user_id: String,

    /// Human readable name persisted alongside the key record.
    pub user_name: String,

    /// Declared gate policy.
    #[serde(default)]
    pub auth_type: DeviceBindingAuthenticationType,

    /// Seconds the user gate may take; also bounds the assertion lifetime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,

    /// Display text for the user facing gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Prompt>,
}

/// A server issued request to prove possession of an already bound key.
///
/// Unlike [`BindingChallenge`] this never creates key material; it selects an
/// existing record (optionally narrowed to one user) and signs the challenge
/// with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct SigningChallenge {
    /// Opaque challenge string to embed in the signed assertion.
    pub challenge: String,

    /// Narrows key selection to records bound to this user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Seconds the user gate may take; also bounds the assertion lifetime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,

    /// Display text for the user facing gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Prompt>,
}
