use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use super::DeviceBindingAuthenticationType;

/// A persisted record tying a user identity to an on-device key pair.
///
/// One record per (user, device) pair under normal operation; multiple
/// records accumulate when registration happens more than once without
/// cleanup, which is a recognized and queryable state rather than an error.
///
/// The serialized field names are stable: records written by one release
/// must decode under every later release. Decoding is all-fields-or-error;
/// a record missing any field is rejected whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct UserKey {
    /// Subject the key pair is bound to.
    pub user_id: String,

    /// Human readable name shown when a caller must pick between keys.
    pub user_name: String,

    /// Unique key identifier, also the keystore alias of the key pair.
    pub kid: String,

    /// The gate policy the key pair was generated under.
    pub auth_type: DeviceBindingAuthenticationType,

    /// Epoch seconds at persistence time; never mutated afterwards.
    pub created_at: f64,
}

impl UserKey {
    /// Create a record. `created_at` is fixed here and never changes.
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        kid: impl Into<String>,
        auth_type: DeviceBindingAuthenticationType,
        created_at: f64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            kid: kid.into(),
            auth_type,
            created_at,
        }
    }

    /// The keystore alias holding this record's key pair. Always equal to
    /// [`Self::kid`]; the alias is the sole lookup key into the keystore.
    pub fn key_alias(&self) -> &str {
        &self.kid
    }
}

/// Where key records stand for a lookup. Derived from registry contents at
/// query time, never stored.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyFoundStatus {
    /// No records matched the lookup.
    NoKeysFound,
    /// Exactly one record matched.
    SingleKeyFound(UserKey),
    /// More than one record matched; the caller resolves which one to use.
    MultipleKeysFound(Vec<UserKey>),
}

impl KeyFoundStatus {
    /// Apply the zero/one/many rule to a set of matching records.
    pub fn from_keys(mut keys: Vec<UserKey>) -> Self {
        match keys.len() {
            0 => Self::NoKeysFound,
            1 => Self::SingleKeyFound(keys.remove(0)),
            _ => Self::MultipleKeysFound(keys),
        }
    }
}
