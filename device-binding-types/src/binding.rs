//! Types describing a device binding: the policy a server declares, the
//! access control applied to generated keys, the persisted user key records
//! and the status derived from them, and the error taxonomy every operation
//! reports through.

mod access_control;
mod auth_type;
mod challenge;
mod error;
mod pin;
mod prompt;
mod user_key;

// re-export types
pub use self::{
    access_control::*, auth_type::*, challenge::*, error::*, pin::*, prompt::*, user_key::*,
};
