//! # Device Binding Types
//!
//! Rust type definitions for device binding: the server declared policies and
//! challenges that start a binding, the persisted user key records, the error
//! taxonomy shared by every operation, and the JOSE structures making up the
//! compact signed assertion handed back to the server.

mod utils;

pub mod binding;
pub mod jose;

// Re-exports
pub use utils::{encoding, rand};
