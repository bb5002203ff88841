pub mod encoding;
pub mod rand;
