//! Random number generator utilities used for tests and examples

use rand::RngCore;

/// Generate random data of specific length.
pub fn random_vec(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut data);
    data
}

/// Generate an opaque challenge string of the shape servers send.
pub fn random_challenge() -> String {
    super::encoding::base64url(&random_vec(32))
}
