//! CSRF `state` values for the authorization request.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;

/// Random state token: 32 bytes, URL-safe base64 (43 characters).
#[must_use]
pub fn generate_state() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: [u8; 32] = rng.gen();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Compare the state echoed by the callback with the one that was sent.
#[must_use]
pub fn validate_state(expected: &str, received: Option<&str>) -> bool {
    match received {
        Some(received) => {
            expected.len() == received.len()
                && expected.bytes().zip(received.bytes()).fold(0u8, |acc, (a, b)| acc | (a ^ b))
                    == 0
        }
        None => false,
    }
}
