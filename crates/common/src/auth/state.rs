//! CSRF `state` parameter helpers

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of generated state values
pub const STATE_LENGTH: usize = 32;

/// Generate a random alphanumeric state token for CSRF protection
#[must_use]
pub fn generate_state() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(STATE_LENGTH).map(char::from).collect()
}

/// Validate that the state token matches
///
/// Compares in constant time with respect to the contents.
#[must_use]
pub fn validate_state(expected: &str, actual: &str) -> bool {
    let (expected, actual) = (expected.as_bytes(), actual.as_bytes());
    if expected.len() != actual.len() {
        return false;
    }
    expected.iter().zip(actual).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
