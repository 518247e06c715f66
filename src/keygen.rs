use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

/// Length of generated API credentials. 32 alphanumeric characters is
/// roughly 190 bits of entropy.
pub const API_KEY_LEN: usize = 32;

/// Generate a uniformly random alphanumeric API key.
pub fn generate_api_key() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(API_KEY_LEN)
        .map(char::from)
        .collect()
}
