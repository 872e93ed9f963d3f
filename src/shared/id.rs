//! Record identifiers
//!
//! Identifiers are generated by the core, never by the store:
//! `<prefix>_<unix-millis>_<random-suffix>`, e.g. `res_1736500000000_k3v9q0xa`.

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

const SUFFIX_LEN: usize = 8;

/// Generate a new identifier with the given entity prefix.
pub fn new_id(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix)
}
