//! Fingerprint-based near-duplicate filter

use lessons_store::Observation;
use sha2::{Digest, Sha256};

/// Hex characters kept from the digest
const FINGERPRINT_LEN: usize = 8;

/// SHA-256 of the trimmed, lowercased summary, truncated to 8 hex chars.
///
/// A fast approximate filter; collisions at this width are acceptable.
pub fn fingerprint(summary: &str) -> String {
    let normalized = summary.trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(FINGERPRINT_LEN);
    for byte in digest.iter().take(FINGERPRINT_LEN / 2) {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

/// True when any observation in `window` shares the fingerprint
pub fn is_duplicate(fp: &str, window: &[Observation]) -> bool {
    window.iter().any(|o| fingerprint(&o.summary) == fp)
}
