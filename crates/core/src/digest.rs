//! Content digests used as tamper evidence.

use sha2::{Digest as _, Sha256};

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// SHA-256 of `data`, rendered as lowercase hex.
#[tracing::instrument(skip(data), fields(data_len = data.len()))]
pub fn compute_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Whether `s` has the shape of a digest produced by [`compute_digest`].
pub fn is_digest_hex(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Compare a computed digest against one supplied by a user.
///
/// The expected value may be upper-case or surrounded by whitespace.
pub fn digests_match(computed: &str, expected: &str) -> bool {
    computed.eq_ignore_ascii_case(expected.trim())
}
