//! Verification codes handed to people reading a stamped document.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SealError;

const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 6;

/// A `{unix-millis}-{SUFFIX}` code such as `1716573821345-K3J9QZ`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Generate a fresh code from the current time and a random suffix.
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();
        VerificationCode(format!("{millis}-{suffix}"))
    }

    /// Validate a code supplied from outside (CLI flag, lookup request).
    pub fn parse(s: &str) -> Result<Self, SealError> {
        let s = s.trim();
        let Some((millis, suffix)) = s.split_once('-') else {
            return Err(SealError::invalid(
                "verification code",
                format!("{s:?} is missing the '-' separator"),
            ));
        };
        if millis.is_empty() || !millis.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SealError::invalid(
                "verification code",
                format!("{s:?} must start with a numeric timestamp"),
            ));
        }
        if suffix.len() != SUFFIX_LEN || !suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b)) {
            return Err(SealError::invalid(
                "verification code",
                format!("{s:?} must end with {SUFFIX_LEN} upper-case letters or digits"),
            ));
        }
        Ok(VerificationCode(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Convenience for callers that only need the string form.
pub fn generate_code() -> String {
    VerificationCode::generate().0
}
