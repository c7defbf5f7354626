//! Common types and result structures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SealError;

/// Kinds of documents that can be stamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Certificate,
    Vacation,
    Permission,
}

impl DocumentType {
    pub const ALL: [DocumentType; 3] = [
        DocumentType::Certificate,
        DocumentType::Vacation,
        DocumentType::Permission,
    ];

    /// Singular spelling, used as a storage path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Certificate => "certificate",
            DocumentType::Vacation => "vacation",
            DocumentType::Permission => "permission",
        }
    }

    /// Collection name the public verification endpoint expects.
    pub fn collection(&self) -> &'static str {
        match self {
            DocumentType::Certificate => "certificates",
            DocumentType::Vacation => "vacations",
            DocumentType::Permission => "permissions",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = SealError;

    /// Accepts the singular or plural spelling, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        DocumentType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted || t.collection() == wanted)
            .ok_or_else(|| {
                SealError::invalid(
                    "document type",
                    format!("{s:?} (expected certificate, vacation or permission)"),
                )
            })
    }
}

/// Stored signing identity of a company user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureProfile {
    pub company_id: String,
    pub user_id: String,
    /// Where the signature image lives (http(s), `data:` or `file://`).
    pub signature_image_url: String,
    pub full_name: String,
    pub position: String,
    /// National identity number (RUT or equivalent).
    pub identity_number: String,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

fn active_by_default() -> bool {
    true
}

/// Data carried inside the QR code of a stamped document.
///
/// Field order is part of the wire format: `{"code", "url", "hash"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationPayload {
    pub code: String,
    pub url: String,
    /// SHA-256 hex digest of the original, unsigned document.
    pub hash: String,
}

impl VerificationPayload {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
