//! JSON output formats.

use docseal_core::VerificationPayload;
use serde::Serialize;

#[derive(Serialize)]
pub struct SignJson<'a> {
    pub status: &'a str,
    pub command: &'a str,
    pub input: String,
    pub output: Option<String>,
    pub verification_code: String,
    pub verification_url: String,
    pub original_digest: String,
    pub signed_digest: String,
    pub qr_payload: VerificationPayload,
    pub storage_path: String,
    pub public_url: String,
}

#[derive(Serialize)]
pub struct LinkJson<'a> {
    pub status: &'a str,
    pub command: &'a str,
    pub verification_code: String,
    pub verification_url: String,
}

#[derive(Serialize)]
pub struct DigestJson<'a> {
    pub status: &'a str,
    pub command: &'a str,
    pub input: String,
    pub digest: String,
}

#[derive(Serialize)]
pub struct VerifyJson<'a> {
    pub status: &'a str,
    pub command: &'a str,
    pub input: String,
    pub digest: String,
}

#[derive(Serialize)]
pub struct ErrorJson<'a> {
    pub status: &'a str,
    pub error: String,
    /// Failure class, when the error came from the pipeline or a digest check.
    pub kind: Option<&'static str>,
    pub causes: Vec<String>,
}
