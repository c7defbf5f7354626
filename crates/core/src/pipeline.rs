//! The signing pipeline.
//!
//! `sign` runs every step in order and persists only at the very end, so any
//! failure before the store write leaves storage untouched.

use serde::Serialize;

use crate::compose::{Stamp, compose};
use crate::digest::compute_digest;
use crate::error::SealError;
use crate::qr::encode_qr;
use crate::source::ImageSource;
use crate::store::{ObjectStore, storage_path};
use crate::types::{DocumentType, SignatureProfile, VerificationPayload};

/// One signing invocation. Nothing here outlives the call.
#[derive(Debug, Clone, Copy)]
pub struct SigningRequest<'a> {
    /// The finished, unsigned PDF.
    pub original: &'a [u8],
    pub profile: &'a SignatureProfile,
    pub verification_code: &'a str,
    pub verification_url: &'a str,
    pub company_id: &'a str,
    pub document_type: DocumentType,
    pub document_id: &'a str,
}

/// What the caller persists alongside its own record.
#[derive(Debug, Clone, Serialize)]
pub struct SignOutcome {
    #[serde(skip)]
    pub signed_bytes: Vec<u8>,
    /// Digest of the unsigned input; this is the value inside the QR code.
    pub original_digest: String,
    /// Digest of `signed_bytes`, i.e. of the stored artifact.
    pub signed_digest: String,
    #[serde(skip)]
    pub qr_image: Vec<u8>,
    pub qr_payload: VerificationPayload,
    pub storage_path: String,
    pub public_url: String,
}

/// Stamp, hash and store a document.
#[tracing::instrument(
    skip(request, images, store),
    fields(
        data_len = request.original.len(),
        company_id = request.company_id,
        document_type = %request.document_type,
        document_id = request.document_id
    )
)]
pub fn sign(
    request: &SigningRequest<'_>,
    images: &dyn ImageSource,
    store: &dyn ObjectStore,
) -> Result<SignOutcome, SealError> {
    if request.verification_code.trim().is_empty() {
        return Err(SealError::InvalidInput {
            field: "verification code",
            reason: "must not be empty".into(),
        });
    }
    let path = storage_path(request.company_id, request.document_type, request.document_id)?;

    let original_digest = compute_digest(request.original);
    let qr_payload = VerificationPayload {
        code: request.verification_code.to_string(),
        url: request.verification_url.to_string(),
        hash: original_digest.clone(),
    };
    let qr_image = encode_qr(&qr_payload)?;

    let image_url = &request.profile.signature_image_url;
    tracing::debug!(url = %image_url, "Fetching signature image");
    let signature_image = images
        .fetch_bytes(image_url)
        .map_err(|e| SealError::ImageFetch {
            url: image_url.clone(),
            reason: format!("{e:#}"),
        })?;

    let profile = request.profile;
    let signed_bytes = compose(
        request.original,
        &Stamp {
            signature_image: &signature_image,
            signer_name: &profile.full_name,
            signer_position: &profile.position,
            signer_identity: &profile.identity_number,
            verification_code: request.verification_code,
            verification_url: request.verification_url,
            document_type: request.document_type,
            document_id: request.document_id,
            qr_image: &qr_image,
        },
    )?;
    let signed_digest = compute_digest(&signed_bytes);

    let public_url = store
        .write_object(&path, &signed_bytes)
        .map_err(|e| SealError::StorageWrite {
            path: path.clone(),
            reason: format!("{e:#}"),
        })?;

    tracing::info!(
        path = %path,
        original_digest = %original_digest,
        signed_digest = %signed_digest,
        "Document signed and stored"
    );

    Ok(SignOutcome {
        signed_bytes,
        original_digest,
        signed_digest,
        qr_image,
        qr_payload,
        storage_path: path,
        public_url,
    })
}
