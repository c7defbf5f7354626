//! Failure taxonomy for the stamping pipeline.

use thiserror::Error;

/// Every way a signing run can fail. All variants are terminal: nothing is
/// retried and nothing is persisted once one of them is returned.
#[derive(Debug, Error)]
pub enum SealError {
    /// The signer's signature image could not be retrieved.
    #[error("failed to fetch signature image from {url}: {reason}")]
    ImageFetch { url: String, reason: String },

    /// The input bytes are not a usable PDF document.
    #[error("failed to parse input document: {0}")]
    DocumentParse(String),

    /// An image (signature or QR) could not be decoded or embedded.
    #[error("failed to embed {image} image: {reason}")]
    ImageEmbed { image: &'static str, reason: String },

    /// The signed artifact could not be persisted.
    #[error("failed to write signed document to {path}: {reason}")]
    StorageWrite { path: String, reason: String },

    /// The last page is not one of the page sizes the layout was drawn for.
    #[error("unsupported page size {width:.2}x{height:.2} (expected Letter, A4 or Legal portrait)")]
    UnsupportedPageSize { width: f32, height: f32 },

    #[error("failed to encode verification QR code: {0}")]
    QrEncode(String),

    #[error("failed to serialize signed document: {0}")]
    DocumentWrite(String),

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl SealError {
    /// Stable name of the failure class, suitable for API responses and audit records.
    pub fn kind(&self) -> &'static str {
        match self {
            SealError::ImageFetch { .. } => "ImageFetchError",
            SealError::DocumentParse(_) => "DocumentParseError",
            SealError::ImageEmbed { .. } => "ImageEmbedError",
            SealError::StorageWrite { .. } => "StorageWriteError",
            SealError::UnsupportedPageSize { .. } => "UnsupportedPageSizeError",
            SealError::QrEncode(_) => "QrEncodeError",
            SealError::DocumentWrite(_) => "DocumentWriteError",
            SealError::InvalidInput { .. } => "InvalidInputError",
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SealError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = SealError> = std::result::Result<T, E>;
