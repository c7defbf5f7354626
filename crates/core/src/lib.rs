//! Core document stamping: verification codes and links, content digests,
//! QR payloads, last-page composition and the signing pipeline.
//!
//! Network and storage access stay behind the [`ImageSource`] and
//! [`ObjectStore`] traits; this crate performs no I/O of its own.

pub mod code;
pub mod compose;
pub mod digest;
pub mod error;
pub mod layout;
pub mod link;
pub mod pdf;
pub mod pipeline;
pub mod qr;
pub mod source;
pub mod store;
pub mod types;

pub use code::{VerificationCode, generate_code};
pub use compose::{Stamp, compose};
pub use digest::{DIGEST_HEX_LEN, compute_digest, digests_match, is_digest_hex};
pub use error::{Result, SealError};
pub use layout::PageSize;
pub use link::{DEFAULT_BASE_URL, issue_link, strip_scheme, verification_url};
pub use pipeline::{SignOutcome, SigningRequest, sign};
pub use qr::{QR_IMAGE_SIZE, encode_qr};
pub use source::ImageSource;
pub use store::{ObjectStore, PDF_CONTENT_TYPE, STORAGE_ROOT, storage_path};
pub use types::*;
