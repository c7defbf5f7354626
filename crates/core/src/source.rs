//! Seam to wherever signature images are kept.

use anyhow::Result;

/// Resolves an image reference to its raw bytes.
///
/// Implementations perform at most one fetch per call and report a
/// non-success response as an error, never as empty bytes.
pub trait ImageSource: Send + Sync {
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

impl<T: ImageSource + ?Sized> ImageSource for &T {
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        (**self).fetch_bytes(url)
    }
}
