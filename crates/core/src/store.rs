//! Where signed artifacts live, and the seam to whatever stores them.

use anyhow::Result;

use crate::error::SealError;
use crate::types::DocumentType;

/// Prefix under which every signed document is stored.
pub const STORAGE_ROOT: &str = "signed-documents";

/// Content type of every object written through [`ObjectStore`].
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Binary object storage with upsert semantics.
///
/// Writing to a path that already holds an object replaces it.
pub trait ObjectStore: Send + Sync {
    /// Persist `data` at `path` and return a publicly resolvable URL for it.
    fn write_object(&self, path: &str, data: &[u8]) -> Result<String>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn write_object(&self, path: &str, data: &[u8]) -> Result<String> {
        (**self).write_object(path, data)
    }
}

/// `signed-documents/{company}/{type}/{document}.pdf`
///
/// Each identifier must be a single, non-empty path segment.
pub fn storage_path(
    company_id: &str,
    document_type: DocumentType,
    document_id: &str,
) -> Result<String, SealError> {
    check_segment("company id", company_id)?;
    check_segment("document id", document_id)?;
    Ok(format!(
        "{STORAGE_ROOT}/{company_id}/{}/{document_id}.pdf",
        document_type.as_str()
    ))
}

fn check_segment(field: &'static str, value: &str) -> Result<(), SealError> {
    if value.is_empty() {
        return Err(SealError::invalid(field, "must not be empty"));
    }
    if value == "." || value == ".." || value.contains(['/', '\\']) {
        return Err(SealError::invalid(
            field,
            format!("{value:?} is not a single path segment"),
        ));
    }
    Ok(())
}
