//! Cheap byte-level checks run before a document is handed to the parser.

use crate::error::SealError;

const HEADER: &[u8] = b"%PDF-";
const EOF_MARKER: &[u8] = b"%%EOF";

/// Readers accept junk before the header as long as it starts within the first KiB.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Offset of the `%PDF-` header, if it appears near the start of `data`.
pub fn find_header_offset(data: &[u8]) -> Option<usize> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    window.windows(HEADER.len()).position(|w| w == HEADER)
}

/// Offset immediately after the last `%%EOF` marker.
pub fn find_eof_offset(data: &[u8]) -> Option<usize> {
    data.windows(EOF_MARKER.len())
        .rposition(|w| w == EOF_MARKER)
        .map(|pos| pos + EOF_MARKER.len())
}

/// Reject input that cannot possibly be a PDF, with a clearer message than the parser gives.
#[tracing::instrument(skip(data), fields(data_len = data.len()))]
pub fn check_envelope(data: &[u8]) -> Result<(), SealError> {
    if data.is_empty() {
        return Err(SealError::DocumentParse("input is empty".into()));
    }
    if find_header_offset(data).is_none() {
        return Err(SealError::DocumentParse(
            "missing %PDF- header in the first 1024 bytes".into(),
        ));
    }
    if find_eof_offset(data).is_none() {
        return Err(SealError::DocumentParse(
            "missing %%EOF marker (truncated document?)".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_last_eof_when_multiple() {
        let pdf = b"%PDF-1.4\n%%EOF\nextra%%EOF";
        assert_eq!(find_eof_offset(pdf), Some(pdf.len()));
    }

    #[test]
    fn tolerates_leading_bytes_before_header() {
        let pdf = b"\xef\xbb\xbf%PDF-1.7\n...%%EOF\n";
        assert_eq!(find_header_offset(pdf), Some(3));
        assert!(check_envelope(pdf).is_ok());
    }

    #[test]
    fn rejects_non_pdf_input() {
        let err = check_envelope(b"<html>not a pdf</html>").unwrap_err();
        assert_eq!(err.kind(), "DocumentParseError");
        assert!(check_envelope(b"").is_err());
    }

    #[test]
    fn rejects_truncated_pdf() {
        let err = check_envelope(b"%PDF-1.4\n1 0 obj\n<<").unwrap_err();
        assert!(err.to_string().contains("%%EOF"), "{err}");
    }
}
