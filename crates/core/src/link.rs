//! Public verification links.

use url::form_urlencoded::byte_serialize;

use crate::code::VerificationCode;
use crate::types::DocumentType;

/// Verification site used when the caller configures none.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Fresh verification code plus the link that resolves it.
pub fn issue_link(
    base_url: &str,
    document_type: DocumentType,
    document_id: &str,
) -> (VerificationCode, String) {
    let code = VerificationCode::generate();
    let url = verification_url(base_url, code.as_str(), document_type, document_id);
    (code, url)
}

/// Build `{base}/verify?code=…&type=…&id=…` for a stamped document.
pub fn verification_url(
    base_url: &str,
    code: &str,
    document_type: DocumentType,
    document_id: &str,
) -> String {
    let base = base_url.trim_end_matches('/');
    format!(
        "{base}/verify?code={}&type={}&id={}",
        encode(code),
        document_type.collection(),
        encode(document_id)
    )
}

/// Drop the `scheme://` prefix, for compact printing on paper.
pub fn strip_scheme(url: &str) -> &str {
    url.split_once("://").map_or(url, |(_, rest)| rest)
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_certificate_link() {
        assert_eq!(
            verification_url(
                "https://example.com",
                "1700000000000-ABC123",
                DocumentType::Certificate,
                "doc-1"
            ),
            "https://example.com/verify?code=1700000000000-ABC123&type=certificates&id=doc-1"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let a = verification_url("https://hr.acme.cl/", "1-AAAAAA", DocumentType::Vacation, "7");
        let b = verification_url("https://hr.acme.cl", "1-AAAAAA", DocumentType::Vacation, "7");
        assert_eq!(a, b);
        assert!(a.contains("type=vacations"));
    }

    #[test]
    fn query_values_are_escaped() {
        let url = verification_url("https://x.io", "1-AAAAAA", DocumentType::Permission, "a&b c");
        assert!(url.ends_with("&id=a%26b+c"), "{url}");
    }

    #[test]
    fn issued_link_embeds_its_code() {
        let (code, url) = issue_link("https://x.io", DocumentType::Certificate, "doc-9");
        assert!(url.contains(&format!("code={code}")), "{url}");
        assert!(url.ends_with("&type=certificates&id=doc-9"));
    }

    #[test]
    fn strips_scheme() {
        assert_eq!(strip_scheme("https://x.io/verify?a=1"), "x.io/verify?a=1");
        assert_eq!(strip_scheme("x.io/verify"), "x.io/verify");
    }
}
