//! Append-only JSONL record of signing attempts.
//!
//! Recording is best effort: a failure to write the log is reported at `warn`
//! and never changes the outcome of the command that produced the record.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct AuditRecord<'a> {
    pub timestamp: String,
    pub company_id: &'a str,
    pub document_type: &'a str,
    pub document_id: &'a str,
    pub user_id: &'a str,
    pub verification_code: &'a str,
    pub outcome: Outcome<'a>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome<'a> {
    Signed {
        storage_path: &'a str,
        public_url: &'a str,
        original_digest: &'a str,
        signed_digest: &'a str,
    },
    Failed {
        kind: &'a str,
        error: String,
    },
}

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Append `record` to `path`, logging rather than returning any failure.
pub fn record(path: Option<&Path>, record: &AuditRecord<'_>) {
    let Some(path) = path else {
        return;
    };
    if let Err(e) = append(path, record) {
        tracing::warn!(path = %path.display(), "Audit log write failed: {e:#}");
    }
}

fn append(path: &Path, record: &AuditRecord<'_>) -> Result<()> {
    let mut line = serde_json::to_vec(record).context("Failed to serialize audit record")?;
    line.push(b'\n');
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    file.write_all(&line)
        .with_context(|| format!("Failed to append to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(code: &str) -> AuditRecord<'_> {
        AuditRecord {
            timestamp: "2024-05-24T17:23:41.345Z".into(),
            company_id: "acme",
            document_type: "certificate",
            document_id: "doc-1",
            user_id: "u-1",
            verification_code: code,
            outcome: Outcome::Failed {
                kind: "ImageFetchError",
                error: "connection refused".into(),
            },
        }
    }

    #[test]
    fn appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        record(Some(&path), &failed("1-AAAAAA"));
        record(Some(&path), &failed("2-BBBBBB"));

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["outcome"]["status"], "failed");
        assert_eq!(lines[0]["outcome"]["kind"], "ImageFetchError");
        assert_eq!(lines[1]["verification_code"], "2-BBBBBB");
    }

    #[test]
    fn unwritable_log_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        record(Some(dir.path()), &failed("1-AAAAAA"));
        assert!(append(dir.path(), &failed("1-AAAAAA")).is_err());
    }

    #[test]
    fn timestamps_are_utc_millis() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(timestamp(at), "2023-11-14T22:13:20.123Z");
    }
}
