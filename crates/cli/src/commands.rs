//! Link issuing and digest commands.

use anyhow::{Result, bail};
use console::style;
use docseal_core::{DocumentType, compute_digest, digests_match, is_digest_hex, verification_url};
use std::path::{Path, PathBuf};

use crate::cli::LinkArgs;
use crate::json::{DigestJson, LinkJson, VerifyJson};
use crate::sign::resolve_code;
use crate::util::{format_bytes, read_file, spinner};

pub fn issue_link(
  document_type: DocumentType,
  document_id: String,
  link: LinkArgs,
  json: bool,
) -> Result<()> {
  if document_id.trim().is_empty() {
    bail!("Document id must not be empty");
  }
  let code = resolve_code(link.code.as_deref())?;
  let url = verification_url(&link.base_url, code.as_str(), document_type, &document_id);

  if json {
    let payload = LinkJson {
      status: "ok",
      command: "link",
      verification_code: code.to_string(),
      verification_url: url,
    };
    println!("{}", serde_json::to_string(&payload)?);
  } else {
    eprintln!("    Verification code: {}", style(&code).cyan());
    println!("{url}");
  }
  Ok(())
}

fn hash_file(input: &Path) -> Result<String> {
  let bar = spinner(format!("Hashing {}", style(input.display()).cyan()));
  let data = read_file(input, "file")?;
  let digest = compute_digest(&data);
  bar.finish_with_message(format!(
    "[OK] Hashed {}",
    style(format_bytes(data.len())).cyan()
  ));
  Ok(digest)
}

pub fn digest_file(input: PathBuf, json: bool) -> Result<()> {
  let digest = hash_file(&input)?;

  if json {
    let payload = DigestJson {
      status: "ok",
      command: "digest",
      input: input.display().to_string(),
      digest,
    };
    println!("{}", serde_json::to_string(&payload)?);
  } else {
    println!("{digest}");
  }
  Ok(())
}

/// The file on disk does not hash to the digest the user expected.
#[derive(Debug, thiserror::Error)]
#[error("Digest mismatch: expected {expected}, got {actual}")]
pub struct DigestMismatch {
  pub expected: String,
  pub actual: String,
}

/// Hash `input` and return its digest if it equals `expected`.
fn check_digest(input: &Path, expected: &str) -> Result<String> {
  let expected = expected.trim().to_ascii_lowercase();
  if !is_digest_hex(&expected) {
    bail!("Expected digest must be 64 hexadecimal characters");
  }
  let actual = hash_file(input)?;
  if !digests_match(&actual, &expected) {
    return Err(DigestMismatch { expected, actual }.into());
  }
  Ok(actual)
}

/// Recompute the digest of `input` and compare it with `expected`.
///
/// A mismatch is an error so that the process exits non-zero; the error
/// output is the only report of it.
pub fn verify_file(input: PathBuf, expected: String, json: bool) -> Result<()> {
  eprintln!("{}", style("==> Verifying document digest").cyan().bold());
  let actual = check_digest(&input, &expected)?;

  eprintln!(
    "\n{} {}",
    style("[VALID]").green().bold(),
    style("Document matches the expected digest").green()
  );
  if json {
    let payload = VerifyJson {
      status: "ok",
      command: "verify",
      input: input.display().to_string(),
      digest: actual,
    };
    println!("{}", serde_json::to_string(&payload)?);
  } else {
    println!("{actual}");
  }
  Ok(())
}
