//! The sign command: issue a link, run the pipeline, store and report.

use anyhow::{Context, Result, bail};
use console::style;
use docseal_core::{
    DocumentType, ObjectStore, SignatureProfile, SigningRequest, VerificationCode,
    verification_url,
};
use docseal_io::{HttpObjectStore, LocalObjectStore, UrlImageSource};
use std::path::{Path, PathBuf};

use crate::audit::{self, AuditRecord, Outcome};
use crate::cli::{LinkArgs, StoreArgs};
use crate::json::SignJson;
use crate::util::{format_bytes, read_file, spinner};

pub struct SignArgs {
    pub input: PathBuf,
    pub profile: PathBuf,
    pub company_id: String,
    pub document_type: DocumentType,
    pub document_id: String,
    pub link: LinkArgs,
    pub output: Option<PathBuf>,
    pub audit_log: Option<PathBuf>,
    pub store: StoreArgs,
}

pub fn load_profile(path: &Path) -> Result<SignatureProfile> {
    let raw = read_file(path, "signer profile")?;
    let profile: SignatureProfile = serde_json::from_slice(&raw)
        .with_context(|| format!("Invalid signer profile: {}", path.display()))?;
    if !profile.is_active {
        bail!(
            "Signature profile of {} ({}) is inactive",
            profile.full_name,
            profile.user_id
        );
    }
    Ok(profile)
}

/// Pick the configured object store. A local directory wins over HTTP storage.
pub fn open_store(args: &StoreArgs) -> Result<Box<dyn ObjectStore>> {
    if let Some(dir) = &args.store_dir {
        let public_url = args
            .public_url
            .as_deref()
            .context("--public-url is required with --store-dir")?;
        return Ok(Box::new(LocalObjectStore::new(dir, public_url)?));
    }
    if let Some(endpoint) = &args.store_url {
        let key = args
            .store_key
            .as_deref()
            .context("--store-key is required with --store-url")?;
        return Ok(Box::new(HttpObjectStore::new(endpoint, &args.bucket, key)?));
    }
    bail!("No object store configured (use --store-dir or --store-url)")
}

/// Use the supplied code or generate a fresh one.
pub fn resolve_code(code: Option<&str>) -> Result<VerificationCode> {
    match code {
        Some(c) => Ok(VerificationCode::parse(c)?),
        None => Ok(VerificationCode::generate()),
    }
}

pub fn sign(args: SignArgs, json: bool) -> Result<()> {
    eprintln!("{}", style("==> Signing document").cyan().bold());

    let profile = load_profile(&args.profile)?;
    let store = open_store(&args.store)?;
    let images = UrlImageSource::new()?;

    let bar = spinner(format!("Reading PDF {}", style(args.input.display()).cyan()));
    let original = read_file(&args.input, "PDF")?;
    bar.finish_with_message(format!(
        "[OK] Read PDF ({})",
        style(format_bytes(original.len())).cyan()
    ));

    let code = resolve_code(args.link.code.as_deref())?;
    let url = verification_url(
        &args.link.base_url,
        code.as_str(),
        args.document_type,
        &args.document_id,
    );
    eprintln!(
        "    Signer: {} ({})",
        style(&profile.full_name).cyan(),
        style(&profile.position).dim()
    );
    eprintln!("    Verification code: {}", style(&code).cyan());

    let request = SigningRequest {
        original: &original,
        profile: &profile,
        verification_code: code.as_str(),
        verification_url: &url,
        company_id: &args.company_id,
        document_type: args.document_type,
        document_id: &args.document_id,
    };

    let bar = spinner("Stamping and storing document...");
    let result = docseal_core::sign(&request, &images, store.as_ref());
    bar.finish_and_clear();

    let audit_path = args.audit_log.as_deref();
    let entry = |outcome| AuditRecord {
        timestamp: audit::timestamp(chrono::Utc::now()),
        company_id: &args.company_id,
        document_type: args.document_type.as_str(),
        document_id: &args.document_id,
        user_id: &profile.user_id,
        verification_code: code.as_str(),
        outcome,
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            audit::record(
                audit_path,
                &entry(Outcome::Failed {
                    kind: e.kind(),
                    error: e.to_string(),
                }),
            );
            return Err(e.into());
        }
    };
    audit::record(
        audit_path,
        &entry(Outcome::Signed {
            storage_path: &outcome.storage_path,
            public_url: &outcome.public_url,
            original_digest: &outcome.original_digest,
            signed_digest: &outcome.signed_digest,
        }),
    );

    eprintln!(
        "    Stored {} at {}",
        style(format_bytes(outcome.signed_bytes.len())).cyan(),
        style(&outcome.storage_path).cyan()
    );

    if let Some(path) = &args.output {
        std::fs::write(path, &outcome.signed_bytes)
            .with_context(|| format!("Failed to write signed PDF: {}", path.display()))?;
        eprintln!("    Wrote local copy to {}", style(path.display()).cyan());
    }

    eprintln!(
        "\n{} {}",
        style("[SUCCESS]").green().bold(),
        style("Signed successfully").cyan()
    );

    if json {
        let payload = SignJson {
            status: "ok",
            command: "sign",
            input: args.input.display().to_string(),
            output: args.output.as_ref().map(|p| p.display().to_string()),
            verification_code: code.to_string(),
            verification_url: url,
            original_digest: outcome.original_digest,
            signed_digest: outcome.signed_digest,
            qr_payload: outcome.qr_payload,
            storage_path: outcome.storage_path,
            public_url: outcome.public_url,
        };
        println!("{}", serde_json::to_string(&payload)?);
    } else {
        println!("{}", outcome.public_url);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_json(active: bool) -> String {
        serde_json::json!({
            "company_id": "acme",
            "user_id": "u-1",
            "signature_image_url": "https://cdn.example.com/jane.png",
            "full_name": "Jane Doe",
            "position": "HR Manager",
            "identity_number": "11.111.111-1",
            "is_active": active,
        })
        .to_string()
    }

    fn store_args() -> StoreArgs {
        StoreArgs {
            store_dir: None,
            public_url: None,
            store_url: None,
            bucket: docseal_io::DEFAULT_BUCKET.to_string(),
            store_key: None,
        }
    }

    #[test]
    fn loads_active_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jane.json");
        std::fs::write(&path, profile_json(true)).unwrap();
        let profile = load_profile(&path).unwrap();
        assert_eq!(profile.full_name, "Jane Doe");
    }

    #[test]
    fn refuses_inactive_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jane.json");
        std::fs::write(&path, profile_json(false)).unwrap();
        let err = load_profile(&path).unwrap_err();
        assert!(err.to_string().contains("inactive"), "{err}");
    }

    #[test]
    fn malformed_profile_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{").unwrap();
        let err = load_profile(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"), "{err}");
    }

    #[test]
    fn store_must_be_configured() {
        let err = open_store(&store_args()).err().unwrap();
        assert!(err.to_string().contains("No object store"), "{err}");
    }

    #[test]
    fn local_store_is_selected() {
        let dir = tempfile::tempdir().unwrap();
        let args = StoreArgs {
            store_dir: Some(dir.path().to_path_buf()),
            public_url: Some("https://files.example.com".into()),
            ..store_args()
        };
        let store = open_store(&args).unwrap();
        let url = store.write_object("a/b.pdf", b"%PDF").unwrap();
        assert_eq!(url, "https://files.example.com/a/b.pdf");
        assert!(dir.path().join("a/b.pdf").exists());
    }

    #[test]
    fn supplied_code_is_validated() {
        assert_eq!(
            resolve_code(Some("1700000000000-ABC123")).unwrap().as_str(),
            "1700000000000-ABC123"
        );
        assert!(resolve_code(Some("not-a-code")).is_err());
        assert!(resolve_code(None).is_ok());
    }
}
