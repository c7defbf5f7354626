use crate::cli::{Cli, Commands};
use crate::commands::DigestMismatch;
use crate::json::ErrorJson;
use crate::sign::SignArgs;
use anyhow::Result;
use console::style;
use docseal_core::SealError;

/// Stable failure class for errors that carry one.
pub fn error_kind(e: &anyhow::Error) -> Option<&'static str> {
    if let Some(seal) = e.downcast_ref::<SealError>() {
        return Some(seal.kind());
    }
    e.downcast_ref::<DigestMismatch>().map(|_| "DigestMismatchError")
}

pub fn run(cli: Cli) -> Result<()> {
    let json = cli.json;

    let result = match cli.command {
        Commands::Sign {
            input,
            profile,
            company_id,
            document_type,
            document_id,
            link,
            output,
            audit_log,
            store,
        } => crate::sign::sign(
            SignArgs {
                input,
                profile,
                company_id,
                document_type,
                document_id,
                link,
                output,
                audit_log,
                store,
            },
            json,
        ),

        Commands::Link {
            document_type,
            document_id,
            link,
        } => crate::commands::issue_link(document_type, document_id, link, json),

        Commands::Digest { input } => crate::commands::digest_file(input, json),

        Commands::Verify { input, digest } => crate::commands::verify_file(input, digest, json),
    };

    if let Err(e) = &result {
        if json {
            let causes: Vec<String> = e.chain().skip(1).map(|c| c.to_string()).collect();
            let payload = ErrorJson {
                status: "error",
                error: e.to_string(),
                kind: error_kind(e),
                causes,
            };
            println!("{}", serde_json::to_string(&payload)?);
        } else {
            let label = error_kind(e).unwrap_or("ERROR");
            eprintln!(
                "\n{} {}",
                style(format!("[{label}]")).red().bold(),
                style(&e).red()
            );

            for (i, cause) in e.chain().skip(1).enumerate() {
                if i == 0 {
                    eprintln!("\n    Caused by:");
                }
                eprintln!("      - {}", style(cause).red());
            }
            eprintln!();
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_keep_their_kind() {
        let err: anyhow::Error = SealError::DocumentParse("no header".into()).into();
        assert_eq!(error_kind(&err), Some("DocumentParseError"));

        let err: anyhow::Error = DigestMismatch {
            expected: "0".repeat(64),
            actual: "1".repeat(64),
        }
        .into();
        assert_eq!(error_kind(&err), Some("DigestMismatchError"));

        assert_eq!(error_kind(&anyhow::anyhow!("other")), None);
    }
}
