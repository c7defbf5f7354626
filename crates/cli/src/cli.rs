use clap::{Args, Parser, Subcommand};
use docseal_core::DocumentType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "docseal",
    about = "Stamp HR documents with a signature block and verification QR code",
    long_about = "Stamp a finished PDF with the signer's image and a verification QR code, \
                  store the signed artifact, and check documents against their digests."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output machine-readable JSON to stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging (debug level unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stamp a PDF, store the signed artifact and print its public URL
    Sign {
        /// Path to the unsigned PDF
        input: PathBuf,

        /// JSON file holding the signer's profile
        #[arg(short, long)]
        profile: PathBuf,

        /// Company that owns the document
        #[arg(long = "company")]
        company_id: String,

        /// Document type: certificate, vacation or permission
        #[arg(short = 't', long = "type")]
        document_type: DocumentType,

        /// Identifier of the document within the company
        #[arg(long = "id")]
        document_id: String,

        #[command(flatten)]
        link: LinkArgs,

        /// Also write the signed PDF to this local path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Append one JSON line per signing attempt to this file
        #[arg(long)]
        audit_log: Option<PathBuf>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Issue a verification code and print the link that resolves it
    Link {
        /// Document type: certificate, vacation or permission
        #[arg(short = 't', long = "type")]
        document_type: DocumentType,

        /// Identifier of the document within the company
        #[arg(long = "id")]
        document_id: String,

        #[command(flatten)]
        link: LinkArgs,
    },

    /// Print the SHA-256 digest of a file
    Digest {
        input: PathBuf,
    },

    /// Check a file against an expected digest
    Verify {
        input: PathBuf,

        /// Expected SHA-256 digest (hex, case-insensitive)
        #[arg(short, long)]
        digest: String,
    },
}

#[derive(Args, Clone)]
pub struct LinkArgs {
    /// Use this verification code instead of generating one
    #[arg(long)]
    pub code: Option<String>,

    /// Base URL of the verification site
    #[arg(long, env = "DOCSEAL_BASE_URL", default_value = docseal_core::DEFAULT_BASE_URL)]
    pub base_url: String,
}

#[derive(Args, Clone)]
pub struct StoreArgs {
    /// Store signed documents under this local directory
    #[arg(long, env = "DOCSEAL_STORE_DIR", conflicts_with = "store_url", requires = "public_url")]
    pub store_dir: Option<PathBuf>,

    /// Public URL prefix that maps onto --store-dir
    #[arg(long, env = "DOCSEAL_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Object storage API endpoint
    #[arg(long, env = "DOCSEAL_STORE_URL", requires = "store_key")]
    pub store_url: Option<String>,

    /// Bucket for --store-url
    #[arg(long, env = "DOCSEAL_STORE_BUCKET", default_value = docseal_io::DEFAULT_BUCKET)]
    pub bucket: String,

    /// API key for --store-url
    #[arg(long, env = "DOCSEAL_STORE_KEY", hide_env_values = true)]
    pub store_key: Option<String>,
}
