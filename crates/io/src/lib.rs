//! Concrete collaborators for the docseal pipeline: a signature image loader
//! and object stores for signed artifacts.

pub mod fetch;
pub mod store;

#[cfg(test)]
mod test_server;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

pub use fetch::UrlImageSource;
pub use store::{HttpObjectStore, LocalObjectStore};

/// Bucket used when none is configured.
pub const DEFAULT_BUCKET: &str = "documents";
pub const USER_AGENT: &str = concat!("docseal/", env!("CARGO_PKG_VERSION"));

/// Whole-request bound applied by the HTTP collaborators unless replaced
/// through their `with_timeout` methods.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client shared by the HTTP collaborators. `None` waits indefinitely.
pub(crate) fn http_client(timeout: Option<Duration>) -> Result<Client> {
  Client::builder()
    .user_agent(USER_AGENT)
    .timeout(timeout)
    .build()
    .context("Failed to build HTTP client")
}
