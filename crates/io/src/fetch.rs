//! Signature image loading.

use anyhow::{Context, Result, anyhow, bail};
use base64::Engine;
use docseal_core::ImageSource;
use reqwest::blocking::Client;
use std::time::Duration;
use url::Url;

/// Loads signature images from `http(s)://`, `data:` and `file://` references.
///
/// Every call performs a single attempt. There is no cache and no retry.
/// HTTP requests are bounded by [`crate::DEFAULT_TIMEOUT`] unless
/// [`UrlImageSource::with_timeout`] says otherwise.
#[derive(Debug, Clone)]
pub struct UrlImageSource {
  client: Client,
}

impl UrlImageSource {
  pub fn new() -> Result<Self> {
    Self::with_timeout(Some(crate::DEFAULT_TIMEOUT))
  }

  /// Use `timeout` for whole HTTP requests; `None` waits indefinitely.
  pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
    Ok(Self {
      client: crate::http_client(timeout)?,
    })
  }

  fn fetch_http(&self, url: &str) -> Result<Vec<u8>> {
    let response = self
      .client
      .get(url)
      .send()
      .with_context(|| format!("Request to {url} failed"))?;
    let status = response.status();
    if !status.is_success() {
      bail!("{url} responded with {status}");
    }
    let body = response
      .bytes()
      .with_context(|| format!("Failed to read response body from {url}"))?;
    Ok(body.to_vec())
  }
}

impl ImageSource for UrlImageSource {
  #[tracing::instrument(skip(self, url), fields(scheme = url.split(':').next().unwrap_or_default()))]
  fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
    let bytes = if url.starts_with("data:") {
      decode_data_url(url)?
    } else {
      let parsed = Url::parse(url).with_context(|| format!("Invalid image URL: {url}"))?;
      match parsed.scheme() {
        "http" | "https" => self.fetch_http(url)?,
        "file" => {
          let path = parsed
            .to_file_path()
            .map_err(|()| anyhow!("Not a local file URL: {url}"))?;
          std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        other => bail!("Unsupported image URL scheme: {other}"),
      }
    };

    if bytes.is_empty() {
      bail!("Signature image is empty");
    }
    tracing::debug!(len = bytes.len(), "Loaded signature image");
    Ok(bytes)
  }
}

/// Decode a `data:[<mediatype>];base64,<payload>` URL.
///
/// Accepts padded and unpadded base64 and ignores embedded whitespace.
fn decode_data_url(url: &str) -> Result<Vec<u8>> {
  let rest = url.strip_prefix("data:").context("Not a data URL")?;
  let Some((meta, payload)) = rest.split_once(',') else {
    bail!("Data URL has no ',' separator");
  };
  if !meta.ends_with(";base64") {
    bail!("Only base64 data URLs are supported (got {meta:?})");
  }
  let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
  base64::engine::general_purpose::STANDARD
    .decode(&cleaned)
    .or_else(|_| base64::engine::general_purpose::STANDARD_NO_PAD.decode(&cleaned))
    .map_err(|e| anyhow!("Invalid base64 in data URL: {e}"))
}
