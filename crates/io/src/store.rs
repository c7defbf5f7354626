//! Object stores for signed artifacts.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use docseal_core::{ObjectStore, PDF_CONTENT_TYPE};
use reqwest::blocking::Client;
use std::time::Duration;
use url::Url;

/// Stores objects under a local directory and reports URLs under a public base.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
  root: PathBuf,
  public_base_url: String,
}

impl LocalObjectStore {
  pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Result<Self> {
    let root = root.into();
    std::fs::create_dir_all(&root)
      .with_context(|| format!("Failed to create store directory {}", root.display()))?;
    Ok(Self {
      root,
      public_base_url: public_base_url.trim_end_matches('/').to_string(),
    })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Read back a stored object.
  pub fn read_object(&self, path: &str) -> Result<Vec<u8>> {
    let full = self.resolve(path)?;
    std::fs::read(&full).with_context(|| format!("Failed to read {}", full.display()))
  }

  fn resolve(&self, path: &str) -> Result<PathBuf> {
    let relative = Path::new(path);
    if path.is_empty() || !relative.components().all(|c| matches!(c, Component::Normal(_))) {
      bail!("Object path {path:?} must be relative and contain no '.' or '..' segments");
    }
    Ok(self.root.join(relative))
  }
}

impl ObjectStore for LocalObjectStore {
  #[tracing::instrument(skip(self, data), fields(data_len = data.len()))]
  fn write_object(&self, path: &str, data: &[u8]) -> Result<String> {
    let full = self.resolve(path)?;
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    // Readers never observe a half-written object.
    let mut partial = full.clone().into_os_string();
    partial.push(".partial");
    let partial = PathBuf::from(partial);
    std::fs::write(&partial, data)
      .with_context(|| format!("Failed to write {}", partial.display()))?;
    std::fs::rename(&partial, &full)
      .with_context(|| format!("Failed to move object into place at {}", full.display()))?;

    tracing::debug!(path = %full.display(), "Object written");
    Ok(format!("{}/{path}", self.public_base_url))
  }
}

/// Uploads objects to an HTTP storage API with upsert semantics.
///
/// Objects are written with `POST {endpoint}/object/{bucket}/{path}` and are
/// publicly readable at `{endpoint}/object/public/{bucket}/{path}`. Uploads
/// are bounded by [`crate::DEFAULT_TIMEOUT`] unless [`HttpObjectStore::with_timeout`]
/// replaces it.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
  client: Client,
  endpoint: Url,
  bucket: String,
  api_key: String,
}

impl HttpObjectStore {
  pub fn new(endpoint: &str, bucket: &str, api_key: &str) -> Result<Self> {
    let endpoint = Url::parse(endpoint).with_context(|| format!("Invalid store URL: {endpoint}"))?;
    if endpoint.cannot_be_a_base() {
      bail!("Store URL {endpoint} cannot be used as a base");
    }
    if bucket.is_empty() || bucket.contains('/') {
      bail!("Bucket name {bucket:?} must be a single non-empty segment");
    }
    Ok(Self {
      client: crate::http_client(Some(crate::DEFAULT_TIMEOUT))?,
      endpoint,
      bucket: bucket.to_string(),
      api_key: api_key.to_string(),
    })
  }

  /// Use `timeout` for whole uploads; `None` waits indefinitely.
  pub fn with_timeout(mut self, timeout: Option<Duration>) -> Result<Self> {
    self.client = crate::http_client(timeout)?;
    Ok(self)
  }

  fn object_url(&self, public: bool, path: &str) -> Result<Url> {
    let mut url = self.endpoint.clone();
    {
      let mut segments = url
        .path_segments_mut()
        .map_err(|()| anyhow!("Store URL cannot be used as a base"))?;
      segments.pop_if_empty().push("object");
      if public {
        segments.push("public");
      }
      segments.push(&self.bucket);
      segments.extend(path.split('/'));
    }
    Ok(url)
  }

  pub fn public_url(&self, path: &str) -> Result<String> {
    Ok(self.object_url(true, path)?.to_string())
  }
}

impl ObjectStore for HttpObjectStore {
  #[tracing::instrument(skip(self, data), fields(data_len = data.len(), bucket = %self.bucket))]
  fn write_object(&self, path: &str, data: &[u8]) -> Result<String> {
    let url = self.object_url(false, path)?;
    let response = self
      .client
      .post(url.clone())
      .bearer_auth(&self.api_key)
      .header("apikey", &self.api_key)
      .header("x-upsert", "true")
      .header(reqwest::header::CONTENT_TYPE, PDF_CONTENT_TYPE)
      .body(data.to_vec())
      .send()
      .with_context(|| format!("Upload to {url} failed"))?;

    let status = response.status();
    if !status.is_success() {
      let detail = response.text().unwrap_or_default();
      bail!("Store rejected upload with {status}: {}", detail.trim());
    }

    tracing::debug!(%url, "Object uploaded");
    self.public_url(path)
  }
}
