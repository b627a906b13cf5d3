//! [`SourceFetcher`]: the transport implementation of [`DataSource`].

use std::{io, path::Path};

use bytes::Bytes;
use demand_core::{
  Error, Result,
  source::{DataSource, SourceDescriptor, is_valid_blob_id},
};
use reqwest::{Client, StatusCode, header};

use crate::IngestConfig;

const HINT_PUBLIC: &str = "ensure sharing is public";

/// Fetches sources over the filesystem or HTTP(S). One request per fetch;
/// failures are reported, never retried.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct SourceFetcher {
  client:            Client,
  blob_url_template: String,
}

impl SourceFetcher {
  pub fn new(config: &IngestConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.request_timeout())
      .user_agent(config.user_agent.clone())
      .build()
      .map_err(|e| Error::InvalidConfig(format!("http client: {e}")))?;
    Ok(Self {
      client,
      blob_url_template: config.blob_url_template.clone(),
    })
  }

  /// The download URL for an object-storage blob. Ids outside
  /// `[A-Za-z0-9_-]+` are rejected rather than spliced into the query.
  pub fn blob_url(&self, id: &str) -> Result<String> {
    if !is_valid_blob_id(id) {
      return Err(unavailable(
        &format!("blob:{id}"),
        "malformed blob id".into(),
        "blob ids contain only letters, digits, '-' and '_'",
      ));
    }
    Ok(self.blob_url_template.replace("{id}", id))
  }

  async fn fetch_file(&self, origin: &str, path: &Path) -> Result<Bytes> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
      let hint = match e.kind() {
        io::ErrorKind::NotFound => "check that the file exists",
        io::ErrorKind::PermissionDenied => "check the file permissions",
        _ => "check that the path is a readable file",
      };
      unavailable(origin, e.to_string(), hint)
    })?;
    Ok(Bytes::from(bytes))
  }

  async fn fetch_url(&self, origin: &str, url: &str) -> Result<Bytes> {
    let response = self.client.get(url).send().await.map_err(|e| {
      unavailable(origin, e.to_string(), "check the URL and network access")
    })?;

    let status = response.status();
    if matches!(
      status,
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
    ) {
      return Err(unavailable(origin, format!("HTTP {status}"), HINT_PUBLIC));
    }
    if !status.is_success() {
      return Err(unavailable(
        origin,
        format!("HTTP {status}"),
        "the server reported an error; try again later",
      ));
    }

    // Private shared files answer 200 with a sign-in or confirmation page.
    let is_html = response
      .headers()
      .get(header::CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .is_some_and(|v| v.starts_with("text/html"));
    if is_html {
      return Err(unavailable(
        origin,
        "received an HTML page instead of CSV".into(),
        HINT_PUBLIC,
      ));
    }

    response.bytes().await.map_err(|e| {
      unavailable(
        origin,
        e.to_string(),
        "the download was interrupted; try again",
      )
    })
  }
}

fn unavailable(origin: &str, reason: String, hint: &str) -> Error {
  Error::DataUnavailable {
    origin: origin.to_owned(),
    reason,
    hint: hint.to_owned(),
  }
}

impl DataSource for SourceFetcher {
  async fn fetch(&self, descriptor: &SourceDescriptor) -> Result<Bytes> {
    let origin = descriptor.to_string();
    tracing::info!(source = %origin, "fetching");

    let bytes = match descriptor {
      SourceDescriptor::File { path } => self.fetch_file(&origin, path).await?,
      SourceDescriptor::Url { url } => self.fetch_url(&origin, url).await?,
      SourceDescriptor::Blob { id } => {
        self.fetch_url(&origin, &self.blob_url(id)?).await?
      }
      SourceDescriptor::Inline { content, .. } => {
        Bytes::copy_from_slice(content.as_bytes())
      }
    };

    tracing::debug!(source = %origin, bytes = bytes.len(), "fetched");
    Ok(bytes)
  }
}
