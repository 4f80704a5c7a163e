//! Manifest retrieval and on-disk copies.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::{MirrorError, MirrorResult};
use crate::traits::ManifestSource;

/// Blocking HTTP client for manifest documents.
#[derive(Debug)]
pub struct ManifestFetcher {
    client: Client,
}

impl ManifestFetcher {
    /// Create a fetcher with the default timeout.
    pub fn new() -> MirrorResult<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a fetcher with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> MirrorResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MirrorError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl ManifestSource for ManifestFetcher {
    fn fetch(&self, url: &str) -> MirrorResult<String> {
        tracing::debug!(url, "Fetching manifest");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| MirrorError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::Fetch {
                url: url.to_string(),
                reason: format!("GET request failed with status {}", status),
            });
        }

        response.text().map_err(|e| MirrorError::Fetch {
            url: url.to_string(),
            reason: format!("Read error: {}", e),
        })
    }
}

/// File name a manifest is stored under: the URL's last path segment.
pub fn manifest_file_name(url: &str) -> MirrorResult<&str> {
    let name = url.rsplit('/').next().unwrap_or(url);
    if name.is_empty() {
        return Err(MirrorError::InvalidPath(format!(
            "manifest url has no file name: {}",
            url
        )));
    }
    Ok(name)
}

/// Write the raw manifest body into `output_dir`, named after the URL.
///
/// Returns the path written.
pub fn write_manifest_copy(url: &str, body: &str, output_dir: &Path) -> MirrorResult<PathBuf> {
    let name = manifest_file_name(url)?;

    fs::create_dir_all(output_dir).map_err(|e| MirrorError::CreateDir {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let path = output_dir.join(name);
    fs::write(&path, body).map_err(|e| MirrorError::Write {
        path: path.clone(),
        source: e,
    })?;

    tracing::info!(path = %path.display(), bytes = body.len(), "Saved manifest copy");
    Ok(path)
}
