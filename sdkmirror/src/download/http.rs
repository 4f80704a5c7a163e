//! HTTP-based artifact transfer.
//!
//! Each transfer streams the response body straight into the destination
//! file, reporting cumulative bytes as it goes, then verifies the SHA-1 of
//! the finished file. An existing destination file is overwritten, and the
//! file is removed again if the body is cut short or fails verification.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, Response};

use super::checksum::verify_checksum;
use super::request::FetchRequest;
use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::{MirrorError, MirrorResult};
use crate::traits::Transfer;

/// Buffer size for reading/writing during downloads (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Blocking HTTP transfer with checksum verification.
#[derive(Debug)]
pub struct HttpTransfer {
    client: Client,
    pub(crate) timeout: Duration,
}

impl HttpTransfer {
    /// Create a transfer with the default timeout.
    pub fn new() -> MirrorResult<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a transfer with a custom connect timeout.
    ///
    /// Archives can be several hundred megabytes, so only connecting is
    /// bounded; the body may take as long as it needs.
    pub fn with_timeout(timeout: Duration) -> MirrorResult<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| MirrorError::Client(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Issue the GET request and check its status.
    fn request(&self, url: &str) -> MirrorResult<Response> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                MirrorError::Timeout {
                    url: url.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                }
            } else {
                MirrorError::Transfer {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::Transfer {
                url: url.to_string(),
                reason: format!("GET request failed with status {}", status),
            });
        }

        Ok(response)
    }

    /// Create the destination file, and its parent directories.
    fn create_destination(dest: &Path) -> MirrorResult<File> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| MirrorError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        File::create(dest).map_err(|e| MirrorError::Write {
            path: dest.to_path_buf(),
            source: e,
        })
    }

    /// Stream the response body into the destination file.
    fn stream_to_file(
        &self,
        url: &str,
        mut response: Response,
        dest: &Path,
        on_progress: &dyn Fn(u64),
    ) -> MirrorResult<u64> {
        let mut writer = BufWriter::new(Self::create_destination(dest)?);
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut downloaded = 0u64;

        loop {
            let bytes_read = response.read(&mut buffer).map_err(|e| MirrorError::Transfer {
                url: url.to_string(),
                reason: format!("Read error: {}", e),
            })?;

            if bytes_read == 0 {
                break;
            }

            writer
                .write_all(&buffer[..bytes_read])
                .map_err(|e| MirrorError::Write {
                    path: dest.to_path_buf(),
                    source: e,
                })?;

            downloaded += bytes_read as u64;
            on_progress(downloaded);
        }

        writer.flush().map_err(|e| MirrorError::Write {
            path: dest.to_path_buf(),
            source: e,
        })?;

        Ok(downloaded)
    }
}

impl Transfer for HttpTransfer {
    fn transfer(&self, request: &FetchRequest, on_progress: &dyn Fn(u64)) -> MirrorResult<u64> {
        let response = self.request(&request.url)?;

        // A partial or corrupt archive must not look like a finished mirror entry
        let result = self
            .stream_to_file(&request.url, response, &request.destination, on_progress)
            .and_then(|written| {
                verify_checksum(&request.destination, &request.checksum).map(|()| written)
            });
        if result.is_err() {
            fs::remove_file(&request.destination).ok();
        }

        result
    }
}
