//! Configuration for a mirror run.

use std::path::PathBuf;
use std::time::Duration;

/// Host every archive `url` in a manifest is relative to.
pub const DEFAULT_BASE_URL: &str = "https://dl.google.com/android/repository/";

/// Primary SDK repository index.
pub const REPOSITORY_MANIFEST_URL: &str =
    "https://dl.google.com/android/repository/repository-11.xml";

/// List of third-party add-on sites.
pub const ADDONS_LIST_URL: &str = "https://dl.google.com/android/repository/addons_list-2.xml";

/// Google add-on index.
pub const ADDON_MANIFEST_URL: &str = "https://dl.google.com/android/repository/addon.xml";

/// Manifests processed, in this order, when none are given explicitly.
pub const DEFAULT_MANIFEST_URLS: [&str; 3] =
    [REPOSITORY_MANIFEST_URL, ADDONS_LIST_URL, ADDON_MANIFEST_URL];

/// Path prefix under which the static server exposes the mirror.
pub const SERVE_PREFIX: &str = "/android/repository/";

/// Number of concurrent artifact transfers.
pub const DEFAULT_CONCURRENCY: usize = 2;

/// How often the progress display is refreshed.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300; // 5 minutes

/// Configuration for a mirror run.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Directory receiving manifest copies and archives.
    pub output_dir: PathBuf,

    /// Base URL archive paths are appended to. Always ends with `/`.
    pub base_url: String,

    /// Manifests to resolve, in processing order.
    pub manifest_urls: Vec<String>,

    /// Maximum concurrent downloads.
    pub concurrency: usize,

    /// Progress refresh interval.
    pub tick_interval: Duration,

    /// Timeout for manifest requests and for connecting to archive hosts.
    pub timeout: Duration,

    /// Skip the confirmation prompt.
    pub silent: bool,

    /// Write a verbatim copy of every fetched manifest into `output_dir`.
    pub save_manifests: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            base_url: DEFAULT_BASE_URL.to_string(),
            manifest_urls: DEFAULT_MANIFEST_URLS.iter().map(|s| s.to_string()).collect(),
            concurrency: DEFAULT_CONCURRENCY,
            tick_interval: DEFAULT_TICK_INTERVAL,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            silent: false,
            save_manifests: true,
        }
    }
}

impl MirrorConfig {
    /// Create a new configuration writing into the given directory.
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            ..Default::default()
        }
    }

    /// Replace the default manifests with the given URLs.
    ///
    /// An empty iterator keeps the defaults.
    pub fn with_manifest_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let urls: Vec<String> = urls.into_iter().map(Into::into).collect();
        if !urls.is_empty() {
            self.manifest_urls = urls;
        }
        self
    }

    /// Set the base URL archives are downloaded from.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.base_url = url;
        self
    }

    /// Set the maximum concurrent downloads (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the progress refresh interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable the confirmation prompt.
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Enable or disable saving manifest copies.
    pub fn with_save_manifests(mut self, save: bool) -> Self {
        self.save_manifests = save;
        self
    }
}

/// Format a byte count as a human-readable size.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MirrorConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.manifest_urls.len(), 3);
        assert_eq!(config.manifest_urls[0], REPOSITORY_MANIFEST_URL);
        assert_eq!(config.manifest_urls[1], ADDONS_LIST_URL);
        assert_eq!(config.manifest_urls[2], ADDON_MANIFEST_URL);
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.tick_interval, Duration::from_millis(200));
        assert!(!config.silent);
        assert!(config.save_manifests);
    }

    #[test]
    fn test_builder_pattern() {
        let config = MirrorConfig::new(PathBuf::from("/srv/mirror"))
            .with_manifest_urls(["https://example.com/repo.xml"])
            .with_base_url("https://example.com/files")
            .with_concurrency(3)
            .with_timeout(Duration::from_secs(60))
            .with_silent(true)
            .with_save_manifests(false);

        assert_eq!(config.output_dir, PathBuf::from("/srv/mirror"));
        assert_eq!(config.manifest_urls, vec!["https://example.com/repo.xml"]);
        assert_eq!(config.base_url, "https://example.com/files/");
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.silent);
        assert!(!config.save_manifests);
    }

    #[test]
    fn test_empty_manifest_list_keeps_defaults() {
        let config = MirrorConfig::default().with_manifest_urls(Vec::<String>::new());
        assert_eq!(config.manifest_urls.len(), 3);
    }

    #[test]
    fn test_min_concurrency() {
        let config = MirrorConfig::default().with_concurrency(0);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
