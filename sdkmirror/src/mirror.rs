//! End-to-end mirror run.
//!
//! [`Mirror`] chains the stages together: every configured manifest is
//! fetched, saved, normalized and resolved in order, the pending download is
//! summarized and confirmed, and the resolved archives are handed to the
//! [`DownloadEngine`].
//!
//! A manifest that cannot be fetched or parsed is logged and skipped; the
//! remaining manifests are still processed.

use std::sync::Arc;

use crate::config::MirrorConfig;
use crate::download::{BatchReport, DownloadEngine, HttpTransfer, RequestBatch};
use crate::error::{MirrorError, MirrorResult};
use crate::manifest::{self, ArtifactDescriptor, ManifestFetcher};
use crate::summary::{confirm_download, PendingSummary};
use crate::traits::{Confirmer, ManifestSource, ProgressObserver, Transfer};

/// A manifest that could not be resolved.
#[derive(Debug)]
pub struct ManifestFailure {
    pub url: String,
    pub error: MirrorError,
}

/// Artifacts resolved from every configured manifest.
#[derive(Debug, Default)]
pub struct ResolvedManifests {
    /// Retained artifacts, concatenated in manifest order.
    pub artifacts: Vec<ArtifactDescriptor>,
    /// Manifests that were skipped.
    pub failures: Vec<ManifestFailure>,
}

/// How a mirror run ended.
#[derive(Debug)]
pub enum MirrorOutcome {
    /// No manifest yielded an archive, so nothing was asked or downloaded.
    NothingResolved { failed_manifests: usize },
    /// The operator declined; nothing was downloaded.
    Declined { summary: PendingSummary },
    /// Downloads ran to completion.
    Completed {
        summary: PendingSummary,
        report: BatchReport,
    },
}

/// Mirrors remote SDK manifests and their archives into a local directory.
pub struct Mirror {
    config: MirrorConfig,
    source: Box<dyn ManifestSource>,
    transfer: Arc<dyn Transfer>,
}

impl std::fmt::Debug for Mirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mirror")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Mirror {
    /// Create a mirror using HTTP for manifests and archives.
    pub fn new(config: MirrorConfig) -> MirrorResult<Self> {
        let source = ManifestFetcher::with_timeout(config.timeout)?;
        let transfer = HttpTransfer::with_timeout(config.timeout)?;
        Ok(Self::with_components(
            config,
            Box::new(source),
            Arc::new(transfer),
        ))
    }

    /// Create a mirror with custom manifest and transfer implementations.
    pub fn with_components(
        config: MirrorConfig,
        source: Box<dyn ManifestSource>,
        transfer: Arc<dyn Transfer>,
    ) -> Self {
        Self {
            config,
            source,
            transfer,
        }
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Fetch one manifest and resolve its current artifacts.
    ///
    /// The raw copy is written before parsing, so it survives a parse
    /// failure. A failed write is logged but does not stop resolution.
    pub fn resolve_manifest(&self, url: &str) -> MirrorResult<Vec<ArtifactDescriptor>> {
        let body = self.source.fetch(url)?;

        if self.config.save_manifests {
            if let Err(e) = manifest::write_manifest_copy(url, &body, &self.config.output_dir) {
                tracing::warn!(url, error = %e, "Failed to save manifest copy");
            }
        }

        let normalized = manifest::normalize(&body);
        let artifacts = manifest::resolve(&normalized)?;

        tracing::info!(url, artifacts = artifacts.len(), "Resolved manifest");
        Ok(artifacts)
    }

    /// Resolve every configured manifest, in order.
    pub fn resolve_all(&self) -> ResolvedManifests {
        let mut resolved = ResolvedManifests::default();

        for url in &self.config.manifest_urls {
            match self.resolve_manifest(url) {
                Ok(artifacts) => resolved.artifacts.extend(artifacts),
                Err(error) => {
                    tracing::error!(url = %url, error = %error, "Skipping manifest");
                    resolved.failures.push(ManifestFailure {
                        url: url.clone(),
                        error,
                    });
                }
            }
        }

        resolved
    }

    /// Compare `artifacts` against the output directory.
    pub fn summarize(&self, artifacts: &[ArtifactDescriptor]) -> PendingSummary {
        PendingSummary::compute(artifacts, &self.config.output_dir)
    }

    /// Download every artifact, including ones already present locally.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::NoRequests`] when there were artifacts but no
    /// download request could be built for any of them. Individual transfer
    /// failures are recorded in the report instead.
    pub fn download(
        &self,
        artifacts: &[ArtifactDescriptor],
        observer: &mut dyn ProgressObserver,
    ) -> MirrorResult<BatchReport> {
        let batch = RequestBatch::build(artifacts, &self.config.base_url, &self.config.output_dir);

        if batch.requests.is_empty() && !artifacts.is_empty() {
            return Err(MirrorError::NoRequests {
                total: artifacts.len(),
            });
        }

        let engine = DownloadEngine::new(Arc::clone(&self.transfer))
            .with_concurrency(self.config.concurrency)
            .with_tick_interval(self.config.tick_interval);

        let mut report = engine.run(batch.requests, observer);
        report.rejected = batch.rejected;
        Ok(report)
    }

    /// Resolve, confirm and download.
    pub fn run(
        &self,
        confirmer: &dyn Confirmer,
        observer: &mut dyn ProgressObserver,
    ) -> MirrorResult<MirrorOutcome> {
        let resolved = self.resolve_all();
        if resolved.artifacts.is_empty() {
            tracing::info!(
                failed_manifests = resolved.failures.len(),
                "No archives resolved, nothing to download"
            );
            return Ok(MirrorOutcome::NothingResolved {
                failed_manifests: resolved.failures.len(),
            });
        }

        let summary = self.summarize(&resolved.artifacts);
        tracing::info!(
            total = summary.total,
            pending = summary.pending_count,
            pending_bytes = summary.pending_bytes,
            "Mirror summary"
        );

        if !confirm_download(&summary, self.config.silent, confirmer) {
            tracing::info!("Download declined");
            return Ok(MirrorOutcome::Declined { summary });
        }

        let report = self.download(&resolved.artifacts, observer)?;
        Ok(MirrorOutcome::Completed { summary, report })
    }
}
