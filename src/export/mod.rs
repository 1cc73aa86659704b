//! Export orchestrator.
//!
//! For every configured [`SpaceTarget`] the [`Exporter`] resolves the page
//! closure, then runs each page through
//! `materialize dir -> list attachments -> download + rewrite -> strip UI chrome -> write index.html`.
//!
//! # Failure handling
//!
//! - An attachment listing error degrades to the attachments fetched so far.
//! - A layout or write error fails only that page; the run continues.
//! - Nothing is rolled back. Rerunning overwrites in place.
//!
//! # Concurrency
//!
//! Pages run through a bounded `buffer_unordered` pool (`page_jobs`), and each
//! page downloads its attachments through its own bounded pool. Pages that
//! map to the same directory are serialized by a per-directory lock.

mod document;
mod error;
mod stats;

pub use document::render_document;
pub use error::ExportError;
pub use stats::ExportStats;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use futures_util::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::gateway::{ContentGateway, Page};
use crate::hierarchy::{DEFAULT_MAX_DEPTH, HierarchyResolver, SpaceTarget};
use crate::layout::ExportLayout;
use crate::rewrite::{AssetRewriter, DEFAULT_DOWNLOAD_JOBS};

/// Default number of pages exported at once.
pub const DEFAULT_PAGE_JOBS: usize = 1;

/// Tuning knobs for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Pages exported concurrently.
    pub page_jobs: usize,
    /// Attachment downloads per page run concurrently.
    pub attachment_jobs: usize,
    /// Descendant depth bound for named pages.
    pub max_depth: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            page_jobs: DEFAULT_PAGE_JOBS,
            attachment_jobs: DEFAULT_DOWNLOAD_JOBS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A page that could not be exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    /// Page id.
    pub page_id: String,
    /// Page title.
    pub title: String,
    /// Rendered error.
    pub reason: String,
}

/// Result of exporting one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    /// Page id.
    pub page_id: String,
    /// Directory the page was written to.
    pub dir: PathBuf,
    /// Attachments downloaded and rewritten.
    pub attachments_downloaded: usize,
    /// Attachments that could not be downloaded.
    pub attachments_failed: usize,
}

/// Result of exporting one target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpaceReport {
    /// Space key.
    pub space_key: String,
    /// Pages in the resolved closure.
    pub pages_discovered: usize,
    /// Pages written.
    pub pages_exported: usize,
    /// Pages that failed.
    pub failures: Vec<PageFailure>,
    /// Named titles that were not found.
    pub missing: Vec<String>,
    /// Listing calls that ended early during resolution.
    pub interrupted_listings: usize,
    /// Attachments downloaded across all pages.
    pub attachments_downloaded: usize,
    /// Attachments that failed across all pages.
    pub attachments_failed: usize,
}

/// Result of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One entry per target, in configuration order.
    pub spaces: Vec<SpaceReport>,
}

impl RunReport {
    /// Pages written across all targets.
    #[must_use]
    pub fn pages_exported(&self) -> usize {
        self.spaces.iter().map(|s| s.pages_exported).sum()
    }

    /// Pages that failed across all targets.
    #[must_use]
    pub fn pages_failed(&self) -> usize {
        self.spaces.iter().map(|s| s.failures.len()).sum()
    }

    /// Named titles that were not found across all targets.
    #[must_use]
    pub fn missing_pages(&self) -> usize {
        self.spaces.iter().map(|s| s.missing.len()).sum()
    }

    /// Attachments downloaded across all targets.
    #[must_use]
    pub fn attachments_downloaded(&self) -> usize {
        self.spaces.iter().map(|s| s.attachments_downloaded).sum()
    }

    /// Attachments that failed across all targets.
    #[must_use]
    pub fn attachments_failed(&self) -> usize {
        self.spaces.iter().map(|s| s.attachments_failed).sum()
    }

    /// Whether anything was skipped, missing or cut short.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        self.pages_failed() > 0
            || self.missing_pages() > 0
            || self.spaces.iter().any(|s| s.interrupted_listings > 0)
    }
}

/// Drives a run against one gateway.
pub struct Exporter<'a, G: ContentGateway + ?Sized> {
    gateway: &'a G,
    layout: ExportLayout,
    rewriter: AssetRewriter,
    options: ExportOptions,
    stats: Arc<ExportStats>,
    dir_locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl<'a, G: ContentGateway + ?Sized> Exporter<'a, G> {
    /// Creates an exporter writing under `layout`.
    #[must_use]
    pub fn new(gateway: &'a G, layout: ExportLayout, options: ExportOptions) -> Self {
        let rewriter =
            AssetRewriter::new(gateway.service_base()).with_download_jobs(options.attachment_jobs);
        Self {
            gateway,
            layout,
            rewriter,
            options: ExportOptions {
                page_jobs: options.page_jobs.max(1),
                ..options
            },
            stats: Arc::new(ExportStats::new()),
            dir_locks: DashMap::new(),
        }
    }

    /// Live counters, for progress display.
    #[must_use]
    pub fn stats(&self) -> Arc<ExportStats> {
        Arc::clone(&self.stats)
    }

    /// Exports every target in order.
    pub async fn run(&self, targets: &[SpaceTarget]) -> RunReport {
        let mut report = RunReport::default();
        for target in targets {
            report.spaces.push(self.export_target(target).await);
        }
        report
    }

    /// Resolves and exports one target.
    #[instrument(skip(self, target), fields(space = %target.space_key))]
    pub async fn export_target(&self, target: &SpaceTarget) -> SpaceReport {
        info!(space = %target.space_key, "exporting space");
        let closure = HierarchyResolver::new(self.gateway)
            .with_max_depth(self.options.max_depth)
            .resolve(target)
            .await;
        self.stats.add_discovered(closure.pages.len());

        let mut report = SpaceReport {
            space_key: target.space_key.clone(),
            pages_discovered: closure.pages.len(),
            missing: closure.missing,
            interrupted_listings: closure.interrupted_listings,
            ..SpaceReport::default()
        };

        let space_key = target.space_key.as_str();
        let results: Vec<(String, String, Result<PageReport, ExportError>)> =
            stream::iter(closure.pages)
                .map(|page| async move {
                    let result = self.export_page(space_key, &page).await;
                    (page.id, page.title, result)
                })
                .buffer_unordered(self.options.page_jobs)
                .collect()
                .await;

        for (page_id, title, result) in results {
            match result {
                Ok(page) => {
                    report.pages_exported += 1;
                    report.attachments_downloaded += page.attachments_downloaded;
                    report.attachments_failed += page.attachments_failed;
                }
                Err(error) => {
                    error!(page_id = %page_id, title = %title, error = %error, "page export failed");
                    report.failures.push(PageFailure {
                        page_id,
                        title,
                        reason: error.to_string(),
                    });
                }
            }
        }

        info!(
            space = space_key,
            exported = report.pages_exported,
            failed = report.failures.len(),
            missing = report.missing.len(),
            "space export finished"
        );
        report
    }

    /// Exports a single page.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] when the directory or the document cannot be written.
    #[instrument(skip(self, page), fields(page_id = %page.id))]
    pub async fn export_page(&self, space_key: &str, page: &Page) -> Result<PageReport, ExportError> {
        let dir = self.layout.page_dir(space_key, page);
        let lock = Arc::clone(&self.dir_locks.entry(dir.clone()).or_default());
        let result = {
            let _guard = lock.lock().await;
            self.export_page_inner(space_key, page).await
        };
        drop(lock);
        // Forget the lock once no other page is waiting on the same directory.
        self.dir_locks.remove_if(&dir, |_, lock| Arc::strong_count(lock) == 1);

        match &result {
            Ok(report) => {
                self.stats.increment_exported();
                self.stats
                    .add_attachments(report.attachments_downloaded, report.attachments_failed);
            }
            Err(_) => self.stats.increment_failed(),
        }
        result
    }

    #[cfg(test)]
    fn tracked_dirs(&self) -> usize {
        self.dir_locks.len()
    }

    async fn export_page_inner(&self, space_key: &str, page: &Page) -> Result<PageReport, ExportError> {
        info!(title = %page.title, "exporting page");
        let unit = self.layout.materialize(space_key, page).await?;

        let listing = self.gateway.list_attachments(&page.id).await;
        if let Some(error) = &listing.interruption {
            warn!(error = %error, fetched = listing.items.len(), "continuing with partial attachment list");
        }

        let localized = self
            .rewriter
            .localize(self.gateway, page, &listing.items, &unit.attachments_dir)
            .await;
        debug!(
            replacements = localized.replacements,
            chrome_removed = localized.chrome_removed,
            duplicates = localized.skipped_duplicates,
            "body localized"
        );

        let document = render_document(space_key, page, &localized.html);
        write_atomically(&unit.index_file, document.as_bytes()).await?;

        Ok(PageReport {
            page_id: page.id.clone(),
            dir: unit.dir,
            attachments_downloaded: localized.resolved.len(),
            attachments_failed: localized.failed.len(),
        })
    }
}

/// Writes `contents` next to `path` and renames it into place.
async fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    if let Err(source) = tokio::fs::write(&part, contents).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(ExportError::write(path, source));
    }
    if let Err(source) = tokio::fs::rename(&part, path).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(ExportError::write(path, source));
    }
    Ok(())
}
