//! Run-wide counters shared between page workers and the progress display.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Thread-safe export counters.
#[derive(Debug, Default)]
pub struct ExportStats {
    pages_discovered: AtomicUsize,
    pages_exported: AtomicUsize,
    pages_failed: AtomicUsize,
    attachments_downloaded: AtomicUsize,
    attachments_failed: AtomicUsize,
}

impl ExportStats {
    /// Creates a tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages found by hierarchy resolution so far.
    #[must_use]
    pub fn pages_discovered(&self) -> usize {
        self.pages_discovered.load(Ordering::SeqCst)
    }

    /// Pages whose document was written.
    #[must_use]
    pub fn pages_exported(&self) -> usize {
        self.pages_exported.load(Ordering::SeqCst)
    }

    /// Pages that failed to export.
    #[must_use]
    pub fn pages_failed(&self) -> usize {
        self.pages_failed.load(Ordering::SeqCst)
    }

    /// Pages finished either way.
    #[must_use]
    pub fn pages_processed(&self) -> usize {
        self.pages_exported() + self.pages_failed()
    }

    /// Attachments downloaded and rewritten.
    #[must_use]
    pub fn attachments_downloaded(&self) -> usize {
        self.attachments_downloaded.load(Ordering::SeqCst)
    }

    /// Attachments that could not be downloaded.
    #[must_use]
    pub fn attachments_failed(&self) -> usize {
        self.attachments_failed.load(Ordering::SeqCst)
    }

    pub(crate) fn add_discovered(&self, count: usize) {
        self.pages_discovered.fetch_add(count, Ordering::SeqCst);
    }

    pub(crate) fn increment_exported(&self) {
        self.pages_exported.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_failed(&self) {
        self.pages_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn add_attachments(&self, downloaded: usize, failed: usize) {
        self.attachments_downloaded
            .fetch_add(downloaded, Ordering::SeqCst);
        self.attachments_failed.fetch_add(failed, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counters_start_at_zero() {
        let stats = ExportStats::new();
        assert_eq!(stats.pages_discovered(), 0);
        assert_eq!(stats.pages_processed(), 0);
        assert_eq!(stats.attachments_downloaded(), 0);
    }

    #[tokio::test]
    async fn test_counters_are_safe_across_tasks() {
        let stats = Arc::new(ExportStats::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let stats = Arc::clone(&stats);
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    stats.increment_exported();
                } else {
                    stats.increment_failed();
                }
                stats.add_attachments(2, 1);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(stats.pages_exported(), 4);
        assert_eq!(stats.pages_failed(), 4);
        assert_eq!(stats.pages_processed(), 8);
        assert_eq!(stats.attachments_downloaded(), 16);
        assert_eq!(stats.attachments_failed(), 8);
    }
}
