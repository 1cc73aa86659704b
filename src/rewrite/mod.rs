//! Asset rewriter: makes exported HTML reference only local files.
//!
//! For one page the rewriter
//! 1. downloads every attachment from its canonical locator into the page's
//!    `attachments/` directory (bounded concurrency),
//! 2. waits for all downloads, then rewrites every known URL shape of each
//!    successfully downloaded attachment to `attachments/{title}`,
//! 3. strips decorative `<img>` elements served from the service's UI path.
//!
//! Failed downloads leave their references untouched.

mod chrome;
mod rules;

pub use chrome::{UI_ASSET_PREFIX, strip_ui_chrome};
pub use rules::{DEFAULT_RULES, RewriteRule, RuleContext, title_alternation, title_spellings};

use std::collections::HashSet;
use std::path::Path;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::gateway::{Attachment, ContentGateway, Page};
use crate::layout::ATTACHMENTS_DIR;

/// Default number of concurrent attachment downloads per page.
pub const DEFAULT_DOWNLOAD_JOBS: usize = 4;

/// Result of rewriting one body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// Rewritten HTML.
    pub html: String,
    /// Number of references replaced.
    pub replacements: usize,
}

/// Result of localizing one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedBody {
    /// Final HTML with local references and UI chrome removed.
    pub html: String,
    /// Attachment titles downloaded and rewritten, in listing order.
    pub resolved: Vec<String>,
    /// Attachment titles that could not be downloaded.
    pub failed: Vec<String>,
    /// Attachments skipped because an earlier one had the same title.
    pub skipped_duplicates: usize,
    /// Number of references replaced.
    pub replacements: usize,
    /// Number of UI images removed.
    pub chrome_removed: usize,
}

/// Downloads attachments and rewrites page bodies.
#[derive(Debug, Clone)]
pub struct AssetRewriter {
    service_base: String,
    download_jobs: usize,
}

impl AssetRewriter {
    /// Creates a rewriter for a service root such as `https://acme.atlassian.net/wiki`.
    #[must_use]
    pub fn new(service_base: impl Into<String>) -> Self {
        Self {
            service_base: service_base.into().trim_end_matches('/').to_string(),
            download_jobs: DEFAULT_DOWNLOAD_JOBS,
        }
    }

    /// Sets how many attachments of one page download at once (minimum 1).
    #[must_use]
    pub fn with_download_jobs(mut self, jobs: usize) -> Self {
        self.download_jobs = jobs.max(1);
        self
    }

    /// `{base}/download/attachments/{pageId}/{title}`.
    ///
    /// The listing's own download link is ignored since it may carry a version
    /// token that no longer resolves.
    #[must_use]
    pub fn canonical_locator(&self, page_id: &str, title: &str) -> String {
        format!(
            "{}/download/attachments/{}/{}",
            self.service_base,
            urlencoding::encode(page_id),
            urlencoding::encode(title)
        )
    }

    /// Rewrites every reference to each title in `resolved` to `attachments/{title}`.
    ///
    /// `known` holds every attachment title of the page, downloaded or not. A
    /// match is left alone when the text at its position spells a longer known
    /// title, so `report` never rewrites a reference to `report v2.pdf`.
    ///
    /// Titles are processed in order; running this on its own output changes nothing.
    #[must_use]
    pub fn rewrite_body(
        &self,
        body: &str,
        page_id: &str,
        resolved: &[String],
        known: &[String],
    ) -> RewriteOutcome {
        let mut html = body.to_string();
        let mut replacements = 0;
        let known_spellings: Vec<String> = known.iter().flat_map(|title| title_spellings(title)).collect();

        for title in resolved {
            let titles = title_alternation(title);
            let context = RuleContext {
                page_id,
                title_pattern: &titles,
            };
            let local = format!("{ATTACHMENTS_DIR}/{title}");

            for rule in &DEFAULT_RULES {
                let pattern = match rule.compile(&context) {
                    Ok(pattern) => pattern,
                    Err(error) => {
                        warn!(rule = rule.name, title = %title, error = %error, "skipping rewrite rule");
                        continue;
                    }
                };
                let mut count = 0;
                let rewritten = pattern.replace_all(&html, |caps: &regex::Captures<'_>| {
                    let longer = caps.name("title").is_some_and(|matched| {
                        continues_into_longer_title(&html[matched.start()..], matched.len(), &known_spellings)
                    });
                    if longer {
                        return caps[0].to_string();
                    }
                    count += 1;
                    let end = caps.name("end").map_or("", |m| m.as_str());
                    format!("{local}{end}")
                });
                if count > 0 {
                    html = rewritten.into_owned();
                    replacements += count;
                    debug!(rule = rule.name, title = %title, count, "rewrote references");
                }
            }
        }

        RewriteOutcome { html, replacements }
    }

    /// Downloads `attachments` into `attachments_dir` and returns the localized body of `page`.
    pub async fn localize<G: ContentGateway + ?Sized>(
        &self,
        gateway: &G,
        page: &Page,
        attachments: &[Attachment],
        attachments_dir: &Path,
    ) -> LocalizedBody {
        let mut seen = HashSet::new();
        let mut failed = Vec::new();
        let mut skipped_duplicates = 0;
        let mut queued = Vec::new();

        for attachment in attachments {
            let title = attachment.title.as_str();
            if !is_safe_file_name(title) {
                warn!(page_id = %page.id, title = %title, "attachment title is not a usable file name; skipping");
                failed.push(title.to_string());
                continue;
            }
            if !seen.insert(title) {
                warn!(page_id = %page.id, title = %title, "duplicate attachment title; keeping the first");
                skipped_duplicates += 1;
                continue;
            }
            queued.push(title);
        }

        let mut outcomes: Vec<(usize, &str, bool)> = stream::iter(queued.into_iter().enumerate())
            .map(|(position, title)| async move {
                let locator = self.canonical_locator(&page.id, title);
                let destination = attachments_dir.join(title);
                match gateway.download(&locator, &destination).await {
                    Ok(_) => (position, title, true),
                    Err(error) => {
                        warn!(page_id = %page.id, title = %title, error = %error, "attachment download failed");
                        (position, title, false)
                    }
                }
            })
            .buffer_unordered(self.download_jobs)
            .collect()
            .await;
        outcomes.sort_by_key(|(position, _, _)| *position);

        let mut resolved = Vec::new();
        for (_, title, downloaded) in outcomes {
            if downloaded {
                resolved.push(title.to_string());
            } else {
                failed.push(title.to_string());
            }
        }

        let known: Vec<String> = attachments.iter().map(|a| a.title.clone()).collect();
        let rewritten = self.rewrite_body(&page.body, &page.id, &resolved, &known);
        let (html, chrome_removed) = strip_ui_chrome(&rewritten.html);

        if !resolved.is_empty() {
            info!(page_id = %page.id, downloaded = resolved.len(), "downloaded attachments");
        }

        LocalizedBody {
            html,
            resolved,
            failed,
            skipped_duplicates,
            replacements: rewritten.replacements,
            chrome_removed,
        }
    }
}

/// True when `rest` starts with a known title spelling longer than the `matched_len` bytes just matched.
fn continues_into_longer_title(rest: &str, matched_len: usize, known_spellings: &[String]) -> bool {
    known_spellings.iter().any(|spelling| {
        spelling.len() > matched_len
            && rest
                .as_bytes()
                .get(..spelling.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(spelling.as_bytes()))
    })
}

/// A title must name exactly one file inside the attachment directory.
fn is_safe_file_name(title: &str) -> bool {
    !title.trim().is_empty()
        && title != "."
        && title != ".."
        && !title.contains(['/', '\\', '\0'])
}
