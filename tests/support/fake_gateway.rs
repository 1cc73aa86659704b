//! In-memory `ContentGateway` for exercising the export pipeline without HTTP.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use confluence_export::gateway::{Attachment, ContentGateway, GatewayError, Listing, Page};

/// Service root the fake pretends to be.
pub const SERVICE_BASE: &str = "https://acme.atlassian.net/wiki";

#[derive(Default)]
pub struct FakeGateway {
    space_pages: HashMap<String, Vec<Page>>,
    failing_spaces: HashSet<String>,
    children: HashMap<String, Vec<Page>>,
    attachments: HashMap<String, Vec<Attachment>>,
    failing_attachment_listings: HashSet<String>,
    downloads: HashMap<String, Vec<u8>>,
    requested: Mutex<Vec<String>>,
    child_listings: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages returned by the space listing and searched by title lookup.
    pub fn with_space(mut self, space_key: &str, pages: Vec<Page>) -> Self {
        self.space_pages.insert(space_key.to_string(), pages);
        self
    }

    /// The space listing returns its pages and then reports an error.
    pub fn with_interrupted_space(mut self, space_key: &str) -> Self {
        self.failing_spaces.insert(space_key.to_string());
        self
    }

    pub fn with_children(mut self, parent_id: &str, pages: Vec<Page>) -> Self {
        self.children.insert(parent_id.to_string(), pages);
        self
    }

    pub fn with_attachments(mut self, page_id: &str, attachments: Vec<Attachment>) -> Self {
        self.attachments.insert(page_id.to_string(), attachments);
        self
    }

    /// The attachment listing for `page_id` fails before returning anything.
    pub fn with_failing_attachment_listing(mut self, page_id: &str) -> Self {
        self.failing_attachment_listings.insert(page_id.to_string());
        self
    }

    /// `locator` serves `bytes`; any other locator answers 404.
    pub fn with_download(mut self, locator: &str, bytes: &[u8]) -> Self {
        self.downloads.insert(locator.to_string(), bytes.to_vec());
        self
    }

    /// Canonical locator the rewriter will request.
    pub fn locator(page_id: &str, title: &str) -> String {
        format!(
            "{SERVICE_BASE}/download/attachments/{}/{}",
            urlencoding::encode(page_id),
            urlencoding::encode(title)
        )
    }

    /// Every download locator requested, in request order.
    pub fn requested_downloads(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    /// Every page whose children were listed, in request order.
    pub fn child_listings(&self) -> Vec<String> {
        self.child_listings.lock().unwrap().clone()
    }

    fn all_pages(&self) -> impl Iterator<Item = &Page> {
        self.space_pages
            .values()
            .chain(self.children.values())
            .flatten()
    }
}

#[async_trait]
impl ContentGateway for FakeGateway {
    fn service_base(&self) -> &str {
        SERVICE_BASE
    }

    async fn list_pages_in_space(&self, space_key: &str) -> Listing<Page> {
        let pages = self.space_pages.get(space_key).cloned().unwrap_or_default();
        if self.failing_spaces.contains(space_key) {
            Listing::interrupted(pages, GatewayError::http_status("fake://space", 500))
        } else {
            Listing::complete(pages)
        }
    }

    async fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>, GatewayError> {
        Ok(self
            .space_pages
            .get(space_key)
            .and_then(|pages| pages.iter().find(|p| p.title == title))
            .cloned())
    }

    async fn fetch_page(&self, page_id: &str) -> Result<Option<Page>, GatewayError> {
        Ok(self.all_pages().find(|p| p.id == page_id).cloned())
    }

    async fn list_child_pages(&self, page_id: &str) -> Listing<Page> {
        self.child_listings.lock().unwrap().push(page_id.to_string());
        Listing::complete(self.children.get(page_id).cloned().unwrap_or_default())
    }

    async fn list_attachments(&self, page_id: &str) -> Listing<Attachment> {
        if self.failing_attachment_listings.contains(page_id) {
            return Listing::interrupted(
                Vec::new(),
                GatewayError::http_status("fake://attachments", 500),
            );
        }
        Listing::complete(self.attachments.get(page_id).cloned().unwrap_or_default())
    }

    async fn download(&self, locator: &str, destination: &Path) -> Result<u64, GatewayError> {
        self.requested.lock().unwrap().push(locator.to_string());
        let Some(bytes) = self.downloads.get(locator) else {
            return Err(GatewayError::http_status(locator, 404));
        };
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GatewayError::io(parent, e))?;
        }
        tokio::fs::write(destination, bytes)
            .await
            .map_err(|e| GatewayError::io(destination, e))?;
        Ok(bytes.len() as u64)
    }
}
