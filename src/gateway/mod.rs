//! Remote content gateway: paginated listing, page lookup and attachment download.
//!
//! The export pipeline only ever talks to the service through the
//! [`ContentGateway`] trait, so tests can substitute an in-memory gateway.
//!
//! # Error policy
//!
//! - Listing calls are fail-soft and return a [`Listing`] holding whatever was
//!   accumulated before an error, plus that error.
//! - Single-page lookups return `Ok(None)` when the page does not exist.
//! - Downloads retry once with the `/wiki` routing segment toggled before
//!   reporting failure.
//!
//! # Example
//!
//! ```no_run
//! use confluence_export::config::ServiceCredentials;
//! use confluence_export::gateway::{ConfluenceClient, ContentGateway};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = ServiceCredentials::new("https://acme.atlassian.net", "ada", "token")?;
//! let client = ConfluenceClient::new(credentials)?;
//! let listing = client.list_pages_in_space("ENG").await;
//! println!("{} pages", listing.items.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod model;
mod pagination;

pub use client::{
    CONNECT_TIMEOUT_SECS, ConfluenceClient, DOWNLOAD_TIMEOUT_SECS, alternate_prefix_locator,
};
pub use error::GatewayError;
pub use model::{Ancestor, Attachment, Page, PageVersion};
pub use pagination::{
    CursorBatch, Listing, PAGE_SIZE, collect_cursor_pages, collect_offset_pages,
    cursor_from_next_link,
};

use std::path::Path;

use async_trait::async_trait;

/// Operations the export pipeline needs from the content service.
///
/// # Object Safety
///
/// This trait uses `async_trait` so orchestration code can hold a
/// `&dyn ContentGateway`.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Service root (ending in `/wiki`) used to build canonical download locators.
    fn service_base(&self) -> &str;

    /// Lists every current page of a space, paginating until a short page.
    async fn list_pages_in_space(&self, space_key: &str) -> Listing<Page>;

    /// Looks up a page by exact title within a space.
    async fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>, GatewayError>;

    /// Fetches a single page by id.
    async fn fetch_page(&self, page_id: &str) -> Result<Option<Page>, GatewayError>;

    /// Lists the direct children of a page.
    async fn list_child_pages(&self, page_id: &str) -> Listing<Page>;

    /// Lists the attachments of a page via cursor pagination.
    async fn list_attachments(&self, page_id: &str) -> Listing<Attachment>;

    /// Streams `locator` into `destination`, returning the number of bytes written.
    async fn download(&self, locator: &str, destination: &Path) -> Result<u64, GatewayError>;
}
