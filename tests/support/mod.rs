//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod fake_gateway;

pub use fake_gateway::{FakeGateway, SERVICE_BASE};

use confluence_export::gateway::{Ancestor, Attachment, Page};

/// Page whose ancestors are given as `(id, title)` pairs, root first.
pub fn page(id: &str, title: &str, ancestors: &[(&str, &str)]) -> Page {
    Page::new(id, title).with_ancestors(
        ancestors
            .iter()
            .map(|(ancestor_id, ancestor_title)| Ancestor::new(*ancestor_id, *ancestor_title))
            .collect(),
    )
}

/// Attachment with a listing link carrying a stale version token.
pub fn attachment(page_id: &str, title: &str) -> Attachment {
    Attachment::new(
        format!("att-{title}"),
        title,
        format!("/download/attachments/{page_id}/{title}?version=1&modificationDate=1"),
    )
}
