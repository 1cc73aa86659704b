//! Pagination loops shared by the listing endpoints.
//!
//! Listings are fail-soft: an error on any request ends the loop and the
//! items gathered so far are returned together with the error.

use std::future::Future;

use url::Url;

use super::GatewayError;

/// Page size requested from every listing endpoint (the service caps it at 100).
pub const PAGE_SIZE: usize = 100;

/// Result of a paginated listing: everything accumulated, plus the error that
/// stopped the loop early, if any.
#[derive(Debug)]
pub struct Listing<T> {
    /// Items accumulated across all successful requests, in service order.
    pub items: Vec<T>,
    /// The error that interrupted pagination.
    pub interruption: Option<GatewayError>,
}

impl<T> Listing<T> {
    /// A listing that ran to its natural end.
    #[must_use]
    pub fn complete(items: Vec<T>) -> Self {
        Self {
            items,
            interruption: None,
        }
    }

    /// A listing cut short by `error` after collecting `items`.
    #[must_use]
    pub fn interrupted(items: Vec<T>, error: GatewayError) -> Self {
        Self {
            items,
            interruption: Some(error),
        }
    }

    /// Returns true when no error interrupted the listing.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.interruption.is_none()
    }

    /// Discards the interruption and returns the accumulated items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self::complete(Vec::new())
    }
}

/// One response of a cursor-paginated endpoint.
#[derive(Debug)]
pub struct CursorBatch<T> {
    /// Items in this response.
    pub items: Vec<T>,
    /// Cursor advertised for the next request, if any.
    pub next_cursor: Option<String>,
}

/// Drives an offset/limit endpoint until it returns a short page.
///
/// `fetch` receives `(start, limit)` and returns one batch.
pub async fn collect_offset_pages<T, F, Fut>(limit: usize, mut fetch: F) -> Listing<T>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, GatewayError>>,
{
    let limit = limit.max(1);
    let mut items = Vec::new();
    let mut start = 0;

    loop {
        match fetch(start, limit).await {
            Ok(batch) => {
                let received = batch.len();
                items.extend(batch);
                if received < limit {
                    return Listing::complete(items);
                }
                start += limit;
            }
            Err(error) => return Listing::interrupted(items, error),
        }
    }
}

/// Drives a cursor endpoint.
///
/// Stops on an empty batch, a short batch, a missing next cursor, or a cursor
/// that repeats the one just used.
pub async fn collect_cursor_pages<T, F, Fut>(limit: usize, mut fetch: F) -> Listing<T>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<CursorBatch<T>, GatewayError>>,
{
    let limit = limit.max(1);
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let batch = match fetch(cursor.clone()).await {
            Ok(batch) => batch,
            Err(error) => return Listing::interrupted(items, error),
        };

        let received = batch.items.len();
        items.extend(batch.items);
        if received == 0 || received < limit {
            return Listing::complete(items);
        }

        match batch.next_cursor {
            Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
            _ => return Listing::complete(items),
        }
    }
}

/// Extracts the `cursor` query parameter from an advertised next link.
///
/// The link may be absolute or relative to the service root.
#[must_use]
pub fn cursor_from_next_link(next_link: &str) -> Option<String> {
    let base = Url::parse("http://localhost/").ok()?;
    let url = base.join(next_link.trim()).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "cursor")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
