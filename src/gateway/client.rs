//! reqwest-backed [`ContentGateway`] for the Confluence REST APIs.
//!
//! Pages and children come from the v1 content API (offset/limit), attachments
//! from the v2 pages API (cursor). Every request carries HTTP basic auth built
//! from the run's [`ServiceCredentials`]; the client is constructed once per
//! export run and passed by reference.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::model::{ResultsEnvelope, WireAttachment, WireContent};
use super::pagination::{
    CursorBatch, Listing, PAGE_SIZE, collect_cursor_pages, collect_offset_pages,
    cursor_from_next_link,
};
use super::{Attachment, ContentGateway, GatewayError, Page};
use crate::config::ServiceCredentials;
use crate::user_agent;

/// Default connect timeout for every request.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default whole-request timeout for attachment downloads.
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Expansions requested for every page so a single call yields body, version and ancestry.
const PAGE_EXPAND: &str = "version,space,body.export_view,ancestors";

/// Header the service requires on attachment downloads to skip XSRF checks.
const NO_CHECK_HEADER: &str = "X-Atlassian-Token";

/// HTTP client for one export run against a Confluence site.
#[derive(Debug, Clone)]
pub struct ConfluenceClient {
    client: Client,
    credentials: ServiceCredentials,
    download_timeout: Duration,
}

impl ConfluenceClient {
    /// Creates a client with the default download timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ClientBuild`] when the HTTP client cannot be built.
    pub fn new(credentials: ServiceCredentials) -> Result<Self, GatewayError> {
        Self::with_download_timeout(credentials, Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
    }

    /// Creates a client with an explicit per-request download timeout.
    ///
    /// Listing and page-fetch calls have no request timeout, only the connect timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ClientBuild`] when the HTTP client cannot be built.
    #[instrument(level = "debug", skip(credentials), fields(base_url = %credentials.base_url()))]
    pub fn with_download_timeout(
        credentials: ServiceCredentials,
        download_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(user_agent::default_user_agent())
            .gzip(true)
            .build()
            .map_err(|source| GatewayError::ClientBuild { source })?;

        Ok(Self {
            client,
            credentials,
            download_timeout,
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, GatewayError> {
        let raw = format!("{}{path}", self.credentials.base_url());
        Url::parse_with_params(&raw, params).map_err(|_| GatewayError::invalid_url(raw))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GatewayError> {
        let url_text = url.to_string();
        let response = self
            .client
            .get(url)
            .basic_auth(
                self.credentials.username(),
                Some(self.credentials.api_token()),
            )
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| GatewayError::network(url_text.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::http_status(url_text, status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::decode(url_text, e))
    }

    async fn content_batch(
        &self,
        path: &str,
        mut params: Vec<(&str, String)>,
        start: usize,
        limit: usize,
    ) -> Result<Vec<Page>, GatewayError> {
        params.push(("start", start.to_string()));
        params.push(("limit", limit.to_string()));
        let url = self.endpoint(path, &params)?;
        let envelope: ResultsEnvelope<WireContent> = self.get_json(url).await?;
        Ok(envelope.results.into_iter().map(Page::from).collect())
    }

    async fn attachment_batch(
        &self,
        page_id: &str,
        cursor: Option<String>,
    ) -> Result<CursorBatch<Attachment>, GatewayError> {
        let mut params = vec![("limit", PAGE_SIZE.to_string())];
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor));
        }
        let path = format!("/api/v2/pages/{}/attachments", urlencoding::encode(page_id));
        let url = self.endpoint(&path, &params)?;
        let envelope: ResultsEnvelope<WireAttachment> = self.get_json(url).await?;

        let next_cursor = envelope
            .links
            .and_then(|links| links.next)
            .and_then(|next| cursor_from_next_link(&next));
        Ok(CursorBatch {
            items: envelope.results.into_iter().map(Attachment::from).collect(),
            next_cursor,
        })
    }

    async fn download_once(&self, locator: &str, destination: &Path) -> Result<u64, GatewayError> {
        let url = Url::parse(locator).map_err(|_| GatewayError::invalid_url(locator))?;
        let response = self
            .client
            .get(url)
            .basic_auth(
                self.credentials.username(),
                Some(self.credentials.api_token()),
            )
            .header(ACCEPT, "application/octet-stream")
            .header(NO_CHECK_HEADER, "no-check")
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(|e| GatewayError::network(locator, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::http_status(locator, status.as_u16()));
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GatewayError::io(parent, e))?;
        }

        let part_path = partial_path(destination);
        let mut file = File::create(&part_path)
            .await
            .map_err(|e| GatewayError::io(part_path.clone(), e))?;

        let streamed = stream_to_file(&mut file, response, locator, &part_path).await;
        drop(file);
        let bytes = match streamed {
            Ok(bytes) => bytes,
            Err(error) => {
                debug!(path = %part_path.display(), "cleaning up partial file after error");
                let _ = tokio::fs::remove_file(&part_path).await;
                return Err(error);
            }
        };

        if let Err(e) = tokio::fs::rename(&part_path, destination).await {
            let _ = tokio::fs::remove_file(&part_path).await;
            return Err(GatewayError::io(destination, e));
        }

        Ok(bytes)
    }
}

#[async_trait]
impl ContentGateway for ConfluenceClient {
    fn service_base(&self) -> &str {
        self.credentials.base_url()
    }

    #[instrument(skip(self))]
    async fn list_pages_in_space(&self, space_key: &str) -> Listing<Page> {
        let listing = collect_offset_pages(PAGE_SIZE, |start, limit| {
            let params = vec![
                ("spaceKey", space_key.to_string()),
                ("type", "page".to_string()),
                ("status", "current".to_string()),
                ("expand", PAGE_EXPAND.to_string()),
            ];
            self.content_batch("/rest/api/content", params, start, limit)
        })
        .await;

        if let Some(error) = &listing.interruption {
            warn!(space = space_key, error = %error, fetched = listing.items.len(), "space page listing interrupted");
        }
        listing
    }

    #[instrument(skip(self))]
    async fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>, GatewayError> {
        let url = self.endpoint(
            "/rest/api/content",
            &[
                ("spaceKey", space_key.to_string()),
                ("title", title.to_string()),
                ("type", "page".to_string()),
                ("expand", PAGE_EXPAND.to_string()),
            ],
        )?;
        let envelope: ResultsEnvelope<WireContent> = self.get_json(url).await?;
        Ok(envelope.results.into_iter().next().map(Page::from))
    }

    #[instrument(skip(self))]
    async fn fetch_page(&self, page_id: &str) -> Result<Option<Page>, GatewayError> {
        let path = format!("/rest/api/content/{}", urlencoding::encode(page_id));
        let url = self.endpoint(&path, &[("expand", PAGE_EXPAND.to_string())])?;
        match self.get_json::<WireContent>(url).await {
            Ok(content) => Ok(Some(Page::from(content))),
            Err(GatewayError::HttpStatus { status: 404, .. }) => Ok(None),
            Err(error) => Err(error),
        }
    }

    #[instrument(skip(self))]
    async fn list_child_pages(&self, page_id: &str) -> Listing<Page> {
        let path = format!("/rest/api/content/{}/child/page", urlencoding::encode(page_id));
        let listing = collect_offset_pages(PAGE_SIZE, |start, limit| {
            let params = vec![("expand", PAGE_EXPAND.to_string())];
            self.content_batch(&path, params, start, limit)
        })
        .await;

        if let Some(error) = &listing.interruption {
            warn!(page_id, error = %error, fetched = listing.items.len(), "child page listing interrupted");
        }
        listing
    }

    #[instrument(skip(self))]
    async fn list_attachments(&self, page_id: &str) -> Listing<Attachment> {
        let listing =
            collect_cursor_pages(PAGE_SIZE, |cursor| self.attachment_batch(page_id, cursor)).await;

        if let Some(error) = &listing.interruption {
            warn!(page_id, error = %error, fetched = listing.items.len(), "attachment listing interrupted");
        }
        listing
    }

    #[instrument(skip(self, destination), fields(url = %locator))]
    async fn download(&self, locator: &str, destination: &Path) -> Result<u64, GatewayError> {
        let first = self.download_once(locator, destination).await;
        let error = match first {
            Ok(bytes) => {
                info!(path = %destination.display(), bytes, "attachment downloaded");
                return Ok(bytes);
            }
            Err(error) => error,
        };

        let Some(status) = error.status() else {
            return Err(error);
        };
        let Some(alternate) = alternate_prefix_locator(locator) else {
            return Err(error);
        };

        debug!(status, alternate = %alternate, "retrying download with toggled /wiki prefix");
        let bytes = self.download_once(&alternate, destination).await?;
        info!(path = %destination.display(), bytes, "attachment downloaded via alternate prefix");
        Ok(bytes)
    }
}

/// Returns the same locator with the `/wiki` routing segment toggled in front
/// of `/download/`, or `None` when the locator is not a download-endpoint URL.
#[must_use]
pub fn alternate_prefix_locator(locator: &str) -> Option<String> {
    if locator.contains("/wiki/download/") {
        return Some(locator.replacen("/wiki/download/", "/download/", 1));
    }
    let index = locator.find("/download/")?;
    Some(format!("{}/wiki{}", &locator[..index], &locator[index..]))
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut raw = destination.as_os_str().to_owned();
    raw.push(".part");
    PathBuf::from(raw)
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, GatewayError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| GatewayError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| GatewayError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| GatewayError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}
