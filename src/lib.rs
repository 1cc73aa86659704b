//! Confluence Export Library
//!
//! Mirrors Confluence spaces, or selected page trees, into self-contained
//! offline HTML: one `index.html` per page plus its attachments, with every
//! attachment reference rewritten to the local copy.
//!
//! # Architecture
//!
//! - [`config`] - Credentials env file and YAML export targets
//! - [`gateway`] - REST client with fail-soft pagination and download fallback
//! - [`hierarchy`] - Page closure for whole spaces or named subtrees
//! - [`layout`] - Sanitized directory layout
//! - [`rewrite`] - Attachment download and URL rewriting
//! - [`export`] - Per-page orchestration, stats and run reports

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod export;
pub mod gateway;
pub mod hierarchy;
pub mod layout;
pub mod rewrite;

mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, ServiceCredentials, load_credentials, load_targets};
pub use export::{ExportOptions, ExportStats, Exporter, RunReport, SpaceReport};
pub use gateway::{Attachment, ConfluenceClient, ContentGateway, GatewayError, Listing, Page};
pub use hierarchy::{HierarchyResolver, PageSelection, SpaceTarget};
pub use layout::{ExportLayout, sanitize_component};
pub use rewrite::AssetRewriter;
