//! Layout builder: maps a page's ancestry to its export directory.
//!
//! `{root}/{space}/{ancestor 1}/.../{ancestor N}/{title}/` with every component
//! sanitized on its own. Two pages with the same sanitized chain share a
//! directory; the later export overwrites the earlier one.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::gateway::Page;

/// Name of the document written into every export directory.
pub const INDEX_FILE: &str = "index.html";

/// Name of the attachment subdirectory.
pub const ATTACHMENTS_DIR: &str = "attachments";

/// Characters that are replaced with `_` in path components.
pub const RESERVED_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Errors raised while materializing an export directory.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A directory could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        /// Directory being created.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Sanitizes one path component.
///
/// Reserved characters become `_` and surrounding whitespace is trimmed. A
/// component left empty, or made only of dots, is turned into underscores so
/// it can never address the current or parent directory.
#[must_use]
pub fn sanitize_component(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim();

    if trimmed.is_empty() {
        return "_".to_string();
    }
    if trimmed.chars().all(|c| c == '.') {
        return "_".repeat(trimmed.len());
    }
    trimmed.to_string()
}

/// Directory layout of one exported page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportUnit {
    /// The page directory.
    pub dir: PathBuf,
    /// `dir/index.html`.
    pub index_file: PathBuf,
    /// `dir/attachments`.
    pub attachments_dir: PathBuf,
}

impl ExportUnit {
    fn at(dir: PathBuf) -> Self {
        Self {
            index_file: dir.join(INDEX_FILE),
            attachments_dir: dir.join(ATTACHMENTS_DIR),
            dir,
        }
    }
}

/// Builds export directories under a destination root.
#[derive(Debug, Clone)]
pub struct ExportLayout {
    root: PathBuf,
}

impl ExportLayout {
    /// Creates a layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Destination root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of `page` relative to the root.
    #[must_use]
    pub fn relative_dir(space_key: &str, page: &Page) -> PathBuf {
        let mut path = PathBuf::from(sanitize_component(space_key));
        for ancestor in &page.ancestors {
            path.push(sanitize_component(&ancestor.title));
        }
        path.push(sanitize_component(&page.title));
        path
    }

    /// Absolute directory of `page`.
    #[must_use]
    pub fn page_dir(&self, space_key: &str, page: &Page) -> PathBuf {
        self.root.join(Self::relative_dir(space_key, page))
    }

    /// Creates the page directory and its attachment subdirectory.
    ///
    /// Existing directories are reused.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::CreateDir`] if either directory cannot be created.
    pub async fn materialize(&self, space_key: &str, page: &Page) -> Result<ExportUnit, LayoutError> {
        let unit = ExportUnit::at(self.page_dir(space_key, page));
        tokio::fs::create_dir_all(&unit.attachments_dir)
            .await
            .map_err(|source| LayoutError::CreateDir {
                path: unit.attachments_dir.clone(),
                source,
            })?;
        debug!(dir = %unit.dir.display(), "export directory ready");
        Ok(unit)
    }
}
