//! Per-page export errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::layout::LayoutError;

/// Reasons a single page could not be exported.
///
/// None of these abort the run; the orchestrator records them and moves on.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The page directory could not be created.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// The final document could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Target file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// Creates a write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
