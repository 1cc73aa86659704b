//! Configuration errors. All of them abort the run before any export work.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading credentials or export targets.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The credentials env file does not exist.
    #[error("environment file not found: {path}")]
    EnvFileNotFound {
        /// Expected location.
        path: PathBuf,
    },

    /// The credentials env file could not be read or parsed.
    #[error("failed to read environment file {path}: {source}")]
    EnvFile {
        /// File being read.
        path: PathBuf,
        /// Underlying parse/IO error.
        #[source]
        source: dotenvy::Error,
    },

    /// One or more credential variables are absent.
    #[error("missing required environment variables: {}", .missing.join(", "))]
    MissingCredentials {
        /// Human-readable names of the missing variables.
        missing: Vec<&'static str>,
    },

    /// The service base URL is not an absolute http(s) URL.
    #[error("invalid service URL: {url}")]
    InvalidBaseUrl {
        /// The rejected value.
        url: String,
    },

    /// The export target document does not exist.
    #[error("config file not found: {path}")]
    ConfigFileNotFound {
        /// Expected location.
        path: PathBuf,
    },

    /// The export target document could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        /// File being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The export target document is not valid YAML for the expected shape.
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        /// File being parsed.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// An entry of the `spaces` list has an unsupported shape.
    #[error("invalid entry #{index} in `spaces`: {reason}")]
    InvalidSpaceEntry {
        /// 1-based position in the list.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The `spaces` list is missing or empty.
    #[error("no spaces defined in configuration file {path}")]
    NoSpaces {
        /// File that was parsed.
        path: PathBuf,
    },
}

impl ConfigError {
    /// Creates an invalid space entry error.
    pub fn invalid_entry(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidSpaceEntry {
            index,
            reason: reason.into(),
        }
    }
}
