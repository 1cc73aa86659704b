//! Run configuration: service credentials and export targets.
//!
//! Both are loaded once at startup; any [`ConfigError`] is fatal and aborts
//! the run before a single request is made.

mod credentials;
mod error;
mod targets;

pub use credentials::{
    ServiceCredentials, TOKEN_VARS, URL_VARS, USERNAME_VARS, credentials_from_vars,
    load_credentials,
};
pub use error::ConfigError;
pub use targets::{load_targets, parse_targets};

use std::path::PathBuf;

/// Default export target document, relative to `$HOME`.
pub const DEFAULT_CONFIG_FILE: &str = ".secrets/confluence-export.yaml";

/// Default credentials env file, relative to `$HOME`.
pub const DEFAULT_ENV_FILE: &str = ".secrets/atlassian.env";

/// Resolves `$HOME/.secrets/confluence-export.yaml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join(DEFAULT_CONFIG_FILE))
}

/// Resolves `$HOME/.secrets/atlassian.env`.
#[must_use]
pub fn default_env_file_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join(DEFAULT_ENV_FILE))
}

fn home_dir() -> Option<PathBuf> {
    let value = std::env::var_os("HOME")?;
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}
