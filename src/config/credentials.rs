//! Service credentials loaded from an env-style file.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use tracing::debug;
use url::Url;

use super::ConfigError;

/// Variables holding the service URL, in lookup order.
pub const URL_VARS: [&str; 2] = ["CONFLUENCE_URL", "ATLASSIAN_URL"];
/// Variables holding the username, in lookup order.
pub const USERNAME_VARS: [&str; 2] = ["CONFLUENCE_USERNAME", "ATLASSIAN_USERNAME"];
/// Variables holding the API token, in lookup order.
pub const TOKEN_VARS: [&str; 2] = ["CONFLUENCE_API_TOKEN", "ATLASSIAN_API_TOKEN"];

/// Routing segment every service root ends with.
const WIKI_SEGMENT: &str = "/wiki";

/// Base URL plus the credential pair used for basic auth.
///
/// `Debug` output never includes the token.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceCredentials {
    base_url: String,
    username: String,
    api_token: String,
}

impl fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCredentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

impl ServiceCredentials {
    /// Creates credentials, normalizing the base URL to end in `/wiki`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] unless the URL is absolute http(s).
    pub fn new(
        base_url: &str,
        username: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            username: username.into(),
            api_token: api_token.into(),
        })
    }

    /// Service root, always ending in `/wiki` and never in a slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Account name for basic auth.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// API token for basic auth.
    #[must_use]
    pub fn api_token(&self) -> &str {
        &self.api_token
    }
}

/// Loads credentials from an env file, falling back to the process environment
/// for variables the file does not define.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file is missing or malformed, when a
/// credential is absent from both sources, or when the URL is invalid.
pub fn load_credentials(env_file: &Path) -> Result<ServiceCredentials, ConfigError> {
    if !env_file.is_file() {
        return Err(ConfigError::EnvFileNotFound {
            path: env_file.to_path_buf(),
        });
    }

    let env_error = |source| ConfigError::EnvFile {
        path: env_file.to_path_buf(),
        source,
    };
    let mut vars = HashMap::new();
    for entry in dotenvy::from_path_iter(env_file).map_err(env_error)? {
        let (key, value) = entry.map_err(env_error)?;
        vars.insert(key, value);
    }
    debug!(path = %env_file.display(), variables = vars.len(), "loaded environment file");

    credentials_from_vars(&vars, |key| std::env::var(key).ok())
}

/// Builds credentials from parsed variables, consulting `fallback` for absent keys.
///
/// # Errors
///
/// Returns [`ConfigError::MissingCredentials`] listing every absent credential,
/// or [`ConfigError::InvalidBaseUrl`].
pub fn credentials_from_vars<F>(
    vars: &HashMap<String, String>,
    fallback: F,
) -> Result<ServiceCredentials, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |keys: &[&str]| {
        keys.iter().find_map(|key| {
            vars.get(*key)
                .cloned()
                .or_else(|| fallback(key))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
    };

    let base_url = lookup(&URL_VARS);
    let username = lookup(&USERNAME_VARS);
    let api_token = lookup(&TOKEN_VARS);

    match (base_url, username, api_token) {
        (Some(base_url), Some(username), Some(api_token)) => {
            ServiceCredentials::new(&base_url, username, api_token)
        }
        (base_url, username, api_token) => {
            let mut missing = Vec::new();
            if base_url.is_none() {
                missing.push("CONFLUENCE_URL (or ATLASSIAN_URL)");
            }
            if username.is_none() {
                missing.push("CONFLUENCE_USERNAME (or ATLASSIAN_USERNAME)");
            }
            if api_token.is_none() {
                missing.push("CONFLUENCE_API_TOKEN (or ATLASSIAN_API_TOKEN)");
            }
            Err(ConfigError::MissingCredentials { missing })
        }
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|_| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
        });
    }

    if trimmed.ends_with(WIKI_SEGMENT) {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}{WIKI_SEGMENT}"))
    }
}
