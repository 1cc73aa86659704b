//! User-Agent string sent on every request to the content service.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/confluence-export";

/// `confluence-export/{version} (offline-mirror; +{url})`.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("confluence-export/{version} (offline-mirror; +{PROJECT_UA_URL})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_carries_version_and_project_url() {
        let ua = default_user_agent();
        assert!(ua.contains(PROJECT_UA_URL), "{ua}");
        assert_eq!(
            ua.strip_prefix("confluence-export/")
                .and_then(|s| s.split(' ').next()),
            Some(env!("CARGO_PKG_VERSION"))
        );
    }
}
