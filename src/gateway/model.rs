//! Page and attachment records plus the wire shapes they are decoded from.

use serde::{Deserialize, Deserializer};

/// One entry of a page's ancestor chain (root first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
    /// Service identifier of the ancestor page.
    pub id: String,
    /// Ancestor title as shown in the service.
    pub title: String,
}

impl Ancestor {
    /// Creates an ancestor reference.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Version metadata of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageVersion {
    /// Monotonic version number.
    pub number: u64,
    /// Last-modified timestamp as reported by the service.
    pub when: String,
    /// Display name of the last author.
    pub by: String,
}

/// A page fetched from the content service, including its rendered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Stable service identifier.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Version metadata.
    pub version: PageVersion,
    /// Ancestor chain, root first, immediate parent last.
    pub ancestors: Vec<Ancestor>,
    /// Server-rendered HTML body.
    pub body: String,
}

impl Page {
    /// Creates a page with no ancestors, an empty body and default version metadata.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            version: PageVersion::default(),
            ancestors: Vec::new(),
            body: String::new(),
        }
    }

    /// Replaces the ancestor chain.
    #[must_use]
    pub fn with_ancestors(mut self, ancestors: Vec<Ancestor>) -> Self {
        self.ancestors = ancestors;
        self
    }

    /// Replaces the rendered body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Replaces the version metadata.
    #[must_use]
    pub fn with_version(mut self, version: PageVersion) -> Self {
        self.version = version;
        self
    }
}

/// A file attached to a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Service identifier.
    pub id: String,
    /// Filename used on disk and in rewritten references.
    pub title: String,
    /// Download link advertised by the listing API. Not used for downloading
    /// since it can carry a stale version token.
    pub download_link: String,
}

impl Attachment {
    /// Creates an attachment record.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        download_link: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            download_link: download_link.into(),
        }
    }
}

// ==================== Wire shapes ====================

/// Listing envelope shared by the v1 content API and the v2 attachment API.
#[derive(Debug, Deserialize)]
pub(crate) struct ResultsEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub(crate) results: Vec<T>,
    #[serde(default, rename = "_links")]
    pub(crate) links: Option<EnvelopeLinks>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EnvelopeLinks {
    #[serde(default)]
    pub(crate) next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireContent {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    version: Option<WireVersion>,
    #[serde(default)]
    ancestors: Vec<WireAncestor>,
    #[serde(default)]
    body: Option<WireBody>,
}

#[derive(Debug, Deserialize)]
struct WireVersion {
    #[serde(default)]
    number: u64,
    #[serde(default)]
    when: String,
    #[serde(default)]
    by: Option<WireUser>,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    #[serde(default, rename = "displayName")]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct WireAncestor {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct WireBody {
    #[serde(default)]
    export_view: Option<WireValue>,
}

#[derive(Debug, Deserialize)]
struct WireValue {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireAttachment {
    #[serde(default, deserialize_with = "string_or_number")]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default, rename = "downloadLink")]
    download_link: Option<String>,
}

impl From<WireContent> for Page {
    fn from(wire: WireContent) -> Self {
        let version = wire
            .version
            .map(|v| PageVersion {
                number: v.number,
                when: v.when,
                by: v.by.map(|user| user.display_name).unwrap_or_default(),
            })
            .unwrap_or_default();
        Self {
            id: wire.id,
            title: wire.title,
            version,
            ancestors: wire
                .ancestors
                .into_iter()
                .map(|a| Ancestor::new(a.id, a.title))
                .collect(),
            body: wire
                .body
                .and_then(|b| b.export_view)
                .map(|v| v.value)
                .unwrap_or_default(),
        }
    }
}

impl From<WireAttachment> for Attachment {
    fn from(wire: WireAttachment) -> Self {
        Self {
            id: wire.id,
            title: wire.title,
            download_link: wire.download_link.unwrap_or_default(),
        }
    }
}

/// Identifiers arrive as strings from most endpoints but as numbers from some.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Int(value) => value.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_content_maps_export_view_and_version() {
        let json = r#"{
            "id": "98765",
            "title": "Risks?",
            "version": {"number": 7, "when": "2024-03-01T10:00:00.000Z", "by": {"displayName": "Ada"}},
            "ancestors": [{"id": "1", "title": "Team/Docs"}, {"id": 2, "title": "Q1 Plan"}],
            "body": {"export_view": {"value": "<p>hello</p>"}}
        }"#;
        let page: Page = serde_json::from_str::<WireContent>(json).unwrap().into();

        assert_eq!(page.id, "98765");
        assert_eq!(page.title, "Risks?");
        assert_eq!(page.version.number, 7);
        assert_eq!(page.version.by, "Ada");
        assert_eq!(page.ancestors[1], Ancestor::new("2", "Q1 Plan"));
        assert_eq!(page.body, "<p>hello</p>");
    }

    #[test]
    fn test_wire_content_tolerates_missing_optional_fields() {
        let page: Page = serde_json::from_str::<WireContent>(r#"{"id": 5, "title": "Bare"}"#)
            .unwrap()
            .into();
        assert_eq!(page.id, "5");
        assert!(page.ancestors.is_empty());
        assert!(page.body.is_empty());
        assert_eq!(page.version, PageVersion::default());
    }

    #[test]
    fn test_wire_attachment_envelope_with_next_link() {
        let json = r#"{
            "results": [{"id": "att1", "title": "diagram.png", "downloadLink": "/download/attachments/5/diagram.png?version=2"}],
            "_links": {"next": "/wiki/api/v2/pages/5/attachments?cursor=abc&limit=100"}
        }"#;
        let envelope: ResultsEnvelope<WireAttachment> = serde_json::from_str(json).unwrap();
        let next = envelope.links.and_then(|l| l.next).unwrap();
        let attachment: Attachment = envelope.results.into_iter().next().unwrap().into();

        assert_eq!(attachment.title, "diagram.png");
        assert!(attachment.download_link.contains("version=2"));
        assert!(next.contains("cursor=abc"));
    }
}
