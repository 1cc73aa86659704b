//! Standalone HTML document emitted for every exported page.

use std::fmt::Write;

use html_escape::encode_text;

use crate::gateway::Page;

const STYLE: &str = r#"        body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif; max-width: 1200px; margin: 0 auto; padding: 20px; }
        .metadata { background: #f5f5f5; padding: 15px; border-radius: 5px; margin-bottom: 20px; }
        .metadata p { margin: 5px 0; }
        table { border-collapse: collapse; width: 100%; margin: 10px 0; }
        th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
        th { background-color: #f2f2f2; }
        img { max-width: 100%; height: auto; }"#;

/// Wraps a localized body in a document with a metadata header.
///
/// Metadata values are escaped; `body` is inserted as-is.
#[must_use]
pub fn render_document(space_key: &str, page: &Page, body: &str) -> String {
    let title = encode_text(&page.title);
    let mut doc = String::with_capacity(body.len() + 2048);

    doc.push_str("<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"UTF-8\">\n");
    let _ = writeln!(doc, "    <title>{title}</title>");
    let _ = writeln!(doc, "    <style>\n{STYLE}\n    </style>");
    doc.push_str("</head>\n<body>\n    <div class=\"metadata\">\n");
    for (label, value) in [
        ("Space", space_key.to_string()),
        ("Page ID", page.id.clone()),
        ("Version", page.version.number.to_string()),
        ("Last Modified", page.version.when.clone()),
        ("Modified By", page.version.by.clone()),
    ] {
        let _ = writeln!(
            doc,
            "        <p><strong>{label}:</strong> {}</p>",
            encode_text(&value)
        );
    }
    doc.push_str("    </div>\n");
    let _ = writeln!(doc, "    <h1>{title}</h1>");
    let _ = writeln!(doc, "    {body}");
    doc.push_str("</body>\n</html>\n");
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::PageVersion;

    fn page() -> Page {
        Page::new("42", "Q&A <draft>").with_version(PageVersion {
            number: 7,
            when: "2024-03-01T10:00:00.000Z".to_string(),
            by: "Ada Lovelace".to_string(),
        })
    }

    #[test]
    fn test_metadata_block_lists_page_details() {
        let doc = render_document("ENG", &page(), "<p>body</p>");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<p><strong>Space:</strong> ENG</p>"));
        assert!(doc.contains("<p><strong>Page ID:</strong> 42</p>"));
        assert!(doc.contains("<p><strong>Version:</strong> 7</p>"));
        assert!(doc.contains("<p><strong>Last Modified:</strong> 2024-03-01T10:00:00.000Z</p>"));
        assert!(doc.contains("<p><strong>Modified By:</strong> Ada Lovelace</p>"));
    }

    #[test]
    fn test_title_is_escaped_but_body_is_not() {
        let doc = render_document("ENG", &page(), "<p>raw &amp; ready</p>");
        assert!(doc.contains("<title>Q&amp;A &lt;draft&gt;</title>"));
        assert!(doc.contains("<h1>Q&amp;A &lt;draft&gt;</h1>"));
        assert!(doc.contains("<p>raw &amp; ready</p>"));
        assert!(doc.trim_end().ends_with("</html>"));
    }
}
