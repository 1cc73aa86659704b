//! URL shapes under which the rendering service embeds attachment references.
//!
//! Each rule renders a regex for one attachment. All rules share the same
//! prefix (optional scheme and host) and suffix (optional stale query string
//! followed by a segment terminator), so a title only matches as a whole path
//! segment: `a.png` never matches inside `a.png.bak` or `data.png`.
//!
//! The terminator set includes characters that may also occur inside a title
//! (space, `,`, `)`, `#`). Callers must reject matches that continue into a
//! longer known title; the matched title is exposed as the `title` group.

use regex::{Regex, RegexBuilder};

/// Optional `scheme://host` in front of a reference.
const HOST_PREFIX: &str = r#"(?:https?://[^/\s"'<>]+)?"#;

/// Version tokens and other parameters the service appends to download links.
const STALE_QUERY: &str = r#"(?:\?[^"'\s<>#]*)?"#;

/// Characters that may legally follow a complete reference. Captured so the
/// replacement can put it back.
const SEGMENT_END: &str = r#"(?P<end>["'\s<>)#,]|$)"#;

/// Inputs a rule needs to render its pattern.
#[derive(Debug)]
pub struct RuleContext<'a> {
    /// Owning page id, matched literally.
    pub page_id: &'a str,
    /// Alternation of the escaped title spellings.
    pub title_pattern: &'a str,
}

/// One URL shape.
#[derive(Debug, Clone, Copy)]
pub struct RewriteRule {
    /// Name used in logs.
    pub name: &'static str,
    shape: fn(&RuleContext<'_>) -> String,
}

impl RewriteRule {
    /// Compiles the case-insensitive pattern for one attachment.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the rendered pattern exceeds size limits.
    pub fn compile(&self, context: &RuleContext<'_>) -> Result<Regex, regex::Error> {
        let pattern = format!("{HOST_PREFIX}{}{STALE_QUERY}{SEGMENT_END}", (self.shape)(context));
        RegexBuilder::new(&pattern).case_insensitive(true).build()
    }
}

fn short_form(context: &RuleContext<'_>) -> String {
    format!("/wikiattachments/(?P<title>{})", context.title_pattern)
}

fn download_endpoint(context: &RuleContext<'_>) -> String {
    format!(
        "(?:/wiki)?/download/attachments/{}/(?P<title>{})",
        regex::escape(context.page_id),
        context.title_pattern
    )
}

/// Short-form asset references first, then the download endpoint.
pub const DEFAULT_RULES: [RewriteRule; 2] = [
    RewriteRule {
        name: "short-form",
        shape: short_form,
    },
    RewriteRule {
        name: "download-endpoint",
        shape: download_endpoint,
    },
];

/// Every spelling a title may appear under in HTML: raw, percent-encoded
/// and entity-escaped. Duplicates are dropped.
#[must_use]
pub fn title_spellings(title: &str) -> Vec<String> {
    let mut spellings: Vec<String> = vec![title.to_string()];
    for variant in [
        urlencoding::encode(title).into_owned(),
        html_escape::encode_double_quoted_attribute(title).into_owned(),
    ] {
        if !spellings.contains(&variant) {
            spellings.push(variant);
        }
    }
    spellings
}

/// Regex alternation of [`title_spellings`].
#[must_use]
pub fn title_alternation(title: &str) -> String {
    title_spellings(title)
        .iter()
        .map(|spelling| regex::escape(spelling))
        .collect::<Vec<_>>()
        .join("|")
}
