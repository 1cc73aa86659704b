//! Removal of the service's decorative UI images.

use std::sync::LazyLock;

use regex::Regex;

/// Path prefix the service serves its own static UI assets from.
pub const UI_ASSET_PREFIX: &str = "/wiki/s/";

/// `<img>` tags whose `src` points under [`UI_ASSET_PREFIX`], schemed or not.
#[allow(clippy::expect_used)]
static UI_IMG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["'](?:https?://[^/"'\s>]+)?/wiki/s/[^"']*["'][^>]*>"#)
        .expect("UI chrome regex is valid")
});

/// Strips spinner and icon images that have no downloadable counterpart.
///
/// Returns the cleaned HTML and the number of elements removed.
#[must_use]
pub fn strip_ui_chrome(html: &str) -> (String, usize) {
    let removed = UI_IMG_PATTERN.find_iter(html).count();
    if removed == 0 {
        return (html.to_string(), 0);
    }
    (UI_IMG_PATTERN.replace_all(html, "").into_owned(), removed)
}
