//! HTML helper functions

use lazy_static::lazy_static;
use regex::Regex;

use super::url::is_external;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_WORD: Regex = Regex::new(r"[^\w\-]+").unwrap();
    static ref DASHES: Regex = Regex::new(r"--+").unwrap();
}

/// Escape text for HTML content and attribute values
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape text for XML documents
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Anchor id for a heading
///
/// # Examples
/// ```ignore
/// slugify_heading("Tips & Tricks") // -> "tips-and-tricks"
/// ```
pub fn slugify_heading(text: &str) -> String {
    let s = text.to_lowercase();
    let s = WHITESPACE.replace_all(s.trim(), "-");
    let s = s.replace('&', "-and-");
    let s = NON_WORD.replace_all(&s, "");
    DASHES.replace_all(&s, "-").into_owned()
}

/// Generate an anchor tag; external targets open in a new tab
///
/// `inner` is inserted as-is and must already be HTML.
pub fn link_to(href: &str, inner: &str) -> String {
    let href = escape_html(href);
    if is_external(&href) {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
            href, inner
        )
    } else {
        format!(r#"<a href="{}">{}</a>"#, href, inner)
    }
}

/// Generate an image tag
pub fn image_tag(src: &str, alt: &str, title: Option<&str>) -> String {
    let title_attr = title
        .filter(|t| !t.is_empty())
        .map(|t| format!(r#" title="{}""#, escape_html(t)))
        .unwrap_or_default();
    format!(
        r#"<img src="{}" alt="{}"{} loading="lazy">"#,
        escape_html(src),
        escape_html(alt),
        title_attr
    )
}
