//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters left alone by JavaScript's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Site-relative path of a post
///
/// # Examples
/// ```ignore
/// post_path(&config, "hello") // -> "/blog/hello"
/// ```
pub fn post_path(config: &SiteConfig, slug: &str) -> String {
    format!("{}/{}", config.blog_root(), slug)
}

/// Site-relative path of the listing page
pub fn blog_index_path(config: &SiteConfig) -> String {
    let root = config.blog_root();
    if root.is_empty() {
        "/".to_string()
    } else {
        root
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/blog/hello") // -> "https://example.com/blog/hello"
/// full_url_for(&config, "") // -> "https://example.com"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.base_url();
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

/// Full URL of a post
pub fn post_url(config: &SiteConfig, slug: &str) -> String {
    full_url_for(config, &post_path(config, slug))
}

/// Encode a string for use as a single query or path component
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// Generated social image URL for a title
pub fn og_image_url(config: &SiteConfig, title: &str) -> String {
    format!("{}/og?title={}", config.base_url(), encode_component(title))
}

/// Whether a link target leaves the site
pub fn is_external(href: &str) -> bool {
    !(href.starts_with('/') || href.starts_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com/".to_string();
        config
    }

    #[test]
    fn test_post_path() {
        let mut config = test_config();
        assert_eq!(post_path(&config, "hello"), "/blog/hello");
        config.blog_path = "/".to_string();
        assert_eq!(post_path(&config, "hello"), "/hello");
        assert_eq!(blog_index_path(&config), "/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(full_url_for(&config, ""), "https://example.com");
        assert_eq!(full_url_for(&config, "/blog"), "https://example.com/blog");
        assert_eq!(
            post_url(&config, "first-post"),
            "https://example.com/blog/first-post"
        );
    }

    #[test]
    fn test_og_image_url() {
        let config = test_config();
        assert_eq!(
            og_image_url(&config, "Rust & You (part 1)"),
            "https://example.com/og?title=Rust%20%26%20You%20(part%201)"
        );
    }

    #[test]
    fn test_is_external() {
        assert!(!is_external("/blog/x"));
        assert!(!is_external("#intro"));
        assert!(is_external("https://example.com"));
        assert!(is_external("mailto:me@example.com"));
    }
}
