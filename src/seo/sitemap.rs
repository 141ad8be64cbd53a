//! Sitemap generation.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/blog/hello</loc>
//!     <lastmod>2024-06-01</lastmod>
//!   </url>
//! </urlset>
//! ```

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::PostIndex;
use crate::helpers::{date_xml, escape_xml, full_url_for, post_url};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// One `(url, lastModified)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapEntry {
    pub url: String,
    /// `None` when the post date cannot be parsed
    pub last_modified: Option<String>,
}

/// Static routes dated `today`, then one entry per post in index order
pub fn entries(index: &PostIndex, config: &SiteConfig, today: NaiveDate) -> Vec<SitemapEntry> {
    let statics = config.static_routes.iter().map(|route| SitemapEntry {
        url: full_url_for(config, route),
        last_modified: Some(date_xml(today)),
    });

    let posts = index.posts().iter().map(|post| SitemapEntry {
        url: post_url(config, &post.slug),
        last_modified: post.published_on().map(date_xml),
    });

    statics.chain(posts).collect()
}

/// Render entries as a sitemap document
pub fn to_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::with_capacity(128 + entries.len() * 96);

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"");
    xml.push_str(SITEMAP_NS);
    xml.push_str("\">\n");

    for entry in entries {
        xml.push_str("  <url>\n    <loc>");
        xml.push_str(&escape_xml(&entry.url));
        xml.push_str("</loc>\n");
        if let Some(lastmod) = &entry.last_modified {
            xml.push_str("    <lastmod>");
            xml.push_str(lastmod);
            xml.push_str("</lastmod>\n");
        }
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// robots.txt allowing everything and pointing at the sitemap
pub fn robots_txt(config: &SiteConfig) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}\n",
        full_url_for(config, "/sitemap.xml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Metadata, Post};

    fn post(slug: &str, date: &str) -> Post {
        let mut metadata = Metadata::default();
        metadata.insert("publishedAt", date);
        Post::new(slug, metadata, "")
    }

    fn config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com/".to_string();
        config
    }

    #[test]
    fn test_entries() {
        let index = PostIndex::from_posts(vec![
            post("b", "2024-06-01"),
            post("a", "June 2, 2024"),
            post("c", "whenever"),
        ])
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();

        let entries = entries(&index, &config(), today);
        let urls: Vec<_> = entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com",
                "https://example.com/blog",
                "https://example.com/blog/b",
                "https://example.com/blog/a",
                "https://example.com/blog/c",
            ]
        );
        assert_eq!(entries[0].last_modified.as_deref(), Some("2024-07-04"));
        assert_eq!(entries[2].last_modified.as_deref(), Some("2024-06-01"));
        assert_eq!(entries[3].last_modified.as_deref(), Some("2024-06-02"));
        assert_eq!(entries[4].last_modified, None);
    }

    #[test]
    fn test_to_xml() {
        let xml = to_xml(&[
            SitemapEntry {
                url: "https://example.com/?a=1&b=2".to_string(),
                last_modified: Some("2024-01-01".to_string()),
            },
            SitemapEntry {
                url: "https://example.com/x".to_string(),
                last_modified: None,
            },
        ]);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset"));
        assert!(xml.contains("<loc>https://example.com/?a=1&amp;b=2</loc>\n    <lastmod>2024-01-01</lastmod>"));
        assert!(xml.contains("<loc>https://example.com/x</loc>\n  </url>"));
        assert!(xml.ends_with("</urlset>\n"));
    }

    #[test]
    fn test_robots() {
        assert_eq!(
            robots_txt(&config()),
            "User-agent: *\nAllow: /\n\nSitemap: https://example.com/sitemap.xml\n"
        );
    }
}
