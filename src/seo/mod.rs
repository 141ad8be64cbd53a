//! Page metadata, sitemap and robots.txt

pub mod sitemap;

use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{blog_index_path, full_url_for, og_image_url, parse_calendar_date, post_url};

/// Per-route metadata rendered into the page head
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: Option<String>,
    /// `article` for posts, `website` otherwise
    pub kind: &'static str,
    /// Publication date as written in the front-matter
    pub published_time: Option<String>,
    /// Canonical URL
    pub url: String,
    pub image: String,
}

impl PageMeta {
    /// Metadata for a post page
    pub fn for_post(post: &Post, config: &SiteConfig) -> Self {
        let title = post.title().to_string();
        let image = match post.metadata.image() {
            Some(image) if image.starts_with('/') => full_url_for(config, image),
            Some(image) => image.to_string(),
            None => og_image_url(config, &title),
        };

        Self {
            description: post.summary().map(str::to_string),
            kind: "article",
            published_time: post
                .metadata
                .published_at()
                .filter(|d| parse_calendar_date(d).is_some())
                .map(str::to_string),
            url: post_url(config, &post.slug),
            image,
            title,
        }
    }

    /// Metadata for the post listing
    pub fn for_listing(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: Some(config.description.clone()).filter(|d| !d.is_empty()),
            kind: "website",
            published_time: None,
            url: full_url_for(config, &blog_index_path(config)),
            image: og_image_url(config, &config.title),
        }
    }

    /// Metadata for the not-found page
    pub fn not_found(config: &SiteConfig, path: &str) -> Self {
        Self {
            title: format!("Not found - {}", config.title),
            description: None,
            kind: "website",
            published_time: None,
            url: full_url_for(config, path),
            image: og_image_url(config, &config.title),
        }
    }
}
