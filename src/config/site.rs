//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::content::DEFAULT_WORDS_PER_MINUTE;

/// Environment variable that overrides the configured site URL
pub const URL_ENV: &str = "FOLIO_URL";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub blog_path: String,
    #[serde(default)]
    pub static_routes: Vec<String>,

    // Directory
    pub content_dir: String,
    pub public_dir: String,
    pub static_dir: String,

    // Content
    pub extensions: Vec<String>,
    /// Reject posts with missing or malformed required metadata
    pub strict: bool,
    pub words_per_minute: usize,

    // Rendering
    #[serde(default)]
    pub highlight: HighlightConfig,
    pub date_format_relative: bool,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            description: String::new(),
            author: String::new(),
            language: "en".to_string(),

            url: "http://localhost:4000".to_string(),
            blog_path: "/blog".to_string(),
            static_routes: vec![String::new(), "/blog".to_string()],

            content_dir: "posts".to_string(),
            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            extensions: vec!["mdx".to_string(), "md".to_string()],
            strict: false,
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,

            highlight: HighlightConfig::default(),
            date_format_relative: true,

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(URL_ENV) {
            self.apply_url_override(&url);
        }
    }

    fn apply_url_override(&mut self, url: &str) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }
        // Deployment hosts usually export a bare host name
        self.url = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{}", url)
        };
        tracing::debug!("Site url overridden from {}: {}", URL_ENV, self.url);
    }

    /// Site URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Normalized blog path: leading slash, no trailing slash
    pub fn blog_root(&self) -> String {
        let trimmed = self.blog_path.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}
