//! folio-rs: content indexing and static generation for a markdown blog
//!
//! Posts are markdown files with a `---` front-matter block. They are
//! indexed once into an immutable [`content::PostIndex`], which feeds the
//! static route list, the listing view, post lookup, page metadata and the
//! sitemap. The index can be exported as static HTML or served by a
//! development server that swaps in a fresh index when content changes.

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod seo;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Name of the site configuration file inside the site directory
pub const CONFIG_FILE: &str = "_config.yml";

/// A site directory and its resolved configuration
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding the post files
    pub content_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Files copied or served verbatim
    pub static_dir: PathBuf,
}

impl Site {
    /// Open a site directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Use an already resolved configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
            static_dir,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }

    /// Loader for this site's content directory
    pub fn loader(&self) -> content::ContentLoader {
        content::ContentLoader::new(self)
    }

    /// An empty index cache over this site's content
    pub fn index_cache(&self) -> cache::IndexCache {
        cache::IndexCache::new(self.loader())
    }

    /// Full URL of a post
    pub fn post_url(&self, slug: &str) -> String {
        helpers::post_url(&self.config, slug)
    }

    /// Build the index and export the static site
    pub fn build(&self) -> Result<()> {
        commands::build::run(self)
    }

    /// Remove the output directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Scaffold a new post
    pub fn new_post(&self, title: &str) -> Result<PathBuf> {
        commands::new::run(self, title)
    }
}
