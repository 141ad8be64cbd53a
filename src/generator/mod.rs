//! Generator module - exports the post index as static HTML files

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::content::{MarkdownRenderer, PostIndex};
use crate::seo::sitemap;
use crate::templates::TemplateRenderer;
use crate::Site;

/// Static site generator
pub struct Generator {
    site: Site,
    markdown: MarkdownRenderer,
    today: NaiveDate,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Self {
        Self {
            site: site.clone(),
            markdown: MarkdownRenderer::new(&site.config.highlight),
            today: Local::now().date_naive(),
        }
    }

    /// Pin the date used for relative labels and static sitemap entries
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Write every page of the site; the first failure aborts the export
    pub fn generate(&self, index: &PostIndex) -> Result<()> {
        let public_dir = &self.site.public_dir;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("Failed to create output directory {:?}", public_dir))?;

        self.copy_static_assets()?;
        self.generate_listing_pages(index)?;
        self.generate_post_pages(index)?;
        self.generate_sitemap(index)?;

        Ok(())
    }

    /// `/` and the blog index both show the listing
    fn generate_listing_pages(&self, index: &PostIndex) -> Result<()> {
        let templates = TemplateRenderer::new(&self.site.config, self.today);
        let html = templates.listing(&index.listing());

        write_file(&self.site.public_dir.join("index.html"), &html)?;

        let blog_root = self.site.config.blog_root();
        if !blog_root.is_empty() {
            let path = self.output_dir(&blog_root).join("index.html");
            write_file(&path, &html)?;
        }

        tracing::debug!("Generated listing pages");
        Ok(())
    }

    fn generate_post_pages(&self, index: &PostIndex) -> Result<()> {
        let templates = TemplateRenderer::new(&self.site.config, self.today);
        let blog_root = self.site.config.blog_root();

        for slug in index.routes() {
            let post = index.find(slug)?;
            let (newer, older) = index.neighbours(slug);
            let body = self.markdown.render(&post.content);
            let html = templates.post(post, &body, newer, older);

            let output_path = self
                .output_dir(&format!("{}/{}", blog_root, slug))
                .join("index.html");
            write_file(&output_path, &html)?;
            tracing::debug!("Generated post: {:?}", output_path);
        }

        tracing::info!("Generated {} post pages", index.len());
        Ok(())
    }

    fn generate_sitemap(&self, index: &PostIndex) -> Result<()> {
        let config = &self.site.config;
        let entries = sitemap::entries(index, config, self.today);

        write_file(
            &self.site.public_dir.join("sitemap.xml"),
            &sitemap::to_xml(&entries),
        )?;
        write_file(
            &self.site.public_dir.join("robots.txt"),
            &sitemap::robots_txt(config),
        )?;

        tracing::info!("Generated sitemap.xml with {} urls", entries.len());
        Ok(())
    }

    /// Copy `static/` verbatim into the output directory
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.site.static_dir;
        if !static_dir.is_dir() {
            return Ok(());
        }

        for entry in WalkDir::new(static_dir).follow_links(true) {
            let entry = entry.with_context(|| format!("Failed to walk {:?}", static_dir))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", path, dest))?;
        }

        Ok(())
    }

    /// Output directory for a site-relative route
    fn output_dir(&self, route: &str) -> PathBuf {
        // Strip the leading slash so the join stays inside the output directory
        self.site.public_dir.join(route.trim_start_matches('/'))
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
}
