//! Scaffold a new post

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::fs;
use std::path::PathBuf;

use crate::content::Metadata;
use crate::helpers::date_xml;
use crate::Site;

/// Create `<slug>.<first extension>` in the content directory
pub fn run(site: &Site, title: &str) -> Result<PathBuf> {
    create_post(site, title, Local::now().date_naive())
}

pub fn create_post(site: &Site, title: &str, today: NaiveDate) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    let ext = site
        .config
        .extensions
        .first()
        .map(String::as_str)
        .unwrap_or("mdx");
    let file_path = site.content_dir.join(format!("{}.{}", slug, ext));

    // Check if file already exists
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    fs::create_dir_all(&site.content_dir)
        .with_context(|| format!("Failed to create {:?}", site.content_dir))?;

    let mut metadata = Metadata::default();
    metadata.insert("title", title);
    metadata.insert("publishedAt", date_xml(today));
    metadata.insert("summary", "");

    fs::write(&file_path, metadata.to_front_matter())
        .with_context(|| format!("Failed to write {:?}", file_path))?;

    println!("Created: {:?}", file_path);
    Ok(file_path)
}
