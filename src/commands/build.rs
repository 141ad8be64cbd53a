//! Build the static site

use anyhow::{Context, Result};
use std::time::Instant;

use crate::generator::Generator;
use crate::server::watcher;
use crate::Site;

/// Index the content directory and export every page
pub fn run(site: &Site) -> Result<()> {
    let start = Instant::now();

    let index = site
        .loader()
        .load()
        .with_context(|| format!("Failed to index {:?}", site.content_dir))?;
    tracing::info!("Loaded {} posts", index.len());

    Generator::new(site).generate(&index)?;

    tracing::info!(
        "Generated {:?} in {:.2}s",
        site.public_dir,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Rebuild whenever content, static files or the config change
///
/// The config is re-read on every rebuild. A failed rebuild is logged and
/// leaves the previous output in place.
pub fn watch(site: &Site) -> Result<()> {
    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    watcher::watch(site, |_changed| {
        let result = Site::new(&site.base_dir).and_then(|fresh| run(&fresh));
        if let Err(e) = result {
            tracing::error!("Generation failed: {:#}", e);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_run_missing_content_dir() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();

        let err = run(&site).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to index"));
        assert!(!site.public_dir.exists());
    }

    #[test]
    fn test_run_duplicate_slug_aborts() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        fs::create_dir_all(&site.content_dir).unwrap();
        fs::write(site.content_dir.join("a.md"), "---\ntitle: A\n---\n").unwrap();
        fs::write(site.content_dir.join("a.mdx"), "---\ntitle: A\n---\n").unwrap();

        assert!(run(&site).is_err());
        assert!(!site.public_dir.join("index.html").exists());
    }
}
