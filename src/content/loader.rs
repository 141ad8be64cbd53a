//! Content loader - builds the post index from the content directory

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{ContentError, FrontMatter, Post, PostIndex};
use crate::Site;

/// Loads posts from the content directory
#[derive(Debug, Clone)]
pub struct ContentLoader {
    content_dir: PathBuf,
    extensions: Vec<String>,
    strict: bool,
}

impl ContentLoader {
    /// Create a loader for a site's content directory
    pub fn new(site: &Site) -> Self {
        Self {
            content_dir: site.content_dir.clone(),
            extensions: site.config.extensions.clone(),
            strict: site.config.strict,
        }
    }

    /// Create a loader for an arbitrary directory
    pub fn from_dir<P: AsRef<Path>>(content_dir: P, extensions: &[&str]) -> Self {
        Self {
            content_dir: content_dir.as_ref().to_path_buf(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            strict: false,
        }
    }

    /// Reject posts whose required metadata is missing or malformed
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// Build the post index
    ///
    /// Any I/O failure aborts the whole build; there is no partial index.
    pub fn load(&self) -> Result<PostIndex, ContentError> {
        let mut posts = Vec::new();

        for path in self.post_files()? {
            posts.push(self.load_post(&path)?);
        }

        let index = PostIndex::from_posts(posts)?;
        tracing::debug!(
            "Indexed {} posts from {:?}",
            index.len(),
            self.content_dir
        );
        Ok(index)
    }

    /// Accepted post files, in file name order
    pub fn post_files(&self) -> Result<Vec<PathBuf>, ContentError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.content_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.content_dir.clone());
                ContentError::read(path, e.into())
            })?;

            let path = entry.path();
            if !entry.file_type().is_file() || is_hidden(path) {
                continue;
            }
            if !self.is_post_file(path) {
                tracing::debug!("Skipping non-post file {:?}", path);
                continue;
            }
            files.push(path.to_path_buf());
        }

        Ok(files)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> Result<Post, ContentError> {
        let document = fs::read_to_string(path).map_err(|e| ContentError::read(path, e))?;
        let (metadata, body) = FrontMatter::parse(&document);
        let slug = slug_from_path(path);

        let issues = metadata.validate();
        if !issues.is_empty() {
            if self.strict {
                return Err(ContentError::Invalid { slug, issues });
            }
            for issue in &issues {
                tracing::warn!("{:?}: {}", path, issue);
            }
        }

        let mut post = Post::new(slug, metadata, body);
        post.source = path.to_path_buf();
        Ok(post)
    }

    fn is_post_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|accepted| accepted == e))
            .unwrap_or(false)
    }
}

/// Slug of a post file: its name without the extension
pub fn slug_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
