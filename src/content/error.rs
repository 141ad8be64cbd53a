//! Errors raised while building or querying the post index

use std::path::PathBuf;
use thiserror::Error;

use super::MetadataIssue;

/// Post index errors
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Failed to read content store at {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Duplicate slug '{slug}': {first:?} and {second:?}")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Invalid metadata in '{slug}': {}", join_issues(.issues))]
    Invalid {
        slug: String,
        issues: Vec<MetadataIssue>,
    },

    #[error("Post not found: {0}")]
    NotFound(String),
}

impl ContentError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ContentError::Read {
            path: path.into(),
            source,
        }
    }

    /// Whether this is a lookup miss rather than a build failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound(_))
    }
}

fn join_issues(issues: &[MetadataIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
