//! Post model

use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;

use super::Metadata;
use crate::helpers::parse_calendar_date;

/// Reading speed used when none is configured
pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

/// A blog post, built once per index build and never mutated afterwards
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// URL-friendly name, the source file stem
    pub slug: String,

    /// Front-matter fields
    pub metadata: Metadata,

    /// Raw body with the front-matter block removed
    pub content: String,

    /// Source file path
    #[serde(skip)]
    pub source: PathBuf,
}

impl Post {
    pub fn new(slug: impl Into<String>, metadata: Metadata, content: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            metadata,
            content: content.into(),
            source: PathBuf::new(),
        }
    }

    /// Title, falling back to the slug
    pub fn title(&self) -> &str {
        self.metadata
            .title()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.slug)
    }

    /// Publication date, `None` when missing or unparseable
    pub fn published_on(&self) -> Option<NaiveDate> {
        self.metadata.published_at().and_then(parse_calendar_date)
    }

    pub fn summary(&self) -> Option<&str> {
        self.metadata.summary()
    }

    pub fn tags(&self) -> Vec<String> {
        self.metadata.tags()
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Estimated reading time in whole minutes, at least one
    pub fn reading_time(&self, words_per_minute: usize) -> usize {
        let wpm = words_per_minute.max(1);
        self.word_count().div_ceil(wpm).max(1)
    }
}
