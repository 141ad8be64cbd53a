//! Front-matter parsing
//!
//! A document starts with a `---` line, followed by `key: value` lines and a
//! closing `---` line. Parsing never fails: anything that does not look like
//! a complete block leaves the document untouched as body.

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::helpers::parse_calendar_date;

/// Delimiter line that opens and closes the metadata block
pub const DELIMITER: &str = "---";

/// Recognized keys
pub const TITLE: &str = "title";
pub const PUBLISHED_AT: &str = "publishedAt";
pub const SUMMARY: &str = "summary";
pub const IMAGE: &str = "image";
pub const TAGS: &str = "tags";

/// Key/value metadata from a front-matter block, in first-seen key order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Metadata {
    fields: IndexMap<String, String>,
}

/// A problem found by strict validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataIssue {
    #[error("missing 'title'")]
    MissingTitle,

    #[error("missing 'publishedAt'")]
    MissingPublishedAt,

    #[error("unparseable 'publishedAt': {0:?}")]
    InvalidPublishedAt(String),
}

impl Metadata {
    /// Parse the lines of a metadata block
    pub fn parse_block(block: &str) -> Self {
        let mut metadata = Metadata::default();

        for line in block.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // Split on the first colon only, values may be URLs
            let Some((key, value)) = line.split_once(':') else {
                tracing::debug!("Skipping front-matter line without a key: {:?}", line);
                continue;
            };

            let key = key.trim();
            if key.is_empty() {
                tracing::debug!("Skipping front-matter line with an empty key: {:?}", line);
                continue;
            }

            metadata.insert(key, unquote(value.trim()));
        }

        metadata
    }

    /// Set a value; a repeated key overwrites in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn title(&self) -> Option<&str> {
        self.get(TITLE)
    }

    pub fn published_at(&self) -> Option<&str> {
        self.get(PUBLISHED_AT)
    }

    pub fn summary(&self) -> Option<&str> {
        self.get(SUMMARY).filter(|s| !s.is_empty())
    }

    pub fn image(&self) -> Option<&str> {
        self.get(IMAGE).filter(|s| !s.is_empty())
    }

    /// Tags as either `a, b` or `[a, b]`
    pub fn tags(&self) -> Vec<String> {
        let Some(raw) = self.get(TAGS) else {
            return Vec::new();
        };
        let raw = raw.trim();
        let raw = raw
            .strip_prefix('[')
            .and_then(|r| r.strip_suffix(']'))
            .unwrap_or(raw);

        raw.split(',')
            .map(|t| unquote(t.trim()).trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Check the required keys; an empty list means the metadata is valid
    pub fn validate(&self) -> Vec<MetadataIssue> {
        let mut issues = Vec::new();

        if self.title().map_or(true, |t| t.trim().is_empty()) {
            issues.push(MetadataIssue::MissingTitle);
        }

        match self.published_at() {
            None => issues.push(MetadataIssue::MissingPublishedAt),
            Some(date) if date.trim().is_empty() => {
                issues.push(MetadataIssue::MissingPublishedAt)
            }
            Some(date) if parse_calendar_date(date).is_none() => {
                issues.push(MetadataIssue::InvalidPublishedAt(date.to_string()))
            }
            Some(_) => {}
        }

        issues
    }

    /// Serialize back into a delimited front-matter block
    pub fn to_front_matter(&self) -> String {
        let mut out = String::new();
        out.push_str(DELIMITER);
        out.push('\n');
        for (key, value) in &self.fields {
            out.push_str(key);
            out.push_str(": ");
            if needs_quotes(value) {
                out.push('"');
                out.push_str(value);
                out.push('"');
            } else {
                out.push_str(value);
            }
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out.push('\n');
        out
    }
}

/// Front-matter parser
pub struct FrontMatter;

impl FrontMatter {
    /// Split a document into metadata and body
    ///
    /// Returns empty metadata and the whole input as body when the document
    /// does not open with a delimiter line or the block is never closed.
    pub fn parse(document: &str) -> (Metadata, &str) {
        let text = document.strip_prefix('\u{feff}').unwrap_or(document);

        let Some(after_open) = strip_opening(text) else {
            return (Metadata::default(), document);
        };

        let mut offset = 0;
        for line in after_open.split_inclusive('\n') {
            if is_delimiter(line) {
                let block = &after_open[..offset];
                let body = after_open[offset + line.len()..].trim_start_matches(['\n', '\r']);
                return (Metadata::parse_block(block), body);
            }
            offset += line.len();
        }

        tracing::debug!("Front-matter block is never closed, treating as body");
        (Metadata::default(), document)
    }
}

fn strip_opening(text: &str) -> Option<&str> {
    let (first, rest) = match text.find('\n') {
        Some(pos) => (&text[..pos], &text[pos + 1..]),
        None => (text, ""),
    };
    is_delimiter(first).then_some(rest)
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

/// Strip one matching pair of surrounding quotes
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn needs_quotes(value: &str) -> bool {
    value != value.trim() || unquote(value).len() != value.len()
}
