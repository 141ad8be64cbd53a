//! Content module - front-matter parsing, posts, the post index and rendering

mod error;
mod frontmatter;
mod index;
pub mod loader;
mod markdown;
mod post;

pub use error::ContentError;
pub use frontmatter::{FrontMatter, Metadata, MetadataIssue};
pub use index::PostIndex;
pub use loader::ContentLoader;
pub use markdown::{Element, ElementKind, Highlighter, MarkdownRenderer, RenderFn, Renderers};
pub use post::{Post, DEFAULT_WORDS_PER_MINUTE};
