//! In-memory post index and the views built on it

use serde::Serialize;
use std::collections::HashMap;

use super::{ContentError, Post};

/// Posts in enumeration order, unique by slug
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostIndex {
    posts: Vec<Post>,
    #[serde(skip)]
    by_slug: HashMap<String, usize>,
}

impl PostIndex {
    /// Build an index, rejecting a second post with an existing slug
    pub fn from_posts(posts: Vec<Post>) -> Result<Self, ContentError> {
        let mut by_slug = HashMap::with_capacity(posts.len());

        for (i, post) in posts.iter().enumerate() {
            if let Some(&first) = by_slug.get(&post.slug) {
                let first: &Post = &posts[first];
                return Err(ContentError::DuplicateSlug {
                    slug: post.slug.clone(),
                    first: first.source.clone(),
                    second: post.source.clone(),
                });
            }
            by_slug.insert(post.slug.clone(), i);
        }

        Ok(Self { posts, by_slug })
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Posts in enumeration order
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Slugs to pre-render, one per post
    pub fn routes(&self) -> Vec<&str> {
        self.posts.iter().map(|p| p.slug.as_str()).collect()
    }

    /// Posts, most recently published first
    ///
    /// Ties keep enumeration order. Missing or unparseable dates sort last.
    pub fn listing(&self) -> Vec<&Post> {
        let mut keyed: Vec<_> = self.posts.iter().map(|p| (p.published_on(), p)).collect();
        // `None` orders below every date, so it lands at the end
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
        keyed.into_iter().map(|(_, p)| p).collect()
    }

    /// Exact, case-sensitive lookup by slug
    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.by_slug.get(slug).map(|&i| &self.posts[i])
    }

    /// Like [`PostIndex::get`], but a miss is a [`ContentError::NotFound`]
    pub fn find(&self, slug: &str) -> Result<&Post, ContentError> {
        self.get(slug)
            .ok_or_else(|| ContentError::NotFound(slug.to_string()))
    }

    /// Neighbours of a post in listing order: (newer, older)
    pub fn neighbours(&self, slug: &str) -> (Option<&Post>, Option<&Post>) {
        let listing = self.listing();
        let Some(pos) = listing.iter().position(|p| p.slug == slug) else {
            return (None, None);
        };
        let newer = pos.checked_sub(1).map(|i| listing[i]);
        let older = listing.get(pos + 1).copied();
        (newer, older)
    }
}
