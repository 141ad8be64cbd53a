//! Post index cache
//!
//! The cache owns the most recently built [`PostIndex`] and hands out shared
//! snapshots of it. Rebuilding never touches a published snapshot: a fresh
//! index is built on the side and swapped in with a single atomic store, so
//! readers see either the old index or the new one.

use arc_swap::ArcSwapOption;
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::content::{ContentError, ContentLoader, PostIndex};

/// A built index together with the state of the content store it was built from
#[derive(Debug)]
pub struct Snapshot {
    index: PostIndex,
    fingerprint: u64,
}

impl Snapshot {
    pub fn index(&self) -> &PostIndex {
        &self.index
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

impl Deref for Snapshot {
    type Target = PostIndex;

    fn deref(&self) -> &PostIndex {
        &self.index
    }
}

/// Lazily built, explicitly reloadable post index
pub struct IndexCache {
    loader: ContentLoader,
    current: ArcSwapOption<Snapshot>,
}

impl IndexCache {
    pub fn new(loader: ContentLoader) -> Self {
        Self {
            loader,
            current: ArcSwapOption::empty(),
        }
    }

    pub fn loader(&self) -> &ContentLoader {
        &self.loader
    }

    /// Current snapshot, building the index on first use
    pub fn get(&self) -> Result<Arc<Snapshot>, ContentError> {
        if let Some(snapshot) = self.current.load_full() {
            return Ok(snapshot);
        }
        self.reload()
    }

    /// Build a fresh index and publish it
    ///
    /// On failure the previously published snapshot stays in place.
    pub fn reload(&self) -> Result<Arc<Snapshot>, ContentError> {
        let start = Instant::now();

        let fingerprint = fingerprint(&self.loader)?;
        let index = self.loader.load()?;
        let snapshot = Arc::new(Snapshot { index, fingerprint });
        self.current.store(Some(Arc::clone(&snapshot)));

        tracing::info!(
            "Indexed {} posts in {:.1}ms",
            snapshot.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(snapshot)
    }

    /// Drop the published snapshot; the next `get` rebuilds
    pub fn invalidate(&self) {
        self.current.store(None);
        tracing::debug!("Index cache invalidated");
    }

    /// Whether the content store changed since the published snapshot was built
    pub fn is_stale(&self) -> Result<bool, ContentError> {
        let current = self.current.load();
        match &*current {
            Some(snapshot) => Ok(fingerprint(&self.loader)? != snapshot.fingerprint),
            None => Ok(true),
        }
    }

    /// Reload only if the content store changed; returns whether it did
    pub fn refresh(&self) -> Result<bool, ContentError> {
        if self.is_stale()? {
            self.reload()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Hash of the post files' names, sizes and modification times
pub fn fingerprint(loader: &ContentLoader) -> Result<u64, ContentError> {
    let mut hasher = DefaultHasher::new();

    for path in loader.post_files()? {
        let metadata = fs::metadata(&path).map_err(|e| ContentError::read(&path, e))?;
        path.hash(&mut hasher);
        metadata.len().hash(&mut hasher);
        metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .hash(&mut hasher);
    }

    Ok(hasher.finish())
}
