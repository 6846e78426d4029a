use std::sync::{Arc, Mutex};

use crate::feed::assemble::FeedPost;

/// Cache for the first feed page.
///
/// The cached payload is viewer-independent: per-viewer like membership is
/// derived from the liker id list each post already carries, so one copy
/// serves every reader. Any feed mutation drops the cache; the next read
/// repopulates it.
#[derive(Clone, Default)]
pub struct FeedCache {
    inner: Arc<Mutex<Option<Vec<FeedPost>>>>,
}

impl FeedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Vec<FeedPost>> {
        self.inner.lock().unwrap().clone()
    }

    pub fn put(&self, posts: Vec<FeedPost>) {
        *self.inner.lock().unwrap() = Some(posts);
    }

    pub fn invalidate(&self) {
        let had_value = self.inner.lock().unwrap().take().is_some();
        if had_value {
            tracing::debug!("Feed cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cache_returns_none() {
        let cache = FeedCache::new();
        assert!(cache.get().is_none());
    }

    #[test]
    fn put_then_get_round_trips() {
        let cache = FeedCache::new();
        cache.put(Vec::new());
        assert_eq!(cache.get().unwrap().len(), 0);
    }

    #[test]
    fn invalidate_drops_cached_page() {
        let cache = FeedCache::new();
        cache.put(Vec::new());
        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
