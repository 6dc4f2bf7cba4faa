use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

/// Rendered public HTML for one page, with the id needed to count views.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPage {
    pub page_id: Uuid,
    pub html: String,
}

/// Position in the cache's invalidation history. Taken before a page is read from the
/// store and handed back on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEpoch(u64);

#[derive(Default)]
struct Entries {
    pages: HashMap<String, CachedPage>,
    /// Epoch of the most recent invalidation of each slug.
    invalidated_at: HashMap<String, u64>,
    epoch: u64,
}

/// Slug → rendered public page. Warmed by the static pass at startup and invalidated by
/// every owner mutation.
///
/// Writers read `epoch()` before loading a page and insert with `insert_if_current`. A
/// render whose slug was invalidated after that epoch is never stored.
#[derive(Clone, Default)]
pub struct RenderCache {
    inner: Arc<RwLock<Entries>>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn epoch(&self) -> CacheEpoch {
        CacheEpoch(self.inner.read().await.epoch)
    }

    pub async fn get(&self, slug: &str) -> Option<CachedPage> {
        self.inner.read().await.pages.get(slug).cloned()
    }

    /// Stores `page` unless `slug` was invalidated after `seen`. Returns whether it was
    /// stored.
    pub async fn insert_if_current(
        &self,
        slug: String,
        seen: CacheEpoch,
        page: CachedPage,
    ) -> bool {
        let mut entries = self.inner.write().await;
        let stale = entries
            .invalidated_at
            .get(&slug)
            .is_some_and(|&at| at > seen.0);
        if stale {
            return false;
        }
        entries.pages.insert(slug, page);
        true
    }

    pub async fn invalidate(&self, slug: &str) {
        let mut entries = self.inner.write().await;
        entries.epoch += 1;
        let epoch = entries.epoch;
        entries.invalidated_at.insert(slug.to_string(), epoch);
        entries.pages.remove(slug);
    }
}
