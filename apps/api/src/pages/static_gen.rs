//! Ahead-of-time rendering of published pages.
//!
//! Pages are independent of each other; a slug that fails to resolve is logged and
//! skipped so one bad page never aborts the batch.

use tracing::{info, warn};
use uuid::Uuid;

use crate::pages::cache::{CachedPage, RenderCache};
use crate::pages::resolver::PageResolver;
use crate::pages::store::PageStore;
use crate::render::render_page_html;

#[derive(Debug, Clone, PartialEq)]
pub struct PrerenderedPage {
    pub page_id: Uuid,
    pub slug: String,
    pub html: String,
}

/// Published slugs to generate, at most `limit`. A store failure yields an empty list.
pub async fn static_params(store: &dyn PageStore, limit: i64) -> Vec<String> {
    match store.list_published_slugs(limit.max(0)).await {
        Ok(slugs) => slugs,
        Err(e) => {
            warn!("Could not enumerate published pages: {e}");
            Vec::new()
        }
    }
}

pub async fn prerender_published(resolver: &PageResolver, limit: i64) -> Vec<PrerenderedPage> {
    let slugs = static_params(resolver.store(), limit).await;
    let mut rendered = Vec::with_capacity(slugs.len());

    for slug in slugs {
        let result = resolver.resolve_by_slug(&slug, None).await;
        match result.into_page() {
            Some(page) => rendered.push(PrerenderedPage {
                page_id: page.id,
                html: render_page_html(&page),
                slug,
            }),
            None => warn!("Skipping pre-render of '{slug}': page did not resolve"),
        }
    }

    rendered
}

/// Runs the static pass and stores the output in `cache`. Returns the number of pages
/// cached. Pages invalidated while the pass was running are left out.
pub async fn warm_cache(resolver: &PageResolver, cache: &RenderCache, limit: i64) -> usize {
    let seen = cache.epoch().await;
    let pages = prerender_published(resolver, limit).await;
    let mut count = 0;
    for page in pages {
        let cached = CachedPage {
            page_id: page.page_id,
            html: page.html,
        };
        if cache.insert_if_current(page.slug, seen, cached).await {
            count += 1;
        }
    }
    info!("Pre-rendered {count} published page(s)");
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};

    use crate::errors::AppError;
    use crate::models::page::{NewPage, PageMetadataUpdate, PageRow};
    use crate::pages::store::memory::{page_row, MemoryPageStore};

    async fn store_with(rows: Vec<PageRow>) -> Arc<MemoryPageStore> {
        let store = Arc::new(MemoryPageStore::new());
        for row in rows {
            store.insert_row(row).await;
        }
        store
    }

    #[tokio::test]
    async fn test_static_params_only_published_and_bounded() {
        let mut rows = Vec::new();
        for i in 0..5 {
            let mut row = page_row(&format!("live-{i}"), true, None);
            row.updated_at = Utc::now() - Duration::minutes(i);
            rows.push(row);
        }
        rows.push(page_row("draft", false, None));
        let store = store_with(rows).await;

        let slugs = static_params(store.as_ref(), 3).await;
        assert_eq!(slugs, vec!["live-0", "live-1", "live-2"]);

        let all = static_params(store.as_ref(), 100).await;
        assert_eq!(all.len(), 5);
        assert!(!all.contains(&"draft".to_string()));
    }

    #[tokio::test]
    async fn test_static_params_store_failure_is_empty() {
        let store = store_with(vec![page_row("live", true, None)]).await;
        store.set_failing(true);
        assert!(static_params(store.as_ref(), 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_prerender_renders_each_published_page() {
        let layout = json!({"root": {"type": "TextBlock", "props": {"text": "Hello"}}});
        let store = store_with(vec![
            page_row("with-layout", true, Some(layout)),
            page_row("corrupt", true, Some(Value::String("{oops".to_string()))),
        ])
        .await;
        let resolver = PageResolver::new(store);

        let pages = prerender_published(&resolver, 10).await;
        assert_eq!(pages.len(), 2);
        let with_layout = pages.iter().find(|p| p.slug == "with-layout").unwrap();
        assert!(with_layout.html.contains("<p class=\"flow-text\">Hello</p>"));
        let corrupt = pages.iter().find(|p| p.slug == "corrupt").unwrap();
        assert!(corrupt.html.contains("<body></body>"));
    }

    /// Lists a slug that then cannot be loaded, as when a page is deleted mid-build.
    struct VanishingStore {
        inner: MemoryPageStore,
    }

    #[async_trait]
    impl PageStore for VanishingStore {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<PageRow>, AppError> {
            self.inner.find_by_id(id).await
        }
        async fn find_by_slug(&self, slug: &str) -> Result<Option<PageRow>, AppError> {
            if slug == "ghost" {
                return Err(AppError::Database(sqlx::Error::PoolTimedOut));
            }
            self.inner.find_by_slug(slug).await
        }
        async fn list_published_slugs(&self, limit: i64) -> Result<Vec<String>, AppError> {
            let mut slugs = vec!["ghost".to_string()];
            slugs.extend(self.inner.list_published_slugs(limit).await?);
            Ok(slugs)
        }
        async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<PageRow>, AppError> {
            self.inner.list_by_owner(user_id).await
        }
        async fn create(&self, page: &NewPage) -> Result<PageRow, AppError> {
            self.inner.create(page).await
        }
        async fn update_metadata(
            &self,
            id: Uuid,
            user_id: Uuid,
            update: &PageMetadataUpdate,
        ) -> Result<Option<PageRow>, AppError> {
            self.inner.update_metadata(id, user_id, update).await
        }
        async fn set_published(
            &self,
            id: Uuid,
            user_id: Uuid,
            published: bool,
        ) -> Result<Option<PageRow>, AppError> {
            self.inner.set_published(id, user_id, published).await
        }
        async fn save_layout(
            &self,
            id: Uuid,
            user_id: Uuid,
            layout: Option<&Value>,
        ) -> Result<Option<PageRow>, AppError> {
            self.inner.save_layout(id, user_id, layout).await
        }
        async fn increment_view_count(&self, id: Uuid) -> Result<(), AppError> {
            self.inner.increment_view_count(id).await
        }
    }

    #[tokio::test]
    async fn test_prerender_skips_failures_and_continues() {
        let inner = MemoryPageStore::new();
        inner.insert_row(page_row("real", true, None)).await;
        let resolver = PageResolver::new(Arc::new(VanishingStore { inner }));

        let pages = prerender_published(&resolver, 10).await;
        let slugs: Vec<&str> = pages.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["real"]);
    }

    #[tokio::test]
    async fn test_warm_cache_fills_cache() {
        let store = store_with(vec![
            page_row("a", true, None),
            page_row("b", true, None),
            page_row("hidden", false, None),
        ])
        .await;
        let resolver = PageResolver::new(store);
        let cache = RenderCache::new();

        assert_eq!(warm_cache(&resolver, &cache, 10).await, 2);
        assert!(cache.get("a").await.is_some());
        assert!(cache.get("hidden").await.is_none());
    }
}
