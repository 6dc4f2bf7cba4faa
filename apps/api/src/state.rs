use std::sync::Arc;

use crate::config::Config;
use crate::pages::{PageResolver, PageStore, RenderCache};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable page persistence. Production: `PgPageStore`.
    pub store: Arc<dyn PageStore>,
    /// Resolver over the same store; every read path goes through it.
    pub resolver: PageResolver,
    /// Public HTML keyed by slug, warmed by the static pass.
    pub cache: RenderCache,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn PageStore>, config: Config) -> Self {
        Self {
            resolver: PageResolver::new(store.clone()),
            store,
            cache: RenderCache::new(),
            config,
        }
    }
}
