use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use crate::models::page::Page;
use crate::pages::store::PageStore;

const LOAD_FAILED: &str = "Failed to load page";

/// Uniform outcome of every page lookup: `{success, data?, error?}`.
///
/// Absence is `success: false` with no error text; only a persistence failure carries an
/// (always generic) `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Page>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageResult {
    pub fn found(page: Page) -> Self {
        Self {
            success: true,
            data: Some(page),
            error: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            success: false,
            data: None,
            error: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            data: None,
            error: Some(LOAD_FAILED.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_page(self) -> Option<Page> {
        self.data
    }
}

impl IntoResponse for PageResult {
    fn into_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else if self.is_failure() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::NOT_FOUND
        };
        (status, Json(self)).into_response()
    }
}

/// Loads pages and applies visibility rules. Never returns an error: every outcome is a
/// `PageResult` with an already-normalized layout.
#[derive(Clone)]
pub struct PageResolver {
    store: Arc<dyn PageStore>,
}

impl PageResolver {
    pub fn new(store: Arc<dyn PageStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn PageStore {
        self.store.as_ref()
    }

    /// Any publication state; used by the owner-facing editor and preview.
    pub async fn resolve_by_id(&self, id: Uuid) -> PageResult {
        match self.store.find_by_id(id).await {
            Ok(Some(row)) => PageResult::found(Page::from(row)),
            Ok(None) => PageResult::not_found(),
            Err(e) => {
                error!("Failed to load page {id}: {e}");
                PageResult::failed()
            }
        }
    }

    /// Succeeds only for published pages, or for drafts when `viewer` is the owner.
    /// Public routes pass `None`. A hidden draft is reported exactly like a missing slug.
    pub async fn resolve_by_slug(&self, slug: &str, viewer: Option<Uuid>) -> PageResult {
        match self.store.find_by_slug(slug).await {
            Ok(Some(row)) => {
                let page = Page::from(row);
                if page.is_visible_to(viewer) {
                    PageResult::found(page)
                } else {
                    PageResult::not_found()
                }
            }
            Ok(None) => PageResult::not_found(),
            Err(e) => {
                error!("Failed to load page by slug '{slug}': {e}");
                PageResult::failed()
            }
        }
    }
}
