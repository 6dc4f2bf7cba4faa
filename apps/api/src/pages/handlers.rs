//! Axum route handlers for the Pages API and the rendered page routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::page::{NewPage, Page, PageMetadataUpdate};
use crate::pages::cache::CachedPage;
use crate::pages::editing::{self, EditOp};
use crate::pages::resolver::PageResult;
use crate::pages::static_gen::static_params;
use crate::render::read_only::html_document;
use crate::render::{
    render_not_found_html, render_page_html, render_palette, render_unavailable_html,
    BuiltinCatalog, EditorSession,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// Identity of the caller, supplied by the authenticating layer in front of this service.
#[derive(Debug, Deserialize)]
pub struct ViewerQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreatePageRequest {
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePageRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub update: PageMetadataUpdate,
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub user_id: Uuid,
    pub published: bool,
}

#[derive(Debug, Deserialize)]
pub struct SaveLayoutRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub layout: Value,
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub user_id: Uuid,
    pub ops: Vec<EditOp>,
}

// ────────────────────────────────────────────────────────────────────────────
// JSON API
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/pages
pub async fn handle_create_page(
    State(state): State<AppState>,
    Json(req): Json<CreatePageRequest>,
) -> Result<(StatusCode, Json<PageResult>), AppError> {
    let page = editing::create_page(
        state.store.as_ref(),
        NewPage {
            user_id: req.user_id,
            slug: req.slug.trim().to_string(),
            title: req.title,
            description: req.description,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(PageResult::found(page))))
}

/// GET /api/v1/pages?user_id=
pub async fn handle_list_pages(
    State(state): State<AppState>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<Vec<Page>>, AppError> {
    let rows = state.store.list_by_owner(params.user_id).await?;
    Ok(Json(rows.into_iter().map(Page::from).collect()))
}

/// GET /api/v1/pages/:id
///
/// Drafts are only returned to their owner; everyone else gets the not-found result.
pub async fn handle_get_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(viewer): Query<ViewerQuery>,
) -> PageResult {
    let result = state.resolver.resolve_by_id(id).await;
    match &result.data {
        Some(page) if !page.is_visible_to(viewer.user_id) => PageResult::not_found(),
        _ => result,
    }
}

/// GET /api/v1/pages/slug/:slug
pub async fn handle_get_page_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(viewer): Query<ViewerQuery>,
) -> PageResult {
    state.resolver.resolve_by_slug(&slug, viewer.user_id).await
}

/// PATCH /api/v1/pages/:id
pub async fn handle_update_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePageRequest>,
) -> Result<Json<PageResult>, AppError> {
    let page =
        editing::update_metadata(state.store.as_ref(), &state.cache, id, req.user_id, req.update)
            .await?;
    Ok(Json(PageResult::found(page)))
}

/// POST /api/v1/pages/:id/publish
pub async fn handle_publish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PublishRequest>,
) -> Result<Json<PageResult>, AppError> {
    let page =
        editing::set_published(state.store.as_ref(), &state.cache, id, req.user_id, req.published)
            .await?;
    Ok(Json(PageResult::found(page)))
}

/// PUT /api/v1/pages/:id/layout
pub async fn handle_save_layout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SaveLayoutRequest>,
) -> Result<Json<PageResult>, AppError> {
    let page =
        editing::save_layout(state.store.as_ref(), &state.cache, id, req.user_id, req.layout)
            .await?;
    Ok(Json(PageResult::found(page)))
}

/// POST /api/v1/pages/:id/edits
pub async fn handle_apply_edits(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditRequest>,
) -> Result<Json<PageResult>, AppError> {
    let page =
        editing::apply_edits(state.store.as_ref(), &state.cache, id, req.user_id, req.ops).await?;
    Ok(Json(PageResult::found(page)))
}

/// GET /api/v1/pages/static-params
pub async fn handle_static_params(State(state): State<AppState>) -> Json<Value> {
    let slugs = static_params(state.store.as_ref(), state.config.static_params_limit).await;
    Json(json!({ "slugs": slugs }))
}

// ────────────────────────────────────────────────────────────────────────────
// Rendered pages
// ────────────────────────────────────────────────────────────────────────────

fn not_found_page() -> Response {
    (StatusCode::NOT_FOUND, Html(render_not_found_html())).into_response()
}

fn unavailable_page() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(render_unavailable_html()),
    )
        .into_response()
}

async fn count_view(state: &AppState, page_id: Uuid) {
    if let Err(e) = state.store.increment_view_count(page_id).await {
        warn!("Failed to count view for page {page_id}: {e}");
    }
}

/// GET /p/:slug — public, read-only.
pub async fn handle_public_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    if let Some(cached) = state.cache.get(&slug).await {
        count_view(&state, cached.page_id).await;
        return Html(cached.html).into_response();
    }

    let seen = state.cache.epoch().await;
    let result = state.resolver.resolve_by_slug(&slug, None).await;
    if result.is_failure() {
        return unavailable_page();
    }
    let Some(page) = result.into_page() else {
        return not_found_page();
    };

    let html = render_page_html(&page);
    let cached = CachedPage {
        page_id: page.id,
        html: html.clone(),
    };
    if !state.cache.insert_if_current(slug.clone(), seen, cached).await {
        debug!("Not caching '{slug}': page changed while it was rendering");
    }
    count_view(&state, page.id).await;
    Html(html).into_response()
}

/// GET /preview/:id — read-only render of any page the viewer may see.
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(viewer): Query<ViewerQuery>,
) -> Response {
    let result = state.resolver.resolve_by_id(id).await;
    if result.is_failure() {
        return unavailable_page();
    }
    match result.into_page() {
        Some(page) if page.is_visible_to(viewer.user_id) => {
            Html(render_page_html(&page)).into_response()
        }
        _ => not_found_page(),
    }
}

/// GET /editor/:id — owner-only editor markup with node markers.
pub async fn handle_editor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(owner): Query<OwnerQuery>,
) -> Response {
    let result = state.resolver.resolve_by_id(id).await;
    if result.is_failure() {
        return unavailable_page();
    }
    match result.into_page() {
        Some(page) if page.user_id == owner.user_id => {
            let session = EditorSession::open(page.layout.as_ref(), &BuiltinCatalog);
            let canvas = if session.tree().is_empty() {
                "<p class=\"flow-empty\">Add a component from the palette to get started.</p>"
                    .to_string()
            } else {
                session.render()
            };
            let body = format!(
                "<main class=\"flow-editor\" data-page-id=\"{}\">{}{canvas}</main>",
                page.id,
                render_palette(),
            );
            Html(html_document("Editor", "", &body)).into_response()
        }
        _ => not_found_page(),
    }
}
