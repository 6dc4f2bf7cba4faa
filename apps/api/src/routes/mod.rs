pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::pages::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Pages API
        .route(
            "/api/v1/pages",
            get(handlers::handle_list_pages).post(handlers::handle_create_page),
        )
        .route(
            "/api/v1/pages/static-params",
            get(handlers::handle_static_params),
        )
        .route(
            "/api/v1/pages/slug/:slug",
            get(handlers::handle_get_page_by_slug),
        )
        .route(
            "/api/v1/pages/:id",
            get(handlers::handle_get_page).patch(handlers::handle_update_page),
        )
        .route("/api/v1/pages/:id/publish", post(handlers::handle_publish))
        .route("/api/v1/pages/:id/layout", put(handlers::handle_save_layout))
        .route("/api/v1/pages/:id/edits", post(handlers::handle_apply_edits))
        // Rendered pages
        .route("/p/:slug", get(handlers::handle_public_page))
        .route("/preview/:id", get(handlers::handle_preview))
        .route("/editor/:id", get(handlers::handle_editor))
        .with_state(state)
}
