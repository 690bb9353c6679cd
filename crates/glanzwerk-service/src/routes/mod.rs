use axum::{Router, routing::get};

use crate::AppState;

pub mod admin;
pub mod blog;

async fn health() -> &'static str {
    "OK"
}

pub fn create_router<S: AppState>() -> Router<S> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/blog", blog::create_blog_router())
        .nest("/api/admin", admin::create_admin_router())
}
