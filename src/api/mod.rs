//! Axum HTTP handlers over the corpus.

pub mod chat;
pub mod documents;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::models::MessageResponse;
use crate::state::AppState;

/// All routes, without CORS; the binary adds that layer.
pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes();

    Router::new()
        .route("/", get(health))
        .route(
            "/upload",
            post(documents::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/chat", post(chat::chat))
        .route(
            "/files",
            get(documents::list_files).delete(documents::delete_files),
        )
        .route("/api/stats", get(documents::stats))
        .with_state(state)
}

/// GET / - Liveness check
async fn health() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Document RAG service is active".to_string(),
    })
}
