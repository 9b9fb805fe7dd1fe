//! HTTP boundary: the axum router the pipeline is invoked through.
//!
//! The surface is deliberately thin. Handlers pull the multipart form apart,
//! hand the upload to the shared [`Analyzer`], and serialize whatever comes
//! back; every pipeline error maps onto a status code and a
//! `{"error": {kind, message}}` body in [`error`].

mod error;
mod handlers;

pub use error::ApiError;

use crate::analyze::Analyzer;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

/// Build the service router.
pub fn router(analyzer: Arc<Analyzer>) -> Router {
    // Allow some slack above the upload ceiling for multipart framing; the
    // validator enforces the exact per-file limit.
    let body_limit = analyzer.config().max_upload_bytes + 64 * 1024;

    Router::new()
        .route("/api/v1/analyze", post(handlers::analyze))
        .route("/api/v1/extract-text", post(handlers::extract_text))
        .route("/api/v1/describe", post(handlers::describe))
        .route("/api/v1/query", post(handlers::query))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { analyzer })
}
