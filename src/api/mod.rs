//! REST API layer built on Axum.
//!
//! Exposes the four search modes and document ingestion. Every request is
//! traced and tagged with an `x-request-id`.

/// API error types mapped to HTTP status codes.
pub mod errors;
/// HTTP request handlers and application state.
pub mod handlers;
/// Request and response data transfer objects.
pub mod models;

use axum::routing::{get, post};
use axum::{middleware, Router};
use handlers::AppState;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

async fn request_id_middleware(
    req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path()
    );
    async move {
        let mut response = next.run(req).await;
        if let Ok(value) = axum::http::HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(axum::http::HeaderName::from_static("x-request-id"), value);
        }
        response
    }
    .instrument(span)
    .await
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/search/vector", post(handlers::vector_search))
        .route("/search/keyword", post(handlers::keyword_search))
        .route("/search/hybrid", post(handlers::hybrid_search))
        .route(
            "/search/hybrid-reranked",
            post(handlers::hybrid_search_reranked),
        )
        .route("/documents", post(handlers::ingest_document))
        .route("/documents/batch", post(handlers::ingest_documents))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
