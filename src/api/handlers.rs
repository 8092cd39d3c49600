//! HTTP request handlers and application state.

use crate::api::errors::ApiError;
use crate::api::models::{BatchIngestRequest, BatchIngestResponse, HealthResponse};
use crate::ingest::{IngestRequest, IngestResponse, IngestService};
use crate::retrieval::{SearchMode, SearchRequest, SearchResponse, SearchService};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;

/// Shared handler state; services are built once by the composition root
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    pub ingest: Arc<IngestService>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn run_search(
    state: &AppState,
    mode: SearchMode,
    req: SearchRequest,
) -> Result<Json<SearchResponse>, ApiError> {
    let response = state.search.search(mode, &req).await?;
    Ok(Json(response))
}

pub async fn vector_search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(req) = payload?;
    run_search(&state, SearchMode::Vector, req).await
}

pub async fn keyword_search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(req) = payload?;
    run_search(&state, SearchMode::Keyword, req).await
}

pub async fn hybrid_search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(req) = payload?;
    run_search(&state, SearchMode::Hybrid, req).await
}

pub async fn hybrid_search_reranked(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(req) = payload?;
    run_search(&state, SearchMode::HybridReranked, req).await
}

pub async fn ingest_document(
    State(state): State<AppState>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, ApiError> {
    let Json(req) = payload?;
    let response = state.ingest.ingest(req).await?;
    Ok(Json(response))
}

pub async fn ingest_documents(
    State(state): State<AppState>,
    payload: Result<Json<BatchIngestRequest>, JsonRejection>,
) -> Result<Json<BatchIngestResponse>, ApiError> {
    let Json(req) = payload?;
    let BatchIngestRequest {
        index_name,
        documents,
    } = req;

    let documents = documents
        .into_iter()
        .map(|mut doc| {
            if doc.index_name.is_none() {
                doc.index_name = index_name.clone();
            }
            doc
        })
        .collect();

    let responses = state.ingest.ingest_many(documents).await?;
    let total_chunks = responses.iter().map(|r| r.chunks_indexed).sum();

    Ok(Json(BatchIngestResponse {
        documents: responses,
        total_chunks,
    }))
}
