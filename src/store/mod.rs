//! Vector store client
//!
//! The search engine does the ranking work: kNN similarity, BM25 and its own
//! hybrid pipelines. This module only defines the contract the search
//! orchestrator and the ingestion path rely on, plus the OpenSearch client.

mod opensearch;

pub use opensearch::OpenSearchStore;

use crate::retrieval::SearchResult;
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid search engine URL: {0}")]
    InvalidUrl(String),

    #[error("Request to search engine failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Search engine returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Malformed search engine response: {0}")]
    MalformedResponse(String),

    #[error("Bulk indexing reported {failed} failed items: {first_error}")]
    BulkFailure { failed: usize, first_error: String },
}

/// A chunk ready to be written to the index
#[derive(Debug, Clone)]
pub struct ChunkDocument {
    pub doc_id: String,
    pub chunk_index: u32,
    pub text: String,
    pub embedding: Vec<f32>,
    /// Extra fields stored alongside the chunk
    pub metadata: Map<String, Value>,
}

/// Search engine operations against a named index
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Nearest-neighbour search on the stored chunk embeddings
    async fn similarity_search(
        &self,
        vector: &[f32],
        index_name: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, StoreError>;

    /// BM25 keyword search on the stored chunk text
    async fn bm25_search(
        &self,
        query: &str,
        index_name: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, StoreError>;

    /// Engine-side hybrid search; weighting and fusion are done by `pipeline_name`
    async fn hybrid_search_with_pipeline(
        &self,
        query_text: &str,
        query_vector: &[f32],
        index_name: &str,
        pipeline_name: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, StoreError>;

    /// Create the index with a vector mapping of `dimension` if it does not exist
    async fn ensure_index(&self, index_name: &str, dimension: usize) -> Result<(), StoreError>;

    /// Write chunks to the index; returns the number written
    async fn index_chunks(
        &self,
        index_name: &str,
        chunks: Vec<ChunkDocument>,
    ) -> Result<usize, StoreError>;
}
