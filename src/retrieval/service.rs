//! Search orchestration over the embedding model, the vector store and the reranker

use crate::config::SearchConfig;
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::retrieval::{
    merge_candidates, normalize_by_max, RerankError, Reranker, SearchMode, SearchRequest,
    SearchResponse, SearchResult,
};
use crate::store::{StoreError, VectorStore};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Vector store request failed: {0}")]
    VectorStore(#[from] StoreError),

    #[error("Reranking failed: {0}")]
    Reranking(#[from] RerankError),
}

impl SearchError {
    /// Whether the caller sent a request that can never succeed
    pub fn is_client_error(&self) -> bool {
        matches!(self, SearchError::InvalidQuery(_))
    }
}

/// Number of candidates fetched per signal before reranking
///
/// `max(top_k * multiplier, min_candidates)`, e.g. `top_k = 5` gives 30 and
/// `top_k = 20` gives 60 with the default multiplier of 3 and floor of 30.
pub fn expanded_k(top_k: usize, multiplier: usize, min_candidates: usize) -> usize {
    top_k.saturating_mul(multiplier).max(min_candidates)
}

/// Search service exposing the four retrieval modes
///
/// Collaborators are injected; the service holds no state between requests.
pub struct SearchService {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    reranker: Arc<dyn Reranker>,
    config: SearchConfig,
}

impl SearchService {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        reranker: Arc<dyn Reranker>,
        config: SearchConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            reranker,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Dispatch a request to the selected mode
    pub async fn search(
        &self,
        mode: SearchMode,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchError> {
        match mode {
            SearchMode::Vector => self.vector_search(request).await,
            SearchMode::Keyword => self.keyword_search(request).await,
            SearchMode::Hybrid => self.hybrid_search_native(request).await,
            SearchMode::HybridReranked => self.hybrid_search_reranked(request).await,
        }
    }

    /// Pure vector similarity search
    pub async fn vector_search(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchError> {
        validate(request)?;

        tracing::info!(
            "Vector search: query='{}', top_k={}",
            request.query,
            request.top_k
        );

        let run = async {
            let query_vec = self.embedder.embed_query(&request.query).await?;
            let results = self
                .store
                .similarity_search(&query_vec, &self.config.index_name, request.top_k)
                .await?;

            tracing::info!("Vector search returned {} results", results.len());
            log_leading("result", &results, 5);

            Ok::<_, SearchError>(SearchResponse::from_results(results))
        };

        run.await
            .inspect_err(|e| tracing::error!("Vector search failed for '{}': {}", request.query, e))
    }

    /// BM25 keyword search with scores scaled by the best hit
    pub async fn keyword_search(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchError> {
        validate(request)?;

        tracing::info!(
            "Keyword search: query='{}', top_k={}",
            request.query,
            request.top_k
        );

        let run = async {
            let mut results = self
                .store
                .bm25_search(&request.query, &self.config.index_name, request.top_k)
                .await?;

            normalize_by_max(&mut results);

            tracing::info!("Keyword search returned {} results", results.len());
            log_leading("result", &results, 5);

            Ok::<_, SearchError>(SearchResponse::from_results(results))
        };

        run.await
            .inspect_err(|e| tracing::error!("Keyword search failed for '{}': {}", request.query, e))
    }

    /// Hybrid search delegated to the search engine's own pipeline
    pub async fn hybrid_search_native(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchError> {
        validate(request)?;

        tracing::info!(
            "Native hybrid search: query='{}', top_k={}, pipeline={}",
            request.query,
            request.top_k,
            self.config.hybrid_pipeline
        );

        let run = async {
            let query_vec = self.embedder.embed_query(&request.query).await?;

            let results = self
                .store
                .hybrid_search_with_pipeline(
                    &request.query,
                    &query_vec,
                    &self.config.index_name,
                    &self.config.hybrid_pipeline,
                    request.top_k,
                )
                .await?;

            tracing::info!("Native hybrid search returned {} results", results.len());
            log_leading("result", &results, 5);

            Ok::<_, SearchError>(SearchResponse::from_results(results))
        };

        run.await.inspect_err(|e| {
            tracing::error!("Native hybrid search failed for '{}': {}", request.query, e)
        })
    }

    /// Vector + BM25 candidates merged and reordered by the cross-encoder
    pub async fn hybrid_search_reranked(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchError> {
        validate(request)?;

        tracing::info!(
            "Reranked hybrid search: query='{}', top_k={}",
            request.query,
            request.top_k
        );

        self.rerank_pipeline(request).await.inspect_err(|e| {
            tracing::error!("Reranked hybrid search failed for '{}': {}", request.query, e)
        })
    }

    async fn rerank_pipeline(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let expanded_k = expanded_k(
            request.top_k,
            self.config.candidate_multiplier,
            self.config.min_candidates,
        );

        // Step 1: Vector candidates
        let query_vec = self.embedder.embed_query(&request.query).await?;
        let vector_results = self
            .store
            .similarity_search(&query_vec, &self.config.index_name, expanded_k)
            .await?;
        tracing::info!("Vector search: {} candidates", vector_results.len());
        log_leading("vector", &vector_results, 3);

        // Step 2: BM25 candidates
        let bm25_results = self
            .store
            .bm25_search(&request.query, &self.config.index_name, expanded_k)
            .await?;
        tracing::info!("BM25 search: {} candidates", bm25_results.len());
        log_leading("bm25", &bm25_results, 3);

        // Step 3: Merge, vector instance wins on duplicates
        let candidates = merge_candidates(vector_results, bm25_results);
        tracing::info!("Rerank candidates after deduplication: {}", candidates.len());

        if candidates.is_empty() {
            tracing::info!("No candidates, skipping rerank");
            return Ok(SearchResponse::empty());
        }

        // Step 4: Cross-encoder rerank down to the requested top_k
        let reranked = self
            .reranker
            .rerank(&request.query, candidates, request.top_k)
            .await?;

        tracing::info!("Reranked results: {}", reranked.len());
        log_leading("result", &reranked, 5);

        Ok(SearchResponse::from_results(reranked))
    }
}

fn validate(request: &SearchRequest) -> Result<(), SearchError> {
    if request.query.trim().is_empty() {
        return Err(SearchError::InvalidQuery(
            "Query text cannot be empty".to_string(),
        ));
    }

    if request.top_k == 0 {
        return Err(SearchError::InvalidQuery(
            "top_k must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn log_leading(label: &str, results: &[SearchResult], n: usize) {
    for (i, r) in results.iter().take(n).enumerate() {
        tracing::debug!(
            "  {}[{}]: doc_id={}, chunk={}, score={:.4}",
            label,
            i,
            r.doc_id,
            r.chunk_index,
            r.score
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expanded_k_floor() {
        assert_eq!(expanded_k(5, 3, 30), 30);
        assert_eq!(expanded_k(10, 3, 30), 30);
    }

    #[test]
    fn test_expanded_k_multiplier() {
        assert_eq!(expanded_k(20, 3, 30), 60);
        assert_eq!(expanded_k(11, 3, 30), 33);
    }

    #[test]
    fn test_expanded_k_saturates() {
        assert_eq!(expanded_k(usize::MAX, 3, 30), usize::MAX);
    }

    #[test]
    fn test_validate_rejects_empty_query() {
        let err = validate(&SearchRequest::new("   ", 3)).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_validate_rejects_zero_top_k() {
        let err = validate(&SearchRequest::new("alpha", 0)).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_collaborator_errors_are_server_errors() {
        let err = SearchError::from(StoreError::MalformedResponse("x".to_string()));
        assert!(!err.is_client_error());
    }
}
