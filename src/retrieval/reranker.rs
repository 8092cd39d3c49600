//! Cross-encoder reranking using FastEmbed

use crate::retrieval::SearchResult;
use async_trait::async_trait;
use fastembed::{RerankInitOptions, RerankerModel, TextRerank};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RerankError {
    #[error("Reranker initialization failed: {0}")]
    InitializationError(String),

    #[error("Reranking failed: {0}")]
    RerankingError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Reorders a candidate set by learned query/document relevance
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Score `candidates` against `query` and return at most `top_k` of them,
    /// best first, carrying the reranker's score
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<SearchResult>,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, RerankError>;
}

/// Cross-encoder reranker for improving result precision
pub struct FastEmbedReranker {
    model: Arc<TextRerank>,
    model_name: String,
    text_field: String,
}

impl FastEmbedReranker {
    /// Create a new reranker with specified model
    ///
    /// # Arguments
    /// * `model_name` - Model name (e.g., "BAAI/bge-reranker-v2-m3")
    /// * `text_field` - Payload field holding the chunk text to score
    pub fn new(model_name: &str, text_field: impl Into<String>) -> Result<Self, RerankError> {
        let reranker_model = match model_name {
            "BAAI/bge-reranker-base" | "bge-reranker-base" => RerankerModel::BGERerankerBase,
            "BAAI/bge-reranker-v2-m3" | "bge-reranker-v2-m3" => RerankerModel::BGERerankerV2M3,
            "jinaai/jina-reranker-v1-turbo-en" => RerankerModel::JINARerankerV1TurboEn,
            "jinaai/jina-reranker-v2-base-multilingual" => {
                RerankerModel::JINARerankerV2BaseMultiligual
            }
            _ => {
                return Err(RerankError::InitializationError(format!(
                    "Unsupported reranker model: {}. Supported: BAAI/bge-reranker-base, BAAI/bge-reranker-v2-m3, \
                     jinaai/jina-reranker-v1-turbo-en, jinaai/jina-reranker-v2-base-multilingual",
                    model_name
                )));
            }
        };

        tracing::info!("Initializing reranker model: {}", model_name);

        let init_options = RerankInitOptions::new(reranker_model).with_show_download_progress(true);

        let model = TextRerank::try_new(init_options)
            .map_err(|e| RerankError::InitializationError(e.to_string()))?;

        Ok(Self {
            model: Arc::new(model),
            model_name: model_name.to_string(),
            text_field: text_field.into(),
        })
    }

    /// Create reranker with default model
    pub fn with_default_model() -> Result<Self, RerankError> {
        Self::new("BAAI/bge-reranker-v2-m3", "text")
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[async_trait]
impl Reranker for FastEmbedReranker {
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<SearchResult>,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, RerankError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        if query.is_empty() {
            return Err(RerankError::InvalidInput(
                "Query cannot be empty".to_string(),
            ));
        }

        let texts: Vec<String> = candidates
            .iter()
            .map(|c| c.text_field(&self.text_field).unwrap_or_default().to_string())
            .collect();

        let model = Arc::clone(&self.model);
        let query = query.to_string();

        let results = tokio::task::spawn_blocking(move || {
            let documents: Vec<&str> = texts.iter().map(String::as_str).collect();
            model.rerank(query.as_str(), documents, false, None)
        })
        .await
        .map_err(|e| RerankError::RerankingError(format!("Reranking task failed: {}", e)))?
        .map_err(|e| RerankError::RerankingError(e.to_string()))?;

        let mut scored: Vec<(usize, f32)> =
            results.into_iter().map(|r| (r.index, r.score)).collect();

        // Sort by score descending
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        let mut slots: Vec<Option<SearchResult>> = candidates.into_iter().map(Some).collect();
        let reranked = scored
            .into_iter()
            .filter_map(|(idx, score)| {
                let mut result = slots.get_mut(idx)?.take()?;
                result.score = score;
                Some(result)
            })
            .collect();

        Ok(reranked)
    }
}
