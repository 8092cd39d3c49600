/// Embedding provider trait and FastEmbed implementation
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Model initialization failed: {0}")]
    InitializationError(String),

    #[error("Embedding generation failed: {0}")]
    GenerationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Trait for embedding providers
///
/// Allows abstraction over different embedding backends (FastEmbed, remote APIs, test doubles)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate the embedding of a search query
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Generate embeddings for document chunks (batched for efficiency)
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// FastEmbed provider for local embedding generation
///
/// Models are downloaded on first use to the fastembed cache directory.
/// The multilingual E5 models use asymmetric prefixes: queries are embedded
/// as `"query: ..."` and chunks as `"passage: ..."`.
pub struct FastEmbedProvider {
    model: Arc<TextEmbedding>,
    model_name: String,
    dimension: usize,
    batch_size: usize,
    prefixed: bool,
}

impl FastEmbedProvider {
    /// Create a new FastEmbed provider with the specified model
    ///
    /// Supported models:
    /// - all-MiniLM-L6-v2 (384 dims)
    /// - bge-small-en-v1.5 (384 dims)
    /// - bge-base-en-v1.5 (768 dims)
    /// - multilingual-e5-small (384 dims)
    /// - multilingual-e5-base (768 dims)
    pub fn new(model_name: &str, batch_size: usize) -> Result<Self, EmbeddingError> {
        let (embedding_model, dimension, prefixed) = match model_name {
            "all-MiniLM-L6-v2" | "all-minilm-l6-v2" => (EmbeddingModel::AllMiniLML6V2, 384, false),
            "bge-small-en-v1.5" => (EmbeddingModel::BGESmallENV15, 384, false),
            "bge-base-en-v1.5" => (EmbeddingModel::BGEBaseENV15, 768, false),
            "multilingual-e5-small" => (EmbeddingModel::MultilingualE5Small, 384, true),
            "multilingual-e5-base" => (EmbeddingModel::MultilingualE5Base, 768, true),
            _ => {
                return Err(EmbeddingError::InitializationError(format!(
                    "Unsupported model: {}. Supported: all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5, \
                     multilingual-e5-small, multilingual-e5-base",
                    model_name
                )));
            }
        };

        if batch_size == 0 {
            return Err(EmbeddingError::InitializationError(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        tracing::info!(
            "Initializing embedding model: {} ({}D, downloaded if not cached)",
            model_name,
            dimension
        );

        let init_options = InitOptions::new(embedding_model).with_show_download_progress(true);

        let model = TextEmbedding::try_new(init_options)
            .map_err(|e| EmbeddingError::InitializationError(e.to_string()))?;

        Ok(Self {
            model: Arc::new(model),
            model_name: model_name.to_string(),
            dimension,
            batch_size,
            prefixed,
        })
    }

    /// Create provider with default model (multilingual-e5-small)
    pub fn with_default_model() -> Result<Self, EmbeddingError> {
        Self::new("multilingual-e5-small", 32)
    }

    fn with_prefix(&self, prefix: &str, text: &str) -> String {
        if self.prefixed {
            format!("{}: {}", prefix, text)
        } else {
            text.to_string()
        }
    }

    async fn run(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let model = Arc::clone(&self.model);
        let batch_size = self.batch_size;

        let embeddings = tokio::task::spawn_blocking(move || model.embed(texts, Some(batch_size)))
            .await
            .map_err(|e| EmbeddingError::GenerationError(format!("Embedding task failed: {}", e)))?
            .map_err(|e| EmbeddingError::GenerationError(e.to_string()))?;

        // Verify all dimensions
        for embedding in &embeddings {
            if embedding.len() != self.dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.len(),
                });
            }
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, EmbeddingError> {
        if query.is_empty() {
            return Err(EmbeddingError::InvalidInput("Empty text".to_string()));
        }

        let mut embeddings = self.run(vec![self.with_prefix("query", query)]).await?;

        embeddings.pop().ok_or_else(|| {
            EmbeddingError::GenerationError("No embeddings generated".to_string())
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        if texts.iter().any(|t| t.is_empty()) {
            return Err(EmbeddingError::InvalidInput(
                "Cannot embed empty text".to_string(),
            ));
        }

        let inputs: Vec<String> = texts
            .iter()
            .map(|t| self.with_prefix("passage", t))
            .collect();

        let embeddings = self.run(inputs).await?;

        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::GenerationError(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
