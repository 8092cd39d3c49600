use crate::config::IngestConfig;
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::ingest::FixedSizeChunker;
use crate::store::{ChunkDocument, StoreError, VectorStore};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Invalid document: {0}")]
    InvalidInput(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Vector store request failed: {0}")]
    VectorStore(#[from] StoreError),
}

impl IngestError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, IngestError::InvalidInput(_))
    }
}

/// A plain-text document to index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Target index; the configured search index when absent
    #[serde(default)]
    pub index_name: Option<String>,

    /// Document ID; a random UUID when absent
    #[serde(default)]
    pub doc_id: Option<String>,

    pub text: String,

    /// Extra fields stored with every chunk (file name, title, ...)
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl IngestRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            index_name: None,
            doc_id: None,
            text: text.into(),
            metadata: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub doc_id: String,
    pub index_name: String,
    pub chunks_indexed: usize,
}

/// Chunks, embeds and writes documents to the vector store
pub struct IngestService {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    chunker: FixedSizeChunker,
    default_index: String,
}

impl IngestService {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        config: &IngestConfig,
        default_index: impl Into<String>,
    ) -> Result<Self, IngestError> {
        let chunker = FixedSizeChunker::new(config.chunk_size, config.chunk_overlap).ok_or_else(
            || {
                IngestError::InvalidInput(format!(
                    "Chunk overlap ({}) must be less than chunk size ({})",
                    config.chunk_overlap, config.chunk_size
                ))
            },
        )?;

        Ok(Self {
            embedder,
            store,
            chunker,
            default_index: default_index.into(),
        })
    }

    /// Index one document
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestResponse, IngestError> {
        let IngestRequest {
            index_name,
            doc_id,
            text,
            metadata,
        } = request;

        let index_name = match index_name {
            Some(name) if name.trim().is_empty() => {
                return Err(IngestError::InvalidInput(
                    "Index name cannot be empty".to_string(),
                ))
            }
            Some(name) => name,
            None => self.default_index.clone(),
        };
        let doc_id = doc_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let chunks = self.chunker.chunk(&text);
        if chunks.is_empty() {
            return Err(IngestError::InvalidInput(format!(
                "Document {} has no text",
                doc_id
            )));
        }

        tracing::info!(
            "Ingesting document {} into '{}' ({} chunks)",
            doc_id,
            index_name,
            chunks.len()
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        self.store
            .ensure_index(&index_name, self.embedder.dimension())
            .await?;

        let documents: Vec<ChunkDocument> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| ChunkDocument {
                doc_id: doc_id.clone(),
                chunk_index: chunk.index,
                text: chunk.text,
                embedding,
                metadata: metadata.clone(),
            })
            .collect();

        let chunks_indexed = self.store.index_chunks(&index_name, documents).await?;

        tracing::info!("Indexed {} chunks for document {}", chunks_indexed, doc_id);

        Ok(IngestResponse {
            doc_id,
            index_name,
            chunks_indexed,
        })
    }

    /// Index several documents in order, stopping at the first failure
    pub async fn ingest_many(
        &self,
        requests: Vec<IngestRequest>,
    ) -> Result<Vec<IngestResponse>, IngestError> {
        if requests.is_empty() {
            return Err(IngestError::InvalidInput(
                "No documents provided".to_string(),
            ));
        }

        let mut responses = Vec::with_capacity(requests.len());
        for request in requests {
            responses.push(self.ingest(request).await?);
        }
        Ok(responses)
    }
}
