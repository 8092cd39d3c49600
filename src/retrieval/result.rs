//! Search request, result and response structures

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity of a retrievable chunk: `(doc_id, chunk_index)`
pub type ChunkKey = (String, u32);

/// Search query shared by every search mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query text
    pub query: String,

    /// Maximum number of results
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    5
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
        }
    }
}

/// A ranked chunk returned by the vector store or the reranker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Source document ID
    pub doc_id: String,

    /// Position of the chunk within its document
    pub chunk_index: u32,

    /// Relevance score; its scale depends on the component that produced it
    pub score: f32,

    /// Remaining stored fields of the chunk (text, file name, page, ...)
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl SearchResult {
    /// Create a scored result with an empty payload
    pub fn new(doc_id: impl Into<String>, chunk_index: u32, score: f32) -> Self {
        Self {
            doc_id: doc_id.into(),
            chunk_index,
            score,
            payload: Map::new(),
        }
    }

    /// Attach a payload field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Deduplication key of this chunk
    pub fn key(&self) -> ChunkKey {
        (self.doc_id.clone(), self.chunk_index)
    }

    /// String payload field, if present
    pub fn text_field(&self, field: &str) -> Option<&str> {
        self.payload.get(field).and_then(Value::as_str)
    }
}

/// Uniform response of every search mode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

impl SearchResponse {
    /// Wrap results, dropping any repeated `(doc_id, chunk_index)` after its first occurrence
    pub fn from_results(results: Vec<SearchResult>) -> Self {
        Self {
            results: super::deduplicate_results(results),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
