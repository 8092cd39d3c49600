//! Deterministic in-memory collaborators for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use docsearch::api::handlers::AppState;
use docsearch::config::Config;
use docsearch::embedding::{EmbeddingError, EmbeddingProvider};
use docsearch::retrieval::{RerankError, Reranker, SearchResult, SearchService};
use docsearch::server::{build_state, Collaborators};
use docsearch::store::{ChunkDocument, StoreError, VectorStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const DIMENSION: usize = 4;

/// Embeds text as a fixed-length vector derived from its byte length
#[derive(Default)]
pub struct FakeEmbedder {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EmbeddingError::GenerationError("model offline".to_string()));
        }
        Ok(vec![query.len() as f32; DIMENSION])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EmbeddingError::GenerationError("model offline".to_string()));
        }
        Ok(texts.iter().map(|t| vec![t.len() as f32; DIMENSION]).collect())
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

/// One recorded store call: (operation, index, k or chunk count, pipeline)
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCall {
    pub op: &'static str,
    pub index: String,
    pub k: usize,
    pub pipeline: Option<String>,
}

/// Returns canned result lists and records every call
#[derive(Default)]
pub struct FakeStore {
    pub vector_results: Vec<SearchResult>,
    pub bm25_results: Vec<SearchResult>,
    pub hybrid_results: Vec<SearchResult>,
    pub fail_hybrid: bool,
    pub fail_all: bool,
    pub calls: Mutex<Vec<StoreCall>>,
    pub indexed: Mutex<Vec<ChunkDocument>>,
    pub ensured: Mutex<Vec<(String, usize)>>,
}

impl FakeStore {
    fn record(&self, op: &'static str, index: &str, k: usize, pipeline: Option<&str>) {
        self.calls.lock().unwrap().push(StoreCall {
            op,
            index: index.to_string(),
            k,
            pipeline: pipeline.map(str::to_string),
        });
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail_all {
            return Err(StoreError::Http {
                status: 503,
                body: "cluster unavailable".to_string(),
            });
        }
        Ok(())
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }
}

fn take(results: &[SearchResult], k: usize) -> Vec<SearchResult> {
    results.iter().take(k).cloned().collect()
}

#[async_trait]
impl VectorStore for FakeStore {
    async fn similarity_search(
        &self,
        _vector: &[f32],
        index_name: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, StoreError> {
        self.record("similarity", index_name, k, None);
        self.check()?;
        Ok(take(&self.vector_results, k))
    }

    async fn bm25_search(
        &self,
        _query: &str,
        index_name: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, StoreError> {
        self.record("bm25", index_name, k, None);
        self.check()?;
        Ok(take(&self.bm25_results, k))
    }

    async fn hybrid_search_with_pipeline(
        &self,
        _query_text: &str,
        _query_vector: &[f32],
        index_name: &str,
        pipeline_name: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, StoreError> {
        self.record("hybrid", index_name, k, Some(pipeline_name));
        self.check()?;
        if self.fail_hybrid {
            return Err(StoreError::Http {
                status: 400,
                body: "pipeline not found".to_string(),
            });
        }
        Ok(take(&self.hybrid_results, k))
    }

    async fn ensure_index(&self, index_name: &str, dimension: usize) -> Result<(), StoreError> {
        self.check()?;
        self.ensured
            .lock()
            .unwrap()
            .push((index_name.to_string(), dimension));
        Ok(())
    }

    async fn index_chunks(
        &self,
        index_name: &str,
        chunks: Vec<ChunkDocument>,
    ) -> Result<usize, StoreError> {
        self.record("index", index_name, chunks.len(), None);
        self.check()?;
        let count = chunks.len();
        self.indexed.lock().unwrap().extend(chunks);
        Ok(count)
    }
}

/// Reverses the candidate order, scores by new rank and truncates to top_k
#[derive(Default)]
pub struct FakeReranker {
    pub fail: bool,
    pub calls: Mutex<Vec<(String, Vec<SearchResult>, usize)>>,
}

impl FakeReranker {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Reranker for FakeReranker {
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<SearchResult>,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, RerankError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), candidates.clone(), top_k));

        if self.fail {
            return Err(RerankError::RerankingError("cross-encoder crashed".to_string()));
        }

        let n = candidates.len() as f32;
        Ok(candidates
            .into_iter()
            .rev()
            .take(top_k)
            .enumerate()
            .map(|(rank, mut r)| {
                r.score = (n - rank as f32) / n;
                r
            })
            .collect())
    }
}

pub fn hit(doc_id: &str, chunk_index: u32, score: f32) -> SearchResult {
    SearchResult::new(doc_id, chunk_index, score)
        .with_field("text", format!("{} chunk {}", doc_id, chunk_index))
}

pub fn keys(results: &[SearchResult]) -> Vec<(String, u32)> {
    results.iter().map(|r| r.key()).collect()
}

pub struct Harness {
    pub embedder: Arc<FakeEmbedder>,
    pub store: Arc<FakeStore>,
    pub reranker: Arc<FakeReranker>,
    pub config: Config,
}

impl Harness {
    pub fn new(embedder: FakeEmbedder, store: FakeStore, reranker: FakeReranker) -> Self {
        Self {
            embedder: Arc::new(embedder),
            store: Arc::new(store),
            reranker: Arc::new(reranker),
            config: Config::default(),
        }
    }

    pub fn with_store(store: FakeStore) -> Self {
        Self::new(FakeEmbedder::default(), store, FakeReranker::default())
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            embedder: self.embedder.clone(),
            store: self.store.clone(),
            reranker: self.reranker.clone(),
        }
    }

    pub fn search_service(&self) -> SearchService {
        SearchService::new(
            self.embedder.clone(),
            self.store.clone(),
            self.reranker.clone(),
            self.config.search.clone(),
        )
    }

    pub fn app_state(&self) -> AppState {
        build_state(&self.config, self.collaborators()).expect("default config builds state")
    }
}
