// Composition root: builds collaborators from configuration and runs the HTTP server

mod signals;

pub use signals::SignalHandler;

use crate::api::create_router;
use crate::api::handlers::AppState;
use crate::config::Config;
use crate::embedding::{EmbeddingProvider, FastEmbedProvider};
use crate::error::{DocsearchError, Result};
use crate::ingest::IngestService;
use crate::retrieval::{FastEmbedReranker, Reranker, SearchService};
use crate::store::{OpenSearchStore, VectorStore};
use anyhow::Context;
use std::sync::Arc;

/// The three external collaborators shared by search and ingestion
#[derive(Clone)]
pub struct Collaborators {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub store: Arc<dyn VectorStore>,
    pub reranker: Arc<dyn Reranker>,
}

impl Collaborators {
    /// Load the local models and connect the OpenSearch client
    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder = FastEmbedProvider::new(&config.embedding.model, config.embedding.batch_size)
            .with_context(|| {
                format!("Failed to load embedding model '{}'", config.embedding.model)
            })?;

        let reranker = FastEmbedReranker::new(&config.reranker.model, &config.opensearch.text_field)
            .with_context(|| {
                format!("Failed to load reranker model '{}'", config.reranker.model)
            })?;

        let store = OpenSearchStore::new(&config.opensearch)
            .with_context(|| {
                format!("Failed to create OpenSearch client for {}", config.opensearch.url)
            })?;

        tracing::info!(
            "Collaborators ready: embedding={}, reranker={}, opensearch={}",
            embedder.model_name(),
            reranker.model_name(),
            config.opensearch.url
        );

        Ok(Self {
            embedder: Arc::new(embedder),
            store: Arc::new(store),
            reranker: Arc::new(reranker),
        })
    }
}

/// Wire services over the given collaborators
pub fn build_state(config: &Config, collaborators: Collaborators) -> Result<AppState> {
    let search = SearchService::new(
        collaborators.embedder.clone(),
        collaborators.store.clone(),
        collaborators.reranker,
        config.search.clone(),
    );

    let ingest = IngestService::new(
        collaborators.embedder,
        collaborators.store,
        &config.ingest,
        config.search.index_name.clone(),
    )?;

    Ok(AppState {
        search: Arc::new(search),
        ingest: Arc::new(ingest),
    })
}

/// Serve the API on `bind_addr` until SIGTERM or SIGINT
pub async fn serve(state: AppState, bind_addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|e| DocsearchError::Io {
            source: e,
            context: format!("Failed to bind to {}", bind_addr),
        })?;

    tracing::info!("Listening on {}", bind_addr);

    let signals = SignalHandler::new()?;
    let shutdown = async move {
        let sig = signals.wait().await;
        tracing::info!("Shutting down ({})", sig);
    };

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| DocsearchError::Io {
            source: e,
            context: "HTTP server failed".to_string(),
        })?;

    tracing::info!("Server stopped");
    Ok(())
}
