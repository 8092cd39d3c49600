//! docsearch - Document ingestion and hybrid retrieval service
//!
//! Indexes text documents into OpenSearch and serves four retrieval modes
//! over HTTP: vector, BM25 keyword, engine-native hybrid, and vector + BM25
//! candidates reranked by a cross-encoder.

pub mod api;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod retrieval;
pub mod server;
pub mod store;

pub use error::{DocsearchError, Result};
