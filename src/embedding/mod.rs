//! Embedding generation
//!
//! - `EmbeddingProvider` trait for abstraction over backends
//! - `FastEmbedProvider` for local embedding with fastembed models
mod provider;

pub use provider::{EmbeddingError, EmbeddingProvider, FastEmbedProvider};
