//! Document ingestion: chunk, embed and index text documents

mod chunker;
mod service;

pub use chunker::{FixedSizeChunker, TextChunk};
pub use service::{IngestError, IngestRequest, IngestResponse, IngestService};
