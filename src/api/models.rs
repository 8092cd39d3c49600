//! Request and response bodies not shared with the library types.

use crate::ingest::{IngestRequest, IngestResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Body of `POST /documents/batch`
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchIngestRequest {
    /// Applied to every document that does not name its own index
    #[serde(default)]
    pub index_name: Option<String>,
    pub documents: Vec<IngestRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchIngestResponse {
    pub documents: Vec<IngestResponse>,
    pub total_chunks: usize,
}
