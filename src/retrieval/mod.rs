//! Retrieval: vector, keyword and hybrid search
//!
//! Ranking itself is done by the search engine and the cross-encoder; this
//! module sequences those calls, merges and deduplicates candidates and
//! normalizes keyword scores into one response shape.

mod deduplication;
mod normalization;
mod reranker;
mod result;
mod service;

pub use deduplication::{deduplicate_results, merge_candidates};
pub use normalization::normalize_by_max;
pub use reranker::{FastEmbedReranker, RerankError, Reranker};
pub use result::{ChunkKey, SearchRequest, SearchResponse, SearchResult};
pub use service::{expanded_k, SearchError, SearchService};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Retrieval strategy selected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    Vector,
    Keyword,
    Hybrid,
    HybridReranked,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Vector => "vector",
            SearchMode::Keyword => "keyword",
            SearchMode::Hybrid => "hybrid",
            SearchMode::HybridReranked => "hybrid-reranked",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vector" => Ok(SearchMode::Vector),
            "keyword" | "bm25" => Ok(SearchMode::Keyword),
            "hybrid" => Ok(SearchMode::Hybrid),
            "hybrid-reranked" | "reranked" => Ok(SearchMode::HybridReranked),
            other => Err(format!(
                "Unknown search mode '{}'. Expected vector, keyword, hybrid or hybrid-reranked",
                other
            )),
        }
    }
}
