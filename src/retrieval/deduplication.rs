//! Result deduplication by `(doc_id, chunk_index)`

use crate::retrieval::{ChunkKey, SearchResult};
use ahash::AHashSet;

/// Deduplicate results by chunk key, keeping the first instance
///
/// # Arguments
/// * `results` - Ranked results potentially with duplicates
///
/// # Returns
/// Deduplicated results, maintaining input order
pub fn deduplicate_results(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen: AHashSet<ChunkKey> = AHashSet::with_capacity(results.len());

    results
        .into_iter()
        .filter(|result| seen.insert(result.key()))
        .collect()
}

/// Merge vector and BM25 candidates into one rerank candidate list
///
/// Vector results are taken first in their original order, then BM25 results.
/// A chunk present in both lists keeps its vector-search instance (score and
/// payload); the BM25 copy is dropped.
pub fn merge_candidates(
    vector_results: Vec<SearchResult>,
    bm25_results: Vec<SearchResult>,
) -> Vec<SearchResult> {
    let mut combined = Vec::with_capacity(vector_results.len() + bm25_results.len());
    let mut seen: AHashSet<ChunkKey> = AHashSet::with_capacity(combined.capacity());

    for result in vector_results.into_iter().chain(bm25_results) {
        if seen.insert(result.key()) {
            combined.push(result);
        }
    }

    combined
}
