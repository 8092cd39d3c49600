//! OpenSearch REST client

use crate::config::OpenSearchConfig;
use crate::retrieval::SearchResult;
use crate::store::{ChunkDocument, StoreError, VectorStore};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::{json, Map, Value};

/// OpenSearch-backed vector store
///
/// Chunks are stored as `{doc_id, chunk_index, <text_field>, <vector_field>, ...metadata}`.
/// The vector field is never returned in search hits.
pub struct OpenSearchStore {
    client: Client,
    base_url: Url,
    credentials: Option<(String, String)>,
    vector_field: String,
    text_field: String,
}

impl std::fmt::Debug for OpenSearchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenSearchStore")
            .field("base_url", &self.base_url.as_str())
            .field("vector_field", &self.vector_field)
            .field("text_field", &self.text_field)
            .finish()
    }
}

impl OpenSearchStore {
    pub fn new(config: &OpenSearchConfig) -> Result<Self, StoreError> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", config.url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(config.url.clone()));
        }

        let credentials = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        };

        Ok(Self {
            client: Client::new(),
            base_url,
            credentials,
            vector_field: config.vector_field.clone(),
            text_field: config.text_field.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, pass)) => request.basic_auth(user, Some(pass)),
            None => request,
        }
    }

    fn knn_clause(&self, vector: &[f32], k: usize) -> Value {
        json!({ "knn": { self.vector_field.as_str(): { "vector": vector, "k": k } } })
    }

    fn match_clause(&self, query: &str) -> Value {
        json!({ "match": { self.text_field.as_str(): { "query": query } } })
    }

    fn search_body(&self, query: Value, k: usize) -> Value {
        json!({
            "size": k,
            "query": query,
            "_source": { "excludes": [self.vector_field.as_str()] }
        })
    }

    async fn search(
        &self,
        index_name: &str,
        body: Value,
        pipeline: Option<&str>,
    ) -> Result<Vec<SearchResult>, StoreError> {
        let mut url = self.url(&[index_name, "_search"])?;
        if let Some(pipeline) = pipeline {
            url.query_pairs_mut().append_pair("search_pipeline", pipeline);
        }

        let response = self
            .authorized(self.client.post(url))
            .json(&body)
            .send()
            .await?;
        let body = check_status(response).await?.json::<Value>().await?;

        parse_hits(&body)
    }
}

#[async_trait]
impl VectorStore for OpenSearchStore {
    async fn similarity_search(
        &self,
        vector: &[f32],
        index_name: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, StoreError> {
        let body = self.search_body(self.knn_clause(vector, k), k);
        self.search(index_name, body, None).await
    }

    async fn bm25_search(
        &self,
        query: &str,
        index_name: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, StoreError> {
        let body = self.search_body(self.match_clause(query), k);
        self.search(index_name, body, None).await
    }

    async fn hybrid_search_with_pipeline(
        &self,
        query_text: &str,
        query_vector: &[f32],
        index_name: &str,
        pipeline_name: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, StoreError> {
        let hybrid = json!({
            "hybrid": {
                "queries": [
                    self.match_clause(query_text),
                    self.knn_clause(query_vector, k),
                ]
            }
        });
        let body = self.search_body(hybrid, k);
        self.search(index_name, body, Some(pipeline_name)).await
    }

    async fn ensure_index(&self, index_name: &str, dimension: usize) -> Result<(), StoreError> {
        let url = self.url(&[index_name])?;

        let response = self.authorized(self.client.head(url.clone())).send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        if response.status() != StatusCode::NOT_FOUND {
            return check_status(response).await.map(|_| ());
        }

        tracing::info!(
            "Creating index '{}' ({}D vectors in '{}')",
            index_name,
            dimension,
            self.vector_field
        );

        let body = json!({
            "settings": { "index": { "knn": true } },
            "mappings": {
                "properties": {
                    "doc_id": { "type": "keyword" },
                    "chunk_index": { "type": "integer" },
                    self.text_field.as_str(): { "type": "text" },
                    self.vector_field.as_str(): {
                        "type": "knn_vector",
                        "dimension": dimension
                    }
                }
            }
        });

        let response = self
            .authorized(self.client.put(url))
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn index_chunks(
        &self,
        index_name: &str,
        chunks: Vec<ChunkDocument>,
    ) -> Result<usize, StoreError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let count = chunks.len();
        let mut payload = String::new();
        for chunk in chunks {
            let action = json!({
                "index": {
                    "_index": index_name,
                    "_id": format!("{}_{}", chunk.doc_id, chunk.chunk_index)
                }
            });
            payload.push_str(&action.to_string());
            payload.push('\n');
            payload.push_str(&self.chunk_source(chunk).to_string());
            payload.push('\n');
        }

        let mut url = self.url(&["_bulk"])?;
        url.query_pairs_mut().append_pair("refresh", "true");

        let response = self
            .authorized(self.client.post(url))
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(payload)
            .send()
            .await?;
        let body = check_status(response).await?.json::<Value>().await?;

        check_bulk_response(&body)?;
        Ok(count)
    }
}

impl OpenSearchStore {
    fn chunk_source(&self, chunk: ChunkDocument) -> Value {
        let mut source = chunk.metadata;
        source.insert("doc_id".to_string(), Value::from(chunk.doc_id));
        source.insert("chunk_index".to_string(), Value::from(chunk.chunk_index));
        source.insert(self.text_field.clone(), Value::from(chunk.text));
        source.insert(self.vector_field.clone(), json!(chunk.embedding));
        Value::Object(source)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Http {
        status: status.as_u16(),
        body,
    })
}

/// Convert the `hits.hits` array of a search response into results, keeping engine order
fn parse_hits(body: &Value) -> Result<Vec<SearchResult>, StoreError> {
    let hits = body
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .ok_or_else(|| StoreError::MalformedResponse("missing hits.hits".to_string()))?;

    hits.iter().map(parse_hit).collect()
}

fn parse_hit(hit: &Value) -> Result<SearchResult, StoreError> {
    let score = hit.get("_score").and_then(Value::as_f64).unwrap_or(0.0) as f32;

    let mut source: Map<String, Value> = match hit.get("_source") {
        Some(Value::Object(source)) => source.clone(),
        _ => {
            return Err(StoreError::MalformedResponse(
                "hit without _source".to_string(),
            ))
        }
    };

    let doc_id = match source.remove("doc_id") {
        Some(Value::String(id)) => id,
        Some(other) => other.to_string(),
        None => {
            return Err(StoreError::MalformedResponse(
                "hit without doc_id".to_string(),
            ))
        }
    };

    let chunk_index = source
        .remove("chunk_index")
        .and_then(|v| v.as_u64())
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            StoreError::MalformedResponse(format!("hit for {} without valid chunk_index", doc_id))
        })?;

    Ok(SearchResult {
        doc_id,
        chunk_index,
        score,
        payload: source,
    })
}

fn check_bulk_response(body: &Value) -> Result<(), StoreError> {
    if !body.get("errors").and_then(Value::as_bool).unwrap_or(false) {
        return Ok(());
    }

    let failures: Vec<&Value> = body
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("index"))
                .filter(|op| op.get("error").is_some())
                .collect()
        })
        .unwrap_or_default();

    let first_error = failures
        .first()
        .and_then(|op| op.pointer("/error/reason"))
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();

    Err(StoreError::BulkFailure {
        failed: failures.len(),
        first_error,
    })
}
