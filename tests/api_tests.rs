//! HTTP API tests against a server bound to an ephemeral port

mod common;

use common::{hit, FakeStore, Harness, DIMENSION};
use docsearch::api::create_router;
use serde_json::{json, Value};

async fn spawn(harness: &Harness) -> String {
    let app = create_router(harness.app_state());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn populated_store() -> FakeStore {
    FakeStore {
        vector_results: vec![hit("d1", 0, 0.9), hit("d2", 1, 0.8)],
        bm25_results: vec![hit("d1", 0, 8.0), hit("d3", 0, 4.0)],
        hybrid_results: vec![hit("d2", 1, 0.6)],
        ..FakeStore::default()
    }
}

#[tokio::test]
async fn test_health() {
    let harness = Harness::with_store(FakeStore::default());
    let base = spawn(&harness).await;

    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().contains_key("x-request-id"));

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_vector_search_response_shape() {
    let harness = Harness::with_store(populated_store());
    let base = spawn(&harness).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/search/vector", base))
        .json(&json!({ "query": "alpha", "top_k": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["doc_id"], "d1");
    assert_eq!(results[0]["chunk_index"], 0);
    assert!(results[0]["score"].is_number());
    assert_eq!(results[0]["payload"]["text"], "d1 chunk 0");
}

#[tokio::test]
async fn test_keyword_search_defaults_top_k() {
    let harness = Harness::with_store(populated_store());
    let base = spawn(&harness).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/search/keyword", base))
        .json(&json!({ "query": "alpha" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["results"][0]["score"], 1.0);
    assert_eq!(body["results"][1]["score"], 0.5);
    assert_eq!(harness.store.calls()[0].k, 5);
}

#[tokio::test]
async fn test_hybrid_reranked_endpoint() {
    let harness = Harness::with_store(populated_store());
    let base = spawn(&harness).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/search/hybrid-reranked", base))
        .json(&json!({ "query": "alpha", "top_k": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(harness.reranker.call_count(), 1);
    // d1 appears in both lists but is reranked once
    assert_eq!(harness.reranker.calls.lock().unwrap()[0].1.len(), 3);
}

#[tokio::test]
async fn test_native_hybrid_endpoint() {
    let harness = Harness::with_store(populated_store());
    let base = spawn(&harness).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/search/hybrid", base))
        .json(&json!({ "query": "alpha", "top_k": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["results"][0]["doc_id"], "d2");
    assert_eq!(harness.store.calls()[0].op, "hybrid");
}

#[tokio::test]
async fn test_empty_query_is_bad_request() {
    let harness = Harness::with_store(populated_store());
    let base = spawn(&harness).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/search/hybrid-reranked", base))
        .json(&json!({ "query": "   ", "top_k": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
    assert!(harness.store.calls().is_empty());
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let harness = Harness::with_store(FakeStore {
        fail_all: true,
        ..FakeStore::default()
    });
    let base = spawn(&harness).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/search/vector", base))
        .json(&json!({ "query": "alpha", "top_k": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);

    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_ingest_document() {
    let harness = Harness::with_store(FakeStore::default());
    let base = spawn(&harness).await;
    let client = reqwest::Client::new();

    let text = "word ".repeat(500);
    let resp = client
        .post(format!("{}/documents", base))
        .json(&json!({
            "doc_id": "manual",
            "text": text,
            "metadata": { "title": "Manual" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["doc_id"], "manual");
    assert_eq!(body["index_name"], "master_index");
    let count = body["chunks_indexed"].as_u64().unwrap() as usize;
    assert!(count >= 2);

    let store = &harness.store;
    assert_eq!(
        store.ensured.lock().unwrap().clone(),
        vec![("master_index".to_string(), DIMENSION)]
    );

    let indexed = store.indexed.lock().unwrap();
    assert_eq!(indexed.len(), count);
    for (i, chunk) in indexed.iter().enumerate() {
        assert_eq!(chunk.doc_id, "manual");
        assert_eq!(chunk.chunk_index as usize, i);
        assert_eq!(chunk.embedding.len(), DIMENSION);
        assert_eq!(chunk.metadata["title"], "Manual");
    }
}

#[tokio::test]
async fn test_ingest_blank_document_is_bad_request() {
    let harness = Harness::with_store(FakeStore::default());
    let base = spawn(&harness).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/documents", base))
        .json(&json!({ "text": "  \n  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert!(harness.store.indexed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_batch_ingest_applies_shared_index() {
    let harness = Harness::with_store(FakeStore::default());
    let base = spawn(&harness).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/documents/batch", base))
        .json(&json!({
            "index_name": "manuals",
            "documents": [
                { "doc_id": "a", "text": "first document" },
                { "doc_id": "b", "text": "second document", "index_name": "notes" }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total_chunks"], 2);
    assert_eq!(body["documents"][0]["index_name"], "manuals");
    assert_eq!(body["documents"][1]["index_name"], "notes");
}

#[tokio::test]
async fn test_malformed_search_body_is_bad_request() {
    let harness = Harness::with_store(populated_store());
    let base = spawn(&harness).await;
    let client = reqwest::Client::new();

    for body in [
        json!({ "query": "alpha", "top_k": -1 }),
        json!({ "top_k": 3 }),
    ] {
        let resp = client
            .post(format!("{}/search/vector", base))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    assert!(harness.store.calls().is_empty());
}

#[tokio::test]
async fn test_malformed_ingest_body_is_bad_request() {
    let harness = Harness::with_store(FakeStore::default());
    let base = spawn(&harness).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/documents", base))
        .json(&json!({ "doc_id": "no-text" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    let resp = client
        .post(format!("{}/documents/batch", base))
        .json(&json!({ "documents": "not a list" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}
