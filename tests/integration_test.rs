//! Integration tests for the ingestion and retrieval pipeline.
//!
//! These tests run against an on-disk snapshot in a temp dir and replace
//! the embedding model with a deterministic keyword embedder, so no LLM
//! needs to be running.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use tower::ServiceExt;

use doc_rag::answer::{self, EMPTY_CORPUS_ANSWER};
use doc_rag::api;
use doc_rag::config::{ChunkingConfig, Config};
use doc_rag::corpus::snapshot::{DOCSTORE_BLOB, INDEX_BLOB};
use doc_rag::corpus::CorpusManager;
use doc_rag::error::IngestError;
use doc_rag::llm::{Embedder, Generator};
use doc_rag::models::{Retrieval, RetrievedChunk};
use doc_rag::parser::{DocumentParser, ParseError, PlainTextParser};
use doc_rag::state::AppState;
use doc_rag::storage::FsBlobStore;

const VOCAB: [&str; 4] = ["cell", "energy", "gene", "protein"];

/// Counts vocabulary words: one dimension per word.
struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn dimension(&self) -> usize {
        VOCAB.len()
    }

    async fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                VOCAB
                    .iter()
                    .map(|w| lower.split_whitespace().filter(|x| x == w).count() as f32)
                    .collect()
            })
            .collect())
    }
}

/// Parser for a scanned document: every page comes back empty.
struct ScannedPdfParser;

impl DocumentParser for ScannedPdfParser {
    fn parse(&self, _bytes: &[u8]) -> Result<Vec<String>, ParseError> {
        Ok(vec![String::new(), String::new(), String::new()])
    }
}

struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        Ok(format!("{} bytes of prompt", prompt.len()))
    }
}

fn open(dir: &std::path::Path) -> CorpusManager {
    let store = Arc::new(FsBlobStore::open(dir).unwrap());
    CorpusManager::open(store, Arc::new(KeywordEmbedder), ChunkingConfig::default()).unwrap()
}

fn hits(retrieval: Retrieval) -> Vec<RetrievedChunk> {
    match retrieval {
        Retrieval::Hits(h) => h,
        Retrieval::EmptyCorpus => panic!("expected hits"),
    }
}

/// A small biology "textbook": one page per topic.
fn biology_pages() -> Vec<u8> {
    [
        "cell cell cell membrane and cytoplasm",
        "energy energy ATP from mitochondria",
        "gene gene expression and regulation",
        "protein folding and protein structure",
        "cell energy budget",
    ]
    .join("\x0c")
    .into_bytes()
}

#[tokio::test]
async fn test_end_to_end_ingest_and_retrieve() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = open(dir.path());

    let report = corpus
        .ingest(&PlainTextParser, &biology_pages(), "biology.txt")
        .await
        .unwrap();
    assert_eq!(report.chunks, 5);

    let results = hits(corpus.retrieve("protein", 3).await.unwrap());
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].record.page, 4);
    assert_eq!(results[0].record.filename, "biology.txt");
    assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[tokio::test]
async fn test_knn_order_matches_hand_computed_distances() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = open(dir.path());
    corpus
        .ingest(&PlainTextParser, &biology_pages(), "biology.txt")
        .await
        .unwrap();

    // Query "cell energy" = [1, 1, 0, 0]. Page vectors and squared distances:
    //   p1 [3,0,0,0] -> 4+1 = 5
    //   p2 [0,2,0,0] -> 1+1 = 2
    //   p3 [0,0,2,0] -> 1+1+4 = 6
    //   p4 [0,0,0,2] -> 1+1+4 = 6
    //   p5 [1,1,0,0] -> 0
    let results = hits(corpus.retrieve("cell energy", 3).await.unwrap());
    let pages: Vec<usize> = results.iter().map(|r| r.record.page).collect();
    assert_eq!(pages, vec![5, 2, 1]);
    let distances: Vec<f32> = results.iter().map(|r| r.distance).collect();
    assert_eq!(distances, vec![0.0, 2.0, 5.0]);
}

#[tokio::test]
async fn test_snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let before = {
        let corpus = open(dir.path());
        corpus
            .ingest(&PlainTextParser, &biology_pages(), "biology.txt")
            .await
            .unwrap();
        corpus
            .ingest(&PlainTextParser, b"gene protein interplay", "extra.txt")
            .await
            .unwrap();
        corpus.retrieve("gene protein", 3).await.unwrap()
    };

    let reopened = open(dir.path());
    let after = reopened.retrieve("gene protein", 3).await.unwrap();
    assert_eq!(before, after);
    assert_eq!(reopened.stats().records, 6);
    assert_eq!(reopened.list_documents().len(), 2);
}

#[tokio::test]
async fn test_append_only_across_documents() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = open(dir.path());
    corpus
        .ingest(&PlainTextParser, &biology_pages(), "a.txt")
        .await
        .unwrap();
    corpus
        .ingest(&PlainTextParser, b"gene only", "b.txt")
        .await
        .unwrap();

    let docstore: Vec<serde_json::Value> =
        serde_json::from_slice(&std::fs::read(dir.path().join(DOCSTORE_BLOB)).unwrap()).unwrap();
    assert_eq!(docstore.len(), 6);
    assert!(docstore[..5].iter().all(|r| r["filename"] == "a.txt"));
    assert_eq!(docstore[5]["filename"], "b.txt");
    let pages: Vec<u64> = docstore[..5]
        .iter()
        .map(|r| r["page"].as_u64().unwrap())
        .collect();
    assert_eq!(pages, vec![1, 2, 3, 4, 5]);

    let stats = corpus.stats();
    assert_eq!(stats.vectors, stats.records);
}

#[tokio::test]
async fn test_scanned_document_is_rejected_without_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = open(dir.path());
    corpus
        .ingest(&PlainTextParser, b"cell notes", "notes.txt")
        .await
        .unwrap();
    let before = corpus.list_documents();

    let err = corpus
        .ingest(&ScannedPdfParser, b"%PDF-1.7", "scan.pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::NoExtractableText { .. }));
    assert_eq!(corpus.list_documents(), before);
}

#[tokio::test]
async fn test_clear_removes_everything() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = open(dir.path());
    corpus
        .ingest(&PlainTextParser, &biology_pages(), "biology.txt")
        .await
        .unwrap();
    assert!(dir.path().join(INDEX_BLOB).exists());

    corpus.clear_all().unwrap();
    assert!(corpus.list_documents().is_empty());
    assert_eq!(corpus.retrieve("cell", 3).await.unwrap(), Retrieval::EmptyCorpus);
    assert!(!dir.path().join(INDEX_BLOB).exists());
    assert!(!dir.path().join(DOCSTORE_BLOB).exists());

    // A restart after clearing starts empty too
    drop(corpus);
    let reopened = open(dir.path());
    assert_eq!(reopened.stats().records, 0);
}

#[tokio::test]
async fn test_answer_before_and_after_upload() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = open(dir.path());

    let reply = answer::answer(&corpus, &EchoGenerator, "What is a cell?", 3)
        .await
        .unwrap();
    assert_eq!(reply, EMPTY_CORPUS_ANSWER);

    corpus
        .ingest(&PlainTextParser, &biology_pages(), "biology.txt")
        .await
        .unwrap();
    let reply = answer::answer(&corpus, &EchoGenerator, "What is a cell?", 3)
        .await
        .unwrap();
    assert!(reply.ends_with("bytes of prompt"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_ingests_stay_aligned() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = Arc::new(open(dir.path()));

    let mut tasks = Vec::new();
    for i in 0..8 {
        let corpus = corpus.clone();
        tasks.push(tokio::spawn(async move {
            let text: String = (0..250).map(|w| format!("gene{i}_{w} ")).collect();
            corpus
                .ingest(&PlainTextParser, text.as_bytes(), &format!("doc{i}.txt"))
                .await
                .unwrap();
            corpus.retrieve("gene", 3).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let stats = corpus.stats();
    assert_eq!(stats.records, 8 * 3);
    assert_eq!(stats.vectors, stats.records);
    assert_eq!(stats.documents, 8);
    assert_eq!(stats.skipped_out_of_range, 0);

    // Each document's chunks are contiguous in the docstore
    let docstore: Vec<serde_json::Value> =
        serde_json::from_slice(&std::fs::read(dir.path().join(DOCSTORE_BLOB)).unwrap()).unwrap();
    for block in docstore.chunks(3) {
        assert!(block.iter().all(|r| r["filename"] == block[0]["filename"]));
    }
}

fn app(dir: &std::path::Path) -> axum::Router {
    let config = Config {
        data_dir: dir.to_path_buf(),
        ..Config::default()
    };
    let corpus = Arc::new(open(dir));
    api::router(AppState::from_parts(config, corpus, Arc::new(EchoGenerator)))
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn upload_request(filename: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--XBOUNDARY\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         {content}\r\n\
         --XBOUNDARY--\r\n"
    );
    Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
        .body(Body::from(body))
        .unwrap()
}

fn chat_request(question: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({ "question": question }).to_string()))
        .unwrap()
}

fn files_request(method: Method) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri("/files")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_http_routes_match_frontend_paths() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let (status, body) = send(&app, chat_request("What is a cell?")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], EMPTY_CORPUS_ANSWER);

    let (status, body) = send(&app, upload_request("notes.txt", "cell energy gene")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["filename"], "notes.txt");

    let (status, body) = send(&app, files_request(Method::GET)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["files"], serde_json::json!(["notes.txt"]));

    let (status, body) = send(&app, chat_request("What is a cell?")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["answer"].as_str().unwrap().ends_with("bytes of prompt"));

    let (status, _) = send(&app, files_request(Method::DELETE)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, files_request(Method::GET)).await;
    assert_eq!(body["files"], serde_json::json!([]));
}

#[tokio::test]
async fn test_stats_route_stays_under_api_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let stats = Request::builder().uri("/api/stats").body(Body::empty()).unwrap();
    let (status, body) = send(&app, stats).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"], 0);

    let old_path = Request::builder().uri("/api/files").body(Body::empty()).unwrap();
    let (status, _) = send(&app, old_path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
