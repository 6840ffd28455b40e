use serde::{Deserialize, Serialize};

/// The atomic retrievable unit: one word window of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub text: String,
    pub filename: String,
    /// 1-based page number within the document.
    pub page: usize,
}

/// A chunk returned by retrieval, in ascending-distance order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
    pub record: ChunkRecord,
    /// 0-based rank, 0 being the closest match.
    pub rank: usize,
    /// Squared Euclidean distance to the query embedding.
    pub distance: f32,
}

/// Outcome of a retrieval request.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    /// Nothing has been ingested yet; no search was performed.
    EmptyCorpus,
    /// Matches in ascending-distance order. May hold fewer than `k` entries.
    Hits(Vec<RetrievedChunk>),
}

impl Retrieval {
    pub fn is_empty_corpus(&self) -> bool {
        matches!(self, Retrieval::EmptyCorpus)
    }
}

/// Chat request
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

/// Chat response
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// Upload outcome, mirroring what the frontend expects.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadResponse {
    Success { filename: String },
    Error { message: String },
}

/// Distinct filenames currently in the corpus
#[derive(Debug, Clone, Serialize)]
pub struct FilesResponse {
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
