use thiserror::Error;

use crate::search::IndexError;

/// Failures of blob I/O against durable storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read blob {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write blob {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to delete blob {name}: {source}")]
    Delete {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a document could not be ingested.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The parser found no usable text. The corpus is unchanged.
    #[error("no extractable text in {filename}")]
    NoExtractableText { filename: String },
    /// The document bytes could not be parsed. The corpus is unchanged.
    #[error("failed to parse {filename}: {message}")]
    Parse { filename: String, message: String },
    /// The embedder failed. The corpus is unchanged.
    #[error("embedding failed: {0:#}")]
    Embedding(anyhow::Error),
    /// The embedder returned a different number of vectors than texts.
    /// The corpus is unchanged.
    #[error("embedder returned {got} vectors for {expected} chunks")]
    BatchSize { expected: usize, got: usize },
    /// A vector did not match the index dimension. The corpus is unchanged.
    #[error(transparent)]
    Index(#[from] IndexError),
    /// The corpus was updated in memory but the snapshot write failed.
    #[error("corpus updated in memory but not persisted: {0}")]
    Persist(#[from] StorageError),
}

impl IngestError {
    /// True when the in-memory corpus was left untouched.
    pub fn corpus_unchanged(&self) -> bool {
        !matches!(self, IngestError::Persist(_))
    }
}
