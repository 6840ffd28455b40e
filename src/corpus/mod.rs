//! The corpus: vector index plus aligned docstore, persisted as a pair.
//!
//! [`CorpusManager`] owns both halves behind a single lock. Ingest and clear
//! take the write lock for the whole append-and-persist step; retrieval and
//! listing take the read lock. Embedding runs before any lock is taken.

pub mod docstore;
pub mod snapshot;

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;

use crate::chunking;
use crate::config::ChunkingConfig;
use crate::error::{IngestError, StorageError};
use crate::llm::Embedder;
use crate::models::{Retrieval, RetrievedChunk};
use crate::parser::DocumentParser;
use crate::search::VectorIndex;
use crate::storage::BlobStore;
use docstore::Docstore;

struct Corpus {
    index: VectorIndex,
    docstore: Docstore,
}

/// What a successful ingest added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub filename: String,
    pub pages: usize,
    pub chunks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub vectors: usize,
    pub records: usize,
    pub documents: usize,
    /// Search hits dropped because they pointed past the end of the docstore.
    pub skipped_out_of_range: u64,
}

pub struct CorpusManager {
    corpus: RwLock<Corpus>,
    store: Arc<dyn BlobStore>,
    embedder: Arc<dyn Embedder>,
    chunking: ChunkingConfig,
    skipped_out_of_range: AtomicU64,
}

impl CorpusManager {
    /// Load the stored snapshot, or start empty when there is none.
    pub fn open(
        store: Arc<dyn BlobStore>,
        embedder: Arc<dyn Embedder>,
        chunking: ChunkingConfig,
    ) -> anyhow::Result<Self> {
        chunking.validate()?;
        let dimension = embedder.dimension();

        let corpus = match snapshot::load(store.as_ref(), dimension)
            .context("Failed to load corpus snapshot")?
        {
            Some((index, docstore)) => {
                tracing::info!(
                    "Loaded corpus snapshot: {} chunks from {} documents",
                    docstore.len(),
                    docstore.filenames().len()
                );
                Corpus { index, docstore }
            }
            None => {
                tracing::info!("No corpus snapshot found, starting empty (dimension {dimension})");
                Corpus {
                    index: VectorIndex::new(dimension),
                    docstore: Docstore::new(),
                }
            }
        };

        Ok(Self {
            corpus: RwLock::new(corpus),
            store,
            embedder,
            chunking,
            skipped_out_of_range: AtomicU64::new(0),
        })
    }

    /// Parse a document and ingest its pages.
    pub async fn ingest(
        &self,
        parser: &dyn DocumentParser,
        bytes: &[u8],
        filename: &str,
    ) -> Result<IngestReport, IngestError> {
        let pages = parser.parse(bytes).map_err(|e| IngestError::Parse {
            filename: filename.to_string(),
            message: e.to_string(),
        })?;
        self.ingest_pages(filename, &pages).await
    }

    /// Chunk, embed and append already-extracted page texts.
    ///
    /// Only a snapshot write failure ([`IngestError::Persist`]) leaves the
    /// corpus changed; the in-memory append is not rolled back in that case.
    pub async fn ingest_pages(&self, filename: &str, pages: &[String]) -> Result<IngestReport, IngestError> {
        let records = chunking::chunk_document(pages, filename, self.chunking);
        if records.is_empty() {
            return Err(IngestError::NoExtractableText {
                filename: filename.to_string(),
            });
        }

        let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
        let vectors = self
            .embedder
            .embed(&texts)
            .await
            .map_err(IngestError::Embedding)?;
        if vectors.len() != records.len() {
            return Err(IngestError::BatchSize {
                expected: records.len(),
                got: vectors.len(),
            });
        }

        let report = IngestReport {
            filename: filename.to_string(),
            pages: pages.len(),
            chunks: records.len(),
        };

        let mut corpus = self.corpus.write();
        corpus.index.add(&vectors)?;
        corpus.docstore.extend(records);

        if let Err(e) = snapshot::save(self.store.as_ref(), &corpus.index, &corpus.docstore) {
            tracing::error!("Ingested {filename} in memory but failed to persist the snapshot: {e}");
            return Err(e.into());
        }

        tracing::info!(
            "Ingested {filename}: {} chunks from {} pages ({} chunks total)",
            report.chunks,
            report.pages,
            corpus.docstore.len()
        );
        Ok(report)
    }

    /// Embed `query` and return up to `k` nearest chunks, closest first.
    pub async fn retrieve(&self, query: &str, k: usize) -> anyhow::Result<Retrieval> {
        let empty = self.corpus.read().index.is_empty();
        if empty {
            return Ok(Retrieval::EmptyCorpus);
        }

        let embedding = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .context("No embedding returned for query")?;

        let corpus = self.corpus.read();
        // Cleared while the query was being embedded
        if corpus.index.is_empty() {
            return Ok(Retrieval::EmptyCorpus);
        }

        let hits = corpus.index.search(&embedding, k)?;
        let mut results = Vec::with_capacity(hits.len());
        for (position, distance) in hits {
            match corpus.docstore.get(position) {
                Some(record) => results.push(RetrievedChunk {
                    record: record.clone(),
                    rank: results.len(),
                    distance,
                }),
                None => {
                    self.skipped_out_of_range.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        "Vector {position} has no chunk record (docstore holds {}); skipping",
                        corpus.docstore.len()
                    );
                }
            }
        }
        Ok(Retrieval::Hits(results))
    }

    /// Distinct filenames across the corpus.
    pub fn list_documents(&self) -> BTreeSet<String> {
        self.corpus.read().docstore.filenames()
    }

    /// Drop every vector and record and delete the stored snapshot.
    ///
    /// The in-memory reset happens even if deleting the snapshot fails.
    pub fn clear_all(&self) -> Result<(), StorageError> {
        let mut corpus = self.corpus.write();
        let cleared = corpus.docstore.len();
        corpus.index.reset();
        corpus.docstore.clear();
        snapshot::delete(self.store.as_ref())?;
        tracing::info!("Cleared corpus ({cleared} chunks removed)");
        Ok(())
    }

    /// Write the current state to storage. An empty corpus is not written,
    /// so a flush after [`CorpusManager::clear_all`] leaves storage empty.
    pub fn flush(&self) -> Result<(), StorageError> {
        let corpus = self.corpus.read();
        if corpus.index.is_empty() && corpus.docstore.is_empty() {
            return Ok(());
        }
        snapshot::save(self.store.as_ref(), &corpus.index, &corpus.docstore)
    }

    pub fn stats(&self) -> CorpusStats {
        let corpus = self.corpus.read();
        CorpusStats {
            vectors: corpus.index.len(),
            records: corpus.docstore.len(),
            documents: corpus.docstore.filenames().len(),
            skipped_out_of_range: self.skipped_out_of_range.load(Ordering::Relaxed),
        }
    }
}
