//! Paired on-disk snapshot of the vector index and the docstore.
//!
//! Both halves are JSON. The index blob is written first and the docstore
//! second; there is no transaction spanning the two writes.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::docstore::Docstore;
use crate::error::StorageError;
use crate::models::ChunkRecord;
use crate::search::VectorIndex;
use crate::storage::BlobStore;

pub const INDEX_BLOB: &str = "corpus.index";
pub const DOCSTORE_BLOB: &str = "docstore.json";

#[derive(Serialize)]
struct IndexBlobRef<'a> {
    dimension: usize,
    vectors: Vec<&'a [f32]>,
}

#[derive(Deserialize)]
struct IndexBlob {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

/// Write both halves of the snapshot.
pub fn save(store: &dyn BlobStore, index: &VectorIndex, docstore: &Docstore) -> Result<(), StorageError> {
    let index_bytes = serde_json::to_vec(&IndexBlobRef {
        dimension: index.dimension(),
        vectors: index.vectors().collect(),
    })
    .map_err(|source| StorageError::Encode {
        name: INDEX_BLOB.to_string(),
        source,
    })?;
    let docstore_bytes =
        serde_json::to_vec(docstore.records()).map_err(|source| StorageError::Encode {
            name: DOCSTORE_BLOB.to_string(),
            source,
        })?;

    store.write(INDEX_BLOB, &index_bytes)?;
    store.write(DOCSTORE_BLOB, &docstore_bytes)?;
    Ok(())
}

/// Load a previously saved snapshot.
///
/// Returns `Ok(None)` when there is no complete snapshot. A stored index whose
/// dimension differs from `dimension` is an error: the embedder changed and
/// the stored vectors are meaningless to it.
pub fn load(store: &dyn BlobStore, dimension: usize) -> anyhow::Result<Option<(VectorIndex, Docstore)>> {
    let (index_bytes, docstore_bytes) = match (store.read(INDEX_BLOB)?, store.read(DOCSTORE_BLOB)?) {
        (Some(i), Some(d)) => (i, d),
        (None, None) => return Ok(None),
        (Some(_), None) | (None, Some(_)) => {
            tracing::warn!(
                "Incomplete snapshot ({INDEX_BLOB} and {DOCSTORE_BLOB} must both exist), starting empty"
            );
            return Ok(None);
        }
    };

    let blob: IndexBlob =
        serde_json::from_slice(&index_bytes).with_context(|| format!("Failed to decode {INDEX_BLOB}"))?;
    if blob.dimension != dimension {
        anyhow::bail!(
            "Stored index has dimension {} but the embedder produces {dimension}; clear the corpus or restore the original embedding model",
            blob.dimension
        );
    }
    let index = VectorIndex::from_vectors(dimension, &blob.vectors)
        .with_context(|| format!("Corrupt {INDEX_BLOB}"))?;

    let records: Vec<ChunkRecord> = serde_json::from_slice(&docstore_bytes)
        .with_context(|| format!("Failed to decode {DOCSTORE_BLOB}"))?;

    if index.len() != records.len() {
        tracing::warn!(
            "Snapshot is out of sync: {} vectors but {} chunk records",
            index.len(),
            records.len()
        );
    }

    Ok(Some((index, Docstore::from_records(records))))
}

/// Remove both halves of the snapshot, if present.
pub fn delete(store: &dyn BlobStore) -> Result<(), StorageError> {
    store.delete(INDEX_BLOB)?;
    store.delete(DOCSTORE_BLOB)?;
    Ok(())
}
