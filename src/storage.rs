//! Durable blob storage for the corpus snapshot.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Named-blob storage: read, write, delete.
pub trait BlobStore: Send + Sync {
    /// Returns `None` when the blob does not exist.
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError>;
    /// Deleting a missing blob is not an error.
    fn delete(&self, name: &str) -> Result<(), StorageError>;
}

/// Blobs as files in one directory. Writes go through a temp file and a
/// rename so a crash never leaves a half-written blob under the real name.
pub struct FsBlobStore {
    dir: PathBuf,
}

impl FsBlobStore {
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl BlobStore for FsBlobStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match std::fs::read(self.path(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                name: name.to_string(),
                source,
            }),
        }
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path(name);
        let tmp_path = self.dir.join(format!("{name}.tmp"));
        let write_err = |source| StorageError::Write {
            name: name.to_string(),
            source,
        };
        std::fs::write(&tmp_path, bytes).map_err(write_err)?;
        std::fs::rename(&tmp_path, &path).map_err(write_err)
    }

    fn delete(&self, name: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Delete {
                name: name.to_string(),
                source,
            }),
        }
    }
}

/// In-process blob store, used in tests and for throwaway corpora.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blobs.lock().contains_key(name)
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.blobs.lock().get(name).cloned())
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.blobs.lock().insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<(), StorageError> {
        self.blobs.lock().remove(name);
        Ok(())
    }
}
