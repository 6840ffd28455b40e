use std::collections::BTreeSet;

use crate::models::ChunkRecord;

/// Chunk metadata, positionally aligned with the vector index: the record at
/// position `i` describes the vector at position `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Docstore {
    records: Vec<ChunkRecord>,
}

impl Docstore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ChunkRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&ChunkRecord> {
        self.records.get(position)
    }

    pub fn records(&self) -> &[ChunkRecord] {
        &self.records
    }

    pub fn extend(&mut self, records: Vec<ChunkRecord>) {
        self.records.extend(records);
    }

    pub fn clear(&mut self) {
        self.records = Vec::new();
    }

    /// Distinct filenames across all records.
    pub fn filenames(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.filename.clone()).collect()
    }
}
