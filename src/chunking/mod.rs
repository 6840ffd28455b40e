//! Document chunking: page texts in, provenance-tagged chunk records out.

pub mod window;

use crate::config::ChunkingConfig;
use crate::models::ChunkRecord;

/// Chunk a single page. `page` is the 1-based page number.
pub fn chunk_page(text: &str, filename: &str, page: usize, config: ChunkingConfig) -> Vec<ChunkRecord> {
    window::word_windows(text, config)
        .into_iter()
        .map(|text| ChunkRecord {
            text,
            filename: filename.to_string(),
            page,
        })
        .collect()
}

/// Chunk every page of a document, in page order.
/// Pages without extractable text contribute nothing.
pub fn chunk_document(pages: &[String], filename: &str, config: ChunkingConfig) -> Vec<ChunkRecord> {
    pages
        .iter()
        .enumerate()
        .flat_map(|(i, text)| chunk_page(text, filename, i + 1, config))
        .collect()
}
