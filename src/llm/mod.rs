//! Clients for the external embedding and generation models.

pub mod embeddings;
pub mod generate;

pub use embeddings::{Embedder, HttpEmbedder};
pub use generate::{Generator, HttpGenerator};
