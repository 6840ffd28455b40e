//! Nearest-neighbour search over chunk embeddings.

pub mod vector;

pub use vector::{IndexError, VectorIndex};
