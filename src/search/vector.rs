use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("vector {position} has dimension {got}, index expects {expected}")]
    Dimension {
        position: usize,
        got: usize,
        expected: usize,
    },
    #[error("vector {position} has a non-finite component at {component}")]
    NonFinite { position: usize, component: usize },
}

/// Exact nearest-neighbour index over fixed-dimension vectors.
///
/// Vectors are stored back to back in one buffer and searched by brute
/// force with squared Euclidean distance. Entries are append-only; the only
/// way to remove anything is [`VectorIndex::reset`].
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Build an index from previously stored vectors.
    pub fn from_vectors(dimension: usize, vectors: &[Vec<f32>]) -> Result<Self, IndexError> {
        let mut index = Self::new(dimension);
        index.add(vectors)?;
        Ok(index)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append a batch of vectors in order. Either the whole batch is added or
    /// nothing is. NaN and infinite components are rejected since they cannot
    /// be written to the JSON snapshot.
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<(), IndexError> {
        for (position, v) in vectors.iter().enumerate() {
            if v.len() != self.dimension {
                return Err(IndexError::Dimension {
                    position,
                    got: v.len(),
                    expected: self.dimension,
                });
            }
            if let Some(component) = v.iter().position(|x| !x.is_finite()) {
                return Err(IndexError::NonFinite {
                    position,
                    component,
                });
            }
        }

        self.data.reserve(vectors.len() * self.dimension);
        for v in vectors {
            self.data.extend_from_slice(v);
        }
        Ok(())
    }

    /// Drop every vector, keeping the dimension.
    pub fn reset(&mut self) {
        self.data = Vec::new();
    }

    /// Iterate stored vectors in insertion order.
    pub fn vectors(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimension.max(1))
    }

    /// Return up to `k` `(position, squared_distance)` pairs, closest first.
    /// Equal distances keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, IndexError> {
        if query.len() != self.dimension {
            return Err(IndexError::Dimension {
                position: 0,
                got: query.len(),
                expected: self.dimension,
            });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors()
            .enumerate()
            .map(|(i, v)| (i, squared_l2(query, v)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        Ok(scored)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
