use clubrag_core::{RagError, RagResult};

/// A store position together with its distance to a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Row in the index, which is also the chunk's position in the document store.
    pub position: usize,
    /// Squared Euclidean distance to the query embedding.
    pub distance: f32,
}

/// Exact nearest-neighbour index over a dense, row-major embedding matrix.
///
/// Row `i` is the embedding of the chunk at store position `i`. The index is
/// never patched in place: any change to the store means building a new one.
/// Search is brute force, which is fine for tens to low hundreds of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    /// Build an index from one embedding per chunk.
    ///
    /// Fails when there are no rows, the vectors are zero-length, or the
    /// rows disagree on dimension.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> RagResult<Self> {
        let dimension = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| RagError::Embedding("cannot index zero vectors".to_string()))?;
        if dimension == 0 {
            return Err(RagError::Embedding(
                "embedding vectors must not be empty".to_string(),
            ));
        }

        let mut data = Vec::with_capacity(rows.len() * dimension);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dimension {
                return Err(RagError::Embedding(format!(
                    "embedding {i} has dimension {}, expected {dimension}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self { dimension, data })
    }

    /// Build an index from a flat row-major buffer.
    pub fn from_flat(dimension: usize, data: Vec<f32>) -> RagResult<Self> {
        if dimension == 0 || data.is_empty() || data.len() % dimension != 0 {
            return Err(RagError::Embedding(format!(
                "buffer of {} values is not a matrix with {dimension} columns",
                data.len()
            )));
        }
        Ok(Self { dimension, data })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    /// Always `false` for a constructed index; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Width of each row.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embedding stored at a row.
    pub fn row(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    /// The whole matrix, row-major.
    pub fn as_flat(&self) -> &[f32] {
        &self.data
    }

    /// The `k` rows closest to `query`, nearest first.
    ///
    /// Equal distances keep store order. `k == 0` yields nothing.
    pub fn nearest(&self, query: &[f32], k: usize) -> RagResult<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(RagError::Embedding(format!(
                "query embedding has dimension {}, index expects {}",
                query.len(),
                self.dimension
            )));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, row)| Neighbor {
                position,
                distance: squared_euclidean(query, row),
            })
            .collect();

        // `sort_by` is stable, so ties stay in store order.
        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(k);
        Ok(scored)
    }
}

/// Squared Euclidean distance. Both slices must have the same length.
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
