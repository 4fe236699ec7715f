// Vector store module
// In-memory flat index over chunk embeddings with exact L2 nearest-neighbour search

#[cfg(test)]
mod tests;

use ndarray::{Array2, ArrayView1};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::embeddings::{Chunk, Embedder};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("The index is empty")]
    Empty,
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Embeddings must have at least one dimension")]
    ZeroDimension,
    #[error("Embedder returned {vectors} vectors for {texts} texts")]
    CountMismatch { texts: usize, vectors: usize },
}

/// A stored chunk and its identity in the index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorRecord {
    pub id: Uuid,
    pub text: String,
    pub chunk_index: usize,
    pub source: Option<String>,
    pub title: Option<String>,
}

/// A record returned from a search, nearest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub record: VectorRecord,
    /// Euclidean distance to the query vector
    pub distance: f32,
}

/// Flat L2 index. Vectors are rows of a single matrix; row `i` belongs to
/// `records[i]`. The dimension is fixed by the first vector added.
#[derive(Debug, Clone, Default)]
pub struct VectorStore {
    vectors: Option<Array2<f32>>,
    records: Vec<VectorRecord>,
}

impl VectorStore {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Embed every chunk and build an index over them
    #[inline]
    pub fn from_chunks<E>(chunks: &[Chunk], embedder: &E) -> crate::Result<Self>
    where
        E: Embedder + ?Sized,
    {
        if chunks.is_empty() {
            return Err(IndexError::Empty.into());
        }

        info!("Embedding {} chunks", chunks.len());

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = embedder.embed_documents(&texts)?;

        if vectors.len() != chunks.len() {
            return Err(IndexError::CountMismatch {
                texts: chunks.len(),
                vectors: vectors.len(),
            }
            .into());
        }

        let mut store = Self::new();
        for (chunk, vector) in chunks.iter().zip(vectors) {
            store.add(chunk, &vector)?;
        }

        info!(
            "Built index with {} vectors of dimension {}",
            store.len(),
            store.dimension().unwrap_or_default()
        );

        Ok(store)
    }

    /// Insert one chunk with its vector, returning the new record id
    #[inline]
    pub fn add(&mut self, chunk: &Chunk, vector: &[f32]) -> Result<Uuid, IndexError> {
        if vector.is_empty() {
            return Err(IndexError::ZeroDimension);
        }

        let matrix = self
            .vectors
            .get_or_insert_with(|| Array2::zeros((0, vector.len())));

        let expected = matrix.ncols();
        matrix
            .push_row(ArrayView1::from(vector))
            .map_err(|_| IndexError::DimensionMismatch {
                expected,
                actual: vector.len(),
            })?;

        let id = Uuid::new_v4();
        self.records.push(VectorRecord {
            id,
            text: chunk.text.clone(),
            chunk_index: chunk.index,
            source: chunk.source.clone(),
            title: chunk.title.clone(),
        });

        Ok(id)
    }

    /// The `k` records nearest to `query`, ascending by distance. Ties keep
    /// insertion order. Asking for more than the index holds returns all.
    #[inline]
    pub fn search_by_vector(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<SearchResult>, IndexError> {
        let Some(matrix) = self.vectors.as_ref().filter(|m| m.nrows() > 0) else {
            return Err(IndexError::Empty);
        };

        if query.len() != matrix.ncols() {
            return Err(IndexError::DimensionMismatch {
                expected: matrix.ncols(),
                actual: query.len(),
            });
        }

        if k == 0 {
            return Ok(Vec::new());
        }

        let query = ArrayView1::from(query);
        let mut scored: Vec<(usize, f32)> = matrix
            .rows()
            .into_iter()
            .enumerate()
            .map(|(row, vector)| {
                let diff = &vector - &query;
                (row, diff.dot(&diff).sqrt())
            })
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);

        debug!(
            "Search returned {} of {} records (k = {})",
            scored.len(),
            self.records.len(),
            k
        );

        Ok(scored
            .into_iter()
            .map(|(row, distance)| SearchResult {
                record: self.records[row].clone(),
                distance,
            })
            .collect())
    }

    /// Embed `query` and return its `k` nearest records
    #[inline]
    pub fn similarity_search<E>(
        &self,
        query: &str,
        embedder: &E,
        k: usize,
    ) -> crate::Result<Vec<SearchResult>>
    where
        E: Embedder + ?Sized,
    {
        if self.is_empty() {
            return Err(IndexError::Empty.into());
        }

        let vector = embedder.embed_query(query)?;
        Ok(self.search_by_vector(&vector, k)?)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Vector dimension, once the first vector has been added
    #[inline]
    pub fn dimension(&self) -> Option<usize> {
        self.vectors.as_ref().map(|matrix| matrix.ncols())
    }

    #[inline]
    pub fn records(&self) -> &[VectorRecord] {
        &self.records
    }
}
