//! Embedding Provider Boundary
//!
//! The classifier depends on embedding computation only through the
//! [`EmbeddingProvider`] trait: token ids and attention mask in, a
//! fixed-dimension vector out. A provider must fail with an explicit
//! inference error rather than silently return zeros.
//!
//! [`LookupEmbedder`] is the bundled reference implementation: an
//! embedding-table lookup with masked mean pooling, loaded from a raw
//! little-endian f32 table. It keeps the engine self-contained for tests and
//! deployments without an external inference runtime.

use std::path::Path;

use crate::error::{ClassifierError, Result};

/// Contract between the classifier and the embedding computation
pub trait EmbeddingProvider: Send + Sync {
    /// Output vector dimensionality
    fn embedding_dim(&self) -> usize;

    /// Compute the embedding for a fixed-length token sequence.
    ///
    /// `ids` and `mask` have equal length; positions with `mask == 0` are
    /// padding and must not contribute to the output.
    fn embed(&self, ids: &[u32], mask: &[u8]) -> Result<Vec<f32>>;
}

/// Embedding-table lookup with masked mean pooling
#[derive(Debug)]
pub struct LookupEmbedder {
    /// Row-major `vocab_size x dim` table
    table: Vec<f32>,
    vocab_size: usize,
    dim: usize,
}

impl LookupEmbedder {
    /// Build an embedder from a raw little-endian f32 table
    pub fn from_bytes(bytes: &[u8], dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(ClassifierError::ModelDataCorrupt(
                "embedding table dimension must be non-zero".to_string(),
            ));
        }
        if bytes.len() % 4 != 0 {
            return Err(ClassifierError::ModelDataCorrupt(format!(
                "embedding table byte length {} is not a multiple of 4",
                bytes.len()
            )));
        }

        let table: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        if table.len() % dim != 0 {
            return Err(ClassifierError::ModelDataCorrupt(format!(
                "embedding table float count {} is not a multiple of dim {}",
                table.len(),
                dim
            )));
        }

        let vocab_size = table.len() / dim;
        Ok(Self {
            table,
            vocab_size,
            dim,
        })
    }

    /// Load an embedding table from a file
    pub fn load(path: &Path, dim: usize) -> Result<Self> {
        let bytes = ClassifierError::read_file(path)?;
        Self::from_bytes(&bytes, dim)
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn row(&self, id: u32) -> Result<&[f32]> {
        let idx = id as usize;
        if idx >= self.vocab_size {
            return Err(ClassifierError::InferenceFailure(format!(
                "token id {} outside embedding table of {} rows",
                id, self.vocab_size
            )));
        }
        Ok(&self.table[idx * self.dim..(idx + 1) * self.dim])
    }
}

impl EmbeddingProvider for LookupEmbedder {
    fn embedding_dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, ids: &[u32], mask: &[u8]) -> Result<Vec<f32>> {
        if ids.len() != mask.len() {
            return Err(ClassifierError::InferenceFailure(format!(
                "id/mask length mismatch: {} vs {}",
                ids.len(),
                mask.len()
            )));
        }

        let mut pooled = vec![0.0f32; self.dim];
        let mut real = 0usize;

        for (&id, &m) in ids.iter().zip(mask) {
            if m == 0 {
                continue;
            }
            let row = self.row(id)?;
            for (acc, &v) in pooled.iter_mut().zip(row) {
                *acc += v;
            }
            real += 1;
        }

        if real == 0 {
            // The tokenizer guarantees at least one real token; a fully
            // padded sequence means the caller bypassed it.
            return Err(ClassifierError::InferenceFailure(
                "attention mask has no real positions".to_string(),
            ));
        }

        let inv = 1.0 / real as f32;
        for v in &mut pooled {
            *v *= inv;
        }

        Ok(pooled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_bytes(rows: &[[f32; 2]]) -> Vec<u8> {
        rows.iter()
            .flatten()
            .flat_map(|v| v.to_le_bytes())
            .collect()
    }

    #[test]
    fn test_mean_pooling_skips_padding() {
        let bytes = table_bytes(&[[0.0, 0.0], [2.0, 4.0], [4.0, 0.0]]);
        let embedder = LookupEmbedder::from_bytes(&bytes, 2).unwrap();

        let out = embedder.embed(&[1, 2, 0, 0], &[1, 1, 0, 0]).unwrap();
        assert_eq!(out, vec![3.0, 2.0]);
    }

    #[test]
    fn test_out_of_range_id_is_inference_failure() {
        let bytes = table_bytes(&[[1.0, 1.0]]);
        let embedder = LookupEmbedder::from_bytes(&bytes, 2).unwrap();

        let err = embedder.embed(&[7], &[1]).unwrap_err();
        assert!(matches!(err, ClassifierError::InferenceFailure(_)));
    }

    #[test]
    fn test_bad_table_length_rejected() {
        let bytes = table_bytes(&[[1.0, 2.0], [3.0, 4.0]]);
        // 4 floats cannot form rows of dim 3
        let err = LookupEmbedder::from_bytes(&bytes, 3).unwrap_err();
        assert!(matches!(err, ClassifierError::ModelDataCorrupt(_)));
    }

    #[test]
    fn test_all_padding_rejected() {
        let bytes = table_bytes(&[[1.0, 2.0]]);
        let embedder = LookupEmbedder::from_bytes(&bytes, 2).unwrap();
        let err = embedder.embed(&[0, 0], &[0, 0]).unwrap_err();
        assert!(matches!(err, ClassifierError::InferenceFailure(_)));
    }

    #[test]
    fn test_dim_reported() {
        let bytes = table_bytes(&[[1.0, 2.0]]);
        let embedder = LookupEmbedder::from_bytes(&bytes, 2).unwrap();
        assert_eq!(embedder.embedding_dim(), 2);
        assert_eq!(embedder.vocab_size(), 1);
    }
}
