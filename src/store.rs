//! Pattern Store
//!
//! The fixed corpus of labeled attack-pattern embeddings. Loaded once from a
//! raw vector blob plus JSON metadata, validated all-or-nothing, and never
//! mutated afterwards — corpus replacement builds a new store and swaps the
//! handle atomically.
//!
//! The [`NeighborSource`] trait is the seam between the ranked-neighbor
//! search and the voting arithmetic: the bundled implementation is an exact
//! brute-force cosine scan, and an externally-indexed store can implement the
//! same trait and feed the identical voting path.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::{ClassifierError, Result};
use crate::knn::cosine_similarity;
use crate::labels::{AttackLabel, PatternSource, Severity};

/// One labeled embedding in the corpus
#[derive(Debug, Clone)]
pub struct AttackPattern {
    pub embedding: Vec<f32>,
    pub label: AttackLabel,
    pub severity: Option<Severity>,
    pub source: PatternSource,
}

/// A ranked match for one query: pattern projection plus computed distance
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub label: AttackLabel,
    pub severity: Option<Severity>,
    /// Cosine distance, `1 - similarity`
    pub distance: f32,
    pub similarity: f32,
}

/// Ranked nearest-neighbor lookup over some pattern backend.
///
/// Implementations must return at most `k` neighbors in ascending distance
/// order. The voting and confidence arithmetic lives outside this trait so
/// all backends produce numerically identical verdicts.
pub trait NeighborSource: Send + Sync {
    fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}

/// Parallel-array metadata accompanying the vector blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusMetadata {
    pub labels: Vec<String>,
    #[serde(default)]
    pub severities: Vec<Option<String>>,
    pub num_vectors: usize,
    pub dim: usize,
}

impl CorpusMetadata {
    /// Load and parse a `labels.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = ClassifierError::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| ClassifierError::ModelDataCorrupt(format!("labels.json: {}", e)))
    }
}

/// Immutable in-memory corpus of attack patterns
#[derive(Debug)]
pub struct PatternStore {
    patterns: Vec<AttackPattern>,
    dim: usize,
}

impl PatternStore {
    /// Build a store from a raw little-endian f32 blob and its metadata.
    ///
    /// Fails with ModelDataCorrupt when the blob length is not an exact
    /// multiple of `dim`, when the vector count disagrees with
    /// `num_vectors`, or when the label array length mismatches. Partial
    /// loads are rejected: a store is either fully loaded or not at all.
    pub fn load(blob: &[u8], metadata: &CorpusMetadata) -> Result<Self> {
        if metadata.dim == 0 {
            return Err(ClassifierError::ModelDataCorrupt(
                "corpus dimension must be non-zero".to_string(),
            ));
        }
        if blob.len() % 4 != 0 {
            return Err(ClassifierError::ModelDataCorrupt(format!(
                "vector blob byte length {} is not a multiple of 4",
                blob.len()
            )));
        }

        let floats: Vec<f32> = blob
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        if floats.len() % metadata.dim != 0 {
            return Err(ClassifierError::ModelDataCorrupt(format!(
                "vector blob holds {} floats, not a multiple of dim {}",
                floats.len(),
                metadata.dim
            )));
        }

        let num_vectors = floats.len() / metadata.dim;
        if num_vectors != metadata.num_vectors {
            return Err(ClassifierError::ModelDataCorrupt(format!(
                "vector blob holds {} vectors but metadata declares {}",
                num_vectors, metadata.num_vectors
            )));
        }
        if metadata.labels.len() != metadata.num_vectors {
            return Err(ClassifierError::ModelDataCorrupt(format!(
                "metadata has {} labels for {} vectors",
                metadata.labels.len(),
                metadata.num_vectors
            )));
        }
        if !metadata.severities.is_empty() && metadata.severities.len() != metadata.num_vectors {
            return Err(ClassifierError::ModelDataCorrupt(format!(
                "metadata has {} severities for {} vectors",
                metadata.severities.len(),
                metadata.num_vectors
            )));
        }

        let mut patterns = Vec::with_capacity(num_vectors);
        for i in 0..num_vectors {
            let label = AttackLabel::from_str(&metadata.labels[i])
                .map_err(ClassifierError::ModelDataCorrupt)?;
            let severity = match metadata.severities.get(i).and_then(|s| s.as_deref()) {
                Some(raw) => {
                    Some(Severity::from_str(raw).map_err(ClassifierError::ModelDataCorrupt)?)
                }
                None => None,
            };
            patterns.push(AttackPattern {
                embedding: floats[i * metadata.dim..(i + 1) * metadata.dim].to_vec(),
                label,
                severity,
                source: PatternSource::Bundled,
            });
        }

        Ok(Self {
            patterns,
            dim: metadata.dim,
        })
    }

    /// Load a store from `vectors.bin` and `labels.json` files
    pub fn load_from_files(vectors_path: &Path, labels_path: &Path) -> Result<Self> {
        let metadata = CorpusMetadata::load(labels_path)?;
        let blob = ClassifierError::read_file(vectors_path)?;
        Self::load(&blob, &metadata)
    }

    /// Build a store directly from patterns (runtime-inserted corpora)
    pub fn from_patterns(patterns: Vec<AttackPattern>, dim: usize) -> Result<Self> {
        for (i, pattern) in patterns.iter().enumerate() {
            if pattern.embedding.len() != dim {
                return Err(ClassifierError::ModelDataCorrupt(format!(
                    "pattern {} has dimension {} but store expects {}",
                    i,
                    pattern.embedding.len(),
                    dim
                )));
            }
        }
        Ok(Self { patterns, dim })
    }

    pub fn size(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn at(&self, i: usize) -> Option<&AttackPattern> {
        self.patterns.get(i)
    }
}

impl NeighborSource for PatternStore {
    /// Exact brute-force scan: cosine distance against every pattern,
    /// ascending sort with ties broken by original store order.
    fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        let mut ranked: Vec<(usize, f32)> = self
            .patterns
            .iter()
            .enumerate()
            .map(|(i, p)| (i, 1.0 - cosine_similarity(query, &p.embedding)))
            .collect();

        // total_cmp keeps the sort stable and deterministic; equal distances
        // fall back to the first-loaded pattern
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        ranked.truncate(k);

        Ok(ranked
            .into_iter()
            .map(|(i, distance)| {
                let pattern = &self.patterns[i];
                Neighbor {
                    label: pattern.label,
                    severity: pattern.severity,
                    distance,
                    similarity: 1.0 - distance,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob_from(vectors: &[Vec<f32>]) -> Vec<u8> {
        vectors
            .iter()
            .flatten()
            .flat_map(|v| v.to_le_bytes())
            .collect()
    }

    fn metadata(labels: &[&str], dim: usize) -> CorpusMetadata {
        CorpusMetadata {
            labels: labels.iter().map(|s| s.to_string()).collect(),
            severities: vec![None; labels.len()],
            num_vectors: labels.len(),
            dim,
        }
    }

    #[test]
    fn test_load_valid_corpus() {
        let blob = blob_from(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
        let meta = metadata(&["sql_injection", "clean"], 2);

        let store = PatternStore::load(&blob, &meta).unwrap();
        assert_eq!(store.size(), 2);
        assert_eq!(store.dim(), 2);
        assert_eq!(store.at(0).unwrap().label, AttackLabel::SqlInjection);
        assert_eq!(store.at(1).unwrap().label, AttackLabel::Clean);
    }

    #[test]
    fn test_blob_not_multiple_of_dim_rejected() {
        let blob = blob_from(&[vec![1.0, 0.0, 3.0]]);
        let meta = metadata(&["clean"], 2);
        let err = PatternStore::load(&blob, &meta).unwrap_err();
        assert!(matches!(err, ClassifierError::ModelDataCorrupt(_)));
    }

    #[test]
    fn test_label_count_mismatch_rejected() {
        let blob = blob_from(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
        let mut meta = metadata(&["clean", "xss"], 2);
        meta.labels.pop();
        let err = PatternStore::load(&blob, &meta).unwrap_err();
        assert!(matches!(err, ClassifierError::ModelDataCorrupt(_)));
    }

    #[test]
    fn test_unknown_label_rejected() {
        let blob = blob_from(&[vec![1.0, 0.0]]);
        let meta = metadata(&["zero_day"], 2);
        let err = PatternStore::load(&blob, &meta).unwrap_err();
        assert!(matches!(err, ClassifierError::ModelDataCorrupt(_)));
    }

    #[test]
    fn test_severities_parsed() {
        let blob = blob_from(&[vec![1.0, 0.0]]);
        let meta = CorpusMetadata {
            labels: vec!["xss".to_string()],
            severities: vec![Some("high".to_string())],
            num_vectors: 1,
            dim: 2,
        };
        let store = PatternStore::load(&blob, &meta).unwrap();
        assert_eq!(store.at(0).unwrap().severity, Some(Severity::High));
    }

    #[test]
    fn test_nearest_orders_by_distance() {
        let blob = blob_from(&[
            vec![0.0, 1.0], // orthogonal to query
            vec![1.0, 0.0], // identical to query
            vec![1.0, 1.0], // 45 degrees
        ]);
        let meta = metadata(&["xss", "sql_injection", "clean"], 2);
        let store = PatternStore::load(&blob, &meta).unwrap();

        let neighbors = store.nearest(&[1.0, 0.0], 3).unwrap();
        assert_eq!(neighbors.len(), 3);
        assert_eq!(neighbors[0].label, AttackLabel::SqlInjection);
        assert!(neighbors[0].distance < 1e-6);
        assert!(neighbors[0].distance <= neighbors[1].distance);
        assert!(neighbors[1].distance <= neighbors[2].distance);
    }

    #[test]
    fn test_nearest_truncates_to_k() {
        let blob = blob_from(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]);
        let meta = metadata(&["clean", "clean", "clean"], 2);
        let store = PatternStore::load(&blob, &meta).unwrap();

        assert_eq!(store.nearest(&[1.0, 0.0], 2).unwrap().len(), 2);
        // k larger than the store returns everything
        assert_eq!(store.nearest(&[1.0, 0.0], 10).unwrap().len(), 3);
    }

    #[test]
    fn test_equal_distance_ties_keep_store_order() {
        // Two identical vectors: the first-loaded one must rank first
        let blob = blob_from(&[vec![1.0, 0.0], vec![1.0, 0.0]]);
        let meta = metadata(&["xss", "sql_injection"], 2);
        let store = PatternStore::load(&blob, &meta).unwrap();

        let neighbors = store.nearest(&[1.0, 0.0], 2).unwrap();
        assert_eq!(neighbors[0].label, AttackLabel::Xss);
        assert_eq!(neighbors[1].label, AttackLabel::SqlInjection);
    }

    #[test]
    fn test_empty_store() {
        let store = PatternStore::from_patterns(vec![], 2).unwrap();
        assert!(store.is_empty());
        assert!(store.nearest(&[1.0, 0.0], 5).unwrap().is_empty());
    }
}
