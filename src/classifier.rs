//! Request Attack Classifier
//!
//! The facade tying the pipeline together: canonical text in, tokenize,
//! embed, rank neighbors against the pattern store, vote. Construction loads
//! and validates everything up front; classification itself never touches the
//! filesystem.
//!
//! The store handle sits behind an `RwLock<Arc<PatternStore>>` so a corpus
//! reload swaps atomically: in-flight queries finish against the store they
//! started with, later queries see the new one. Queries only clone the `Arc`
//! under the read lock, never hold it across the scan.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::canonical::{parts_to_text, RequestParts};
use crate::config::{ClassifierConfig, ModelDir};
use crate::embedding::{EmbeddingProvider, LookupEmbedder};
use crate::error::{ClassifierError, Result};
use crate::knn::{self, ClassificationResult};
use crate::store::{NeighborSource, PatternStore};
use crate::tokenizer::{UnigramTokenizer, Vocabulary};

/// Hook invoked after each classification.
///
/// Observers run synchronously on the query path and must be cheap; anything
/// expensive belongs behind a channel on the observer's side.
pub trait ClassificationObserver: Send + Sync {
    /// Called for every completed classification
    fn on_classification(&self, _text: &str, _result: &ClassificationResult) {}

    /// Called additionally when the verdict is an attack
    fn on_attack(&self, _text: &str, _result: &ClassificationResult) {}
}

/// Monotonic classification counters
#[derive(Debug, Default)]
pub struct ClassifierStats {
    total: AtomicU64,
    attacks: AtomicU64,
    latency_us: AtomicU64,
}

impl ClassifierStats {
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn attacks(&self) -> u64 {
        self.attacks.load(Ordering::Relaxed)
    }

    /// Mean classification latency in milliseconds
    pub fn avg_latency_ms(&self) -> f64 {
        let total = self.total.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.latency_us.load(Ordering::Relaxed) as f64 / total as f64 / 1000.0
    }
}

/// Embedding-based k-NN attack classifier
pub struct Classifier {
    tokenizer: UnigramTokenizer,
    embedder: Arc<dyn EmbeddingProvider>,
    store: RwLock<Arc<PatternStore>>,
    config: ClassifierConfig,
    observers: Vec<Arc<dyn ClassificationObserver>>,
    stats: ClassifierStats,
}

// Manual impl: the embedder and observers are dyn trait objects
impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("embedding_dim", &self.embedder.embedding_dim())
            .field("store_size", &self.store.read().size())
            .field("default_k", &self.config.default_k)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Classifier {
    /// Build a classifier from already-loaded components.
    ///
    /// The store dimensionality must match the embedder's; a non-empty store
    /// with a different dimension is rejected as corrupt.
    pub fn new(
        tokenizer: UnigramTokenizer,
        embedder: Arc<dyn EmbeddingProvider>,
        store: PatternStore,
        config: ClassifierConfig,
    ) -> Result<Self> {
        check_store_dim(&store, embedder.embedding_dim())?;
        Ok(Self {
            tokenizer,
            embedder,
            store: RwLock::new(Arc::new(store)),
            config,
            observers: Vec::new(),
            stats: ClassifierStats::default(),
        })
    }

    /// Load every component from a model directory, using the bundled
    /// lookup-table embedder
    pub fn from_model_dir(dir: &ModelDir) -> Result<Self> {
        let tokenizer_config = dir.load_tokenizer_config()?;
        let model_config = dir.load_model_config()?;
        let vocab = Vocabulary::load(&dir.vocab_path())?;
        let embedder = LookupEmbedder::load(&dir.embedding_table_path(), model_config.embedding_dim)?;
        let store = PatternStore::load_from_files(&dir.vectors_path(), &dir.labels_path())?;

        info!(
            model_dir = %dir.root().display(),
            vocab_size = vocab.len(),
            patterns = store.size(),
            embedding_dim = model_config.embedding_dim,
            "classifier loaded"
        );

        Self::new(
            UnigramTokenizer::new(vocab, tokenizer_config),
            Arc::new(embedder),
            store,
            ClassifierConfig::default(),
        )
    }

    /// Register a post-classification hook
    pub fn add_observer(&mut self, observer: Arc<dyn ClassificationObserver>) {
        self.observers.push(observer);
    }

    pub fn stats(&self) -> &ClassifierStats {
        &self.stats
    }

    /// Number of patterns in the current store
    pub fn store_size(&self) -> usize {
        self.store.read().size()
    }

    /// Atomically replace the pattern store.
    ///
    /// Validates dimensionality first so a failed reload leaves the previous
    /// store untouched.
    pub fn replace_store(&self, store: PatternStore) -> Result<()> {
        check_store_dim(&store, self.embedder.embedding_dim())?;
        let size = store.size();
        *self.store.write() = Arc::new(store);
        info!(patterns = size, "pattern store replaced");
        Ok(())
    }

    /// Classify canonical text against the current store.
    ///
    /// `k` defaults to the configured neighbor count. An empty store yields
    /// the defined benign verdict instead of an error.
    pub fn classify(&self, text: &str, k: Option<usize>) -> Result<ClassificationResult> {
        let start = Instant::now();
        let k = k.unwrap_or(self.config.default_k).max(1);

        let store = Arc::clone(&self.store.read());

        let result = if store.is_empty() {
            let mut result = ClassificationResult::empty_store();
            result.latency_ms = start.elapsed().as_secs_f64() * 1000.0;
            result
        } else {
            let tokens = self.tokenizer.tokenize(text);
            let query = self.embedder.embed(&tokens.ids, &tokens.mask)?;
            if query.len() != self.embedder.embedding_dim() {
                return Err(ClassifierError::InferenceFailure(format!(
                    "provider returned dimension {}, expected {}",
                    query.len(),
                    self.embedder.embedding_dim()
                )));
            }

            let neighbors = store.nearest(&query, k)?;
            knn::vote(&neighbors, start.elapsed().as_secs_f64() * 1000.0)
        };

        self.stats.total.fetch_add(1, Ordering::Relaxed);
        self.stats
            .latency_us
            .fetch_add((result.latency_ms * 1000.0) as u64, Ordering::Relaxed);
        debug!(
            label = %result.label,
            confidence = result.confidence,
            nearest_distance = result.nearest_distance,
            latency_ms = result.latency_ms,
            "classification"
        );

        if result.is_attack {
            self.stats.attacks.fetch_add(1, Ordering::Relaxed);
            warn!(
                label = %result.label,
                confidence = result.confidence,
                "attack pattern matched"
            );
        }

        for observer in &self.observers {
            observer.on_classification(text, &result);
            if result.is_attack {
                observer.on_attack(text, &result);
            }
        }

        Ok(result)
    }

    /// Canonicalize request fields and classify the resulting text
    pub fn classify_request(
        &self,
        parts: &RequestParts,
        k: Option<usize>,
    ) -> Result<ClassificationResult> {
        let text = parts_to_text(parts);
        self.classify(&text, k)
    }
}

fn check_store_dim(store: &PatternStore, expected: usize) -> Result<()> {
    if !store.is_empty() && store.dim() != expected {
        return Err(ClassifierError::ModelDataCorrupt(format!(
            "pattern store dimension {} does not match embedding dimension {}",
            store.dim(),
            expected
        )));
    }
    Ok(())
}
