//! EmbedGuard Library
//!
//! An embedding-based HTTP request attack classifier: requests are folded
//! into a canonical text enriched with derived signals, tokenized with a
//! Unigram/Metaspace tokenizer, embedded, and matched against a labeled
//! pattern corpus with distance-weighted k-NN voting.
//!
//! # Features
//!
//! - **Canonical Request Text**: entropy, encoding depth, special-character
//!   density and signature flags folded into one deterministic string
//! - **Unigram Tokenizer**: prefix-trie greedy matching compatible with
//!   HuggingFace Unigram vocabularies
//! - **Pluggable Embeddings**: bundled lookup-table embedder, external
//!   runtimes behind the same trait
//! - **Weighted k-NN Verdicts**: similarity-weighted voting with a blended
//!   confidence score
//!
//! # Example
//!
//! ```ignore
//! use embedguard::{Classifier, ModelDir, RequestParts};
//!
//! let classifier = Classifier::from_model_dir(&ModelDir::new("/opt/model"))?;
//! let mut parts = RequestParts::new("POST", "/login");
//! parts.body = "username=admin'--".to_string();
//! let verdict = classifier.classify_request(&parts, None)?;
//! println!("{} ({})", verdict.label, verdict.confidence);
//! ```

pub mod canonical;
pub mod classifier;
pub mod config;
pub mod embedding;
pub mod error;
pub mod knn;
pub mod labels;
pub mod store;
pub mod tokenizer;

// Re-exports for convenience
pub use canonical::{parts_to_text, request_to_text, RequestParts};
pub use classifier::{ClassificationObserver, Classifier, ClassifierStats};
pub use config::{ClassifierConfig, ModelConfig, ModelDir, TokenizerConfig};
pub use embedding::{EmbeddingProvider, LookupEmbedder};
pub use error::{ClassifierError, Result};
pub use knn::{ClassificationResult, NeighborSummary};
pub use labels::{AttackLabel, PatternSource, Severity};
pub use store::{AttackPattern, CorpusMetadata, Neighbor, NeighborSource, PatternStore};
pub use tokenizer::{Tokenization, UnigramTokenizer, Vocabulary};
