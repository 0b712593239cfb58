//! Classifier Configuration Types
//!
//! Tokenizer and model parameters are loaded once at startup from JSON files
//! in the model directory and are immutable afterwards. All fields carry
//! defaults so a minimal file (or an empty `{}`) still yields a working
//! configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ClassifierError, Result};

/// Tokenizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Fixed output sequence length
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Token id used for right padding
    #[serde(default = "default_pad_token_id")]
    pub pad_token_id: u32,
    /// Token id emitted when no vocabulary prefix matches
    #[serde(default = "default_unk_token_id")]
    pub unk_token_id: u32,
    /// Marker character prepended to each word (Metaspace pre-tokenization)
    #[serde(default = "default_metaspace")]
    pub metaspace_replacement: char,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            pad_token_id: default_pad_token_id(),
            unk_token_id: default_unk_token_id(),
            metaspace_replacement: default_metaspace(),
        }
    }
}

fn default_max_length() -> usize {
    128
}

fn default_pad_token_id() -> u32 {
    0
}

fn default_unk_token_id() -> u32 {
    1
}

fn default_metaspace() -> char {
    '\u{2581}' // ▁
}

/// Embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Dimensionality of query and corpus embeddings
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            embedding_dim: default_embedding_dim(),
        }
    }
}

fn default_embedding_dim() -> usize {
    256
}

/// Classifier behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Default neighbor count for `classify` when the caller passes none
    #[serde(default = "default_k")]
    pub default_k: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
        }
    }
}

fn default_k() -> usize {
    5
}

/// File layout of a model directory
///
/// A model directory bundles everything the classifier needs:
/// vocabulary, tokenizer/model configs, the pattern vector blob with its
/// labels metadata, and the embedding table for the reference embedder.
#[derive(Debug, Clone)]
pub struct ModelDir {
    root: PathBuf,
}

impl ModelDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn vocab_path(&self) -> PathBuf {
        self.root.join("vocab.json")
    }

    pub fn tokenizer_config_path(&self) -> PathBuf {
        self.root.join("tokenizer_config.json")
    }

    pub fn model_config_path(&self) -> PathBuf {
        self.root.join("model_config.json")
    }

    pub fn vectors_path(&self) -> PathBuf {
        self.root.join("vectors.bin")
    }

    pub fn labels_path(&self) -> PathBuf {
        self.root.join("labels.json")
    }

    pub fn embedding_table_path(&self) -> PathBuf {
        self.root.join("embedding_table.bin")
    }

    /// Load and parse the tokenizer configuration file
    pub fn load_tokenizer_config(&self) -> Result<TokenizerConfig> {
        let raw = ClassifierError::read_to_string(&self.tokenizer_config_path())?;
        serde_json::from_str(&raw).map_err(|e| {
            ClassifierError::ModelDataCorrupt(format!("tokenizer_config.json: {}", e))
        })
    }

    /// Load and parse the model configuration file
    pub fn load_model_config(&self) -> Result<ModelConfig> {
        let raw = ClassifierError::read_to_string(&self.model_config_path())?;
        serde_json::from_str(&raw)
            .map_err(|e| ClassifierError::ModelDataCorrupt(format!("model_config.json: {}", e)))
    }
}
