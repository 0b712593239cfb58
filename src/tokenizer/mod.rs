//! Unigram/Metaspace Tokenizer
//!
//! Deterministic, HuggingFace-Unigram-compatible tokenization built on a
//! prefix trie. The pipeline is: normalize → split into words → prepend the
//! metaspace marker to each word → greedy longest-prefix matching over the
//! vocabulary trie → truncate/pad to a fixed length with an attention mask.
//!
//! # Forward progress
//!
//! When no vocabulary prefix matches at the current position, the tokenizer
//! emits the unknown-token id and advances exactly one character. Whole words
//! are never skipped, so the token count is bounded by the input length.

pub mod normalizer;
pub mod vocab;

pub use normalizer::normalize;
pub use vocab::Vocabulary;

use crate::config::TokenizerConfig;

/// Fixed-length tokenization: ids plus a parallel {0,1} attention mask.
///
/// Both sequences always hold exactly `max_length` elements; the real-token
/// prefix length equals `min(raw_token_count, max_length)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenization {
    pub ids: Vec<u32>,
    pub mask: Vec<u8>,
}

impl Tokenization {
    /// Number of real (non-padding) tokens
    pub fn real_len(&self) -> usize {
        self.mask.iter().filter(|&&m| m == 1).count()
    }
}

/// Unigram tokenizer over an immutable vocabulary trie
#[derive(Debug)]
pub struct UnigramTokenizer {
    vocab: Vocabulary,
    config: TokenizerConfig,
}

impl UnigramTokenizer {
    pub fn new(vocab: Vocabulary, config: TokenizerConfig) -> Self {
        Self { vocab, config }
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Tokenize text into exactly `max_length` ids and mask flags
    pub fn tokenize(&self, text: &str) -> Tokenization {
        let normalized = normalize(text);

        // Metaspace pre-tokenization: word boundaries become marker chars
        // inside a single character stream.
        let mut stream: Vec<char> = Vec::with_capacity(normalized.len() + 16);
        for word in normalized.split_whitespace() {
            stream.push(self.config.metaspace_replacement);
            stream.extend(word.chars());
        }

        let mut ids = Vec::with_capacity(self.config.max_length);

        if stream.is_empty() {
            // Downstream embedding must never see a zero-length real prefix
            ids.push(self.config.unk_token_id);
        } else {
            let mut pos = 0;
            while pos < stream.len() && ids.len() < self.config.max_length {
                match self.vocab.longest_prefix(&stream[pos..]) {
                    Some((id, len)) => {
                        ids.push(id);
                        pos += len;
                    }
                    None => {
                        ids.push(self.config.unk_token_id);
                        pos += 1;
                    }
                }
            }
        }

        ids.truncate(self.config.max_length);
        let real = ids.len();

        let mut mask = vec![1u8; real];
        ids.resize(self.config.max_length, self.config.pad_token_id);
        mask.resize(self.config.max_length, 0);

        Tokenization { ids, mask }
    }
}
