//! Vocabulary and Prefix Trie
//!
//! Loads the token→id mapping from `vocab.json` and builds a character trie
//! for longest-prefix matching. The trie is an arena of fixed nodes indexed
//! by integer id, built once and never mutated afterwards; it is owned
//! exclusively by the tokenizer.

use rustc_hash::FxHashMap;
use std::path::Path;

use crate::error::{ClassifierError, Result};

/// Arena node: children keyed by next character, optional terminal token id
#[derive(Debug, Default)]
struct TrieNode {
    children: FxHashMap<char, u32>,
    token_id: Option<u32>,
}

/// Vocabulary with longest-prefix lookup
#[derive(Debug)]
pub struct Vocabulary {
    nodes: Vec<TrieNode>,
    size: usize,
}

impl Vocabulary {
    /// Build a vocabulary from token→id pairs
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        let mut nodes = vec![TrieNode::default()];
        let mut size = 0;

        for (token, id) in entries {
            let mut current = 0usize;
            for c in token.chars() {
                let next = match nodes[current].children.get(&c) {
                    Some(&idx) => idx as usize,
                    None => {
                        let idx = nodes.len() as u32;
                        nodes.push(TrieNode::default());
                        nodes[current].children.insert(c, idx);
                        idx as usize
                    }
                };
                current = next;
            }
            nodes[current].token_id = Some(id);
            size += 1;
        }

        Self { nodes, size }
    }

    /// Load a vocabulary from a `vocab.json` file (JSON object token → id)
    pub fn load(path: &Path) -> Result<Self> {
        let raw = ClassifierError::read_to_string(path)?;
        let entries: FxHashMap<String, u32> = serde_json::from_str(&raw)
            .map_err(|e| ClassifierError::ModelDataCorrupt(format!("vocab.json: {}", e)))?;
        Ok(Self::from_entries(
            entries.iter().map(|(token, &id)| (token.as_str(), id)),
        ))
    }

    /// Number of tokens in the vocabulary
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Longest vocabulary prefix of `chars` starting at index 0.
    ///
    /// Walks the trie as far as the input allows and returns the deepest
    /// terminal node seen as `(token_id, matched_char_count)`. Returns None
    /// when no prefix of any length is a known token.
    pub fn longest_prefix(&self, chars: &[char]) -> Option<(u32, usize)> {
        let mut current = 0usize;
        let mut best: Option<(u32, usize)> = None;

        for (depth, c) in chars.iter().enumerate() {
            match self.nodes[current].children.get(c) {
                Some(&next) => {
                    current = next as usize;
                    if let Some(id) = self.nodes[current].token_id {
                        best = Some((id, depth + 1));
                    }
                }
                None => break,
            }
        }

        best
    }
}
