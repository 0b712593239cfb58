//! Text Normalizer
//!
//! Reproduces the normalization the embedding model saw at training time:
//! lowercase, space-pad a fixed punctuation set, collapse whitespace runs,
//! trim. No stemming, no unicode folding beyond lowercasing — anything
//! fancier would desynchronize the tokenizer from the model vocabulary.

/// Punctuation characters that get padded with single spaces on both sides.
///
/// Each occurrence is padded independently, so `'--` becomes `' - -` before
/// whitespace collapse.
const PADDED_PUNCTUATION: &[char] = &[
    '/', ':', '?', '=', '&', '<', '>', '\'', '"', '(', ')', ';', ',', '.', '-', '_', '#', '%',
    '@', '[', ']', '{', '}', '|', '\\', '$', '!', '*', '+', '~', '^', '`',
];

/// Normalize text for Unigram tokenization
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();

    let mut padded = String::with_capacity(lowered.len() * 2);
    for c in lowered.chars() {
        if PADDED_PUNCTUATION.contains(&c) {
            padded.push(' ');
            padded.push(c);
            padded.push(' ');
        } else {
            padded.push(c);
        }
    }

    // Collapse whitespace runs and trim in one pass
    padded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases() {
        assert_eq!(normalize("SELECT"), "select");
    }

    #[test]
    fn test_pads_punctuation() {
        assert_eq!(normalize("a=b"), "a = b");
        assert_eq!(normalize("/login"), "/ login");
    }

    #[test]
    fn test_adjacent_punctuation_padded_independently() {
        assert_eq!(normalize("admin'--"), "admin ' - -");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  a   b\t\nc  "), "a b c");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_idempotent_on_plain_words() {
        assert_eq!(normalize("hello world"), "hello world");
    }
}
