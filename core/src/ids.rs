/// Hierarchical identifiers for extracted text (block → sentence → word)
/// and the placeholder markers that reference them from the document.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BLOCK_PREFIX: &str = "BLOCK";

// __BLOCK_3_S1__
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"__(BLOCK_[0-9]+_S[0-9]+)__").expect("valid placeholder regex")
});

static BLOCK_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^BLOCK_[0-9]+$").expect("valid block id regex"));

static SENTENCE_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^BLOCK_[0-9]+_S[0-9]+$").expect("valid sentence id regex"));

static WORD_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^BLOCK_[0-9]+_S[0-9]+_W[0-9]+$").expect("valid word id regex")
});

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(BlockId);
string_id!(SentenceId);
string_id!(WordId);

impl BlockId {
    /// `n` is 1-based and restarts for every block.
    pub fn sentence(&self, n: usize) -> SentenceId {
        sentence_id(self, n)
    }
}

impl SentenceId {
    /// `n` is 1-based and restarts for every sentence.
    pub fn word(&self, n: usize) -> WordId {
        word_id(self, n)
    }

    /// Marker written into the document in place of an extracted fragment.
    pub fn placeholder(&self) -> String {
        format!("__{}__", self.0)
    }
}

/// Issues block identifiers for one extraction run.
///
/// Identifiers are handed out in strict visitation order and never reused,
/// regardless of which fragment source produced the block. `peek` lets the
/// caller build a block under its future identifier and only `advance` once
/// the block is actually recorded.
#[derive(Debug, Clone)]
pub struct BlockCounter {
    next: usize,
}

impl Default for BlockCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl BlockCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peek(&self) -> BlockId {
        BlockId(format!("{}_{}", BLOCK_PREFIX, self.next))
    }

    pub fn advance(&mut self) -> BlockId {
        let id = self.peek();
        self.next += 1;
        id
    }

    pub fn next_block_id(&mut self) -> BlockId {
        self.advance()
    }

    /// Number of identifiers issued so far.
    pub fn issued(&self) -> usize {
        self.next - 1
    }
}

pub fn sentence_id(block: &BlockId, n: usize) -> SentenceId {
    debug_assert!(n > 0, "sentence positions are 1-based");
    SentenceId(format!("{}_S{}", block.0, n))
}

pub fn word_id(sentence: &SentenceId, n: usize) -> WordId {
    debug_assert!(n > 0, "word positions are 1-based");
    WordId(format!("{}_W{}", sentence.0, n))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Block,
    Sentence,
    Word,
}

/// Classify an identifier string by shape alone.
pub fn id_kind(id: &str) -> Option<IdKind> {
    if WORD_ID_REGEX.is_match(id) {
        Some(IdKind::Word)
    } else if SENTENCE_ID_REGEX.is_match(id) {
        Some(IdKind::Sentence)
    } else if BLOCK_ID_REGEX.is_match(id) {
        Some(IdKind::Block)
    } else {
        None
    }
}

/// Parse every placeholder in `text` back to the sentence it references,
/// in order of appearance.
pub fn find_placeholders(text: &str) -> Vec<SentenceId> {
    PLACEHOLDER_REGEX
        .captures_iter(text)
        .filter_map(|capture| capture.get(1))
        .map(|m| SentenceId(m.as_str().to_string()))
        .collect()
}

pub fn is_placeholder(text: &str) -> bool {
    let trimmed = text.trim();
    PLACEHOLDER_REGEX
        .find(trimmed)
        .map(|m| m.start() == 0 && m.end() == trimmed.len())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_is_strictly_increasing() {
        let mut counter = BlockCounter::new();
        assert_eq!(counter.peek().as_str(), "BLOCK_1");
        assert_eq!(counter.peek().as_str(), "BLOCK_1");
        assert_eq!(counter.next_block_id().as_str(), "BLOCK_1");
        assert_eq!(counter.next_block_id().as_str(), "BLOCK_2");
        assert_eq!(counter.issued(), 2);
    }

    #[test]
    fn composes_hierarchical_ids() {
        let block = BlockCounter::new().advance();
        let sentence = block.sentence(2);
        assert_eq!(sentence.as_str(), "BLOCK_1_S2");
        assert_eq!(sentence.word(10).as_str(), "BLOCK_1_S2_W10");
        assert_eq!(sentence.placeholder(), "__BLOCK_1_S2__");
    }

    #[test]
    fn classifies_id_shapes() {
        assert_eq!(id_kind("BLOCK_12"), Some(IdKind::Block));
        assert_eq!(id_kind("BLOCK_12_S3"), Some(IdKind::Sentence));
        assert_eq!(id_kind("BLOCK_12_S3_W1"), Some(IdKind::Word));
        assert_eq!(id_kind("S3"), None);
        assert_eq!(id_kind("BLOCK_1_S"), None);
    }

    #[test]
    fn finds_placeholders_in_order() {
        let html = "<p>__BLOCK_2_S1__</p><img alt=\"__BLOCK_7_S1__\"> __BLOCK_1_S1_W2__";
        let found: Vec<String> = find_placeholders(html)
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(found, vec!["BLOCK_2_S1", "BLOCK_7_S1"]);
    }

    #[test]
    fn recognises_standalone_placeholder() {
        assert!(is_placeholder("  __BLOCK_1_S1__\n"));
        assert!(!is_placeholder("see __BLOCK_1_S1__"));
        assert!(!is_placeholder("Hello"));
    }
}
