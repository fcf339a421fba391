/// Extraction records: the structured and flat views of every block.
use crate::annotator::TokenAttributes;
use crate::classifier::SourceKind;
use crate::ids::{BlockId, SentenceId, WordId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier (block, sentence or word) → raw text, in visitation order.
pub type FlatMap = IndexMap<String, String>;

/// Block identifier → block record, in visitation order.
pub type StructuredMap = IndexMap<String, BlockRecord>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub id: WordId,
    pub text: String,
    #[serde(flatten)]
    pub attributes: TokenAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub id: SentenceId,
    pub text: String,
    pub words: Vec<WordRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub id: BlockId,
    pub source: SourceKind,
    /// Parent tag, attribute name, meta field or key path.
    pub context: String,
    /// Owning element for attribute and metadata blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    pub language: String,
    pub text: String,
    pub sentences: Vec<SentenceRecord>,
}

impl BlockRecord {
    pub fn word_count(&self) -> usize {
        self.sentences.iter().map(|s| s.words.len()).sum()
    }

    pub fn first_sentence(&self) -> Option<&SentenceRecord> {
        self.sentences.first()
    }
}
