/// Language distribution over a structured map
use crate::error::Result;
use crate::records::{BlockRecord, StructuredMap};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageCount {
    pub language: String,
    pub words: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockLanguages {
    pub block: String,
    pub language: String,
    pub distribution: Vec<LanguageCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanguageStats {
    pub total_words: usize,
    pub languages: Vec<LanguageCount>,
    pub blocks: Vec<BlockLanguages>,
}

/// Sorted by word count descending, then language code.
fn sorted_counts(counts: HashMap<String, usize>) -> Vec<LanguageCount> {
    let mut sorted: Vec<LanguageCount> = counts
        .into_iter()
        .map(|(language, words)| LanguageCount { language, words })
        .collect();
    sorted.sort_by(|a, b| b.words.cmp(&a.words).then_with(|| a.language.cmp(&b.language)));
    sorted
}

fn block_counts(block: &BlockRecord) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for word in block.sentences.iter().flat_map(|s| s.words.iter()) {
        // Words without their own language count under the block's.
        let language = word
            .attributes
            .language
            .clone()
            .unwrap_or_else(|| block.language.clone());
        *counts.entry(language).or_insert(0) += 1;
    }
    counts
}

impl LanguageStats {
    pub fn from_structured(structured: &StructuredMap) -> Self {
        let mut totals: HashMap<String, usize> = HashMap::new();
        let mut blocks = Vec::with_capacity(structured.len());

        for (id, block) in structured {
            let counts = block_counts(block);
            for (language, words) in &counts {
                *totals.entry(language.clone()).or_insert(0) += words;
            }
            blocks.push(BlockLanguages {
                block: id.clone(),
                language: block.language.clone(),
                distribution: sorted_counts(counts),
            });
        }

        let total_words = totals.values().sum();
        Self {
            total_words,
            languages: sorted_counts(totals),
            blocks,
        }
    }

    /// Read a structured map written by an extraction run.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let structured: StructuredMap = serde_json::from_str(&content)?;
        Ok(Self::from_structured(&structured))
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Total words: {}", self.total_words);
        for entry in &self.languages {
            let share = if self.total_words == 0 {
                0.0
            } else {
                entry.words as f64 * 100.0 / self.total_words as f64
            };
            let _ = writeln!(out, "  {:<6} {:>8} ({:.1}%)", entry.language, entry.words, share);
        }
        let _ = writeln!(out, "Blocks:");
        for block in &self.blocks {
            let distribution: Vec<String> = block
                .distribution
                .iter()
                .map(|entry| format!("{}={}", entry.language, entry.words))
                .collect();
            let _ = writeln!(
                out,
                "  {:<12} [{}] {}",
                block.block,
                block.language,
                distribution.join(" ")
            );
        }
        out
    }
}
