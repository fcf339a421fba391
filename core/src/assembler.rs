//! Output assembly: accumulates block records during a run and produces the
//! four artifacts (flat map, structured map, sentence map, mutated document).

use crate::classifier::{RejectReason, SourceKind};
use crate::config::OutputConfig;
use crate::error::Result;
use crate::ids::{find_placeholders, id_kind, IdKind, SentenceId};
use crate::records::{FlatMap, StructuredMap};
use crate::segmenter::SegmentedBlock;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionSummary {
    pub blocks_by_source: IndexMap<SourceKind, usize>,
    pub sentences: usize,
    pub words: usize,
    pub languages: BTreeSet<String>,
    pub rejected: BTreeMap<RejectReason, usize>,
    pub skipped_payloads: usize,
}

impl Default for ExtractionSummary {
    fn default() -> Self {
        Self {
            blocks_by_source: SourceKind::ALL.iter().map(|kind| (*kind, 0)).collect(),
            sentences: 0,
            words: 0,
            languages: BTreeSet::new(),
            rejected: BTreeMap::new(),
            skipped_payloads: 0,
        }
    }
}

impl ExtractionSummary {
    pub fn total_blocks(&self) -> usize {
        self.blocks_by_source.values().sum()
    }

    pub fn blocks(&self, kind: SourceKind) -> usize {
        self.blocks_by_source.get(&kind).copied().unwrap_or(0)
    }

    pub fn rejected(&self, reason: RejectReason) -> usize {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }

    fn record_block(&mut self, block: &SegmentedBlock) {
        let record = &block.record;
        *self.blocks_by_source.entry(record.source).or_insert(0) += 1;
        self.sentences += record.sentences.len();
        self.words += record.word_count();
        self.languages.insert(record.language.clone());
    }

    pub fn record_rejection(&mut self, reason: RejectReason) {
        *self.rejected.entry(reason).or_insert(0) += 1;
    }

    pub fn record_skipped_payload(&mut self) {
        self.skipped_payloads += 1;
    }
}

impl fmt::Display for ExtractionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Blocks: {} ({} sentences, {} words)",
            self.total_blocks(),
            self.sentences,
            self.words
        )?;
        for (kind, count) in &self.blocks_by_source {
            if *count > 0 {
                writeln!(f, "  {:<16} {}", kind.as_str(), count)?;
            }
        }
        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();
        writeln!(f, "Languages: {}", languages.join(", "))?;
        if !self.rejected.is_empty() {
            writeln!(f, "Rejected fragments:")?;
            for (reason, count) in &self.rejected {
                writeln!(f, "  {:<16} {}", format!("{:?}", reason), count)?;
            }
        }
        if self.skipped_payloads > 0 {
            writeln!(f, "Skipped structured-data payloads: {}", self.skipped_payloads)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct OutputAssembler {
    flat: FlatMap,
    structured: StructuredMap,
    summary: ExtractionSummary,
}

impl OutputAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, block: SegmentedBlock) {
        self.summary.record_block(&block);
        self.flat.extend(block.flat);
        self.structured
            .insert(block.record.id.to_string(), block.record);
    }

    pub fn summary_mut(&mut self) -> &mut ExtractionSummary {
        &mut self.summary
    }

    pub fn block_count(&self) -> usize {
        self.structured.len()
    }

    pub fn finish(self, document: String) -> ExtractionOutput {
        let sentences = sentence_only(&self.flat);
        ExtractionOutput {
            flat: self.flat,
            structured: self.structured,
            sentences,
            document,
            summary: self.summary,
        }
    }
}

/// Entries of `flat` whose identifier denotes a sentence.
pub fn sentence_only(flat: &FlatMap) -> FlatMap {
    flat.iter()
        .filter(|(id, _)| id_kind(id) == Some(IdKind::Sentence))
        .map(|(id, text)| (id.clone(), text.clone()))
        .collect()
}

/// Placeholders in `document` that reference no recorded sentence.
pub fn verify_placeholders(document: &str, structured: &StructuredMap) -> Vec<SentenceId> {
    let known: HashSet<&str> = structured
        .values()
        .flat_map(|block| block.sentences.iter().map(|s| s.id.as_str()))
        .collect();
    find_placeholders(document)
        .into_iter()
        .filter(|id| !known.contains(id.as_str()))
        .collect()
}

/// Recorded blocks whose first-sentence placeholder is absent from `document`.
pub fn missing_placeholders(document: &str, structured: &StructuredMap) -> Vec<SentenceId> {
    let present: HashSet<SentenceId> = find_placeholders(document).into_iter().collect();
    structured
        .values()
        .filter_map(|block| block.first_sentence())
        .filter(|sentence| !present.contains(&sentence.id))
        .map(|sentence| sentence.id.clone())
        .collect()
}

#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub flat: PathBuf,
    pub structured: PathBuf,
    pub sentences: PathBuf,
    pub document: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    pub flat: FlatMap,
    pub structured: StructuredMap,
    pub sentences: FlatMap,
    pub document: String,
    pub summary: ExtractionSummary,
}

impl ExtractionOutput {
    pub fn verify_placeholders(&self) -> Vec<SentenceId> {
        verify_placeholders(&self.document, &self.structured)
    }

    pub fn missing_placeholders(&self) -> Vec<SentenceId> {
        missing_placeholders(&self.document, &self.structured)
    }

    pub fn write_artifacts(&self, dir: &Path, names: &OutputConfig) -> Result<ArtifactPaths> {
        fs::create_dir_all(dir)?;
        let paths = ArtifactPaths {
            flat: dir.join(&names.flat_file),
            structured: dir.join(&names.structured_file),
            sentences: dir.join(&names.sentences_file),
            document: dir.join(&names.document_file),
        };

        // Serialize everything before touching the disk.
        let flat = serde_json::to_string_pretty(&self.flat)?;
        let structured = serde_json::to_string_pretty(&self.structured)?;
        let sentences = serde_json::to_string_pretty(&self.sentences)?;

        fs::write(&paths.flat, flat)?;
        fs::write(&paths.structured, structured)?;
        fs::write(&paths.sentences, sentences)?;
        fs::write(&paths.document, &self.document)?;

        log::info!("Wrote artifacts to {}", dir.display());
        Ok(paths)
    }
}
