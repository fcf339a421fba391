/// Segmentation & structuring: one annotation call per block, turned into
/// identifier-keyed records. Sentence and word order mirror the annotator.
use crate::annotator::{AnnotationError, Annotator};
use crate::classifier::SourceKind;
use crate::ids::{BlockId, SentenceId};
use crate::records::{BlockRecord, SentenceRecord, WordRecord};

/// Where a block came from.
#[derive(Debug, Clone, Copy)]
pub struct BlockOrigin<'a> {
    pub source: SourceKind,
    pub context: &'a str,
    pub element: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct SegmentedBlock {
    pub record: BlockRecord,
    /// Block, sentence and word entries in order.
    pub flat: Vec<(String, String)>,
    pub sentences: Vec<(SentenceId, String)>,
}

pub fn process(
    block_id: &BlockId,
    origin: &BlockOrigin<'_>,
    text: &str,
    language: &str,
    annotator: &dyn Annotator,
) -> Result<Option<SegmentedBlock>, AnnotationError> {
    let annotated = annotator.annotate(text)?;

    let mut sentences = Vec::with_capacity(annotated.len());
    for sentence in annotated {
        let sentence_text = sentence.text.trim();
        if sentence_text.is_empty() {
            continue;
        }
        let sentence_id = block_id.sentence(sentences.len() + 1);

        let words: Vec<WordRecord> = sentence
            .tokens
            .into_iter()
            .filter(|token| !token.text.trim().is_empty())
            .enumerate()
            .map(|(index, token)| WordRecord {
                id: sentence_id.word(index + 1),
                text: token.text.trim().to_string(),
                attributes: token.attributes,
            })
            .collect();

        sentences.push(SentenceRecord {
            id: sentence_id,
            text: sentence_text.to_string(),
            words,
        });
    }

    if sentences.is_empty() {
        return Ok(None);
    }

    let mut flat = Vec::new();
    flat.push((block_id.to_string(), text.to_string()));
    for sentence in &sentences {
        flat.push((sentence.id.to_string(), sentence.text.clone()));
        for word in &sentence.words {
            flat.push((word.id.to_string(), word.text.clone()));
        }
    }

    let sentence_pairs = sentences
        .iter()
        .map(|sentence| (sentence.id.clone(), sentence.text.clone()))
        .collect();

    Ok(Some(SegmentedBlock {
        record: BlockRecord {
            id: block_id.clone(),
            source: origin.source,
            context: origin.context.to_string(),
            element: origin.element.map(str::to_string),
            language: language.to_string(),
            text: text.to_string(),
            sentences,
        },
        flat,
        sentences: sentence_pairs,
    }))
}
