//! The extraction run: walk the document, classify each candidate, route it
//! to an annotator profile, segment it and swap it for a placeholder.
//!
//! Candidates are visited as text nodes, attributes, metadata, title and
//! finally structured-data payloads. A block identifier is only consumed
//! once a fragment has been segmented and actually replaced.

use crate::annotator::http::HttpProfileLoader;
use crate::annotator::rules::BuiltinProfileLoader;
use crate::annotator::ProfileLoader;
use crate::assembler::{ArtifactPaths, ExtractionOutput, OutputAssembler};
use crate::classifier::{Classifier, Fragment, SourceKind, Verdict};
use crate::config::ExtractorConfig;
use crate::dom::{set_text_content, Candidate, CandidateLocation, HtmlDocument, Scope};
use crate::encoding::read_document;
use crate::error::Result;
use crate::ids::{is_placeholder, BlockCounter};
use crate::jsonld::{render_payload, walk_payload, KeyPolicy, LeafExtractor, StringLeaf};
use crate::language::{LanguageMode, LanguageRouter};
use crate::segmenter::{self, BlockOrigin};
use crate::substitution::{substitute, FragmentLocation, Substitution};
use serde_json::Value;
use std::path::Path;

pub struct Extractor {
    config: ExtractorConfig,
    classifier: Classifier,
    key_policy: KeyPolicy,
    router: LanguageRouter,
}

impl Extractor {
    /// Validates the language settings against `loader` before anything runs.
    pub fn new(config: ExtractorConfig, loader: Box<dyn ProfileLoader>) -> Result<Self> {
        let mode = LanguageMode::from_options(
            config.language.language.as_deref(),
            &config.language.default_language,
        );
        let router =
            LanguageRouter::new(mode, loader)?.with_lang_hints(config.language.use_lang_attribute);

        Ok(Self {
            classifier: Classifier::new(&config.classifier),
            key_policy: KeyPolicy::new(&config.structured_data),
            router,
            config,
        })
    }

    /// Uses the remote annotation service when a URL is configured, the
    /// built-in rules otherwise.
    pub fn from_config(config: ExtractorConfig) -> Result<Self> {
        let loader: Box<dyn ProfileLoader> = match config.language.annotator_url.as_deref() {
            Some(url) => Box::new(HttpProfileLoader::new(url)?),
            None => Box::new(BuiltinProfileLoader),
        };
        Self::new(config, loader)
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn router(&self) -> &LanguageRouter {
        &self.router
    }

    pub fn extract_html(&mut self, html: &str) -> Result<ExtractionOutput> {
        let document = HtmlDocument::parse(html);
        let candidates = document.collect_candidates(&self.classifier);
        log::info!("Collected {} fragment candidates", candidates.len());

        let mut counter = BlockCounter::new();
        let mut run = Run {
            classifier: &self.classifier,
            router: &mut self.router,
            assembler: OutputAssembler::new(),
        };

        for candidate in candidates.into_visit_order() {
            if candidate.kind == SourceKind::StructuredData {
                if self.config.structured_data.enabled {
                    process_payload(&mut run, &self.key_policy, &candidate, &mut counter)?;
                }
            } else {
                process_candidate(&mut run, &candidate, &mut counter)?;
            }
        }

        let assembler = run.assembler;
        let output = assembler.finish(document.serialize()?);

        let dangling = output.verify_placeholders();
        if !dangling.is_empty() {
            log::warn!(
                "{} placeholder(s) reference no recorded sentence",
                dangling.len()
            );
        }
        let missing = output.missing_placeholders();
        if !missing.is_empty() {
            log::warn!("{} block(s) have no placeholder in the document", missing.len());
        }
        log::info!(
            "Extracted {} blocks ({} sentences, {} words)",
            output.summary.total_blocks(),
            output.summary.sentences,
            output.summary.words
        );
        Ok(output)
    }

    pub fn extract_file(&mut self, path: &Path) -> Result<ExtractionOutput> {
        log::info!("Reading {}", path.display());
        let input = read_document(path)?;
        self.extract_html(&input.text)
    }

    /// Extract `input` and write all four artifacts into `out_dir`.
    pub fn extract_to_dir(
        &mut self,
        input: &Path,
        out_dir: &Path,
    ) -> Result<(ExtractionOutput, ArtifactPaths)> {
        let output = self.extract_file(input)?;
        let paths = output.write_artifacts(out_dir, &self.config.output)?;
        Ok((output, paths))
    }
}

/// Per-run state shared by every fragment source.
struct Run<'a> {
    classifier: &'a Classifier,
    router: &'a mut LanguageRouter,
    assembler: OutputAssembler,
}

impl Run<'_> {
    fn extract(
        &mut self,
        counter: &mut BlockCounter,
        fragment: Fragment<'_>,
        element: Option<&str>,
        hint: Option<&str>,
        location: FragmentLocation<'_>,
    ) -> Result<()> {
        // Re-running over an extracted document must not nest placeholders.
        if is_placeholder(fragment.text) {
            log::debug!("{} fragment ({}) is already a placeholder", fragment.kind, fragment.context);
            return Ok(());
        }

        let decision = self.classifier.classify(&fragment);
        if let Verdict::Reject(reason) = decision.verdict {
            log::debug!(
                "Rejected {} fragment ({}) by rule '{}': {:?}",
                fragment.kind,
                fragment.context,
                decision.rule,
                reason
            );
            self.assembler.summary_mut().record_rejection(reason);
            return Ok(());
        }

        let text = fragment.text.trim();
        let language = self.router.resolve(text, hint);
        let (language, profile) = self.router.profile_for(&language)?;

        let block_id = counter.peek();
        let origin = BlockOrigin {
            source: fragment.kind,
            context: fragment.context,
            element,
        };
        let segmented = match segmenter::process(&block_id, &origin, text, &language, &*profile) {
            Ok(Some(segmented)) => segmented,
            Ok(None) => {
                log::debug!("Empty segmentation for {} fragment; left untouched", fragment.kind);
                return Ok(());
            }
            Err(err) => {
                log::warn!(
                    "Annotation failed for {} fragment ({}); left untouched",
                    fragment.kind,
                    err
                );
                return Ok(());
            }
        };

        match substitute(location, &segmented.record.sentences) {
            Substitution::Replaced { placeholder } => {
                let block_id = counter.advance();
                log::debug!("{} -> {} ({})", block_id, placeholder, language);
                self.assembler.record(segmented);
            }
            Substitution::NoOp => {
                log::debug!("Fragment location vanished; {} not recorded", block_id);
            }
        }
        Ok(())
    }
}

fn process_candidate(
    run: &mut Run<'_>,
    candidate: &Candidate,
    counter: &mut BlockCounter,
) -> Result<()> {
    let location = match &candidate.location {
        CandidateLocation::TextNode(node) => FragmentLocation::TextNode(node),
        CandidateLocation::Attribute { element, name } => FragmentLocation::Attribute {
            element,
            name: name.as_str(),
        },
        CandidateLocation::Script(_) => return Ok(()),
    };
    let fragment = Fragment::new(&candidate.text, candidate.kind, &candidate.context)
        .in_skip_context(candidate.scope.in_skip)
        .with_override(candidate.scope.translate);

    run.extract(
        counter,
        fragment,
        candidate.element.as_deref(),
        candidate.scope.lang.as_deref(),
        location,
    )
}

fn process_payload(
    run: &mut Run<'_>,
    policy: &KeyPolicy,
    candidate: &Candidate,
    counter: &mut BlockCounter,
) -> Result<()> {
    let CandidateLocation::Script(script) = &candidate.location else {
        return Ok(());
    };

    let mut payload: Value = match serde_json::from_str(candidate.text.trim()) {
        Ok(payload) => payload,
        Err(err) => {
            log::warn!("Skipping malformed structured-data payload: {}", err);
            run.assembler.summary_mut().record_skipped_payload();
            return Ok(());
        }
    };

    let before = run.assembler.block_count();
    let mut sink = PayloadSink {
        run: &mut *run,
        scope: &candidate.scope,
    };
    walk_payload(&mut payload, policy, counter, &mut sink)?;

    if run.assembler.block_count() > before {
        set_text_content(script, &render_payload(&payload)?);
    }
    Ok(())
}

struct PayloadSink<'r, 'a> {
    run: &'r mut Run<'a>,
    scope: &'r Scope,
}

impl LeafExtractor for PayloadSink<'_, '_> {
    type Error = crate::error::ExtractError;

    fn extract_leaf(
        &mut self,
        counter: &mut BlockCounter,
        leaf: StringLeaf<'_>,
        slot: &mut Value,
    ) -> Result<()> {
        let text = slot.as_str().unwrap_or_default().to_string();
        let fragment = Fragment::new(&text, SourceKind::StructuredData, leaf.path)
            .in_skip_context(self.scope.in_skip)
            .with_override(self.scope.translate);

        self.run.extract(
            counter,
            fragment,
            Some(leaf.key),
            self.scope.lang.as_deref(),
            FragmentLocation::Value(slot),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::from_config(ExtractorConfig::default()).unwrap()
    }

    #[test]
    fn paragraph_becomes_one_block_with_two_sentences() {
        let output = extractor()
            .extract_html("<p>Hello world. Good morning.</p>")
            .unwrap();

        assert_eq!(output.structured.len(), 1);
        let block = &output.structured["BLOCK_1"];
        assert_eq!(block.sentences.len(), 2);
        assert_eq!(output.flat["BLOCK_1_S1"], "Hello world.");
        assert_eq!(output.flat["BLOCK_1_S2"], "Good morning.");
        assert!(output.document.contains("<p>__BLOCK_1_S1__</p>"));
        assert!(!output.document.contains("Hello world"));
    }

    #[test]
    fn code_yields_no_blocks() {
        let output = extractor().extract_html("<code>x = 1</code>").unwrap();
        assert!(output.structured.is_empty());
        assert!(output.document.contains("<code>x = 1</code>"));
    }

    #[test]
    fn payload_without_extractable_strings_is_left_verbatim() {
        let html = r#"<script type="application/ld+json">{"@type":"Thing","url":"https://a.b"}</script>"#;
        let output = extractor().extract_html(html).unwrap();
        assert!(output.structured.is_empty());
        assert!(output.document.contains(r#"{"@type":"Thing","url":"https://a.b"}"#));
    }

    #[test]
    fn malformed_payload_is_skipped() {
        let html = r#"<p>Hello world.</p><script type="application/ld+json">{ not json</script>"#;
        let output = extractor().extract_html(html).unwrap();
        assert_eq!(output.structured.len(), 1);
        assert_eq!(output.summary.skipped_payloads, 1);
        assert!(output.document.contains("{ not json"));
    }

    #[test]
    fn extracted_document_yields_no_new_blocks() {
        let first = extractor()
            .extract_html("<title>Shop</title><p>Hello world. Good morning.</p>")
            .unwrap();
        let second = extractor().extract_html(&first.document).unwrap();
        assert!(second.structured.is_empty());
        assert_eq!(second.document, first.document);
    }

    #[test]
    fn unsupported_fixed_language_is_fatal() {
        let mut config = ExtractorConfig::default();
        config.language.language = Some("xx".into());
        let result = Extractor::from_config(config);
        assert!(matches!(
            result,
            Err(crate::error::ExtractError::UnsupportedLanguage(code)) if code == "xx"
        ));
    }
}
