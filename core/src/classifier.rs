//! Translatability classifier.
//!
//! Decides, per candidate fragment and its structural context, whether the
//! fragment is extracted. The decision is an ordered rule table where the
//! first rule that returns a verdict wins; the last rule always answers.

use crate::config::ClassifierConfig;
use crate::signatures::{
    has_letter_run, has_lexical_content, is_exception_language, is_math_fragment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Where in the document a fragment was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    TextNode,
    Attribute,
    Metadata,
    Title,
    StructuredData,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::TextNode,
        SourceKind::Attribute,
        SourceKind::Metadata,
        SourceKind::Title,
        SourceKind::StructuredData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::TextNode => "text-node",
            SourceKind::Attribute => "attribute",
            SourceKind::Metadata => "metadata",
            SourceKind::Title => "title",
            SourceKind::StructuredData => "structured-data",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit `translate="yes|no"` declaration, inherited by descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslateOverride {
    Yes,
    No,
}

impl TranslateOverride {
    /// Any value other than yes/no is not a declaration.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("yes") {
            Some(TranslateOverride::Yes)
        } else if value.eq_ignore_ascii_case("no") {
            Some(TranslateOverride::No)
        } else {
            None
        }
    }
}

/// A candidate for extraction, created per visit and consumed immediately.
#[derive(Debug, Clone, Copy)]
pub struct Fragment<'a> {
    pub text: &'a str,
    pub kind: SourceKind,
    /// Parent tag, attribute name, meta field name or key path.
    pub context: &'a str,
    pub in_skip_context: bool,
    pub translate: Option<TranslateOverride>,
}

impl<'a> Fragment<'a> {
    pub fn new(text: &'a str, kind: SourceKind, context: &'a str) -> Self {
        Self {
            text,
            kind,
            context,
            in_skip_context: false,
            translate: None,
        }
    }

    pub fn in_skip_context(mut self, in_skip: bool) -> Self {
        self.in_skip_context = in_skip;
        self
    }

    pub fn with_override(mut self, translate: Option<TranslateOverride>) -> Self {
        self.translate = translate;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RejectReason {
    Empty,
    SkipContext,
    OverrideNo,
    NoLexicalContent,
    MathFragment,
    OutsideWhitelist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Extract,
    Reject(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub rule: &'static str,
    pub verdict: Verdict,
}

impl Decision {
    pub fn is_extract(&self) -> bool {
        self.verdict == Verdict::Extract
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self.verdict {
            Verdict::Extract => None,
            Verdict::Reject(reason) => Some(reason),
        }
    }
}

struct Rule {
    name: &'static str,
    check: fn(&Classifier, &Fragment<'_>) -> Option<Verdict>,
}

const RULES: &[Rule] = &[
    Rule {
        name: "empty",
        check: rule_empty,
    },
    Rule {
        name: "skip-context",
        check: rule_skip_context,
    },
    Rule {
        name: "override-no",
        check: rule_override_no,
    },
    Rule {
        name: "no-lexical-content",
        check: rule_no_lexical_content,
    },
    Rule {
        name: "math-fragment",
        check: rule_math_fragment,
    },
    Rule {
        name: "context-whitelist",
        check: rule_context_whitelist,
    },
];

fn rule_empty(_: &Classifier, fragment: &Fragment<'_>) -> Option<Verdict> {
    fragment
        .text
        .trim()
        .is_empty()
        .then_some(Verdict::Reject(RejectReason::Empty))
}

fn rule_skip_context(_: &Classifier, fragment: &Fragment<'_>) -> Option<Verdict> {
    (fragment.in_skip_context && fragment.translate != Some(TranslateOverride::Yes))
        .then_some(Verdict::Reject(RejectReason::SkipContext))
}

fn rule_override_no(_: &Classifier, fragment: &Fragment<'_>) -> Option<Verdict> {
    (fragment.translate == Some(TranslateOverride::No))
        .then_some(Verdict::Reject(RejectReason::OverrideNo))
}

fn rule_no_lexical_content(_: &Classifier, fragment: &Fragment<'_>) -> Option<Verdict> {
    (!has_lexical_content(fragment.text) && !is_exception_language(fragment.text))
        .then_some(Verdict::Reject(RejectReason::NoLexicalContent))
}

fn rule_math_fragment(_: &Classifier, fragment: &Fragment<'_>) -> Option<Verdict> {
    let text = fragment.text;
    (is_math_fragment(text) && !has_letter_run(text) && !is_exception_language(text))
        .then_some(Verdict::Reject(RejectReason::MathFragment))
}

fn rule_context_whitelist(classifier: &Classifier, fragment: &Fragment<'_>) -> Option<Verdict> {
    if fragment.translate == Some(TranslateOverride::Yes) {
        return Some(Verdict::Extract);
    }
    let context = fragment.context.to_ascii_lowercase();
    let accepted = match fragment.kind {
        SourceKind::TextNode => {
            classifier.translatable_tags.contains(&context) && !classifier.is_skip_tag(&context)
        }
        SourceKind::Attribute => classifier.translatable_attributes.contains(&context),
        SourceKind::Metadata => classifier.meta_fields.contains(&context),
        // Key filtering already happened in the structured-data walker.
        SourceKind::Title | SourceKind::StructuredData => true,
    };
    Some(if accepted {
        Verdict::Extract
    } else {
        Verdict::Reject(RejectReason::OutsideWhitelist)
    })
}

fn lowercase_set(values: &[String]) -> HashSet<String> {
    values.iter().map(|value| value.to_ascii_lowercase()).collect()
}

#[derive(Debug, Clone)]
pub struct Classifier {
    translatable_tags: HashSet<String>,
    translatable_attributes: HashSet<String>,
    meta_fields: HashSet<String>,
    skip_tags: HashSet<String>,
    skip_classes: HashSet<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl Classifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            translatable_tags: lowercase_set(&config.translatable_tags),
            translatable_attributes: lowercase_set(&config.translatable_attributes),
            meta_fields: lowercase_set(&config.meta_fields),
            skip_tags: lowercase_set(&config.skip_tags),
            skip_classes: config.skip_classes.iter().cloned().collect(),
        }
    }

    pub fn classify(&self, fragment: &Fragment<'_>) -> Decision {
        for rule in RULES {
            if let Some(verdict) = (rule.check)(self, fragment) {
                return Decision {
                    rule: rule.name,
                    verdict,
                };
            }
        }
        // The whitelist rule always answers.
        Decision {
            rule: "context-whitelist",
            verdict: Verdict::Reject(RejectReason::OutsideWhitelist),
        }
    }

    pub fn is_skip_tag(&self, tag: &str) -> bool {
        self.skip_tags.contains(&tag.to_ascii_lowercase())
    }

    /// Whether a whitespace-separated `class` attribute names a skip class.
    pub fn has_skip_class(&self, class_attr: &str) -> bool {
        class_attr
            .split_whitespace()
            .any(|class| self.skip_classes.contains(class))
    }

    pub fn is_translatable_attribute(&self, name: &str) -> bool {
        self.translatable_attributes
            .contains(&name.to_ascii_lowercase())
    }

    pub fn is_meta_field(&self, name: &str) -> bool {
        self.meta_fields.contains(&name.to_ascii_lowercase())
    }
}
