//! Contract with the linguistic annotation service.
//!
//! The extractor never segments text itself: every block is handed to an
//! [`Annotator`] loaded for the block's language, which returns sentences
//! and, per sentence, an ordered token sequence. Token attributes are
//! optional passthrough; structuring never depends on them.

pub mod http;
pub mod rules;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("no annotation profile for language '{0}'")]
    UnsupportedLanguage(String),
    #[error("annotation profile for '{language}' could not be loaded: {reason}")]
    ProfileLoad { language: String, reason: String },
    #[error("annotation request failed: {0}")]
    Request(String),
    #[error("annotation service returned a malformed response: {0}")]
    MalformedResponse(String),
}

/// Linguistic attributes attached to a token by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dep: Option<String>,
    #[serde(default, alias = "ent", skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translit: Option<String>,
    #[serde(default, alias = "lang", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl TokenAttributes {
    pub fn is_empty(&self) -> bool {
        self == &TokenAttributes::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedToken {
    pub text: String,
    #[serde(flatten)]
    pub attributes: TokenAttributes,
}

impl AnnotatedToken {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: TokenAttributes::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedSentence {
    pub text: String,
    #[serde(default)]
    pub tokens: Vec<AnnotatedToken>,
}

/// A loaded annotation model for one language.
pub trait Annotator: Send + Sync {
    fn language(&self) -> &str;

    /// Segment `text` into sentences and tokens. Output order is authoritative.
    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedSentence>, AnnotationError>;
}

/// Acquires annotators (load-or-fetch) for language codes.
pub trait ProfileLoader: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether `language` (already normalized) can be requested at all.
    fn supports(&self, language: &str) -> bool;

    fn load(&self, language: &str) -> Result<Box<dyn Annotator>, AnnotationError>;
}

pub type AnnotatorProfile = Arc<dyn Annotator>;

/// Loaded profiles keyed by language code.
///
/// Owned by the language router; starts empty and is filled lazily. Failed
/// acquisitions are remembered so a broken language is only tried once.
#[derive(Default)]
pub struct ProfileCache {
    profiles: HashMap<String, AnnotatorProfile>,
    failures: HashMap<String, String>,
}

impl ProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, language: &str) -> Option<AnnotatorProfile> {
        self.profiles.get(language).cloned()
    }

    pub fn insert(&mut self, language: &str, profile: AnnotatorProfile) -> AnnotatorProfile {
        self.profiles
            .entry(language.to_string())
            .or_insert(profile)
            .clone()
    }

    pub fn record_failure(&mut self, language: &str, reason: String) {
        self.failures.insert(language.to_string(), reason);
    }

    pub fn failure(&self, language: &str) -> Option<&str> {
        self.failures.get(language).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self.profiles.keys().cloned().collect();
        languages.sort();
        languages
    }
}
