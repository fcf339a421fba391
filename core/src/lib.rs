pub mod annotator;
pub mod assembler;
pub mod classifier;
pub mod config;
pub mod dom;
pub mod encoding;
pub mod error;
pub mod ids;
pub mod jsonld;
pub mod language;
pub mod pipeline;
pub mod records;
pub mod segmenter;
pub mod signatures;
pub mod stats;
pub mod substitution;


pub use annotator::http::HttpProfileLoader;
pub use annotator::rules::{BuiltinProfileLoader, RuleAnnotator};
pub use annotator::{
    AnnotatedSentence, AnnotatedToken, AnnotationError, Annotator, ProfileLoader, TokenAttributes,
};
pub use assembler::{
    missing_placeholders, sentence_only, verify_placeholders, ArtifactPaths, ExtractionOutput,
    ExtractionSummary,
};
pub use classifier::{Classifier, Decision, Fragment, RejectReason, SourceKind, TranslateOverride};
pub use config::{
    ClassifierConfig, ConfigError, ExtractorConfig, LanguageConfig, OutputConfig,
    StructuredDataConfig,
};
pub use error::ExtractError;
pub use ids::{find_placeholders, BlockCounter, BlockId, SentenceId, WordId};
pub use language::{normalize_code, LanguageMode, LanguageRouter};
pub use pipeline::Extractor;
pub use records::{BlockRecord, FlatMap, SentenceRecord, StructuredMap, WordRecord};
pub use stats::LanguageStats;
