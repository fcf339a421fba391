use crate::annotator::AnnotationError;
use crate::config::ConfigError;
use crate::language::LanguageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("annotation profile for '{language}' is unavailable: {reason}")]
    ProfileUnavailable { language: String, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Annotation(#[from] AnnotationError),
}

impl From<LanguageError> for ExtractError {
    fn from(err: LanguageError) -> Self {
        match err {
            LanguageError::UnsupportedLanguage(code) => ExtractError::UnsupportedLanguage(code),
            LanguageError::ProfileUnavailable { language, reason } => {
                ExtractError::ProfileUnavailable { language, reason }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
