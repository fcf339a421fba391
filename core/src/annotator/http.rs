use super::{AnnotatedSentence, AnnotationError, Annotator, ProfileLoader};
use crate::language::normalize_code;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct AnnotateRequest<'a> {
    text: &'a str,
    lang: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    sentences: Vec<AnnotatedSentence>,
}

/// Fetches annotation profiles from a remote service.
///
/// `GET {base}/models/{lang}` confirms a model exists (404 means the language
/// is unsupported); `POST {base}/annotate` segments one block of text.
#[derive(Debug, Clone)]
pub struct HttpProfileLoader {
    client: Client,
    base_url: String,
}

impl HttpProfileLoader {
    pub fn new(base_url: &str) -> Result<Self, AnnotationError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AnnotationError::Request(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ProfileLoader for HttpProfileLoader {
    fn name(&self) -> &'static str {
        "http"
    }

    fn supports(&self, language: &str) -> bool {
        normalize_code(language).is_some()
    }

    fn load(&self, language: &str) -> Result<Box<dyn Annotator>, AnnotationError> {
        let url = format!("{}/models/{}", self.base_url, language);
        log::debug!("Requesting annotation model: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| AnnotationError::ProfileLoad {
                language: language.to_string(),
                reason: err.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AnnotationError::UnsupportedLanguage(language.to_string()));
        }
        if !status.is_success() {
            return Err(AnnotationError::ProfileLoad {
                language: language.to_string(),
                reason: format!("model endpoint returned {}", status),
            });
        }

        Ok(Box::new(HttpAnnotator {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            language: language.to_string(),
        }))
    }
}

pub struct HttpAnnotator {
    client: Client,
    base_url: String,
    language: String,
}

impl Annotator for HttpAnnotator {
    fn language(&self) -> &str {
        &self.language
    }

    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedSentence>, AnnotationError> {
        let url = format!("{}/annotate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&AnnotateRequest {
                text,
                lang: &self.language,
            })
            .send()
            .map_err(|err| AnnotationError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnnotationError::Request(format!(
                "annotate returned {}: {}",
                status,
                body.trim()
            )));
        }

        let body = response
            .text()
            .map_err(|err| AnnotationError::Request(err.to_string()))?;
        let parsed: AnnotateResponse = serde_json::from_str(&body)
            .map_err(|err| AnnotationError::MalformedResponse(err.to_string()))?;
        Ok(parsed.sentences)
    }
}
