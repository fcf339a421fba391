/// Configuration for the extraction pipeline
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("unsupported config format: {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Whitelists and skip-contexts for the translatability rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassifierConfig {
    pub translatable_tags: Vec<String>,
    pub translatable_attributes: Vec<String>,
    pub meta_fields: Vec<String>,
    pub skip_tags: Vec<String>,
    pub skip_classes: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            translatable_tags: strings(&[
                "p", "span", "div", "h1", "h2", "h3", "h4", "h5", "h6", "label", "button", "li",
                "td", "th", "a", "strong", "em", "b", "i", "caption", "summary", "figcaption",
                "option", "optgroup", "legend", "mark", "output", "details", "time", "dt", "dd",
                "blockquote", "q", "cite", "small",
            ]),
            translatable_attributes: strings(&[
                "alt",
                "title",
                "placeholder",
                "aria-label",
                "aria-placeholder",
                "aria-valuetext",
                "aria-roledescription",
                "aria-description",
                "value",
                "data-i18n",
                "data-caption",
                "data-title",
                "data-tooltip",
                "data-label",
                "data-error",
            ]),
            meta_fields: strings(&[
                "description",
                "keywords",
                "author",
                "application-name",
                "og:title",
                "og:description",
                "og:site_name",
                "og:image:alt",
                "twitter:title",
                "twitter:description",
                "twitter:image:alt",
            ]),
            skip_tags: strings(&[
                "code", "pre", "kbd", "samp", "var", "noscript", "template", "svg", "canvas",
                "math",
            ]),
            skip_classes: strings(&["notranslate"]),
        }
    }
}

/// Key policy for embedded JSON-LD payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredDataConfig {
    pub enabled: bool,
    pub translatable_keys: Vec<String>,
    pub excluded_keys: Vec<String>,
}

impl Default for StructuredDataConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            translatable_keys: strings(&[
                "name",
                "headline",
                "alternativeHeadline",
                "description",
                "text",
                "caption",
                "abstract",
                "articleBody",
                "reviewBody",
                "disambiguatingDescription",
                "slogan",
                "jobTitle",
                "award",
                "keywords",
                "alternateName",
            ]),
            excluded_keys: strings(&[
                "@id",
                "@type",
                "@context",
                "url",
                "sameAs",
                "image",
                "logo",
                "contentUrl",
                "embedUrl",
                "thumbnailUrl",
                "email",
                "telephone",
                "faxNumber",
                "identifier",
                "sku",
                "gtin",
                "gtin13",
                "gtin8",
                "mpn",
                "isbn",
                "priceCurrency",
                "price",
                "currency",
                "inLanguage",
                "encodingFormat",
                "uploadDate",
                "datePublished",
                "dateModified",
                "dateCreated",
                "startDate",
                "endDate",
                "duration",
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageConfig {
    /// Fixed language for every fragment; detection runs when unset.
    pub language: Option<String>,
    pub default_language: String,
    /// Base URL of a remote annotation service; the built-in rules are used when unset.
    pub annotator_url: Option<String>,
    /// Use the nearest `lang` attribute when detection fails.
    pub use_lang_attribute: bool,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            language: None,
            default_language: "en".to_string(),
            annotator_url: None,
            use_lang_attribute: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputConfig {
    pub flat_file: String,
    pub structured_file: String,
    pub sentences_file: String,
    pub document_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            flat_file: "translatable_flat.json".to_string(),
            structured_file: "translatable_structured.json".to_string(),
            sentences_file: "translatable_sentences.json".to_string(),
            document_file: "non_translatable.html".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractorConfig {
    pub classifier: ClassifierConfig,
    pub structured_data: StructuredDataConfig,
    pub language: LanguageConfig,
    pub output: OutputConfig,
}

impl ExtractorConfig {
    /// Load configuration from a `.yaml`, `.yml` or `.json` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
