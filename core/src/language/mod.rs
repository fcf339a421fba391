//! Language routing: per-fragment language resolution and annotator profile
//! acquisition with a per-run cache.

pub mod detect;

use crate::annotator::{AnnotationError, AnnotatorProfile, ProfileCache, ProfileLoader};
use isolang::Language;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LanguageError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("annotation profile for default language '{language}' is unavailable: {reason}")]
    ProfileUnavailable { language: String, reason: String },
}

/// How fragment languages are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageMode {
    /// Every fragment uses this code; no detection.
    Fixed(String),
    /// Detect per fragment, falling back to `default`.
    Auto { default: String },
}

impl LanguageMode {
    pub fn from_options(language: Option<&str>, default_language: &str) -> Self {
        match language {
            Some(code) if !code.trim().is_empty() => LanguageMode::Fixed(code.to_string()),
            _ => LanguageMode::Auto {
                default: default_language.to_string(),
            },
        }
    }
}

/// Normalize a language tag to the profile code set: ISO 639-1 where one
/// exists, otherwise ISO 639-3. Regional variants collapse to the base code.
pub fn normalize_code(code: &str) -> Option<String> {
    let lowered = code.trim().to_lowercase().replace('_', "-");
    let base = lowered.split('-').next().unwrap_or_default();

    let base = match base {
        // Deprecated ISO 639-1 codes still seen in lang attributes
        "iw" => "he",
        "in" => "id",
        "ji" => "yi",
        other => other,
    };

    match base.len() {
        2 => Language::from_639_1(base).map(|_| base.to_string()),
        3 => {
            let part2t = match base {
                "fre" => "fra",
                "ger" => "deu",
                "dut" => "nld",
                "gre" => "ell",
                "chi" => "zho",
                "cze" => "ces",
                "ice" => "isl",
                "alb" => "sqi",
                "arm" => "hye",
                "baq" => "eus",
                "bur" => "mya",
                "per" => "fas",
                "geo" => "kat",
                "may" => "msa",
                "mac" => "mkd",
                "rum" => "ron",
                "slo" => "slk",
                "wel" => "cym",
                other => other,
            };
            let language = Language::from_639_3(part2t)?;
            Some(
                language
                    .to_639_1()
                    .map(str::to_string)
                    .unwrap_or_else(|| part2t.to_string()),
            )
        }
        _ => None,
    }
}

/// Resolves fragment languages and hands out cached annotator profiles.
pub struct LanguageRouter {
    mode: LanguageMode,
    default: String,
    loader: Box<dyn ProfileLoader>,
    cache: ProfileCache,
    use_hints: bool,
}

impl LanguageRouter {
    /// Validates the configured codes before any processing happens.
    pub fn new(mode: LanguageMode, loader: Box<dyn ProfileLoader>) -> Result<Self, LanguageError> {
        let validate = |code: &str| -> Result<String, LanguageError> {
            normalize_code(code)
                .filter(|normalized| loader.supports(normalized))
                .ok_or_else(|| LanguageError::UnsupportedLanguage(code.to_string()))
        };

        let (mode, default) = match mode {
            LanguageMode::Fixed(code) => {
                let code = validate(&code)?;
                (LanguageMode::Fixed(code.clone()), code)
            }
            LanguageMode::Auto { default } => {
                let default = validate(&default)?;
                (
                    LanguageMode::Auto {
                        default: default.clone(),
                    },
                    default,
                )
            }
        };

        log::debug!(
            "Language router ready (mode: {:?}, loader: {})",
            mode,
            loader.name()
        );

        Ok(Self {
            mode,
            default,
            loader,
            cache: ProfileCache::new(),
            use_hints: true,
        })
    }

    pub fn with_lang_hints(mut self, enabled: bool) -> Self {
        self.use_hints = enabled;
        self
    }

    pub fn mode(&self) -> &LanguageMode {
        &self.mode
    }

    pub fn default_language(&self) -> &str {
        &self.default
    }

    /// Pick the language for one fragment. `hint` is the nearest `lang`
    /// attribute, consulted only when detection fails.
    pub fn resolve(&self, text: &str, hint: Option<&str>) -> String {
        if let LanguageMode::Fixed(code) = &self.mode {
            return code.clone();
        }

        if let Some(detected) = detect::detect(text) {
            if self.loader.supports(detected) {
                return detected.to_string();
            }
            log::debug!("Detected language '{}' has no profile support", detected);
        }

        if self.use_hints {
            if let Some(code) = hint
                .and_then(normalize_code)
                .filter(|code| self.loader.supports(code))
            {
                return code;
            }
        }

        self.default.clone()
    }

    /// Cached profile for `language`, acquiring it on first use.
    pub fn get_profile(&mut self, language: &str) -> Result<AnnotatorProfile, AnnotationError> {
        if let Some(profile) = self.cache.get(language) {
            return Ok(profile);
        }
        if let Some(reason) = self.cache.failure(language) {
            return Err(AnnotationError::ProfileLoad {
                language: language.to_string(),
                reason: reason.to_string(),
            });
        }

        log::info!("Loading annotation profile '{}' via {}", language, self.loader.name());
        match self.loader.load(language) {
            Ok(annotator) => {
                let profile: AnnotatorProfile = Arc::from(annotator);
                Ok(self.cache.insert(language, profile))
            }
            Err(err) => {
                self.cache.record_failure(language, err.to_string());
                Err(err)
            }
        }
    }

    /// Profile for `language`, or the default profile when it cannot be
    /// acquired. Returns the language actually used.
    pub fn profile_for(
        &mut self,
        language: &str,
    ) -> Result<(String, AnnotatorProfile), LanguageError> {
        match self.get_profile(language) {
            Ok(profile) => Ok((language.to_string(), profile)),
            Err(err) if language != self.default => {
                log::warn!(
                    "Profile for '{}' unavailable ({}); falling back to '{}'",
                    language,
                    err,
                    self.default
                );
                let default = self.default.clone();
                self.profile_for(&default)
            }
            Err(err) => Err(LanguageError::ProfileUnavailable {
                language: language.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    pub fn loaded_languages(&self) -> Vec<String> {
        self.cache.languages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotator::rules::BuiltinProfileLoader;
    use crate::annotator::{AnnotatedSentence, Annotator};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLoader {
        loads: Arc<AtomicUsize>,
        broken: &'static [&'static str],
    }

    struct Silent(String);

    impl Annotator for Silent {
        fn language(&self) -> &str {
            &self.0
        }

        fn annotate(&self, _text: &str) -> Result<Vec<AnnotatedSentence>, AnnotationError> {
            Ok(Vec::new())
        }
    }

    impl ProfileLoader for CountingLoader {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn supports(&self, language: &str) -> bool {
            ["en", "de", "fr", "ja"].contains(&language)
        }

        fn load(&self, language: &str) -> Result<Box<dyn Annotator>, AnnotationError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.broken.contains(&language) {
                return Err(AnnotationError::ProfileLoad {
                    language: language.to_string(),
                    reason: "model missing".into(),
                });
            }
            Ok(Box::new(Silent(language.to_string())))
        }
    }

    fn counting(broken: &'static [&'static str]) -> (Box<dyn ProfileLoader>, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        (
            Box::new(CountingLoader {
                loads: loads.clone(),
                broken,
            }),
            loads,
        )
    }

    #[test]
    fn normalizes_codes() {
        assert_eq!(normalize_code("EN").as_deref(), Some("en"));
        assert_eq!(normalize_code("pt_BR").as_deref(), Some("pt"));
        assert_eq!(normalize_code("zh-Hant-TW").as_deref(), Some("zh"));
        assert_eq!(normalize_code("ger").as_deref(), Some("de"));
        assert_eq!(normalize_code("fra").as_deref(), Some("fr"));
        assert_eq!(normalize_code("iw").as_deref(), Some("he"));
        assert_eq!(normalize_code("xx"), None);
        assert_eq!(normalize_code(""), None);
    }

    #[test]
    fn rejects_unsupported_explicit_language() {
        let result = LanguageRouter::new(
            LanguageMode::Fixed("xx".into()),
            Box::new(BuiltinProfileLoader),
        );
        assert!(matches!(result, Err(LanguageError::UnsupportedLanguage(code)) if code == "xx"));

        let result = LanguageRouter::new(
            LanguageMode::Auto {
                default: "sw".into(),
            },
            Box::new(BuiltinProfileLoader),
        );
        assert!(matches!(result, Err(LanguageError::UnsupportedLanguage(_))));
    }

    #[test]
    fn fixed_mode_skips_detection() {
        let router =
            LanguageRouter::new(LanguageMode::Fixed("DE".into()), Box::new(BuiltinProfileLoader))
                .unwrap();
        assert_eq!(router.resolve("The cat is on the mat and it sleeps", None), "de");
    }

    #[test]
    fn auto_mode_falls_back_to_hint_then_default() {
        let router = LanguageRouter::new(
            LanguageMode::Auto {
                default: "en".into(),
            },
            Box::new(BuiltinProfileLoader),
        )
        .unwrap();
        assert_eq!(router.resolve("Der Hund ist nicht hier und die Katze auch", None), "de");
        assert_eq!(router.resolve("Bonjour", Some("fr-CA")), "fr");
        assert_eq!(router.resolve("Bonjour", Some("tlh")), "en");
        assert_eq!(router.resolve("Bonjour", None), "en");

        let router = router.with_lang_hints(false);
        assert_eq!(router.resolve("Bonjour", Some("fr")), "en");
    }

    #[test]
    fn profiles_are_loaded_once() {
        let (loader, loads) = counting(&[]);
        let mut router = LanguageRouter::new(
            LanguageMode::Auto {
                default: "en".into(),
            },
            loader,
        )
        .unwrap();

        let first = router.get_profile("de").unwrap();
        let second = router.get_profile("de").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(router.loaded_languages(), vec!["de".to_string()]);
    }

    #[test]
    fn broken_profile_falls_back_to_default() {
        let (loader, loads) = counting(&["ja"]);
        let mut router = LanguageRouter::new(
            LanguageMode::Auto {
                default: "en".into(),
            },
            loader,
        )
        .unwrap();

        let (used, profile) = router.profile_for("ja").unwrap();
        assert_eq!(used, "en");
        assert_eq!(profile.language(), "en");

        // The failure is remembered; no second load attempt.
        let (used, _) = router.profile_for("ja").unwrap();
        assert_eq!(used, "en");
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn broken_default_is_fatal() {
        let (loader, _) = counting(&["en"]);
        let mut router = LanguageRouter::new(
            LanguageMode::Auto {
                default: "en".into(),
            },
            loader,
        )
        .unwrap();

        assert!(matches!(
            router.profile_for("de"),
            Ok((ref used, _)) if used == "de"
        ));
        assert!(matches!(
            router.profile_for("en"),
            Err(LanguageError::ProfileUnavailable { .. })
        ));
    }
}
