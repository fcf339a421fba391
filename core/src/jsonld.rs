//! Structured-data walker for embedded JSON-LD payloads.
//!
//! Mapping keys are visited in encounter order and sequence elements in index
//! order. String leaves whose key passes the [`KeyPolicy`] are handed to a
//! [`LeafExtractor`], which may overwrite the leaf in place. The block counter
//! is threaded through the recursion so identifiers stay in visiting order.

use crate::config::StructuredDataConfig;
use crate::ids::BlockCounter;
use serde_json::Value;
use std::collections::HashSet;

const RESERVED_PREFIX: char = '@';

const NON_TEXT_KEY_WORDS: &[&str] = &["url", "uri", "href", "link", "date", "time", "duration"];
const NON_TEXT_KEY_SUFFIXES: &[&str] = &["type", "code"];
const URL_VALUE_PREFIXES: &[&str] = &["http://", "https://", "//", "mailto:", "tel:"];

/// Which mapping keys hold translatable strings.
#[derive(Debug, Clone)]
pub struct KeyPolicy {
    translatable: HashSet<String>,
    excluded: HashSet<String>,
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self::new(&StructuredDataConfig::default())
    }
}

impl KeyPolicy {
    pub fn new(config: &StructuredDataConfig) -> Self {
        Self {
            translatable: config.translatable_keys.iter().cloned().collect(),
            excluded: config.excluded_keys.iter().cloned().collect(),
        }
    }

    pub fn accepts(&self, key: &str) -> bool {
        if self.translatable.contains(key) {
            return true;
        }
        !key.starts_with(RESERVED_PREFIX)
            && !is_non_text_key(key)
            && !self.excluded.contains(key)
    }
}

/// Lowercased words of a camelCase, snake_case or kebab-case key.
/// `contentURL` gives `content`, `url`; `start_date` gives `start`, `date`.
fn key_words(key: &str) -> Vec<String> {
    let chars: Vec<char> = key.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev_upper = chars[i - 1].is_uppercase();
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if !prev_upper || next_lower {
                words.push(std::mem::take(&mut current));
            }
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// URL, date, time, type, identifier and code fields.
fn is_non_text_key(key: &str) -> bool {
    let lowered = key.to_ascii_lowercase();
    key_words(key)
        .iter()
        .any(|word| NON_TEXT_KEY_WORDS.contains(&word.as_str()))
        || NON_TEXT_KEY_SUFFIXES
            .iter()
            .any(|suffix| lowered.ends_with(suffix))
        || key.ends_with("Id")
        || lowered == "id"
}

/// Absolute URLs are never text, whatever key holds them.
fn is_url_value(value: &str) -> bool {
    let value = value.trim_start();
    URL_VALUE_PREFIXES.iter().any(|prefix| {
        value
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// A string leaf reached by the walk.
#[derive(Debug, Clone, Copy)]
pub struct StringLeaf<'a> {
    /// Mapping key, or the key of the sequence holding the string.
    pub key: &'a str,
    /// `$.author.name`, `$.review[0].body`
    pub path: &'a str,
}

pub trait LeafExtractor {
    type Error;

    fn extract_leaf(
        &mut self,
        counter: &mut BlockCounter,
        leaf: StringLeaf<'_>,
        slot: &mut Value,
    ) -> Result<(), Self::Error>;
}

/// Walk a whole payload from its root.
pub fn walk_payload<E: LeafExtractor>(
    payload: &mut Value,
    policy: &KeyPolicy,
    counter: &mut BlockCounter,
    extractor: &mut E,
) -> Result<(), E::Error> {
    walk(payload, "$", None, policy, counter, extractor)
}

pub fn walk<E: LeafExtractor>(
    node: &mut Value,
    path: &str,
    key: Option<&str>,
    policy: &KeyPolicy,
    counter: &mut BlockCounter,
    extractor: &mut E,
) -> Result<(), E::Error> {
    match node {
        Value::Object(map) => {
            for (child_key, child) in map.iter_mut() {
                let child_path = format!("{}.{}", path, child_key);
                visit_child(
                    child,
                    &child_path,
                    Some(child_key.as_str()),
                    policy,
                    counter,
                    extractor,
                )?;
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter_mut().enumerate() {
                let child_path = format!("{}[{}]", path, index);
                visit_child(item, &child_path, key, policy, counter, extractor)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn visit_child<E: LeafExtractor>(
    child: &mut Value,
    path: &str,
    key: Option<&str>,
    policy: &KeyPolicy,
    counter: &mut BlockCounter,
    extractor: &mut E,
) -> Result<(), E::Error> {
    match child {
        Value::String(text) => {
            if is_url_value(text) {
                return Ok(());
            }
            if let Some(key) = key.filter(|key| policy.accepts(key)) {
                extractor.extract_leaf(counter, StringLeaf { key, path }, child)?;
            }
            Ok(())
        }
        Value::Object(_) | Value::Array(_) => walk(child, path, key, policy, counter, extractor),
        _ => Ok(()),
    }
}

/// Serialize a mutated payload for writing back into its script element.
pub fn render_payload(payload: &Value) -> Result<String, serde_json::Error> {
    let pretty = serde_json::to_string_pretty(payload)?;
    // "</script>" inside a string would end the element early.
    Ok(pretty.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Records paths and replaces each accepted leaf with the next block id.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<(String, String)>,
    }

    impl LeafExtractor for Recorder {
        type Error = ();

        fn extract_leaf(
            &mut self,
            counter: &mut BlockCounter,
            leaf: StringLeaf<'_>,
            slot: &mut Value,
        ) -> Result<(), ()> {
            self.seen.push((leaf.key.to_string(), leaf.path.to_string()));
            *slot = Value::String(counter.advance().to_string());
            Ok(())
        }
    }

    #[test]
    fn key_policy() {
        let policy = KeyPolicy::default();
        assert!(policy.accepts("name"));
        assert!(policy.accepts("streetAddress"));
        assert!(!policy.accepts("uploadDate"));
        assert!(!policy.accepts("@type"));
        assert!(!policy.accepts("contentUrl"));
        assert!(!policy.accepts("productId"));
        assert!(!policy.accepts("countryCode"));
        assert!(!policy.accepts("fileType"));
        assert!(!policy.accepts("sku"));
        assert!(!policy.accepts("start_date"));
        assert!(!policy.accepts("contentURL"));
        assert!(!policy.accepts("publicationTime"));
    }

    #[test]
    fn key_heuristic_matches_whole_words() {
        let policy = KeyPolicy::default();
        for key in ["jurisdiction", "securityNotes", "tourismInfo", "candidate", "linkedinBio"] {
            assert!(policy.accepts(key), "{} should be accepted", key);
        }
        assert_eq!(key_words("contentURL"), vec!["content", "url"]);
        assert_eq!(key_words("HTMLTitle"), vec!["html", "title"]);
        assert_eq!(key_words("start_date"), vec!["start", "date"]);
    }

    #[test]
    fn non_ascii_values_are_walked() {
        let mut payload = json!({
            "name": "北京",
            "description": "Éclair à la crème",
            "slogan": "ñ",
            "alternateName": "日本語のテキスト",
            "url": "https://例え.jp/"
        });
        let mut counter = BlockCounter::new();
        let mut recorder = Recorder::default();
        walk_payload(&mut payload, &KeyPolicy::default(), &mut counter, &mut recorder).unwrap();

        assert_eq!(recorder.seen.len(), 4);
        assert!(!is_url_value("北京"));
        assert!(!is_url_value("ñ"));
        assert!(is_url_value("https://例え.jp/"));
    }

    #[test]
    fn url_values_are_skipped() {
        let mut payload = json!({"availability": "https://schema.org/InStock", "slogan": "Ride more"});
        let mut counter = BlockCounter::new();
        let mut recorder = Recorder::default();
        walk_payload(&mut payload, &KeyPolicy::default(), &mut counter, &mut recorder).unwrap();
        assert_eq!(recorder.seen, vec![("slogan".to_string(), "$.slogan".to_string())]);
        assert!(is_url_value("HTTPS://example.com"));
        assert!(!is_url_value("http"));
    }

    #[test]
    fn extracts_only_accepted_keys() {
        let mut payload = json!({"name": "Acme Corp", "uploadDate": "2024-01-01"});
        let mut counter = BlockCounter::new();
        let mut recorder = Recorder::default();
        walk_payload(&mut payload, &KeyPolicy::default(), &mut counter, &mut recorder).unwrap();

        assert_eq!(recorder.seen, vec![("name".to_string(), "$.name".to_string())]);
        assert_eq!(payload, json!({"name": "BLOCK_1", "uploadDate": "2024-01-01"}));
    }

    #[test]
    fn walks_nested_payloads_in_order() {
        let mut payload = json!({
            "@context": "https://schema.org",
            "@type": "Product",
            "name": "Bike",
            "review": [
                {"@type": "Review", "reviewBody": "Great bike.", "author": {"name": "Ann"}},
                {"reviewBody": "Too heavy."}
            ],
            "keywords": ["fast", "red"],
            "offers": {"price": "99.00", "priceCurrency": "EUR"}
        });
        let mut counter = BlockCounter::new();
        let mut recorder = Recorder::default();
        walk_payload(&mut payload, &KeyPolicy::default(), &mut counter, &mut recorder).unwrap();

        let paths: Vec<&str> = recorder.seen.iter().map(|(_, p)| p.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "$.name",
                "$.review[0].reviewBody",
                "$.review[0].author.name",
                "$.review[1].reviewBody",
                "$.keywords[0]",
                "$.keywords[1]",
            ]
        );
        assert_eq!(recorder.seen[4].0, "keywords");
        assert_eq!(payload["@type"], json!("Product"));
        assert_eq!(payload["offers"]["price"], json!("99.00"));
        assert_eq!(counter.issued(), 6);
    }

    #[test]
    fn renders_without_closing_script_tags() {
        let rendered = render_payload(&json!({"text": "a </script> b", "name": "Café"})).unwrap();
        assert!(rendered.contains("<\\/script>"));
        assert!(rendered.contains("Café"));
        assert!(!rendered.contains("</script>"));
    }
}
