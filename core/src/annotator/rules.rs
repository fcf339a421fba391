/// Rule-based annotator used when no remote annotation service is configured.
///
/// English and Japanese sentences are split by `sakurs_core`. Other languages
/// split on `.`, `!`, `?` and `…` followed by whitespace (skipping known
/// abbreviations and single-letter initials) and directly after full-width
/// terminators. Tokens are letter/digit runs, single CJK ideographs, kana
/// runs and single punctuation characters.
use super::{
    AnnotatedSentence, AnnotatedToken, AnnotationError, Annotator, ProfileLoader, TokenAttributes,
};
use sakurs_core::{Input, SentenceProcessor};
use std::collections::HashSet;
use std::sync::Mutex;

pub const BUILTIN_LANGUAGES: &[&str] = &[
    "ar", "de", "el", "en", "es", "fr", "he", "hi", "it", "ja", "ko", "nl", "pt", "ru", "th", "zh",
];

const EN_ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "prof.", "sr.", "jr.", "st.", "vs.", "etc.", "e.g.", "i.e.",
    "inc.", "ltd.", "co.", "corp.", "no.", "fig.", "approx.", "dept.", "est.", "jan.", "feb.",
    "mar.", "apr.", "jun.", "jul.", "aug.", "sep.", "sept.", "oct.", "nov.", "dec.",
];

const DE_ABBREVIATIONS: &[&str] = &[
    "z.b.", "bzw.", "usw.", "ca.", "dr.", "nr.", "str.", "evtl.", "ggf.", "inkl.", "u.a.",
    "d.h.", "vgl.", "bspw.",
];

const FR_ABBREVIATIONS: &[&str] = &[
    "m.", "mme.", "mlle.", "dr.", "etc.", "p.ex.", "cf.", "env.", "av.", "bd.",
];

const ES_ABBREVIATIONS: &[&str] = &[
    "sr.", "sra.", "srta.", "dr.", "dra.", "etc.", "p.ej.", "ud.", "uds.", "av.", "núm.",
];

/// Languages with native rules in `sakurs_core`.
const SAKURS_LANGUAGES: &[&str] = &["en", "ja"];

const CLOSING_MARKS: &[char] = &['"', '\'', '”', '’', '»', ')', ']', '」', '』', '）'];

const SYMBOL_MARKS: &[char] = &[
    '$', '%', '&', '*', '+', '<', '=', '>', '^', '|', '~', '#', '@', '`', '€', '£', '¥', '©',
    '®', '°', '±', '×', '÷',
];

pub struct RuleAnnotator {
    language: String,
    abbreviations: HashSet<&'static str>,
    processor: Option<Mutex<SentenceProcessor>>,
}

impl RuleAnnotator {
    pub fn new(language: &str) -> Self {
        let list: &[&str] = match language {
            "en" => EN_ABBREVIATIONS,
            "de" => DE_ABBREVIATIONS,
            "fr" => FR_ABBREVIATIONS,
            "es" => ES_ABBREVIATIONS,
            _ => &[],
        };
        let processor = if SAKURS_LANGUAGES.contains(&language) {
            match SentenceProcessor::with_language(language) {
                Ok(processor) => Some(Mutex::new(processor)),
                Err(err) => {
                    log::warn!("No sentence processor for '{}', using rules: {}", language, err);
                    None
                }
            }
        } else {
            None
        };
        Self {
            language: language.to_string(),
            abbreviations: list.iter().copied().collect(),
            processor,
        }
    }

    pub fn split_sentences<'t>(&self, text: &'t str) -> Vec<&'t str> {
        if let Some(sentences) = self.split_with_processor(text) {
            return sentences;
        }
        self.split_with_rules(text)
    }

    /// `None` when no processor applies or it failed on `text`.
    fn split_with_processor<'t>(&self, text: &'t str) -> Option<Vec<&'t str>> {
        let processor = self.processor.as_ref()?;
        if text.trim().is_empty() {
            return Some(Vec::new());
        }
        let output = {
            let processor = processor.lock().ok()?;
            processor.process(Input::from_text(text))
        };
        let output = match output {
            Ok(output) => output,
            Err(err) => {
                log::debug!("Sentence processor failed, using rules: {}", err);
                return None;
            }
        };

        let mut sentences = Vec::new();
        let mut start = 0usize;
        for boundary in &output.boundaries {
            if boundary.offset <= start {
                continue;
            }
            push_trimmed(&mut sentences, text.get(start..boundary.offset)?);
            start = boundary.offset;
        }
        push_trimmed(&mut sentences, text.get(start..)?);
        Some(sentences)
    }

    pub fn split_with_rules<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut sentences = Vec::new();
        let mut start = 0usize;
        let mut i = 0usize;

        while i < chars.len() {
            let (offset, c) = chars[i];
            let boundary = if is_fullwidth_terminator(c) {
                let mut j = i + 1;
                while j < chars.len()
                    && (is_fullwidth_terminator(chars[j].1) || CLOSING_MARKS.contains(&chars[j].1))
                {
                    j += 1;
                }
                Some(j)
            } else if is_terminator(c) {
                let mut j = i + 1;
                while j < chars.len()
                    && (is_terminator(chars[j].1) || CLOSING_MARKS.contains(&chars[j].1))
                {
                    j += 1;
                }
                let at_break = j == chars.len() || chars[j].1.is_whitespace();
                if at_break && !(c == '.' && self.is_abbreviation(text, offset)) {
                    Some(j)
                } else {
                    None
                }
            } else {
                None
            };

            match boundary {
                Some(j) => {
                    let end = chars.get(j).map(|(o, _)| *o).unwrap_or(text.len());
                    push_trimmed(&mut sentences, &text[start..end]);
                    start = end;
                    i = j;
                }
                None => i += 1,
            }
        }

        push_trimmed(&mut sentences, &text[start..]);
        sentences
    }

    fn is_abbreviation(&self, text: &str, dot_offset: usize) -> bool {
        let before = &text[..dot_offset];
        let word_start = before
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_alphabetic() || *c == '.')
            .last()
            .map(|(idx, _)| idx)
            .unwrap_or(dot_offset);
        let word = &before[word_start..];
        if word.is_empty() {
            return false;
        }

        // Initials: "J. Smith"
        let mut letters = word.chars();
        if let (Some(first), None) = (letters.next(), letters.next()) {
            if first.is_uppercase() {
                return true;
            }
        }

        let candidate = format!("{}.", word.to_lowercase());
        self.abbreviations.contains(candidate.as_str())
    }
}

impl Annotator for RuleAnnotator {
    fn language(&self) -> &str {
        &self.language
    }

    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedSentence>, AnnotationError> {
        Ok(self
            .split_sentences(text)
            .into_iter()
            .map(|sentence| AnnotatedSentence {
                text: sentence.to_string(),
                tokens: tokenize(sentence),
            })
            .collect())
    }
}

/// Loads [`RuleAnnotator`]s for the built-in language set.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinProfileLoader;

impl ProfileLoader for BuiltinProfileLoader {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn supports(&self, language: &str) -> bool {
        BUILTIN_LANGUAGES.contains(&language)
    }

    fn load(&self, language: &str) -> Result<Box<dyn Annotator>, AnnotationError> {
        if !self.supports(language) {
            return Err(AnnotationError::UnsupportedLanguage(language.to_string()));
        }
        Ok(Box::new(RuleAnnotator::new(language)))
    }
}

pub fn tokenize(sentence: &str) -> Vec<AnnotatedToken> {
    let chars: Vec<(usize, char)> = sentence.char_indices().collect();
    let end_of = |j: usize| chars.get(j).map(|(o, _)| *o).unwrap_or(sentence.len());
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        let (start, c) = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if is_ideograph(c) {
            tokens.push(make_token(&sentence[start..end_of(i + 1)]));
            i += 1;
            continue;
        }

        if let Some(script) = kana_script(c) {
            let mut j = i + 1;
            while j < chars.len() && kana_script(chars[j].1) == Some(script) {
                j += 1;
            }
            tokens.push(make_token(&sentence[start..end_of(j)]));
            i = j;
            continue;
        }

        if is_word_char(c) {
            let mut j = i + 1;
            while j < chars.len() {
                let ch = chars[j].1;
                if is_word_char(ch) {
                    j += 1;
                    continue;
                }
                let next = chars.get(j + 1).map(|(_, n)| *n);
                if is_inner_joiner(chars[j - 1].1, ch, next) {
                    j += 2;
                    continue;
                }
                break;
            }
            tokens.push(make_token(&sentence[start..end_of(j)]));
            i = j;
            continue;
        }

        tokens.push(make_token(&sentence[start..end_of(i + 1)]));
        i += 1;
    }

    tokens
}

fn make_token(text: &str) -> AnnotatedToken {
    AnnotatedToken {
        text: text.to_string(),
        attributes: TokenAttributes {
            pos: coarse_pos(text).map(str::to_string),
            ..TokenAttributes::default()
        },
    }
}

fn coarse_pos(token: &str) -> Option<&'static str> {
    let mut chars = token.chars();
    let first = chars.next()?;
    let single = chars.next().is_none();

    if token.chars().any(|c| c.is_ascii_digit())
        && token.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return Some("NUM");
    }
    if single && SYMBOL_MARKS.contains(&first) {
        return Some("SYM");
    }
    if single && !first.is_alphanumeric() {
        return Some("PUNCT");
    }
    None
}

fn push_trimmed<'t>(sentences: &mut Vec<&'t str>, candidate: &'t str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '…')
}

fn is_fullwidth_terminator(c: char) -> bool {
    matches!(c, '。' | '！' | '？' | '．')
}

fn is_ideograph(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
        || ('\u{3400}'..='\u{4DBF}').contains(&c)
        || ('\u{F900}'..='\u{FAFF}').contains(&c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kana {
    Hiragana,
    Katakana,
}

fn kana_script(c: char) -> Option<Kana> {
    if ('\u{3040}'..='\u{309F}').contains(&c) {
        Some(Kana::Hiragana)
    } else if ('\u{30A0}'..='\u{30FF}').contains(&c) {
        Some(Kana::Katakana)
    } else {
        None
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() && !is_ideograph(c) && kana_script(c).is_none()
}

fn is_inner_joiner(prev: char, c: char, next: Option<char>) -> bool {
    let Some(next) = next else {
        return false;
    };
    match c {
        '\'' | '’' | '-' => is_word_char(prev) && is_word_char(next),
        '.' | ',' => prev.is_ascii_digit() && next.is_ascii_digit(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[AnnotatedToken]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn english_and_japanese_use_sentence_processor() {
        let english = RuleAnnotator::new("en");
        assert!(english.processor.is_some());
        assert_eq!(
            english.split_sentences("Hello world. This is a test."),
            vec!["Hello world.", "This is a test."]
        );
        assert_eq!(english.split_sentences("No terminator here"), vec!["No terminator here"]);
        assert!(english.split_sentences("   ").is_empty());

        let japanese = RuleAnnotator::new("ja");
        assert_eq!(
            japanese.split_sentences("こんにちは。世界。"),
            vec!["こんにちは。", "世界。"]
        );
        assert!(RuleAnnotator::new("de").processor.is_none());
    }

    #[test]
    fn splits_simple_sentences() {
        let annotator = RuleAnnotator::new("de");
        assert_eq!(
            annotator.split_sentences("Guten Tag. Guten Morgen."),
            vec!["Guten Tag.", "Guten Morgen."]
        );
        assert_eq!(
            annotator.split_sentences("Wirklich?! Ja… \"Gut.\" Fertig"),
            vec!["Wirklich?!", "Ja…", "\"Gut.\"", "Fertig"]
        );
    }

    #[test]
    fn keeps_abbreviations_and_decimals_together() {
        let annotator = RuleAnnotator::new("de");
        assert_eq!(
            annotator.split_sentences("Dr. Müller zahlte 3.50 Euro, z.B. in Münzen. J. Doe stimmte zu."),
            vec!["Dr. Müller zahlte 3.50 Euro, z.B. in Münzen.", "J. Doe stimmte zu."]
        );
    }

    #[test]
    fn splits_fullwidth_terminators_without_spaces() {
        let annotator = RuleAnnotator::new("ja");
        assert_eq!(
            annotator.split_with_rules("今日は晴れです。明日は雨？「はい！」"),
            vec!["今日は晴れです。", "明日は雨？", "「はい！」"]
        );
        assert_eq!(
            RuleAnnotator::new("zh").split_sentences("你好。再见！"),
            vec!["你好。", "再见！"]
        );
    }

    #[test]
    fn tokenizes_words_and_punctuation() {
        let tokens = tokenize("Don't pay $3.50 - it's well-known.");
        assert_eq!(
            texts(&tokens),
            vec!["Don't", "pay", "$", "3.50", "-", "it's", "well-known", "."]
        );
        assert_eq!(tokens[2].attributes.pos.as_deref(), Some("SYM"));
        assert_eq!(tokens[3].attributes.pos.as_deref(), Some("NUM"));
        assert_eq!(tokens[7].attributes.pos.as_deref(), Some("PUNCT"));
        assert_eq!(tokens[0].attributes.pos, None);
    }

    #[test]
    fn tokenizes_cjk_text() {
        let tokens = tokenize("北京はカタカナ。");
        assert_eq!(texts(&tokens), vec!["北", "京", "は", "カタカナ", "。"]);
    }

    #[test]
    fn builtin_loader_rejects_unknown_languages() {
        let loader = BuiltinProfileLoader;
        assert!(loader.supports("en"));
        assert!(!loader.supports("xx"));
        assert!(loader.load("de").is_ok());
        assert!(matches!(
            loader.load("xx"),
            Err(AnnotationError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn annotate_preserves_order() {
        let annotator = RuleAnnotator::new("en");
        let sentences = annotator.annotate("One two. Three four.").unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(texts(&sentences[0].tokens), vec!["One", "two", "."]);
        assert_eq!(texts(&sentences[1].tokens), vec!["Three", "four", "."]);
    }
}
