/// Heuristic language identification: dominant script first, then stop-word
/// scoring for Latin-script text.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Script {
    Latin,
    Han,
    Kana,
    Hangul,
    Cyrillic,
    Greek,
    Arabic,
    Hebrew,
    Devanagari,
    Thai,
}

const SCRIPTS: [Script; 10] = [
    Script::Latin,
    Script::Han,
    Script::Kana,
    Script::Hangul,
    Script::Cyrillic,
    Script::Greek,
    Script::Arabic,
    Script::Hebrew,
    Script::Devanagari,
    Script::Thai,
];

fn script_of(c: char) -> Option<Script> {
    let script = match c as u32 {
        0x0041..=0x005A | 0x0061..=0x007A | 0x00C0..=0x024F | 0x1E00..=0x1EFF => Script::Latin,
        0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0xF900..=0xFAFF => Script::Han,
        0x3040..=0x30FF | 0x31F0..=0x31FF => Script::Kana,
        0xAC00..=0xD7AF | 0x1100..=0x11FF | 0x3130..=0x318F => Script::Hangul,
        0x0400..=0x04FF | 0x0500..=0x052F => Script::Cyrillic,
        0x0370..=0x03FF | 0x1F00..=0x1FFF => Script::Greek,
        0x0600..=0x06FF | 0x0750..=0x077F => Script::Arabic,
        0x0590..=0x05FF => Script::Hebrew,
        0x0900..=0x097F => Script::Devanagari,
        0x0E00..=0x0E7F => Script::Thai,
        _ => return None,
    };
    // Latin range above includes × and ÷
    if script == Script::Latin && !c.is_alphabetic() {
        return None;
    }
    Some(script)
}

const STOP_WORDS: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "and", "is", "are", "of", "to", "that", "it", "with", "for", "this", "was",
            "you", "not", "be", "have", "on", "they", "from",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "und", "ist", "nicht", "ein", "eine", "mit", "ich", "sie", "zu",
            "den", "von", "auf", "für", "auch", "sich", "wir",
        ],
    ),
    (
        "fr",
        &[
            "le", "la", "les", "et", "est", "une", "des", "du", "pour", "dans", "qui", "pas",
            "sur", "avec", "ce", "nous", "vous", "au", "sont",
        ],
    ),
    (
        "es",
        &[
            "el", "la", "los", "las", "y", "es", "una", "que", "por", "para", "con", "del", "se",
            "muy", "está", "pero", "como", "su", "al",
        ],
    ),
    (
        "it",
        &[
            "il", "la", "di", "che", "è", "per", "non", "della", "sono", "gli", "anche", "come",
            "questo", "nel", "alla", "una", "ma", "con", "lo",
        ],
    ),
    (
        "pt",
        &[
            "o", "os", "as", "é", "um", "uma", "em", "não", "para", "com", "do", "da", "por",
            "muito", "mas", "você", "isso", "ao", "são",
        ],
    ),
    (
        "nl",
        &[
            "de", "het", "een", "en", "is", "van", "dat", "niet", "op", "met", "voor", "zijn",
            "ook", "er", "maar", "ik", "je", "wij", "deze",
        ],
    ),
];

const MIN_STOP_WORD_HITS: usize = 2;

/// Identify the language of `text`, or `None` when the evidence is too weak
/// or ambiguous.
pub fn detect(text: &str) -> Option<&'static str> {
    let mut counts = [0usize; SCRIPTS.len()];
    for c in text.chars() {
        if let Some(script) = script_of(c) {
            if let Some(index) = SCRIPTS.iter().position(|s| *s == script) {
                counts[index] += 1;
            }
        }
    }

    let count = |script: Script| {
        SCRIPTS
            .iter()
            .position(|s| *s == script)
            .map(|index| counts[index])
            .unwrap_or(0)
    };

    let (dominant, dominant_count) = SCRIPTS
        .iter()
        .zip(counts.iter())
        .filter(|(script, _)| **script != Script::Kana)
        .map(|(script, n)| {
            // Kana only ever appears alongside or instead of Han in Japanese.
            if *script == Script::Han {
                (*script, *n + count(Script::Kana))
            } else {
                (*script, *n)
            }
        })
        .max_by_key(|(_, n)| *n)?;

    if dominant_count == 0 {
        return None;
    }

    match dominant {
        Script::Latin => detect_latin(text),
        Script::Han | Script::Kana => {
            if count(Script::Kana) > 0 {
                Some("ja")
            } else {
                Some("zh")
            }
        }
        Script::Hangul => Some("ko"),
        Script::Cyrillic => Some("ru"),
        Script::Greek => Some("el"),
        Script::Arabic => Some("ar"),
        Script::Hebrew => Some("he"),
        Script::Devanagari => Some("hi"),
        Script::Thai => Some("th"),
    }
}

fn detect_latin(text: &str) -> Option<&'static str> {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphabetic())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
        .collect();

    let mut scores: Vec<(&'static str, usize)> = STOP_WORDS
        .iter()
        .map(|(language, stop_words)| {
            let hits = words
                .iter()
                .filter(|word| stop_words.contains(&word.as_str()))
                .count();
            (*language, hits)
        })
        .collect();
    scores.sort_by(|a, b| b.1.cmp(&a.1));

    let (best, best_hits) = scores[0];
    let runner_up = scores.get(1).map(|(_, hits)| *hits).unwrap_or(0);
    if best_hits < MIN_STOP_WORD_HITS || best_hits == runner_up {
        return None;
    }
    Some(best)
}
