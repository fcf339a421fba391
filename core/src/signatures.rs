/// Text signatures used by the translatability rules:
/// - Arithmetic expressions and equations
/// - Scientific notation and exponents
/// - Number-only strings (digits, separators, operators)
/// - Inline TeX markup
/// - Letters from non-Latin scripts
use once_cell::sync::Lazy;
use regex::Regex;

// Arithmetic expressions: numbers with operators + - × * ÷ / ^ = ≠ ≈ ≤ ≥ < >
// Examples: 2+2=4, 3.14 × 2, (a+b)/2
static MATH_EXPR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        \d+(?:\.\d+)?  # number
        \s*[+\-×*÷/^=≠≈≤≥<>]\s*  # operator with optional whitespace
        \d+(?:\.\d+)?  # another number
        |
        \([^)]+[+\-×*÷/^=≠≈≤≥<>][^)]+\)  # expressions in parentheses
        ",
    )
    .expect("valid math expression regex")
});

// Scientific notation: 1e-6, 2×10^9, 10^n
static SCIENTIFIC_NOTATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+(?:\.\d+)?[eE][+\-]?\d+|\d+(?:\.\d+)?\s*[×x]\s*10\^[\d\-]+|10\^\d+|10\^[a-z]")
        .expect("valid scientific notation regex")
});

// Only digits, separators and operators: 1,234.50 / 10 - 20 / (3×4)
static NUMBER_ONLY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\d.,\s\-–%+*/=<>()×÷^]+$").expect("valid number-only regex")
});

// x^2, a**b, m²
static EXPONENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\w\^\w|\w\*\*\w|[²³¹⁰⁴-⁹]").expect("valid exponent regex")
});

// E = mc, a ≤ b
static EQUATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9)\]]\s*[=≠≈≤≥<>]\s*[A-Za-z0-9(\[-]").expect("valid equation regex")
});

// \frac, $x$
static TEX_MARKUP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\[a-zA-Z]+|\$[^$\s][^$]*\$").expect("valid tex markup regex")
});

static LETTER_RUN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{L}{3,}").expect("valid letter run regex"));

static LEXICAL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{Alphabetic}\p{Nd}]").expect("valid lexical content regex"));

static EXCEPTION_SCRIPT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[\p{Han}\p{Hiragana}\p{Katakana}\p{Hangul}\p{Cyrillic}\p{Greek}\p{Arabic}\p{Hebrew}\p{Devanagari}\p{Bengali}\p{Thai}\p{Georgian}\p{Armenian}\p{Ethiopic}\p{Tamil}]",
    )
    .expect("valid exception script regex")
});

/// Whether `text` looks like a formula, number or notation rather than prose.
pub fn is_math_fragment(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    NUMBER_ONLY_REGEX.is_match(trimmed)
        || MATH_EXPR_REGEX.is_match(trimmed)
        || SCIENTIFIC_NOTATION_REGEX.is_match(trimmed)
        || EXPONENT_REGEX.is_match(trimmed)
        || EQUATION_REGEX.is_match(trimmed)
        || TEX_MARKUP_REGEX.is_match(trimmed)
}

/// Three or more consecutive letters of any script.
pub fn has_letter_run(text: &str) -> bool {
    LETTER_RUN_REGEX.is_match(text)
}

/// At least one alphabetic character of any script, or a decimal digit.
pub fn has_lexical_content(text: &str) -> bool {
    LEXICAL_REGEX.is_match(text)
}

/// Contains letters from a script that the Latin-centric rules would misjudge.
pub fn is_exception_language(text: &str) -> bool {
    EXCEPTION_SCRIPT_REGEX.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_math_fragments() {
        assert!(is_math_fragment("2+2=4"));
        assert!(is_math_fragment("1,234.50"));
        assert!(is_math_fragment("E = mc^2"));
        assert!(is_math_fragment("6.02e23"));
        assert!(is_math_fragment("x²"));
        assert!(is_math_fragment(r"\frac{a}{b}"));
        assert!(!is_math_fragment("Hello world"));
        assert!(!is_math_fragment(""));
    }

    #[test]
    fn letter_runs_need_three_letters() {
        assert!(has_letter_run("Total"));
        assert!(has_letter_run("東京都"));
        assert!(!has_letter_run("E = mc^2"));
        assert!(!has_letter_run("ab 12"));
    }

    #[test]
    fn lexical_content_is_any_script_or_digits() {
        assert!(has_lexical_content("abc"));
        assert!(has_lexical_content("42"));
        assert!(has_lexical_content("北京"));
        assert!(has_lexical_content("నమస్కారం"));
        assert!(has_lexical_content("សួស្តី"));
        assert!(has_lexical_content("ສະບາຍດີ"));
        assert!(!has_lexical_content("--- !!!"));
        assert!(!has_lexical_content("→ ★ ×"));
    }

    #[test]
    fn exception_scripts() {
        assert!(is_exception_language("北京"));
        assert!(is_exception_language("Привет"));
        assert!(is_exception_language("こんにちは"));
        assert!(is_exception_language("مرحبا"));
        assert!(!is_exception_language("Hello"));
        assert!(!is_exception_language("→ ★"));
    }
}
