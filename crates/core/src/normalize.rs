//! Whitespace and Unicode cleanup for text pulled out of slides.
//!
//! Extracted text is composed to NFC, line endings become `\n`, runs of
//! spaces and tabs collapse, and vertical tabs (PowerPoint's soft line break
//! in plain-text form) become newlines.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse multiple horizontal whitespace characters into one.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{00A0}]+").unwrap());

/// Three or more consecutive newlines.
static BLANK_LINES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

#[derive(Debug, Clone)]
pub struct TextNormalizer {
    /// Whether to keep empty lines between paragraphs.
    keep_empty_lines: bool,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            keep_empty_lines: true,
        }
    }

    pub fn with_keep_empty_lines(mut self, keep: bool) -> Self {
        self.keep_empty_lines = keep;
        self
    }

    /// Normalize a block of text, preserving line structure.
    pub fn normalize(&self, text: &str) -> String {
        let composed: String = text.nfc().collect();
        let unified = composed
            .replace("\r\n", "\n")
            .replace(['\r', '\u{000B}'], "\n");

        let lines = unified.lines().map(|line| {
            WHITESPACE_COLLAPSE_REGEX
                .replace_all(line, " ")
                .trim()
                .to_string()
        });

        if self.keep_empty_lines {
            let joined = lines.collect::<Vec<_>>().join("\n");
            BLANK_LINES_REGEX
                .replace_all(joined.trim_matches('\n'), "\n\n")
                .to_string()
        } else {
            lines.filter(|l| !l.is_empty()).collect::<Vec<_>>().join("\n")
        }
    }

    /// Non-empty normalized lines.
    pub fn normalize_to_lines(&self, text: &str) -> Vec<String> {
        self.normalize(text)
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("Hello    world"), "Hello world");
        assert_eq!(normalizer.normalize("  Hello  "), "Hello");
        assert_eq!(normalizer.normalize("\t\tHello\t\t"), "Hello");
    }

    #[test]
    fn test_line_endings_and_vertical_tab() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("One\r\nTwo\rThree"), "One\nTwo\nThree");
        assert_eq!(normalizer.normalize("Soft\u{000B}break"), "Soft\nbreak");
    }

    #[test]
    fn test_blank_lines_limited() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("\nA\n\n\n\nB\n"), "A\n\nB");
        let strict = TextNormalizer::new().with_keep_empty_lines(false);
        assert_eq!(strict.normalize("A\n\n\nB"), "A\nB");
    }

    #[test]
    fn test_nfc_composition() {
        let normalizer = TextNormalizer::new();
        let decomposed = "Cafe\u{0301}";
        assert_eq!(normalizer.normalize(decomposed), "Caf\u{00E9}");
    }

    #[test]
    fn test_normalize_to_lines_filters_empty() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize_to_lines("Hello\n\n\nWorld"), vec!["Hello", "World"]);
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("one two  three\nfour"), 4);
        assert_eq!(word_count("   "), 0);
    }
}
