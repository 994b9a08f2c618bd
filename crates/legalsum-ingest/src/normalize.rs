//! Text normalization ahead of summarization.
//!
//! Pipeline: collapse whitespace → split sentences → per-sentence cleanup
//! (shouted text to title case, standard legal terms upper-cased) → join →
//! rejoin split section numbers. Normalization never fails.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use legalsum_core::{Error, Result};

use crate::segment::{RuleSegmenter, Segmenter, DEFAULT_ABBREVIATIONS};

static NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").unwrap());
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SPLIT_SECTION_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d+)\.\s+(\d+)\b").unwrap());

/// Tunable normalization policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// All-caps sentences with more words than this become title case;
    /// shorter ones are treated as headings and left alone.
    pub shouting_word_threshold: usize,
    /// Terms rewritten to upper case wherever they appear, in any case.
    pub standard_terms: Vec<String>,
    /// Abbreviations the default segmenter will not split after.
    pub abbreviations: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            shouting_word_threshold: 3,
            standard_terms: vec!["party a".into(), "party b".into()],
            abbreviations: DEFAULT_ABBREVIATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Sentence-aware text normalizer over a pluggable [`Segmenter`].
pub struct TextNormalizer<S = RuleSegmenter> {
    segmenter: S,
    shouting_word_threshold: usize,
    standard_terms: Option<Regex>,
}

impl TextNormalizer<RuleSegmenter> {
    /// Normalizer using the rule-based segmenter with the configured abbreviations.
    pub fn new(config: &NormalizerConfig) -> Result<Self> {
        Self::with_segmenter(RuleSegmenter::new(&config.abbreviations), config)
    }
}

impl Default for TextNormalizer<RuleSegmenter> {
    fn default() -> Self {
        Self::new(&NormalizerConfig::default()).expect("default standard terms compile")
    }
}

impl<S: Segmenter> TextNormalizer<S> {
    pub fn with_segmenter(segmenter: S, config: &NormalizerConfig) -> Result<Self> {
        let terms: Vec<String> = config
            .standard_terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(regex::escape)
            .collect();

        let standard_terms = if terms.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)\b(?:{})\b", terms.join("|"));
            Some(
                Regex::new(&pattern)
                    .map_err(|e| Error::Config(format!("invalid standard term: {}", e)))?,
            )
        };

        Ok(Self {
            segmenter,
            shouting_word_threshold: config.shouting_word_threshold,
            standard_terms,
        })
    }

    /// Normalize raw document text into a single cleaned line.
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let collapsed = collapse_whitespace(text);
        let sentences: Vec<String> = self
            .segmenter
            .segment(&collapsed)
            .map(|sentence| self.normalize_sentence(sentence))
            .collect();

        rejoin_section_numbers(&sentences.join(" "))
    }

    fn normalize_sentence(&self, sentence: &str) -> String {
        let mut cleaned = sentence.split_whitespace().collect::<Vec<_>>().join(" ");

        if is_shouted(sentence) && sentence.split_whitespace().count() > self.shouting_word_threshold {
            cleaned = to_title_case(&cleaned);
        }

        match &self.standard_terms {
            Some(re) => re
                .replace_all(&cleaned, |caps: &Captures| caps[0].to_uppercase())
                .into_owned(),
            None => cleaned,
        }
    }
}

static DEFAULT_NORMALIZER: Lazy<TextNormalizer> = Lazy::new(TextNormalizer::default);

/// Normalize text with the default policy and segmenter.
pub fn normalize(text: &str) -> String {
    DEFAULT_NORMALIZER.normalize(text)
}

/// Collapse newline runs, then every whitespace run, to a single space.
pub fn collapse_whitespace(text: &str) -> String {
    let single_newlines = NEWLINE_RUNS.replace_all(text, "\n");
    WHITESPACE_RUNS.replace_all(&single_newlines, " ").into_owned()
}

/// At least one cased character and no lower-case ones.
fn is_shouted(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

/// Capitalize the first letter of each space-separated word, lower-case the rest.
fn to_title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, word) in text.split(' ').enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let mut seen_letter = false;
        for c in word.chars() {
            if c.is_alphabetic() && !seen_letter {
                seen_letter = true;
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
        }
    }
    out
}

/// Rejoin numbering split across a space, `2. 1` → `2.1`, `1.2. 3` → `1.2.3`.
///
/// Skips digit groups that end an amount (`$1,000. 5`, `$40. 2`).
fn rejoin_section_numbers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in SPLIT_SECTION_NUMBER.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let before = text[..whole.start()].chars().next_back();
        if matches!(before, Some(',' | '$')) {
            continue;
        }
        out.push_str(&text[last..whole.start()]);
        out.push_str(&caps[1]);
        out.push('.');
        out.push_str(&caps[2]);
        last = whole.end();
    }

    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Splits on `|` so tests control sentence boundaries exactly.
    struct PipeSegmenter;

    impl Segmenter for PipeSegmenter {
        fn segment<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
            Box::new(text.split('|').map(str::trim).filter(|s| !s.is_empty()))
        }
    }

    fn stub_normalizer() -> TextNormalizer<PipeSegmenter> {
        TextNormalizer::with_segmenter(PipeSegmenter, &NormalizerConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\n\t "), "");
    }

    #[test]
    fn test_whitespace_collapsed_to_one_line() {
        assert_eq!(
            normalize("The term is one year.\n\n\nFees   are\tdue monthly."),
            "The term is one year. Fees are due monthly."
        );
    }

    #[test]
    fn test_collapse_is_idempotent() {
        let raw = "A  b\n\n\nc \r\n d\t\te";
        let once = collapse_whitespace(raw);
        assert_eq!(once, "A b c d e");
        assert_eq!(collapse_whitespace(&once), once);
    }

    #[test]
    fn test_long_shouted_sentence_becomes_title_case() {
        assert_eq!(
            normalize("THIS LICENSE IS NOT TRANSFERABLE."),
            "This License Is Not Transferable."
        );
    }

    #[test]
    fn test_short_heading_stays_upper() {
        assert_eq!(
            normalize("GOVERNING LAW. The laws of Delaware apply."),
            "GOVERNING LAW. The laws of Delaware apply."
        );
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // Exactly three words is still a heading.
        assert_eq!(stub_normalizer().normalize("LIMITATION OF LIABILITY"), "LIMITATION OF LIABILITY");
        assert_eq!(
            stub_normalizer().normalize("LIMITATION OF ALL LIABILITY"),
            "Limitation Of All Liability"
        );
    }

    #[test]
    fn test_threshold_is_tunable() {
        let config = NormalizerConfig {
            shouting_word_threshold: 1,
            ..Default::default()
        };
        let normalizer = TextNormalizer::with_segmenter(PipeSegmenter, &config).unwrap();
        assert_eq!(normalizer.normalize("GOVERNING LAW"), "Governing Law");
    }

    #[test]
    fn test_party_terms_upper_cased_in_place() {
        assert_eq!(
            stub_normalizer().normalize("the party a shall pay Party b within ten days"),
            "the PARTY A shall pay PARTY B within ten days"
        );
    }

    #[test]
    fn test_party_terms_survive_title_case() {
        assert_eq!(
            stub_normalizer().normalize("PARTY A SHALL PAY THE FEE"),
            "PARTY A Shall Pay The Fee"
        );
    }

    #[test]
    fn test_party_terms_need_word_boundaries() {
        assert_eq!(stub_normalizer().normalize("third party applications"), "third party applications");
    }

    #[test]
    fn test_stub_segments_joined_with_single_space() {
        assert_eq!(stub_normalizer().normalize("First bit | second  bit |  | third"), "First bit second bit third");
    }

    #[test]
    fn test_split_section_number_rejoined() {
        assert_eq!(normalize("See Section 2. 1 for details."), "See Section 2.1 for details.");
        assert_eq!(normalize("Clause 4.2 applies."), "Clause 4.2 applies.");
    }

    #[test]
    fn test_amounts_not_merged_with_following_number() {
        assert_eq!(normalize("Pay $1,000. 5 days later."), "Pay $1,000. 5 days later.");
        assert_eq!(normalize("Pay $40. 2 copies follow."), "Pay $40. 2 copies follow.");
    }

    #[test]
    fn test_wide_section_numbers_rejoined() {
        assert_eq!(normalize("See Section 1000. 25 here."), "See Section 1000.25 here.");
    }

    #[test]
    fn test_multi_level_number_rejoined() {
        assert_eq!(normalize("See Article 1.2. 3 here."), "See Article 1.2.3 here.");
    }

    #[test]
    fn test_title_case_keeps_leading_punctuation() {
        assert_eq!(to_title_case("(A) THE LICENSEE'S RIGHTS"), "(A) The Licensee's Rights");
    }
}
