//! Pattern-based metadata extraction for contracts and agreements.
//!
//! Scans raw document text for the agreement heading, labelled parties,
//! dates, and currency amounts. Extraction is permissive: false positives
//! are acceptable because the result feeds a summarization prompt, and no
//! input ever makes extraction fail.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use legalsum_core::{Error, Result};

/// Party labels recognised by default.
pub const DEFAULT_PARTY_LABELS: &[&str] = &[
    "LICENSOR", "LICENSEE", "PARTY A", "PARTY B", "SELLER", "BUYER", "VENDOR", "CLIENT",
];

/// Full English month names, matched case-sensitively.
pub const DEFAULT_MONTH_NAMES: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Structured metadata extracted from a legal document.
///
/// Every field is always present; absence of a match leaves it empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// The heading ending in the agreement keyword, e.g. `SOFTWARE LICENSE AGREEMENT`.
    pub agreement_type: String,
    /// Text following each party label, in document order.
    pub parties: Vec<String>,
    /// Numeric and written-out dates, in document order.
    pub dates: Vec<String>,
    /// Currency amounts, in document order.
    pub amounts: Vec<String>,
}

/// A borrowed view of one metadata field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    List(&'a [String]),
}

impl FieldValue<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }
}

impl DocumentMetadata {
    /// True when nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.labeled_fields().iter().all(|(_, v)| v.is_empty())
    }

    /// Fields with their display titles, in display order.
    pub fn labeled_fields(&self) -> [(&'static str, FieldValue<'_>); 4] {
        [
            ("Agreement Type", FieldValue::Text(&self.agreement_type)),
            ("Parties", FieldValue::List(&self.parties)),
            ("Dates", FieldValue::List(&self.dates)),
            ("Amounts", FieldValue::List(&self.amounts)),
        ]
    }
}

/// The configurable vocabulary behind the extraction patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionPatterns {
    /// Keyword that closes the agreement heading.
    pub heading_keyword: String,
    /// Labels that introduce a party line (`LABEL: name`), matched case-insensitively.
    pub party_labels: Vec<String>,
    /// Month names accepted in `Month D, YYYY` dates.
    pub month_names: Vec<String>,
    /// Currency symbols that prefix an amount.
    pub currency_symbols: Vec<String>,
}

impl Default for ExtractionPatterns {
    fn default() -> Self {
        Self {
            heading_keyword: "AGREEMENT".into(),
            party_labels: DEFAULT_PARTY_LABELS.iter().map(|s| s.to_string()).collect(),
            month_names: DEFAULT_MONTH_NAMES.iter().map(|s| s.to_string()).collect(),
            currency_symbols: vec!["$".into()],
        }
    }
}

/// Compiled metadata extractor. Cheap to share across threads.
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    heading: Option<Regex>,
    parties: Option<Regex>,
    dates: Regex,
    amounts: Option<Regex>,
}

impl MetadataExtractor {
    /// Compile an extractor from a pattern vocabulary.
    ///
    /// An empty vocabulary disables the corresponding field rather than
    /// matching everything.
    pub fn new(patterns: &ExtractionPatterns) -> Result<Self> {
        let heading = if patterns.heading_keyword.trim().is_empty() {
            None
        } else {
            Some(compile(&format!(
                r"(?im)^(.+?)\s*{}",
                regex::escape(patterns.heading_keyword.trim())
            ))?)
        };

        let parties = alternation(&patterns.party_labels)
            .map(|labels| compile(&format!(r"(?i)(?:{labels}):\s*([^\n]+)")))
            .transpose()?;

        let numeric_date = r"\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b";
        let dates = match alternation(&patterns.month_names) {
            Some(months) => compile(&format!(
                r"{numeric_date}|\b(?:{months})\s+\d{{1,2}},\s+\d{{4}}\b"
            ))?,
            None => compile(numeric_date)?,
        };

        let amounts = alternation(&patterns.currency_symbols)
            .map(|symbols| compile(&format!(r"(?:{symbols})\s*\d+(?:,\d{{3}})*(?:\.\d{{2}})?")))
            .transpose()?;

        Ok(Self {
            heading,
            parties,
            dates,
            amounts,
        })
    }

    /// Extract all metadata fields from raw document text.
    pub fn extract(&self, text: &str) -> DocumentMetadata {
        let metadata = DocumentMetadata {
            agreement_type: self.agreement_type(text),
            parties: self.parties(text),
            dates: find_all(&self.dates, text),
            amounts: self
                .amounts
                .as_ref()
                .map(|re| find_all(re, text))
                .unwrap_or_default(),
        };

        debug!(
            "Extracted metadata: type={:?}, {} parties, {} dates, {} amounts",
            metadata.agreement_type,
            metadata.parties.len(),
            metadata.dates.len(),
            metadata.amounts.len()
        );

        metadata
    }

    /// The first line-anchored heading ending in the agreement keyword.
    fn agreement_type(&self, text: &str) -> String {
        self.heading
            .as_ref()
            .and_then(|re| re.find(text))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    }

    fn parties(&self, text: &str) -> Vec<String> {
        let Some(re) = &self.parties else {
            return Vec::new();
        };
        re.captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim().to_string()))
            .collect()
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        // Escaped literal vocabularies always compile.
        Self::new(&ExtractionPatterns::default()).expect("default extraction patterns compile")
    }
}

static DEFAULT_EXTRACTOR: Lazy<MetadataExtractor> = Lazy::new(MetadataExtractor::default);

/// Extract metadata with the default vocabulary.
pub fn extract(text: &str) -> DocumentMetadata {
    DEFAULT_EXTRACTOR.extract(text)
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Config(format!("invalid extraction pattern: {}", e)))
}

/// Escape and join non-empty terms into a regex alternation.
fn alternation(terms: &[String]) -> Option<String> {
    let escaped: Vec<String> = terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(regex::escape)
        .collect();
    if escaped.is_empty() {
        None
    } else {
        Some(escaped.join("|"))
    }
}

fn find_all(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "SOFTWARE LICENSE AGREEMENT\n\n\
        This Software License Agreement is entered into on March 5, 2023.\n\n\
        LICENSOR: Acme Corp\n\
        LICENSEE: Widget Industries, LLC\n\n\
        1. PAYMENT\n\
        Licensee shall pay $1,234.56 by 03/05/2023 and a further $ 500 thereafter.\n";

    #[test]
    fn test_extract_sample_agreement() {
        let metadata = extract(SAMPLE);
        assert_eq!(metadata.agreement_type, "SOFTWARE LICENSE AGREEMENT");
        assert_eq!(metadata.parties, vec!["Acme Corp", "Widget Industries, LLC"]);
        assert_eq!(metadata.dates, vec!["March 5, 2023", "03/05/2023"]);
        assert_eq!(metadata.amounts, vec!["$1,234.56", "$ 500"]);
    }

    #[test]
    fn test_empty_text() {
        let metadata = extract("");
        assert_eq!(metadata, DocumentMetadata::default());
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_agreement_type_first_match_only() {
        let text = "Preamble\nMASTER SERVICES AGREEMENT\nNON-DISCLOSURE AGREEMENT";
        assert_eq!(extract(text).agreement_type, "MASTER SERVICES AGREEMENT");
    }

    #[test]
    fn test_agreement_type_case_insensitive_and_trimmed() {
        let text = "   Purchase   agreement\nbody";
        assert_eq!(extract(text).agreement_type, "Purchase   agreement");
    }

    #[test]
    fn test_agreement_keyword_needs_prefix() {
        // A bare keyword line has no heading text before it.
        let text = "AGREEMENT\nnothing else";
        assert_eq!(extract(text).agreement_type, "");
    }

    #[test]
    fn test_parties_keep_repeats_in_order() {
        let text = "seller: First Co\nBuyer:Second Co  \nSELLER: First Co\nParty B: Third";
        assert_eq!(
            extract(text).parties,
            vec!["First Co", "Second Co", "First Co", "Third"]
        );
    }

    #[test]
    fn test_party_label_requires_colon() {
        let text = "The LICENSOR shall deliver the software.";
        assert!(extract(text).parties.is_empty());
    }

    #[test]
    fn test_dates_are_not_validated_or_deduplicated() {
        let text = "Dated 13/45/9999, again 1-2-23 and 1-2-23; signed December 31, 2024.";
        assert_eq!(
            extract(text).dates,
            vec!["13/45/9999", "1-2-23", "1-2-23", "December 31, 2024"]
        );
    }

    #[test]
    fn test_month_names_are_case_sensitive() {
        assert!(extract("signed march 5, 2023").dates.is_empty());
    }

    #[test]
    fn test_amount_grouping_must_be_three_digits() {
        assert_eq!(extract("fee of $1,23.45").amounts, vec!["$1"]);
        assert_eq!(extract("fee of $12,345,678.90").amounts, vec!["$12,345,678.90"]);
    }

    #[test]
    fn test_custom_party_labels() {
        let patterns = ExtractionPatterns {
            party_labels: vec!["LANDLORD".into(), "TENANT".into()],
            ..Default::default()
        };
        let extractor = MetadataExtractor::new(&patterns).unwrap();
        let metadata = extractor.extract("LANDLORD: Jane Roe\nTENANT: John Doe\nBUYER: nobody");
        assert_eq!(metadata.parties, vec!["Jane Roe", "John Doe"]);
    }

    #[test]
    fn test_empty_vocabulary_disables_field() {
        let patterns = ExtractionPatterns {
            heading_keyword: String::new(),
            party_labels: Vec::new(),
            month_names: Vec::new(),
            currency_symbols: Vec::new(),
        };
        let extractor = MetadataExtractor::new(&patterns).unwrap();
        let metadata = extractor.extract(SAMPLE);
        assert_eq!(metadata.agreement_type, "");
        assert!(metadata.parties.is_empty());
        assert!(metadata.amounts.is_empty());
        // Numeric dates survive without month names
        assert_eq!(metadata.dates, vec!["03/05/2023"]);
    }

    #[test]
    fn test_labeled_fields_order() {
        let metadata = extract(SAMPLE);
        let titles: Vec<&str> = metadata.labeled_fields().iter().map(|(t, _)| *t).collect();
        assert_eq!(titles, vec!["Agreement Type", "Parties", "Dates", "Amounts"]);
    }
}
