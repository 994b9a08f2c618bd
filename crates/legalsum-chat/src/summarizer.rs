//! Structured legal summary generation.

use std::sync::Arc;

use tracing::info;

use legalsum_core::Result;
use legalsum_ingest::{DocumentMetadata, FieldValue};

use crate::backend::CompletionBackend;

/// Sections the model is asked to produce, in order.
pub const SUMMARY_SECTIONS: [&str; 8] = [
    "Agreement Type & Parties",
    "Key Terms & Conditions",
    "Important Dates & Deadlines",
    "Financial Terms",
    "Critical Obligations",
    "Special Clauses & Conditions",
    "Termination & Duration",
    "Key Risks & Limitations",
];

/// Appended when a summary is cut to fit `max_length`.
pub const TRUNCATION_MARKER: &str = "[Summary truncated due to length]";

/// Generates summaries through a [`CompletionBackend`].
#[derive(Clone)]
pub struct LegalSummarizer {
    backend: Arc<dyn CompletionBackend>,
}

impl LegalSummarizer {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Summarize normalized document text.
    ///
    /// `metadata` is embedded in the prompt and listed again in a quick
    /// reference block after the model's answer. `max_length` caps the
    /// result in characters; `None` or `Some(0)` means no cap.
    pub async fn generate_summary(
        &self,
        text: &str,
        max_length: Option<usize>,
        metadata: Option<&DocumentMetadata>,
    ) -> Result<String> {
        let prompt = build_prompt(text, metadata);
        info!(
            "Requesting summary: {} chars of text, prompt {} chars",
            text.len(),
            prompt.len()
        );

        let mut summary = self.backend.complete(&prompt).await?;
        summary.push_str(&quick_reference(metadata));

        Ok(format_summary(&summary, max_length))
    }
}

/// Build the summarization prompt.
pub fn build_prompt(text: &str, metadata: Option<&DocumentMetadata>) -> String {
    let mut prompt = String::from(
        "You are a legal expert. Analyze and summarize the following legal document, \
         incorporating the provided metadata.\n\n",
    );

    if let Some(metadata) = metadata.filter(|m| !m.is_empty()) {
        prompt.push_str("Document Metadata:\n");
        for (title, value) in metadata.labeled_fields() {
            match value {
                FieldValue::Text(s) if !s.is_empty() => {
                    prompt.push_str(&format!("- {}: {}\n", title, s));
                }
                FieldValue::List(items) if !items.is_empty() => {
                    prompt.push_str(&format!("- {}: {}\n", title, items.join(", ")));
                }
                _ => {}
            }
        }
        prompt.push('\n');
    }

    prompt.push_str("Legal Document:\n");
    prompt.push_str(text);
    prompt.push_str("\n\nProvide a structured summary with the following sections:\n");
    for (i, section) in SUMMARY_SECTIONS.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, section));
    }
    prompt.push_str(
        "\nFormat the summary in markdown with clear headings and bullet points.\n\
         Be concise but comprehensive, focusing on the most important legal aspects.\n",
    );

    prompt
}

/// The `### Quick Reference` block for non-empty parties, dates and amounts.
///
/// Empty when there is nothing to list.
pub fn quick_reference(metadata: Option<&DocumentMetadata>) -> String {
    let Some(metadata) = metadata else {
        return String::new();
    };

    let rows = [
        ("Parties Involved", &metadata.parties),
        ("Key Dates", &metadata.dates),
        ("Financial Terms", &metadata.amounts),
    ];
    if rows.iter().all(|(_, values)| values.is_empty()) {
        return String::new();
    }

    let mut block = String::from("\n\n### Quick Reference\n");
    for (label, values) in rows {
        if !values.is_empty() {
            block.push_str(&format!("- **{}**: {}\n", label, values.join(", ")));
        }
    }
    block
}

/// Cap a summary at `max_length` characters, cutting at paragraph boundaries.
///
/// Paragraphs (separated by blank lines) are kept greedily while they fit,
/// leaving room for the truncation marker.
pub fn format_summary(summary: &str, max_length: Option<usize>) -> String {
    let Some(max_length) = max_length.filter(|&m| m > 0) else {
        return summary.to_string();
    };
    if summary.chars().count() <= max_length {
        return summary.to_string();
    }

    let separator = "\n\n";
    let budget = max_length.saturating_sub(TRUNCATION_MARKER.len() + separator.len());

    let mut kept = String::new();
    let mut kept_chars = 0;
    for section in summary.split(separator) {
        let section_chars = section.chars().count();
        if kept_chars + section_chars > budget {
            break;
        }
        kept.push_str(section);
        kept.push_str(separator);
        kept_chars += section_chars + separator.len();
    }

    let kept = kept.trim();
    if kept.is_empty() {
        TRUNCATION_MARKER.to_string()
    } else {
        format!("{}{}{}", kept, separator, TRUNCATION_MARKER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use std::sync::Mutex;

    /// Returns a canned reply and records every prompt it receives.
    struct StubBackend {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl StubBackend {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl CompletionBackend for StubBackend {
        fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Box::pin(async move { Ok(self.reply.clone()) })
        }
    }

    fn sample_metadata() -> DocumentMetadata {
        DocumentMetadata {
            agreement_type: "SOFTWARE LICENSE AGREEMENT".into(),
            parties: vec!["Acme Corp".into(), "Beta LLC".into()],
            dates: vec!["March 5, 2023".into()],
            amounts: vec!["$1,234.56".into()],
        }
    }

    #[test]
    fn test_prompt_lists_sections_and_metadata() {
        let prompt = build_prompt("The text.", Some(&sample_metadata()));
        assert!(prompt.contains("- Agreement Type: SOFTWARE LICENSE AGREEMENT\n"));
        assert!(prompt.contains("- Parties: Acme Corp, Beta LLC\n"));
        assert!(prompt.contains("Legal Document:\nThe text.\n"));
        assert!(prompt.contains("1. Agreement Type & Parties\n"));
        assert!(prompt.contains("8. Key Risks & Limitations\n"));
    }

    #[test]
    fn test_prompt_omits_empty_metadata() {
        let prompt = build_prompt("Body", Some(&DocumentMetadata::default()));
        assert!(!prompt.contains("Document Metadata:"));
        let metadata = DocumentMetadata {
            dates: vec!["1/2/2024".into()],
            ..Default::default()
        };
        let prompt = build_prompt("Body", Some(&metadata));
        assert!(prompt.contains("- Dates: 1/2/2024\n"));
        assert!(!prompt.contains("- Parties:"));
        assert!(!prompt.contains("- Agreement Type:"));
    }

    #[test]
    fn test_quick_reference() {
        let block = quick_reference(Some(&sample_metadata()));
        assert_eq!(
            block,
            "\n\n### Quick Reference\n\
             - **Parties Involved**: Acme Corp, Beta LLC\n\
             - **Key Dates**: March 5, 2023\n\
             - **Financial Terms**: $1,234.56\n"
        );

        // Agreement type alone does not produce a block
        let metadata = DocumentMetadata {
            agreement_type: "LEASE AGREEMENT".into(),
            ..Default::default()
        };
        assert_eq!(quick_reference(Some(&metadata)), "");
        assert_eq!(quick_reference(None), "");
    }

    #[test]
    fn test_format_summary_without_limit() {
        let summary = "a".repeat(5000);
        assert_eq!(format_summary(&summary, None), summary);
        assert_eq!(format_summary(&summary, Some(0)), summary);
        assert_eq!(format_summary("short", Some(100)), "short");
    }

    #[test]
    fn test_format_summary_truncates_at_paragraphs() {
        let summary = format!("{}\n\n{}\n\n{}", "a".repeat(100), "b".repeat(100), "c".repeat(400));
        let formatted = format_summary(&summary, Some(300));

        assert!(formatted.chars().count() <= 300);
        assert!(formatted.ends_with(TRUNCATION_MARKER));
        assert!(formatted.contains(&"b".repeat(100)));
        assert!(!formatted.contains("ccc"));
    }

    #[test]
    fn test_format_summary_first_paragraph_too_long() {
        let summary = format!("{}\n\nrest", "x".repeat(1000));
        assert_eq!(format_summary(&summary, Some(500)), TRUNCATION_MARKER);
    }

    #[tokio::test]
    async fn test_generate_summary_with_metadata() {
        let backend = Arc::new(StubBackend::new("## 1. Agreement Type & Parties\nA license."));
        let summarizer = LegalSummarizer::new(backend.clone());

        let summary = summarizer
            .generate_summary("normalized text", None, Some(&sample_metadata()))
            .await
            .unwrap();

        assert!(summary.starts_with("## 1. Agreement Type & Parties"));
        assert!(summary.contains("### Quick Reference"));
        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("normalized text"));
    }

    #[tokio::test]
    async fn test_generate_summary_respects_max_length() {
        let reply = (0..20)
            .map(|i| format!("Paragraph {} {}", i, "z".repeat(60)))
            .collect::<Vec<_>>()
            .join("\n\n");
        let summarizer = LegalSummarizer::new(Arc::new(StubBackend::new(&reply)));

        let summary = summarizer.generate_summary("text", Some(500), None).await.unwrap();
        assert!(summary.chars().count() <= 500);
        assert!(summary.contains("[Summary truncated"));
    }
}
