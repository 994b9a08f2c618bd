//! Summarization delegate for legal documents.
//!
//! Builds the structured summary prompt from normalized text and extracted
//! metadata, sends it to an external LLM (Gemini/Anthropic/Groq/OpenAI),
//! and post-processes the answer (quick reference block, length cap).
//! Also renders the plain-text export report.

pub mod backend;
pub mod config;
pub mod providers;
pub mod report;
pub mod summarizer;
pub mod types;

pub use backend::{CompletionBackend, LlmBackend};
pub use config::LLMConfig;
pub use report::render_report;
pub use summarizer::{build_prompt, format_summary, quick_reference, LegalSummarizer};
pub use types::*;
