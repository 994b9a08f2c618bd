//! Provider identifiers and the LLM configuration API types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// External summarization provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    Gemini,
    Anthropic,
    Groq,
    OpenAI,
}

impl LLMProvider {
    /// Auto-selection order when no provider is preferred.
    pub const AUTO_ORDER: [LLMProvider; 4] = [
        LLMProvider::Gemini,
        LLMProvider::Anthropic,
        LLMProvider::Groq,
        LLMProvider::OpenAI,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LLMProvider::Gemini => "gemini",
            LLMProvider::Anthropic => "anthropic",
            LLMProvider::Groq => "groq",
            LLMProvider::OpenAI => "openai",
        }
    }
}

impl fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::AUTO_ORDER
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown provider: {}", s))
    }
}

/// One prompt message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Public view of the LLM configuration; keys are reduced to flags.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LLMConfigResponse {
    pub preferred_provider: String,
    pub gemini_configured: bool,
    pub anthropic_configured: bool,
    pub groq_configured: bool,
    pub openai_configured: bool,
    pub gemini_model: String,
    pub anthropic_model: String,
    pub groq_model: String,
    pub openai_model: String,
    pub temperature: f64,
    pub max_tokens: usize,
    pub active_provider: Option<String>,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LLMConfigUpdate {
    pub preferred_provider: Option<String>,
    pub gemini_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub anthropic_model: Option<String>,
    pub groq_model: Option<String>,
    pub openai_model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestKeyRequest {
    pub provider: String,
    pub api_key: String,
}
