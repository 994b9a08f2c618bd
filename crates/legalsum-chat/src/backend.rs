//! Text-in/text-out completion seam between the summarizer and an LLM.

use futures::future::BoxFuture;
use reqwest::Client;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use legalsum_core::{Error, Result};

use crate::config::LLMConfig;
use crate::providers::{self, Sampling, StreamChunk};
use crate::types::{ChatMessage, LLMProvider};

/// Anything that can turn a prompt into generated text.
pub trait CompletionBackend: Send + Sync {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// Completion over one of the configured external providers.
pub struct LlmBackend {
    client: Client,
    provider: LLMProvider,
    model: String,
    api_key: String,
    sampling: Sampling,
}

impl LlmBackend {
    /// Build a backend from the resolved provider in `config`.
    pub fn from_config(config: &LLMConfig) -> Result<Self> {
        let (provider, model, api_key) = config.resolve_provider().ok_or_else(|| {
            Error::Config(
                "No LLM provider configured (set GOOGLE_API_KEY, ANTHROPIC_API_KEY, \
                 GROQ_API_KEY or OPENAI_API_KEY)"
                    .into(),
            )
        })?;

        Ok(Self {
            client: Client::new(),
            provider,
            model,
            api_key,
            sampling: Sampling {
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            },
        })
    }

    pub fn provider(&self) -> LLMProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl CompletionBackend for LlmBackend {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let mut stream = providers::stream_llm(
                &self.client,
                self.provider,
                vec![ChatMessage::user(prompt)],
                &self.model,
                &self.api_key,
                self.sampling,
            );

            let mut full_response = String::new();
            while let Some(chunk) = stream.next().await {
                match chunk {
                    StreamChunk::Token(text) => full_response.push_str(&text),
                    StreamChunk::Done { tokens_used } => {
                        debug!("{} returned {} tokens", self.provider, tokens_used);
                        break;
                    }
                    StreamChunk::Error(e) => {
                        warn!("{} completion failed: {}", self.provider, e);
                        return Err(Error::Llm(e));
                    }
                }
            }

            if full_response.trim().is_empty() {
                return Err(Error::Llm(format!("{} returned an empty response", self.provider)));
            }
            Ok(full_response)
        })
    }
}
