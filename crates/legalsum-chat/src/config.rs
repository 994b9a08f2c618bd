//! LLM configuration: persisted settings, env-var keys, provider selection.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::{LLMConfigResponse, LLMConfigUpdate, LLMProvider};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_MAX_TOKENS: usize = 4096;

pub const GEMINI_MODELS: &[&str] = &["gemini-1.5-flash", "gemini-1.5-pro", "gemini-2.0-flash"];
pub const ANTHROPIC_MODELS: &[&str] = &[
    "claude-sonnet-4-20250514",
    "claude-3-5-sonnet-20241022",
    "claude-3-5-haiku-20241022",
];
pub const GROQ_MODELS: &[&str] = &["llama-3.3-70b-versatile", "llama-3.1-8b-instant"];
pub const OPENAI_MODELS: &[&str] = &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo"];

/// Stored LLM configuration (`llm-config.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    /// `auto` or a provider name.
    pub preferred_provider: String,
    pub gemini_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_model: String,
    pub anthropic_model: String,
    pub groq_model: String,
    pub openai_model: String,
    pub temperature: f64,
    pub max_tokens: usize,
    #[serde(skip)]
    pub config_path: PathBuf,
    /// Providers whose key was read from the environment; never written back.
    #[serde(skip)]
    pub env_keys: Vec<LLMProvider>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            preferred_provider: "auto".into(),
            gemini_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            openai_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.into(),
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.into(),
            groq_model: DEFAULT_GROQ_MODEL.into(),
            openai_model: DEFAULT_OPENAI_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            config_path: PathBuf::new(),
            env_keys: Vec::new(),
        }
    }
}

/// Environment variable holding a provider's API key.
fn key_env_var(provider: LLMProvider) -> &'static str {
    match provider {
        LLMProvider::Gemini => "GOOGLE_API_KEY",
        LLMProvider::Anthropic => "ANTHROPIC_API_KEY",
        LLMProvider::Groq => "GROQ_API_KEY",
        LLMProvider::OpenAI => "OPENAI_API_KEY",
    }
}

fn merge<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

impl LLMConfig {
    /// Load from `config_path`; keys missing from the file come from the environment.
    pub fn load(config_path: &Path) -> Self {
        let mut config: LLMConfig = match std::fs::read_to_string(config_path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring invalid LLM config {}: {}", config_path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        config.config_path = config_path.to_path_buf();

        for provider in LLMProvider::AUTO_ORDER {
            let slot = config.api_key_mut(provider);
            if slot.is_none() {
                if let Ok(key) = std::env::var(key_env_var(provider)) {
                    *slot = Some(key);
                    config.env_keys.push(provider);
                }
            }
        }

        config
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut stored = self.clone();
        for provider in &self.env_keys {
            *stored.api_key_mut(*provider) = None;
        }
        let json = serde_json::to_string_pretty(&stored).map_err(std::io::Error::other)?;
        std::fs::write(&self.config_path, json)?;
        info!("Saved LLM config to {}", self.config_path.display());
        Ok(())
    }

    /// Merge an update into this config.
    pub fn apply_update(&mut self, update: &LLMConfigUpdate) {
        merge(&mut self.preferred_provider, &update.preferred_provider);
        for (provider, key) in [
            (LLMProvider::Gemini, &update.gemini_api_key),
            (LLMProvider::Anthropic, &update.anthropic_api_key),
            (LLMProvider::Groq, &update.groq_api_key),
            (LLMProvider::OpenAI, &update.openai_api_key),
        ] {
            if key.is_some() {
                *self.api_key_mut(provider) = key.clone();
                self.env_keys.retain(|p| *p != provider);
            }
        }
        merge(&mut self.gemini_model, &update.gemini_model);
        merge(&mut self.anthropic_model, &update.anthropic_model);
        merge(&mut self.groq_model, &update.groq_model);
        merge(&mut self.openai_model, &update.openai_model);
        merge(&mut self.temperature, &update.temperature);
        merge(&mut self.max_tokens, &update.max_tokens);
    }

    fn api_key_mut(&mut self, provider: LLMProvider) -> &mut Option<String> {
        match provider {
            LLMProvider::Gemini => &mut self.gemini_api_key,
            LLMProvider::Anthropic => &mut self.anthropic_api_key,
            LLMProvider::Groq => &mut self.groq_api_key,
            LLMProvider::OpenAI => &mut self.openai_api_key,
        }
    }

    /// Non-empty API key for `provider`, if any.
    fn api_key(&self, provider: LLMProvider) -> Option<&str> {
        let key = match provider {
            LLMProvider::Gemini => &self.gemini_api_key,
            LLMProvider::Anthropic => &self.anthropic_api_key,
            LLMProvider::Groq => &self.groq_api_key,
            LLMProvider::OpenAI => &self.openai_api_key,
        };
        key.as_deref().filter(|k| !k.is_empty())
    }

    fn model(&self, provider: LLMProvider) -> &str {
        match provider {
            LLMProvider::Gemini => &self.gemini_model,
            LLMProvider::Anthropic => &self.anthropic_model,
            LLMProvider::Groq => &self.groq_model,
            LLMProvider::OpenAI => &self.openai_model,
        }
    }

    fn entry(&self, provider: LLMProvider) -> Option<(LLMProvider, String, String)> {
        self.api_key(provider)
            .map(|key| (provider, self.model(provider).to_string(), key.to_string()))
    }

    /// Provider, model and API key to use.
    ///
    /// An explicit preference never falls back to another provider.
    pub fn resolve_provider(&self) -> Option<(LLMProvider, String, String)> {
        if self.preferred_provider != "auto" {
            let provider = self.preferred_provider.parse::<LLMProvider>().ok()?;
            return self.entry(provider);
        }
        LLMProvider::AUTO_ORDER
            .into_iter()
            .find_map(|p| self.entry(p))
    }

    pub fn to_response(&self) -> LLMConfigResponse {
        let configured = |p| self.api_key(p).is_some();
        LLMConfigResponse {
            preferred_provider: self.preferred_provider.clone(),
            gemini_configured: configured(LLMProvider::Gemini),
            anthropic_configured: configured(LLMProvider::Anthropic),
            groq_configured: configured(LLMProvider::Groq),
            openai_configured: configured(LLMProvider::OpenAI),
            gemini_model: self.gemini_model.clone(),
            anthropic_model: self.anthropic_model.clone(),
            groq_model: self.groq_model.clone(),
            openai_model: self.openai_model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            active_provider: self.resolve_provider().map(|(p, _, _)| p.to_string()),
        }
    }

    /// Models offered for the active provider.
    pub fn available_models(&self) -> Vec<String> {
        let models: &[&str] = match self.resolve_provider() {
            Some((LLMProvider::Gemini, _, _)) => GEMINI_MODELS,
            Some((LLMProvider::Anthropic, _, _)) => ANTHROPIC_MODELS,
            Some((LLMProvider::Groq, _, _)) => GROQ_MODELS,
            Some((LLMProvider::OpenAI, _, _)) => OPENAI_MODELS,
            None => &[],
        };
        models.iter().map(|s| s.to_string()).collect()
    }
}
