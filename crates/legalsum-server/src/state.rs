//! Shared application state.

use chrono::NaiveDateTime;
use legalsum_chat::LLMConfig;
use legalsum_core::{LegalSumConfig, Result};
use legalsum_ingest::{DocumentMetadata, DocumentProcessor, PipelineConfig};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One summarized document in the session history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub filename: String,
    pub summary: String,
    pub metadata: DocumentMetadata,
    pub timestamp: NaiveDateTime,
    #[serde(rename = "contentHash")]
    pub content_hash: String,
}

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: LegalSumConfig,
    pub llm_config: RwLock<LLMConfig>,
    pub processor: DocumentProcessor,
    history: RwLock<Vec<HistoryEntry>>,
}

impl AppState {
    pub fn new(config: LegalSumConfig) -> Result<Self> {
        let llm_config = LLMConfig::load(&config.data_paths.llm_config_file);
        let pipeline = PipelineConfig::load(&config.data_paths.pipeline_config_file);
        let processor = DocumentProcessor::new(&pipeline)?;

        Ok(Self {
            config,
            llm_config: RwLock::new(llm_config),
            processor,
            history: RwLock::new(Vec::new()),
        })
    }

    /// Add a summary to the history unless an identical summary is already
    /// there. Returns the stored entry and whether it was newly added.
    pub fn record_summary(
        &self,
        filename: &str,
        summary: &str,
        metadata: &DocumentMetadata,
    ) -> (HistoryEntry, bool) {
        let hash = content_hash(summary);
        let mut history = self.history.write();

        if let Some(existing) = history.iter().find(|e| e.content_hash == hash) {
            return (existing.clone(), false);
        }

        let entry = HistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            filename: filename.to_string(),
            summary: summary.to_string(),
            metadata: metadata.clone(),
            timestamp: chrono::Local::now().naive_local(),
            content_hash: hash,
        };
        history.push(entry.clone());
        (entry, true)
    }

    /// All history entries, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.read().clone()
    }

    pub fn history_entry(&self, id: &str) -> Option<HistoryEntry> {
        self.history.read().iter().find(|e| e.id == id).cloned()
    }

    /// Drop all entries, returning how many there were.
    pub fn clear_history(&self) -> usize {
        let mut history = self.history.write();
        let count = history.len();
        history.clear();
        count
    }
}

/// Compute SHA-256 hash of content (hex-encoded).
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
