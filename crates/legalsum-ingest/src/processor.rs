//! Document processing pipeline: file → text → metadata + normalized text.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use legalsum_core::Result;

use crate::extract::{DocumentMetadata, ExtractionPatterns, MetadataExtractor};
use crate::file;
use crate::normalize::{NormalizerConfig, TextNormalizer};

/// Extraction and normalization settings (persisted to pipeline.json).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub extraction: ExtractionPatterns,
    pub normalization: NormalizerConfig,
}

impl PipelineConfig {
    /// Load settings from file, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(config_path: &Path) -> Self {
        let Ok(raw) = std::fs::read_to_string(config_path) else {
            return Self::default();
        };
        match serde_json::from_str(&raw) {
            Ok(config) => {
                info!("Loaded pipeline config from {}", config_path.display());
                config
            }
            Err(e) => {
                warn!(
                    "Ignoring invalid pipeline config {}: {}",
                    config_path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

/// Output of the two independent pipeline stages for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub metadata: DocumentMetadata,
    pub normalized_text: String,
}

/// Reads documents and runs metadata extraction and normalization over them.
pub struct DocumentProcessor {
    extractor: MetadataExtractor,
    normalizer: TextNormalizer,
}

impl DocumentProcessor {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            extractor: MetadataExtractor::new(&config.extraction)?,
            normalizer: TextNormalizer::new(&config.normalization)?,
        })
    }

    /// Read a TXT, DOCX or PDF document from disk.
    pub fn read_document(&self, path: &Path) -> Result<String> {
        file::read_document(path)
    }

    pub fn extract_metadata(&self, text: &str) -> DocumentMetadata {
        self.extractor.extract(text)
    }

    pub fn preprocess_text(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    /// Run both stages over raw text. Neither stage reads the other's output.
    pub fn process(&self, text: &str) -> ProcessedDocument {
        ProcessedDocument {
            metadata: self.extract_metadata(text),
            normalized_text: self.preprocess_text(text),
        }
    }

    /// Read a document from disk and process it.
    pub fn process_file(&self, path: &Path) -> Result<ProcessedDocument> {
        let text = self.read_document(path)?;
        let processed = self.process(&text);
        info!(
            "Processed {}: {} parties, {} dates, {} amounts, {} normalized chars",
            path.display(),
            processed.metadata.parties.len(),
            processed.metadata.dates.len(),
            processed.metadata.amounts.len(),
            processed.normalized_text.len()
        );
        Ok(processed)
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self {
            extractor: MetadataExtractor::default(),
            normalizer: TextNormalizer::default(),
        }
    }
}
