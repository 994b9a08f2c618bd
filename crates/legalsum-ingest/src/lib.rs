//! LegalSum Ingest: document readers, metadata extraction, text normalization.

pub mod extract;
pub mod file;
pub mod normalize;
pub mod processor;
pub mod segment;

pub use extract::{extract, DocumentMetadata, ExtractionPatterns, FieldValue, MetadataExtractor};
pub use file::{read_document, read_document_bytes, FileType};
pub use normalize::{normalize, NormalizerConfig, TextNormalizer};
pub use processor::{DocumentProcessor, PipelineConfig, ProcessedDocument};
pub use segment::{RuleSegmenter, Segmenter};
