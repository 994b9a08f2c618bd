//! LegalSum Core: shared error type, data paths, configuration.

pub mod config;
pub mod error;

pub use config::{DataPaths, LegalSumConfig};
pub use error::{Error, Result};
