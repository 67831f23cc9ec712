//! Common types and utilities for oas-bridge
//!
//! This crate contains the document tree helpers, the conversion
//! configuration record, and the error type shared by the converter,
//! transform, and CLI components.

mod config;
mod document;

pub use config::{ConversionConfig, TagGroup, TextReplacement};
pub use document::{parse_document, to_yaml, Document, SourceFormat, OUTPUT_LINE_WIDTH};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting a document
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("file not found – {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("Structural conversion failed: {0}")]
    StructuralConversion(String),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ConvertError::InputNotFound(PathBuf::from("/tmp/missing.yml"));
        assert_eq!(err.to_string(), "file not found – /tmp/missing.yml");

        let err = ConvertError::Config {
            path: PathBuf::from("convert.config.json"),
            message: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Config error in convert.config.json: expected value"
        );
    }
}
