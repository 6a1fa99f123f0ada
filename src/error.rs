//! Error types and exit codes for jsfinger

use std::process::ExitCode;
use thiserror::Error;

/// Main error type for fingerprint extraction and matching
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Unsupported language for extension: {extension}")]
    UnsupportedLanguage { extension: String },

    #[error("Failed to parse source: {message}")]
    ParseFailure { message: String },

    /// A node claimed to be function-like but is missing a required field
    #[error("Malformed {kind} node at {path}: missing {field}")]
    MalformedNode {
        kind: String,
        path: String,
        field: &'static str,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FingerprintError {
    /// Convert error to an exit code for the binary:
    /// - 1: File not found / IO error
    /// - 2: Unsupported language
    /// - 3: Parse failure
    /// - 4: Extraction failure (malformed tree, serialization)
    /// - 5: Configuration error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound { .. } => ExitCode::from(1),
            Self::UnsupportedLanguage { .. } => ExitCode::from(2),
            Self::ParseFailure { .. } => ExitCode::from(3),
            Self::MalformedNode { .. } => ExitCode::from(4),
            Self::Serialization { .. } => ExitCode::from(4),
            Self::Config { .. } => ExitCode::from(5),
            Self::Io(_) => ExitCode::from(1),
        }
    }
}

impl From<serde_json::Error> for FingerprintError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}

/// Result type alias for jsfinger operations
pub type Result<T> = std::result::Result<T, FingerprintError>;
