//! Error types for fraglight

use std::process::ExitCode;
use thiserror::Error;

/// Errors produced while normalizing and highlighting documentation pages
#[derive(Error, Debug)]
pub enum FraglightError {
    /// The input path does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// A CSS class name given on the command line is not usable in a selector
    #[error("Invalid CSS class name: {name}")]
    InvalidClassName { name: String },

    /// The language tag is not usable in a class attribute
    #[error("Invalid language tag: {tag}")]
    InvalidLanguageTag { tag: String },

    /// The streaming HTML rewriter rejected a document
    #[error("HTML rewrite failed: {message}")]
    RewriteFailure { message: String },

    /// A highlight query failed to compile for a grammar
    #[error("Highlight query failed: {message}")]
    QueryFailure { message: String },

    /// tree-sitter could not parse a code block
    #[error("Parse failure: {message}")]
    ParseFailure { message: String },

    /// Underlying IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization of the run summary failed
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl FraglightError {
    /// Map the error to a process exit code.
    ///
    /// Usage errors (bad paths, bad class names) exit with 2, everything
    /// else with 1.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound { .. }
            | Self::InvalidClassName { .. }
            | Self::InvalidLanguageTag { .. } => ExitCode::from(2),
            _ => ExitCode::from(1),
        }
    }
}

/// Convenience result alias used throughout the crate
pub type Result<T> = std::result::Result<T, FraglightError>;
