//! Error types for the fixture harness.

use thiserror::Error;

/// Errors that can occur while loading or running a fixture.
#[derive(Debug, Error)]
pub enum SpecError {
    /// A fixture file could not be read.
    #[error("failed to load fixture: {path}: {message}")]
    Load { path: String, message: String },

    /// A fixture file is not valid TOML or is missing fields.
    #[error("invalid fixture: {message}")]
    Parse { message: String },

    /// A sentence's bracketed tree could not be read.
    #[error("sentence {sentence}: bad tree: {message}")]
    Tree { sentence: usize, message: String },

    /// A sentence has neither text nor a tree.
    #[error("sentence {sentence} has neither text nor tree")]
    EmptySentence { sentence: usize },

    /// The annotator rejected its configuration or failed on the document.
    #[error("annotation failed: {0}")]
    Annotation(String),
}

/// Result type for fixture operations.
pub type SpecResult<T> = Result<T, SpecError>;
