//! Error types for coreference annotation.
//!
//! Configuration faults make an annotator unusable until it is rebuilt.
//! Processing faults abort one document; its partial output must be
//! discarded. A document with no sentence structure is not an error at all
//! (see [`crate::SkipReason`]).

use thiserror::Error;

/// Setup problems, raised at construction or before any document is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `annotate` was called before a parser handle was supplied.
    #[error("parse annotator must be set before annotating")]
    MissingParser,

    /// A second parser handle was supplied.
    #[error("parse annotator was already set")]
    ParserAlreadySet,

    /// A boolean property held something other than true/false.
    #[error("property '{key}' must be true or false, found '{value}'")]
    InvalidBoolean { key: String, value: String },

    /// A sieve pass name was not recognized.
    #[error("unknown sieve pass '{0}'")]
    UnknownSieve(String),

    /// The sieve pass list was empty.
    #[error("no sieve passes configured")]
    EmptySievePasses,

    /// A dictionaries file could not be read or parsed.
    #[error("failed to load dictionaries: {path}: {message}")]
    Dictionaries { path: String, message: String },

    /// A TOML configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Toml(String),
}

/// Per-document failures during extraction, resolution or publishing.
#[derive(Debug, Error)]
pub enum ProcessingFault {
    #[error("sentence {sentence}: tree has {leaves} leaves but the sentence has {tokens} tokens")]
    LeafCountMismatch {
        sentence: usize,
        leaves: usize,
        tokens: usize,
    },

    #[error("expected mention lists for {expected} sentences, got {found}")]
    SentenceCountMismatch { expected: usize, found: usize },

    #[error("sentence {sentence}: mention [{start}, {end}) lies outside {tokens} tokens")]
    MentionOutOfBounds {
        sentence: usize,
        start: usize,
        end: usize,
        tokens: usize,
    },

    #[error("sentence {sentence}: head {head} outside mention [{start}, {end})")]
    HeadOutsideSpan {
        sentence: usize,
        start: usize,
        end: usize,
        head: usize,
    },

    /// A chain refers to an arranged mention that does not exist.
    #[error("no arranged mention at position {position} of sentence {sentence}")]
    MentionLookup { sentence: usize, position: usize },

    #[error("chain {chain_id} is malformed: {reason}")]
    MalformedChain { chain_id: u32, reason: String },

    #[error("no token {token} in sentence {sentence}")]
    TokenLookup { sentence: usize, token: usize },

    #[error("reparse of sentence {sentence} failed: {message}")]
    Reparse { sentence: usize, message: String },

    #[error("mention finder failed: {0}")]
    Finder(String),

    #[error("coreference resolution failed: {0}")]
    Resolver(String),
}

/// A parser handle could not produce a tree.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ParseFailure(pub String);

/// Errors surfaced by [`crate::DeterministicCorefAnnotator`].
#[derive(Debug, Error)]
pub enum CorefError {
    #[error("configuration fault: {0}")]
    Configuration(#[from] ConfigError),

    #[error("processing fault: {0}")]
    Processing(#[from] ProcessingFault),
}

impl CorefError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, CorefError::Configuration(_))
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, CorefError::Processing(_))
    }
}

/// Result type for annotation.
pub type CorefResult<T> = Result<T, CorefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_classification() {
        let err: CorefError = ConfigError::MissingParser.into();
        assert!(err.is_configuration());
        assert!(!err.is_processing());

        let err: CorefError = ProcessingFault::MentionLookup {
            sentence: 0,
            position: 3,
        }
        .into();
        assert!(err.is_processing());
    }

    #[test]
    fn test_messages() {
        let err = ConfigError::InvalidBoolean {
            key: "oldCorefFormat".into(),
            value: "yes".into(),
        };
        assert_eq!(
            err.to_string(),
            "property 'oldCorefFormat' must be true or false, found 'yes'"
        );

        let err: CorefError = ConfigError::MissingParser.into();
        assert_eq!(
            err.to_string(),
            "configuration fault: parse annotator must be set before annotating"
        );
    }
}
