//! Lexical tokens as delivered by the upstream tokenizer and taggers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::TokenCluster;

/// A single token of a sentence.
///
/// Everything except `utterance` and `cluster` comes from upstream stages.
/// The annotator fills `utterance` during label merging and attaches
/// `cluster` when legacy output is requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Position within the sentence (0-based)
    pub index: usize,
    /// Surface text
    pub word: String,
    /// Part-of-speech tag (Penn style)
    #[serde(default)]
    pub pos: Option<String>,
    /// Named-entity tag, `O` for none
    #[serde(default)]
    pub ner: Option<String>,
    /// Speaker identifier for dialogue text
    #[serde(default)]
    pub speaker: Option<String>,
    /// Utterance number used by speaker-aware rules
    #[serde(default)]
    pub utterance: Option<usize>,
    /// Shared set of coreferent head tokens (legacy output only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<Arc<TokenCluster>>,
}

impl Token {
    pub fn new(index: usize, word: impl Into<String>) -> Self {
        Self {
            index,
            word: word.into(),
            pos: None,
            ner: None,
            speaker: None,
            utterance: None,
            cluster: None,
        }
    }

    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = Some(pos.into());
        self
    }

    pub fn with_ner(mut self, ner: impl Into<String>) -> Self {
        self.ner = Some(ner.into());
        self
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    /// Returns the NER tag unless it is absent or the outside tag `O`.
    pub fn entity_tag(&self) -> Option<&str> {
        match self.ner.as_deref() {
            None | Some("O") => None,
            Some(tag) => Some(tag),
        }
    }

    /// Returns true if the POS tag starts with the given prefix.
    pub fn pos_starts_with(&self, prefix: &str) -> bool {
        self.pos.as_deref().map_or(false, |pos| pos.starts_with(prefix))
    }
}
