//! Mentions and the mention-finding seam.
//!
//! A [`MentionFinder`] is stateful and serves exactly one document. The
//! annotator never holds one; it holds a [`MentionFinderFactory`] and asks it
//! for a fresh finder on every call, handing over the shared parser and the
//! reparse flag.

mod rule_based;

use std::sync::Arc;

use layered_coref_document::{MentionKind, Token, Tree};

use crate::resolve::{Animacy, Dictionaries, Gender, Number, Person};
use crate::{ParseFailure, ProcessingFault, SentenceBundle};

pub use rule_based::{RuleBasedFinderFactory, RuleBasedMentionFinder};

/// A candidate mention: a contiguous token span within one sentence.
///
/// Offsets are 0-based and `end` is exclusive. `mention_id` and `features`
/// are filled in by the arranger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub mention_id: u32,
    pub sentence: usize,
    pub start: usize,
    pub end: usize,
    pub head: usize,
    pub features: MentionFeatures,
}

impl Mention {
    pub fn new(sentence: usize, start: usize, end: usize, head: usize) -> Self {
        Self {
            mention_id: 0,
            sentence,
            start,
            end,
            head,
            features: MentionFeatures::default(),
        }
    }

    pub fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when both spans share at least one token of the same sentence.
    pub fn overlaps(&self, other: &Mention) -> bool {
        self.sentence == other.sentence && self.start < other.end && other.start < self.end
    }

    pub fn text(&self) -> String {
        self.features.words.join(" ")
    }

    pub fn is_pronominal(&self) -> bool {
        self.features.kind == MentionKind::Pronominal
    }
}

/// Lexical and semantic attributes the resolver compares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionFeatures {
    pub words: Vec<String>,
    pub head_word: String,
    pub kind: MentionKind,
    pub number: Number,
    pub gender: Gender,
    pub person: Person,
    pub animacy: Animacy,
    /// Entity tag of the head token
    pub ner: Option<String>,
    pub speaker: Option<String>,
    pub utterance: usize,
}

/// Shared capability to (re)parse a sentence.
///
/// One handle serves every annotator instance and every thread.
pub trait ParserHandle: Send + Sync {
    fn parse(&self, tokens: &[Token]) -> Result<Tree, ParseFailure>;
}

/// Per-document mention extraction.
pub trait MentionFinder {
    /// One unordered mention list per sentence, index-aligned with `bundles`.
    fn extract_predicted_mentions(
        &mut self,
        bundles: &[SentenceBundle<'_>],
        dictionaries: &Dictionaries,
    ) -> Result<Vec<Vec<Mention>>, ProcessingFault>;
}

/// Builds a fresh [`MentionFinder`] for every document.
pub trait MentionFinderFactory: Send + Sync {
    fn create(&self, parser: Arc<dyn ParserHandle>, allow_reparsing: bool)
        -> Box<dyn MentionFinder>;
}
