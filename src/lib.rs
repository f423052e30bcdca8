#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Deterministic coreference annotation for parsed documents.
//!
//! The annotator takes a document whose sentences are tokenized, tagged and
//! parsed, finds candidate mentions, resolves them into chains with a
//! multi-pass sieve and writes the chains back onto the document.
//!
//! ## Pipeline
//!
//! 1. [`extract_and_merge`] - Bind tree leaves to tokens, default utterances,
//!    detect speakers
//! 2. [`MentionFinder`] - Candidate mentions per sentence (fresh per document)
//! 3. [`MentionArranger`] - Textual ordering and mention features
//! 4. [`CorefResolver`] - Partition into [`CorefChain`]s
//! 5. [`publish`] - Attach chains, plus legacy links and token clusters when
//!    `oldCorefFormat` is set
//!
//! Every collaborator sits behind a trait so tests and callers can swap in
//! their own. [`DeterministicCorefAnnotator::new`] wires the defaults:
//! [`RuleBasedFinderFactory`], [`PositionalArranger`] and [`SieveResolver`].
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use layered_coref::{
//!     CorefConfig, DeterministicCorefAnnotator, ParseFailure, ParserHandle,
//! };
//! use layered_coref_document::{Document, Sentence, Token, Tree};
//!
//! struct NoParser;
//!
//! impl ParserHandle for NoParser {
//!     fn parse(&self, _tokens: &[Token]) -> Result<Tree, ParseFailure> {
//!         Err(ParseFailure("no parser available".into()))
//!     }
//! }
//!
//! let annotator = DeterministicCorefAnnotator::new(CorefConfig::default())
//!     .unwrap()
//!     .with_parser(Arc::new(NoParser))
//!     .unwrap();
//!
//! let mut doc = Document::from_sentences(vec![
//!     Sentence::from_tree(
//!         Tree::parse("(ROOT (S (NP (NNP John) (NNP Smith)) (VP (VBD arrived)) (. .)))").unwrap(),
//!     ),
//!     Sentence::from_tree(Tree::parse("(ROOT (S (NP (PRP He)) (VP (VBD left)) (. .)))").unwrap()),
//! ]);
//!
//! annotator.annotate(&mut doc).unwrap();
//! let chains = doc.annotations().chains().unwrap();
//! assert_eq!(chains.len(), 1);
//! ```

mod annotator;
mod arrange;
mod bundle;
mod config;
mod display;
mod error;
mod mention;
mod publish;
mod requirement;
mod resolve;

pub use annotator::{AnnotationOutcome, DeterministicCorefAnnotator, SkipReason};
pub use arrange::{ArrangedDocument, MentionArranger, PositionalArranger};
pub use bundle::{
    extract_and_merge, initialize_utterance, merge_labels, sentence_bundles, BundleScan,
    SentenceBundle, DEFAULT_UTTERANCE,
};
pub use config::{
    CorefConfig, ALLOW_REPARSING, ALLOW_REPARSING_PROP, DICTIONARIES_PROP, OLD_FORMAT_PROP,
    SIEVE_PASSES_PROP,
};
pub use display::DocumentDisplay;
pub use error::{ConfigError, CorefError, CorefResult, ParseFailure, ProcessingFault};
pub use mention::{
    Mention, MentionFeatures, MentionFinder, MentionFinderFactory, ParserHandle,
    RuleBasedFinderFactory, RuleBasedMentionFinder,
};
pub use publish::{
    chain_links, coref_graph, head_coord, publish, token_clusters, MentionLink, MentionPosition,
    PublishSummary,
};
pub use requirement::{unmet_requirements, Annotator, Requirement};
pub use resolve::{
    Animacy, CorefResolver, Dictionaries, Gender, Number, Person, PronounClass, SievePass,
    SieveResolver,
};

pub use layered_coref_document::{
    ChainMention, ClusterMember, CorefAnnotations, CorefChain, CorefLink, Document, HeadCoord,
    MentionKind, Sentence, Token, TokenCluster, TokenPosition, Tree,
};

#[cfg(test)]
mod tests {
    mod annotator;
    mod concurrency;
    mod display;
    mod fakes;
    mod publish;
}
