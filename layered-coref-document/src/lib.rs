//! Document model for layered-coref.
//!
//! This crate holds the data the coreference annotator consumes and produces:
//! sentences of tokens with their constituency trees on the input side, and
//! chains, head-token links and token clusters on the output side.
//!
//! ## Core Types
//!
//! - [`Document`] - Ordered sentences plus attached coreference annotations
//! - [`Sentence`] / [`Token`] / [`Tree`] - Upstream analysis, consumed as-is
//! - [`CorefChain`] / [`ChainMention`] - Modern chain output
//! - [`CorefLink`] / [`HeadCoord`] / [`TokenCluster`] - Legacy output shape
//!
//! ## Example
//!
//! ```
//! use layered_coref_document::{Document, Sentence, Tree};
//!
//! let tree = Tree::parse("(ROOT (S (NP (PRP He)) (VP (VBD left)) (. .)))").unwrap();
//! let doc = Document::from_sentences(vec![Sentence::from_tree(tree)]);
//! assert_eq!(doc.sentence_count(), 1);
//! assert_eq!(doc.sentence(0).unwrap().tokens()[0].word, "He");
//! ```

mod coref;
mod document;
mod token;
mod tree;

pub use document::{CorefAnnotations, Document, Sentence, TokenPosition};

pub use token::Token;

pub use tree::{Tree, TreeParseError};

pub use coref::{
    ChainMention,
    ClusterMember,
    CorefChain,
    CorefLink,
    HeadCoord,
    MentionKind,
    TokenCluster,
};
