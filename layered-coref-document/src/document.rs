//! Documents and sentences.
//!
//! A [`Document`] is what upstream stages hand to the coreference annotator:
//! an ordered list of sentences, each with its tokens and (if parsing has
//! run) its constituency tree. A document built without sentence splitting
//! has no sentence structure at all, which the annotator treats as a
//! precondition failure.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::{CorefChain, CorefLink, Token, TokenCluster, Tree};

/// Position of a token within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenPosition {
    /// Sentence index (0-based)
    pub sentence: usize,
    /// Token index within that sentence (0-based)
    pub token: usize,
}

impl TokenPosition {
    pub fn new(sentence: usize, token: usize) -> Self {
        Self { sentence, token }
    }
}

/// One sentence: its tokens and, if parsed, its syntax tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    tokens: Vec<Token>,
    #[serde(default)]
    tree: Option<Tree>,
}

impl Sentence {
    /// Create a sentence from tokens, renumbering their indices from 0.
    pub fn new(tokens: Vec<Token>) -> Self {
        let tokens = tokens
            .into_iter()
            .enumerate()
            .map(|(index, mut token)| {
                token.index = index;
                token
            })
            .collect();
        Self { tokens, tree: None }
    }

    /// Tokenize raw text on word boundaries, dropping whitespace.
    ///
    /// No tags are assigned; this mirrors what a bare tokenizer produces.
    pub fn from_text(text: &str) -> Self {
        let tokens = text
            .split_word_bounds()
            .filter(|piece| !piece.trim().is_empty())
            .enumerate()
            .map(|(index, word)| Token::new(index, word))
            .collect();
        Self { tokens, tree: None }
    }

    /// Build a sentence whose tokens are the tree's leaves, tagged with the
    /// tree's preterminal labels.
    pub fn from_tree(tree: Tree) -> Self {
        let tokens = tree
            .leaves()
            .into_iter()
            .zip(tree.preterminal_tags())
            .enumerate()
            .map(|(index, (leaf, tag))| {
                let token = Token::new(index, leaf.label());
                match tag {
                    Some(tag) => token.with_pos(tag),
                    None => token,
                }
            })
            .collect();
        Self {
            tokens,
            tree: Some(tree),
        }
    }

    pub fn with_tree(mut self, tree: Tree) -> Self {
        self.tree = Some(tree);
        self
    }

    /// Mark every token as spoken by `speaker`.
    pub fn with_speaker(mut self, speaker: &str) -> Self {
        for token in &mut self.tokens {
            token.speaker = Some(speaker.to_string());
        }
        self
    }

    /// Assign NER tags positionally. Extra tags are ignored.
    pub fn with_ner(mut self, tags: &[&str]) -> Self {
        for (token, tag) in self.tokens.iter_mut().zip(tags) {
            token.ner = Some((*tag).to_string());
        }
        self
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    /// Split borrow of tokens and tree, for passes that touch both.
    pub fn parts_mut(&mut self) -> (&mut [Token], Option<&mut Tree>) {
        (&mut self.tokens, self.tree.as_mut())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Words joined by single spaces.
    pub fn text(&self) -> String {
        self.words(0, self.tokens.len())
    }

    /// Words of `[start, end)` joined by single spaces.
    pub fn words(&self, start: usize, end: usize) -> String {
        let end = end.min(self.tokens.len());
        let start = start.min(end);
        self.tokens[start..end]
            .iter()
            .map(|t| t.word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Coreference output attached to a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorefAnnotations {
    marked_discourse: bool,
    chains: Option<BTreeMap<u32, CorefChain>>,
    graph: Option<Vec<CorefLink>>,
}

impl CorefAnnotations {
    /// Whether speaker-aware ("marked discourse") resolution was requested.
    pub fn marked_discourse(&self) -> bool {
        self.marked_discourse
    }

    pub fn set_marked_discourse(&mut self, marked: bool) {
        self.marked_discourse = marked;
    }

    /// Chain id to chain mapping.
    pub fn chains(&self) -> Option<&BTreeMap<u32, CorefChain>> {
        self.chains.as_ref()
    }

    pub fn set_chains(&mut self, chains: BTreeMap<u32, CorefChain>) {
        self.chains = Some(chains);
    }

    /// Legacy head-token link graph (1-based coordinates).
    pub fn graph(&self) -> Option<&[CorefLink]> {
        self.graph.as_deref()
    }

    pub fn set_graph(&mut self, graph: Vec<CorefLink>) {
        self.graph = Some(graph);
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_none() && self.graph.is_none()
    }
}

/// Everything observable about a document's coreference output, for dumping.
#[derive(Serialize)]
struct CorefDump<'a> {
    marked_discourse: bool,
    chains: Option<&'a BTreeMap<u32, CorefChain>>,
    graph: Option<&'a [CorefLink]>,
    clusters: Vec<&'a TokenCluster>,
}

/// A document handed to the annotator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// `None` when sentence splitting never ran
    sentences: Option<Vec<Sentence>>,
    #[serde(default)]
    annotations: CorefAnnotations,
}

impl Document {
    pub fn from_sentences(sentences: Vec<Sentence>) -> Self {
        Self {
            sentences: Some(sentences),
            annotations: CorefAnnotations::default(),
        }
    }

    /// A document that carries no sentence structure.
    pub fn unsplit() -> Self {
        Self {
            sentences: None,
            annotations: CorefAnnotations::default(),
        }
    }

    /// Create a document with one sentence per non-empty line.
    pub fn from_text(text: &str) -> Self {
        Self::from_sentences(
            text.lines()
                .filter(|line| !line.trim().is_empty())
                .map(Sentence::from_text)
                .collect(),
        )
    }

    pub fn has_sentences(&self) -> bool {
        self.sentences.is_some()
    }

    pub fn sentences(&self) -> Option<&[Sentence]> {
        self.sentences.as_deref()
    }

    pub fn sentences_mut(&mut self) -> Option<&mut [Sentence]> {
        self.sentences.as_deref_mut()
    }

    pub fn sentence(&self, index: usize) -> Option<&Sentence> {
        self.sentences.as_ref().and_then(|s| s.get(index))
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.as_ref().map_or(0, Vec::len)
    }

    pub fn token(&self, position: TokenPosition) -> Option<&Token> {
        self.sentence(position.sentence)
            .and_then(|s| s.tokens().get(position.token))
    }

    pub fn token_mut(&mut self, position: TokenPosition) -> Option<&mut Token> {
        self.sentences
            .as_mut()
            .and_then(|s| s.get_mut(position.sentence))
            .and_then(|s| s.tokens_mut().get_mut(position.token))
    }

    pub fn annotations(&self) -> &CorefAnnotations {
        &self.annotations
    }

    pub fn annotations_mut(&mut self) -> &mut CorefAnnotations {
        &mut self.annotations
    }

    /// Distinct token clusters, in order of their first member token.
    pub fn clusters(&self) -> Vec<&TokenCluster> {
        let mut out: Vec<&Arc<TokenCluster>> = Vec::new();
        for sentence in self.sentences().unwrap_or(&[]) {
            for token in sentence.tokens() {
                if let Some(cluster) = &token.cluster {
                    if !out.iter().any(|seen| Arc::ptr_eq(seen, cluster)) {
                        out.push(cluster);
                    }
                }
            }
        }
        out.into_iter().map(|c| c.as_ref()).collect()
    }

    /// Returns true if no coreference output of any shape is attached.
    pub fn is_unannotated(&self) -> bool {
        self.annotations.is_empty() && self.clusters().is_empty()
    }

    /// Serialize the coreference output (chains, links, clusters) to RON.
    pub fn coref_ron_string(&self) -> Result<String, ron::Error> {
        let dump = CorefDump {
            marked_discourse: self.annotations.marked_discourse,
            chains: self.annotations.chains.as_ref(),
            graph: self.annotations.graph.as_deref(),
            clusters: self.clusters(),
        };
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(8)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(&dump, config)
    }
}
