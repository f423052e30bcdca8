//! Coreference output types.
//!
//! The modern output is a mapping from chain id to [`CorefChain`]. The legacy
//! output adds a flat graph of [`CorefLink`]s between head tokens and a
//! [`TokenCluster`] shared by every head token of a multi-mention chain.
//!
//! Legacy coordinates are 1-based, matching the indices used for syntactic
//! dependencies, so consumers can mix both kinds of edges without
//! translating. [`HeadCoord`] is the only place that conversion happens.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::TokenPosition;

/// Broad mention category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MentionKind {
    /// Personal or possessive pronoun ("he", "its")
    Pronominal,
    /// Common noun phrase ("the company")
    #[default]
    Nominal,
    /// Proper name ("John Smith")
    Proper,
}

/// A mention as it appears inside a chain.
///
/// `position` is the mention's index in its sentence's arranged mention list;
/// all offsets are 0-based and `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainMention {
    pub mention_id: u32,
    pub sentence: usize,
    pub position: usize,
    pub start: usize,
    pub end: usize,
    pub head: usize,
    pub text: String,
    pub kind: MentionKind,
}

impl ChainMention {
    pub fn head_position(&self) -> TokenPosition {
        TokenPosition::new(self.sentence, self.head)
    }

    /// Textual order key: sentence, then arranged position.
    pub fn order_key(&self) -> (usize, usize) {
        (self.sentence, self.position)
    }
}

/// Mentions judged to denote the same entity, in textual order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorefChain {
    chain_id: u32,
    mentions: Vec<ChainMention>,
    representative: usize,
}

impl CorefChain {
    /// Build a chain, sorting mentions into textual order.
    ///
    /// The representative mention is the first proper name, else the first
    /// nominal, else the first mention.
    pub fn new(chain_id: u32, mut mentions: Vec<ChainMention>) -> Self {
        mentions.sort_by_key(ChainMention::order_key);
        let representative = mentions
            .iter()
            .position(|m| m.kind == MentionKind::Proper)
            .or_else(|| mentions.iter().position(|m| m.kind == MentionKind::Nominal))
            .unwrap_or(0);
        Self {
            chain_id,
            mentions,
            representative,
        }
    }

    pub fn chain_id(&self) -> u32 {
        self.chain_id
    }

    pub fn mentions_in_textual_order(&self) -> &[ChainMention] {
        &self.mentions
    }

    pub fn representative(&self) -> Option<&ChainMention> {
        self.mentions.get(self.representative)
    }

    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.mentions.len() == 1
    }
}

/// A 1-based (sentence, token) coordinate in legacy output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HeadCoord {
    pub sentence: NonZeroUsize,
    pub token: NonZeroUsize,
}

impl HeadCoord {
    /// Shift a 0-based position to 1-based coordinates.
    ///
    /// Returns `None` only if an index is `usize::MAX`.
    pub fn from_position(position: TokenPosition) -> Option<Self> {
        Some(Self {
            sentence: one_based(position.sentence)?,
            token: one_based(position.token)?,
        })
    }

    pub fn to_position(self) -> TokenPosition {
        TokenPosition::new(self.sentence.get() - 1, self.token.get() - 1)
    }

    /// Raw `(sentence, token)` pair, both at least 1.
    pub fn as_tuple(self) -> (usize, usize) {
        (self.sentence.get(), self.token.get())
    }
}

fn one_based(index: usize) -> Option<NonZeroUsize> {
    index.checked_add(1).and_then(NonZeroUsize::new)
}

impl std::fmt::Display for HeadCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.sentence, self.token)
    }
}

/// One edge of the legacy coreference graph: a later mention's head token
/// pointing at an earlier coreferent mention's head token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorefLink {
    pub source: HeadCoord,
    pub target: HeadCoord,
}

impl std::fmt::Display for CorefLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// A head token belonging to a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMember {
    pub position: TokenPosition,
    pub word: String,
}

/// The distinct head tokens of one multi-mention chain.
///
/// Members are unique by position and kept in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCluster {
    members: Vec<ClusterMember>,
}

impl TokenCluster {
    pub fn new(mut members: Vec<ClusterMember>) -> Self {
        members.sort_by_key(|m| m.position);
        members.dedup_by_key(|m| m.position);
        Self { members }
    }

    pub fn members(&self) -> &[ClusterMember] {
        &self.members
    }

    pub fn contains(&self, position: TokenPosition) -> bool {
        self.members.iter().any(|m| m.position == position)
    }

    pub fn words(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.word.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(id: u32, sentence: usize, position: usize, kind: MentionKind) -> ChainMention {
        ChainMention {
            mention_id: id,
            sentence,
            position,
            start: 0,
            end: 1,
            head: 0,
            text: format!("m{}", id),
            kind,
        }
    }

    #[test]
    fn test_chain_orders_mentions() {
        let chain = CorefChain::new(
            1,
            vec![
                mention(3, 1, 0, MentionKind::Pronominal),
                mention(1, 0, 1, MentionKind::Nominal),
                mention(0, 0, 0, MentionKind::Pronominal),
            ],
        );
        let ids: Vec<_> = chain.mentions_in_textual_order().iter().map(|m| m.mention_id).collect();
        assert_eq!(ids, vec![0, 1, 3]);
    }

    #[test]
    fn test_representative_prefers_proper() {
        let chain = CorefChain::new(
            1,
            vec![
                mention(0, 0, 0, MentionKind::Nominal),
                mention(1, 1, 0, MentionKind::Proper),
            ],
        );
        assert_eq!(chain.representative().unwrap().mention_id, 1);

        let chain = CorefChain::new(2, vec![mention(4, 0, 0, MentionKind::Pronominal)]);
        assert_eq!(chain.representative().unwrap().mention_id, 4);
        assert!(chain.is_singleton());
    }

    #[test]
    fn test_head_coord_is_one_based() {
        let coord = HeadCoord::from_position(TokenPosition::new(0, 0)).unwrap();
        assert_eq!(coord.as_tuple(), (1, 1));
        assert_eq!(coord.to_position(), TokenPosition::new(0, 0));
        assert_eq!(coord.to_string(), "(1, 1)");
        assert!(HeadCoord::from_position(TokenPosition::new(usize::MAX, 0)).is_none());
    }

    #[test]
    fn test_cluster_dedups_by_position() {
        let member = |s, t, w: &str| ClusterMember {
            position: TokenPosition::new(s, t),
            word: w.to_string(),
        };
        let cluster = TokenCluster::new(vec![
            member(1, 0, "He"),
            member(0, 1, "Smith"),
            member(1, 0, "He"),
        ]);
        assert_eq!(cluster.words(), vec!["Smith", "He"]);
        assert!(cluster.contains(TokenPosition::new(1, 0)));
        assert_eq!(cluster.len(), 2);
    }
}
