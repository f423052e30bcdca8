//! Writing resolution results onto the document.
//!
//! The chain mapping is always attached. Legacy output adds a link graph
//! between 1-based head-token coordinates and a shared cluster on every head
//! token of a multi-mention chain. Everything is derived before the document
//! is touched, so a fault leaves it as it was.

use std::collections::BTreeMap;
use std::sync::Arc;

use layered_coref_document::{
    ClusterMember, CorefChain, CorefLink, Document, HeadCoord, TokenCluster, TokenPosition,
};
use tracing::debug;

use crate::{ArrangedDocument, ProcessingFault};

/// A mention's place in the arranged document: sentence and index into that
/// sentence's ordered mentions. 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MentionPosition {
    pub sentence: usize,
    pub position: usize,
}

/// A later mention pointing at an earlier mention of the same chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MentionLink {
    pub source: MentionPosition,
    pub target: MentionPosition,
}

/// Counts of what [`publish`] attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub chains: usize,
    pub links: usize,
    pub clusters: usize,
}

/// Every coreference edge the chains imply.
///
/// Chains are visited in ascending id order. Within a chain, each mention
/// links to every mention before it, so N mentions give N(N-1)/2 links.
pub fn chain_links(chains: &BTreeMap<u32, CorefChain>) -> Result<Vec<MentionLink>, ProcessingFault> {
    let mut links = Vec::new();
    for (&chain_id, chain) in chains {
        check_chain(chain_id, chain)?;
        let mentions = chain.mentions_in_textual_order();
        for (later_idx, later) in mentions.iter().enumerate() {
            for earlier in &mentions[..later_idx] {
                links.push(MentionLink {
                    source: MentionPosition {
                        sentence: later.sentence,
                        position: later.position,
                    },
                    target: MentionPosition {
                        sentence: earlier.sentence,
                        position: earlier.position,
                    },
                });
            }
        }
    }
    Ok(links)
}

fn check_chain(chain_id: u32, chain: &CorefChain) -> Result<(), ProcessingFault> {
    if chain.chain_id() != chain_id {
        return Err(ProcessingFault::MalformedChain {
            chain_id,
            reason: format!("stored under id {} but carries id {}", chain_id, chain.chain_id()),
        });
    }
    if chain.is_empty() {
        return Err(ProcessingFault::MalformedChain {
            chain_id,
            reason: "no mentions".to_string(),
        });
    }
    let mentions = chain.mentions_in_textual_order();
    if mentions.windows(2).any(|w| w[0].order_key() == w[1].order_key()) {
        return Err(ProcessingFault::MalformedChain {
            chain_id,
            reason: "same mention listed twice".to_string(),
        });
    }
    Ok(())
}

/// Head token of the arranged mention at `at`, as a 1-based coordinate.
///
/// This is the only place 0-based positions become 1-based.
pub fn head_coord(
    arranged: &ArrangedDocument,
    at: MentionPosition,
) -> Result<HeadCoord, ProcessingFault> {
    let lookup_fault = || ProcessingFault::MentionLookup {
        sentence: at.sentence,
        position: at.position,
    };
    let mention = arranged.mention(at.sentence, at.position).ok_or_else(lookup_fault)?;
    HeadCoord::from_position(TokenPosition::new(at.sentence, mention.head)).ok_or_else(lookup_fault)
}

/// The legacy link graph.
pub fn coref_graph(
    chains: &BTreeMap<u32, CorefChain>,
    arranged: &ArrangedDocument,
) -> Result<Vec<CorefLink>, ProcessingFault> {
    chain_links(chains)?
        .into_iter()
        .map(|link| {
            Ok(CorefLink {
                source: head_coord(arranged, link.source)?,
                target: head_coord(arranged, link.target)?,
            })
        })
        .collect()
}

/// Distinct head tokens of each chain with at least two mentions.
pub fn token_clusters(
    document: &Document,
    chains: &BTreeMap<u32, CorefChain>,
    arranged: &ArrangedDocument,
) -> Result<Vec<TokenCluster>, ProcessingFault> {
    let mut clusters = Vec::new();
    for (&chain_id, chain) in chains {
        check_chain(chain_id, chain)?;
        if chain.len() < 2 {
            continue;
        }
        let mut members = Vec::with_capacity(chain.len());
        for chain_mention in chain.mentions_in_textual_order() {
            let mention = arranged
                .mention(chain_mention.sentence, chain_mention.position)
                .ok_or(ProcessingFault::MentionLookup {
                    sentence: chain_mention.sentence,
                    position: chain_mention.position,
                })?;
            if mention.head != chain_mention.head {
                return Err(ProcessingFault::MalformedChain {
                    chain_id,
                    reason: format!(
                        "mention {} has head {} but arranged mention has head {}",
                        chain_mention.mention_id, chain_mention.head, mention.head
                    ),
                });
            }
            let position = TokenPosition::new(chain_mention.sentence, mention.head);
            let token = document.token(position).ok_or(ProcessingFault::TokenLookup {
                sentence: position.sentence,
                token: position.token,
            })?;
            members.push(ClusterMember {
                position,
                word: token.word.clone(),
            });
        }
        clusters.push(TokenCluster::new(members));
    }
    Ok(clusters)
}

/// Attach chains, and with `legacy` the link graph and token clusters.
pub fn publish(
    document: &mut Document,
    chains: BTreeMap<u32, CorefChain>,
    arranged: &ArrangedDocument,
    legacy: bool,
) -> Result<PublishSummary, ProcessingFault> {
    let legacy_output = if legacy {
        let graph = coref_graph(&chains, arranged)?;
        let clusters = token_clusters(document, &chains, arranged)?;
        Some((graph, clusters))
    } else {
        None
    };

    let mut summary = PublishSummary {
        chains: chains.len(),
        ..PublishSummary::default()
    };
    document.annotations_mut().set_chains(chains);

    if let Some((graph, clusters)) = legacy_output {
        for link in &graph {
            debug!(%link, "coref link");
        }
        summary.links = graph.len();
        summary.clusters = clusters.len();
        document.annotations_mut().set_graph(graph);

        for cluster in clusters {
            let shared = Arc::new(cluster);
            for member in shared.members() {
                if let Some(token) = document.token_mut(member.position) {
                    token.cluster = Some(Arc::clone(&shared));
                }
            }
        }
    }

    Ok(summary)
}
