//! Sentence bundle extraction and label merging.
//!
//! Before mentions can be found, each sentence's tree has to be bound to its
//! tokens and every token needs an utterance number. While walking the
//! sentences we also look for speaker annotations, which switch the resolver
//! into marked-discourse mode.

use layered_coref_document::{Document, Token, Tree};
use tracing::warn;

use crate::ProcessingFault;

/// Utterance assigned to tokens that arrive without one.
pub const DEFAULT_UTTERANCE: usize = 0;

/// Read-only view of one sentence, as handed to the mention finder and arranger.
#[derive(Debug, Clone, Copy)]
pub struct SentenceBundle<'a> {
    pub index: usize,
    pub tokens: &'a [Token],
    pub tree: Option<&'a Tree>,
}

/// What the extraction pass learned about the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleScan {
    pub sentence_count: usize,
    /// Some token carries a speaker annotation
    pub has_speaker: bool,
}

/// Merge labels and initialize utterances, sentence by sentence.
///
/// Returns `None` when the document has no sentence structure.
pub fn extract_and_merge(document: &mut Document) -> Result<Option<BundleScan>, ProcessingFault> {
    let sentences = match document.sentences_mut() {
        Some(sentences) => sentences,
        None => return Ok(None),
    };

    let mut has_speaker = false;
    for (index, sentence) in sentences.iter_mut().enumerate() {
        if !has_speaker {
            has_speaker = sentence.tokens().iter().any(|t| t.speaker.is_some());
        }

        let (tokens, tree) = sentence.parts_mut();
        if let Some(tree) = tree {
            merge_labels(index, tree, tokens)?;
        }
        initialize_utterance(tokens);
    }

    Ok(Some(BundleScan {
        sentence_count: sentences.len(),
        has_speaker,
    }))
}

/// Bind tree leaves to tokens by position.
///
/// Tokens without a POS tag take the tag of their preterminal.
pub fn merge_labels(
    sentence: usize,
    tree: &mut Tree,
    tokens: &mut [Token],
) -> Result<(), ProcessingFault> {
    let tags: Vec<Option<String>> = tree
        .preterminal_tags()
        .into_iter()
        .map(|tag| tag.map(str::to_string))
        .collect();

    let leaves = tree.leaves_mut();
    if leaves.len() != tokens.len() {
        return Err(ProcessingFault::LeafCountMismatch {
            sentence,
            leaves: leaves.len(),
            tokens: tokens.len(),
        });
    }

    for (idx, (leaf, token)) in leaves.into_iter().zip(tokens.iter_mut()).enumerate() {
        if leaf.label() != token.word {
            warn!(
                sentence,
                token = idx,
                leaf = leaf.label(),
                word = token.word.as_str(),
                "tree leaf does not match token text"
            );
        }
        leaf.bind_token(idx);
        if token.pos.is_none() {
            token.pos = tags[idx].clone();
        }
    }

    Ok(())
}

pub fn initialize_utterance(tokens: &mut [Token]) {
    for token in tokens {
        if token.utterance.is_none() {
            token.utterance = Some(DEFAULT_UTTERANCE);
        }
    }
}

/// Borrow every sentence as a bundle. Empty for unsplit documents.
pub fn sentence_bundles(document: &Document) -> Vec<SentenceBundle<'_>> {
    document
        .sentences()
        .unwrap_or(&[])
        .iter()
        .enumerate()
        .map(|(index, sentence)| SentenceBundle {
            index,
            tokens: sentence.tokens(),
            tree: sentence.tree(),
        })
        .collect()
}
