//! Consolidation of per-sentence mentions into an ordered document.
//!
//! Within a sentence, mentions are ordered by start offset ascending, then
//! span length descending, then head offset ascending. Spans are unique per
//! sentence, so this is a total order. Legacy output looks mention heads up
//! by position in this order, so it must never depend on the order the
//! finder happened to produce.

use std::cmp::Reverse;
use std::sync::Arc;

use layered_coref_document::{MentionKind, Token};

use crate::bundle::DEFAULT_UTTERANCE;
use crate::mention::{Mention, MentionFeatures};
use crate::resolve::{Animacy, Dictionaries, Number, Person};
use crate::{ProcessingFault, SentenceBundle};

/// Mentions of a whole document, ordered per sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrangedDocument {
    sentences: Vec<Vec<Mention>>,
    marked_discourse: bool,
}

impl ArrangedDocument {
    pub fn new(sentences: Vec<Vec<Mention>>, marked_discourse: bool) -> Self {
        Self {
            sentences,
            marked_discourse,
        }
    }

    pub fn sentences(&self) -> &[Vec<Mention>] {
        &self.sentences
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    /// Mentions of one sentence in arranged order. Empty if out of range.
    pub fn ordered_mentions(&self, sentence: usize) -> &[Mention] {
        self.sentences
            .get(sentence)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn mention(&self, sentence: usize, position: usize) -> Option<&Mention> {
        self.sentences.get(sentence)?.get(position)
    }

    pub fn mention_count(&self) -> usize {
        self.sentences.iter().map(Vec::len).sum()
    }

    /// Every mention in document order, with its position in its sentence.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Mention)> + '_ {
        self.sentences
            .iter()
            .flat_map(|mentions| mentions.iter().enumerate())
    }

    /// Speaker annotations were present in the source document.
    pub fn marked_discourse(&self) -> bool {
        self.marked_discourse
    }
}

pub trait MentionArranger: Send + Sync {
    fn arrange(
        &self,
        bundles: &[SentenceBundle<'_>],
        mentions: Vec<Vec<Mention>>,
        marked_discourse: bool,
    ) -> Result<ArrangedDocument, ProcessingFault>;
}

/// Orders mentions by textual position and fills in their features.
#[derive(Debug, Clone)]
pub struct PositionalArranger {
    dictionaries: Arc<Dictionaries>,
}

impl PositionalArranger {
    pub fn new(dictionaries: Arc<Dictionaries>) -> Self {
        Self { dictionaries }
    }

    fn features(&self, tokens: &[Token], mention: &Mention) -> MentionFeatures {
        let span = &tokens[mention.start..mention.end];
        let head = &tokens[mention.head];
        let words: Vec<String> = span.iter().map(|t| t.word.clone()).collect();
        let ner = head.entity_tag().map(str::to_string);

        let mut features = MentionFeatures {
            words,
            head_word: head.word.clone(),
            ner,
            speaker: head.speaker.clone(),
            utterance: head.utterance.unwrap_or(DEFAULT_UTTERANCE),
            ..MentionFeatures::default()
        };

        let pronoun_tag = head.pos_starts_with("PRP");
        let pronoun_class = self.dictionaries.pronoun(&head.word);
        if span.len() == 1 && (pronoun_tag || pronoun_class.is_some()) {
            features.kind = MentionKind::Pronominal;
            if let Some(class) = pronoun_class {
                features.person = class.person;
                features.number = class.number;
                features.gender = class.gender;
                features.animacy = class.animacy;
            }
            return features;
        }

        features.kind = if head.pos_starts_with("NNP") || features.ner.is_some() {
            MentionKind::Proper
        } else {
            MentionKind::Nominal
        };
        features.person = Person::Third;
        features.number = match head.pos.as_deref() {
            Some("NNS") | Some("NNPS") => Number::Plural,
            Some("NN") | Some("NNP") => Number::Singular,
            _ if features.ner.is_some() => Number::Singular,
            _ => Number::Unknown,
        };
        features.animacy = features
            .ner
            .as_deref()
            .map_or(Animacy::Unknown, |tag| self.dictionaries.entity_animacy(tag));
        features
    }
}

impl MentionArranger for PositionalArranger {
    fn arrange(
        &self,
        bundles: &[SentenceBundle<'_>],
        mentions: Vec<Vec<Mention>>,
        marked_discourse: bool,
    ) -> Result<ArrangedDocument, ProcessingFault> {
        if mentions.len() != bundles.len() {
            return Err(ProcessingFault::SentenceCountMismatch {
                expected: bundles.len(),
                found: mentions.len(),
            });
        }

        let mut next_id = 1u32;
        let mut sentences = Vec::with_capacity(bundles.len());
        for (bundle, mut list) in bundles.iter().zip(mentions) {
            for mention in &list {
                check_bounds(bundle, mention)?;
            }

            list.sort_by_key(|m| (m.start, Reverse(m.len()), m.head));
            list.dedup_by_key(|m| m.span());

            for mention in &mut list {
                mention.sentence = bundle.index;
                mention.mention_id = next_id;
                next_id += 1;
                mention.features = self.features(bundle.tokens, mention);
            }
            sentences.push(list);
        }

        Ok(ArrangedDocument::new(sentences, marked_discourse))
    }
}

fn check_bounds(bundle: &SentenceBundle<'_>, mention: &Mention) -> Result<(), ProcessingFault> {
    if mention.start >= mention.end || mention.end > bundle.tokens.len() {
        return Err(ProcessingFault::MentionOutOfBounds {
            sentence: bundle.index,
            start: mention.start,
            end: mention.end,
            tokens: bundle.tokens.len(),
        });
    }
    if mention.head < mention.start || mention.head >= mention.end {
        return Err(ProcessingFault::HeadOutsideSpan {
            sentence: bundle.index,
            start: mention.start,
            end: mention.end,
            head: mention.head,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Gender;
    use layered_coref_document::{Document, Sentence, Tree};

    fn doc() -> Document {
        let s1 = Tree::parse("(ROOT (S (NP (NNP John) (NNP Smith)) (VP (VBD arrived)) (. .)))").unwrap();
        let s2 = Tree::parse("(ROOT (S (NP (PRP He)) (VP (VBD left)) (. .)))").unwrap();
        let mut doc =
            Document::from_sentences(vec![Sentence::from_tree(s1), Sentence::from_tree(s2)]);
        crate::extract_and_merge(&mut doc).unwrap();
        doc
    }

    fn arranger() -> PositionalArranger {
        PositionalArranger::new(Dictionaries::english())
    }

    #[test]
    fn test_orders_and_assigns_ids() {
        let doc = doc();
        let bundles = crate::sentence_bundles(&doc);
        let arranged = arranger()
            .arrange(
                &bundles,
                vec![
                    vec![Mention::new(0, 1, 2, 1), Mention::new(0, 0, 2, 1), Mention::new(0, 0, 1, 0)],
                    vec![Mention::new(1, 0, 1, 0)],
                ],
                false,
            )
            .unwrap();

        let order: Vec<_> = arranged
            .ordered_mentions(0)
            .iter()
            .map(|m| (m.start, m.end, m.mention_id))
            .collect();
        assert_eq!(order, vec![(0, 2, 1), (0, 1, 2), (1, 2, 3)]);
        assert_eq!(arranged.mention(1, 0).unwrap().mention_id, 4);
        assert_eq!(arranged.mention_count(), 4);
        assert!(arranged.mention(1, 1).is_none());
        assert!(arranged.ordered_mentions(7).is_empty());
    }

    #[test]
    fn test_order_ignores_input_order() {
        let doc = doc();
        let bundles = crate::sentence_bundles(&doc);
        let a = vec![Mention::new(0, 0, 2, 1), Mention::new(0, 1, 2, 1)];
        let b = vec![Mention::new(0, 1, 2, 1), Mention::new(0, 0, 2, 1)];
        let first = arranger().arrange(&bundles, vec![a, vec![]], false).unwrap();
        let second = arranger().arrange(&bundles, vec![b, vec![]], false).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_spans_dropped() {
        let doc = doc();
        let bundles = crate::sentence_bundles(&doc);
        let arranged = arranger()
            .arrange(
                &bundles,
                vec![vec![Mention::new(0, 0, 2, 1), Mention::new(0, 0, 2, 1)], vec![]],
                true,
            )
            .unwrap();
        assert_eq!(arranged.ordered_mentions(0).len(), 1);
        assert!(arranged.marked_discourse());
    }

    #[test]
    fn test_features() {
        let doc = doc();
        let bundles = crate::sentence_bundles(&doc);
        let arranged = arranger()
            .arrange(
                &bundles,
                vec![vec![Mention::new(0, 0, 2, 1)], vec![Mention::new(1, 0, 1, 0)]],
                false,
            )
            .unwrap();

        let smith = arranged.mention(0, 0).unwrap();
        assert_eq!(smith.text(), "John Smith");
        assert_eq!(smith.features.head_word, "Smith");
        assert_eq!(smith.features.kind, MentionKind::Proper);
        assert_eq!(smith.features.number, Number::Singular);
        assert_eq!(smith.features.utterance, DEFAULT_UTTERANCE);

        let he = arranged.mention(1, 0).unwrap();
        assert!(he.is_pronominal());
        assert_eq!(he.features.gender, Gender::Male);
    }

    #[test]
    fn test_bounds_are_checked() {
        let doc = doc();
        let bundles = crate::sentence_bundles(&doc);

        let err = arranger()
            .arrange(&bundles, vec![vec![Mention::new(0, 2, 9, 3)], vec![]], false)
            .unwrap_err();
        assert!(matches!(err, ProcessingFault::MentionOutOfBounds { end: 9, .. }));

        let err = arranger()
            .arrange(&bundles, vec![vec![Mention::new(0, 0, 2, 2)], vec![]], false)
            .unwrap_err();
        assert!(matches!(err, ProcessingFault::HeadOutsideSpan { head: 2, .. }));

        let err = arranger().arrange(&bundles, vec![vec![]], false).unwrap_err();
        assert!(matches!(
            err,
            ProcessingFault::SentenceCountMismatch {
                expected: 2,
                found: 1
            }
        ));
    }
}
