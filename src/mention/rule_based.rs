use std::sync::Arc;

use layered_coref_document::{Token, Tree};
use tracing::{debug, warn};

use super::{Mention, MentionFinder, MentionFinderFactory, ParserHandle};
use crate::resolve::Dictionaries;
use crate::{ProcessingFault, SentenceBundle};

/// Tags that end the pre-modifier part of a noun phrase for head finding.
const HEAD_CUTOFF_TAGS: &[&str] = &["IN", "TO", "WDT", "WP", ","];

/// Builds [`RuleBasedMentionFinder`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedFinderFactory;

impl MentionFinderFactory for RuleBasedFinderFactory {
    fn create(
        &self,
        parser: Arc<dyn ParserHandle>,
        allow_reparsing: bool,
    ) -> Box<dyn MentionFinder> {
        Box::new(RuleBasedMentionFinder::new(parser, allow_reparsing))
    }
}

/// Finds noun phrases, pronouns and named-entity runs.
///
/// Sentences that arrive without a tree are parsed on the fly when reparsing
/// is allowed. The reparsed tree is only used for this document's mention
/// extraction and is never written back.
pub struct RuleBasedMentionFinder {
    parser: Arc<dyn ParserHandle>,
    allow_reparsing: bool,
    reparsed: usize,
}

impl RuleBasedMentionFinder {
    pub fn new(parser: Arc<dyn ParserHandle>, allow_reparsing: bool) -> Self {
        Self {
            parser,
            allow_reparsing,
            reparsed: 0,
        }
    }

    /// Sentences this finder had to parse itself.
    pub fn reparsed_count(&self) -> usize {
        self.reparsed
    }

    fn reparse(&mut self, bundle: &SentenceBundle<'_>) -> Result<Tree, ProcessingFault> {
        let tree = self
            .parser
            .parse(bundle.tokens)
            .map_err(|e| ProcessingFault::Reparse {
                sentence: bundle.index,
                message: e.to_string(),
            })?;
        if tree.leaf_count() != bundle.tokens.len() {
            return Err(ProcessingFault::Reparse {
                sentence: bundle.index,
                message: format!(
                    "parser returned {} leaves for {} tokens",
                    tree.leaf_count(),
                    bundle.tokens.len()
                ),
            });
        }
        self.reparsed += 1;
        Ok(tree)
    }

    fn sentence_mentions(
        &self,
        bundle: &SentenceBundle<'_>,
        tree: Option<&Tree>,
        dictionaries: &Dictionaries,
    ) -> Vec<Mention> {
        let tokens = bundle.tokens;
        let tags = tree.map(Tree::preterminal_tags).unwrap_or_default();
        let tag_at = |idx: usize| {
            tokens[idx]
                .pos
                .as_deref()
                .or_else(|| tags.get(idx).copied().flatten())
        };

        let mut spans: Vec<(usize, usize)> = Vec::new();
        let mut push = |span: (usize, usize)| {
            if span.0 < span.1 && span.1 <= tokens.len() && !spans.contains(&span) {
                spans.push(span);
            }
        };

        if let Some(tree) = tree {
            for span in tree.constituent_spans("NP") {
                push(span);
            }
        }

        for (idx, token) in tokens.iter().enumerate() {
            let pronoun_tag = matches!(tag_at(idx), Some("PRP") | Some("PRP$"));
            if pronoun_tag || dictionaries.is_pronoun(&token.word) {
                push((idx, idx + 1));
            }
        }

        for span in entity_runs(tokens) {
            push(span);
        }

        spans
            .into_iter()
            .map(|(start, end)| {
                let head = find_head(start, end, &tag_at);
                Mention::new(bundle.index, start, end, head)
            })
            .collect()
    }
}

impl MentionFinder for RuleBasedMentionFinder {
    fn extract_predicted_mentions(
        &mut self,
        bundles: &[SentenceBundle<'_>],
        dictionaries: &Dictionaries,
    ) -> Result<Vec<Vec<Mention>>, ProcessingFault> {
        let mut out = Vec::with_capacity(bundles.len());
        for bundle in bundles {
            if bundle.tokens.is_empty() {
                out.push(Vec::new());
                continue;
            }

            let reparsed: Tree;
            let tree = match bundle.tree {
                Some(tree) => Some(tree),
                None if self.allow_reparsing => {
                    reparsed = self.reparse(bundle)?;
                    debug!(sentence = bundle.index, "reparsed sentence without tree");
                    Some(&reparsed)
                }
                None => {
                    warn!(
                        sentence = bundle.index,
                        "sentence has no tree and reparsing is disabled; noun phrases skipped"
                    );
                    None
                }
            };

            out.push(self.sentence_mentions(bundle, tree, dictionaries));
        }
        Ok(out)
    }
}

/// Maximal runs of tokens sharing the same entity tag.
fn entity_runs(tokens: &[Token]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut idx = 0;
    while idx < tokens.len() {
        match tokens[idx].entity_tag() {
            Some(tag) => {
                let start = idx;
                while idx < tokens.len() && tokens[idx].entity_tag() == Some(tag) {
                    idx += 1;
                }
                runs.push((start, idx));
            }
            None => idx += 1,
        }
    }
    runs
}

/// Last noun, pronoun or number before any post-modifier, else the last token.
fn find_head<'t>(start: usize, end: usize, tag_at: &impl Fn(usize) -> Option<&'t str>) -> usize {
    let cutoff = (start + 1..end)
        .find(|&idx| tag_at(idx).map_or(false, |tag| HEAD_CUTOFF_TAGS.contains(&tag)))
        .unwrap_or(end);

    (start..cutoff)
        .rev()
        .find(|&idx| {
            tag_at(idx).map_or(false, |tag| {
                tag.starts_with("NN") || tag.starts_with("PRP") || tag == "CD"
            })
        })
        .unwrap_or(cutoff - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseFailure;
    use layered_coref_document::{Document, Sentence};

    struct FlatParser;

    impl ParserHandle for FlatParser {
        fn parse(&self, tokens: &[Token]) -> Result<Tree, ParseFailure> {
            let np = Tree::node(
                "NP",
                tokens
                    .iter()
                    .map(|t| Tree::preterminal("NNP", t.word.clone()))
                    .collect(),
            );
            Ok(Tree::node("ROOT", vec![np]))
        }
    }

    struct BrokenParser;

    impl ParserHandle for BrokenParser {
        fn parse(&self, _tokens: &[Token]) -> Result<Tree, ParseFailure> {
            Ok(Tree::node("ROOT", vec![Tree::preterminal("NN", "x")]))
        }
    }

    fn spans(mentions: &[Mention]) -> Vec<(usize, usize, usize)> {
        let mut out: Vec<_> = mentions.iter().map(|m| (m.start, m.end, m.head)).collect();
        out.sort();
        out
    }

    fn find(doc: &Document, parser: Arc<dyn ParserHandle>, reparse: bool) -> Vec<Vec<Mention>> {
        let bundles = crate::sentence_bundles(doc);
        let mut finder = RuleBasedFinderFactory.create(parser, reparse);
        finder
            .extract_predicted_mentions(&bundles, &Dictionaries::english())
            .unwrap()
    }

    #[test]
    fn test_noun_phrases_and_pronouns() {
        let tree = Tree::parse(
            "(ROOT (S (NP (NNP John) (NNP Smith)) (VP (VBD met) (NP (PRP him))) (. .)))",
        )
        .unwrap();
        let mut doc = Document::from_sentences(vec![Sentence::from_tree(tree)]);
        crate::extract_and_merge(&mut doc).unwrap();

        let mentions = find(&doc, Arc::new(FlatParser), true);
        assert_eq!(mentions.len(), 1);
        assert_eq!(spans(&mentions[0]), vec![(0, 2, 1), (3, 4, 3)]);
    }

    #[test]
    fn test_head_stops_at_preposition() {
        let tree = Tree::parse(
            "(ROOT (NP (NP (DT the) (NN president)) (PP (IN of) (NP (DT the) (NN company)))))",
        )
        .unwrap();
        let mut doc = Document::from_sentences(vec![Sentence::from_tree(tree)]);
        crate::extract_and_merge(&mut doc).unwrap();

        let mentions = find(&doc, Arc::new(FlatParser), true);
        assert_eq!(spans(&mentions[0]), vec![(0, 2, 1), (0, 5, 1), (3, 5, 4)]);
    }

    #[test]
    fn test_entity_runs() {
        let sentence = Sentence::from_text("Acme Corp hired Mary").with_ner(&[
            "ORGANIZATION",
            "ORGANIZATION",
            "O",
            "PERSON",
        ]);
        let doc = Document::from_sentences(vec![sentence]);
        let mentions = find(&doc, Arc::new(FlatParser), false);
        assert_eq!(spans(&mentions[0]), vec![(0, 2, 1), (3, 4, 3)]);
    }

    #[test]
    fn test_reparses_sentences_without_tree() {
        let doc = Document::from_sentences(vec![Sentence::from_text("Acme Corp")]);
        let bundles = crate::sentence_bundles(&doc);
        let mut finder = RuleBasedMentionFinder::new(Arc::new(FlatParser), true);
        let mentions = finder
            .extract_predicted_mentions(&bundles, &Dictionaries::english())
            .unwrap();
        assert_eq!(finder.reparsed_count(), 1);
        assert_eq!(spans(&mentions[0]), vec![(0, 2, 1)]);
        // never written back
        assert!(doc.sentence(0).unwrap().tree().is_none());
    }

    #[test]
    fn test_no_reparse_keeps_pronouns_only() {
        let doc = Document::from_sentences(vec![Sentence::from_text("She saw Acme Corp")]);
        let mentions = find(&doc, Arc::new(FlatParser), false);
        assert_eq!(spans(&mentions[0]), vec![(0, 1, 0)]);
    }

    #[test]
    fn test_reparse_leaf_mismatch_is_fault() {
        let doc = Document::from_sentences(vec![Sentence::from_text("Acme Corp")]);
        let bundles = crate::sentence_bundles(&doc);
        let mut finder = RuleBasedMentionFinder::new(Arc::new(BrokenParser), true);
        let err = finder
            .extract_predicted_mentions(&bundles, &Dictionaries::english())
            .unwrap_err();
        assert!(matches!(err, ProcessingFault::Reparse { sentence: 0, .. }));
    }
}
