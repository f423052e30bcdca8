//! A tag-driven chunker standing in for a real syntactic parser.

use layered_coref::{ParseFailure, ParserHandle};
use layered_coref_document::{Token, Tree};

/// Tags that may open or continue a noun phrase.
const NP_TAGS: &[&str] = &["DT", "PRP$", "JJ", "JJR", "JJS", "CD", "NN", "NNS", "NNP", "NNPS", "POS"];

/// Builds flat `(ROOT (S ...))` trees, grouping runs of determiners,
/// adjectives and nouns that end in a noun into `NP`s. Single personal
/// pronouns become their own `NP`.
///
/// Every token must carry a POS tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkingParser;

impl ParserHandle for ChunkingParser {
    fn parse(&self, tokens: &[Token]) -> Result<Tree, ParseFailure> {
        let tags = tokens
            .iter()
            .map(|t| {
                t.pos
                    .as_deref()
                    .ok_or_else(|| ParseFailure(format!("token '{}' has no POS tag", t.word)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut children = Vec::new();
        let mut idx = 0;
        while idx < tokens.len() {
            if tags[idx] == "PRP" {
                children.push(Tree::node(
                    "NP",
                    vec![Tree::preterminal("PRP", tokens[idx].word.clone())],
                ));
                idx += 1;
                continue;
            }

            let run_end = (idx..tokens.len())
                .find(|&k| !NP_TAGS.contains(&tags[k]))
                .unwrap_or(tokens.len());
            // the run must end in a noun
            let np_end = (idx..run_end)
                .rev()
                .find(|&k| tags[k].starts_with("NN"))
                .map(|k| k + 1);

            match np_end {
                Some(end) => {
                    let leaves = (idx..end)
                        .map(|k| Tree::preterminal(tags[k], tokens[k].word.clone()))
                        .collect();
                    children.push(Tree::node("NP", leaves));
                    idx = end;
                }
                None => {
                    children.push(Tree::preterminal(tags[idx], tokens[idx].word.clone()));
                    idx += 1;
                }
            }
        }

        Ok(Tree::node("ROOT", vec![Tree::node("S", children)]))
    }
}
