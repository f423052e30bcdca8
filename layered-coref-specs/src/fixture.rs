//! Fixture file model.
//!
//! A fixture is a TOML file describing a document sentence by sentence and
//! the coreference output expected from it:
//!
//! ```toml
//! title = "Pronoun to name"
//!
//! [[sentence]]
//! tree = "(ROOT (S (NP (NNP John) (NNP Smith)) (VP (VBD arrived)) (. .)))"
//!
//! [[sentence]]
//! text = "He left ."
//! pos = ["PRP", "VBD", "."]
//!
//! [expected]
//! chains = [["John Smith", "He"]]
//! links = [[[2, 1], [1, 2]]]
//! clusters = [["Smith", "He"]]
//! ```

use std::collections::BTreeMap;

use layered_coref_document::{Document, Sentence, Token, Tree};
use serde::{Deserialize, Serialize};

use crate::SpecError;

fn default_true() -> bool {
    true
}

/// A parsed fixture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorefFixture {
    #[serde(default)]
    pub title: Option<String>,
    /// Request legacy links and clusters
    #[serde(default = "default_true")]
    pub old_coref_format: bool,
    /// Extra annotator properties
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default, rename = "sentence")]
    pub sentences: Vec<FixtureSentence>,
    #[serde(default)]
    pub expected: Expected,
}

/// One sentence: a bracketed tree, or text with optional tags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureSentence {
    #[serde(default)]
    pub tree: Option<String>,
    /// Whitespace-separated tokens, used when there is no tree
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub pos: Vec<String>,
    #[serde(default)]
    pub ner: Vec<String>,
    #[serde(default)]
    pub speaker: Option<String>,
}

/// Expected output. Absent fields are not checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expected {
    /// Mention texts of every chain with two or more mentions, in chain id
    /// order
    #[serde(default)]
    pub chains: Option<Vec<Vec<String>>>,
    /// 1-based `[[sentence, token], [sentence, token]]` pairs
    #[serde(default)]
    pub links: Option<Vec<[[usize; 2]; 2]>>,
    /// Head words of each token cluster
    #[serde(default)]
    pub clusters: Option<Vec<Vec<String>>>,
    #[serde(default)]
    pub marked_discourse: Option<bool>,
    /// Whether a link graph is attached at all
    #[serde(default)]
    pub legacy_output: Option<bool>,
}

impl CorefFixture {
    pub fn from_toml_str(content: &str) -> Result<Self, SpecError> {
        toml::from_str(content).map_err(|e| SpecError::Parse {
            message: e.to_string(),
        })
    }

    /// Build the input document.
    pub fn to_document(&self) -> Result<Document, SpecError> {
        let sentences = self
            .sentences
            .iter()
            .enumerate()
            .map(|(idx, sentence)| sentence.to_sentence(idx))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Document::from_sentences(sentences))
    }
}

impl FixtureSentence {
    fn to_sentence(&self, index: usize) -> Result<Sentence, SpecError> {
        let mut sentence = match (&self.tree, &self.text) {
            (Some(tree), _) => {
                let tree = Tree::parse(tree).map_err(|e| SpecError::Tree {
                    sentence: index,
                    message: e.to_string(),
                })?;
                Sentence::from_tree(tree)
            }
            (None, Some(text)) => Sentence::new(
                text.split_whitespace()
                    .enumerate()
                    .map(|(idx, word)| Token::new(idx, word))
                    .collect(),
            ),
            (None, None) => return Err(SpecError::EmptySentence { sentence: index }),
        };

        for (token, tag) in sentence.tokens_mut().iter_mut().zip(&self.pos) {
            token.pos = Some(tag.clone());
        }
        let ner: Vec<&str> = self.ner.iter().map(String::as_str).collect();
        sentence = sentence.with_ner(&ner);
        if let Some(speaker) = &self.speaker {
            sentence = sentence.with_speaker(speaker);
        }
        Ok(sentence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let fixture = CorefFixture::from_toml_str(
            r#"
            [[sentence]]
            text = "He left ."
            pos = ["PRP", "VBD", "."]
            "#,
        )
        .unwrap();
        assert!(fixture.old_coref_format);
        assert_eq!(fixture.expected, Expected::default());

        let doc = fixture.to_document().unwrap();
        let tokens = doc.sentence(0).unwrap().tokens();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].pos.as_deref(), Some("PRP"));
        assert!(doc.sentence(0).unwrap().tree().is_none());
    }

    #[test]
    fn test_speaker_and_ner() {
        let fixture = CorefFixture::from_toml_str(
            r#"
            [[sentence]]
            tree = "(ROOT (S (NP (NNP Mary)) (VP (VBD spoke))))"
            ner = ["PERSON", "O"]
            speaker = "Mary"
            "#,
        )
        .unwrap();
        let doc = fixture.to_document().unwrap();
        let token = &doc.sentence(0).unwrap().tokens()[0];
        assert_eq!(token.entity_tag(), Some("PERSON"));
        assert_eq!(token.speaker.as_deref(), Some("Mary"));
    }

    #[test]
    fn test_errors() {
        let fixture = CorefFixture::from_toml_str("[[sentence]]\n").unwrap();
        assert!(matches!(
            fixture.to_document(),
            Err(SpecError::EmptySentence { sentence: 0 })
        ));

        let fixture = CorefFixture::from_toml_str("[[sentence]]\ntree = \"(S (NP\"\n").unwrap();
        assert!(matches!(fixture.to_document(), Err(SpecError::Tree { .. })));

        assert!(matches!(
            CorefFixture::from_toml_str("sentence = 3"),
            Err(SpecError::Parse { .. })
        ));
    }
}
