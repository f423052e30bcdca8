//! Multi-pass deterministic sieve.
//!
//! Passes run from most to least precise. In each pass, every mention that
//! starts its cluster looks back for an antecedent and merges with the first
//! one the pass accepts. Later passes see the clusters earlier passes built.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::sync::Arc;

use layered_coref_document::{ChainMention, CorefChain};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CorefResolver, Dictionaries, Person};
use crate::mention::Mention;
use crate::{ArrangedDocument, ConfigError, CorefConfig, ProcessingFault};

/// Sentences a pronoun may look back for its antecedent.
pub const PRONOUN_WINDOW: usize = 3;

/// Words ignored when comparing the vocabulary of two mentions.
const STOP_WORDS: &[&str] = &["a", "an", "the", "this", "that", "these", "those", "'s"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SievePass {
    /// Speaker-aware matching of first and second person pronouns
    DiscourseMatch,
    /// Identical text
    ExactStringMatch,
    /// Identical text up to and including the head
    RelaxedExactStringMatch,
    /// Same head word with compatible vocabulary
    StrictHeadMatch,
    /// Third person pronoun to an agreeing antecedent
    PronounMatch,
}

impl SievePass {
    pub const DEFAULT: &'static [SievePass] = &[
        SievePass::DiscourseMatch,
        SievePass::ExactStringMatch,
        SievePass::RelaxedExactStringMatch,
        SievePass::StrictHeadMatch,
        SievePass::PronounMatch,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SievePass::DiscourseMatch => "DiscourseMatch",
            SievePass::ExactStringMatch => "ExactStringMatch",
            SievePass::RelaxedExactStringMatch => "RelaxedExactStringMatch",
            SievePass::StrictHeadMatch => "StrictHeadMatch",
            SievePass::PronounMatch => "PronounMatch",
        }
    }

    /// Parse a comma-separated list of pass names. Blank entries are skipped.
    pub fn parse_list(value: &str) -> Result<Vec<SievePass>, ConfigError> {
        value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for SievePass {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SievePass::DEFAULT
            .iter()
            .copied()
            .find(|pass| pass.name() == s)
            .ok_or_else(|| ConfigError::UnknownSieve(s.to_string()))
    }
}

impl std::fmt::Display for SievePass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The default [`CorefResolver`].
#[derive(Debug, Clone)]
pub struct SieveResolver {
    passes: Vec<SievePass>,
    dictionaries: Arc<Dictionaries>,
}

impl SieveResolver {
    pub fn new(
        passes: Vec<SievePass>,
        dictionaries: Arc<Dictionaries>,
    ) -> Result<Self, ConfigError> {
        if passes.is_empty() {
            return Err(ConfigError::EmptySievePasses);
        }
        Ok(Self {
            passes,
            dictionaries,
        })
    }

    /// Build from configuration, loading dictionaries if a path is given.
    pub fn from_config(config: &CorefConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let dictionaries = match &config.dictionaries {
            Some(path) => Arc::new(Dictionaries::load(path)?),
            None => Dictionaries::english(),
        };
        Self::new(config.sieve_passes.clone(), dictionaries)
    }

    pub fn passes(&self) -> &[SievePass] {
        &self.passes
    }

    fn accepts(
        &self,
        pass: SievePass,
        marked_discourse: bool,
        mention: &Mention,
        antecedent: &Mention,
        antecedent_words: impl FnOnce() -> BTreeSet<String>,
    ) -> bool {
        let (m, a) = (&mention.features, &antecedent.features);
        match pass {
            SievePass::DiscourseMatch => {
                marked_discourse
                    && mention.is_pronominal()
                    && antecedent.is_pronominal()
                    && m.person != Person::Third
                    && m.person == a.person
                    && m.speaker.is_some()
                    && m.speaker == a.speaker
            }
            SievePass::ExactStringMatch => {
                !mention.is_pronominal()
                    && !antecedent.is_pronominal()
                    && lowercase(&m.words) == lowercase(&a.words)
            }
            SievePass::RelaxedExactStringMatch => {
                !mention.is_pronominal()
                    && !antecedent.is_pronominal()
                    && lowercase(up_to_head(mention)) == lowercase(up_to_head(antecedent))
            }
            SievePass::StrictHeadMatch => {
                if mention.is_pronominal() || antecedent.is_pronominal() {
                    return false;
                }
                if !m.head_word.eq_ignore_ascii_case(&a.head_word) || !m.number.agrees_with(a.number)
                {
                    return false;
                }
                let cluster_words = antecedent_words();
                content_words(&m.words).all(|w| cluster_words.contains(&w))
            }
            SievePass::PronounMatch => {
                mention.is_pronominal()
                    && m.person == Person::Third
                    && mention.sentence - antecedent.sentence <= PRONOUN_WINDOW
                    && (!antecedent.is_pronominal() || a.person == Person::Third)
                    && m.number.agrees_with(a.number)
                    && m.gender.agrees_with(a.gender)
                    && m.animacy.agrees_with(a.animacy)
            }
        }
    }
}

impl CorefResolver for SieveResolver {
    fn dictionaries(&self) -> Arc<Dictionaries> {
        self.dictionaries.clone()
    }

    fn coref(
        &self,
        document: &ArrangedDocument,
    ) -> Result<BTreeMap<u32, CorefChain>, ProcessingFault> {
        let flat: Vec<(usize, &Mention)> = document.iter().collect();
        let mut offsets = Vec::with_capacity(document.sentence_count() + 1);
        let mut total = 0;
        for (sentence, mentions) in document.sentences().iter().enumerate() {
            if let Some(m) = mentions.iter().find(|m| m.sentence != sentence) {
                return Err(ProcessingFault::Resolver(format!(
                    "mention {} claims sentence {} but is arranged under sentence {}",
                    m.mention_id, m.sentence, sentence
                )));
            }
            offsets.push(total);
            total += mentions.len();
        }
        offsets.push(total);

        let mut clusters = Clusters::new(flat.len());
        for &pass in &self.passes {
            for idx in 0..flat.len() {
                if clusters.find(idx) != idx {
                    continue;
                }
                let mention = flat[idx].1;
                for candidate in antecedents(&offsets, mention.sentence, idx) {
                    let antecedent = flat[candidate].1;
                    if mention.overlaps(antecedent) {
                        continue;
                    }
                    let root = clusters.find(candidate);
                    let words = || {
                        (0..flat.len())
                            .filter(|&k| clusters.root_of(k) == root)
                            .flat_map(|k| content_words(&flat[k].1.features.words))
                            .collect()
                    };
                    if self.accepts(pass, document.marked_discourse(), mention, antecedent, words) {
                        debug!(
                            pass = pass.name(),
                            mention = mention.mention_id,
                            antecedent = antecedent.mention_id,
                            "merged mentions"
                        );
                        clusters.merge(idx, candidate);
                        break;
                    }
                }
            }
        }

        let mut grouped: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for idx in 0..flat.len() {
            grouped.entry(clusters.find(idx)).or_default().push(idx);
        }

        let mut chains = BTreeMap::new();
        for (root, members) in grouped {
            let chain_id = flat[root].1.mention_id;
            let mentions = members
                .into_iter()
                .map(|k| {
                    let (position, m) = flat[k];
                    ChainMention {
                        mention_id: m.mention_id,
                        sentence: m.sentence,
                        position,
                        start: m.start,
                        end: m.end,
                        head: m.head,
                        text: m.text(),
                        kind: m.features.kind,
                    }
                })
                .collect();
            if chains.insert(chain_id, CorefChain::new(chain_id, mentions)).is_some() {
                return Err(ProcessingFault::Resolver(format!(
                    "mention id {} starts more than one cluster",
                    chain_id
                )));
            }
        }
        Ok(chains)
    }
}

/// Candidate antecedents of the mention at flat index `idx`: earlier mentions
/// of the same sentence right to left, then previous sentences from the
/// nearest back, each left to right.
fn antecedents(offsets: &[usize], sentence: usize, idx: usize) -> Vec<usize> {
    let mut out: Vec<usize> = (offsets[sentence]..idx).rev().collect();
    for prev in (0..sentence).rev() {
        out.extend(offsets[prev]..offsets[prev + 1]);
    }
    out
}

fn lowercase<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    words.iter().map(|w| w.as_ref().to_lowercase()).collect()
}

fn up_to_head(mention: &Mention) -> &[String] {
    let len = (mention.head - mention.start + 1).min(mention.features.words.len());
    &mention.features.words[..len]
}

fn content_words(words: &[String]) -> impl Iterator<Item = String> + '_ {
    words
        .iter()
        .map(|w| w.to_lowercase())
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
}

/// Union-find over flat mention indices. A cluster's root is always its
/// smallest index, so the first mention of a cluster is its root.
#[derive(Debug, Clone)]
struct Clusters {
    parent: Vec<usize>,
}

impl Clusters {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, idx: usize) -> usize {
        let root = self.root_of(idx);
        let mut cur = idx;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Root lookup without path compression.
    fn root_of(&self, mut idx: usize) -> usize {
        while self.parent[idx] != idx {
            idx = self.parent[idx];
        }
        idx
    }

    fn merge(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}
