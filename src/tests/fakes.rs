//! Scripted collaborators for orchestrator tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::{
    ArrangedDocument, ChainMention, CorefChain, CorefConfig, CorefResolver, Dictionaries,
    DeterministicCorefAnnotator, Document, Mention, MentionFinder, MentionFinderFactory,
    ParseFailure, ParserHandle, PositionalArranger, ProcessingFault, Sentence, SentenceBundle,
    Token, Tree,
};

/// Route annotator logs to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Mention spans `(start, end, head)` per sentence.
pub type Script = Vec<Vec<(usize, usize, usize)>>;

/// Refuses every parse request.
pub struct NoParser;

impl ParserHandle for NoParser {
    fn parse(&self, _tokens: &[Token]) -> Result<Tree, ParseFailure> {
        Err(ParseFailure("parsing not available in tests".into()))
    }
}

pub struct ScriptedFinderFactory {
    script: Script,
    created: AtomicUsize,
}

impl ScriptedFinderFactory {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            created: AtomicUsize::new(0),
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl MentionFinderFactory for ScriptedFinderFactory {
    fn create(
        &self,
        _parser: Arc<dyn ParserHandle>,
        _allow_reparsing: bool,
    ) -> Box<dyn MentionFinder> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(ScriptedFinder {
            script: self.script.clone(),
            used: false,
        })
    }
}

/// Hands out its script once; a second call means it was reused.
pub struct ScriptedFinder {
    script: Script,
    used: bool,
}

impl MentionFinder for ScriptedFinder {
    fn extract_predicted_mentions(
        &mut self,
        bundles: &[SentenceBundle<'_>],
        _dictionaries: &Dictionaries,
    ) -> Result<Vec<Vec<Mention>>, ProcessingFault> {
        if self.used {
            return Err(ProcessingFault::Finder("finder reused across documents".into()));
        }
        self.used = true;
        Ok(bundles
            .iter()
            .map(|bundle| {
                self.script
                    .get(bundle.index)
                    .into_iter()
                    .flatten()
                    .map(|&(start, end, head)| Mention::new(bundle.index, start, end, head))
                    .collect()
            })
            .collect())
    }
}

/// Groups arranged mentions, given as `(sentence, position)`, into chains.
/// Mentions not named in any group become singletons.
pub struct ScriptedResolver {
    groups: Vec<Vec<(usize, usize)>>,
    seen_marked: Mutex<Vec<bool>>,
}

impl ScriptedResolver {
    pub fn new(groups: Vec<Vec<(usize, usize)>>) -> Self {
        Self {
            groups,
            seen_marked: Mutex::new(Vec::new()),
        }
    }

    pub fn seen_marked(&self) -> Vec<bool> {
        self.seen_marked.lock().unwrap().clone()
    }
}

impl CorefResolver for ScriptedResolver {
    fn dictionaries(&self) -> Arc<Dictionaries> {
        Dictionaries::english()
    }

    fn coref(
        &self,
        document: &ArrangedDocument,
    ) -> Result<BTreeMap<u32, CorefChain>, ProcessingFault> {
        self.seen_marked
            .lock()
            .unwrap()
            .push(document.marked_discourse());

        let chain_mention = |sentence: usize,
                             position: usize|
         -> Result<ChainMention, ProcessingFault> {
            let m = document.mention(sentence, position).ok_or_else(|| {
                ProcessingFault::Resolver(format!("no mention {}:{}", sentence, position))
            })?;
            Ok(ChainMention {
                mention_id: m.mention_id,
                sentence,
                position,
                start: m.start,
                end: m.end,
                head: m.head,
                text: m.text(),
                kind: m.features.kind,
            })
        };

        let mut grouped = Vec::new();
        for group in &self.groups {
            let mentions = group
                .iter()
                .map(|&(s, p)| chain_mention(s, p))
                .collect::<Result<Vec<_>, ProcessingFault>>()?;
            grouped.push(mentions);
        }
        for (position, mention) in document.iter() {
            let named = self
                .groups
                .iter()
                .flatten()
                .any(|&(s, p)| s == mention.sentence && p == position);
            if !named {
                grouped.push(vec![chain_mention(mention.sentence, position)?]);
            }
        }

        Ok(grouped
            .into_iter()
            .filter_map(|mentions| {
                let id = mentions.iter().map(|m| m.mention_id).min()?;
                Some((id, CorefChain::new(id, mentions)))
            })
            .collect())
    }
}

/// "John Smith arrived." / "He left."
pub fn smith_document() -> Document {
    Document::from_sentences(vec![
        Sentence::from_tree(
            Tree::parse("(ROOT (S (NP (NNP John) (NNP Smith)) (VP (VBD arrived)) (. .)))").unwrap(),
        ),
        Sentence::from_tree(Tree::parse("(ROOT (S (NP (PRP He)) (VP (VBD left)) (. .)))").unwrap()),
    ])
}

pub fn smith_script() -> Script {
    vec![vec![(0, 2, 1)], vec![(0, 1, 0)]]
}

/// Scripted annotator with a parser installed.
pub fn scripted_annotator(
    old_format: bool,
    finders: Arc<ScriptedFinderFactory>,
    resolver: Arc<ScriptedResolver>,
) -> DeterministicCorefAnnotator {
    init_tracing();
    let mut annotator = DeterministicCorefAnnotator::with_components(
        CorefConfig::default().with_old_format(old_format),
        finders,
        Arc::new(PositionalArranger::new(Dictionaries::english())),
        resolver,
    );
    annotator.set_parser(Arc::new(NoParser)).unwrap();
    annotator
}

/// Default collaborators with a parser installed.
pub fn default_annotator(old_format: bool) -> DeterministicCorefAnnotator {
    init_tracing();
    DeterministicCorefAnnotator::new(CorefConfig::default().with_old_format(old_format))
        .unwrap()
        .with_parser(Arc::new(NoParser))
        .unwrap()
}
