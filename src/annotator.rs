//! The coreference annotator.
//!
//! One call to [`DeterministicCorefAnnotator::annotate`] processes one
//! document end to end: label merging and speaker detection, mention
//! finding with a fresh finder, arrangement, resolution, then publishing.
//! The annotator itself holds only shared read-only state, so a single
//! instance can serve many threads at once.

use std::collections::BTreeMap;
use std::sync::Arc;

use layered_coref_document::Document;
use tracing::{debug, error, info};

use crate::requirement::{Annotator, Requirement};
use crate::{
    extract_and_merge, publish, sentence_bundles, ConfigError, CorefConfig, CorefResolver,
    CorefResult, MentionArranger, MentionFinderFactory, ParserHandle, PositionalArranger,
    PublishSummary, RuleBasedFinderFactory, SieveResolver,
};

const REQUIRES: &[Requirement] = &[
    Requirement::Tokenize,
    Requirement::SentenceSplit,
    Requirement::PartOfSpeech,
    Requirement::NamedEntity,
    Requirement::Parse,
];

const SATISFIES: &[Requirement] = &[Requirement::DeterministicCoref];

/// Why a document was left unannotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The document was never split into sentences.
    MissingSentences,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationOutcome {
    Annotated(PublishSummary),
    Skipped(SkipReason),
}

impl AnnotationOutcome {
    pub fn is_annotated(&self) -> bool {
        matches!(self, AnnotationOutcome::Annotated(_))
    }

    pub fn summary(&self) -> Option<&PublishSummary> {
        match self {
            AnnotationOutcome::Annotated(summary) => Some(summary),
            AnnotationOutcome::Skipped(_) => None,
        }
    }
}

/// Sieve-based coreference over parsed documents.
///
/// A parser handle must be supplied with [`set_parser`](Self::set_parser)
/// before the first document; annotating without one is a configuration
/// fault.
pub struct DeterministicCorefAnnotator {
    config: CorefConfig,
    parser: Option<Arc<dyn ParserHandle>>,
    finders: Arc<dyn MentionFinderFactory>,
    arranger: Arc<dyn MentionArranger>,
    resolver: Arc<dyn CorefResolver>,
}

impl DeterministicCorefAnnotator {
    /// Build with the default finder, arranger and sieve resolver.
    pub fn new(config: CorefConfig) -> Result<Self, ConfigError> {
        let resolver = SieveResolver::from_config(&config)?;
        let arranger = PositionalArranger::new(resolver.dictionaries());
        Ok(Self::with_components(
            config,
            Arc::new(RuleBasedFinderFactory),
            Arc::new(arranger),
            Arc::new(resolver),
        ))
    }

    pub fn from_properties(props: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        Self::new(CorefConfig::from_properties(props)?)
    }

    /// Build around caller-supplied collaborators.
    pub fn with_components(
        config: CorefConfig,
        finders: Arc<dyn MentionFinderFactory>,
        arranger: Arc<dyn MentionArranger>,
        resolver: Arc<dyn CorefResolver>,
    ) -> Self {
        Self {
            config,
            parser: None,
            finders,
            arranger,
            resolver,
        }
    }

    /// Supply the parser handle. Allowed exactly once.
    pub fn set_parser(&mut self, parser: Arc<dyn ParserHandle>) -> Result<(), ConfigError> {
        if self.parser.is_some() {
            return Err(ConfigError::ParserAlreadySet);
        }
        self.parser = Some(parser);
        Ok(())
    }

    pub fn with_parser(mut self, parser: Arc<dyn ParserHandle>) -> Result<Self, ConfigError> {
        self.set_parser(parser)?;
        Ok(self)
    }

    pub fn has_parser(&self) -> bool {
        self.parser.is_some()
    }

    pub fn config(&self) -> &CorefConfig {
        &self.config
    }

    /// See [`CorefConfig::signature`].
    pub fn signature(&self) -> String {
        self.config.signature()
    }

    pub fn annotate(&self, document: &mut Document) -> CorefResult<AnnotationOutcome> {
        if !document.has_sentences() {
            error!("document has no sentence annotations; skipping coreference");
            return Ok(AnnotationOutcome::Skipped(SkipReason::MissingSentences));
        }
        let parser = self.parser.clone().ok_or(ConfigError::MissingParser)?;

        let scan = match extract_and_merge(document)? {
            Some(scan) => scan,
            None => return Ok(AnnotationOutcome::Skipped(SkipReason::MissingSentences)),
        };
        document
            .annotations_mut()
            .set_marked_discourse(scan.has_speaker);

        let dictionaries = self.resolver.dictionaries();
        let arranged = {
            let bundles = sentence_bundles(document);
            let mut finder = self.finders.create(parser, self.config.allow_reparsing);
            let mentions = finder.extract_predicted_mentions(&bundles, &dictionaries)?;
            self.arranger.arrange(&bundles, mentions, scan.has_speaker)?
        };

        for (sentence, mentions) in arranged.sentences().iter().enumerate() {
            let spans: Vec<_> = mentions.iter().map(|m| (m.start, m.end, m.head)).collect();
            debug!(sentence, mentions = ?spans, "ordered mentions");
        }

        let chains = self.resolver.coref(&arranged)?;
        let summary = publish(document, chains, &arranged, self.config.old_coref_format)?;

        info!(
            sentences = scan.sentence_count,
            mentions = arranged.mention_count(),
            chains = summary.chains,
            links = summary.links,
            clusters = summary.clusters,
            marked_discourse = scan.has_speaker,
            "coreference annotated"
        );
        Ok(AnnotationOutcome::Annotated(summary))
    }
}

impl Annotator for DeterministicCorefAnnotator {
    fn annotate(&self, document: &mut Document) -> CorefResult<AnnotationOutcome> {
        DeterministicCorefAnnotator::annotate(self, document)
    }

    fn requires(&self) -> &'static [Requirement] {
        REQUIRES
    }

    fn requirements_satisfied(&self) -> &'static [Requirement] {
        SATISFIES
    }
}

impl std::fmt::Debug for DeterministicCorefAnnotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeterministicCorefAnnotator")
            .field("config", &self.config)
            .field("has_parser", &self.has_parser())
            .finish_non_exhaustive()
    }
}
