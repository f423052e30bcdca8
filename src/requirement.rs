//! Capability declarations for pipeline ordering.
//!
//! Every annotator states which upstream analyses it needs and which one it
//! provides. The declaration is static; it does not inspect documents.

use layered_coref_document::Document;

use crate::{AnnotationOutcome, CorefResult};

/// An analysis a pipeline stage requires or provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Requirement {
    Tokenize,
    SentenceSplit,
    PartOfSpeech,
    NamedEntity,
    Parse,
    DeterministicCoref,
}

impl Requirement {
    /// Short name used in pipeline configurations.
    pub fn name(&self) -> &'static str {
        match self {
            Requirement::Tokenize => "tokenize",
            Requirement::SentenceSplit => "ssplit",
            Requirement::PartOfSpeech => "pos",
            Requirement::NamedEntity => "ner",
            Requirement::Parse => "parse",
            Requirement::DeterministicCoref => "dcoref",
        }
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A document-level pipeline stage.
pub trait Annotator {
    fn annotate(&self, document: &mut Document) -> CorefResult<AnnotationOutcome>;

    /// Analyses that must have run before this one.
    fn requires(&self) -> &'static [Requirement];

    /// Analyses this stage provides.
    fn requirements_satisfied(&self) -> &'static [Requirement];
}

/// Requirements of `annotator` that `satisfied` does not cover, in
/// declaration order.
pub fn unmet_requirements<A: Annotator + ?Sized>(
    annotator: &A,
    satisfied: &[Requirement],
) -> Vec<Requirement> {
    annotator
        .requires()
        .iter()
        .copied()
        .filter(|req| !satisfied.contains(req))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(Requirement::SentenceSplit.to_string(), "ssplit");
        assert_eq!(Requirement::DeterministicCoref.name(), "dcoref");
    }
}
