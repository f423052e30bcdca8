//! Fixture runner: annotate a fixture's document and compare the output.

use std::fmt;
use std::sync::Arc;

use layered_coref::{DeterministicCorefAnnotator, OLD_FORMAT_PROP};
use layered_coref_document::Document;

use crate::{ChunkingParser, CorefFixture, SpecError, SpecResult};

/// Coreference output in the shape fixtures describe it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorefOutput {
    /// Mention texts of every chain with two or more mentions
    pub chains: Vec<Vec<String>>,
    /// `None` when legacy output was not produced
    pub links: Option<Vec<[[usize; 2]; 2]>>,
    /// Head words of each token cluster
    pub clusters: Vec<Vec<String>>,
    pub marked_discourse: bool,
}

impl CorefOutput {
    pub fn from_document(doc: &Document) -> Self {
        let annotations = doc.annotations();
        let chains = annotations
            .chains()
            .into_iter()
            .flat_map(|chains| chains.values())
            .filter(|chain| chain.len() >= 2)
            .map(|chain| {
                chain
                    .mentions_in_textual_order()
                    .iter()
                    .map(|m| m.text.clone())
                    .collect()
            })
            .collect();
        let links = annotations.graph().map(|graph| {
            graph
                .iter()
                .map(|link| {
                    let (s1, t1) = link.source.as_tuple();
                    let (s2, t2) = link.target.as_tuple();
                    [[s1, t1], [s2, t2]]
                })
                .collect()
        });
        let clusters = doc
            .clusters()
            .into_iter()
            .map(|cluster| cluster.words().into_iter().map(str::to_string).collect())
            .collect();

        Self {
            chains,
            links,
            clusters,
            marked_discourse: annotations.marked_discourse(),
        }
    }
}

/// One expected value that did not match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub field: &'static str,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Run a fixture through the default annotator with a [`ChunkingParser`].
pub fn run_fixture(fixture: &CorefFixture) -> SpecResult<CorefOutput> {
    let mut props = fixture.properties.clone();
    props.insert(
        OLD_FORMAT_PROP.to_string(),
        fixture.old_coref_format.to_string(),
    );
    let annotator = DeterministicCorefAnnotator::from_properties(&props)
        .and_then(|annotator| annotator.with_parser(Arc::new(ChunkingParser)))
        .map_err(|e| SpecError::Annotation(e.to_string()))?;

    let mut doc = fixture.to_document()?;
    annotator
        .annotate(&mut doc)
        .map_err(|e| SpecError::Annotation(e.to_string()))?;
    Ok(CorefOutput::from_document(&doc))
}

/// Run a fixture and list every expectation it fails.
pub fn check_fixture(fixture: &CorefFixture) -> SpecResult<Vec<Mismatch>> {
    let output = run_fixture(fixture)?;
    let expected = &fixture.expected;
    let mut mismatches = Vec::new();

    let mut compare = |field: &'static str, expected: String, actual: String| {
        if expected != actual {
            mismatches.push(Mismatch {
                field,
                expected,
                actual,
            });
        }
    };

    if let Some(chains) = &expected.chains {
        compare("chains", format!("{:?}", chains), format!("{:?}", output.chains));
    }
    if let Some(links) = &expected.links {
        let actual = match &output.links {
            Some(actual) => format!("{:?}", actual),
            None => "no link graph".to_string(),
        };
        compare("links", format!("{:?}", links), actual);
    }
    if let Some(clusters) = &expected.clusters {
        compare(
            "clusters",
            format!("{:?}", clusters),
            format!("{:?}", output.clusters),
        );
    }
    if let Some(marked) = expected.marked_discourse {
        compare(
            "marked_discourse",
            marked.to_string(),
            output.marked_discourse.to_string(),
        );
    }

    if let Some(legacy) = expected.legacy_output {
        compare(
            "legacy_output",
            legacy.to_string(),
            output.links.is_some().to_string(),
        );
    }

    Ok(mismatches)
}
