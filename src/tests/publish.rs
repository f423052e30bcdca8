use std::collections::BTreeMap;

use crate::{
    extract_and_merge, publish, sentence_bundles, token_clusters, ArrangedDocument, ChainMention,
    CorefChain, Dictionaries, Document, MentionArranger, PositionalArranger, ProcessingFault,
};

use super::fakes::{smith_document, smith_script};

fn arranged_smith(doc: &mut Document) -> ArrangedDocument {
    extract_and_merge(doc).unwrap();
    let bundles = sentence_bundles(doc);
    let mentions = smith_script()
        .into_iter()
        .enumerate()
        .map(|(s, spans)| {
            spans
                .into_iter()
                .map(|(start, end, head)| crate::Mention::new(s, start, end, head))
                .collect()
        })
        .collect();
    PositionalArranger::new(Dictionaries::english())
        .arrange(&bundles, mentions, false)
        .unwrap()
}

fn smith_chain(arranged: &ArrangedDocument) -> BTreeMap<u32, CorefChain> {
    let mentions = arranged
        .iter()
        .map(|(position, m)| ChainMention {
            mention_id: m.mention_id,
            sentence: m.sentence,
            position,
            start: m.start,
            end: m.end,
            head: m.head,
            text: m.text(),
            kind: m.features.kind,
        })
        .collect();
    let mut chains = BTreeMap::new();
    chains.insert(1, CorefChain::new(1, mentions));
    chains
}

#[test]
fn modern_output_is_the_mapping_unmodified() {
    let mut doc = smith_document();
    let arranged = arranged_smith(&mut doc);
    let chains = smith_chain(&arranged);

    let summary = publish(&mut doc, chains.clone(), &arranged, false).unwrap();
    assert_eq!(summary.chains, 1);
    assert_eq!(summary.links, 0);
    assert_eq!(doc.annotations().chains(), Some(&chains));
    assert!(doc.annotations().graph().is_none());
}

#[test]
fn legacy_fault_leaves_document_untouched() {
    let mut doc = smith_document();
    let arranged = arranged_smith(&mut doc);
    let mut chains = smith_chain(&arranged);

    // point the second mention at a position the arranged document lacks
    let broken: Vec<_> = chains[&1]
        .mentions_in_textual_order()
        .iter()
        .cloned()
        .map(|mut m| {
            if m.sentence == 1 {
                m.position = 3;
            }
            m
        })
        .collect();
    chains.insert(1, CorefChain::new(1, broken));

    let before = doc.clone();
    let err = publish(&mut doc, chains, &arranged, true).unwrap_err();
    assert!(matches!(
        err,
        ProcessingFault::MentionLookup {
            sentence: 1,
            position: 3
        }
    ));
    assert_eq!(doc, before);
}

#[test]
fn cluster_heads_follow_the_arranged_mentions() {
    let mut doc = smith_document();
    let arranged = arranged_smith(&mut doc);
    let mut chains = smith_chain(&arranged);

    let drifted: Vec<_> = chains[&1]
        .mentions_in_textual_order()
        .iter()
        .cloned()
        .map(|mut m| {
            m.head = m.start;
            m
        })
        .collect();
    chains.insert(1, CorefChain::new(1, drifted));

    let err = token_clusters(&doc, &chains, &arranged).unwrap_err();
    assert!(matches!(err, ProcessingFault::MalformedChain { chain_id: 1, .. }));
}
