use std::cmp::Reverse;
use std::fmt::Write;

use layered_coref_document::{ChainMention, Document};
use unicode_width::UnicodeWidthStr;

/// Text rendering of a document's coreference output.
///
/// ```text
/// John  Smith  arrived  .
/// ╰─────────╯ #1 John Smith
/// He  left  .
/// ╰╯ #1 He
/// ```
///
/// Each sentence prints its tokens separated by two spaces, then one line
/// per chain mention in that sentence, underlined and tagged with its chain
/// id. Legacy links and clusters can be appended.
pub struct DocumentDisplay<'a> {
    document: &'a Document,
    show_links: bool,
    show_clusters: bool,
}

impl<'a> DocumentDisplay<'a> {
    pub fn new(document: &'a Document) -> Self {
        DocumentDisplay {
            document,
            show_links: false,
            show_clusters: false,
        }
    }

    /// Append the legacy link graph, if present.
    pub fn include_links(mut self) -> Self {
        self.show_links = true;
        self
    }

    /// Append the legacy token clusters, if present.
    pub fn include_clusters(mut self) -> Self {
        self.show_clusters = true;
        self
    }

    fn sentence_mentions(&self, sentence: usize) -> Vec<(u32, &'a ChainMention)> {
        let mut out: Vec<_> = self
            .document
            .annotations()
            .chains()
            .into_iter()
            .flat_map(|chains| chains.values())
            .flat_map(|chain| {
                chain
                    .mentions_in_textual_order()
                    .iter()
                    .map(move |m| (chain.chain_id(), m))
            })
            .filter(|(_, m)| m.sentence == sentence)
            .collect();
        out.sort_by_key(|(id, m)| (m.start, Reverse(m.end), *id));
        out
    }
}

// 0,      1,      2,        3 - token indexes
// John    Smith   arrived   .
// ╰─────────╯ #1 John Smith
impl<'a> std::fmt::Display for DocumentDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const SPACE_PADDING: usize = 2;
        let sentences = match self.document.sentences() {
            Some(sentences) => sentences,
            None => return f.write_str("<unsplit document>"),
        };

        for (sentence_idx, sentence) in sentences.iter().enumerate() {
            if sentence_idx > 0 {
                f.write_char('\n')?;
            }

            let mut starts = Vec::with_capacity(sentence.len());
            let mut ends = Vec::with_capacity(sentence.len());
            let mut opening_line = String::new();
            for (idx, token) in sentence.tokens().iter().enumerate() {
                if idx > 0 {
                    opening_line.extend(std::iter::repeat(' ').take(SPACE_PADDING));
                }
                starts.push(UnicodeWidthStr::width(&*opening_line));
                opening_line.push_str(&token.word);
                ends.push(UnicodeWidthStr::width(&*opening_line));
            }
            f.write_str(&opening_line)?;

            for (chain_id, mention) in self.sentence_mentions(sentence_idx) {
                let (start_char_idx, end_char_idx) =
                    match (starts.get(mention.start), ends.get(mention.end.wrapping_sub(1))) {
                        (Some(&s), Some(&e)) if mention.end > mention.start => (s, e),
                        _ => continue,
                    };

                f.write_char('\n')?;
                for _ in 0..start_char_idx {
                    f.write_char(' ')?;
                }
                f.write_char('╰')?;
                for _ in (start_char_idx + 1)..end_char_idx.saturating_sub(1) {
                    f.write_char('─')?;
                }
                if end_char_idx - start_char_idx > 1 {
                    f.write_char('╯')?;
                }
                write!(f, " #{} {}", chain_id, mention.text)?;
            }
        }

        let annotations = self.document.annotations();
        if self.show_links {
            if let Some(graph) = annotations.graph() {
                f.write_str("\nlinks:")?;
                for link in graph {
                    write!(f, "\n  {}", link)?;
                }
            }
        }

        if self.show_clusters {
            let clusters = self.document.clusters();
            if !clusters.is_empty() {
                f.write_str("\nclusters:")?;
                for cluster in clusters {
                    f.write_str("\n  {")?;
                    for (idx, member) in cluster.members().iter().enumerate() {
                        if idx > 0 {
                            f.write_str(", ")?;
                        }
                        write!(
                            f,
                            "{}@{}:{}",
                            member.word, member.position.sentence, member.position.token
                        )?;
                    }
                    f.write_char('}')?;
                }
            }
        }

        Ok(())
    }
}
