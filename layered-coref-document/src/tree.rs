//! Constituency trees over a sentence's tokens.
//!
//! Trees arrive from the upstream parser. Leaves carry the word and, once
//! labels are merged, the index of the token they stand for.
//!
//! ```text
//! (ROOT (S (NP (NNP John) (NNP Smith)) (VP (VBD arrived)) (. .)))
//! ```

use serde::{Deserialize, Serialize};

/// A node of a constituency tree. Leaves have no children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    label: String,
    #[serde(default)]
    children: Vec<Tree>,
    /// Bound token index (leaves only, set by label merging)
    #[serde(default)]
    token: Option<usize>,
}

impl Tree {
    pub fn leaf(word: impl Into<String>) -> Self {
        Self {
            label: word.into(),
            children: Vec::new(),
            token: None,
        }
    }

    pub fn node(label: impl Into<String>, children: Vec<Tree>) -> Self {
        Self {
            label: label.into(),
            children,
            token: None,
        }
    }

    /// Shorthand for a preterminal: `(TAG word)`.
    pub fn preterminal(tag: impl Into<String>, word: impl Into<String>) -> Self {
        Self::node(tag, vec![Self::leaf(word)])
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn children(&self) -> &[Tree] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_preterminal(&self) -> bool {
        self.children.len() == 1 && self.children[0].is_leaf()
    }

    /// Token index this leaf is bound to.
    pub fn token(&self) -> Option<usize> {
        self.token
    }

    pub fn bind_token(&mut self, index: usize) {
        self.token = Some(index);
    }

    /// Returns true if every leaf has been bound to a token.
    pub fn is_merged(&self) -> bool {
        self.leaves().iter().all(|leaf| leaf.token.is_some())
    }

    /// Leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<&Tree> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Tree>) {
        if self.is_leaf() {
            out.push(self);
        } else {
            for child in &self.children {
                child.collect_leaves(out);
            }
        }
    }

    pub fn leaves_mut(&mut self) -> Vec<&mut Tree> {
        let mut out = Vec::new();
        self.collect_leaves_mut(&mut out);
        out
    }

    fn collect_leaves_mut<'a>(&'a mut self, out: &mut Vec<&'a mut Tree>) {
        if self.children.is_empty() {
            out.push(self);
        } else {
            for child in self.children.iter_mut() {
                child.collect_leaves_mut(out);
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(Tree::leaf_count).sum()
        }
    }

    /// Tags of the preterminals, aligned with [`Tree::leaves`].
    ///
    /// A leaf directly under a phrasal node gets `None`.
    pub fn preterminal_tags(&self) -> Vec<Option<&str>> {
        let mut out = Vec::new();
        self.collect_tags(None, &mut out);
        out
    }

    fn collect_tags<'a>(&'a self, parent: Option<&'a str>, out: &mut Vec<Option<&'a str>>) {
        if self.is_leaf() {
            out.push(parent);
        } else if self.is_preterminal() {
            out.push(Some(self.label.as_str()));
        } else {
            for child in &self.children {
                child.collect_tags(None, out);
            }
        }
    }

    /// Leaf ranges `[start, end)` of every constituent with the given label,
    /// in pre-order (outer constituents before the ones they contain).
    pub fn constituent_spans(&self, label: &str) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        self.collect_spans(label, 0, &mut out);
        out
    }

    fn collect_spans(&self, label: &str, offset: usize, out: &mut Vec<(usize, usize)>) -> usize {
        if self.is_leaf() {
            return 1;
        }
        let slot = out.len();
        let matches = !self.is_preterminal() && self.label == label;
        if matches {
            out.push((offset, offset));
        }
        let mut width = 0;
        for child in &self.children {
            width += child.collect_spans(label, offset + width, out);
        }
        if matches {
            out[slot] = (offset, offset + width);
        }
        width
    }

    /// Read a tree in Penn bracketed notation.
    ///
    /// An unlabeled outermost bracket, as in `( (S ...))`, becomes `ROOT`.
    pub fn parse(input: &str) -> Result<Tree, TreeParseError> {
        let tokens = lex(input);
        if tokens.is_empty() {
            return Err(TreeParseError::Empty);
        }
        let mut cursor = 0;
        let tree = parse_node(&tokens, &mut cursor)?;
        if cursor < tokens.len() {
            return Err(TreeParseError::TrailingInput { position: cursor });
        }
        Ok(tree)
    }
}

impl std::fmt::Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_leaf() {
            return f.write_str(&self.label);
        }
        write!(f, "({}", self.label)?;
        for child in &self.children {
            write!(f, " {}", child)?;
        }
        f.write_str(")")
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Lexeme<'a> {
    Open,
    Close,
    Atom(&'a str),
}

fn lex(input: &str) -> Vec<Lexeme<'_>> {
    let mut out = Vec::new();
    let mut atom_start: Option<usize> = None;
    for (idx, ch) in input.char_indices() {
        if ch == '(' || ch == ')' || ch.is_whitespace() {
            if let Some(start) = atom_start.take() {
                out.push(Lexeme::Atom(&input[start..idx]));
            }
            match ch {
                '(' => out.push(Lexeme::Open),
                ')' => out.push(Lexeme::Close),
                _ => {}
            }
        } else if atom_start.is_none() {
            atom_start = Some(idx);
        }
    }
    if let Some(start) = atom_start {
        out.push(Lexeme::Atom(&input[start..]));
    }
    out
}

fn parse_node(tokens: &[Lexeme<'_>], cursor: &mut usize) -> Result<Tree, TreeParseError> {
    match tokens.get(*cursor) {
        None => Err(TreeParseError::UnexpectedEnd),
        Some(Lexeme::Atom(word)) => {
            *cursor += 1;
            Ok(Tree::leaf(*word))
        }
        Some(Lexeme::Close) => Err(TreeParseError::UnexpectedClose { position: *cursor }),
        Some(Lexeme::Open) => {
            *cursor += 1;
            let label = match tokens.get(*cursor) {
                Some(Lexeme::Atom(label)) => {
                    *cursor += 1;
                    (*label).to_string()
                }
                Some(Lexeme::Open) => "ROOT".to_string(),
                Some(Lexeme::Close) => {
                    return Err(TreeParseError::EmptyNode { position: *cursor })
                }
                None => return Err(TreeParseError::UnexpectedEnd),
            };
            let mut children = Vec::new();
            loop {
                match tokens.get(*cursor) {
                    None => return Err(TreeParseError::UnexpectedEnd),
                    Some(Lexeme::Close) => {
                        *cursor += 1;
                        break;
                    }
                    Some(_) => children.push(parse_node(tokens, cursor)?),
                }
            }
            if children.is_empty() {
                // `(word)` is a bare leaf in brackets
                return Ok(Tree::leaf(label));
            }
            Ok(Tree::node(label, children))
        }
    }
}

/// Error reading a bracketed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeParseError {
    /// Input had no brackets or words
    Empty,
    /// Input ended inside an open bracket
    UnexpectedEnd,
    /// A closing bracket with nothing open
    UnexpectedClose { position: usize },
    /// `()` with neither label nor children
    EmptyNode { position: usize },
    /// Extra material after the outermost tree
    TrailingInput { position: usize },
}

impl std::fmt::Display for TreeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeParseError::Empty => write!(f, "empty tree"),
            TreeParseError::UnexpectedEnd => write!(f, "unbalanced brackets: input ended early"),
            TreeParseError::UnexpectedClose { position } => {
                write!(f, "unexpected ')' at lexeme {}", position)
            }
            TreeParseError::EmptyNode { position } => {
                write!(f, "empty node '()' at lexeme {}", position)
            }
            TreeParseError::TrailingInput { position } => {
                write!(f, "trailing input after tree at lexeme {}", position)
            }
        }
    }
}

impl std::error::Error for TreeParseError {}
