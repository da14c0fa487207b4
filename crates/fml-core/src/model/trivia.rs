//! Hidden-token bookkeeping attached to every object-model node
//!
//! Whitespace and comments are grammatically inert, but a document can only
//! be re-emitted faithfully if they travel with the nodes they surround. Each
//! node owns:
//!
//! - **leading** tokens, immediately before its first token;
//! - **interior** gaps, the tokens between two of its own tokens, keyed by
//!   [`Gap`];
//! - **trailing** tokens, after its last token up to the end of the line.
//!
//! `None` for leading or trailing means "nothing captured", which tells the
//! serializer to fall back to its canonical layout.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cst::{CstToken, FmlSyntaxKind};

/// Kind of a hidden-channel token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HiddenKind {
    /// Spaces, tabs and line breaks
    Whitespace,
    LineComment,
    BlockComment,
}

impl HiddenKind {
    pub fn from_syntax(kind: FmlSyntaxKind) -> Option<Self> {
        match kind {
            FmlSyntaxKind::Whitespace | FmlSyntaxKind::Newline => Some(HiddenKind::Whitespace),
            FmlSyntaxKind::CommentLine => Some(HiddenKind::LineComment),
            FmlSyntaxKind::CommentBlock => Some(HiddenKind::BlockComment),
            _ => None,
        }
    }
}

/// A whitespace or comment token carried by a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenToken {
    pub kind: HiddenKind,
    pub text: String,
    /// Index in the lexer output this token was claimed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl HiddenToken {
    pub fn new(kind: HiddenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            index: None,
        }
    }

    pub fn whitespace(text: impl Into<String>) -> Self {
        Self::new(HiddenKind::Whitespace, text)
    }

    pub fn line_comment(text: impl Into<String>) -> Self {
        Self::new(HiddenKind::LineComment, text)
    }

    pub fn block_comment(text: impl Into<String>) -> Self {
        Self::new(HiddenKind::BlockComment, text)
    }

    /// Build from a lexed trivia token, remembering its stream index
    pub fn from_cst(token: &CstToken, index: usize) -> Option<Self> {
        HiddenKind::from_syntax(token.kind).map(|kind| Self {
            kind,
            text: token.text.clone(),
            index: Some(index),
        })
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, HiddenKind::LineComment | HiddenKind::BlockComment)
    }

    pub fn contains_line_break(&self) -> bool {
        self.text.contains(['\n', '\r'])
    }
}

/// Location of an interior gap inside a node's own syntax
///
/// `clause` is the syntax kind directly containing the token that follows the
/// gap, `token` is that token's gap class (see [`FmlSyntaxKind::gap_class`])
/// and `nth` counts earlier tokens with the same clause and class in the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gap {
    pub clause: FmlSyntaxKind,
    pub token: FmlSyntaxKind,
    pub nth: u16,
}

impl Gap {
    pub fn new(clause: FmlSyntaxKind, token: FmlSyntaxKind, nth: u16) -> Self {
        Self { clause, token, nth }
    }
}

/// Source location of a parsed node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// 1-based line of the first token
    pub start_line: usize,
    /// 1-based column (in characters) of the first token
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    /// Byte offset of the first token
    pub start_offset: usize,
    /// Byte offset just past the last token
    pub end_offset: usize,
}

/// Metadata shared by every node: position, hidden tokens and annotations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leading: Option<Vec<HiddenToken>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interior: Vec<(Gap, Vec<HiddenToken>)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing: Option<Vec<HiddenToken>>,
    /// Free-form data attached by callers, never serialized to FML
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub annotations: Map<String, Value>,
}

impl NodeMeta {
    /// Whether this node came from the builder rather than construction
    pub fn is_parsed(&self) -> bool {
        self.position.is_some()
    }

    /// Recorded tokens for an interior gap, if any were captured
    pub fn gap(&self, gap: Gap) -> Option<&[HiddenToken]> {
        self.interior
            .iter()
            .find(|(key, _)| *key == gap)
            .map(|(_, tokens)| tokens.as_slice())
    }

    /// Replace or record the tokens of an interior gap
    pub fn set_gap(&mut self, gap: Gap, tokens: Vec<HiddenToken>) {
        match self.interior.iter_mut().find(|(key, _)| *key == gap) {
            Some((_, existing)) => *existing = tokens,
            None => self.interior.push((gap, tokens)),
        }
    }

    /// Drop every captured hidden token so the node serializes with the
    /// default layout
    pub fn clear_hidden(&mut self) {
        self.leading = None;
        self.trailing = None;
        self.interior.clear();
    }

    /// All hidden tokens owned by this node, leading first
    pub fn hidden_tokens(&self) -> impl Iterator<Item = &HiddenToken> {
        self.leading
            .iter()
            .flatten()
            .chain(self.interior.iter().flat_map(|(_, tokens)| tokens))
            .chain(self.trailing.iter().flatten())
    }

    pub fn annotate(&mut self, key: impl Into<String>, value: Value) {
        self.annotations.insert(key.into(), value);
    }
}
