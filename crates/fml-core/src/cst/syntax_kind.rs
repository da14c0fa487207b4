//! Syntax kind enumeration for the FML CST
//!
//! This module defines all possible node and token types in the FML syntax tree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Syntax kind for FML language elements
///
/// Keywords in FML are contextual: the lexer produces [`FmlSyntaxKind::Ident`]
/// for every word and the parser re-tags the ones that act as keywords in
/// their position, so `source` can still be used as a variable name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u16)]
pub enum FmlSyntaxKind {
    // ==================
    // Trivia (0-9)
    // ==================
    /// Whitespace (spaces, tabs)
    Whitespace = 0,
    /// Line comment starting with //
    CommentLine = 1,
    /// Block comment /* ... */
    CommentBlock = 2,
    /// Newline character
    Newline = 3,

    // ==================
    // Keywords (10-99)
    // ==================
    MapKw = 10,
    UsesKw = 11,
    AliasKw = 12,
    AsKw = 13,
    ImportsKw = 14,
    LetKw = 15,
    GroupKw = 16,
    ExtendsKw = 17,
    ConceptmapKw = 18,
    PrefixKw = 19,
    SourceKw = 20,
    TargetKw = 21,
    QueriedKw = 22,
    ProducedKw = 23,
    TypesKw = 24,
    TypeKw = 25,
    DefaultKw = 26,
    WhereKw = 27,
    CheckKw = 28,
    LogKw = 29,
    ThenKw = 30,
    // List modes
    FirstKw = 31,
    NotFirstKw = 32,
    LastKw = 33,
    NotLastKw = 34,
    OnlyOneKw = 35,
    ShareKw = 36,
    SingleKw = 37,
    TrueKw = 38,
    FalseKw = 39,

    // ==================
    // Punctuation & Operators (100-149)
    // ==================
    Dot = 100,
    /// `..` in cardinalities
    DotDot = 101,
    Comma = 102,
    Semicolon = 103,
    Colon = 104,
    LParen = 105,
    RParen = 106,
    LBrace = 107,
    RBrace = 108,
    Equals = 109,
    EqEq = 110,
    NotEq = 111,
    LtEq = 112,
    GtEq = 113,
    Minus = 114,
    /// `->` between sources and targets
    Arrow = 115,
    Star = 116,
    Plus = 117,
    /// `<<` opening a group type mode
    DoubleLt = 118,
    /// `>>` closing a group type mode
    DoubleGt = 119,
    Lt = 120,
    Gt = 121,
    /// `///` introducing a metadata line
    MetadataPrefix = 122,

    // ==================
    // Literals & Identifiers (150-199)
    // ==================
    Ident = 150,
    /// Back-tick delimited identifier
    DelimitedIdent = 151,
    /// Single-quoted string
    String = 152,
    /// Double-quoted string
    DoubleString = 153,
    /// Triple-quoted block string
    BlockString = 154,
    Integer = 155,
    Decimal = 156,
    Date = 157,
    DateTime = 158,
    Time = 159,
    /// Unquoted `scheme://...` url
    Url = 160,
    /// Opaque embedded expression text
    Expression = 161,
    /// Class shared by all literal tokens when keying interior gaps
    Literal = 170,

    // ==================
    // Structure Nodes (200-399)
    // ==================
    Document = 200,
    /// Root of a standalone rule parse
    RuleEntry = 201,

    // Declarations
    Metadata = 210,
    ConceptMap = 211,
    ConceptMapPrefix = 212,
    ConceptMapping = 213,
    ConceptMapSource = 214,
    ConceptMapTarget = 215,
    MapDecl = 216,
    UsesDecl = 217,
    ImportDecl = 218,
    ConstDecl = 219,
    Group = 220,

    // Group parts
    ParamList = 230,
    Param = 231,
    TypeAnnotation = 232,
    Extends = 233,
    TypeMode = 234,
    RuleBlock = 235,

    // Rules (250-299)
    Rule = 250,
    SourceList = 251,
    Source = 252,
    TargetList = 253,
    Target = 254,
    QualifiedName = 255,
    Cardinality = 256,
    DefaultClause = 257,
    AliasClause = 258,
    WhereClause = 259,
    CheckClause = 260,
    LogClause = 261,
    Transform = 262,
    CallExpr = 263,
    ArgList = 264,
    ParenExpr = 265,
    Dependent = 266,
    GroupCall = 267,
    RuleName = 268,

    // ==================
    // Special (400+)
    // ==================
    Error = 400,
}

impl FmlSyntaxKind {
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::CommentLine | Self::CommentBlock | Self::Newline
        )
    }

    pub const fn is_keyword(self) -> bool {
        (self as u16) >= 10 && (self as u16) < 100
    }

    pub const fn is_punct(self) -> bool {
        (self as u16) >= 100 && (self as u16) < 150
    }

    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::String
                | Self::DoubleString
                | Self::BlockString
                | Self::Integer
                | Self::Decimal
                | Self::Date
                | Self::DateTime
                | Self::Time
                | Self::Url
                | Self::TrueKw
                | Self::FalseKw
        )
    }

    pub const fn is_node(self) -> bool {
        (self as u16) >= 200 && (self as u16) < 400
    }

    /// Nodes that become their own object-model entity.
    ///
    /// Every other node is a clause whose tokens belong to the nearest
    /// enclosing model node.
    pub const fn is_model_node(self) -> bool {
        matches!(
            self,
            Self::Document
                | Self::Metadata
                | Self::ConceptMap
                | Self::ConceptMapPrefix
                | Self::ConceptMapping
                | Self::MapDecl
                | Self::UsesDecl
                | Self::ImportDecl
                | Self::ConstDecl
                | Self::Group
                | Self::Param
                | Self::Rule
                | Self::Source
                | Self::Target
                | Self::Transform
                | Self::Dependent
                | Self::GroupCall
        )
    }

    /// Token class used when keying interior gaps.
    ///
    /// Literal spellings collapse to [`FmlSyntaxKind::Literal`] and delimited
    /// identifiers to [`FmlSyntaxKind::Ident`], so re-quoting a value keeps
    /// its recorded spacing.
    pub const fn gap_class(self) -> Self {
        match self {
            Self::DelimitedIdent => Self::Ident,
            _ if self.is_literal() => Self::Literal,
            _ => self,
        }
    }

    pub const fn keyword_text(self) -> Option<&'static str> {
        match self {
            Self::MapKw => Some("map"),
            Self::UsesKw => Some("uses"),
            Self::AliasKw => Some("alias"),
            Self::AsKw => Some("as"),
            Self::ImportsKw => Some("imports"),
            Self::LetKw => Some("let"),
            Self::GroupKw => Some("group"),
            Self::ExtendsKw => Some("extends"),
            Self::ConceptmapKw => Some("conceptmap"),
            Self::PrefixKw => Some("prefix"),
            Self::SourceKw => Some("source"),
            Self::TargetKw => Some("target"),
            Self::QueriedKw => Some("queried"),
            Self::ProducedKw => Some("produced"),
            Self::TypesKw => Some("types"),
            Self::TypeKw => Some("type"),
            Self::DefaultKw => Some("default"),
            Self::WhereKw => Some("where"),
            Self::CheckKw => Some("check"),
            Self::LogKw => Some("log"),
            Self::ThenKw => Some("then"),
            Self::FirstKw => Some("first"),
            Self::NotFirstKw => Some("not_first"),
            Self::LastKw => Some("last"),
            Self::NotLastKw => Some("not_last"),
            Self::OnlyOneKw => Some("only_one"),
            Self::ShareKw => Some("share"),
            Self::SingleKw => Some("single"),
            Self::TrueKw => Some("true"),
            Self::FalseKw => Some("false"),
            _ => None,
        }
    }

    /// Fixed spelling of punctuation tokens
    pub const fn punct_text(self) -> Option<&'static str> {
        match self {
            Self::Dot => Some("."),
            Self::DotDot => Some(".."),
            Self::Comma => Some(","),
            Self::Semicolon => Some(";"),
            Self::Colon => Some(":"),
            Self::LParen => Some("("),
            Self::RParen => Some(")"),
            Self::LBrace => Some("{"),
            Self::RBrace => Some("}"),
            Self::Equals => Some("="),
            Self::EqEq => Some("=="),
            Self::NotEq => Some("!="),
            Self::LtEq => Some("<="),
            Self::GtEq => Some(">="),
            Self::Minus => Some("-"),
            Self::Arrow => Some("->"),
            Self::Star => Some("*"),
            Self::Plus => Some("+"),
            Self::DoubleLt => Some("<<"),
            Self::DoubleGt => Some(">>"),
            Self::Lt => Some("<"),
            Self::Gt => Some(">"),
            Self::MetadataPrefix => Some("///"),
            _ => None,
        }
    }

    /// Human readable description used in diagnostics
    pub fn describe(self) -> String {
        if let Some(text) = self.keyword_text().or(self.punct_text()) {
            return format!("'{text}'");
        }
        match self {
            Self::Ident | Self::DelimitedIdent => "identifier".to_string(),
            Self::String | Self::DoubleString => "string".to_string(),
            Self::Url => "url".to_string(),
            Self::Expression => "expression".to_string(),
            Self::Integer => "integer".to_string(),
            _ => format!("{self:?}"),
        }
    }

    pub const fn from_raw(raw: u16) -> Option<Self> {
        let kind = match raw {
            0 => Self::Whitespace,
            1 => Self::CommentLine,
            2 => Self::CommentBlock,
            3 => Self::Newline,

            10 => Self::MapKw,
            11 => Self::UsesKw,
            12 => Self::AliasKw,
            13 => Self::AsKw,
            14 => Self::ImportsKw,
            15 => Self::LetKw,
            16 => Self::GroupKw,
            17 => Self::ExtendsKw,
            18 => Self::ConceptmapKw,
            19 => Self::PrefixKw,
            20 => Self::SourceKw,
            21 => Self::TargetKw,
            22 => Self::QueriedKw,
            23 => Self::ProducedKw,
            24 => Self::TypesKw,
            25 => Self::TypeKw,
            26 => Self::DefaultKw,
            27 => Self::WhereKw,
            28 => Self::CheckKw,
            29 => Self::LogKw,
            30 => Self::ThenKw,
            31 => Self::FirstKw,
            32 => Self::NotFirstKw,
            33 => Self::LastKw,
            34 => Self::NotLastKw,
            35 => Self::OnlyOneKw,
            36 => Self::ShareKw,
            37 => Self::SingleKw,
            38 => Self::TrueKw,
            39 => Self::FalseKw,

            100 => Self::Dot,
            101 => Self::DotDot,
            102 => Self::Comma,
            103 => Self::Semicolon,
            104 => Self::Colon,
            105 => Self::LParen,
            106 => Self::RParen,
            107 => Self::LBrace,
            108 => Self::RBrace,
            109 => Self::Equals,
            110 => Self::EqEq,
            111 => Self::NotEq,
            112 => Self::LtEq,
            113 => Self::GtEq,
            114 => Self::Minus,
            115 => Self::Arrow,
            116 => Self::Star,
            117 => Self::Plus,
            118 => Self::DoubleLt,
            119 => Self::DoubleGt,
            120 => Self::Lt,
            121 => Self::Gt,
            122 => Self::MetadataPrefix,

            150 => Self::Ident,
            151 => Self::DelimitedIdent,
            152 => Self::String,
            153 => Self::DoubleString,
            154 => Self::BlockString,
            155 => Self::Integer,
            156 => Self::Decimal,
            157 => Self::Date,
            158 => Self::DateTime,
            159 => Self::Time,
            160 => Self::Url,
            161 => Self::Expression,
            170 => Self::Literal,

            200 => Self::Document,
            201 => Self::RuleEntry,
            210 => Self::Metadata,
            211 => Self::ConceptMap,
            212 => Self::ConceptMapPrefix,
            213 => Self::ConceptMapping,
            214 => Self::ConceptMapSource,
            215 => Self::ConceptMapTarget,
            216 => Self::MapDecl,
            217 => Self::UsesDecl,
            218 => Self::ImportDecl,
            219 => Self::ConstDecl,
            220 => Self::Group,
            230 => Self::ParamList,
            231 => Self::Param,
            232 => Self::TypeAnnotation,
            233 => Self::Extends,
            234 => Self::TypeMode,
            235 => Self::RuleBlock,
            250 => Self::Rule,
            251 => Self::SourceList,
            252 => Self::Source,
            253 => Self::TargetList,
            254 => Self::Target,
            255 => Self::QualifiedName,
            256 => Self::Cardinality,
            257 => Self::DefaultClause,
            258 => Self::AliasClause,
            259 => Self::WhereClause,
            260 => Self::CheckClause,
            261 => Self::LogClause,
            262 => Self::Transform,
            263 => Self::CallExpr,
            264 => Self::ArgList,
            265 => Self::ParenExpr,
            266 => Self::Dependent,
            267 => Self::GroupCall,
            268 => Self::RuleName,

            400 => Self::Error,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for FmlSyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<FmlSyntaxKind> for rowan::SyntaxKind {
    fn from(kind: FmlSyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivia_classification() {
        assert!(FmlSyntaxKind::Whitespace.is_trivia());
        assert!(FmlSyntaxKind::Newline.is_trivia());
        assert!(FmlSyntaxKind::CommentBlock.is_trivia());
        assert!(!FmlSyntaxKind::MetadataPrefix.is_trivia());
    }

    #[test]
    fn test_keyword_text() {
        assert_eq!(FmlSyntaxKind::NotFirstKw.keyword_text(), Some("not_first"));
        assert_eq!(FmlSyntaxKind::ConceptmapKw.keyword_text(), Some("conceptmap"));
        assert_eq!(FmlSyntaxKind::Ident.keyword_text(), None);
    }

    #[test]
    fn test_gap_class_merges_literal_spellings() {
        assert_eq!(FmlSyntaxKind::String.gap_class(), FmlSyntaxKind::Literal);
        assert_eq!(FmlSyntaxKind::DoubleString.gap_class(), FmlSyntaxKind::Literal);
        assert_eq!(FmlSyntaxKind::Url.gap_class(), FmlSyntaxKind::Literal);
        assert_eq!(FmlSyntaxKind::TrueKw.gap_class(), FmlSyntaxKind::Literal);
        assert_eq!(FmlSyntaxKind::DelimitedIdent.gap_class(), FmlSyntaxKind::Ident);
        assert_eq!(FmlSyntaxKind::Comma.gap_class(), FmlSyntaxKind::Comma);
    }

    #[test]
    fn test_model_nodes() {
        assert!(FmlSyntaxKind::Rule.is_model_node());
        assert!(FmlSyntaxKind::Transform.is_model_node());
        assert!(!FmlSyntaxKind::SourceList.is_model_node());
        assert!(!FmlSyntaxKind::QualifiedName.is_model_node());
        assert!(FmlSyntaxKind::QualifiedName.is_node());
    }

    #[test]
    fn test_describe() {
        assert_eq!(FmlSyntaxKind::Semicolon.describe(), "';'");
        assert_eq!(FmlSyntaxKind::GroupKw.describe(), "'group'");
        assert_eq!(FmlSyntaxKind::Ident.describe(), "identifier");
    }
}
