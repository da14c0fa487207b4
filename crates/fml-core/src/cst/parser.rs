//! Hierarchical parser for FML constructs
//!
//! This module builds a structured CST from tokens, creating nodes for
//! declarations, groups, rules and their clauses. All trivia is kept in the
//! tree, so `cst.text()` always equals the source, even when errors were
//! reported.
//!
//! Trivia preceding a node is attached to the enclosing node; a node starts
//! at its first significant token.

use super::lexer::{CstSpan, LexerError};
use super::{CstBuilder, CstToken, FmlSyntaxKind, FmlSyntaxNode, TokenStream};

/// A grammar error reported while building the CST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub span: CstSpan,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Everything produced by one parse: the tree, the token stream it was built
/// from, and the diagnostics of both stages
#[derive(Debug)]
pub struct CstParse {
    pub root: FmlSyntaxNode,
    pub tokens: TokenStream,
    pub lexer_errors: Vec<LexerError>,
    pub errors: Vec<SyntaxError>,
}

impl CstParse {
    pub fn has_errors(&self) -> bool {
        !self.lexer_errors.is_empty() || !self.errors.is_empty()
    }
}

/// Parse a complete mapping document into a hierarchical CST
///
/// # Example
///
/// ```rust,ignore
/// use fml_core::cst::parse_fml;
///
/// let source = "map \"http://x/y\" = y\n";
/// let parse = parse_fml(source);
/// assert!(!parse.has_errors());
/// assert_eq!(parse.root.text().to_string(), source);
/// ```
pub fn parse_fml(source: &str) -> CstParse {
    run(source, Entry::Document)
}

/// Parse a single rule (terminated by `;`) into a CST rooted at `RuleEntry`
pub fn parse_fml_rule(source: &str) -> CstParse {
    run(source, Entry::Rule)
}

#[derive(Debug, Clone, Copy)]
enum Entry {
    Document,
    Rule,
}

fn run(source: &str, entry: Entry) -> CstParse {
    let (tokens, lexer_errors) = super::lex_with_trivia(source);
    let mut parser = Parser::new(&tokens, source.len());
    match entry {
        Entry::Document => parser.parse_document(),
        Entry::Rule => parser.parse_rule_entry(),
    }
    let (root, errors) = parser.finish();

    CstParse {
        root,
        tokens: TokenStream::new(tokens),
        lexer_errors,
        errors,
    }
}

/// Top-level declaration sections, in the order they must appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Metadata,
    ConceptMap,
    Map,
    Uses,
    Imports,
    Constants,
    Groups,
}

impl Section {
    fn of(token: &CstToken) -> Option<Self> {
        if token.kind == FmlSyntaxKind::MetadataPrefix {
            return Some(Section::Metadata);
        }
        if token.kind != FmlSyntaxKind::Ident {
            return None;
        }
        match token.text.as_str() {
            "conceptmap" => Some(Section::ConceptMap),
            "map" => Some(Section::Map),
            "uses" => Some(Section::Uses),
            "imports" => Some(Section::Imports),
            "let" => Some(Section::Constants),
            "group" => Some(Section::Groups),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Section::Metadata => "metadata",
            Section::ConceptMap => "conceptmap",
            Section::Map => "map",
            Section::Uses => "uses",
            Section::Imports => "imports",
            Section::Constants => "let",
            Section::Groups => "group",
        }
    }
}

const RELATIONSHIPS: &[FmlSyntaxKind] = &[
    FmlSyntaxKind::Minus,
    FmlSyntaxKind::EqEq,
    FmlSyntaxKind::Equals,
    FmlSyntaxKind::NotEq,
    FmlSyntaxKind::LtEq,
    FmlSyntaxKind::GtEq,
];

const STRUCTURE_MODES: &[(&str, FmlSyntaxKind)] = &[
    ("source", FmlSyntaxKind::SourceKw),
    ("target", FmlSyntaxKind::TargetKw),
    ("queried", FmlSyntaxKind::QueriedKw),
    ("produced", FmlSyntaxKind::ProducedKw),
];

const PARAMETER_MODES: &[(&str, FmlSyntaxKind)] = &[
    ("source", FmlSyntaxKind::SourceKw),
    ("target", FmlSyntaxKind::TargetKw),
];

const SOURCE_LIST_MODES: &[(&str, FmlSyntaxKind)] = &[
    ("first", FmlSyntaxKind::FirstKw),
    ("not_first", FmlSyntaxKind::NotFirstKw),
    ("last", FmlSyntaxKind::LastKw),
    ("not_last", FmlSyntaxKind::NotLastKw),
    ("only_one", FmlSyntaxKind::OnlyOneKw),
];

const TARGET_LIST_MODES: &[(&str, FmlSyntaxKind)] = &[
    ("first", FmlSyntaxKind::FirstKw),
    ("share", FmlSyntaxKind::ShareKw),
    ("last", FmlSyntaxKind::LastKw),
    ("single", FmlSyntaxKind::SingleKw),
];

const SOURCE_EXPRESSION_CLAUSES: &[(&str, FmlSyntaxKind, FmlSyntaxKind)] = &[
    ("where", FmlSyntaxKind::WhereClause, FmlSyntaxKind::WhereKw),
    ("check", FmlSyntaxKind::CheckClause, FmlSyntaxKind::CheckKw),
    ("log", FmlSyntaxKind::LogClause, FmlSyntaxKind::LogKw),
];

/// Token stream parser
struct Parser<'a> {
    tokens: &'a [CstToken],
    source_len: usize,
    pos: usize,
    builder: CstBuilder,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [CstToken], source_len: usize) -> Self {
        Self {
            tokens,
            source_len,
            pos: 0,
            builder: CstBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> (FmlSyntaxNode, Vec<SyntaxError>) {
        (self.builder.finish(), self.errors)
    }

    /// Parse the top-level document
    ///
    /// Grammar: metadata* conceptmap* map? uses* imports* let* group*
    fn parse_document(&mut self) {
        self.builder.start_node(FmlSyntaxKind::Document);

        let mut section = Section::Metadata;
        let mut seen_map = false;

        while let Some(token) = self.peek() {
            let Some(next) = Section::of(token) else {
                self.error_expected("a declaration");
                self.recover_to_declaration();
                continue;
            };

            if next < section {
                self.error_here(format!(
                    "'{}' declaration must appear before '{}' declarations",
                    next.label(),
                    section.label()
                ));
            } else {
                section = next;
            }

            match next {
                Section::Metadata => self.parse_metadata(),
                Section::ConceptMap => self.parse_concept_map(),
                Section::Map => {
                    if seen_map {
                        self.error_here("duplicate 'map' declaration");
                    }
                    seen_map = true;
                    self.parse_map();
                }
                Section::Uses => self.parse_uses(),
                Section::Imports => self.parse_imports(),
                Section::Constants => self.parse_const(),
                Section::Groups => self.parse_group(),
            }
        }

        self.flush_trivia();
        self.builder.finish_node(); // DOCUMENT
    }

    /// Entry point for a standalone rule
    fn parse_rule_entry(&mut self) {
        self.builder.start_node(FmlSyntaxKind::RuleEntry);

        if self.at_end() {
            self.error_expected("a rule");
        } else {
            self.parse_rule();
        }

        if !self.at_end() {
            self.error_here("unexpected input after rule");
            self.skip_until(|_| false);
        }

        self.flush_trivia();
        self.builder.finish_node(); // RULE_ENTRY
    }

    /// Grammar: `///` qualifiedName `=` (literal | blockString)?
    fn parse_metadata(&mut self) {
        self.start(FmlSyntaxKind::Metadata);
        self.bump();
        self.parse_qualified_name();
        self.expect(FmlSyntaxKind::Equals);
        if self.at_literal() || self.at(FmlSyntaxKind::BlockString) {
            self.bump_literal();
        }
        self.finish_node();
    }

    /// Grammar: `conceptmap` (url | id) `{` prefix* mapping* `}`
    fn parse_concept_map(&mut self) {
        self.start(FmlSyntaxKind::ConceptMap);
        self.bump_as(FmlSyntaxKind::ConceptmapKw);

        if self.at_url() || self.at_ident() {
            self.bump();
        } else {
            self.error_expected("concept map url");
        }

        if self.expect(FmlSyntaxKind::LBrace) {
            let mut seen_mapping = false;
            while !self.at_end() && !self.at(FmlSyntaxKind::RBrace) {
                if self.at_keyword("prefix") && self.nth_is_ident(1) {
                    if seen_mapping {
                        self.error_here("prefix declarations must precede concept mappings");
                    }
                    self.parse_concept_map_prefix();
                } else if self.at_ident() {
                    seen_mapping = true;
                    self.parse_concept_mapping();
                } else {
                    self.error_expected("prefix or concept mapping");
                    self.skip_until(|kind| {
                        matches!(
                            kind,
                            FmlSyntaxKind::RBrace
                                | FmlSyntaxKind::Ident
                                | FmlSyntaxKind::DelimitedIdent
                        )
                    });
                }
            }
            self.expect(FmlSyntaxKind::RBrace);
        }

        self.finish_node(); // CONCEPT_MAP
    }

    fn parse_concept_map_prefix(&mut self) {
        self.start(FmlSyntaxKind::ConceptMapPrefix);
        self.bump_as(FmlSyntaxKind::PrefixKw);
        self.expect_ident();
        self.expect(FmlSyntaxKind::Equals);
        self.expect_url();
        self.finish_node();
    }

    /// Grammar: prefix `:` code relationship prefix `:` code
    fn parse_concept_mapping(&mut self) {
        self.start(FmlSyntaxKind::ConceptMapping);
        self.parse_concept_map_side(FmlSyntaxKind::ConceptMapSource);

        if self
            .peek()
            .is_some_and(|token| RELATIONSHIPS.contains(&token.kind))
        {
            self.bump();
        } else {
            self.error_expected("concept map relationship");
        }

        self.parse_concept_map_side(FmlSyntaxKind::ConceptMapTarget);
        self.finish_node();
    }

    fn parse_concept_map_side(&mut self, kind: FmlSyntaxKind) {
        self.start(kind);
        self.expect_ident();
        self.expect(FmlSyntaxKind::Colon);
        if self.at_any(&[
            FmlSyntaxKind::Ident,
            FmlSyntaxKind::DelimitedIdent,
            FmlSyntaxKind::String,
            FmlSyntaxKind::DoubleString,
            FmlSyntaxKind::Integer,
            FmlSyntaxKind::Decimal,
        ]) {
            self.bump();
        } else {
            self.error_expected("code");
        }
        self.finish_node();
    }

    /// Grammar: `map` url `=` (id | string)
    fn parse_map(&mut self) {
        self.start(FmlSyntaxKind::MapDecl);
        self.bump_as(FmlSyntaxKind::MapKw);
        self.expect_url();
        self.expect(FmlSyntaxKind::Equals);
        if self.at_ident() || self.at_any(&[FmlSyntaxKind::String, FmlSyntaxKind::DoubleString]) {
            self.bump();
        } else {
            self.error_expected("map name");
        }
        self.finish_node();
    }

    /// Grammar: `uses` url (`alias` id)? `as` mode
    fn parse_uses(&mut self) {
        self.start(FmlSyntaxKind::UsesDecl);
        self.bump_as(FmlSyntaxKind::UsesKw);
        self.expect_url();

        if self.at_keyword("alias") {
            self.bump_as(FmlSyntaxKind::AliasKw);
            self.expect_ident();
        }

        self.expect_keyword("as", FmlSyntaxKind::AsKw);
        if !self.bump_mode(STRUCTURE_MODES) {
            self.error_expected("'source', 'target', 'queried' or 'produced'");
        }
        self.finish_node();
    }

    fn parse_imports(&mut self) {
        self.start(FmlSyntaxKind::ImportDecl);
        self.bump_as(FmlSyntaxKind::ImportsKw);
        self.expect_url();
        self.finish_node();
    }

    /// Grammar: `let` id `=` expression `;`
    fn parse_const(&mut self) {
        self.start(FmlSyntaxKind::ConstDecl);
        self.bump_as(FmlSyntaxKind::LetKw);
        self.expect_ident();
        self.expect(FmlSyntaxKind::Equals);
        self.expect(FmlSyntaxKind::Expression);
        self.expect(FmlSyntaxKind::Semicolon);
        self.finish_node();
    }

    /// Grammar: `group` id `(` params `)` (`extends` id)? (`<<` mode `>>`)? `{` rule* `}`
    fn parse_group(&mut self) {
        self.start(FmlSyntaxKind::Group);
        self.bump_as(FmlSyntaxKind::GroupKw);
        self.expect_ident();
        self.parse_param_list();

        if self.at_keyword("extends") {
            self.start(FmlSyntaxKind::Extends);
            self.bump_as(FmlSyntaxKind::ExtendsKw);
            self.expect_ident();
            self.finish_node();
        }

        if self.at(FmlSyntaxKind::DoubleLt) {
            self.parse_type_mode();
        }

        self.parse_rule_block();
        self.finish_node(); // GROUP
    }

    fn parse_param_list(&mut self) {
        self.start(FmlSyntaxKind::ParamList);
        if self.expect(FmlSyntaxKind::LParen) {
            if !self.at(FmlSyntaxKind::RParen) {
                loop {
                    self.parse_param();
                    if !self.eat(FmlSyntaxKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(FmlSyntaxKind::RParen);
        }
        self.finish_node();
    }

    /// Grammar: (`source` | `target`) id (`:` type)?
    fn parse_param(&mut self) {
        self.start(FmlSyntaxKind::Param);
        if !self.bump_mode(PARAMETER_MODES) {
            self.error_expected("'source' or 'target'");
        }
        self.expect_ident();
        if self.at(FmlSyntaxKind::Colon) {
            self.parse_type_annotation();
        }
        self.finish_node();
    }

    fn parse_type_annotation(&mut self) {
        self.start(FmlSyntaxKind::TypeAnnotation);
        self.bump();
        self.expect_ident();
        self.finish_node();
    }

    /// Grammar: `<<` (`types` | `type` `+`) `>>`
    fn parse_type_mode(&mut self) {
        self.start(FmlSyntaxKind::TypeMode);
        self.bump();
        if self.at_keyword("types") {
            self.bump_as(FmlSyntaxKind::TypesKw);
        } else if self.at_keyword("type") {
            self.bump_as(FmlSyntaxKind::TypeKw);
            self.expect(FmlSyntaxKind::Plus);
        } else {
            self.error_expected("'types' or 'type+'");
        }
        self.expect(FmlSyntaxKind::DoubleGt);
        self.finish_node();
    }

    fn parse_rule_block(&mut self) {
        self.start(FmlSyntaxKind::RuleBlock);
        if self.expect(FmlSyntaxKind::LBrace) {
            while !self.at_end() && !self.at(FmlSyntaxKind::RBrace) {
                let before = self.progress_marker();
                self.parse_rule();
                if self.progress_marker() == before {
                    self.skip_until(|kind| {
                        matches!(kind, FmlSyntaxKind::Semicolon | FmlSyntaxKind::RBrace)
                    });
                    self.eat(FmlSyntaxKind::Semicolon);
                }
            }
            self.expect(FmlSyntaxKind::RBrace);
        }
        self.finish_node(); // RULE_BLOCK
    }

    /// Grammar: sources (`->` targets)? dependent? name? `;`
    fn parse_rule(&mut self) {
        self.start(FmlSyntaxKind::Rule);

        self.start(FmlSyntaxKind::SourceList);
        self.parse_source();
        while self.eat(FmlSyntaxKind::Comma) {
            self.parse_source();
        }
        self.finish_node();

        if self.eat(FmlSyntaxKind::Arrow) {
            self.start(FmlSyntaxKind::TargetList);
            self.parse_target();
            while self.eat(FmlSyntaxKind::Comma) {
                self.parse_target();
            }
            self.finish_node();
        }

        if self.at_keyword("then") {
            self.parse_dependent();
        }

        if self.at_any(&[FmlSyntaxKind::DoubleString, FmlSyntaxKind::String])
            || (self.at_ident() && self.nth_kind(1) == Some(FmlSyntaxKind::Semicolon))
        {
            self.start(FmlSyntaxKind::RuleName);
            self.bump();
            self.finish_node();
        }

        if !self.at(FmlSyntaxKind::Semicolon) {
            self.error_expected("';' to end the rule");
            self.skip_until(|kind| {
                matches!(kind, FmlSyntaxKind::Semicolon | FmlSyntaxKind::RBrace)
            });
        }
        self.eat(FmlSyntaxKind::Semicolon);

        self.finish_node(); // RULE
    }

    /// Grammar: context (`.` id)* (`:` type)? (min `..` max)? (`default` `(` expr `)`)?
    /// listMode? (`as` id)? (`where` `(` expr `)`)? (`check` `(` expr `)`)? (`log` `(` expr `)`)?
    fn parse_source(&mut self) {
        self.start(FmlSyntaxKind::Source);
        self.parse_qualified_name();

        if self.at(FmlSyntaxKind::Colon) {
            self.parse_type_annotation();
        }

        if self.at(FmlSyntaxKind::Integer) {
            self.start(FmlSyntaxKind::Cardinality);
            self.bump_bound();
            self.expect(FmlSyntaxKind::DotDot);
            if self.at(FmlSyntaxKind::Integer) {
                self.bump_bound();
            } else if self.at(FmlSyntaxKind::Star) {
                self.bump();
            } else {
                self.error_expected("maximum cardinality");
            }
            self.finish_node();
        }

        if self.at_keyword("default") {
            self.parse_expression_clause(FmlSyntaxKind::DefaultClause, FmlSyntaxKind::DefaultKw);
        }

        self.bump_mode(SOURCE_LIST_MODES);

        if self.at_keyword("as") {
            self.parse_alias();
        }

        for &(keyword, clause, kind) in SOURCE_EXPRESSION_CLAUSES {
            if self.at_keyword(keyword) {
                self.parse_expression_clause(clause, kind);
            }
        }

        self.finish_node(); // SOURCE
    }

    fn parse_expression_clause(&mut self, clause: FmlSyntaxKind, keyword: FmlSyntaxKind) {
        self.start(clause);
        self.bump_as(keyword);
        self.expect(FmlSyntaxKind::LParen);
        self.eat(FmlSyntaxKind::Expression);
        self.expect(FmlSyntaxKind::RParen);
        self.finish_node();
    }

    fn parse_alias(&mut self) {
        self.start(FmlSyntaxKind::AliasClause);
        self.bump_as(FmlSyntaxKind::AsKw);
        self.expect_ident();
        self.finish_node();
    }

    /// Grammar: context (`.` id)* (`=` transform)? (`as` id)? listMode?
    ///        | `(` expr `)` (`as` id)?
    ///        | invocation (`as` id)?
    fn parse_target(&mut self) {
        self.start(FmlSyntaxKind::Target);

        if self.at(FmlSyntaxKind::LParen) {
            self.start(FmlSyntaxKind::Transform);
            self.parse_paren_expr();
            self.finish_node();
        } else if self.at_ident() && self.nth_kind(1) == Some(FmlSyntaxKind::LParen) {
            self.start(FmlSyntaxKind::Transform);
            self.parse_call(FmlSyntaxKind::CallExpr);
            self.finish_node();
        } else {
            self.parse_qualified_name();
            if self.eat(FmlSyntaxKind::Equals) {
                self.parse_transform();
            }
        }

        if self.at_keyword("as") {
            self.parse_alias();
        }
        self.bump_mode(TARGET_LIST_MODES);

        self.finish_node(); // TARGET
    }

    /// Grammar: literal | qualifiedName | invocation | `(` expr `)`
    fn parse_transform(&mut self) {
        self.start(FmlSyntaxKind::Transform);
        if self.at(FmlSyntaxKind::LParen) {
            self.parse_paren_expr();
        } else if self.at_literal() {
            self.bump_literal();
        } else if self.at_ident() && self.nth_kind(1) == Some(FmlSyntaxKind::LParen) {
            self.parse_call(FmlSyntaxKind::CallExpr);
        } else if self.at_ident() {
            self.parse_qualified_name();
        } else {
            self.error_expected("transform");
        }
        self.finish_node(); // TRANSFORM
    }

    fn parse_paren_expr(&mut self) {
        self.start(FmlSyntaxKind::ParenExpr);
        self.expect(FmlSyntaxKind::LParen);
        self.eat(FmlSyntaxKind::Expression);
        self.expect(FmlSyntaxKind::RParen);
        self.finish_node();
    }

    /// Grammar: id `(` (param (`,` param)*)? `)`
    fn parse_call(&mut self, kind: FmlSyntaxKind) {
        self.start(kind);
        self.expect_ident();

        self.start(FmlSyntaxKind::ArgList);
        if self.expect(FmlSyntaxKind::LParen) {
            if !self.at(FmlSyntaxKind::RParen) {
                loop {
                    self.parse_arg();
                    if !self.eat(FmlSyntaxKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(FmlSyntaxKind::RParen);
        }
        self.finish_node(); // ARG_LIST

        self.finish_node();
    }

    fn parse_arg(&mut self) {
        if self.at(FmlSyntaxKind::LParen) {
            self.parse_paren_expr();
        } else if self.at_literal() {
            self.bump_literal();
        } else if self.at_ident() {
            self.parse_qualified_name();
        } else {
            self.error_expected("parameter");
        }
    }

    /// Grammar: `then` (invocation (`,` invocation)*)? (`{` rule* `}`)?
    fn parse_dependent(&mut self) {
        self.start(FmlSyntaxKind::Dependent);
        self.bump_as(FmlSyntaxKind::ThenKw);

        let mut parsed_any = false;
        if self.at_ident() && self.nth_kind(1) == Some(FmlSyntaxKind::LParen) {
            self.parse_call(FmlSyntaxKind::GroupCall);
            while self.eat(FmlSyntaxKind::Comma) {
                self.parse_call(FmlSyntaxKind::GroupCall);
            }
            parsed_any = true;
        }
        if self.at(FmlSyntaxKind::LBrace) {
            self.parse_rule_block();
            parsed_any = true;
        }
        if !parsed_any {
            self.error_expected("group invocation or rule block after 'then'");
        }

        self.finish_node(); // DEPENDENT
    }

    fn parse_qualified_name(&mut self) {
        self.start(FmlSyntaxKind::QualifiedName);
        self.expect_ident();
        while self.eat(FmlSyntaxKind::Dot) {
            self.expect_ident();
        }
        self.finish_node();
    }

    // Helper methods

    /// Next significant token, skipping trivia
    fn peek(&self) -> Option<&'a CstToken> {
        self.nth_token(0)
    }

    fn nth_token(&self, n: usize) -> Option<&'a CstToken> {
        let tokens: &'a [CstToken] = self.tokens;
        tokens[self.pos.min(tokens.len())..]
            .iter()
            .filter(|token| !token.kind.is_trivia())
            .nth(n)
    }

    fn nth_kind(&self, n: usize) -> Option<FmlSyntaxKind> {
        self.nth_token(n).map(|token| token.kind)
    }

    fn nth_is_ident(&self, n: usize) -> bool {
        matches!(
            self.nth_kind(n),
            Some(FmlSyntaxKind::Ident | FmlSyntaxKind::DelimitedIdent)
        )
    }

    /// Index of the next significant token, used to detect stalled loops
    fn progress_marker(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .position(|token| !token.kind.is_trivia())
            .map(|offset| self.pos + offset)
            .unwrap_or(self.tokens.len())
    }

    fn at_end(&self) -> bool {
        self.peek().is_none()
    }

    fn at(&self, kind: FmlSyntaxKind) -> bool {
        self.nth_kind(0) == Some(kind)
    }

    fn at_any(&self, kinds: &[FmlSyntaxKind]) -> bool {
        self.nth_kind(0).is_some_and(|kind| kinds.contains(&kind))
    }

    fn at_ident(&self) -> bool {
        self.nth_is_ident(0)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.peek()
            .is_some_and(|token| token.kind == FmlSyntaxKind::Ident && token.text == keyword)
    }

    fn at_url(&self) -> bool {
        self.at_any(&[
            FmlSyntaxKind::String,
            FmlSyntaxKind::DoubleString,
            FmlSyntaxKind::Url,
        ])
    }

    fn at_literal(&self) -> bool {
        self.at_any(&[
            FmlSyntaxKind::String,
            FmlSyntaxKind::DoubleString,
            FmlSyntaxKind::Integer,
            FmlSyntaxKind::Decimal,
            FmlSyntaxKind::Date,
            FmlSyntaxKind::DateTime,
            FmlSyntaxKind::Time,
        ]) || self.at_keyword("true")
            || self.at_keyword("false")
    }

    /// Move pending trivia into the currently open node
    fn flush_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.add_token(token, None);
            self.pos += 1;
        }
    }

    /// Open a node at the next significant token
    fn start(&mut self, kind: FmlSyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind);
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn bump_with(&mut self, kind: Option<FmlSyntaxKind>) {
        self.flush_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.add_token(token, kind);
            self.pos += 1;
        }
    }

    fn bump(&mut self) {
        self.bump_with(None);
    }

    /// Add the next token re-tagged as a contextual keyword
    fn bump_as(&mut self, kind: FmlSyntaxKind) {
        self.bump_with(Some(kind));
    }

    fn bump_literal(&mut self) {
        if self.at_keyword("true") {
            self.bump_as(FmlSyntaxKind::TrueKw);
        } else if self.at_keyword("false") {
            self.bump_as(FmlSyntaxKind::FalseKw);
        } else {
            self.bump();
        }
    }

    /// Bump an integer cardinality bound, reporting one too large for a `u32`
    fn bump_bound(&mut self) {
        if self
            .peek()
            .is_some_and(|token| token.text.parse::<u32>().is_err())
        {
            self.error_here("cardinality bound is out of range");
        }
        self.bump();
    }

    /// Bump a contextual keyword from `modes`, reporting whether one matched
    fn bump_mode(&mut self, modes: &[(&str, FmlSyntaxKind)]) -> bool {
        match modes.iter().find(|(keyword, _)| self.at_keyword(keyword)) {
            Some(&(_, kind)) => {
                self.bump_as(kind);
                true
            }
            None => false,
        }
    }

    fn eat(&mut self, kind: FmlSyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: FmlSyntaxKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error_expected(&kind.describe());
            false
        }
    }

    fn expect_ident(&mut self) -> bool {
        if self.at_ident() {
            self.bump();
            true
        } else {
            self.error_expected("identifier");
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str, kind: FmlSyntaxKind) -> bool {
        if self.at_keyword(keyword) {
            self.bump_as(kind);
            true
        } else {
            self.error_expected(&format!("'{keyword}'"));
            false
        }
    }

    fn expect_url(&mut self) -> bool {
        if self.at_url() {
            self.bump();
            true
        } else {
            self.error_expected("url");
            false
        }
    }

    fn current_span(&self) -> CstSpan {
        self.peek()
            .map(|token| token.span.clone())
            .unwrap_or(self.source_len..self.source_len)
    }

    fn error_here(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.errors.push(SyntaxError::new(message, span));
    }

    fn error_expected(&mut self, what: &str) {
        let found = match self.peek() {
            Some(token) => format!("'{}'", token.text),
            None => "end of input".to_string(),
        };
        self.error_here(format!("expected {what}, found {found}"));
    }

    /// Wrap tokens in an ERROR node until `stop` matches a significant token
    fn skip_until(&mut self, stop: impl Fn(FmlSyntaxKind) -> bool) {
        if self.nth_kind(0).is_none_or(&stop) {
            return;
        }
        self.start(FmlSyntaxKind::Error);
        while let Some(kind) = self.nth_kind(0) {
            if stop(kind) {
                break;
            }
            self.bump();
        }
        self.finish_node();
    }

    fn recover_to_declaration(&mut self) {
        if self.at_end() {
            return;
        }
        self.start(FmlSyntaxKind::Error);
        self.bump();
        while let Some(token) = self.peek() {
            if Section::of(token).is_some() {
                break;
            }
            self.bump();
        }
        self.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::FmlSyntaxNodeExt;

    fn assert_clean(parse: &CstParse, source: &str) {
        assert!(
            !parse.has_errors(),
            "lexer: {:?}, parser: {:?}",
            parse.lexer_errors,
            parse.errors
        );
        assert_eq!(parse.root.text().to_string(), source);
    }

    #[test]
    fn test_parse_scenario_document() {
        let source = "map \"http://x/y\" = y  group g(source src, target tgt) { src -> tgt; }";
        let parse = parse_fml(source);
        assert_clean(&parse, source);

        let kinds: Vec<_> = parse.root.children().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![FmlSyntaxKind::MapDecl, FmlSyntaxKind::Group]);

        let group = parse.root.child_of_kind(FmlSyntaxKind::Group).unwrap();
        let params = group.child_of_kind(FmlSyntaxKind::ParamList).unwrap();
        assert_eq!(params.children_of_kind(FmlSyntaxKind::Param).len(), 2);
        let block = group.child_of_kind(FmlSyntaxKind::RuleBlock).unwrap();
        assert_eq!(block.children_of_kind(FmlSyntaxKind::Rule).len(), 1);
    }

    #[test]
    fn test_parse_full_header() {
        let source = r#"/// url = 'http://example.org/fhir/StructureMap/tutorial'
/// name = 'tutorial'
/// description = """Longer
text"""

conceptmap "cm" {
  prefix s = "http://s"
  prefix t = "http://t"

  s:male - t:M
  s:"fe male" == t:F
}

map "http://example.org/tutorial" = tutorial

uses "http://example.org/TLeft" alias TLeft as source
uses http://example.org/TRight as target
imports "http://example.org/other"

let x = 'a' + 'b';
"#;
        let parse = parse_fml(source);
        assert_clean(&parse, source);

        let kinds: Vec<_> = parse.root.children().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                FmlSyntaxKind::Metadata,
                FmlSyntaxKind::Metadata,
                FmlSyntaxKind::Metadata,
                FmlSyntaxKind::ConceptMap,
                FmlSyntaxKind::MapDecl,
                FmlSyntaxKind::UsesDecl,
                FmlSyntaxKind::UsesDecl,
                FmlSyntaxKind::ImportDecl,
                FmlSyntaxKind::ConstDecl,
            ]
        );

        let uses = parse.root.child_of_kind(FmlSyntaxKind::UsesDecl).unwrap();
        assert!(uses.token_of_kind(FmlSyntaxKind::AliasKw).is_some());
        assert!(uses.token_of_kind(FmlSyntaxKind::SourceKw).is_some());
    }

    #[test]
    fn test_parse_rich_rules() {
        let source = r#"group tutorial(source src : TLeft, target tgt : TRight) extends base <<type+>> {
  src.a : string 0..1 default('x') first as a where (a.exists()) check(a != '') log(a) -> tgt.a = a "copy";
  src.b as b -> tgt.b = create('Coding') as c, (b + 1) as d then {
    b -> c.code = b;
  };
  src -> tgt.c = truncate(a, 3) last then sub(src, tgt), other(b) "deps";
  src.d -> evaluate(src, (d.x)) as v;
}
"#;
        let parse = parse_fml(source);
        assert_clean(&parse, source);

        let group = parse.root.child_of_kind(FmlSyntaxKind::Group).unwrap();
        assert!(group.child_of_kind(FmlSyntaxKind::Extends).is_some());
        let mode = group.child_of_kind(FmlSyntaxKind::TypeMode).unwrap();
        assert!(mode.token_of_kind(FmlSyntaxKind::TypeKw).is_some());

        let rules = group
            .child_of_kind(FmlSyntaxKind::RuleBlock)
            .unwrap()
            .children_of_kind(FmlSyntaxKind::Rule);
        assert_eq!(rules.len(), 4);

        let source_node = rules[0]
            .child_of_kind(FmlSyntaxKind::SourceList)
            .and_then(|list| list.child_of_kind(FmlSyntaxKind::Source))
            .unwrap();
        for clause in [
            FmlSyntaxKind::TypeAnnotation,
            FmlSyntaxKind::Cardinality,
            FmlSyntaxKind::DefaultClause,
            FmlSyntaxKind::AliasClause,
            FmlSyntaxKind::WhereClause,
            FmlSyntaxKind::CheckClause,
            FmlSyntaxKind::LogClause,
        ] {
            assert!(source_node.child_of_kind(clause).is_some(), "{clause:?}");
        }
        assert!(source_node.token_of_kind(FmlSyntaxKind::FirstKw).is_some());
        assert!(rules[0].child_of_kind(FmlSyntaxKind::RuleName).is_some());

        let dependent = rules[2].child_of_kind(FmlSyntaxKind::Dependent).unwrap();
        assert_eq!(dependent.children_of_kind(FmlSyntaxKind::GroupCall).len(), 2);
    }

    #[test]
    fn test_keywords_are_contextual() {
        let source = "group source(source source, target target) { source.as as as -> target.where = as; }";
        let parse = parse_fml(source);
        assert_clean(&parse, source);
    }

    #[test]
    fn test_out_of_order_declaration_is_an_error() {
        let parse = parse_fml("group g(source s) { }\nmap \"http://x\" = x\n");
        assert_eq!(parse.errors.len(), 1);
        assert!(parse.errors[0].message.contains("'map' declaration must appear before"));
    }

    #[test]
    fn test_missing_semicolon_is_reported_once() {
        let source = "group g(source s, target t) {\n  s -> t\n}\n";
        let parse = parse_fml(source);
        assert_eq!(parse.errors.len(), 1, "{:?}", parse.errors);
        assert!(parse.errors[0].message.starts_with("expected ';' to end the rule"));
        assert_eq!(parse.root.text().to_string(), source);
    }

    #[test]
    fn test_garbage_recovers_to_next_declaration() {
        let source = "??? nonsense\nmap \"http://x\" = x\n";
        let parse = parse_fml(source);
        assert!(parse.has_errors());
        assert_eq!(parse.root.text().to_string(), source);
        assert!(parse.root.child_of_kind(FmlSyntaxKind::MapDecl).is_some());
    }

    #[test]
    fn test_oversized_cardinality_is_an_error() {
        let source = "group g(source s, target t) {\n  s.a 0..99999999999 -> t.b;\n}\n";
        let parse = parse_fml(source);
        assert_eq!(parse.errors.len(), 1, "{:?}", parse.errors);
        assert_eq!(parse.errors[0].message, "cardinality bound is out of range");
        assert_eq!(parse.root.text().to_string(), source);

        let parse = parse_fml("group g(source s) {\n  s.a 4294967295..* -> s.b;\n}\n");
        assert!(!parse.has_errors(), "{:?}", parse.errors);
    }

    #[test]
    fn test_rule_entry() {
        let parse = parse_fml_rule("  src.a as a -> tgt.a = a; // done\n");
        assert!(!parse.has_errors(), "{:?}", parse.errors);
        assert_eq!(parse.root.kind(), FmlSyntaxKind::RuleEntry);
        assert!(parse.root.child_of_kind(FmlSyntaxKind::Rule).is_some());

        let unterminated = parse_fml_rule("src -> tgt");
        assert_eq!(unterminated.errors.len(), 1);

        let trailing = parse_fml_rule("src -> tgt; extra");
        assert!(!trailing.errors.is_empty());
    }
}
