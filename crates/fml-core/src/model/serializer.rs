//! Object model to FML text
//!
//! Each node is written as: its leading hidden tokens (or a canonical
//! separator when none were captured), its own syntax with interior gaps
//! replayed from [`NodeMeta::interior`] (or canonical spacing), and its
//! trailing hidden tokens. Gap keys are computed exactly as the builder
//! computes them, so an untouched parsed node reproduces its source spacing.
//!
//! # Example
//!
//! ```rust,ignore
//! use fml_core::model::{Document, MapDeclaration, Serializer};
//!
//! let mut document = Document::new();
//! document.map = Some(MapDeclaration::new("http://example.org/map", "example"));
//! assert_eq!(
//!     Serializer::new().serialize(&document),
//!     "map \"http://example.org/map\" = example\n"
//! );
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ast::*;
use super::text::{
    format_identifier, format_path, is_plain_identifier, join_path, quote_block, quote_double,
    quote_string, split_path,
};
use super::trivia::{Gap, HiddenToken, NodeMeta};
use crate::cst::FmlSyntaxKind;
use FmlSyntaxKind as K;

/// Indent style for generated layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    #[default]
    Spaces,
    Tabs,
}

/// Layout used wherever no hidden tokens were captured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerOptions {
    /// Spaces per nesting level when indenting with spaces
    pub indent_size: usize,
    pub indent_style: IndentStyle,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            indent_size: 2,
            indent_style: IndentStyle::Spaces,
        }
    }
}

impl SerializerOptions {
    fn indent(&self, depth: usize) -> String {
        match self.indent_style {
            IndentStyle::Spaces => " ".repeat(self.indent_size * depth),
            IndentStyle::Tabs => "\t".repeat(depth),
        }
    }
}

/// Renders documents and rules as FML text
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    options: SerializerOptions,
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SerializerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SerializerOptions {
        &self.options
    }

    pub fn serialize(&self, document: &Document) -> String {
        let mut ctx = SerializeContext::new(&self.options);
        ctx.document(document);
        ctx.finish()
    }

    /// Render a single rule at top level, as accepted by rule parsing
    pub fn serialize_rule(&self, rule: &Rule) -> String {
        let mut ctx = SerializeContext::new(&self.options);
        ctx.rule(rule, 0, "");
        ctx.finish()
    }
}

/// Top-level sections, used to pick blank lines between declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Metadata,
    ConceptMap,
    Map,
    Uses,
    Imports,
    Constants,
    Groups,
}

/// Per-node position in the gap key sequence
struct Cursor<'m> {
    meta: &'m NodeMeta,
    counts: HashMap<(FmlSyntaxKind, FmlSyntaxKind), u16>,
    started: bool,
}

impl<'m> Cursor<'m> {
    fn new(meta: &'m NodeMeta) -> Self {
        Self {
            meta,
            counts: HashMap::new(),
            started: false,
        }
    }

    /// Recorded gap before the next token of this clause and kind
    fn next_gap(
        &mut self,
        clause: FmlSyntaxKind,
        kind: FmlSyntaxKind,
    ) -> Option<&'m [HiddenToken]> {
        let class = kind.gap_class();
        let count = self.counts.entry((clause, class)).or_insert(0);
        let nth = *count;
        *count += 1;
        self.meta.gap(Gap::new(clause, class, nth))
    }
}

struct SerializeContext<'o> {
    options: &'o SerializerOptions,
    output: String,
}

impl<'o> SerializeContext<'o> {
    fn new(options: &'o SerializerOptions) -> Self {
        Self {
            options,
            output: String::new(),
        }
    }

    fn finish(self) -> String {
        self.output
    }

    fn write_hidden(&mut self, tokens: &[HiddenToken]) {
        for token in tokens {
            self.output.push_str(&token.text);
        }
    }

    /// Write a canonical separator
    ///
    /// Inline spacing is skipped when the output already ends in whitespace,
    /// which happens when the previous node kept its same-line trailing run.
    fn write_default(&mut self, default: &str) {
        let inline = !default.is_empty() && default.chars().all(|c| c == ' ' || c == '\t');
        if inline && self.output.ends_with([' ', '\t', '\n']) {
            return;
        }
        self.output.push_str(default);
    }

    /// Write leading tokens or `default`, and open a cursor for the node
    fn open<'m>(&mut self, meta: &'m NodeMeta, default: &str) -> Cursor<'m> {
        match &meta.leading {
            Some(tokens) => self.write_hidden(tokens),
            None => self.write_default(default),
        }
        Cursor::new(meta)
    }

    fn close(&mut self, meta: &NodeMeta) {
        if let Some(tokens) = &meta.trailing {
            self.write_hidden(tokens);
        }
    }

    /// Write one own token, preceded by its recorded gap or `default`
    fn token(
        &mut self,
        cursor: &mut Cursor<'_>,
        clause: FmlSyntaxKind,
        kind: FmlSyntaxKind,
        text: &str,
        default: &str,
    ) {
        let gap = cursor.next_gap(clause, kind);
        if cursor.started {
            match gap {
                Some(tokens) => self.write_hidden(tokens),
                None => self.write_default(default),
            }
        }
        cursor.started = true;
        self.output.push_str(text);
    }

    fn keyword(
        &mut self,
        cursor: &mut Cursor<'_>,
        clause: FmlSyntaxKind,
        kind: FmlSyntaxKind,
        default: &str,
    ) {
        let text = kind.keyword_text().or(kind.punct_text()).unwrap_or_default();
        self.token(cursor, clause, kind, text, default);
    }

    fn identifier(
        &mut self,
        cursor: &mut Cursor<'_>,
        clause: FmlSyntaxKind,
        name: &str,
        default: &str,
    ) {
        let kind = if is_plain_identifier(name) {
            K::Ident
        } else {
            K::DelimitedIdent
        };
        self.token(cursor, clause, kind, &format_identifier(name), default);
    }

    /// Dotted name as a `QualifiedName` clause
    fn path(&mut self, cursor: &mut Cursor<'_>, path: &str, default: &str) {
        for (i, segment) in split_path(path).iter().enumerate() {
            if i == 0 {
                self.identifier(cursor, K::QualifiedName, segment, default);
            } else {
                self.keyword(cursor, K::QualifiedName, K::Dot, "");
                self.identifier(cursor, K::QualifiedName, segment, "");
            }
        }
    }

    fn url(&mut self, cursor: &mut Cursor<'_>, clause: FmlSyntaxKind, url: &str, default: &str) {
        self.token(cursor, clause, K::DoubleString, &quote_double(url), default);
    }

    fn literal(
        &mut self,
        cursor: &mut Cursor<'_>,
        clause: FmlSyntaxKind,
        literal: &Literal,
        default: &str,
    ) {
        let (kind, text) = literal_token(literal);
        self.token(cursor, clause, kind, &text, default);
    }

    /// `(expr)` as a `ParenExpr` or expression clause
    fn parenthesized(
        &mut self,
        cursor: &mut Cursor<'_>,
        clause: FmlSyntaxKind,
        expression: &str,
        default: &str,
    ) {
        self.keyword(cursor, clause, K::LParen, default);
        if !expression.is_empty() {
            self.token(cursor, clause, K::Expression, expression, "");
        }
        self.keyword(cursor, clause, K::RParen, "");
    }

    fn arguments(&mut self, cursor: &mut Cursor<'_>, params: &[Param]) {
        self.keyword(cursor, K::ArgList, K::LParen, "");
        for (i, param) in params.iter().enumerate() {
            let default = if i == 0 { "" } else { " " };
            if i > 0 {
                self.keyword(cursor, K::ArgList, K::Comma, "");
            }
            match param {
                Param::Literal(literal) => self.literal(cursor, K::ArgList, literal, default),
                Param::Identifier(name) => self.path(cursor, name, default),
                Param::Expression(expression) => {
                    self.parenthesized(cursor, K::ParenExpr, expression, default)
                }
            }
        }
        self.keyword(cursor, K::ArgList, K::RParen, "");
    }

    // Document

    fn document(&mut self, document: &Document) {
        let mut previous = None;

        for metadata in &document.metadata {
            let default = separator(&mut previous, Section::Metadata);
            self.metadata(metadata, default);
        }
        for concept_map in &document.concept_maps {
            let default = separator(&mut previous, Section::ConceptMap);
            self.concept_map(concept_map, default);
        }
        if let Some(map) = &document.map {
            let default = separator(&mut previous, Section::Map);
            self.map_declaration(map, default);
        }
        for structure in &document.structures {
            let default = separator(&mut previous, Section::Uses);
            self.structure(structure, default);
        }
        for import in &document.imports {
            let default = separator(&mut previous, Section::Imports);
            self.import(import, default);
        }
        for constant in &document.constants {
            let default = separator(&mut previous, Section::Constants);
            self.constant(constant, default);
        }
        for group in &document.groups {
            let default = separator(&mut previous, Section::Groups);
            self.group(group, default);
        }

        match &document.meta.trailing {
            Some(tokens) => self.write_hidden(tokens),
            None => self.output.push('\n'),
        }
    }

    fn metadata(&mut self, metadata: &Metadata, default: &str) {
        let mut c = self.open(&metadata.meta, default);
        self.keyword(&mut c, K::Metadata, K::MetadataPrefix, "");
        self.path(&mut c, &metadata.key, " ");
        self.keyword(&mut c, K::Metadata, K::Equals, " ");
        match &metadata.value {
            Some(MetadataValue::Literal(literal)) => {
                self.literal(&mut c, K::Metadata, literal, " ")
            }
            Some(MetadataValue::Markdown(text)) => {
                self.token(&mut c, K::Metadata, K::BlockString, &quote_block(text), " ")
            }
            None => {}
        }
        self.close(&metadata.meta);
    }

    fn concept_map(&mut self, concept_map: &ConceptMap, default: &str) {
        let mut c = self.open(&concept_map.meta, default);
        self.keyword(&mut c, K::ConceptMap, K::ConceptmapKw, "");
        self.url(&mut c, K::ConceptMap, &concept_map.url, " ");
        self.keyword(&mut c, K::ConceptMap, K::LBrace, " ");

        let line = format!("\n{}", self.options.indent(1));
        for prefix in &concept_map.prefixes {
            self.concept_map_prefix(prefix, &line);
        }
        for (i, mapping) in concept_map.mappings.iter().enumerate() {
            if i == 0 && !concept_map.prefixes.is_empty() {
                self.concept_mapping(mapping, &format!("\n{line}"));
            } else {
                self.concept_mapping(mapping, &line);
            }
        }

        self.keyword(&mut c, K::ConceptMap, K::RBrace, "\n");
        self.close(&concept_map.meta);
    }

    fn concept_map_prefix(&mut self, prefix: &ConceptMapPrefix, default: &str) {
        let mut c = self.open(&prefix.meta, default);
        self.keyword(&mut c, K::ConceptMapPrefix, K::PrefixKw, "");
        self.identifier(&mut c, K::ConceptMapPrefix, &prefix.name, " ");
        self.keyword(&mut c, K::ConceptMapPrefix, K::Equals, " ");
        self.url(&mut c, K::ConceptMapPrefix, &prefix.url, " ");
        self.close(&prefix.meta);
    }

    fn concept_mapping(&mut self, mapping: &ConceptMapping, default: &str) {
        let mut c = self.open(&mapping.meta, default);
        self.concept_map_side(
            &mut c,
            K::ConceptMapSource,
            &mapping.source_prefix,
            &mapping.source_code,
            "",
        );
        let relationship = relationship_kind(mapping.relationship);
        self.token(&mut c, K::ConceptMapping, relationship, mapping.relationship.symbol(), " ");
        self.concept_map_side(
            &mut c,
            K::ConceptMapTarget,
            &mapping.target_prefix,
            &mapping.target_code,
            " ",
        );
        self.close(&mapping.meta);
    }

    fn concept_map_side(
        &mut self,
        c: &mut Cursor<'_>,
        clause: FmlSyntaxKind,
        prefix: &str,
        code: &str,
        default: &str,
    ) {
        self.identifier(c, clause, prefix, default);
        self.keyword(c, clause, K::Colon, "");
        if is_plain_identifier(code) {
            self.token(c, clause, K::Ident, code, "");
        } else if !code.is_empty() && code.chars().all(|ch| ch.is_ascii_digit()) {
            self.token(c, clause, K::Integer, code, "");
        } else {
            self.token(c, clause, K::DoubleString, &quote_double(code), "");
        }
    }

    fn map_declaration(&mut self, map: &MapDeclaration, default: &str) {
        let mut c = self.open(&map.meta, default);
        self.keyword(&mut c, K::MapDecl, K::MapKw, "");
        self.url(&mut c, K::MapDecl, &map.url, " ");
        self.keyword(&mut c, K::MapDecl, K::Equals, " ");
        if map.quoted_name {
            self.token(&mut c, K::MapDecl, K::DoubleString, &quote_double(&map.name), " ");
        } else {
            self.identifier(&mut c, K::MapDecl, &map.name, " ");
        }
        self.close(&map.meta);
    }

    fn structure(&mut self, structure: &Structure, default: &str) {
        let mut c = self.open(&structure.meta, default);
        self.keyword(&mut c, K::UsesDecl, K::UsesKw, "");
        self.url(&mut c, K::UsesDecl, &structure.url, " ");
        if let Some(alias) = &structure.alias {
            self.keyword(&mut c, K::UsesDecl, K::AliasKw, " ");
            self.identifier(&mut c, K::UsesDecl, alias, " ");
        }
        self.keyword(&mut c, K::UsesDecl, K::AsKw, " ");
        let mode = match structure.mode {
            StructureMode::Source => K::SourceKw,
            StructureMode::Queried => K::QueriedKw,
            StructureMode::Target => K::TargetKw,
            StructureMode::Produced => K::ProducedKw,
        };
        self.keyword(&mut c, K::UsesDecl, mode, " ");
        self.close(&structure.meta);
    }

    fn import(&mut self, import: &Import, default: &str) {
        let mut c = self.open(&import.meta, default);
        self.keyword(&mut c, K::ImportDecl, K::ImportsKw, "");
        self.url(&mut c, K::ImportDecl, &import.url, " ");
        self.close(&import.meta);
    }

    fn constant(&mut self, constant: &Constant, default: &str) {
        let mut c = self.open(&constant.meta, default);
        self.keyword(&mut c, K::ConstDecl, K::LetKw, "");
        self.identifier(&mut c, K::ConstDecl, &constant.name, " ");
        self.keyword(&mut c, K::ConstDecl, K::Equals, " ");
        self.token(&mut c, K::ConstDecl, K::Expression, &constant.expression, " ");
        self.keyword(&mut c, K::ConstDecl, K::Semicolon, "");
        self.close(&constant.meta);
    }

    // Groups and rules

    fn group(&mut self, group: &Group, default: &str) {
        let mut c = self.open(&group.meta, default);
        self.keyword(&mut c, K::Group, K::GroupKw, "");
        self.identifier(&mut c, K::Group, &group.name, " ");

        self.keyword(&mut c, K::ParamList, K::LParen, "");
        for (i, parameter) in group.parameters.iter().enumerate() {
            if i > 0 {
                self.keyword(&mut c, K::ParamList, K::Comma, "");
            }
            self.parameter(parameter, if i == 0 { "" } else { " " });
        }
        self.keyword(&mut c, K::ParamList, K::RParen, "");

        if let Some(extends) = &group.extends {
            self.keyword(&mut c, K::Extends, K::ExtendsKw, " ");
            self.identifier(&mut c, K::Extends, extends, " ");
        }

        if let Some(mode) = group.type_mode {
            self.keyword(&mut c, K::TypeMode, K::DoubleLt, " ");
            match mode {
                GroupTypeMode::Types => self.keyword(&mut c, K::TypeMode, K::TypesKw, ""),
                GroupTypeMode::TypeAndTypes => {
                    self.keyword(&mut c, K::TypeMode, K::TypeKw, "");
                    self.keyword(&mut c, K::TypeMode, K::Plus, "");
                }
            }
            self.keyword(&mut c, K::TypeMode, K::DoubleGt, "");
        }

        self.rule_block(&mut c, &group.rules, 1);
        self.close(&group.meta);
    }

    fn parameter(&mut self, parameter: &Parameter, default: &str) {
        let mut c = self.open(&parameter.meta, default);
        let mode = match parameter.mode {
            ParameterMode::Source => K::SourceKw,
            ParameterMode::Target => K::TargetKw,
        };
        self.keyword(&mut c, K::Param, mode, "");
        self.identifier(&mut c, K::Param, &parameter.name, " ");
        if let Some(type_name) = &parameter.type_name {
            self.type_annotation(&mut c, type_name);
        }
        self.close(&parameter.meta);
    }

    fn type_annotation(&mut self, c: &mut Cursor<'_>, type_name: &str) {
        self.keyword(c, K::TypeAnnotation, K::Colon, " ");
        self.identifier(c, K::TypeAnnotation, type_name, " ");
    }

    /// `{ rules }` with rules at `depth`
    fn rule_block(&mut self, c: &mut Cursor<'_>, rules: &[Rule], depth: usize) {
        self.keyword(c, K::RuleBlock, K::LBrace, " ");
        let line = format!("\n{}", self.options.indent(depth));
        for rule in rules {
            self.rule(rule, depth, &line);
        }
        let close = format!("\n{}", self.options.indent(depth.saturating_sub(1)));
        self.keyword(c, K::RuleBlock, K::RBrace, &close);
    }

    fn rule(&mut self, rule: &Rule, depth: usize, default: &str) {
        let mut c = self.open(&rule.meta, default);

        for (i, source) in rule.sources.iter().enumerate() {
            if i > 0 {
                self.keyword(&mut c, K::SourceList, K::Comma, "");
            }
            self.rule_source(source, if i == 0 { "" } else { " " });
            c.started = true;
        }

        if !rule.targets.is_empty() {
            let arrow = if rule.sources.is_empty() { "" } else { " " };
            self.keyword(&mut c, K::Rule, K::Arrow, arrow);
            for (i, target) in rule.targets.iter().enumerate() {
                if i > 0 {
                    self.keyword(&mut c, K::TargetList, K::Comma, "");
                }
                self.rule_target(target, " ");
            }
        }

        if let Some(dependent) = &rule.dependent {
            self.dependent(dependent, depth);
        }

        if let Some(name) = &rule.name {
            self.token(&mut c, K::RuleName, K::DoubleString, &quote_double(name), " ");
        }

        self.keyword(&mut c, K::Rule, K::Semicolon, "");
        self.close(&rule.meta);
    }

    fn rule_source(&mut self, source: &RuleSource, default: &str) {
        let mut c = self.open(&source.meta, default);
        self.path(&mut c, &qualified(&source.context, source.path.as_deref()), "");

        if let Some(type_name) = &source.type_name {
            self.type_annotation(&mut c, type_name);
        }

        if let Some(cardinality) = source.cardinality {
            self.token(&mut c, K::Cardinality, K::Integer, &cardinality.min.to_string(), " ");
            self.keyword(&mut c, K::Cardinality, K::DotDot, "");
            match cardinality.max {
                Max::Bounded(max) => {
                    self.token(&mut c, K::Cardinality, K::Integer, &max.to_string(), "")
                }
                Max::Unbounded => self.keyword(&mut c, K::Cardinality, K::Star, ""),
            }
        }

        if let Some(default_value) = &source.default_value {
            self.expression_clause(&mut c, K::DefaultClause, K::DefaultKw, default_value);
        }

        if let Some(mode) = source.list_mode {
            let kind = match mode {
                SourceListMode::First => K::FirstKw,
                SourceListMode::NotFirst => K::NotFirstKw,
                SourceListMode::Last => K::LastKw,
                SourceListMode::NotLast => K::NotLastKw,
                SourceListMode::OnlyOne => K::OnlyOneKw,
            };
            self.keyword(&mut c, K::Source, kind, " ");
        }

        if let Some(variable) = &source.variable {
            self.alias(&mut c, variable);
        }
        if let Some(condition) = &source.condition {
            self.expression_clause(&mut c, K::WhereClause, K::WhereKw, condition);
        }
        if let Some(check) = &source.check {
            self.expression_clause(&mut c, K::CheckClause, K::CheckKw, check);
        }
        if let Some(log) = &source.log {
            self.expression_clause(&mut c, K::LogClause, K::LogKw, log);
        }

        self.close(&source.meta);
    }

    fn expression_clause(
        &mut self,
        c: &mut Cursor<'_>,
        clause: FmlSyntaxKind,
        keyword: FmlSyntaxKind,
        expression: &str,
    ) {
        self.keyword(c, clause, keyword, " ");
        self.parenthesized(c, clause, expression, "");
    }

    fn alias(&mut self, c: &mut Cursor<'_>, variable: &str) {
        self.keyword(c, K::AliasClause, K::AsKw, " ");
        self.identifier(c, K::AliasClause, variable, " ");
    }

    fn rule_target(&mut self, target: &RuleTarget, default: &str) {
        let mut c = self.open(&target.meta, default);

        if target.is_bare() {
            if let Some(transform) = &target.transform {
                self.transform(transform, "", true);
                c.started = true;
            }
        } else {
            self.path(&mut c, &qualified(&target.context, target.path.as_deref()), "");
            if let Some(transform) = &target.transform {
                self.keyword(&mut c, K::Target, K::Equals, " ");
                self.transform(transform, " ", false);
            }
        }

        if let Some(variable) = &target.variable {
            self.alias(&mut c, variable);
        }
        if let Some(mode) = target.list_mode {
            let kind = match mode {
                TargetListMode::First => K::FirstKw,
                TargetListMode::Share => K::ShareKw,
                TargetListMode::Last => K::LastKw,
                TargetListMode::Single => K::SingleKw,
            };
            self.keyword(&mut c, K::Target, kind, " ");
        }

        self.close(&target.meta);
    }

    /// A bare transform stands in for the whole target, so plain copies are
    /// wrapped in parentheses to keep them from reading as a context
    fn transform(&mut self, transform: &Transform, default: &str, bare: bool) {
        let mut c = self.open(&transform.meta, default);
        match &transform.kind {
            TransformKind::Evaluate(expression) => {
                self.parenthesized(&mut c, K::ParenExpr, expression, "")
            }
            TransformKind::Invoke { function, params } => {
                self.identifier(&mut c, K::CallExpr, function, "");
                self.arguments(&mut c, params);
            }
            TransformKind::Literal(literal) if bare => {
                let (_, text) = literal_token(literal);
                self.parenthesized(&mut c, K::ParenExpr, &text, "");
            }
            TransformKind::Identifier(name) if bare => {
                self.parenthesized(&mut c, K::ParenExpr, &format_path(name), "");
            }
            TransformKind::Literal(literal) => self.literal(&mut c, K::Transform, literal, ""),
            TransformKind::Identifier(name) => self.path(&mut c, name, ""),
        }
        self.close(&transform.meta);
    }

    fn dependent(&mut self, dependent: &RuleDependent, depth: usize) {
        let mut c = self.open(&dependent.meta, " ");
        self.keyword(&mut c, K::Dependent, K::ThenKw, "");

        for (i, invocation) in dependent.invocations.iter().enumerate() {
            if i > 0 {
                self.keyword(&mut c, K::Dependent, K::Comma, "");
            }
            self.group_call(invocation);
        }

        if !dependent.rules.is_empty() || dependent.invocations.is_empty() {
            self.rule_block(&mut c, &dependent.rules, depth + 1);
        }

        self.close(&dependent.meta);
    }

    fn group_call(&mut self, invocation: &GroupInvocation) {
        let mut c = self.open(&invocation.meta, " ");
        self.identifier(&mut c, K::GroupCall, &invocation.name, "");
        self.arguments(&mut c, &invocation.params);
        self.close(&invocation.meta);
    }
}

/// Canonical separator before a top-level declaration
fn separator(previous: &mut Option<Section>, section: Section) -> &'static str {
    let default = match *previous {
        None => "",
        Some(_) if matches!(section, Section::ConceptMap | Section::Groups) => "\n\n",
        Some(last) if last == section => "\n",
        Some(_) => "\n\n",
    };
    *previous = Some(section);
    default
}

fn qualified(context: &str, path: Option<&str>) -> String {
    let context = join_path(&[context]);
    match path {
        Some(path) => format!("{context}.{path}"),
        None => context,
    }
}

fn relationship_kind(relationship: Relationship) -> FmlSyntaxKind {
    match relationship {
        Relationship::RelatedTo => K::Minus,
        Relationship::Equivalent => K::EqEq,
        Relationship::Equal => K::Equals,
        Relationship::NotRelatedTo => K::NotEq,
        Relationship::SourceIsNarrowerThanTarget => K::LtEq,
        Relationship::SourceIsBroaderThanTarget => K::GtEq,
    }
}

fn literal_token(literal: &Literal) -> (FmlSyntaxKind, String) {
    match literal {
        Literal::String(value) => (K::String, quote_string(value)),
        Literal::Integer(value) => (K::Integer, value.to_string()),
        Literal::Decimal(value) => (K::Decimal, value.clone()),
        Literal::Boolean(true) => (K::TrueKw, "true".to_string()),
        Literal::Boolean(false) => (K::FalseKw, "false".to_string()),
        Literal::Date(value) => (K::Date, format!("@{value}")),
        Literal::DateTime(value) => (K::DateTime, format!("@{value}")),
        Literal::Time(value) => (K::Time, format!("@T{value}")),
    }
}
