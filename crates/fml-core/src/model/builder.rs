//! Builds the object model from a CST, claiming hidden tokens as it goes
//!
//! Visitation is left-to-right pre-order over the model nodes of the tree
//! (see [`FmlSyntaxKind::is_model_node`]). For each node the builder
//!
//! 1. claims the unclaimed hidden run left of the node's first token as its
//!    leading tokens,
//! 2. walks its own tokens, recording the run left of each one (except the
//!    first) as an interior gap, and recursing into child model nodes in
//!    place,
//! 3. claims the run right of its last token, up to the first line break, as
//!    its trailing tokens.
//!
//! Whatever is left when the root finishes goes to the document's trailing
//! bucket, so every hidden token ends up owned exactly once.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::ast::*;
use super::claims::ClaimTracker;
use super::text::{join_path, unquote, unquote_block};
use super::trivia::{Gap, HiddenToken, NodeMeta, Position};
use crate::cst::{
    FmlSyntaxKind, FmlSyntaxNode, FmlSyntaxNodeExt, FmlSyntaxToken, NodeOrToken, TokenStream,
};

/// Converts byte offsets into 1-based line and column numbers
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(offset, _)| offset + 1))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    /// Line and column of `offset`, columns counted in characters
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.source.len());
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        let column = self
            .source
            .get(line_start..offset)
            .map(|text| text.chars().count())
            .unwrap_or(0);
        (line + 1, column + 1)
    }
}

type GapCounts = HashMap<(FmlSyntaxKind, FmlSyntaxKind), u16>;

/// Walks a CST and produces model nodes
///
/// One builder serves one parse: it owns the claim tracker for that parse's
/// token stream and is consumed by [`ModelBuilder::build_document`] or
/// [`ModelBuilder::build_rule_entry`].
pub struct ModelBuilder<'a> {
    tokens: &'a TokenStream,
    lines: LineIndex<'a>,
    claims: ClaimTracker,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(source: &'a str, tokens: &'a TokenStream) -> Self {
        Self {
            tokens,
            lines: LineIndex::new(source),
            claims: ClaimTracker::new(tokens.len()),
        }
    }

    /// Build a document from a `Document` root
    ///
    /// Returns `None` if the root is not a document or the tree does not have
    /// the shape the parser produces for valid input.
    pub fn build_document(mut self, root: &FmlSyntaxNode) -> Option<Document> {
        if root.kind() != FmlSyntaxKind::Document {
            debug!("Expected a Document root, found {}", root.kind());
            return None;
        }

        let mut document = Document::new();
        for child in root.children() {
            match child.kind() {
                FmlSyntaxKind::Metadata => document.metadata.push(self.metadata(&child)?),
                FmlSyntaxKind::ConceptMap => document.concept_maps.push(self.concept_map(&child)?),
                FmlSyntaxKind::MapDecl => document.map = Some(self.map_declaration(&child)?),
                FmlSyntaxKind::UsesDecl => document.structures.push(self.structure(&child)?),
                FmlSyntaxKind::ImportDecl => document.imports.push(self.import(&child)?),
                FmlSyntaxKind::ConstDecl => document.constants.push(self.constant(&child)?),
                FmlSyntaxKind::Group => document.groups.push(self.group(&child)?),
                other => {
                    debug!("Unexpected {other} at document level");
                    return None;
                }
            }
        }

        document.meta.position = Some(self.span_position(0, self.lines.source.len()));
        document.meta.trailing = Some(self.sweep());

        debug!(
            "Built document with {} declarations, {} of {} tokens claimed",
            document.declaration_count(),
            self.claims.claimed_count(),
            self.tokens.len()
        );
        Some(document)
    }

    /// Build a single rule from a `RuleEntry` root
    ///
    /// Hidden tokens left over after the rule are appended to its trailing
    /// tokens.
    pub fn build_rule_entry(mut self, root: &FmlSyntaxNode) -> Option<Rule> {
        if root.kind() != FmlSyntaxKind::RuleEntry {
            debug!("Expected a RuleEntry root, found {}", root.kind());
            return None;
        }
        let node = root.child_of_kind(FmlSyntaxKind::Rule)?;
        let mut rule = self.rule(&node)?;

        let leftovers = self.sweep();
        if !leftovers.is_empty() {
            rule.meta
                .trailing
                .get_or_insert_with(Vec::new)
                .extend(leftovers);
        }
        Some(rule)
    }

    // Declarations

    fn metadata(&mut self, node: &FmlSyntaxNode) -> Option<Metadata> {
        let meta = self.visit(node, leaf)?;
        let key = node
            .child_of_kind(FmlSyntaxKind::QualifiedName)
            .and_then(|name| qualified_name(&name))?;
        let value = own_tokens(node).into_iter().find_map(|token| {
            if token.kind() == FmlSyntaxKind::BlockString {
                Some(MetadataValue::Markdown(unquote_block(token.text())))
            } else {
                literal(&token).map(MetadataValue::Literal)
            }
        });
        Some(Metadata { key, value, meta })
    }

    fn concept_map(&mut self, node: &FmlSyntaxNode) -> Option<ConceptMap> {
        let mut concept_map = ConceptMap::default();
        concept_map.meta = self.visit(node, |this, child| {
            match child.kind() {
                FmlSyntaxKind::ConceptMapPrefix => {
                    concept_map.prefixes.push(this.concept_map_prefix(child)?)
                }
                FmlSyntaxKind::ConceptMapping => {
                    concept_map.mappings.push(this.concept_mapping(child)?)
                }
                _ => return None,
            }
            Some(())
        })?;

        let name = own_tokens(node)
            .into_iter()
            .find(|token| is_url(token.kind()) || is_identifier(token.kind()))?;
        concept_map.url = if is_url(name.kind()) {
            url(&name)
        } else {
            identifier(&name)
        };
        Some(concept_map)
    }

    fn concept_map_prefix(&mut self, node: &FmlSyntaxNode) -> Option<ConceptMapPrefix> {
        let meta = self.visit(node, leaf)?;
        let tokens = own_tokens(node);
        let name = tokens.iter().find(|t| is_identifier(t.kind()))?;
        let target = tokens.iter().find(|t| is_url(t.kind()))?;
        Some(ConceptMapPrefix {
            name: identifier(name),
            url: url(target),
            meta,
        })
    }

    fn concept_mapping(&mut self, node: &FmlSyntaxNode) -> Option<ConceptMapping> {
        let meta = self.visit(node, leaf)?;
        let (source_prefix, source_code) =
            concept_map_side(&node.child_of_kind(FmlSyntaxKind::ConceptMapSource)?)?;
        let (target_prefix, target_code) =
            concept_map_side(&node.child_of_kind(FmlSyntaxKind::ConceptMapTarget)?)?;
        let relationship = own_tokens(node)
            .iter()
            .find_map(|token| Relationship::from_symbol(token.text()))?;
        Some(ConceptMapping {
            source_prefix,
            source_code,
            relationship,
            target_prefix,
            target_code,
            meta,
        })
    }

    fn map_declaration(&mut self, node: &FmlSyntaxNode) -> Option<MapDeclaration> {
        let meta = self.visit(node, leaf)?;
        let tokens = own_tokens(node);
        let target = tokens.iter().find(|t| is_url(t.kind()))?;
        let name = tokens.iter().skip_while(|t| t.kind() != FmlSyntaxKind::Equals).nth(1)?;
        let quoted_name = matches!(
            name.kind(),
            FmlSyntaxKind::String | FmlSyntaxKind::DoubleString
        );
        Some(MapDeclaration {
            url: url(target),
            name: if quoted_name {
                unquote(name.text())
            } else {
                identifier(name)
            },
            quoted_name,
            meta,
        })
    }

    fn structure(&mut self, node: &FmlSyntaxNode) -> Option<Structure> {
        let meta = self.visit(node, leaf)?;
        let tokens = own_tokens(node);
        let target = tokens.iter().find(|t| is_url(t.kind()))?;
        let alias = token_after(&tokens, FmlSyntaxKind::AliasKw).map(identifier);
        let mode = tokens.iter().find_map(|token| match token.kind() {
            FmlSyntaxKind::SourceKw => Some(StructureMode::Source),
            FmlSyntaxKind::QueriedKw => Some(StructureMode::Queried),
            FmlSyntaxKind::TargetKw => Some(StructureMode::Target),
            FmlSyntaxKind::ProducedKw => Some(StructureMode::Produced),
            _ => None,
        })?;
        Some(Structure {
            url: url(target),
            alias,
            mode,
            meta,
        })
    }

    fn import(&mut self, node: &FmlSyntaxNode) -> Option<Import> {
        let meta = self.visit(node, leaf)?;
        let target = own_tokens(node).into_iter().find(|t| is_url(t.kind()))?;
        Some(Import {
            url: url(&target),
            meta,
        })
    }

    fn constant(&mut self, node: &FmlSyntaxNode) -> Option<Constant> {
        let meta = self.visit(node, leaf)?;
        let tokens = own_tokens(node);
        let name = tokens.iter().find(|t| is_identifier(t.kind()))?;
        let expression = tokens
            .iter()
            .find(|t| t.kind() == FmlSyntaxKind::Expression)?;
        Some(Constant {
            name: identifier(name),
            expression: expression.text().to_string(),
            meta,
        })
    }

    fn group(&mut self, node: &FmlSyntaxNode) -> Option<Group> {
        let mut group = Group::default();
        group.meta = self.visit(node, |this, child| {
            match child.kind() {
                FmlSyntaxKind::Param => group.parameters.push(this.parameter(child)?),
                FmlSyntaxKind::Rule => group.rules.push(this.rule(child)?),
                _ => return None,
            }
            Some(())
        })?;

        group.name = own_tokens(node)
            .iter()
            .find(|t| is_identifier(t.kind()))
            .map(identifier)?;
        group.extends = node
            .child_of_kind(FmlSyntaxKind::Extends)
            .and_then(|extends| first_identifier(&extends));
        group.type_mode = node.child_of_kind(FmlSyntaxKind::TypeMode).and_then(|mode| {
            if mode.token_of_kind(FmlSyntaxKind::TypesKw).is_some() {
                Some(GroupTypeMode::Types)
            } else if mode.token_of_kind(FmlSyntaxKind::TypeKw).is_some() {
                Some(GroupTypeMode::TypeAndTypes)
            } else {
                None
            }
        });

        trace!("Group '{}' with {} rules", group.name, group.rules.len());
        Some(group)
    }

    fn parameter(&mut self, node: &FmlSyntaxNode) -> Option<Parameter> {
        let meta = self.visit(node, leaf)?;
        let tokens = own_tokens(node);
        let mode = tokens.iter().find_map(|token| match token.kind() {
            FmlSyntaxKind::SourceKw => Some(ParameterMode::Source),
            FmlSyntaxKind::TargetKw => Some(ParameterMode::Target),
            _ => None,
        })?;
        let name = tokens.iter().find(|t| is_identifier(t.kind()))?;
        Some(Parameter {
            mode,
            name: identifier(name),
            type_name: type_annotation(node),
            resolved: None,
            meta,
        })
    }

    // Rules

    fn rule(&mut self, node: &FmlSyntaxNode) -> Option<Rule> {
        let mut rule = Rule::default();
        rule.meta = self.visit(node, |this, child| {
            match child.kind() {
                FmlSyntaxKind::Source => rule.sources.push(this.rule_source(child)?),
                FmlSyntaxKind::Target => rule.targets.push(this.rule_target(child)?),
                FmlSyntaxKind::Dependent => rule.dependent = Some(this.dependent(child)?),
                _ => return None,
            }
            Some(())
        })?;

        rule.name = node
            .child_of_kind(FmlSyntaxKind::RuleName)
            .and_then(|name| name.first_significant_child_token())
            .map(|token| {
                if is_identifier(token.kind()) {
                    identifier(&token)
                } else {
                    unquote(token.text())
                }
            });
        Some(rule)
    }

    fn rule_source(&mut self, node: &FmlSyntaxNode) -> Option<RuleSource> {
        let meta = self.visit(node, leaf)?;
        let (context, path) = context_and_path(&node.child_of_kind(FmlSyntaxKind::QualifiedName)?)?;

        let cardinality = node
            .child_of_kind(FmlSyntaxKind::Cardinality)
            .and_then(|cardinality| {
                let tokens = own_tokens(&cardinality);
                let min = tokens.first()?.text().parse().ok()?;
                let max = match tokens.last()? {
                    token if token.kind() == FmlSyntaxKind::Star => Max::Unbounded,
                    token => Max::Bounded(token.text().parse().ok()?),
                };
                Some(Cardinality { min, max })
            });

        let list_mode = own_tokens(node)
            .iter()
            .find_map(|token| match token.kind() {
                FmlSyntaxKind::FirstKw => Some(SourceListMode::First),
                FmlSyntaxKind::NotFirstKw => Some(SourceListMode::NotFirst),
                FmlSyntaxKind::LastKw => Some(SourceListMode::Last),
                FmlSyntaxKind::NotLastKw => Some(SourceListMode::NotLast),
                FmlSyntaxKind::OnlyOneKw => Some(SourceListMode::OnlyOne),
                _ => None,
            });

        Some(RuleSource {
            context,
            path,
            type_name: type_annotation(node),
            cardinality,
            default_value: clause_expression(node, FmlSyntaxKind::DefaultClause),
            list_mode,
            variable: alias(node),
            condition: clause_expression(node, FmlSyntaxKind::WhereClause),
            check: clause_expression(node, FmlSyntaxKind::CheckClause),
            log: clause_expression(node, FmlSyntaxKind::LogClause),
            meta,
        })
    }

    fn rule_target(&mut self, node: &FmlSyntaxNode) -> Option<RuleTarget> {
        let mut transform = None;
        let meta = self.visit(node, |this, child| {
            if child.kind() != FmlSyntaxKind::Transform {
                return None;
            }
            transform = Some(this.transform(child)?);
            Some(())
        })?;

        let (context, path) = match node.child_of_kind(FmlSyntaxKind::QualifiedName) {
            Some(name) => context_and_path(&name)?,
            None => (String::new(), None),
        };
        let list_mode = own_tokens(node)
            .iter()
            .find_map(|token| match token.kind() {
                FmlSyntaxKind::FirstKw => Some(TargetListMode::First),
                FmlSyntaxKind::ShareKw => Some(TargetListMode::Share),
                FmlSyntaxKind::LastKw => Some(TargetListMode::Last),
                FmlSyntaxKind::SingleKw => Some(TargetListMode::Single),
                _ => None,
            });

        Some(RuleTarget {
            context,
            path,
            transform,
            variable: alias(node),
            list_mode,
            meta,
        })
    }

    fn transform(&mut self, node: &FmlSyntaxNode) -> Option<Transform> {
        let meta = self.visit(node, leaf)?;
        let kind = if let Some(paren) = node.child_of_kind(FmlSyntaxKind::ParenExpr) {
            TransformKind::Evaluate(paren_expression(&paren))
        } else if let Some(call) = node.child_of_kind(FmlSyntaxKind::CallExpr) {
            TransformKind::Invoke {
                function: first_identifier(&call)?,
                params: arguments(&call)?,
            }
        } else if let Some(name) = node.child_of_kind(FmlSyntaxKind::QualifiedName) {
            TransformKind::Identifier(qualified_name(&name)?)
        } else {
            TransformKind::Literal(own_tokens(node).iter().find_map(literal)?)
        };
        Some(Transform { kind, meta })
    }

    fn dependent(&mut self, node: &FmlSyntaxNode) -> Option<RuleDependent> {
        let mut dependent = RuleDependent::default();
        dependent.meta = self.visit(node, |this, child| {
            match child.kind() {
                FmlSyntaxKind::GroupCall => dependent.invocations.push(this.group_call(child)?),
                FmlSyntaxKind::Rule => dependent.rules.push(this.rule(child)?),
                _ => return None,
            }
            Some(())
        })?;
        Some(dependent)
    }

    fn group_call(&mut self, node: &FmlSyntaxNode) -> Option<GroupInvocation> {
        let meta = self.visit(node, leaf)?;
        Some(GroupInvocation {
            name: first_identifier(node)?,
            params: arguments(node)?,
            meta,
        })
    }

    // Hidden token claims

    /// Capture leading, interior and trailing tokens of a model node,
    /// handing child model nodes to `on_child` in source order
    fn visit<F>(&mut self, node: &FmlSyntaxNode, mut on_child: F) -> Option<NodeMeta>
    where
        F: FnMut(&mut Self, &FmlSyntaxNode) -> Option<()>,
    {
        let significant = node.significant_tokens();
        let first = self.index_of(significant.first()?)?;
        let last_token = significant.last()?;
        let last = self.index_of(last_token)?;

        let mut meta = NodeMeta {
            position: Some(self.span_position(
                usize::from(significant.first()?.text_range().start()),
                usize::from(last_token.text_range().end()),
            )),
            ..NodeMeta::default()
        };

        let leading = self.claim_left_run(first);
        if !leading.is_empty() {
            meta.leading = Some(leading);
        }

        let mut counts = GapCounts::new();
        self.walk(node, first, &mut counts, &mut meta, &mut on_child)?;

        let trailing = self.claim_right_run(last);
        if !trailing.is_empty() {
            meta.trailing = Some(trailing);
        }
        Some(meta)
    }

    fn walk<F>(
        &mut self,
        node: &FmlSyntaxNode,
        first: usize,
        counts: &mut GapCounts,
        meta: &mut NodeMeta,
        on_child: &mut F,
    ) -> Option<()>
    where
        F: FnMut(&mut Self, &FmlSyntaxNode) -> Option<()>,
    {
        for element in node.children_with_tokens() {
            match element {
                NodeOrToken::Token(token) => {
                    if token.kind().is_trivia() {
                        continue;
                    }
                    let class = token.kind().gap_class();
                    let count = counts.entry((node.kind(), class)).or_insert(0);
                    let nth = *count;
                    *count += 1;

                    let index = self.index_of(&token)?;
                    if index != first {
                        let run = self.claim_left_run(index);
                        meta.interior.push((Gap::new(node.kind(), class, nth), run));
                    }
                }
                NodeOrToken::Node(child) if child.kind().is_model_node() => {
                    on_child(self, &child)?;
                }
                NodeOrToken::Node(child) => {
                    self.walk(&child, first, counts, meta, on_child)?;
                }
            }
        }
        Some(())
    }

    fn index_of(&self, token: &FmlSyntaxToken) -> Option<usize> {
        self.tokens
            .index_at(usize::from(token.text_range().start()))
    }

    /// Claim the unclaimed hidden tokens directly before `index`
    fn claim_left_run(&mut self, index: usize) -> Vec<HiddenToken> {
        let mut start = index;
        while start > 0 && self.tokens.is_hidden(start - 1) && !self.claims.is_claimed(start - 1) {
            start -= 1;
        }

        let mut run = Vec::with_capacity(index - start);
        for i in start..index {
            if self.claims.claim_left(i) {
                run.extend(self.hidden(i));
            }
        }
        run
    }

    /// Claim the unclaimed hidden tokens directly after `index`, stopping
    /// before the first one that contains a line break
    fn claim_right_run(&mut self, index: usize) -> Vec<HiddenToken> {
        let mut run = Vec::new();
        let mut i = index + 1;
        while let Some(token) = self.tokens.get(i) {
            if !token.kind.is_trivia()
                || token.text.contains(['\n', '\r'])
                || !self.claims.claim_right(i)
            {
                break;
            }
            run.extend(self.hidden(i));
            i += 1;
        }
        run
    }

    /// Claim everything still unclaimed, in source order
    fn sweep(&mut self) -> Vec<HiddenToken> {
        let tokens = self.tokens;
        let mut swept = Vec::new();
        for index in tokens.hidden_indices() {
            if self.claims.claim_sweep(index) {
                swept.extend(self.hidden(index));
            }
        }
        if !swept.is_empty() {
            trace!("Swept {} unclaimed hidden tokens", swept.len());
        }
        swept
    }

    fn hidden(&self, index: usize) -> Option<HiddenToken> {
        self.tokens
            .get(index)
            .and_then(|token| HiddenToken::from_cst(token, index))
    }

    fn span_position(&self, start: usize, end: usize) -> Position {
        let (start_line, start_column) = self.lines.line_col(start);
        let (end_line, end_column) = self.lines.line_col(end);
        Position {
            start_line,
            start_column,
            end_line,
            end_column,
            start_offset: start,
            end_offset: end,
        }
    }
}

/// Child visitor for nodes that own no model nodes
fn leaf(_: &mut ModelBuilder<'_>, _: &FmlSyntaxNode) -> Option<()> {
    None
}

// CST readers

/// Direct significant child tokens of `node`
fn own_tokens(node: &FmlSyntaxNode) -> Vec<FmlSyntaxToken> {
    node.children_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| !token.kind().is_trivia())
        .collect()
}

fn token_after(tokens: &[FmlSyntaxToken], kind: FmlSyntaxKind) -> Option<&FmlSyntaxToken> {
    tokens.iter().skip_while(|t| t.kind() != kind).nth(1)
}

fn is_identifier(kind: FmlSyntaxKind) -> bool {
    matches!(kind, FmlSyntaxKind::Ident | FmlSyntaxKind::DelimitedIdent)
}

fn is_url(kind: FmlSyntaxKind) -> bool {
    matches!(
        kind,
        FmlSyntaxKind::String | FmlSyntaxKind::DoubleString | FmlSyntaxKind::Url
    )
}

fn identifier(token: &FmlSyntaxToken) -> String {
    match token.kind() {
        FmlSyntaxKind::DelimitedIdent => unquote(token.text()),
        _ => token.text().to_string(),
    }
}

fn url(token: &FmlSyntaxToken) -> String {
    match token.kind() {
        FmlSyntaxKind::Url => token.text().to_string(),
        _ => unquote(token.text()),
    }
}

fn first_identifier(node: &FmlSyntaxNode) -> Option<String> {
    own_tokens(node)
        .iter()
        .find(|t| is_identifier(t.kind()))
        .map(identifier)
}

fn name_segments(node: &FmlSyntaxNode) -> Vec<String> {
    own_tokens(node)
        .iter()
        .filter(|t| is_identifier(t.kind()))
        .map(identifier)
        .collect()
}

fn qualified_name(node: &FmlSyntaxNode) -> Option<String> {
    let segments = name_segments(node);
    (!segments.is_empty()).then(|| join_path(&segments))
}

fn context_and_path(node: &FmlSyntaxNode) -> Option<(String, Option<String>)> {
    let mut segments = name_segments(node);
    if segments.is_empty() {
        return None;
    }
    let path = segments.split_off(1);
    let context = segments.pop()?;
    Some((context, (!path.is_empty()).then(|| join_path(&path))))
}

fn type_annotation(node: &FmlSyntaxNode) -> Option<String> {
    node.child_of_kind(FmlSyntaxKind::TypeAnnotation)
        .and_then(|annotation| first_identifier(&annotation))
}

fn alias(node: &FmlSyntaxNode) -> Option<String> {
    node.child_of_kind(FmlSyntaxKind::AliasClause)
        .and_then(|clause| first_identifier(&clause))
}

/// Raw expression of a `kw(expr)` clause; empty parentheses give `""`
fn clause_expression(node: &FmlSyntaxNode, clause: FmlSyntaxKind) -> Option<String> {
    node.child_of_kind(clause).map(|clause| paren_expression(&clause))
}

fn paren_expression(node: &FmlSyntaxNode) -> String {
    node.token_of_kind(FmlSyntaxKind::Expression)
        .map(|token| token.text().to_string())
        .unwrap_or_default()
}

fn arguments(call: &FmlSyntaxNode) -> Option<Vec<Param>> {
    let list = call.child_of_kind(FmlSyntaxKind::ArgList)?;
    let mut params = Vec::new();
    for element in list.children_with_tokens() {
        match element {
            NodeOrToken::Node(node) => match node.kind() {
                FmlSyntaxKind::ParenExpr => params.push(Param::Expression(paren_expression(&node))),
                FmlSyntaxKind::QualifiedName => {
                    params.push(Param::Identifier(qualified_name(&node)?))
                }
                _ => return None,
            },
            NodeOrToken::Token(token) => {
                if let Some(value) = literal(&token) {
                    params.push(Param::Literal(value));
                }
            }
        }
    }
    Some(params)
}

fn concept_map_side(node: &FmlSyntaxNode) -> Option<(String, String)> {
    let tokens = own_tokens(node);
    let prefix = tokens.first().filter(|t| is_identifier(t.kind()))?;
    let code = token_after(&tokens, FmlSyntaxKind::Colon)?;
    let code = match code.kind() {
        FmlSyntaxKind::String | FmlSyntaxKind::DoubleString | FmlSyntaxKind::DelimitedIdent => {
            unquote(code.text())
        }
        _ => code.text().to_string(),
    };
    Some((identifier(prefix), code))
}

fn literal(token: &FmlSyntaxToken) -> Option<Literal> {
    let text = token.text();
    let value = match token.kind() {
        FmlSyntaxKind::String | FmlSyntaxKind::DoubleString => Literal::String(unquote(text)),
        FmlSyntaxKind::Integer => match text.parse() {
            Ok(value) => Literal::Integer(value),
            Err(_) => Literal::Decimal(text.to_string()),
        },
        FmlSyntaxKind::Decimal => Literal::Decimal(text.to_string()),
        FmlSyntaxKind::TrueKw => Literal::Boolean(true),
        FmlSyntaxKind::FalseKw => Literal::Boolean(false),
        FmlSyntaxKind::Date => Literal::Date(text.strip_prefix('@').unwrap_or(text).to_string()),
        FmlSyntaxKind::DateTime => {
            Literal::DateTime(text.strip_prefix('@').unwrap_or(text).to_string())
        }
        FmlSyntaxKind::Time => Literal::Time(text.strip_prefix("@T").unwrap_or(text).to_string()),
        _ => return None,
    };
    Some(value)
}
