//! Object model of a mapping document
//!
//! Every collection is a public `Vec` in source order; callers add, remove
//! and reorder nodes directly and the serializer follows that order. Nodes
//! created through the constructors here carry no position and no hidden
//! tokens, so they serialize with the canonical layout.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::trivia::NodeMeta;
use crate::schema::SchemaDefinition;

/// Root of a mapping document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub metadata: Vec<Metadata>,
    pub concept_maps: Vec<ConceptMap>,
    pub map: Option<MapDeclaration>,
    pub structures: Vec<Structure>,
    pub imports: Vec<Import>,
    pub constants: Vec<Constant>,
    pub groups: Vec<Group>,
    /// Document-level hidden tokens live in `meta.trailing`: everything after
    /// the last declaration, plus anything no node claimed
    pub meta: NodeMeta,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.groups.iter_mut().find(|group| group.name == name)
    }

    /// Number of top-level declarations of every kind
    pub fn declaration_count(&self) -> usize {
        self.metadata.len()
            + self.concept_maps.len()
            + usize::from(self.map.is_some())
            + self.structures.len()
            + self.imports.len()
            + self.constants.len()
            + self.groups.len()
    }

    /// Visit the metadata of every node in source order, the document last
    pub fn for_each_meta(&self, f: &mut impl FnMut(&NodeMeta)) {
        for metadata in &self.metadata {
            f(&metadata.meta);
        }
        for concept_map in &self.concept_maps {
            f(&concept_map.meta);
            for prefix in &concept_map.prefixes {
                f(&prefix.meta);
            }
            for mapping in &concept_map.mappings {
                f(&mapping.meta);
            }
        }
        if let Some(map) = &self.map {
            f(&map.meta);
        }
        for structure in &self.structures {
            f(&structure.meta);
        }
        for import in &self.imports {
            f(&import.meta);
        }
        for constant in &self.constants {
            f(&constant.meta);
        }
        for group in &self.groups {
            f(&group.meta);
            for parameter in &group.parameters {
                f(&parameter.meta);
            }
            for rule in &group.rules {
                rule.for_each_meta(f);
            }
        }
        f(&self.meta);
    }
}

/// `/// key.path = value`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Dotted key path, e.g. `url` or `contact.name`
    pub key: String,
    pub value: Option<MetadataValue>,
    pub meta: NodeMeta,
}

impl Metadata {
    pub fn new(key: impl Into<String>, value: Option<MetadataValue>) -> Self {
        Self {
            key: key.into(),
            value,
            meta: NodeMeta::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum MetadataValue {
    Literal(Literal),
    /// Triple-quoted markdown text, without the quotes
    Markdown(String),
}

/// `conceptmap "url" { prefix ... mapping ... }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptMap {
    pub url: String,
    pub prefixes: Vec<ConceptMapPrefix>,
    pub mappings: Vec<ConceptMapping>,
    pub meta: NodeMeta,
}

impl ConceptMap {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// `prefix s = "http://system"`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptMapPrefix {
    pub name: String,
    pub url: String,
    pub meta: NodeMeta,
}

impl ConceptMapPrefix {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            meta: NodeMeta::default(),
        }
    }
}

/// `s:code <relationship> t:code`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptMapping {
    pub source_prefix: String,
    pub source_code: String,
    pub relationship: Relationship,
    pub target_prefix: String,
    pub target_code: String,
    pub meta: NodeMeta,
}

impl ConceptMapping {
    pub fn new(
        source: (impl Into<String>, impl Into<String>),
        relationship: Relationship,
        target: (impl Into<String>, impl Into<String>),
    ) -> Self {
        Self {
            source_prefix: source.0.into(),
            source_code: source.1.into(),
            relationship,
            target_prefix: target.0.into(),
            target_code: target.1.into(),
            meta: NodeMeta::default(),
        }
    }
}

/// Relationship between a source and a target code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relationship {
    /// `-`
    RelatedTo,
    /// `==`
    Equivalent,
    /// `=`
    Equal,
    /// `!=`
    NotRelatedTo,
    /// `<=`
    SourceIsNarrowerThanTarget,
    /// `>=`
    SourceIsBroaderThanTarget,
}

impl Relationship {
    pub fn symbol(self) -> &'static str {
        match self {
            Relationship::RelatedTo => "-",
            Relationship::Equivalent => "==",
            Relationship::Equal => "=",
            Relationship::NotRelatedTo => "!=",
            Relationship::SourceIsNarrowerThanTarget => "<=",
            Relationship::SourceIsBroaderThanTarget => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "-" => Some(Relationship::RelatedTo),
            "==" => Some(Relationship::Equivalent),
            "=" => Some(Relationship::Equal),
            "!=" => Some(Relationship::NotRelatedTo),
            "<=" => Some(Relationship::SourceIsNarrowerThanTarget),
            ">=" => Some(Relationship::SourceIsBroaderThanTarget),
            _ => None,
        }
    }
}

/// `map "url" = name`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDeclaration {
    pub url: String,
    pub name: String,
    /// The name was written as a string literal rather than an identifier
    #[serde(default)]
    pub quoted_name: bool,
    pub meta: NodeMeta,
}

impl MapDeclaration {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            quoted_name: false,
            meta: NodeMeta::default(),
        }
    }
}

/// `uses "url" alias Name as mode`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub url: String,
    pub alias: Option<String>,
    pub mode: StructureMode,
    pub meta: NodeMeta,
}

impl Structure {
    pub fn new(url: impl Into<String>, mode: StructureMode) -> Self {
        Self {
            url: url.into(),
            alias: None,
            mode,
            meta: NodeMeta::default(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureMode {
    Source,
    Queried,
    Target,
    Produced,
}

impl StructureMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StructureMode::Source => "source",
            StructureMode::Queried => "queried",
            StructureMode::Target => "target",
            StructureMode::Produced => "produced",
        }
    }
}

/// `imports "url"`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Import {
    pub url: String,
    pub meta: NodeMeta,
}

impl Import {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            meta: NodeMeta::default(),
        }
    }
}

/// `let name = expression;`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    /// Raw expression text as written
    pub expression: String,
    pub meta: NodeMeta,
}

impl Constant {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            meta: NodeMeta::default(),
        }
    }
}

/// A named, parameterized set of rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub extends: Option<String>,
    pub type_mode: Option<GroupTypeMode>,
    pub rules: Vec<Rule>,
    pub meta: NodeMeta,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Total number of rules including those nested in dependents
    pub fn rule_count(&self) -> usize {
        self.rules.iter().map(Rule::rule_count).sum()
    }
}

/// `<<types>>` or `<<type+>>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupTypeMode {
    Types,
    TypeAndTypes,
}

impl GroupTypeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupTypeMode::Types => "types",
            GroupTypeMode::TypeAndTypes => "type+",
        }
    }
}

/// `source src : Type` inside a group's parameter list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub mode: ParameterMode,
    pub name: String,
    pub type_name: Option<String>,
    /// Schema element resolved by a collaborator, never produced by parsing
    #[serde(skip)]
    pub resolved: Option<ResolvedElement>,
    pub meta: NodeMeta,
}

impl Parameter {
    pub fn new(mode: ParameterMode, name: impl Into<String>) -> Self {
        Self {
            mode,
            name: name.into(),
            type_name: None,
            resolved: None,
            meta: NodeMeta::default(),
        }
    }

    pub fn source(name: impl Into<String>) -> Self {
        Self::new(ParameterMode::Source, name)
    }

    pub fn target(name: impl Into<String>) -> Self {
        Self::new(ParameterMode::Target, name)
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterMode {
    Source,
    Target,
}

impl ParameterMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterMode::Source => "source",
            ParameterMode::Target => "target",
        }
    }
}

/// Back-reference from a parameter to the schema element it maps
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedElement {
    pub definition: Arc<SchemaDefinition>,
    /// Element path inside the definition, `None` for the root type
    pub element: Option<String>,
}

/// One mapping statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// At least one source is needed for the rendered rule to read back
    pub sources: Vec<RuleSource>,
    pub targets: Vec<RuleTarget>,
    pub dependent: Option<RuleDependent>,
    pub name: Option<String>,
    pub meta: NodeMeta,
}

impl Rule {
    pub fn new(sources: Vec<RuleSource>, targets: Vec<RuleTarget>) -> Self {
        Self {
            sources,
            targets,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_dependent(mut self, dependent: RuleDependent) -> Self {
        self.dependent = Some(dependent);
        self
    }

    /// This rule plus every rule nested below it
    pub fn rule_count(&self) -> usize {
        1 + self
            .dependent
            .as_ref()
            .map(|dependent| dependent.rules.iter().map(Rule::rule_count).sum::<usize>())
            .unwrap_or(0)
    }

    fn for_each_meta(&self, f: &mut impl FnMut(&NodeMeta)) {
        f(&self.meta);
        for source in &self.sources {
            f(&source.meta);
        }
        for target in &self.targets {
            f(&target.meta);
            if let Some(transform) = &target.transform {
                f(&transform.meta);
            }
        }
        if let Some(dependent) = &self.dependent {
            f(&dependent.meta);
            for invocation in &dependent.invocations {
                f(&invocation.meta);
            }
            for rule in &dependent.rules {
                rule.for_each_meta(f);
            }
        }
    }
}

/// Read side of a rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSource {
    pub context: String,
    /// Dotted element path below the context
    pub path: Option<String>,
    pub type_name: Option<String>,
    pub cardinality: Option<Cardinality>,
    /// Raw default expression
    pub default_value: Option<String>,
    pub list_mode: Option<SourceListMode>,
    pub variable: Option<String>,
    /// Raw `where` expression
    pub condition: Option<String>,
    /// Raw `check` expression
    pub check: Option<String>,
    /// Raw `log` expression
    pub log: Option<String>,
    pub meta: NodeMeta,
}

impl RuleSource {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

/// `min..max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cardinality {
    pub min: u32,
    pub max: Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Max {
    Bounded(u32),
    /// `*`
    Unbounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceListMode {
    First,
    NotFirst,
    Last,
    NotLast,
    OnlyOne,
}

impl SourceListMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceListMode::First => "first",
            SourceListMode::NotFirst => "not_first",
            SourceListMode::Last => "last",
            SourceListMode::NotLast => "not_last",
            SourceListMode::OnlyOne => "only_one",
        }
    }
}

/// Write side of a rule
///
/// `context` is empty for a bare `(expression)` or invocation target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTarget {
    pub context: String,
    pub path: Option<String>,
    pub transform: Option<Transform>,
    pub variable: Option<String>,
    pub list_mode: Option<TargetListMode>,
    pub meta: NodeMeta,
}

impl RuleTarget {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            ..Self::default()
        }
    }

    /// A bare `(expression)` target
    pub fn expression(expression: impl Into<String>) -> Self {
        Self {
            transform: Some(Transform::new(TransformKind::Evaluate(expression.into()))),
            ..Self::default()
        }
    }

    /// A bare `function(params)` target
    pub fn invocation(function: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            transform: Some(Transform::invoke(function, params)),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }

    pub fn is_bare(&self) -> bool {
        self.context.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetListMode {
    First,
    Share,
    Last,
    Single,
}

impl TargetListMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetListMode::First => "first",
            TargetListMode::Share => "share",
            TargetListMode::Last => "last",
            TargetListMode::Single => "single",
        }
    }
}

/// Value computation on the right of `=` in a target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub kind: TransformKind,
    pub meta: NodeMeta,
}

impl Transform {
    pub fn new(kind: TransformKind) -> Self {
        Self {
            kind,
            meta: NodeMeta::default(),
        }
    }

    pub fn literal(literal: Literal) -> Self {
        Self::new(TransformKind::Literal(literal))
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Self::new(TransformKind::Identifier(name.into()))
    }

    pub fn evaluate(expression: impl Into<String>) -> Self {
        Self::new(TransformKind::Evaluate(expression.into()))
    }

    pub fn invoke(function: impl Into<String>, params: Vec<Param>) -> Self {
        Self::new(TransformKind::Invoke {
            function: function.into(),
            params,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformKind {
    /// Copy a literal value
    Literal(Literal),
    /// Copy a variable or dotted reference
    Identifier(String),
    /// Raw parenthesized expression
    Evaluate(String),
    Invoke { function: String, params: Vec<Param> },
}

/// Actual parameter of an invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Param {
    Literal(Literal),
    Identifier(String),
    /// Raw parenthesized expression
    Expression(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Literal {
    String(String),
    Integer(i64),
    /// Decimal kept as written to avoid float rounding
    Decimal(String),
    Boolean(bool),
    /// Text after `@`
    Date(String),
    /// Text after `@`
    DateTime(String),
    /// Text after `@T`
    Time(String),
}

/// `then` clause of a rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleDependent {
    pub invocations: Vec<GroupInvocation>,
    pub rules: Vec<Rule>,
    pub meta: NodeMeta,
}

impl RuleDependent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invocation(mut self, invocation: GroupInvocation) -> Self {
        self.invocations.push(invocation);
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// `group(params)` inside a dependent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupInvocation {
    pub name: String,
    pub params: Vec<Param>,
    pub meta: NodeMeta,
}

impl GroupInvocation {
    pub fn new(name: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            params,
            meta: NodeMeta::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_count_includes_nested_rules() {
        let nested = Rule::new(vec![RuleSource::new("a")], vec![]);
        let rule = Rule::new(vec![RuleSource::new("src")], vec![RuleTarget::new("tgt")])
            .with_dependent(RuleDependent::new().with_rule(nested.clone()).with_rule(nested));
        let group = Group::new("g").with_rule(rule).with_rule(Rule::default());
        assert_eq!(group.rule_count(), 4);
    }

    #[test]
    fn test_relationship_symbols() {
        for relationship in [
            Relationship::RelatedTo,
            Relationship::Equivalent,
            Relationship::Equal,
            Relationship::NotRelatedTo,
            Relationship::SourceIsNarrowerThanTarget,
            Relationship::SourceIsBroaderThanTarget,
        ] {
            assert_eq!(Relationship::from_symbol(relationship.symbol()), Some(relationship));
        }
        assert_eq!(Relationship::from_symbol("=>"), None);
    }

    #[test]
    fn test_bare_targets() {
        let target = RuleTarget::expression("a + 1");
        assert!(target.is_bare());
        assert_eq!(
            target.transform.map(|t| t.kind),
            Some(TransformKind::Evaluate("a + 1".to_string()))
        );
        assert!(!RuleTarget::new("tgt").is_bare());
    }

    #[test]
    fn test_document_serializes_to_json() {
        let mut document = Document::new();
        document.map = Some(MapDeclaration::new("http://x/y", "y"));
        document.groups.push(
            Group::new("g")
                .with_parameter(Parameter::source("src"))
                .with_rule(Rule::new(
                    vec![RuleSource::new("src")],
                    vec![RuleTarget::new("tgt").with_transform(Transform::literal(
                        Literal::Integer(1),
                    ))],
                )),
        );

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["map"]["url"], "http://x/y");
        assert_eq!(value["groups"][0]["parameters"][0]["mode"], "source");
        assert_eq!(
            value["groups"][0]["rules"][0]["targets"][0]["transform"]["kind"]["literal"]["type"],
            "integer"
        );

        let back: Document = serde_json::from_value(value).unwrap();
        assert_eq!(back, document);
        assert_eq!(back.declaration_count(), 2);
    }
}
