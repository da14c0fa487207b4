//! Round-trip validation tests for mapping documents
//!
//! These tests parse, optionally edit, serialize and reparse documents, and
//! check that formatting and structure survive the trip.

use fml_core::cst::parse_fml;
use fml_core::model::ModelBuilder;
use fml_core::model::text::{join_path, split_path};
use fml_core::{
    ConceptMap, ConceptMapPrefix, ConceptMapping, Constant, Document, Group, GroupInvocation,
    Literal, MapDeclaration, Metadata, MetadataValue, Param, Parameter, Relationship, Rule,
    RuleDependent, RuleSource, RuleTarget, Structure, StructureMode, Transform, parse, serialize,
};

const TUTORIAL: &str = r#"/// url = 'http://example.org/fhir/StructureMap/tutorial'
/// name = 'tutorial'

map "http://example.org/fhir/StructureMap/tutorial" = tutorial

uses "http://example.org/TLeft" alias TLeft as source
uses "http://example.org/TRight" alias TRight as target

// helpers
let greeting = 'hello' + ' ' + name;

group tutorial(source src : TLeft, target tgt : TRight) {
  // copy a
  src.a as a -> tgt.a = a; // same line
  src.b  as  b where (b.length() > 2) -> tgt.b = truncate(b, 3) "trunc";
  src.c as c -> tgt.c = create('Coding') as cc then {
    c -> cc.code = c;
  };
  src -> tgt.d = 1, tgt.e = true first;
  src.f : string 0..1 as f -> (f + 'x') as x then sub(f, x);

  /* tail */
}
"#;

const CONCEPT_MAP: &str = r#"/// description = """Block
text"""

conceptmap "cm" {
  prefix s = "http://s"
  prefix t = "http://t"

  s:male - t:M
  s:"fe male" == t:F
}

map "http://x" = "named"
imports "http://other"
"#;

const SCENARIO_A: &str =
    "map \"http://x/y\" = y  group g(source src, target tgt) { src -> tgt; }";

/// Counts compared by the structural idempotence checks
fn shape(document: &Document) -> (usize, usize, Vec<usize>, usize, usize) {
    let mut sources = 0;
    let mut targets = 0;
    let mut count = |rule: &Rule| {
        sources += rule.sources.len();
        targets += rule.targets.len();
    };
    for group in &document.groups {
        visit_rules(&group.rules, &mut count);
    }
    (
        document.declaration_count(),
        document.groups.len(),
        document.groups.iter().map(Group::rule_count).collect(),
        sources,
        targets,
    )
}

fn visit_rules(rules: &[Rule], f: &mut impl FnMut(&Rule)) {
    for rule in rules {
        f(rule);
        if let Some(dependent) = &rule.dependent {
            visit_rules(&dependent.rules, f);
        }
    }
}

#[test]
fn test_untouched_documents_are_byte_identical() {
    for source in [TUTORIAL, CONCEPT_MAP] {
        let document = parse(source).unwrap();
        assert_eq!(serialize(&document), source);
    }
}

#[test]
fn test_delimited_segment_with_dot_stays_one_segment() {
    let source = "group g(source s, target t) {\n  s.`a.b` as v -> t.c = v;\n}\n";
    let document = parse(source).unwrap();
    let rule = &document.groups[0].rules[0];
    assert_eq!(rule.sources[0].path.as_deref(), Some("`a.b`"));
    assert_eq!(split_path(rule.sources[0].path.as_deref().unwrap()), ["a.b"]);
    assert_eq!(serialize(&document), source);

    let built = Rule::new(
        vec![
            RuleSource::new("s")
                .with_path(join_path(&["x", "y.z"]))
                .with_variable("v"),
        ],
        vec![RuleTarget::new("t").with_path("c")],
    );
    let mut document = parse(source).unwrap();
    document.groups[0].rules = vec![built];
    let output = serialize(&document);
    assert!(output.contains("  s.x.`y.z` as v -> t.c;\n"), "{output}");
    let reparsed = parse(output.as_str()).unwrap();
    assert_eq!(
        reparsed.groups[0].rules[0].sources[0].path.as_deref(),
        Some("x.`y.z`")
    );
}

#[test]
fn test_comments_inside_expressions_round_trip() {
    let source = "group g(source s, target t) {\n  s.a as a where(a = 1 /* ) */) -> t.c = a;\n  s.b as b check(b.exists() // ; )\n  ) -> t.d = b;\n}\n";
    let document = parse(source).unwrap();
    let rules = &document.groups[0].rules;
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].sources[0].condition.as_deref(), Some("a = 1 /* ) */"));
    assert_eq!(
        rules[1].sources[0].check.as_deref(),
        Some("b.exists() // ; )\n  ")
    );
    assert_eq!(serialize(&document), source);
}

#[test]
fn test_clause_words_name_groups() {
    let source = "group main(source s, target t) {\n  s -> t then log(s, t);\n}\n\ngroup log(source s, target t) {\n}\n";
    let document = parse(source).unwrap();
    assert_eq!(document.groups[1].name, "log");
    let dependent = document.groups[0].rules[0].dependent.as_ref().unwrap();
    assert_eq!(dependent.invocations[0].name, "log");
    assert_eq!(dependent.invocations[0].params.len(), 2);
    assert_eq!(serialize(&document), source);
}

#[test]
fn test_hidden_tokens_are_conserved() {
    for source in [
        TUTORIAL,
        CONCEPT_MAP,
        SCENARIO_A,
        "\n\n  // only a comment\n",
        "group g(source s,target t){s->t;}/* end */",
    ] {
        let parse = parse_fml(source);
        assert!(!parse.has_errors(), "{source}: {:?}", parse.errors);
        let document = ModelBuilder::new(source, &parse.tokens)
            .build_document(&parse.root)
            .unwrap();

        let mut claimed = Vec::new();
        document.for_each_meta(&mut |meta| {
            claimed.extend(meta.hidden_tokens().map(|token| token.index.unwrap()));
        });
        let total = claimed.len();
        claimed.sort_unstable();
        claimed.dedup();
        assert_eq!(claimed.len(), total, "a token was claimed twice in {source:?}");

        let expected: Vec<usize> = parse.tokens.hidden_indices().collect();
        assert_eq!(claimed, expected, "hidden tokens lost in {source:?}");
    }
}

#[test]
fn test_canonical_quoting_reparses() {
    let source = concat!(
        "map http://x/y = y\n",
        "group g(source s, target t) {\n",
        "  s.a as a -> t.a = \"v\" named;\n",
        "  s.b as b -> t.b = b \"quoted\";\n",
        "}\n",
    );
    let document = parse(source).unwrap();
    let output = serialize(&document);
    assert_ne!(output, source);

    let reparsed = parse(output.as_str()).unwrap();
    assert_eq!(shape(&reparsed), shape(&document));
    assert_eq!(reparsed.map.as_ref().unwrap().url, "http://x/y");
    assert_eq!(reparsed.groups[0].rules[0].name.as_deref(), Some("named"));
    assert_eq!(
        reparsed.groups[0].rules[0].targets[0]
            .transform
            .as_ref()
            .unwrap()
            .kind,
        fml_core::TransformKind::Literal(Literal::String("v".to_string()))
    );

    // a second trip changes nothing
    assert_eq!(serialize(&reparsed), output);
}

#[test]
fn test_structure_is_idempotent() {
    for source in [TUTORIAL, CONCEPT_MAP, SCENARIO_A] {
        let document = parse(source).unwrap();
        let reparsed = parse(serialize(&document).as_str()).unwrap();
        assert_eq!(shape(&reparsed), shape(&document), "{source}");
    }
}

#[test]
fn test_scenario_a() {
    let document = parse(SCENARIO_A).unwrap();

    let map = document.map.as_ref().unwrap();
    assert_eq!(map.url, "http://x/y");
    assert_eq!(map.name, "y");

    assert_eq!(document.groups.len(), 1);
    let group = &document.groups[0];
    assert_eq!(group.name, "g");
    assert_eq!(group.parameters.len(), 2);
    assert_eq!(group.parameters[0].name, "src");
    assert_eq!(group.parameters[1].name, "tgt");
    assert_eq!(group.rules.len(), 1);
    assert_eq!(group.rules[0].sources[0].context, "src");
    assert_eq!(group.rules[0].targets[0].context, "tgt");
}

#[test]
fn test_scenario_b_appended_rule() {
    let source = "map \"http://x/y\" = y\n\ngroup g(source src, target tgt) {\n  src.a -> tgt.a; // first\n  src.b -> tgt.b;\n}\n";
    let mut document = parse(source).unwrap();
    let before = document.groups[0].rules.len();

    document.groups[0].rules.push(Rule::new(
        vec![RuleSource::new("src").with_path("c").with_variable("c")],
        vec![
            RuleTarget::new("tgt")
                .with_path("c")
                .with_transform(Transform::identifier("c")),
        ],
    ));
    let output = serialize(&document);
    assert_eq!(
        output,
        "map \"http://x/y\" = y\n\ngroup g(source src, target tgt) {\n  src.a -> tgt.a; // first\n  src.b -> tgt.b;\n  src.c as c -> tgt.c = c;\n}\n"
    );

    let reparsed = parse(output.as_str()).unwrap();
    assert_eq!(reparsed.groups[0].rules.len(), before + 1);
}

#[test]
fn test_edited_node_falls_back_to_default_layout() {
    let mut document = parse(TUTORIAL).unwrap();
    let rule = &mut document.groups[0].rules[1];
    rule.meta.clear_hidden();
    rule.sources[0].meta.clear_hidden();

    let output = serialize(&document);
    assert!(output.contains(
        "\n  src.b as b where(b.length() > 2) -> tgt.b = truncate(b, 3) \"trunc\";\n"
    ));
    // neighbours keep their comments
    assert!(output.contains("  // copy a\n  src.a as a -> tgt.a = a; // same line\n"));
    assert!(output.contains("\n\n  /* tail */\n}\n"));
    parse(output.as_str()).unwrap();
}

#[test]
fn test_removed_group_takes_its_comments() {
    let source = "map \"http://x/y\" = y\n\n// first group\ngroup a(source s) {\n  s;\n}\n\n// second group\ngroup b(source s) {\n  s;\n}\n";
    let mut document = parse(source).unwrap();
    document.groups.remove(0);
    assert_eq!(
        serialize(&document),
        "map \"http://x/y\" = y\n\n// second group\ngroup b(source s) {\n  s;\n}\n"
    );
}

#[test]
fn test_construction_only_document() {
    let mut concept_map = ConceptMap::new("#genders");
    concept_map
        .prefixes
        .push(ConceptMapPrefix::new("s", "http://s"));
    concept_map
        .prefixes
        .push(ConceptMapPrefix::new("t", "http://t"));
    concept_map.mappings.push(ConceptMapping::new(
        ("s", "male"),
        Relationship::Equivalent,
        ("t", "M"),
    ));
    concept_map.mappings.push(ConceptMapping::new(
        ("s", "not known"),
        Relationship::RelatedTo,
        ("t", "U"),
    ));

    let mut document = Document::new();
    document.metadata.push(Metadata::new(
        "name",
        Some(MetadataValue::Literal(Literal::String("Built".to_string()))),
    ));
    document.concept_maps.push(concept_map);
    document.map = Some(MapDeclaration::new("http://x/built", "Built"));
    document
        .structures
        .push(Structure::new("http://x/A", StructureMode::Source).with_alias("A"));
    document
        .structures
        .push(Structure::new("http://x/B", StructureMode::Target).with_alias("B"));
    document.imports.push(fml_core::Import::new("http://x/other"));
    document.constants.push(Constant::new("limit", "3"));
    document.groups.push(
        Group::new("main")
            .with_parameter(Parameter::source("src").with_type("A"))
            .with_parameter(Parameter::target("tgt").with_type("B"))
            .with_rule(
                Rule::new(
                    vec![RuleSource::new("src").with_path("item").with_variable("i")],
                    vec![RuleTarget::new("tgt")
                        .with_path("entry")
                        .with_variable("e")],
                )
                .with_dependent(RuleDependent::new().with_invocation(GroupInvocation::new(
                    "item",
                    vec![
                        Param::Identifier("i".to_string()),
                        Param::Identifier("e".to_string()),
                    ],
                ))),
            )
            .with_rule(Rule::new(
                vec![RuleSource::new("src").with_path("code").with_variable("c")],
                vec![RuleTarget::new("tgt").with_path("code").with_transform(
                    Transform::invoke(
                        "translate",
                        vec![
                            Param::Identifier("c".to_string()),
                            Param::Literal(Literal::String("#genders".to_string())),
                            Param::Literal(Literal::String("code".to_string())),
                        ],
                    ),
                )],
            )),
    );
    document.groups.push(
        Group::new("item")
            .with_parameter(Parameter::source("i"))
            .with_parameter(Parameter::target("e")),
    );

    let output = serialize(&document);
    assert!(output.ends_with('\n'));
    insta::assert_snapshot!(output, @r##"
    /// name = 'Built'

    conceptmap "#genders" {
      prefix s = "http://s"
      prefix t = "http://t"

      s:male == t:M
      s:"not known" - t:U
    }

    map "http://x/built" = Built

    uses "http://x/A" alias A as source
    uses "http://x/B" alias B as target

    imports "http://x/other"

    let limit = 3;

    group main(source src : A, target tgt : B) {
      src.item as i -> tgt.entry as e then item(i, e);
      src.code as c -> tgt.code = translate(c, '#genders', 'code');
    }

    group item(source i, target e) {
    }
    "##);

    let reparsed = parse(output.as_str()).unwrap();
    assert_eq!(shape(&reparsed), shape(&document));
    assert_eq!(reparsed.concept_maps[0].mappings.len(), 2);
    assert_eq!(reparsed.concept_maps[0].mappings[1].source_code, "not known");
}
