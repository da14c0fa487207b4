//! Negative test coverage for the parse façade
//!
//! Malformed input must come back as structured diagnostics, never as a
//! panic or a partial model.

use fml_core::{ErrorKind, ParseErrorCode, Severity, parse, parse_checked, parse_rule};

fn syntax_errors(source: &str) -> Vec<fml_core::ParseError> {
    let errors = parse(source).expect_err("expected the parse to fail");
    assert!(
        errors
            .iter()
            .all(|error| error.code == ParseErrorCode::Syntax),
        "{errors:?}"
    );
    errors
}

#[test]
fn test_empty_input_never_reaches_the_grammar() {
    for input in [Some(""), None] {
        let errors = parse(input).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ParseErrorCode::EmptyInput);
        assert_eq!(errors[0].severity, Severity::Error);
    }
}

#[test]
fn test_unterminated_string() {
    let errors = syntax_errors("map 'unterminated");
    assert!(errors.iter().all(|error| error.severity == Severity::Error));
    assert_eq!(errors[0].location, "@1:5");
    assert!(errors[0].message.contains("Unterminated"), "{}", errors[0]);
}

#[test]
fn test_unterminated_expression() {
    let errors = syntax_errors("group g(source s) {\n  s where (s.exists( -> s;\n}\n");
    assert_eq!(errors[0].line, 2);
}

#[test]
fn test_missing_rule_terminator() {
    let errors = syntax_errors("group g(source s, target t) {\n  s -> t\n}\n");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 3);
    assert!(errors[0].message.starts_with("expected ';' to end the rule"));
}

#[test]
fn test_out_of_order_declarations() {
    let errors = syntax_errors("group g(source s) {\n}\nuses \"http://x/A\" as source\n");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].location, "@3:1");
}

#[test]
fn test_duplicate_map_declaration() {
    let errors = syntax_errors("map \"http://x/a\" = a\nmap \"http://x/b\" = b\n");
    assert!(errors.iter().any(|error| error.message.contains("duplicate")));
}

#[test]
fn test_garbage_reports_every_problem() {
    let source = "??? nonsense\nmap \"http://x\" = x\ngroup g(source s {\n}\n";
    let errors = syntax_errors(source);
    assert!(errors.len() >= 2, "{errors:?}");
    assert!(errors.windows(2).all(|pair| pair[0].line <= pair[1].line));
}

#[test]
fn test_diagnostics_are_deterministic() {
    let source = "map \"http://x\" = \ngroup (source s) { s -> ; }";
    let first = parse(source).unwrap_err();
    for _ in 0..3 {
        assert_eq!(parse(source).unwrap_err(), first);
    }
}

#[test]
fn test_checked_parse_carries_the_list() {
    let err = parse_checked("map 'unterminated").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(!err.parse_errors().is_empty());
    assert!(err.to_string().starts_with("Parse error: "));
}

#[test]
fn test_rule_entry_errors() {
    let errors = parse_rule("src -> tgt").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ParseErrorCode::Syntax);

    let errors = parse_rule("src -> tgt; extra").unwrap_err();
    assert!(errors.iter().any(|error| error.message.contains("after rule")));

    let errors = parse_rule(None).unwrap_err();
    assert_eq!(errors[0].code, ParseErrorCode::EmptyInput);
}

#[test]
fn test_oversized_cardinality() {
    let errors = syntax_errors("group g(source s, target t) {\n  s.a 0..99999999999 -> t.b;\n}\n");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].location, "@2:10");
    assert_eq!(errors[0].message, "cardinality bound is out of range");
}
