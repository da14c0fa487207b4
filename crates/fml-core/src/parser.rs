//! Parse façade: text in, model or diagnostics out
//!
//! Every entry point runs the same pipeline: lex and parse into a CST with a
//! collecting diagnostics sink, then hand the tree to a fresh
//! [`ModelBuilder`]. Each call owns its token stream, tree and claim tracker,
//! so the functions here can be called from any number of threads at once.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::{debug, warn};

use crate::Result;
use crate::cst::{CstParse, FmlSyntaxNode, parse_fml, parse_fml_rule};
use crate::error::FmlError;
use crate::model::{Document, LineIndex, ModelBuilder, Rule, Serializer};

/// Severity of a parse diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Machine-readable category of a parse diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseErrorCode {
    /// No text was supplied; the grammar never ran
    EmptyInput,
    /// The lexer or parser rejected a token
    Syntax,
    /// The tree did not have the shape the model builder expects
    VisitorError,
    /// An unexpected fault inside the pipeline
    Exception,
}

impl ParseErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseErrorCode::EmptyInput => "empty-input",
            ParseErrorCode::Syntax => "syntax",
            ParseErrorCode::VisitorError => "visitor-error",
            ParseErrorCode::Exception => "exception",
        }
    }
}

impl fmt::Display for ParseErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic from a failed parse
///
/// Lines and columns are 1-based; `location` is the same position rendered as
/// `@line:column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseError {
    pub severity: Severity,
    pub code: ParseErrorCode,
    pub message: String,
    pub location: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(
        code: ParseErrorCode,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            location: format!("@{line}:{column}"),
            line,
            column,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.message, self.location)
    }
}

impl std::error::Error for ParseError {}

/// Parse a complete mapping document
///
/// Absent or empty text fails with a single `empty-input` diagnostic. Any
/// syntax diagnostic fails the whole parse; no partial model is returned.
pub fn parse<'a>(
    text: impl Into<Option<&'a str>>,
) -> std::result::Result<Document, Vec<ParseError>> {
    run(text.into(), parse_fml, |builder, root| {
        builder.build_document(root)
    })
}

/// Same as [`parse`], with the diagnostics wrapped in [`FmlError::Parse`]
pub fn parse_checked<'a>(text: impl Into<Option<&'a str>>) -> Result<Document> {
    parse(text).map_err(FmlError::parse)
}

/// Parse a single rule terminated by `;`
///
/// Whitespace and comments after the terminator end up in the rule's
/// trailing tokens.
pub fn parse_rule<'a>(
    text: impl Into<Option<&'a str>>,
) -> std::result::Result<Rule, Vec<ParseError>> {
    run(text.into(), parse_fml_rule, |builder, root| {
        builder.build_rule_entry(root)
    })
}

/// Render a document with default layout options
pub fn serialize(document: &Document) -> String {
    Serializer::new().serialize(document)
}

/// Render a single rule with default layout options
pub fn serialize_rule(rule: &Rule) -> String {
    Serializer::new().serialize_rule(rule)
}

fn run<T, F>(
    text: Option<&str>,
    front_end: fn(&str) -> CstParse,
    build: F,
) -> std::result::Result<T, Vec<ParseError>>
where
    F: FnOnce(ModelBuilder<'_>, &FmlSyntaxNode) -> Option<T>,
{
    let source = match text {
        Some(source) if !source.is_empty() => source,
        _ => {
            debug!("Refusing to parse empty input");
            return Err(vec![ParseError::new(
                ParseErrorCode::EmptyInput,
                "input is empty",
                1,
                1,
            )]);
        }
    };

    match panic::catch_unwind(AssertUnwindSafe(|| pipeline(source, front_end, build))) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!("Parse pipeline panicked: {}", message);
            Err(vec![ParseError::new(
                ParseErrorCode::Exception,
                message,
                1,
                1,
            )])
        }
    }
}

fn pipeline<T, F>(
    source: &str,
    front_end: fn(&str) -> CstParse,
    build: F,
) -> std::result::Result<T, Vec<ParseError>>
where
    F: FnOnce(ModelBuilder<'_>, &FmlSyntaxNode) -> Option<T>,
{
    let parse = front_end(source);
    let lines = LineIndex::new(source);

    if parse.has_errors() {
        let mut located: Vec<(usize, ParseError)> = parse
            .lexer_errors
            .iter()
            .map(|error| (error.span.start, error.message.as_str()))
            .chain(
                parse
                    .errors
                    .iter()
                    .map(|error| (error.span.start, error.message.as_str())),
            )
            .map(|(offset, message)| {
                let (line, column) = lines.line_col(offset);
                (
                    offset,
                    ParseError::new(ParseErrorCode::Syntax, message, line, column),
                )
            })
            .collect();
        located.sort_by_key(|(offset, _)| *offset);

        let errors: Vec<ParseError> = located.into_iter().map(|(_, error)| error).collect();
        if let Some(first) = errors.first() {
            warn!(
                "Parse failed with {} syntax error(s), first: {}",
                errors.len(),
                first
            );
        }
        return Err(errors);
    }

    let builder = ModelBuilder::new(source, &parse.tokens);
    build(builder, &parse.root).ok_or_else(|| {
        warn!("Model builder rejected the parse tree");
        vec![ParseError::new(
            ParseErrorCode::VisitorError,
            "parse tree could not be converted to a model",
            1,
            1,
        )]
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected failure while parsing".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_absent_input() {
        for input in [Some(""), None] {
            let errors = parse(input).unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].code, ParseErrorCode::EmptyInput);
            assert_eq!(errors[0].severity, Severity::Error);
        }
        let errors = parse_rule("").unwrap_err();
        assert_eq!(errors[0].code, ParseErrorCode::EmptyInput);
    }

    #[test]
    fn test_syntax_errors_are_located() {
        let errors = parse("map \"http://x/y\" = y\n\ngroup g(source s {\n}\n").unwrap_err();
        assert!(!errors.is_empty());
        assert!(
            errors
                .iter()
                .all(|error| error.code == ParseErrorCode::Syntax && error.is_error())
        );
        assert_eq!(errors[0].line, 3);
        assert_eq!(errors[0].location, format!("@3:{}", errors[0].column));
    }

    #[test]
    fn test_unterminated_string_is_a_syntax_error() {
        let errors = parse("map 'unterminated").unwrap_err();
        assert!(errors.iter().any(|error| error.code == ParseErrorCode::Syntax));
        assert_eq!(errors[0].line, 1);
    }

    #[test]
    fn test_errors_are_deterministic() {
        let source = "group a(source s) {\n  s -> ;\n}\nmap";
        assert_eq!(parse(source).unwrap_err(), parse(source).unwrap_err());
    }

    #[test]
    fn test_parse_checked_wraps_diagnostics() {
        let err = parse_checked("").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Parse);
        assert_eq!(err.parse_errors()[0].code, ParseErrorCode::EmptyInput);
        assert!(parse_checked("map \"http://x/y\" = y\n").is_ok());
    }

    #[test]
    fn test_parse_rule_requires_terminator() {
        let rule = parse_rule("src.a as a -> tgt.b = a; // done\n").unwrap();
        assert_eq!(rule.sources.len(), 1);
        assert_eq!(rule.targets.len(), 1);
        assert_eq!(serialize_rule(&rule), "src.a as a -> tgt.b = a; // done\n");

        let errors = parse_rule("src.a as a -> tgt.b = a").unwrap_err();
        assert_eq!(errors[0].code, ParseErrorCode::Syntax);
    }

    #[test]
    fn test_parse_from_many_threads() {
        let source = "map \"http://x/y\" = y\n\ngroup g(source s, target t) {\n  s.a -> t.b;\n}\n";
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| parse(source).map(|doc| serialize(&doc))))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap().unwrap(), source);
            }
        });
    }

    #[test]
    fn test_rejected_tree_is_a_visitor_error() {
        let errors = run(Some("map \"http://x/y\" = y\n"), parse_fml, |_, _| {
            None::<Document>
        })
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ParseErrorCode::VisitorError);
        assert_eq!(errors[0].location, "@1:1");
    }

    #[test]
    fn test_panic_in_pipeline_is_an_exception() {
        let errors = run(
            Some("map \"http://x/y\" = y\n"),
            parse_fml,
            |_, _| -> Option<Document> { panic!("model builder blew up") },
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ParseErrorCode::Exception);
        assert_eq!(errors[0].message, "model builder blew up");
        assert_eq!(errors[0].location, "@1:1");
    }

    #[test]
    fn test_code_names() {
        assert_eq!(ParseErrorCode::EmptyInput.to_string(), "empty-input");
        assert_eq!(ParseErrorCode::VisitorError.as_str(), "visitor-error");
        assert_eq!(
            serde_json::to_value(ParseErrorCode::Exception).unwrap(),
            serde_json::json!("exception")
        );
    }
}
