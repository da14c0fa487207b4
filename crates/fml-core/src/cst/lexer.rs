//! CST-aware lexer that preserves all trivia (whitespace, comments)
//!
//! Every byte of the input lands in exactly one token, so concatenating the
//! token texts reproduces the source. Trivia tokens form the hidden channel
//! the object-model builder later distributes over the AST.
//!
//! Embedded expressions are not tokenized: the body of `where(...)`,
//! `check(...)`, `log(...)`, `default(...)`, a parenthesized transform or
//! parameter, and the right-hand side of `let name = ...;` are emitted as a
//! single [`FmlSyntaxKind::Expression`] token holding the exact source text.

use crate::cst::FmlSyntaxKind;
use std::ops::Range;

/// Simple span representing a range in the source
pub type CstSpan = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: FmlSyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: FmlSyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the CST lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

/// Words that open an expression when followed by `(`
const EXPRESSION_KEYWORDS: &[&str] = &["where", "check", "log", "default"];

/// Lex input preserving ALL trivia for CST construction
pub fn lex_with_trivia(input: &str) -> CstLexResult {
    let mut tokens: Vec<CstToken> = Vec::new();
    let mut errors = Vec::new();

    let len = input.len();
    let mut i = 0usize;

    while i < len {
        let Some((current, size)) = next_char(input, i) else {
            break;
        };
        let start = i;

        // Right-hand side of `let name = ...;`
        if !current.is_whitespace() && !starts_comment(input, i) && awaiting_let_body(&tokens) {
            let (end, let_error) = scan_let_body(input, start);
            errors.extend(let_error);
            let body_end = start + input[start..end].trim_end().len();
            if body_end > start {
                tokens.push(CstToken::new(
                    FmlSyntaxKind::Expression,
                    &input[start..body_end],
                    span(start, body_end),
                ));
                i = body_end;
                continue;
            }
        }

        match current {
            // Newlines (separate from whitespace for formatting purposes)
            '\n' => {
                tokens.push(CstToken::new(
                    FmlSyntaxKind::Newline,
                    "\n",
                    span(start, i + size),
                ));
                i += size;
            }
            '\r' => {
                // Handle \r\n as single newline
                let mut end = i + size;
                if let Some(('\n', nl_size)) = next_char(input, end) {
                    end += nl_size;
                }
                tokens.push(CstToken::new(
                    FmlSyntaxKind::Newline,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }

            c if c.is_whitespace() => {
                let mut end = i + size;
                while let Some((next_ch, next_size)) = next_char(input, end) {
                    if next_ch.is_whitespace() && next_ch != '\n' && next_ch != '\r' {
                        end += next_size;
                    } else {
                        break;
                    }
                }
                tokens.push(CstToken::new(
                    FmlSyntaxKind::Whitespace,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }

            '/' => {
                let (kind, end, comment_error) = lex_slash(input, start);
                errors.extend(comment_error);
                tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
                i = end;
            }

            '(' => {
                let opens_expression = opens_expression(&tokens);
                tokens.push(CstToken::new(
                    FmlSyntaxKind::LParen,
                    "(",
                    span(start, i + size),
                ));
                i += size;

                if opens_expression {
                    let (end, expr_error) = scan_balanced(input, i);
                    errors.extend(expr_error);
                    if end > i {
                        tokens.push(CstToken::new(
                            FmlSyntaxKind::Expression,
                            &input[i..end],
                            span(i, end),
                        ));
                    }
                    i = end;
                }
            }

            '\'' => {
                let (end, string_error) = lex_quoted(input, start, '\'', "string");
                errors.extend(string_error);
                tokens.push(CstToken::new(
                    FmlSyntaxKind::String,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }
            '"' => {
                let (kind, end, string_error) = lex_double_quoted(input, start);
                errors.extend(string_error);
                tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
                i = end;
            }
            '`' => {
                let (end, ident_error) = lex_quoted(input, start, '`', "delimited identifier");
                errors.extend(ident_error);
                tokens.push(CstToken::new(
                    FmlSyntaxKind::DelimitedIdent,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }

            '@' => {
                let (kind, end) = lex_temporal(input, start);
                if kind == FmlSyntaxKind::Error {
                    errors.push(LexerError::new(
                        "Expected a date, dateTime or time after '@'",
                        span(start, end),
                    ));
                }
                tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
                i = end;
            }

            c if c.is_ascii_digit() => {
                let (kind, end) = lex_number(input, start);
                tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
                i = end;
            }

            c if c == '_' || c.is_alphabetic() => {
                let (kind, end) = lex_word(input, start);
                tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
                i = end;
            }

            _ => {
                let (kind, end) = lex_punct(input, start);
                if kind == FmlSyntaxKind::Error {
                    errors.push(LexerError::new(
                        format!("Unexpected character '{}'", &input[start..end]),
                        span(start, end),
                    ));
                }
                tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
                i = end;
            }
        }
    }

    (tokens, errors)
}

/// Comments, the metadata prefix, or a stray slash
fn lex_slash(input: &str, start: usize) -> (FmlSyntaxKind, usize, Option<LexerError>) {
    let rest = &input[start..];
    let len = input.len();

    if rest.starts_with("///") && !rest.starts_with("////") {
        return (FmlSyntaxKind::MetadataPrefix, start + 3, None);
    }

    if rest.starts_with("//") {
        let end = rest
            .find(['\n', '\r'])
            .map(|offset| start + offset)
            .unwrap_or(len);
        return (FmlSyntaxKind::CommentLine, end, None);
    }

    if rest.starts_with("/*") {
        return match rest[2..].find("*/") {
            Some(offset) => (FmlSyntaxKind::CommentBlock, start + 2 + offset + 2, None),
            None => (
                FmlSyntaxKind::CommentBlock,
                len,
                Some(LexerError::new("Unterminated block comment", span(start, len))),
            ),
        };
    }

    (
        FmlSyntaxKind::Error,
        start + 1,
        Some(LexerError::new("Unexpected character '/'", span(start, start + 1))),
    )
}

fn starts_comment(input: &str, pos: usize) -> bool {
    let rest = &input[pos..];
    (rest.starts_with("//") && !rest.starts_with("///"))
        || rest.starts_with("////")
        || rest.starts_with("/*")
}

/// Whether the significant tokens so far end in `let <name> =`
fn awaiting_let_body(tokens: &[CstToken]) -> bool {
    let mut significant = tokens.iter().rev().filter(|t| !t.kind.is_trivia());
    let (Some(equals), Some(name), Some(keyword)) =
        (significant.next(), significant.next(), significant.next())
    else {
        return false;
    };

    equals.kind == FmlSyntaxKind::Equals
        && matches!(name.kind, FmlSyntaxKind::Ident | FmlSyntaxKind::DelimitedIdent)
        && keyword.kind == FmlSyntaxKind::Ident
        && keyword.text == "let"
}

/// Whether a `(` following the current tokens starts an opaque expression
///
/// `where`, `check`, `log` and `default` only open one as a source clause.
/// Elsewhere they are ordinary names, as in `then log(s, t)` or
/// `group where(...)`.
fn opens_expression(tokens: &[CstToken]) -> bool {
    let mut significant = tokens.iter().rev().filter(|t| !t.kind.is_trivia());
    let Some(previous) = significant.next() else {
        return false;
    };

    match previous.kind {
        FmlSyntaxKind::Arrow
        | FmlSyntaxKind::Equals
        | FmlSyntaxKind::Comma
        | FmlSyntaxKind::LParen => true,
        FmlSyntaxKind::Ident if EXPRESSION_KEYWORDS.contains(&previous.text.as_str()) => {
            significant.next().is_some_and(ends_source_part)
        }
        _ => false,
    }
}

/// Whether `token` can end the part of a source that precedes a clause
fn ends_source_part(token: &CstToken) -> bool {
    match token.kind {
        FmlSyntaxKind::Ident => !matches!(token.text.as_str(), "then" | "group"),
        FmlSyntaxKind::DelimitedIdent
        | FmlSyntaxKind::Integer
        | FmlSyntaxKind::Star
        | FmlSyntaxKind::RParen => true,
        _ => false,
    }
}

/// End of the `//` or `/* */` comment starting at `pos`, if one starts there
fn comment_end(input: &str, pos: usize) -> Option<usize> {
    let rest = &input[pos..];
    if rest.starts_with("//") {
        Some(rest.find(['\n', '\r']).map_or(input.len(), |offset| pos + offset))
    } else if let Some(body) = rest.strip_prefix("/*") {
        Some(body.find("*/").map_or(input.len(), |offset| pos + 2 + offset + 2))
    } else {
        None
    }
}

/// Scan to the `;` ending a `let` body, honoring quotes and parentheses
fn scan_let_body(input: &str, start: usize) -> (usize, Option<LexerError>) {
    let len = input.len();
    let mut depth = 0usize;
    let mut i = start;

    while let Some((ch, size)) = next_char(input, i) {
        match ch {
            '\'' | '"' | '`' => {
                i = skip_quoted(input, i, ch).0;
                continue;
            }
            '/' => {
                if let Some(end) = comment_end(input, i) {
                    i = end;
                    continue;
                }
            }
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => return (i, None),
            _ => {}
        }
        i += size;
    }

    (
        len,
        Some(LexerError::new(
            "Unterminated constant expression, expected ';'",
            span(start, len),
        )),
    )
}

/// Scan from just after an opening `(` to its matching `)` (exclusive)
fn scan_balanced(input: &str, from: usize) -> (usize, Option<LexerError>) {
    let len = input.len();
    let mut depth = 1usize;
    let mut i = from;

    while let Some((ch, size)) = next_char(input, i) {
        match ch {
            '\'' | '"' | '`' => {
                i = skip_quoted(input, i, ch).0;
                continue;
            }
            '/' => {
                if let Some(end) = comment_end(input, i) {
                    i = end;
                    continue;
                }
            }
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return (i, None);
                }
            }
            _ => {}
        }
        i += size;
    }

    (
        len,
        Some(LexerError::new(
            "Unterminated expression, expected ')'",
            span(from.saturating_sub(1), len),
        )),
    )
}

/// Position just past the quoted run starting at `start`, and whether the
/// closing quote was found before end of input
fn skip_quoted(input: &str, start: usize, quote: char) -> (usize, bool) {
    let mut i = start + quote.len_utf8();
    while let Some((ch, size)) = next_char(input, i) {
        i += size;
        if ch == '\\' {
            if let Some((_, escaped)) = next_char(input, i) {
                i += escaped;
            }
        } else if ch == quote {
            return (i, true);
        }
    }
    (input.len(), false)
}

fn lex_quoted(
    input: &str,
    start: usize,
    quote: char,
    what: &str,
) -> (usize, Option<LexerError>) {
    match skip_quoted(input, start, quote) {
        (end, true) => (end, None),
        (end, false) => (
            end,
            Some(LexerError::new(
                format!("Unterminated {what}"),
                span(start, end),
            )),
        ),
    }
}

fn lex_double_quoted(input: &str, start: usize) -> (FmlSyntaxKind, usize, Option<LexerError>) {
    if input[start..].starts_with("\"\"\"") {
        return match input[start + 3..].find("\"\"\"") {
            Some(offset) => (FmlSyntaxKind::BlockString, start + 3 + offset + 3, None),
            None => (
                FmlSyntaxKind::BlockString,
                input.len(),
                Some(LexerError::new(
                    "Unterminated block string",
                    span(start, input.len()),
                )),
            ),
        };
    }

    let (end, error) = lex_quoted(input, start, '"', "string");
    (FmlSyntaxKind::DoubleString, end, error)
}

/// `@2020-01-01`, `@2020-01-01T10:00:00Z` or `@T10:00`
fn lex_temporal(input: &str, start: usize) -> (FmlSyntaxKind, usize) {
    let body_start = start + 1;
    let body_len = input[body_start..]
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '-' | ':' | 'T' | '.' | '+' | 'Z')))
        .unwrap_or(input.len() - body_start);
    let body = &input[body_start..body_start + body_len];
    let end = body_start + body_len;

    let kind = if body.is_empty() || body == "T" {
        FmlSyntaxKind::Error
    } else if body.starts_with('T') {
        FmlSyntaxKind::Time
    } else if body.contains('T') {
        FmlSyntaxKind::DateTime
    } else {
        FmlSyntaxKind::Date
    };
    (kind, end)
}

/// Integers and decimals; `1..2` lexes as integer, range, integer
fn lex_number(input: &str, start: usize) -> (FmlSyntaxKind, usize) {
    let bytes = input.as_bytes();
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }

    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        return (FmlSyntaxKind::Decimal, end);
    }

    (FmlSyntaxKind::Integer, end)
}

/// Identifiers, plus unquoted `scheme://...` urls
fn lex_word(input: &str, start: usize) -> (FmlSyntaxKind, usize) {
    let mut end = start;
    let mut chars = input[start..].char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        let continues = if ch == '-' {
            chars
                .peek()
                .is_some_and(|&(_, next)| next == '_' || next.is_alphanumeric())
        } else {
            ch == '_' || ch.is_alphanumeric()
        };
        if !continues {
            break;
        }
        end = start + offset + ch.len_utf8();
    }

    if input[end..].starts_with("://") {
        let url_end = input[end..]
            .find(|c: char| {
                c.is_whitespace() || matches!(c, ';' | ',' | '(' | ')' | '{' | '}' | '"' | '\'')
            })
            .map(|offset| end + offset)
            .unwrap_or(input.len());
        return (FmlSyntaxKind::Url, url_end);
    }

    (FmlSyntaxKind::Ident, end)
}

fn lex_punct(input: &str, start: usize) -> (FmlSyntaxKind, usize) {
    let rest = &input[start..];
    const TWO_CHAR: &[(&str, FmlSyntaxKind)] = &[
        ("..", FmlSyntaxKind::DotDot),
        ("==", FmlSyntaxKind::EqEq),
        ("!=", FmlSyntaxKind::NotEq),
        ("<=", FmlSyntaxKind::LtEq),
        (">=", FmlSyntaxKind::GtEq),
        ("->", FmlSyntaxKind::Arrow),
        ("<<", FmlSyntaxKind::DoubleLt),
        (">>", FmlSyntaxKind::DoubleGt),
    ];

    for (text, kind) in TWO_CHAR {
        if rest.starts_with(text) {
            return (*kind, start + 2);
        }
    }

    let kind = match rest.chars().next() {
        Some('.') => FmlSyntaxKind::Dot,
        Some(',') => FmlSyntaxKind::Comma,
        Some(';') => FmlSyntaxKind::Semicolon,
        Some(':') => FmlSyntaxKind::Colon,
        Some(')') => FmlSyntaxKind::RParen,
        Some('{') => FmlSyntaxKind::LBrace,
        Some('}') => FmlSyntaxKind::RBrace,
        Some('=') => FmlSyntaxKind::Equals,
        Some('-') => FmlSyntaxKind::Minus,
        Some('*') => FmlSyntaxKind::Star,
        Some('+') => FmlSyntaxKind::Plus,
        Some('<') => FmlSyntaxKind::Lt,
        Some('>') => FmlSyntaxKind::Gt,
        _ => FmlSyntaxKind::Error,
    };
    let width = rest.chars().next().map(char::len_utf8).unwrap_or(1);
    (kind, start + width)
}

/// Get next character and its UTF-8 size
fn next_char(input: &str, pos: usize) -> Option<(char, usize)> {
    input[pos..].chars().next().map(|c| (c, c.len_utf8()))
}

/// Create a span from start to end
fn span(start: usize, end: usize) -> CstSpan {
    start..end
}
