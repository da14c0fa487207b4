//! Quoting and unquoting of identifiers and literals

/// Whether `name` can be written without back-ticks
///
/// Mirrors the lexer's word rule: a letter or `_` first, then letters, digits
/// and `_`, with single hyphens allowed between them. `true` and `false`
/// would read back as booleans, so they are never plain.
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars().peekable();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {}
        _ => return false,
    }
    while let Some(ch) = chars.next() {
        let ok = if ch == '-' {
            chars
                .peek()
                .is_some_and(|&next| next == '_' || next.is_alphanumeric())
        } else {
            ch == '_' || ch.is_alphanumeric()
        };
        if !ok {
            return false;
        }
    }
    !matches!(name, "true" | "false")
}

/// Render an identifier, back-ticking it when it is not plain
pub fn format_identifier(name: &str) -> String {
    if is_plain_identifier(name) {
        name.to_string()
    } else {
        quote_with(name, '`')
    }
}

/// Render a dotted path segment by segment
pub fn format_path(path: &str) -> String {
    split_path(path)
        .iter()
        .map(|segment| format_identifier(segment))
        .collect::<Vec<_>>()
        .join(".")
}

/// Join path segments with `.`
///
/// A segment holding a `.` or a back-tick stays back-ticked, so
/// [`split_path`] recovers exactly the same segments.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|segment| {
            let segment = segment.as_ref();
            if segment.contains(['.', '`']) {
                quote_with(segment, '`')
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Segments of a path built by [`join_path`]
pub fn split_path(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => segments.push(std::mem::take(&mut current)),
            '`' => {
                let mut body = String::new();
                while let Some(inner) = chars.next() {
                    match inner {
                        '`' => break,
                        '\\' => {
                            body.push('\\');
                            if let Some(escaped) = chars.next() {
                                body.push(escaped);
                            }
                        }
                        other => body.push(other),
                    }
                }
                current.push_str(&unescape(&body));
            }
            other => current.push(other),
        }
    }
    segments.push(current);
    segments
}

/// Quote a string literal, preferring single quotes
pub fn quote_string(value: &str) -> String {
    if value.contains('\'') {
        quote_with(value, '"')
    } else {
        quote_with(value, '\'')
    }
}

/// Quote with double quotes, used for urls and rule names
pub fn quote_double(value: &str) -> String {
    quote_with(value, '"')
}

pub fn quote_block(value: &str) -> String {
    format!("\"\"\"{value}\"\"\"")
}

fn quote_with(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Value of a quoted token (`'..'`, `".."` or `` `..` ``) with escapes resolved
///
/// Text that is not quoted is returned unchanged.
pub fn unquote(raw: &str) -> String {
    let mut chars = raw.chars();
    let (Some(open), Some(close)) = (chars.next(), chars.next_back()) else {
        return raw.to_string();
    };
    if open != close || !matches!(open, '\'' | '"' | '`') {
        return raw.to_string();
    }
    unescape(chars.as_str())
}

/// Content of a `"""` block string, kept verbatim
pub fn unquote_block(raw: &str) -> String {
    raw.strip_prefix("\"\"\"")
        .and_then(|rest| rest.strip_suffix("\"\"\""))
        .unwrap_or(raw)
        .to_string()
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => {
                        out.push(decoded);
                        for _ in 0..4 {
                            chars.next();
                        }
                    }
                    _ => out.push('u'),
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
