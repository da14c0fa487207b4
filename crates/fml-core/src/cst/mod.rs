//! Concrete Syntax Tree (CST) for the FHIR Mapping Language
//!
//! This module implements a lossless syntax tree using the Rowan library.
//! The CST preserves all source information including whitespace, comments,
//! and formatting, so `parse(source).text() == source` holds for every input,
//! well-formed or not.
//!
//! ## Architecture
//!
//! - **Lexer**: hand-written, emits every byte as a token. Whitespace,
//!   newlines and comments are trivia, which is the hidden channel of the
//!   [`TokenStream`].
//! - **Parser**: recursive descent over the token slice, building a rowan
//!   green tree. Keywords are contextual and re-tagged by the parser.
//! - **Red tree**: [`FmlSyntaxNode`] views with parent pointers, consumed by
//!   the object-model builder in [`crate::model`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use fml_core::cst::{parse_fml, FmlSyntaxKind};
//!
//! let parse = parse_fml("map \"http://x/y\" = y // comment\n");
//! assert_eq!(parse.root.text().to_string(), "map \"http://x/y\" = y // comment\n");
//!
//! for token in parse.root.descendants_with_tokens() {
//!     if let Some(comment) = token.as_token() {
//!         if comment.kind() == FmlSyntaxKind::CommentLine {
//!             println!("Found comment: {}", comment.text());
//!         }
//!     }
//! }
//! ```

mod builder;
mod language;
mod lexer;
mod nodes;
mod parser;
mod syntax_kind;
mod token_stream;

pub use builder::CstBuilder;
pub use language::FmlLanguage;
pub use lexer::{CstLexResult, CstSpan, CstToken, LexerError, lex_with_trivia};
pub use nodes::*;
pub use parser::{CstParse, SyntaxError, parse_fml, parse_fml_rule};
pub use syntax_kind::FmlSyntaxKind;
pub use token_stream::{Channel, TokenStream};
