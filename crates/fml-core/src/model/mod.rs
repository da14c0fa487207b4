//! Object model for mapping documents
//!
//! The model is built from a CST by [`ModelBuilder`], mutated freely by
//! callers, and written back by [`Serializer`]. Whitespace and comments
//! travel with the nodes in [`NodeMeta`], so untouched regions keep their
//! original formatting while new or edited nodes get a canonical layout.

pub mod ast;
mod builder;
mod claims;
mod serializer;
pub mod text;
mod trivia;

pub use ast::*;
pub use builder::{LineIndex, ModelBuilder};
pub use claims::{ClaimSide, ClaimTracker};
pub use serializer::{IndentStyle, Serializer, SerializerOptions};
pub use trivia::{Gap, HiddenKind, HiddenToken, NodeMeta, Position};
