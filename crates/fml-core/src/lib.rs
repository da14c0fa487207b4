//! FML Core
//!
//! Lossless round-trip engine for the FHIR Mapping Language (FML).
//! This crate parses mapping documents into an editable object model that
//! carries every space, newline and comment of the source, and writes the
//! model back as text. Untouched regions come back byte for byte; edited or
//! newly built nodes get a canonical layout.
//!
//! ```rust,ignore
//! use fml_core::{Rule, RuleSource, RuleTarget, parse, serialize};
//!
//! let mut document = parse(source).map_err(|errors| errors[0].to_string())?;
//! document.groups[0].rules.push(Rule::new(
//!     vec![RuleSource::new("src").with_path("gender")],
//!     vec![RuleTarget::new("tgt").with_path("gender")],
//! ));
//! let text = serialize(&document);
//! ```

pub mod config;
pub mod cst; // Concrete Syntax Tree (lossless, Rowan-based)
pub mod error;
pub mod model; // Object model, builder and serializer
pub mod parser;
pub mod result;
pub mod schema;

// Re-export commonly used types
pub use config::SerializerConfiguration;
pub use error::{ErrorKind, FmlError};
pub use model::{
    Cardinality, ConceptMap, ConceptMapPrefix, ConceptMapping, Constant, Document, Gap, Group,
    GroupInvocation, GroupTypeMode, HiddenKind, HiddenToken, Import, IndentStyle,
    Literal, MapDeclaration, Max, Metadata, MetadataValue, NodeMeta, Param, Parameter,
    ParameterMode, Position, Relationship, ResolvedElement, Rule, RuleDependent, RuleSource,
    RuleTarget, Serializer, SerializerOptions, SourceListMode, Structure, StructureMode,
    TargetListMode, Transform, TransformKind,
};
pub use parser::{
    ParseError, ParseErrorCode, Severity, parse, parse_checked, parse_rule, serialize,
    serialize_rule,
};
pub use result::Result;
pub use schema::{InMemorySchemaResolver, SchemaDefinition, SchemaResolver, resolve_parameters};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fml_core=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()
        .ok();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
