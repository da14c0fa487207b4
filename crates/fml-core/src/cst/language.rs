//! Rowan language implementation for FML
//!
//! This module implements the `rowan::Language` trait for FML, which connects
//! our FmlSyntaxKind enum to Rowan's generic CST infrastructure.

use rowan::Language;

use super::FmlSyntaxKind;

/// Language implementation for the FHIR Mapping Language
///
/// Marker type tying [`FmlSyntaxKind`] to rowan's untyped `SyntaxKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FmlLanguage;

impl Language for FmlLanguage {
    type Kind = FmlSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        FmlSyntaxKind::from_raw(raw.0).unwrap_or_else(|| {
            tracing::warn!("Unknown syntax kind: {}", raw.0);
            FmlSyntaxKind::Error
        })
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}
