//! Typed aliases over rowan's red tree for FML, plus navigation helpers

use super::{FmlLanguage, FmlSyntaxKind};

pub type FmlSyntaxNode = rowan::SyntaxNode<FmlLanguage>;
pub type FmlSyntaxToken = rowan::SyntaxToken<FmlLanguage>;
pub type FmlSyntaxElement = rowan::SyntaxElement<FmlLanguage>;

pub use rowan::{NodeOrToken, TextRange, TextSize};

/// Extension trait for FmlSyntaxNode with FML-specific helpers
pub trait FmlSyntaxNodeExt {
    /// Find the first child node of a specific kind
    fn child_of_kind(&self, kind: FmlSyntaxKind) -> Option<FmlSyntaxNode>;

    /// Find all child nodes of a specific kind
    fn children_of_kind(&self, kind: FmlSyntaxKind) -> Vec<FmlSyntaxNode>;

    /// Find the first direct child token of a specific kind
    fn token_of_kind(&self, kind: FmlSyntaxKind) -> Option<FmlSyntaxToken>;

    /// First direct child token that is not trivia
    fn first_significant_child_token(&self) -> Option<FmlSyntaxToken>;

    /// Non-trivia tokens anywhere below this node, in source order
    fn significant_tokens(&self) -> Vec<FmlSyntaxToken>;
}

impl FmlSyntaxNodeExt for FmlSyntaxNode {
    fn child_of_kind(&self, kind: FmlSyntaxKind) -> Option<FmlSyntaxNode> {
        self.children().find(|child| child.kind() == kind)
    }

    fn children_of_kind(&self, kind: FmlSyntaxKind) -> Vec<FmlSyntaxNode> {
        self.children()
            .filter(|child| child.kind() == kind)
            .collect()
    }

    fn token_of_kind(&self, kind: FmlSyntaxKind) -> Option<FmlSyntaxToken> {
        self.children_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| token.kind() == kind)
    }

    fn first_significant_child_token(&self) -> Option<FmlSyntaxToken> {
        self.children_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| !token.kind().is_trivia())
    }

    fn significant_tokens(&self) -> Vec<FmlSyntaxToken> {
        self.descendants_with_tokens()
            .filter_map(|element| element.into_token())
            .filter(|token| !token.kind().is_trivia())
            .collect()
    }
}
