//! Thin wrapper over rowan's green node builder speaking `FmlSyntaxKind`

use rowan::GreenNodeBuilder;

use super::{CstToken, FmlSyntaxKind, FmlSyntaxNode};

/// Builds a lossless green tree from lexed tokens
#[derive(Default)]
pub struct CstBuilder {
    inner: GreenNodeBuilder<'static>,
    depth: usize,
}

impl CstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_node(&mut self, kind: FmlSyntaxKind) {
        self.inner.start_node(kind.into());
        self.depth += 1;
    }

    pub fn finish_node(&mut self) {
        self.inner.finish_node();
        self.depth -= 1;
    }

    pub fn token(&mut self, kind: FmlSyntaxKind, text: &str) {
        self.inner.token(kind.into(), text);
    }

    /// Add a lexed token, optionally re-tagged with a contextual kind
    pub fn add_token(&mut self, token: &CstToken, kind: Option<FmlSyntaxKind>) {
        self.token(kind.unwrap_or(token.kind), &token.text);
    }

    /// Number of nodes currently open
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn finish(self) -> FmlSyntaxNode {
        FmlSyntaxNode::new_root(self.inner.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retagged_token_keeps_text() {
        let mut builder = CstBuilder::new();
        builder.start_node(FmlSyntaxKind::Document);
        let token = CstToken::new(FmlSyntaxKind::Ident, "map", 0..3);
        builder.add_token(&token, Some(FmlSyntaxKind::MapKw));
        assert_eq!(builder.depth(), 1);
        builder.finish_node();

        let root = builder.finish();
        let first = root.first_token().map(|t| (t.kind(), t.text().to_string()));
        assert_eq!(first, Some((FmlSyntaxKind::MapKw, "map".to_string())));
    }
}
