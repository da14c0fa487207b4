//! Channel view over lexed tokens
//!
//! The builder addresses hidden tokens by their index in the lexer output;
//! rowan tokens are mapped back to that index through their start offset.

use super::{CstToken, FmlSyntaxKind};

/// Channel a token is emitted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Grammatically significant tokens
    Default,
    /// Whitespace and comments
    Hidden,
}

impl From<FmlSyntaxKind> for Channel {
    fn from(kind: FmlSyntaxKind) -> Self {
        if kind.is_trivia() {
            Channel::Hidden
        } else {
            Channel::Default
        }
    }
}

/// Lexed tokens in source order, indexed from zero
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: Vec<CstToken>,
}

impl TokenStream {
    pub fn new(tokens: Vec<CstToken>) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CstToken> {
        self.tokens.get(index)
    }

    pub fn tokens(&self) -> &[CstToken] {
        &self.tokens
    }

    pub fn channel(&self, index: usize) -> Option<Channel> {
        self.get(index).map(|token| token.kind.into())
    }

    pub fn is_hidden(&self, index: usize) -> bool {
        self.channel(index) == Some(Channel::Hidden)
    }

    /// Index of the token starting at byte `offset`
    pub fn index_at(&self, offset: usize) -> Option<usize> {
        self.tokens
            .binary_search_by_key(&offset, |token| token.span.start)
            .ok()
    }

    /// Indices of every hidden-channel token
    pub fn hidden_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.kind.is_trivia())
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::lex_with_trivia;

    #[test]
    fn test_channels_and_offsets() {
        let (tokens, _) = lex_with_trivia("map  x // c\n");
        let stream = TokenStream::new(tokens);

        assert_eq!(stream.channel(0), Some(Channel::Default));
        assert_eq!(stream.channel(1), Some(Channel::Hidden));
        assert_eq!(stream.index_at(5), Some(2));
        assert_eq!(stream.index_at(4), None);
        assert_eq!(stream.hidden_indices().collect::<Vec<_>>(), vec![1, 3, 4, 5]);
    }
}
