use bang_lexer::{Lexer, Token};
use std::collections::VecDeque;

/// Forward-only supply of tokens for the statement loop.
///
/// `push_back` returns already consumed tokens to the front of the stream,
/// in order; it is the only way to "un-read".
pub trait TokenSource {
    fn next_token(&mut self) -> Token;
    fn push_back(&mut self, tokens: Vec<Token>);
}

/// Tokens straight from the lexer, for a whole program.
pub struct LexerSource<'src> {
    lexer: Lexer<'src>,
    pending: VecDeque<Token>,
}

impl<'src> LexerSource<'src> {
    pub fn new(src: &'src str) -> Self {
        Self { lexer: Lexer::new(src), pending: VecDeque::new() }
    }
}

impl TokenSource for LexerSource<'_> {
    fn next_token(&mut self) -> Token {
        match self.pending.pop_front() {
            Some(t) => t,
            None => self.lexer.next_token(),
        }
    }

    fn push_back(&mut self, tokens: Vec<Token>) {
        for t in tokens.into_iter().rev() {
            self.pending.push_front(t);
        }
    }
}

/// An already collected window, e.g. the body of a function literal.
/// Yields `Eof` once the window is exhausted.
pub struct SliceSource {
    tokens: std::vec::IntoIter<Token>,
    pending: VecDeque<Token>,
    eof_line: usize,
}

impl SliceSource {
    pub fn new(tokens: Vec<Token>, eof_line: usize) -> Self {
        Self { tokens: tokens.into_iter(), pending: VecDeque::new(), eof_line }
    }
}

impl TokenSource for SliceSource {
    fn next_token(&mut self) -> Token {
        self.pending
            .pop_front()
            .or_else(|| self.tokens.next())
            .unwrap_or_else(|| Token::eof(self.eof_line))
    }

    fn push_back(&mut self, tokens: Vec<Token>) {
        for t in tokens.into_iter().rev() {
            self.pending.push_front(t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bang_lexer::TokenKind;

    #[test]
    fn lexer_source_replays_pushed_tokens_in_order() {
        let mut src = LexerSource::new("a b c");
        let a = src.next_token();
        let b = src.next_token();
        src.push_back(vec![a, b]);
        let texts: Vec<String> = (0..3).map(|_| src.next_token().text).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert!(src.next_token().is(TokenKind::Eof));
    }

    #[test]
    fn slice_source_replays_and_ends_with_eof() {
        let toks = bang_lexer::tokenize("x y");
        let body: Vec<Token> = toks.into_iter().filter(|t| !t.is(TokenKind::Eof)).collect();
        let mut src = SliceSource::new(body, 4);
        let x = src.next_token();
        src.next_token();
        let eof = src.next_token();
        assert_eq!(eof, Token::eof(4));
        src.push_back(vec![eof]);
        assert!(src.next_token().is(TokenKind::Eof));
        src.push_back(vec![x]);
        assert_eq!(src.next_token().text, "x");
        assert!(src.next_token().is(TokenKind::Eof));
    }
}
