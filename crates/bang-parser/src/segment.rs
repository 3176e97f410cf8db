//! Depth-aware scanning over flat token windows.
//!
//! Parentheses, braces and square brackets are counted independently; a
//! position is "top level" only when all three counters are zero.

use crate::{Nesting, ParseError};
use bang_lexer::{Token, TokenKind};

/// Running paren / brace / bracket depths of a left-to-right scan.
#[derive(Debug, Default, Clone, Copy)]
pub struct Depth {
    pub paren: i32,
    pub brace: i32,
    pub bracket: i32,
}

impl Depth {
    /// Feed one token; returns true if it was a bracket of any kind.
    pub fn step(&mut self, kind: TokenKind) -> bool {
        match kind {
            TokenKind::LParen => self.paren += 1,
            TokenKind::RParen => self.paren -= 1,
            TokenKind::LBrace => self.brace += 1,
            TokenKind::RBrace => self.brace -= 1,
            TokenKind::LBracket => self.bracket += 1,
            TokenKind::RBracket => self.bracket -= 1,
            _ => return false,
        }
        true
    }

    pub fn at_top(&self) -> bool {
        self.paren == 0 && self.brace == 0 && self.bracket == 0
    }
}

/// Fails if any bracket kind opens and closes a different number of times.
pub fn check_balanced(tokens: &[Token]) -> Result<(), ParseError> {
    let mut depth = Depth::default();
    for t in tokens {
        depth.step(t.kind);
    }
    let line = tokens.first().map_or(0, |t| t.line);
    let off = if depth.paren != 0 {
        Some(Nesting::Paren)
    } else if depth.brace != 0 {
        Some(Nesting::Brace)
    } else if depth.bracket != 0 {
        Some(Nesting::Bracket)
    } else {
        None
    };
    match off {
        Some(kind) => Err(ParseError::UnbalancedNesting { line, kind }),
        None => Ok(()),
    }
}

/// Content strictly between `tokens[at]` (which must be `open`) and its
/// matching `close`, plus the index just past the closer.
pub fn bracket_content(
    tokens: &[Token],
    at: usize,
    open: TokenKind,
    close: TokenKind,
) -> Option<(&[Token], usize)> {
    if !tokens.get(at)?.is(open) {
        return None;
    }
    let mut depth = 0usize;
    for (i, t) in tokens.iter().enumerate().skip(at) {
        if t.is(open) {
            depth += 1;
        } else if t.is(close) {
            depth -= 1;
            if depth == 0 {
                return Some((&tokens[at + 1..i], i + 1));
            }
        }
    }
    None
}

/// Split at commas outside every bracket kind. Always yields at least one
/// (possibly empty) piece.
pub fn split_by_comma(tokens: &[Token]) -> Vec<&[Token]> {
    let mut pieces = Vec::new();
    let mut depth = Depth::default();
    let mut start = 0;
    for (i, t) in tokens.iter().enumerate() {
        if depth.step(t.kind) {
            continue;
        }
        if depth.at_top() && t.is(TokenKind::Comma) {
            pieces.push(&tokens[start..i]);
            start = i + 1;
        }
    }
    pieces.push(&tokens[start..]);
    pieces
}

/// End index of a function literal `(args) -> [(returns)] { body }` starting
/// at `at`, if one starts there.
pub fn function_definition_end(tokens: &[Token], at: usize) -> Option<usize> {
    let (_, after_args) = bracket_content(tokens, at, TokenKind::LParen, TokenKind::RParen)?;
    if !tokens.get(after_args)?.is(TokenKind::Arrow) {
        return None;
    }
    let mut i = after_args + 1;
    if let Some((_, after_returns)) = bracket_content(tokens, i, TokenKind::LParen, TokenKind::RParen) {
        i = after_returns;
    }
    let (_, end) = bracket_content(tokens, i, TokenKind::LBrace, TokenKind::RBrace)?;
    Some(end)
}

/// End index of the atomic unit starting at `at`: a function literal, a
/// bracketed or parenthesised group, or a single token.
pub fn unit_end(tokens: &[Token], at: usize) -> usize {
    if let Some(end) = function_definition_end(tokens, at) {
        return end;
    }
    for (open, close) in [
        (TokenKind::LBracket, TokenKind::RBracket),
        (TokenKind::LParen, TokenKind::RParen),
    ] {
        if let Some((_, end)) = bracket_content(tokens, at, open, close) {
            return end;
        }
    }
    at + 1
}

/// Split juxtaposed sub-expressions: `f 1 + 2 [3]` -> `f`, `1 + 2`, `[3]`.
///
/// A binary operator glues its neighbours together. A `!` or `if` unit takes
/// every remaining token; its own pieces are recovered when it is parsed.
pub fn split_application_args(tokens: &[Token]) -> Vec<&[Token]> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut last_was_operator = true;
    let mut i = 0;
    while i < tokens.len() {
        let kind = tokens[i].kind;
        if kind.is_binary_operator() {
            last_was_operator = true;
            i += 1;
            continue;
        }
        if !last_was_operator {
            pieces.push(&tokens[start..i]);
            start = i;
        }
        last_was_operator = false;
        if matches!(kind, TokenKind::Bang | TokenKind::If) {
            i = tokens.len();
            break;
        }
        i = unit_end(tokens, i);
    }
    pieces.push(&tokens[start..i.min(tokens.len())]);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use bang_lexer::tokenize;

    fn window(src: &str) -> Vec<Token> {
        tokenize(src).into_iter().filter(|t| !t.is(TokenKind::Eof)).collect()
    }

    fn texts(pieces: &[&[Token]]) -> Vec<String> {
        pieces
            .iter()
            .map(|p| p.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" "))
            .collect()
    }

    #[test]
    fn bracket_content_finds_matching_partner() {
        let toks = window("(a (b) c) d");
        let (inner, after) = bracket_content(&toks, 0, TokenKind::LParen, TokenKind::RParen).unwrap();
        assert_eq!(inner.len(), 5);
        assert_eq!(after, 7);
        assert!(bracket_content(&toks, 7, TokenKind::LParen, TokenKind::RParen).is_none());
        let open = window("(a (b)");
        assert!(bracket_content(&open, 0, TokenKind::LParen, TokenKind::RParen).is_none());
    }

    #[test]
    fn comma_split_keeps_nested_groups_whole() {
        let toks = window("a, [b, c], !f (d, e), (x int) -> (int) { x, x }");
        assert_eq!(
            texts(&split_by_comma(&toks)),
            vec!["a", "[ b , c ]", "! f ( d , e )", "( x int ) -> ( int ) { x , x }"]
        );
    }

    #[test]
    fn comma_split_of_empty_window_is_one_empty_piece() {
        assert_eq!(split_by_comma(&[]).len(), 1);
    }

    #[test]
    fn application_split_respects_operators_and_groups() {
        let toks = window("f 1 + 2 [3, 4] (5 * 6) x");
        assert_eq!(
            texts(&split_application_args(&toks)),
            vec!["f", "1 + 2", "[ 3 , 4 ]", "( 5 * 6 )", "x"]
        );
    }

    #[test]
    fn nested_application_absorbs_the_rest() {
        let toks = window("f 1 !g 2 3");
        assert_eq!(texts(&split_application_args(&toks)), vec!["f", "1", "! g 2 3"]);
        let toks = window("c if a 1 else 2");
        assert_eq!(texts(&split_application_args(&toks)), vec!["c", "if a 1 else 2"]);
    }

    #[test]
    fn function_literal_is_one_unit() {
        let toks = window("(n int) -> { n + 1 } 5");
        assert_eq!(function_definition_end(&toks, 0), Some(10));
        assert_eq!(
            texts(&split_application_args(&toks)),
            vec!["( n int ) -> { n + 1 }", "5"]
        );
    }

    #[test]
    fn unbalanced_counts_are_reported() {
        let toks = window("(1 + 2");
        assert_eq!(
            check_balanced(&toks),
            Err(ParseError::UnbalancedNesting { line: 1, kind: Nesting::Paren })
        );
        assert!(check_balanced(&window("[ { ( ) } ]")).is_ok());
    }
}
