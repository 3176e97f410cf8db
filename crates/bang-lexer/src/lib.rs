use logos::Logos;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Logos, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[logos(skip r"[ \t\r\f]+")]
pub enum TokenKind {
    // Comments are produced by logos and dropped by `Lexer`
    #[regex(r"//[^\n]*")]
    LineComment,
    #[token("/*", skip_block_comment)]
    BlockComment,

    #[token("\n")]
    Newline,

    #[token("int")]
    #[token("float")]
    #[token("string")]
    #[token("bool")]
    Type,
    #[token("[]")]
    ArrayType,

    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,

    #[token("=")]
    Assign,
    #[token("->")]
    Arrow,
    #[token("!")]
    Bang,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("||")]
    PipePipe,
    #[token("&&")]
    AmpAmp,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEq,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEq,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    #[token("true")]
    #[token("false")]
    Bool,
    #[regex(r"[0-9]+")]
    Int,
    // At most one decimal point; a second '.' ends the literal
    #[regex(r"[0-9]+\.[0-9]*")]
    Float,
    #[token("\"", skip_string_body)]
    Str,
    // Unicode letters and decimal digits, as in `café` or `λ2`
    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*")]
    Ident,

    /// Never produced by logos: end of input
    Eof,
    /// Never produced by logos: unmatched input
    Illegal,
}

impl TokenKind {
    /// The fixed source text of keyword and punctuation kinds.
    pub fn literal(self) -> Option<&'static str> {
        Some(match self {
            TokenKind::Newline => "\n",
            TokenKind::ArrayType => "[]",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::Assign => "=",
            TokenKind::Arrow => "->",
            TokenKind::Bang => "!",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::EqEq => "==",
            TokenKind::BangEq => "!=",
            TokenKind::PipePipe => "||",
            TokenKind::AmpAmp => "&&",
            TokenKind::Greater => ">",
            TokenKind::GreaterEq => ">=",
            TokenKind::Less => "<",
            TokenKind::LessEq => "<=",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            _ => return None,
        })
    }

    /// Binary operators, as classified when splitting application arguments.
    pub fn is_binary_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::EqEq
                | TokenKind::BangEq
                | TokenKind::PipePipe
                | TokenKind::AmpAmp
                | TokenKind::Greater
                | TokenKind::GreaterEq
                | TokenKind::Less
                | TokenKind::LessEq
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::LineComment => "LINE_COMMENT",
            TokenKind::BlockComment => "BLOCK_COMMENT",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Type => "TYPE",
            TokenKind::ArrayType => "ARRAY_TYPE",
            TokenKind::Return => "RETURN",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Arrow => "ARROW",
            TokenKind::Bang => "BANG",
            TokenKind::Comma => "COMMA",
            TokenKind::Colon => "COLON",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "STAR",
            TokenKind::Slash => "SLASH",
            TokenKind::EqEq => "EQUAL",
            TokenKind::BangEq => "NOT_EQUAL",
            TokenKind::PipePipe => "OR",
            TokenKind::AmpAmp => "AND",
            TokenKind::Greater => "GREATER",
            TokenKind::GreaterEq => "GREATER_EQUAL",
            TokenKind::Less => "LESS",
            TokenKind::LessEq => "LESS_EQUAL",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Bool => "BOOL",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::Str => "STRING",
            TokenKind::Ident => "VARIABLE",
            TokenKind::Eof => "EOF",
            TokenKind::Illegal => "ILLEGAL",
        };
        f.write_str(name)
    }
}

fn skip_block_comment(lex: &mut logos::Lexer<TokenKind>) {
    // We have just matched "/*"; consume with nesting until the matching "*/"
    let bytes = lex.remainder().as_bytes();
    let mut i = 0usize;
    let mut depth = 1i32;
    while i + 1 < bytes.len() {
        if bytes[i] == b'/' && bytes[i + 1] == b'*' {
            depth += 1;
            i += 2;
            continue;
        }
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            depth -= 1;
            i += 2;
            if depth == 0 {
                lex.bump(i);
                return;
            }
            continue;
        }
        i += 1;
    }
    // Unterminated: consume the rest
    lex.bump(bytes.len());
}

fn skip_string_body(lex: &mut logos::Lexer<TokenKind>) {
    let rest = lex.remainder();
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => {
                lex.bump(i + 1);
                return;
            }
            _ => {}
        }
    }
    lex.bump(rest.len());
}

/// Strips the quotes from a raw string slice and resolves escapes.
fn unquote(raw: &str) -> String {
    let mut out = String::new();
    let mut chars = raw.chars().skip(1);
    while let Some(c) = chars.next() {
        match c {
            '"' => break,
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('0') => out.push('\0'),
                // Unknown escape, keep the escaped character literally
                Some(other) => out.push(other),
                None => break,
            },
            other => out.push(other),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self { kind, text: text.into(), line }
    }

    /// A token that does not come from source text (e.g. the `return`
    /// prefixed to one-line function bodies, or re-wrapped brackets).
    pub fn synthetic(kind: TokenKind, line: usize) -> Self {
        Self::new(kind, kind.literal().unwrap_or_default(), line)
    }

    pub fn eof(line: usize) -> Self {
        Self::new(TokenKind::Eof, "", line)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Human-readable description used in diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Newline => "end of line".to_string(),
            TokenKind::Str => format!("string \"{}\"", self.text.escape_default()),
            _ => format!("'{}'", self.text),
        }
    }
}

/// Lazy, forward-only token stream over a source text.
///
/// Whitespace and comments are skipped; every line break is itself a
/// `Newline` token. Once the input is exhausted every further call to
/// [`Lexer::next_token`] returns an `Eof` token.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    line: usize,
    done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { inner: TokenKind::lexer(source), line: 1, done: false }
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            let Some(result) = self.inner.next() else {
                return Token::eof(self.line);
            };
            let slice = self.inner.slice();
            let line = self.line;
            self.line += slice.matches('\n').count();
            match result {
                Ok(TokenKind::LineComment | TokenKind::BlockComment) => continue,
                Ok(TokenKind::Str) => return Token::new(TokenKind::Str, unquote(slice), line),
                Ok(kind) => return Token::new(kind, slice, line),
                Err(()) => return Token::new(TokenKind::Illegal, slice, line),
            }
        }
    }
}

/// Yields every token up to and including the first `Eof`.
impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        let tok = self.next_token();
        self.done = tok.is(TokenKind::Eof);
        Some(tok)
    }
}

/// Convenience: lex a whole source text, the trailing `Eof` included.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn longest_operator_wins() {
        assert_eq!(
            kinds("!= ! -> - == = [] ["),
            vec![
                TokenKind::BangEq,
                TokenKind::Bang,
                TokenKind::Arrow,
                TokenKind::Minus,
                TokenKind::EqEq,
                TokenKind::Assign,
                TokenKind::ArrayType,
                TokenKind::LBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_need_word_boundary() {
        assert_eq!(
            kinds("if iffy intx int"),
            vec![TokenKind::If, TokenKind::Ident, TokenKind::Ident, TokenKind::Type, TokenKind::Eof]
        );
    }

    #[test]
    fn unquote_resolves_escapes() {
        assert_eq!(unquote(r#""a\"b\n""#), "a\"b\n");
        assert_eq!(unquote(r#""open"#), "open");
    }

    #[test]
    fn eof_repeats() {
        let mut lx = Lexer::new("x");
        assert!(lx.next_token().is(TokenKind::Ident));
        assert!(lx.next_token().is(TokenKind::Eof));
        assert!(lx.next_token().is(TokenKind::Eof));
    }
}
