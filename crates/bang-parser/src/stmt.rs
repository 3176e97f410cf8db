use crate::expr::expression;
use crate::segment::split_by_comma;
use crate::source::{SliceSource, TokenSource};
use crate::type_literal::parse_type_literal;
use crate::ParseError;
use bang_ast::ast::{Assignment, Block, Program, Return, Statement, Variable};
use bang_lexer::{Token, TokenKind};
use tracing::{debug, trace};

/// Statement loop over any token source.
pub struct Parser<S: TokenSource> {
    source: S,
}

impl<S: TokenSource> Parser<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    fn next(&mut self) -> Result<Token, ParseError> {
        let tok = self.source.next_token();
        if tok.is(TokenKind::Illegal) {
            return Err(ParseError::IllegalCharacter { line: tok.line, ch: tok.text });
        }
        Ok(tok)
    }

    pub fn parse_program(mut self) -> Result<Program, ParseError> {
        let mut body = Block::default();
        loop {
            let tok = self.next()?;
            match tok.kind {
                TokenKind::Eof => break,
                TokenKind::Newline => continue,
                _ => body.statements.push(self.statement(tok)?),
            }
        }
        Ok(Program { body })
    }

    fn statement(&mut self, first: Token) -> Result<Statement, ParseError> {
        let line = first.line;
        match first.kind {
            TokenKind::Ident => {
                let mut lhs = vec![first];
                loop {
                    let tok = self.next()?;
                    match tok.kind {
                        TokenKind::Assign => break,
                        TokenKind::Newline | TokenKind::Eof => {
                            return Err(ParseError::UnexpectedToken {
                                line: tok.line,
                                found: tok.describe(),
                                expected: "=".into(),
                            })
                        }
                        _ => lhs.push(tok),
                    }
                }
                let variables = parse_variable_list(&lhs)?;
                let rhs = self.expression_tokens()?;
                let value = expression(&rhs, line)?;
                debug!(line, variables = variables.len(), "assignment");
                Ok(Statement::Assignment(Assignment { variables, value, line }))
            }
            TokenKind::Return => {
                let rest = self.expression_tokens()?;
                let expressions = if rest.is_empty() {
                    Vec::new()
                } else {
                    split_by_comma(&rest)
                        .into_iter()
                        .map(|piece| expression(piece, line))
                        .collect::<Result<Vec<_>, _>>()?
                };
                debug!(line, values = expressions.len(), "return");
                Ok(Statement::Return(Return { expressions, line }))
            }
            _ => Err(ParseError::UnexpectedToken {
                line,
                found: first.describe(),
                expected: "start of statement".into(),
            }),
        }
    }

    /// Everything up to the end of the logical line. Newlines inside a brace
    /// pair belong to a function body and do not end the line.
    fn expression_tokens(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut out = Vec::new();
        let mut braces = 0usize;
        loop {
            let tok = self.next()?;
            match tok.kind {
                TokenKind::Eof => {
                    if braces != 0 {
                        return Err(ParseError::UnexpectedToken {
                            line: tok.line,
                            found: "end of file".into(),
                            expected: "end of function".into(),
                        });
                    }
                    // leave Eof for the statement loop
                    self.source.push_back(vec![tok]);
                    return Ok(out);
                }
                TokenKind::Newline if braces == 0 => return Ok(out),
                TokenKind::LBrace => braces += 1,
                TokenKind::RBrace => {
                    if braces == 0 {
                        return Err(ParseError::InvalidToken { line: tok.line, token: tok.describe() });
                    }
                    braces -= 1;
                }
                _ => {}
            }
            out.push(tok);
        }
    }
}

/// Parse a function body window through the same statement loop.
pub(crate) fn parse_body(tokens: Vec<Token>, eof_line: usize) -> Result<Block, ParseError> {
    trace!(tokens = tokens.len(), eof_line, "function body");
    Parser::new(SliceSource::new(tokens, eof_line)).parse_program().map(|p| p.body)
}

/// `a, b int, c: []float` as used on the left of `=` and in argument lists.
pub(crate) fn parse_variable_list(tokens: &[Token]) -> Result<Vec<Variable>, ParseError> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let tok = &tokens[i];
        if !tok.is(TokenKind::Ident) {
            return Err(ParseError::UnexpectedToken {
                line: tok.line,
                found: tok.describe(),
                expected: "identifier".into(),
            });
        }
        i += 1;
        let colon = tokens.get(i).is_some_and(|t| t.is(TokenKind::Colon));
        if colon {
            i += 1;
        }
        let ty = match parse_type_literal(tokens, i)? {
            Some((ty, next)) => {
                i = next;
                Some(ty)
            }
            None if colon => {
                return Err(ParseError::UnexpectedToken {
                    line: tok.line,
                    found: tokens.get(i).map_or_else(|| "end of line".to_string(), Token::describe),
                    expected: "type".into(),
                })
            }
            None => None,
        };
        out.push(Variable::new(tok.text.clone(), ty));
        match tokens.get(i) {
            None => {}
            Some(t) if t.is(TokenKind::Comma) => {
                i += 1;
                if i == tokens.len() {
                    return Err(ParseError::UnexpectedToken {
                        line: t.line,
                        found: "end of list".into(),
                        expected: "identifier".into(),
                    });
                }
            }
            Some(t) => {
                return Err(ParseError::UnexpectedToken {
                    line: t.line,
                    found: t.describe(),
                    expected: "','".into(),
                })
            }
        }
    }
    Ok(out)
}
