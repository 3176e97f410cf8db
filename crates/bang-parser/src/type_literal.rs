use crate::segment::{bracket_content, split_by_comma};
use crate::ParseError;
use bang_ast::types::{Primitive, Type};
use bang_lexer::{Token, TokenKind};

/// Try to read a type literal at `pos`.
///
/// `Ok(None)` means no type starts here, which callers treat as "infer
/// later". Errors are reserved for a type that starts but is malformed.
pub fn parse_type_literal(tokens: &[Token], pos: usize) -> Result<Option<(Type, usize)>, ParseError> {
    let Some(tok) = tokens.get(pos) else {
        return Ok(None);
    };
    match tok.kind {
        TokenKind::Type => match Primitive::from_name(&tok.text) {
            Some(p) => Ok(Some((Type::Standard(p), pos + 1))),
            None => Err(ParseError::Internal(format!("unknown type name {}", tok.text))),
        },
        TokenKind::ArrayType => match parse_type_literal(tokens, pos + 1)? {
            Some((element, next)) => Ok(Some((Type::array(element), next))),
            None => Err(ParseError::UnexpectedToken {
                line: tok.line,
                found: tokens
                    .get(pos + 1)
                    .map_or_else(|| "end of type".to_string(), Token::describe),
                expected: "element type after []".into(),
            }),
        },
        TokenKind::LParen => {
            let Some((arguments, after_args)) =
                bracket_content(tokens, pos, TokenKind::LParen, TokenKind::RParen)
            else {
                return Ok(None);
            };
            if !tokens.get(after_args).is_some_and(|t| t.is(TokenKind::Arrow)) {
                return Ok(None);
            }
            let Some((returns, end)) =
                bracket_content(tokens, after_args + 1, TokenKind::LParen, TokenKind::RParen)
            else {
                return Ok(None);
            };
            let ty = Type::function(parse_type_list(arguments)?, parse_type_list(returns)?);
            Ok(Some((ty, end)))
        }
        _ => Ok(None),
    }
}

/// A comma separated list of type literals; `()` content yields no types.
pub fn parse_type_list(tokens: &[Token]) -> Result<Vec<Type>, ParseError> {
    let mut out = Vec::new();
    for piece in split_by_comma(tokens) {
        let Some(first) = piece.first() else {
            continue;
        };
        match parse_type_literal(piece, 0)? {
            Some((ty, next)) => {
                if let Some(extra) = piece.get(next) {
                    return Err(ParseError::InvalidToken { line: extra.line, token: extra.describe() });
                }
                out.push(ty);
            }
            None => {
                return Err(ParseError::UnexpectedToken {
                    line: first.line,
                    found: first.describe(),
                    expected: "type".into(),
                })
            }
        }
    }
    Ok(out)
}
