//! Expression windows to expression nodes.
//!
//! A window is a flat token slice with no statement terminator in it. The
//! outermost structure is recovered by scanning: leading `!` or `if` first,
//! then the loosest operator tier present at depth zero, then the
//! bracketed forms.

use crate::segment::{
    bracket_content, check_balanced, function_definition_end, split_application_args,
    split_by_comma, unit_end, Depth,
};
use crate::stmt::{parse_body, parse_variable_list};
use crate::type_literal::parse_type_list;
use crate::ParseError;
use bang_ast::ast::{Apply, ArrayLiteral, BinaryOp, Expr, FunctionDefinition, If};
use bang_lexer::{Token, TokenKind};

/// Operator tiers, loosest first. The split point within a tier is the last
/// match at depth zero, so every tier is left-associative.
/// `&&`, `>` and `<` are added to the loosest tier next to `||`, `>=` and `<=`.
const TIERS: [&[TokenKind]; 3] = [
    &[
        TokenKind::PipePipe,
        TokenKind::AmpAmp,
        TokenKind::EqEq,
        TokenKind::BangEq,
        TokenKind::GreaterEq,
        TokenKind::LessEq,
        TokenKind::Greater,
        TokenKind::Less,
    ],
    &[TokenKind::Plus, TokenKind::Minus],
    &[TokenKind::Star, TokenKind::Slash],
];

/// Parse a whole window as one expression.
pub fn parse_expression(tokens: &[Token]) -> Result<Expr, ParseError> {
    expression(tokens, tokens.first().map_or(1, |t| t.line))
}

/// `line` locates the error if the window turns out to be empty.
pub(crate) fn expression(tokens: &[Token], line: usize) -> Result<Expr, ParseError> {
    let Some(first) = tokens.first() else {
        return Err(ParseError::EmptyExpression { line });
    };
    check_balanced(tokens)?;

    if tokens.len() == 1 {
        return single(first);
    }
    match first.kind {
        TokenKind::Bang => return application(tokens),
        TokenKind::If => return if_expression(tokens),
        _ => {}
    }
    for tier in TIERS {
        if let Some(pos) = find_split(tokens, tier) {
            return operator(tokens, pos);
        }
    }
    if let Some(end) = function_definition_end(tokens, 0) {
        if end == tokens.len() {
            return function_definition(tokens);
        }
    }
    if let Some((inner, after)) = bracket_content(tokens, 0, TokenKind::LParen, TokenKind::RParen) {
        if after == tokens.len() {
            return expression(inner, first.line);
        }
    }
    if let Some((inner, after)) = bracket_content(tokens, 0, TokenKind::LBracket, TokenKind::RBracket)
    {
        if after == tokens.len() {
            return array(inner, first.line);
        }
    }
    // Nothing spans the window: the token after the first unit is the culprit.
    let culprit = tokens.get(unit_end(tokens, 0)).unwrap_or(first);
    Err(ParseError::InvalidToken { line: culprit.line, token: culprit.describe() })
}

fn single(tok: &Token) -> Result<Expr, ParseError> {
    match tok.kind {
        TokenKind::Int => tok
            .text
            .parse::<i64>()
            .map(Expr::Int)
            .map_err(|_| ParseError::InvalidToken { line: tok.line, token: tok.describe() }),
        TokenKind::Float => tok
            .text
            .parse::<f64>()
            .map(Expr::Float)
            .map_err(|e| ParseError::Internal(format!("float token {}: {e}", tok.text))),
        TokenKind::Str => Ok(Expr::Str(tok.text.clone())),
        TokenKind::Bool => Ok(Expr::Bool(tok.text == "true")),
        TokenKind::Ident => Ok(Expr::variable(&tok.text)),
        // `[]` lexes as the array type marker
        TokenKind::ArrayType => Ok(Expr::Array(ArrayLiteral { element_type: None, elements: vec![] })),
        TokenKind::Illegal => Err(ParseError::IllegalCharacter { line: tok.line, ch: tok.text.clone() }),
        _ => Err(ParseError::InvalidToken { line: tok.line, token: tok.describe() }),
    }
}

/// Last depth-zero position of any `tier` operator, scanning up to the first
/// top-level `!` or `if` (those take the rest of the window as one operand).
fn find_split(tokens: &[Token], tier: &[TokenKind]) -> Option<usize> {
    let mut depth = Depth::default();
    let mut found = None;
    for (i, t) in tokens.iter().enumerate() {
        if depth.step(t.kind) || !depth.at_top() {
            continue;
        }
        if matches!(t.kind, TokenKind::Bang | TokenKind::If) {
            break;
        }
        if tier.contains(&t.kind) {
            found = Some(i);
        }
    }
    found
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::BangEq => BinaryOp::NotEq,
        TokenKind::PipePipe => BinaryOp::Or,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::GreaterEq => BinaryOp::GreaterEq,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::LessEq => BinaryOp::LessEq,
        _ => return None,
    })
}

fn operator(tokens: &[Token], pos: usize) -> Result<Expr, ParseError> {
    let tok = &tokens[pos];
    let op = binary_op(tok.kind)
        .ok_or_else(|| ParseError::Internal(format!("{} is not a binary operator", tok.kind)))?;
    let left = expression(&tokens[..pos], tok.line)?;
    let right = expression(&tokens[pos + 1..], tok.line)?;
    Ok(Expr::operator(op, left, right))
}

fn application(tokens: &[Token]) -> Result<Expr, ParseError> {
    let bang = &tokens[0];
    let rest = &tokens[1..];
    if rest.is_empty() {
        return Err(ParseError::UnexpectedToken {
            line: bang.line,
            found: "end of expression".into(),
            expected: "function after !".into(),
        });
    }
    let pieces = split_application_args(rest);
    let (callee, args) = pieces
        .split_first()
        .ok_or_else(|| ParseError::Internal("application split produced no pieces".into()))?;
    let function = expression(callee, bang.line)?;
    let arguments = args
        .iter()
        .map(|piece| expression(piece, bang.line))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Expr::Apply(Apply { function: Box::new(function), arguments, return_types: vec![] }))
}

/// Index of the `else` that closes the `if` at index 0. Inner `if`s at the
/// same depth claim the `else`s they meet first.
fn matching_else(tokens: &[Token]) -> Option<usize> {
    let mut depth = Depth::default();
    let mut open_ifs = 0usize;
    for (i, t) in tokens.iter().enumerate().skip(1) {
        if depth.step(t.kind) || !depth.at_top() {
            continue;
        }
        match t.kind {
            TokenKind::If => open_ifs += 1,
            TokenKind::Else if open_ifs == 0 => return Some(i),
            TokenKind::Else => open_ifs -= 1,
            _ => {}
        }
    }
    None
}

fn if_expression(tokens: &[Token]) -> Result<Expr, ParseError> {
    let if_tok = &tokens[0];
    let Some(else_pos) = matching_else(tokens) else {
        return Err(ParseError::UnexpectedToken {
            line: if_tok.line,
            found: "end of expression".into(),
            expected: "else".into(),
        });
    };
    let head = split_application_args(&tokens[1..else_pos]);
    let [condition, true_branch] = head.as_slice() else {
        return Err(ParseError::Syntax {
            line: if_tok.line,
            message: format!(
                "expected a condition and one expression between if and else, found {} expression(s)",
                head.iter().filter(|p| !p.is_empty()).count()
            ),
        });
    };
    let else_line = tokens[else_pos].line;
    Ok(Expr::If(If {
        condition: Box::new(expression(condition, if_tok.line)?),
        true_branch: Box::new(expression(true_branch, if_tok.line)?),
        false_branch: Box::new(expression(&tokens[else_pos + 1..], else_line)?),
        return_types: vec![],
    }))
}

fn array(inner: &[Token], line: usize) -> Result<Expr, ParseError> {
    let elements = if inner.is_empty() {
        Vec::new()
    } else {
        split_by_comma(inner)
            .into_iter()
            .map(|piece| expression(piece, line))
            .collect::<Result<Vec<_>, _>>()?
    };
    Ok(Expr::Array(ArrayLiteral { element_type: None, elements }))
}

/// `(args) -> [(returns)] { body }` covering the whole window.
fn function_definition(tokens: &[Token]) -> Result<Expr, ParseError> {
    let line = tokens[0].line;
    let (args, after_args) = bracket_content(tokens, 0, TokenKind::LParen, TokenKind::RParen)
        .ok_or_else(|| ParseError::Internal("function literal without argument list".into()))?;
    let mut i = after_args + 1;
    let mut return_types = Vec::new();
    let mut return_types_omitted = true;
    if let Some((returns, after)) = bracket_content(tokens, i, TokenKind::LParen, TokenKind::RParen) {
        return_types = parse_type_list(returns)?;
        return_types_omitted = false;
        i = after;
    }
    let (body, end) = bracket_content(tokens, i, TokenKind::LBrace, TokenKind::RBrace)
        .ok_or_else(|| ParseError::Internal("function literal without body".into()))?;

    let arguments = parse_variable_list(args)?;
    let one_line = !body.iter().any(|t| t.is(TokenKind::Newline));
    if !one_line && return_types_omitted {
        return Err(ParseError::Syntax {
            line,
            message: "function with multiple lines must have specified return types".into(),
        });
    }
    let mut body_tokens = body.to_vec();
    if one_line {
        if let Some(first) = body.first() {
            if !first.is(TokenKind::Return) {
                body_tokens.insert(0, Token::synthetic(TokenKind::Return, first.line));
            }
        }
    }
    let eof_line = tokens[end - 1].line;
    let body = parse_body(body_tokens, eof_line)?;
    Ok(Expr::FunctionDefinition(FunctionDefinition {
        arguments,
        return_types,
        return_types_omitted,
        body,
        function_type: None,
    }))
}
