//! Type errors. Every variant carries the line of the statement being
//! validated when the rule was violated.

use bang_ast::ast::BinaryOp;
use bang_ast::types::Type;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("error on line {line}: identifier {name} is not defined")]
    UndefinedIdentifier { line: usize, name: String },
    #[error("error on line {line}: use of operator {op} on {left} and {right} not supported")]
    OperatorTypes { line: usize, op: BinaryOp, left: Type, right: Type },
    #[error("error on line {line}: operands of {op} must be single values, found ({left}) and ({right})")]
    MultiValueOperand { line: usize, op: BinaryOp, left: String, right: String },
    #[error("error on line {line}: condition in if expression must be a single bool, found ({found})")]
    ConditionNotBool { line: usize, found: String },
    #[error("error on line {line}: branches of if expression return ({then}) and ({otherwise})")]
    BranchMismatch { line: usize, then: String, otherwise: String },
    #[error("error on line {line}: array literal with zero elements is not valid")]
    EmptyArrayLiteral { line: usize },
    #[error("error on line {line}: can not add element {index} of type {found} to array of type []{expected}")]
    ArrayElementMismatch { line: usize, index: usize, expected: Type, found: Type },
    #[error("error on line {line}: {context} must be a single value, found ({found})")]
    MultiValueExpression { line: usize, context: &'static str, found: String },
    #[error("error on line {line}: expression after ! does not return a function, found ({found})")]
    NotAFunction { line: usize, found: String },
    #[error("error on line {line}: function expects {expected} argument(s), got {found}")]
    ArgumentCount { line: usize, expected: usize, found: usize },
    #[error("error on line {line}: argument {position} does not match, expected {expected}, found {found}")]
    ArgumentType { line: usize, position: usize, expected: Type, found: Type },
    #[error("error on line {line}: type ?{name} is never bound by the arguments")]
    UnresolvedTypeHole { line: usize, name: String },
    #[error("error on line {line}: {variables} variable(s) assigned from {values} value(s)")]
    AssignmentArity { line: usize, variables: usize, values: usize },
    #[error("error on line {line}: {name} is declared {declared} but assigned {found}")]
    AnnotationMismatch { line: usize, name: String, declared: Type, found: Type },
    #[error("error on line {line}: attempt at mutating global variable {name}")]
    GlobalMutation { line: usize, name: String },
    #[error("error on line {line}: attempt at changing type of {name} from {previous} to {found}")]
    LocalTypeChange { line: usize, name: String, previous: Type, found: Type },
    #[error("error on line {line}: recursive function {name} must have specified return types")]
    RecursiveWithoutReturnTypes { line: usize, name: String },
    #[error("error on line {line}: function with no specified return types must have exactly one return statement, found {found}")]
    MissingReturnTypes { line: usize, found: usize },
    #[error("error on line {line}: function argument {name} must have a type")]
    UntypedArgument { line: usize, name: String },
    #[error("error on line {line}: return statement outside of a function")]
    ReturnOutsideFunction { line: usize },
}

impl TypeError {
    pub fn line(&self) -> usize {
        match self {
            TypeError::UndefinedIdentifier { line, .. }
            | TypeError::OperatorTypes { line, .. }
            | TypeError::MultiValueOperand { line, .. }
            | TypeError::ConditionNotBool { line, .. }
            | TypeError::BranchMismatch { line, .. }
            | TypeError::EmptyArrayLiteral { line }
            | TypeError::ArrayElementMismatch { line, .. }
            | TypeError::MultiValueExpression { line, .. }
            | TypeError::NotAFunction { line, .. }
            | TypeError::ArgumentCount { line, .. }
            | TypeError::ArgumentType { line, .. }
            | TypeError::UnresolvedTypeHole { line, .. }
            | TypeError::AssignmentArity { line, .. }
            | TypeError::AnnotationMismatch { line, .. }
            | TypeError::GlobalMutation { line, .. }
            | TypeError::LocalTypeChange { line, .. }
            | TypeError::RecursiveWithoutReturnTypes { line, .. }
            | TypeError::MissingReturnTypes { line, .. }
            | TypeError::UntypedArgument { line, .. }
            | TypeError::ReturnOutsideFunction { line } => *line,
        }
    }
}
