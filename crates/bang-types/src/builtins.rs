//! Signatures of the built-in array functions.
//!
//! `?a` marks a type hole: it is bound per call site by the argument types.

use bang_ast::types::{FunctionType, Type};

pub const BUILTIN_NAMES: [&str; 5] = ["get", "set", "length", "take", "tail"];

fn array_of_a() -> Type {
    Type::array(Type::hole("a"))
}

/// `get([]?a, int) -> (?a)` and friends; `None` for any other name.
pub fn builtin(name: &str) -> Option<FunctionType> {
    let (arguments, returns) = match name {
        "get" => (vec![array_of_a(), Type::int()], vec![Type::hole("a")]),
        "set" => (vec![array_of_a(), Type::int(), Type::hole("a")], vec![array_of_a()]),
        "length" => (vec![array_of_a()], vec![Type::int()]),
        "take" => (vec![Type::int(), array_of_a()], vec![array_of_a()]),
        "tail" => (vec![array_of_a()], vec![array_of_a()]),
        _ => return None,
    };
    Some(FunctionType::new(arguments, returns))
}
