//! Matching call-site argument types against a declared signature.
//!
//! Only declared types may contain holes. A hole binds to the first actual
//! type it meets and must match that binding everywhere else.

use ahash::AHashMap;
use bang_ast::types::{FunctionType, Type};
use tracing::trace;

pub type Bindings = AHashMap<String, Type>;

/// Whether `actual` fits `expected`, recording hole bindings on the way.
pub fn bind_argument(expected: &Type, actual: &Type, bindings: &mut Bindings) -> bool {
    match (expected, actual) {
        (Type::AnyHole(name), _) => match bindings.get(name) {
            Some(bound) => bound == actual,
            None => {
                trace!(hole = %name, ty = %actual, "type hole bound");
                bindings.insert(name.clone(), actual.clone());
                true
            }
        },
        (Type::Array(e), Type::Array(a)) => bind_argument(e, a, bindings),
        (Type::Function(e), Type::Function(a)) => {
            e.arguments.len() == a.arguments.len()
                && e.returns.len() == a.returns.len()
                && e.arguments.iter().zip(&a.arguments).all(|(x, y)| bind_argument(x, y, bindings))
                && e.returns.iter().zip(&a.returns).all(|(x, y)| bind_argument(x, y, bindings))
        }
        _ => expected == actual,
    }
}

/// Replace every hole in `ty` by its binding. `Err` names the first hole
/// that has none.
pub fn substitute(ty: &Type, bindings: &Bindings) -> Result<Type, String> {
    Ok(match ty {
        Type::AnyHole(name) => bindings.get(name).cloned().ok_or_else(|| name.clone())?,
        Type::Array(el) => Type::array(substitute(el, bindings)?),
        Type::Function(ft) => Type::Function(FunctionType {
            arguments: ft
                .arguments
                .iter()
                .map(|t| substitute(t, bindings))
                .collect::<Result<_, _>>()?,
            returns: ft.returns.iter().map(|t| substitute(t, bindings)).collect::<Result<_, _>>()?,
            type_index: ft.type_index,
        }),
        Type::Standard(_) => ty.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hole_binds_once_and_must_agree() {
        let mut b = Bindings::default();
        let expected = Type::array(Type::hole("a"));
        assert!(bind_argument(&expected, &Type::array(Type::int()), &mut b));
        assert!(bind_argument(&Type::hole("a"), &Type::int(), &mut b));
        assert!(!bind_argument(&Type::hole("a"), &Type::float(), &mut b));
        assert!(!bind_argument(&expected, &Type::array(Type::bool()), &mut b));
    }

    #[test]
    fn hole_can_bind_an_array() {
        let mut b = Bindings::default();
        assert!(bind_argument(
            &Type::array(Type::hole("a")),
            &Type::array(Type::array(Type::string())),
            &mut b
        ));
        assert_eq!(
            substitute(&Type::array(Type::hole("a")), &b).unwrap().to_string(),
            "[][]string"
        );
    }

    #[test]
    fn array_expectation_rejects_scalars() {
        let mut b = Bindings::default();
        assert!(!bind_argument(&Type::array(Type::hole("a")), &Type::int(), &mut b));
        assert!(b.is_empty());
    }

    #[test]
    fn unbound_hole_is_reported() {
        let b = Bindings::default();
        assert_eq!(substitute(&Type::array(Type::hole("z")), &b), Err("z".to_string()));
        assert_eq!(substitute(&Type::int(), &b), Ok(Type::int()));
    }
}
