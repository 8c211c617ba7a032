//! Binary operator typing.

use wacc_core::{BinaryOp, CompilationError, Parsed, Span, Type, TypeSet};

/// Result type of `left op right`.
///
/// Each operand outside the operator's accepted set gets its own error.
pub fn resolve_binary(op: BinaryOp, left: (&Type, Span), right: (&Type, Span)) -> Parsed<Type> {
    if op.is_arithmetic() {
        require_both(op, &[Type::Int], left, right).map(|()| Type::Int)
    } else if op.is_logical() {
        require_both(op, &[Type::Bool], left, right).map(|()| Type::Bool)
    } else if op.is_comparison() {
        require_both(op, &[Type::Int, Type::Char], left, right)?;
        require_same(left, right).map(|()| Type::Bool)
    } else {
        require_same(left, right).map(|()| Type::Bool)
    }
}

fn require_both(op: BinaryOp, allowed: &[Type], left: (&Type, Span), right: (&Type, Span)) -> Parsed<()> {
    let errors: Vec<_> = [left, right]
        .into_iter()
        .filter(|(ty, _)| !allowed.contains(ty))
        .map(|(ty, span)| {
            CompilationError::type_error(TypeSet(allowed.to_vec()), ty.clone(), op.as_str(), span)
        })
        .collect();
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Both sides must have one type; placeholders unify with their concrete kind.
fn require_same(left: (&Type, Span), right: (&Type, Span)) -> Parsed<()> {
    match left.0.unify(right.0) {
        Some(_) => Ok(()),
        None => Err(vec![CompilationError::UnexpectedType {
            expected: left.0.clone(),
            actual: right.0.clone(),
            span: right.1,
        }]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(col: u32) -> Span {
        Span::new(1, col, 1)
    }

    #[test]
    fn arithmetic_needs_ints() {
        assert_eq!(resolve_binary(BinaryOp::Add, (&Type::Int, at(1)), (&Type::Int, at(5))), Ok(Type::Int));

        let errors = resolve_binary(BinaryOp::Mul, (&Type::Char, at(1)), (&Type::Bool, at(5))).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].span(), at(1));
        assert_eq!(errors[1].span(), at(5));
    }

    #[test]
    fn comparison_accepts_matching_int_or_char() {
        assert_eq!(resolve_binary(BinaryOp::Less, (&Type::Char, at(1)), (&Type::Char, at(5))), Ok(Type::Bool));
        assert!(resolve_binary(BinaryOp::Less, (&Type::Int, at(1)), (&Type::Char, at(5))).is_err());
        assert!(resolve_binary(BinaryOp::GreaterEqual, (&Type::String, at(1)), (&Type::String, at(5))).is_err());
    }

    #[test]
    fn equality_accepts_any_matching_types() {
        let pair = Type::pair_of(Type::Int, Type::Int);
        assert_eq!(resolve_binary(BinaryOp::Equal, (&pair, at(1)), (&Type::AnyPair, at(5))), Ok(Type::Bool));
        assert_eq!(resolve_binary(BinaryOp::NotEqual, (&Type::Bool, at(1)), (&Type::Bool, at(5))), Ok(Type::Bool));

        let errors = resolve_binary(BinaryOp::Equal, (&Type::Int, at(1)), (&Type::Char, at(5))).unwrap_err();
        assert_eq!(
            errors,
            vec![CompilationError::UnexpectedType {
                expected: Type::Int,
                actual: Type::Char,
                span: at(5),
            }]
        );
    }

    #[test]
    fn logical_needs_bools() {
        assert_eq!(resolve_binary(BinaryOp::And, (&Type::Bool, at(1)), (&Type::Bool, at(5))), Ok(Type::Bool));
        assert!(resolve_binary(BinaryOp::Or, (&Type::Int, at(1)), (&Type::Bool, at(5))).is_err());
    }
}
