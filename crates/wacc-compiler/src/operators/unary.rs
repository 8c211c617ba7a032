//! Unary operator typing.

use wacc_core::{CompilationError, Parsed, Span, Type, TypeSet, UnaryOp, fail};

/// Result type of applying `op` to an operand of type `operand`.
pub fn resolve_unary(op: UnaryOp, operand: &Type, span: Span) -> Parsed<Type> {
    let (accepts, result) = match op {
        UnaryOp::Not => (operand == &Type::Bool, Type::Bool),
        UnaryOp::Neg => (operand == &Type::Int, Type::Int),
        UnaryOp::Len => (operand.is_array(), Type::Int),
        UnaryOp::Ord => (operand == &Type::Char, Type::Int),
        UnaryOp::Chr => (operand == &Type::Int, Type::Char),
    };

    if accepts {
        Ok(result)
    } else {
        fail(CompilationError::type_error(
            expected_operand(op),
            operand.clone(),
            op.as_str(),
            span,
        ))
    }
}

fn expected_operand(op: UnaryOp) -> TypeSet {
    let ty = match op {
        UnaryOp::Not => Type::Bool,
        UnaryOp::Neg | UnaryOp::Chr => Type::Int,
        UnaryOp::Len => Type::AnyArray,
        UnaryOp::Ord => Type::Char,
    };
    TypeSet::from(ty)
}
