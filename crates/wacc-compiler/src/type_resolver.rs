//! Resolution of written type annotations to semantic types.

use wacc_core::Type;
use wacc_parser::ast::{BaseType, PairElemType, TypeExpr};

/// Resolve a type annotation. Every written type is well-formed once parsed,
/// so this cannot fail.
pub fn resolve(ty: &TypeExpr<'_>) -> Type {
    match ty {
        TypeExpr::Base(base, _) => resolve_base(*base),
        TypeExpr::Array(elem, _) => Type::array_of(resolve(elem)),
        TypeExpr::Pair(fst, snd, _) => Type::pair_of(resolve_pair_elem(fst), resolve_pair_elem(snd)),
    }
}

fn resolve_base(base: BaseType) -> Type {
    match base {
        BaseType::Int => Type::Int,
        BaseType::Bool => Type::Bool,
        BaseType::Char => Type::Char,
        BaseType::String => Type::String,
    }
}

/// A bare `pair` element is left for the use site to pin down.
fn resolve_pair_elem(elem: &PairElemType<'_>) -> Type {
    match elem {
        PairElemType::Type(ty) => resolve(ty),
        PairElemType::Pair(_) => Type::AnyPair,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use wacc_parser::Parser;
    use wacc_parser::ast::Stmt;

    fn resolve_decl(source: &str) -> Type {
        let arena = Bump::new();
        match Parser::statement(source, &arena).unwrap() {
            Stmt::Decl(decl) => resolve(&decl.ty),
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn resolves_nested_types() {
        assert_eq!(resolve_decl("int[][] a = []"), Type::array_of(Type::array_of(Type::Int)));
        assert_eq!(
            resolve_decl("pair(char, pair) p = null"),
            Type::pair_of(Type::Char, Type::AnyPair)
        );
        assert_eq!(
            resolve_decl("pair(int, bool)[] ps = []"),
            Type::array_of(Type::pair_of(Type::Int, Type::Bool))
        );
    }
}
