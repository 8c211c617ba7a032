//! The semantic type system.
//!
//! WACC has a closed set of types. `AnyArray` and `AnyPair` are placeholders
//! for values whose element types are not known where they are written: the
//! empty array literal `[]`, the `null` pair literal, and pairs nested inside
//! another pair's element (`pair(pair, int)`). They unify with any concrete
//! array/pair type, but never stand in where an element type is needed.

use std::fmt;

/// A semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
    Char,
    String,
    Array(Box<Type>),
    Pair(Box<Type>, Box<Type>),
    AnyArray,
    AnyPair,
    Func(Box<FuncType>),
}

/// Signature of a function: return type plus ordered parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuncType {
    pub returns: Type,
    pub params: Vec<Type>,
}

/// Size of a machine word on the ARM target, in bytes.
pub const WORD: u32 = 4;

impl Type {
    pub fn array_of(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    /// Build a pair type. Pair-typed elements lose their structure, as the
    /// grammar cannot name them.
    pub fn pair_of(fst: Type, snd: Type) -> Type {
        Type::Pair(Box::new(fst.erased()), Box::new(snd.erased()))
    }

    pub fn func(returns: Type, params: Vec<Type>) -> Type {
        Type::Func(Box::new(FuncType { returns, params }))
    }

    /// The type as it is stored inside a pair element.
    pub fn erased(self) -> Type {
        match self {
            Type::Pair(..) => Type::AnyPair,
            other => other,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_) | Type::AnyArray)
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Type::Pair(..) | Type::AnyPair)
    }

    /// Whether values of this type live on the heap and are passed by reference.
    pub fn is_reference(&self) -> bool {
        self.is_array() || self.is_pair() || *self == Type::String
    }

    /// `false` for the unresolved placeholders.
    pub fn is_concrete(&self) -> bool {
        !matches!(self, Type::AnyArray | Type::AnyPair)
    }

    /// Element type of a concrete array.
    pub fn elem(&self) -> Option<&Type> {
        match self {
            Type::Array(elem) => Some(elem),
            _ => None,
        }
    }

    /// Element types of a concrete pair.
    pub fn pair_elems(&self) -> Option<(&Type, &Type)> {
        match self {
            Type::Pair(fst, snd) => Some((fst, snd)),
            _ => None,
        }
    }

    /// Storage size on the ARM target.
    pub fn size(&self) -> u32 {
        match self {
            Type::Bool | Type::Char => 1,
            _ => WORD,
        }
    }

    /// Whether a value of type `actual` can be used where `self` is expected.
    ///
    /// Placeholders unify with any array/pair of the same shape, and a
    /// `char[]` may stand in for a `string`.
    pub fn accepts(&self, actual: &Type) -> bool {
        match (self, actual) {
            (expected, actual) if expected == actual => true,
            (Type::Pair(..) | Type::AnyPair, Type::AnyPair) => true,
            (Type::AnyPair, Type::Pair(..)) => true,
            (Type::Pair(a, b), Type::Pair(c, d)) => a.accepts(c) && b.accepts(d),
            (Type::Array(_) | Type::AnyArray, Type::AnyArray) => true,
            (Type::AnyArray, Type::Array(_)) => true,
            (Type::Array(a), Type::Array(b)) => a.accepts(b),
            (Type::String, Type::Array(elem)) => **elem == Type::Char,
            _ => false,
        }
    }

    /// The most specific type two compatible types share, if any.
    pub fn unify(&self, other: &Type) -> Option<Type> {
        if self.accepts(other) && !matches!((self, other), (Type::String, Type::Array(_))) {
            Some(self.more_concrete(other))
        } else if other.accepts(self) && !matches!((other, self), (Type::String, Type::Array(_))) {
            Some(other.more_concrete(self))
        } else {
            None
        }
    }

    fn more_concrete(&self, other: &Type) -> Type {
        match (self, other) {
            (Type::AnyArray | Type::AnyPair, concrete) => concrete.clone(),
            (Type::Array(a), Type::Array(b)) => Type::array_of(a.more_concrete(b)),
            (Type::Pair(a, b), Type::Pair(c, d)) => {
                Type::Pair(Box::new(a.more_concrete(c)), Box::new(b.more_concrete(d)))
            }
            (this, _) => this.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("int"),
            Type::Bool => f.write_str("bool"),
            Type::Char => f.write_str("char"),
            Type::String => f.write_str("string"),
            Type::Array(elem) => write!(f, "{elem}[]"),
            Type::Pair(fst, snd) => write!(f, "pair({fst}, {snd})"),
            Type::AnyArray => f.write_str("array"),
            Type::AnyPair => f.write_str("pair"),
            Type::Func(sig) => {
                write!(f, "{}(", sig.returns)?;
                for (i, param) in sig.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Renders a set of alternatives as `{int, char}` for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSet(pub Vec<Type>);

impl TypeSet {
    pub fn contains(&self, ty: &Type) -> bool {
        self.0.iter().any(|t| t.accepts(ty))
    }
}

impl From<Type> for TypeSet {
    fn from(ty: Type) -> Self {
        TypeSet(vec![ty])
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, ty) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str("}")
    }
}
