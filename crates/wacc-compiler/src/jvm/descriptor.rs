//! Mapping WACC types onto JVM types.
//!
//! | WACC            | JVM                              |
//! |-----------------|----------------------------------|
//! | `int`           | `I`                              |
//! | `bool`          | `Z`                              |
//! | `char`          | `C`                              |
//! | `string`        | `[C`, so `char[]` needs no conversion |
//! | `T[]`           | `[` + descriptor of `T`          |
//! | `pair(..)`      | `[Ljava/lang/Object;` of length 2 |

use wacc_core::Type;

use super::instr::ArrayKind;

pub const OBJECT: &str = "java/lang/Object";
pub const PAIR: &str = "[Ljava/lang/Object;";

/// Field descriptor of a WACC type.
pub fn descriptor(ty: &Type) -> String {
    match ty {
        Type::Int => "I".to_string(),
        Type::Bool => "Z".to_string(),
        Type::Char => "C".to_string(),
        Type::String => "[C".to_string(),
        Type::Array(elem) => format!("[{}", descriptor(elem)),
        Type::Pair(..) | Type::AnyPair => PAIR.to_string(),
        Type::AnyArray | Type::Func(_) => format!("L{OBJECT};"),
    }
}

/// Method descriptor; `None` returns void.
pub fn method_desc<'a>(params: impl IntoIterator<Item = &'a Type>, returns: Option<&Type>) -> String {
    let params: String = params.into_iter().map(descriptor).collect();
    let returns = returns.map_or_else(|| "V".to_string(), descriptor);
    format!("({params}){returns}")
}

/// Class operand of `anewarray` and `checkcast`.
pub fn class_ref(ty: &Type) -> String {
    let desc = descriptor(ty);
    match desc.strip_prefix('L').and_then(|d| d.strip_suffix(';')) {
        Some(class) => class.to_string(),
        None => desc,
    }
}

/// Whether values of `ty` are held in int locals.
pub fn is_int_like(ty: &Type) -> bool {
    !ty.is_reference()
}

/// Access kind for elements of type `elem`.
pub fn array_kind(elem: &Type) -> ArrayKind {
    match elem {
        Type::Int => ArrayKind::Int,
        Type::Bool => ArrayKind::Bool,
        Type::Char => ArrayKind::Char,
        _ => ArrayKind::Ref,
    }
}

/// Operand stack slots taken by the arguments of a method descriptor.
pub fn arg_slots(desc: &str) -> i32 {
    let params = desc
        .strip_prefix('(')
        .and_then(|d| d.split_once(')'))
        .map_or("", |(params, _)| params);
    let mut chars = params.chars();
    let mut slots = 0;
    while let Some(mut c) = chars.next() {
        let array = c == '[';
        while c == '[' {
            c = chars.next().unwrap_or(';');
        }
        if c == 'L' {
            chars.by_ref().find(|c| *c == ';');
        }
        // Arrays are references even when their elements are wide.
        slots += if !array && matches!(c, 'J' | 'D') { 2 } else { 1 };
    }
    slots
}

/// Operand stack slots taken by the result of a method descriptor.
pub fn return_slots(desc: &str) -> i32 {
    match desc.rsplit_once(')').map(|(_, ret)| ret) {
        Some("V") | None => 0,
        Some("J" | "D") => 2,
        Some(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_char_arrays() {
        assert_eq!(descriptor(&Type::String), descriptor(&Type::array_of(Type::Char)));
        assert_eq!(descriptor(&Type::array_of(Type::array_of(Type::Int))), "[[I");
        assert_eq!(descriptor(&Type::pair_of(Type::Int, Type::Bool)), PAIR);
    }

    #[test]
    fn method_descriptors() {
        let params = [Type::Int, Type::String];
        assert_eq!(method_desc(&params, Some(&Type::Bool)), "(I[C)Z");
        assert_eq!(method_desc([], None), "()V");
    }

    #[test]
    fn class_refs_strip_object_wrappers() {
        assert_eq!(class_ref(&Type::AnyArray), OBJECT);
        assert_eq!(class_ref(&Type::array_of(Type::Int)), "[I");
    }

    #[test]
    fn only_heap_values_are_references() {
        for ty in [Type::Int, Type::Bool, Type::Char] {
            assert!(is_int_like(&ty));
        }
        for ty in [Type::String, Type::AnyArray, Type::AnyPair, Type::pair_of(Type::Int, Type::Int)] {
            assert!(!is_int_like(&ty));
        }
    }

    #[test]
    fn slot_counting() {
        assert_eq!(arg_slots("(I[CLjava/lang/String;[[Ljava/lang/Object;)V"), 4);
        assert_eq!(arg_slots("()I"), 0);
        assert_eq!(arg_slots("(JI)V"), 3);
        assert_eq!(return_slots("()V"), 0);
        assert_eq!(return_slots("(I)Ljava/lang/Integer;"), 1);
    }
}
