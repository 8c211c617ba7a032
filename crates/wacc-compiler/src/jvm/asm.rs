//! Instruction sequences with their helper methods, and the class they
//! assemble into.
//!
//! A [`JvmAsm`] is the unit code generation works in: an ordered list of
//! instructions plus the set of methods those instructions call. Combining
//! two sequences concatenates the instructions and unions the methods, so a
//! helper reached from many call sites ends up in the class once.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashMap;

use super::instr::{JvmInstr, JvmLabel};

/// An instruction sequence and the methods it depends on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JvmAsm {
    instrs: Vec<JvmInstr>,
    methods: BTreeMap<String, JvmMethod>,
}

impl JvmAsm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instr(instr: JvmInstr) -> Self {
        JvmAsm {
            instrs: vec![instr],
            methods: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, instr: JvmInstr) {
        self.instrs.push(instr);
    }

    /// Append `other` in place.
    pub fn append(&mut self, other: JvmAsm) {
        self.instrs.extend(other.instrs);
        for method in other.methods.into_values() {
            self.add_method(method);
        }
    }

    pub fn combine(mut self, other: JvmAsm) -> JvmAsm {
        self.append(other);
        self
    }

    /// Record `method` and everything it calls. A method already present
    /// under the same name is kept.
    pub fn add_method(&mut self, method: JvmMethod) {
        if self.methods.contains_key(&method.name) {
            return;
        }
        for dep in method.body.methods.values() {
            self.add_method(dep.clone());
        }
        self.methods.insert(method.name.clone(), method);
    }

    pub fn with_method(mut self, method: JvmMethod) -> JvmAsm {
        self.add_method(method);
        self
    }

    pub fn instrs(&self) -> &[JvmInstr] {
        &self.instrs
    }

    pub fn methods(&self) -> impl Iterator<Item = &JvmMethod> {
        self.methods.values()
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }
}

impl From<Vec<JvmInstr>> for JvmAsm {
    fn from(instrs: Vec<JvmInstr>) -> Self {
        JvmAsm {
            instrs,
            methods: BTreeMap::new(),
        }
    }
}

impl Extend<JvmInstr> for JvmAsm {
    fn extend<I: IntoIterator<Item = JvmInstr>>(&mut self, iter: I) {
        self.instrs.extend(iter);
    }
}

/// A static method of the generated class.
#[derive(Debug, Clone, PartialEq)]
pub struct JvmMethod {
    pub name: String,
    pub desc: String,
    /// Local variable slots, parameters included.
    pub locals: u16,
    pub body: JvmAsm,
}

impl JvmMethod {
    /// Deepest the operand stack gets along any path through the body.
    ///
    /// Depth is tracked linearly; a label reached by a jump takes the depth
    /// recorded at the jump, which is exact for the structured code the
    /// generators emit.
    pub fn max_stack(&self) -> u16 {
        let mut at_label: FxHashMap<&JvmLabel, i32> = FxHashMap::default();
        let mut depth = 0i32;
        let mut max = 0i32;
        for instr in self.body.instrs() {
            if let JvmInstr::Label(label) = instr {
                if let Some(&recorded) = at_label.get(label) {
                    depth = recorded;
                }
                continue;
            }
            depth += instr.stack_delta();
            max = max.max(depth);
            if let Some(target) = instr.branch_target() {
                at_label.entry(target).or_insert(depth);
            }
        }
        u16::try_from(max.max(0)).unwrap_or(u16::MAX)
    }
}

impl fmt::Display for JvmMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ".method public static {}{}", self.name, self.desc)?;
        writeln!(f, "    .limit stack {}", self.max_stack())?;
        writeln!(f, "    .limit locals {}", self.locals)?;
        for instr in self.body.instrs() {
            match instr {
                JvmInstr::Label(_) => writeln!(f, "  {instr}")?,
                _ => writeln!(f, "    {instr}")?,
            }
        }
        writeln!(f, ".end method")
    }
}

/// A static field of the generated class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JvmField {
    pub name: String,
    pub desc: String,
}

/// The generated class: every method is static.
#[derive(Debug, Clone, PartialEq)]
pub struct JvmClass {
    pub name: String,
    pub fields: Vec<JvmField>,
    pub methods: Vec<JvmMethod>,
}

impl JvmClass {
    /// Assemble the methods recorded in `asm`.
    pub fn new(name: impl Into<String>, fields: Vec<JvmField>, asm: JvmAsm) -> Self {
        JvmClass {
            name: name.into(),
            fields,
            methods: asm.methods.into_values().collect(),
        }
    }

    pub fn method(&self, name: &str) -> Option<&JvmMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn instruction_count(&self) -> usize {
        self.methods
            .iter()
            .flat_map(|m| m.body.instrs())
            .filter(|i| !matches!(i, JvmInstr::Label(_)))
            .count()
    }
}

impl fmt::Display for JvmClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ".class public {}", self.name)?;
        writeln!(f, ".super java/lang/Object")?;
        if !self.fields.is_empty() {
            writeln!(f)?;
        }
        for field in &self.fields {
            writeln!(f, ".field private static {} {}", field.name, field.desc)?;
        }
        for method in &self.methods {
            writeln!(f)?;
            write!(f, "{method}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jvm::instr::{IntOp, JvmCond};

    fn method(name: &str, instrs: Vec<JvmInstr>) -> JvmMethod {
        JvmMethod {
            name: name.to_string(),
            desc: "()V".to_string(),
            locals: 0,
            body: JvmAsm::from(instrs),
        }
    }

    #[test]
    fn combining_unions_methods() {
        let helper = method("p_print_ln", vec![JvmInstr::Return]);
        let a = JvmAsm::instr(JvmInstr::Iconst(1)).with_method(helper.clone());
        let b = JvmAsm::instr(JvmInstr::Iconst(2)).with_method(helper);
        let both = a.combine(b);
        assert_eq!(both.instrs(), [JvmInstr::Iconst(1), JvmInstr::Iconst(2)]);
        assert_eq!(both.methods().count(), 1);
    }

    #[test]
    fn dependencies_are_hoisted() {
        let inner = method("p_exit", vec![JvmInstr::Return]);
        let outer = JvmMethod {
            body: JvmAsm::instr(JvmInstr::Return).with_method(inner),
            ..method("p_throw_runtime_error", vec![])
        };
        let asm = JvmAsm::new().with_method(outer);
        assert!(asm.has_method("p_exit"));
        assert!(asm.has_method("p_throw_runtime_error"));
    }

    #[test]
    fn max_stack_follows_branches() {
        let yes = JvmLabel::new("L0");
        let end = JvmLabel::new("L1");
        // a < b ? 1 : 0, then stored.
        let cmp = method(
            "m",
            vec![
                JvmInstr::Iconst(1),
                JvmInstr::Iconst(2),
                JvmInstr::IfIcmp(JvmCond::Lt, yes.clone()),
                JvmInstr::Iconst(0),
                JvmInstr::Goto(end.clone()),
                JvmInstr::Label(yes),
                JvmInstr::Iconst(1),
                JvmInstr::Label(end),
                JvmInstr::Iconst(3),
                JvmInstr::Int(IntOp::Add),
                JvmInstr::Istore(0),
                JvmInstr::Return,
            ],
        );
        assert_eq!(cmp.max_stack(), 2);
    }

    #[test]
    fn renders_jasmin() {
        let class = JvmClass::new(
            "Main",
            vec![],
            JvmAsm::new().with_method(method("main", vec![JvmInstr::Return])),
        );
        assert_eq!(
            class.to_string(),
            ".class public Main\n.super java/lang/Object\n\n.method public static main()V\n    .limit stack 0\n    .limit locals 0\n    return\n.end method\n"
        );
    }
}
