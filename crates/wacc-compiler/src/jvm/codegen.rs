//! JVM code generation from the validated AST.
//!
//! Every WACC function becomes a static method `f_<name>` of one class and
//! the program body becomes `main`. Locals are numbered in declaration
//! order after the parameters. Values live on the operand stack, so an
//! expression compiles to the sequence that leaves its value on top.
//!
//! String literals are built once in `<clinit>` and kept in static fields,
//! so every occurrence of the same text is the same array.

use rustc_hash::FxHashMap;
use wacc_core::{BinaryOp, Type, UnaryOp};
use wacc_parser::ast::PairSide;

use super::asm::{JvmAsm, JvmClass, JvmField, JvmMethod};
use super::descriptor::{OBJECT, array_kind, class_ref, is_int_like, method_desc};
use super::instr::{ArrayKind, IntOp, JvmCond, JvmInstr, JvmLabel};
use super::runtime::{JvmHelper, JvmRuntime};
use crate::ast::{Expr, ExprKind, Func, Lhs, LhsKind, Prog, Rhs, RhsKind, Stmt, StmtKind};
use crate::scope::{ScopeArena, VarId};

/// Descriptor of a WACC string.
const STRING_DESC: &str = "[C";

/// Generate the class for a validated AST.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn generate(prog: &Prog, class_name: &str) -> JvmClass {
    let mut generator = JvmGenerator::new(&prog.scopes, class_name);
    let mut asm = JvmAsm::new();
    for func in &prog.funcs {
        asm.add_method(generator.gen_func(func));
    }
    asm.add_method(generator.gen_main(prog));
    if let Some(init) = generator.gen_literal_init() {
        asm.add_method(init);
    }

    let mut fields = generator.runtime.fields();
    fields.extend(generator.literal_fields());
    let class = JvmClass::new(class_name, fields, asm);
    tracing::debug!(
        class = class_name,
        methods = class.methods.len(),
        instrs = class.instruction_count(),
        "generated JVM class"
    );
    class
}

/// Method name of WACC function `name`.
pub fn method_name(name: &str) -> String {
    format!("f_{name}")
}

/// Code generation state for one class.
pub struct JvmGenerator<'p> {
    scopes: &'p ScopeArena,
    class: String,
    runtime: JvmRuntime,
    /// Local slots of the method being generated.
    locals: FxHashMap<VarId, u16>,
    next_local: u16,
    next_label: u32,
    /// Return type of the function being generated.
    returns: Option<Type>,
    /// Literal texts in first-use order; the position names the field.
    literals: Vec<String>,
    literal_index: FxHashMap<String, usize>,
}

impl<'p> JvmGenerator<'p> {
    pub fn new(scopes: &'p ScopeArena, class: &str) -> Self {
        JvmGenerator {
            scopes,
            class: class.to_string(),
            runtime: JvmRuntime::new(class),
            locals: FxHashMap::default(),
            next_local: 0,
            next_label: 0,
            returns: None,
            literals: Vec::new(),
            literal_index: FxHashMap::default(),
        }
    }

    // ==========================================================================
    // Methods
    // ==========================================================================

    fn gen_func(&mut self, func: &Func) -> JvmMethod {
        self.start_method(0);
        self.returns = Some(func.ident.returns().clone());
        for param in &func.params {
            self.local(param.var);
        }

        let mut body = self.gen_stmt(&func.body);
        // A body ending in `exit` still needs a return the verifier can see.
        if !body.instrs().last().is_some_and(JvmInstr::is_terminal) {
            let ret = func.ident.returns();
            body.extend([default_value(ret), return_instr(ret)]);
        }

        JvmMethod {
            name: method_name(&func.ident.name),
            desc: method_desc(func.ident.params(), Some(func.ident.returns())),
            locals: self.next_local,
            body,
        }
    }

    fn gen_main(&mut self, prog: &Prog) -> JvmMethod {
        // Slot 0 holds the command line arguments.
        self.start_method(1);
        self.returns = None;
        let mut body = self.gen_stmt(&prog.body);
        body.push(JvmInstr::Return);
        JvmMethod {
            name: "main".to_string(),
            desc: "([Ljava/lang/String;)V".to_string(),
            locals: self.next_local,
            body,
        }
    }

    /// `<clinit>`, filling one static field per distinct literal.
    fn gen_literal_init(&self) -> Option<JvmMethod> {
        if self.literals.is_empty() {
            return None;
        }
        let mut body = JvmAsm::new();
        for (index, text) in self.literals.iter().enumerate() {
            body.extend([
                JvmInstr::Ldc(jasmin_string(text)),
                JvmInstr::invoke_virtual("java/lang/String/toCharArray", "()[C"),
                JvmInstr::PutStatic {
                    field: self.literal_ref(index),
                    desc: STRING_DESC.to_string(),
                },
            ]);
        }
        body.push(JvmInstr::Return);
        Some(JvmMethod {
            name: "<clinit>".to_string(),
            desc: "()V".to_string(),
            locals: 0,
            body,
        })
    }

    fn literal_fields(&self) -> impl Iterator<Item = JvmField> + '_ {
        (0..self.literals.len()).map(|index| JvmField {
            name: literal_name(index),
            desc: STRING_DESC.to_string(),
        })
    }

    /// The field holding `text`, allocated on first use.
    fn literal(&mut self, text: &str) -> usize {
        if let Some(&index) = self.literal_index.get(text) {
            return index;
        }
        let index = self.literals.len();
        self.literal_index.insert(text.to_string(), index);
        self.literals.push(text.to_string());
        index
    }

    fn literal_ref(&self, index: usize) -> String {
        format!("{}/{}", self.class, literal_name(index))
    }

    fn start_method(&mut self, first_local: u16) {
        self.locals.clear();
        self.next_local = first_local;
        self.next_label = 0;
    }

    /// The slot of `var`, allocating the next one on first use.
    fn local(&mut self, var: VarId) -> u16 {
        if let Some(&slot) = self.locals.get(&var) {
            return slot;
        }
        let slot = self.next_local;
        self.locals.insert(var, slot);
        self.next_local += 1;
        slot
    }

    fn fresh_label(&mut self) -> JvmLabel {
        let label = JvmLabel::new(format!("L{}", self.next_label));
        self.next_label += 1;
        label
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn gen_stmt(&mut self, stmt: &Stmt) -> JvmAsm {
        match &stmt.kind {
            StmtKind::Skip => JvmAsm::new(),

            StmtKind::Decl { var, rhs } => {
                let ty = self.scopes.var(*var).ty.clone();
                let value = self.gen_rhs(rhs, &ty);
                let slot = self.local(*var);
                value.combine(JvmAsm::instr(store_instr(&ty, slot)))
            }

            StmtKind::Assign { lhs, rhs } => {
                let value = self.gen_rhs(rhs, &lhs.ty);
                self.gen_store(lhs, value)
            }

            StmtKind::Read(lhs) => {
                let helper = if lhs.ty == Type::Char {
                    JvmHelper::ReadChar
                } else {
                    JvmHelper::ReadInt
                };
                let value = self.runtime.call(helper);
                self.gen_store(lhs, value)
            }

            StmtKind::Free(expr) => {
                let value = self.gen_expr(expr);
                value.combine(self.runtime.call(JvmHelper::Free))
            }

            StmtKind::Return(expr) => {
                let ret = self.returns.clone().unwrap_or_else(|| expr.ty.clone());
                let mut asm = self.gen_expr(expr);
                asm.push(return_instr(&ret));
                asm
            }

            StmtKind::Exit(expr) => {
                let value = self.gen_expr(expr);
                value.combine(self.runtime.call(JvmHelper::Exit))
            }

            StmtKind::Print(expr) => self.gen_print(expr),
            StmtKind::Println(expr) => {
                let print = self.gen_print(expr);
                print.combine(self.runtime.call(JvmHelper::PrintLn))
            }

            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let otherwise = self.fresh_label();
                let end = self.fresh_label();
                let mut asm = self.gen_expr(cond);
                asm.push(JvmInstr::If(JvmCond::Eq, otherwise.clone()));
                asm.append(self.gen_stmt(then_branch));
                asm.extend([JvmInstr::Goto(end.clone()), JvmInstr::Label(otherwise)]);
                asm.append(self.gen_stmt(else_branch));
                asm.push(JvmInstr::Label(end));
                asm
            }

            StmtKind::While { cond, body } => {
                let check = self.fresh_label();
                let top = self.fresh_label();
                let mut asm = JvmAsm::from(vec![JvmInstr::Goto(check.clone()), JvmInstr::Label(top.clone())]);
                asm.append(self.gen_stmt(body));
                asm.push(JvmInstr::Label(check));
                asm.append(self.gen_expr(cond));
                asm.push(JvmInstr::If(JvmCond::Ne, top));
                asm
            }

            StmtKind::Block(body) => self.gen_stmt(body),
            StmtKind::Seq(stmts) => stmts
                .iter()
                .fold(JvmAsm::new(), |asm, stmt| asm.combine(self.gen_stmt(stmt))),
        }
    }

    fn gen_print(&mut self, expr: &Expr) -> JvmAsm {
        let helper = match &expr.ty {
            Type::Int => JvmHelper::PrintInt,
            Type::Bool => JvmHelper::PrintBool,
            Type::Char => JvmHelper::PrintChar,
            Type::String => JvmHelper::PrintString,
            Type::Array(elem) if **elem == Type::Char => JvmHelper::PrintString,
            _ => JvmHelper::PrintReference,
        };
        let value = self.gen_expr(expr);
        value.combine(self.runtime.call(helper))
    }

    /// Store the value computed by `value` into `lhs`.
    fn gen_store(&mut self, lhs: &Lhs, value: JvmAsm) -> JvmAsm {
        match &lhs.kind {
            LhsKind::Var(var) => {
                let ty = self.scopes.var(*var).ty.clone();
                let slot = self.local(*var);
                value.combine(JvmAsm::instr(store_instr(&ty, slot)))
            }
            LhsKind::ArrayElem { var, indices } => {
                let (mut asm, elem) = self.gen_elem_ref(*var, indices);
                asm.append(value);
                asm.push(JvmInstr::ArrayStore(array_kind(&elem)));
                asm
            }
            LhsKind::PairElem { side, pair } => {
                let mut asm = self.gen_expr(pair);
                asm.push(JvmInstr::Iconst(slot_index(*side)));
                asm.append(value);
                asm.extend(boxing(&lhs.ty));
                asm.push(JvmInstr::ArrayStore(ArrayKind::Ref));
                asm
            }
        }
    }

    // ==========================================================================
    // Assignment sides
    // ==========================================================================

    /// `target` is the type being assigned to, which an empty array literal
    /// takes its element type from.
    fn gen_rhs(&mut self, rhs: &Rhs, target: &Type) -> JvmAsm {
        match &rhs.kind {
            RhsKind::Expr(expr) => self.gen_expr(expr),

            RhsKind::ArrayLiter(elems) => {
                let elem = element_type(&rhs.ty)
                    .or_else(|| element_type(target))
                    .unwrap_or(Type::Int);
                let kind = array_kind(&elem);
                let mut asm = JvmAsm::instr(JvmInstr::Iconst(elems.len() as i32));
                asm.push(match kind {
                    ArrayKind::Ref => JvmInstr::ANewArray(class_ref(&elem)),
                    primitive => JvmInstr::NewArray(primitive),
                });
                for (i, value) in elems.iter().enumerate() {
                    asm.extend([JvmInstr::Dup, JvmInstr::Iconst(i as i32)]);
                    asm.append(self.gen_expr(value));
                    asm.push(JvmInstr::ArrayStore(kind));
                }
                asm
            }

            RhsKind::NewPair(fst, snd) => {
                let mut asm = JvmAsm::from(vec![JvmInstr::Iconst(2), JvmInstr::ANewArray(OBJECT.to_string())]);
                for (i, value) in [fst, snd].into_iter().enumerate() {
                    asm.extend([JvmInstr::Dup, JvmInstr::Iconst(i as i32)]);
                    asm.append(self.gen_expr(value));
                    asm.extend(boxing(&value.ty));
                    asm.push(JvmInstr::ArrayStore(ArrayKind::Ref));
                }
                asm
            }

            RhsKind::PairElem { side, pair } => {
                let mut asm = self.gen_expr(pair);
                asm.extend([JvmInstr::Iconst(slot_index(*side)), JvmInstr::ArrayLoad(ArrayKind::Ref)]);
                asm.extend(unboxing(&rhs.ty));
                asm
            }

            RhsKind::Call { name, args } => {
                let desc = match self.scopes.lookup_func(name) {
                    Some(func) => method_desc(func.params(), Some(func.returns())),
                    None => panic!("call to unregistered function '{name}'"),
                };
                let mut asm = args
                    .iter()
                    .fold(JvmAsm::new(), |asm, arg| asm.combine(self.gen_expr(arg)));
                asm.push(JvmInstr::invoke_static(
                    format!("{}/{}", self.class, method_name(name)),
                    desc,
                ));
                asm
            }
        }
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn gen_expr(&mut self, expr: &Expr) -> JvmAsm {
        match &expr.kind {
            ExprKind::Int(n) => JvmAsm::instr(JvmInstr::Iconst(*n)),
            ExprKind::Bool(b) => JvmAsm::instr(JvmInstr::Iconst(i32::from(*b))),
            ExprKind::Char(c) => JvmAsm::instr(JvmInstr::Iconst(*c as i32)),
            ExprKind::Str(text) => {
                let index = self.literal(text);
                JvmAsm::instr(JvmInstr::get_static(self.literal_ref(index), STRING_DESC))
            }
            ExprKind::Null => JvmAsm::instr(JvmInstr::AconstNull),

            ExprKind::Var(var) => {
                let ty = self.scopes.var(*var).ty.clone();
                let slot = self.local(*var);
                JvmAsm::instr(load_instr(&ty, slot))
            }

            ExprKind::ArrayElem { var, indices } => {
                let (mut asm, elem) = self.gen_elem_ref(*var, indices);
                asm.push(JvmInstr::ArrayLoad(array_kind(&elem)));
                asm
            }

            ExprKind::Unary { op, operand } => {
                let mut asm = self.gen_expr(operand);
                match op {
                    UnaryOp::Not => asm.extend([JvmInstr::Iconst(1), JvmInstr::Int(IntOp::Xor)]),
                    UnaryOp::Neg => asm.push(JvmInstr::invoke_static("java/lang/Math/negateExact", "(I)I")),
                    UnaryOp::Len => asm.push(JvmInstr::ArrayLength),
                    UnaryOp::Ord => {}
                    UnaryOp::Chr => asm.push(JvmInstr::I2c),
                }
                asm
            }

            ExprKind::Binary { op, left, right } => self.gen_binary(*op, left, right),
        }
    }

    fn gen_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> JvmAsm {
        if let BinaryOp::And | BinaryOp::Or = op {
            let end = self.fresh_label();
            let decided = if op == BinaryOp::And { JvmCond::Eq } else { JvmCond::Ne };
            let mut asm = self.gen_expr(left);
            asm.extend([JvmInstr::Dup, JvmInstr::If(decided, end.clone()), JvmInstr::Pop]);
            asm.append(self.gen_expr(right));
            asm.push(JvmInstr::Label(end));
            return asm;
        }

        let mut asm = self.gen_expr(left);
        asm.append(self.gen_expr(right));
        let exact = |name: &str| JvmInstr::invoke_static(format!("java/lang/Math/{name}"), "(II)I");
        match op {
            BinaryOp::Add => asm.push(exact("addExact")),
            BinaryOp::Sub => asm.push(exact("subtractExact")),
            BinaryOp::Mul => asm.push(exact("multiplyExact")),
            BinaryOp::Div => asm.push(JvmInstr::Int(IntOp::Div)),
            BinaryOp::Mod => asm.push(JvmInstr::Int(IntOp::Rem)),
            _ => {
                let cond = comparison_cond(op);
                let yes = self.fresh_label();
                let end = self.fresh_label();
                asm.push(if is_int_like(&left.ty) {
                    JvmInstr::IfIcmp(cond, yes.clone())
                } else {
                    JvmInstr::IfAcmp(cond, yes.clone())
                });
                asm.extend([
                    JvmInstr::Iconst(0),
                    JvmInstr::Goto(end.clone()),
                    JvmInstr::Label(yes),
                    JvmInstr::Iconst(1),
                    JvmInstr::Label(end),
                ]);
            }
        }
        asm
    }

    /// Push the array and index of the element `var[i][j]...`, returning
    /// the element type.
    fn gen_elem_ref(&mut self, var: VarId, indices: &[Expr]) -> (JvmAsm, Type) {
        let mut ty = self.scopes.var(var).ty.clone();
        let slot = self.local(var);
        let mut asm = JvmAsm::instr(load_instr(&ty, slot));
        for (i, index) in indices.iter().enumerate() {
            if i > 0 {
                asm.push(JvmInstr::ArrayLoad(ArrayKind::Ref));
            }
            asm.append(self.gen_expr(index));
            ty = element_type(&ty).unwrap_or_else(|| panic!("indexing a value of type {ty}"));
        }
        (asm, ty)
    }
}

fn load_instr(ty: &Type, slot: u16) -> JvmInstr {
    if is_int_like(ty) {
        JvmInstr::Iload(slot)
    } else {
        JvmInstr::Aload(slot)
    }
}

fn store_instr(ty: &Type, slot: u16) -> JvmInstr {
    if is_int_like(ty) {
        JvmInstr::Istore(slot)
    } else {
        JvmInstr::Astore(slot)
    }
}

fn return_instr(ty: &Type) -> JvmInstr {
    if is_int_like(ty) {
        JvmInstr::Ireturn
    } else {
        JvmInstr::Areturn
    }
}

fn default_value(ty: &Type) -> JvmInstr {
    if is_int_like(ty) {
        JvmInstr::Iconst(0)
    } else {
        JvmInstr::AconstNull
    }
}

/// Element type of an indexable value. Strings index as `char[]`.
fn element_type(ty: &Type) -> Option<Type> {
    match ty {
        Type::Array(elem) => Some((**elem).clone()),
        Type::String => Some(Type::Char),
        _ => None,
    }
}

fn slot_index(side: PairSide) -> i32 {
    match side {
        PairSide::Fst => 0,
        PairSide::Snd => 1,
    }
}

/// Wrap a primitive for storage in a pair slot.
fn boxing(ty: &Type) -> Option<JvmInstr> {
    let (class, prim) = boxed_class(ty)?;
    Some(JvmInstr::invoke_static(
        format!("java/lang/{class}/valueOf"),
        format!("({prim})Ljava/lang/{class};"),
    ))
}

/// Recover a value of type `ty` from a pair slot.
fn unboxing(ty: &Type) -> Vec<JvmInstr> {
    match boxed_class(ty) {
        Some((class, prim)) => {
            let getter = match prim {
                'I' => "intValue",
                'Z' => "booleanValue",
                _ => "charValue",
            };
            vec![
                JvmInstr::CheckCast(format!("java/lang/{class}")),
                JvmInstr::invoke_virtual(format!("java/lang/{class}/{getter}"), format!("(){prim}")),
            ]
        }
        None => vec![JvmInstr::CheckCast(class_ref(ty))],
    }
}

fn boxed_class(ty: &Type) -> Option<(&'static str, char)> {
    match ty {
        Type::Int => Some(("Integer", 'I')),
        Type::Bool => Some(("Boolean", 'Z')),
        Type::Char => Some(("Character", 'C')),
        _ => None,
    }
}

fn comparison_cond(op: BinaryOp) -> JvmCond {
    match op {
        BinaryOp::Greater => JvmCond::Gt,
        BinaryOp::GreaterEqual => JvmCond::Ge,
        BinaryOp::Less => JvmCond::Lt,
        BinaryOp::LessEqual => JvmCond::Le,
        BinaryOp::Equal => JvmCond::Eq,
        BinaryOp::NotEqual => JvmCond::Ne,
        other => panic!("'{}' is not a comparison", other.as_str()),
    }
}

/// Literal text as Jasmin reads it. Jasmin has no `\0`, so NUL becomes
/// a unicode escape; every other WACC escape is also a Java escape.
fn literal_name(index: usize) -> String {
    format!("str_{index}")
}

fn jasmin_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push_str("\\u0000"),
            Some(e) => {
                out.push('\\');
                out.push(e);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::AstBuilder;
    use bumpalo::Bump;
    use wacc_parser::Parser;

    fn compile(source: &str) -> JvmClass {
        let arena = Bump::new();
        let program = Parser::parse(source, &arena).unwrap();
        let prog = AstBuilder::build(&program).unwrap();
        generate(&prog, "Main")
    }

    fn body(class: &JvmClass, method: &str) -> Vec<String> {
        class
            .method(method)
            .unwrap()
            .body
            .instrs()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn contains_seq(text: &[String], seq: &[&str]) -> bool {
        text.windows(seq.len()).any(|w| w.iter().zip(seq).all(|(a, b)| a == b))
    }

    #[test]
    fn empty_program_is_a_bare_main() {
        let class = compile("begin skip end");
        assert_eq!(body(&class, "main"), ["return"]);
        assert_eq!(class.methods.len(), 1);
        assert!(class.fields.is_empty());
    }

    #[test]
    fn locals_follow_declaration_order() {
        let class = compile("begin int x = 1; bool b = true; string s = \"hi\" end");
        let main = body(&class, "main");
        assert!(contains_seq(&main, &["iconst_1", "istore_1", "iconst_1", "istore_2"]));
        assert!(contains_seq(&main, &["getstatic Main/str_0 [C", "astore_3"]));
        assert_eq!(class.method("main").unwrap().locals, 4);
    }

    #[test]
    fn arithmetic_is_overflow_checked() {
        let class = compile("begin int x = 1; int y = x * x + -x; println y end");
        let main = body(&class, "main");
        assert!(main.contains(&"invokestatic java/lang/Math/multiplyExact(II)I".to_string()));
        assert!(main.contains(&"invokestatic java/lang/Math/addExact(II)I".to_string()));
        assert!(main.contains(&"invokestatic java/lang/Math/negateExact(I)I".to_string()));
    }

    #[test]
    fn functions_are_static_methods() {
        let class = compile(
            "begin
                int add(int a, char c) is return a + ord c end
                int r = call add(1, 'x');
                println r
            end",
        );
        let add = class.method("f_add").unwrap();
        assert_eq!(add.desc, "(IC)I");
        assert_eq!(add.locals, 2);
        assert_eq!(
            body(&class, "f_add"),
            ["iload_0", "iload_1", "invokestatic java/lang/Math/addExact(II)I", "ireturn"]
        );
        assert!(body(&class, "main").contains(&"invokestatic Main/f_add(IC)I".to_string()));
    }

    #[test]
    fn exit_in_a_function_still_returns() {
        let class = compile("begin int f() is exit 3 end int x = call f(); skip end");
        let f = body(&class, "f_f");
        assert_eq!(f, ["iconst_3", "invokestatic Main/p_exit(I)V", "iconst_0", "ireturn"]);
    }

    #[test]
    fn pairs_box_their_elements() {
        let class = compile("begin pair(int, char) p = newpair(1, 'a'); char c = snd p; println c end");
        let main = body(&class, "main");
        assert!(contains_seq(&main, &["iconst_2", "anewarray java/lang/Object", "dup", "iconst_0", "iconst_1"]));
        assert!(main.contains(&"invokestatic java/lang/Integer/valueOf(I)Ljava/lang/Integer;".to_string()));
        assert!(contains_seq(
            &main,
            &[
                "aload_1",
                "iconst_1",
                "aaload",
                "checkcast java/lang/Character",
                "invokevirtual java/lang/Character/charValue()C",
                "istore_2",
            ]
        ));
    }

    #[test]
    fn arrays_use_typed_access() {
        let class = compile("begin char[] cs = ['a', 'b']; cs[1] = 'z'; println cs[0] end");
        let main = body(&class, "main");
        assert!(contains_seq(&main, &["iconst_2", "newarray char", "dup", "iconst_0", "bipush 97", "castore"]));
        assert!(contains_seq(&main, &["aload_1", "iconst_1", "bipush 122", "castore"]));
        assert!(contains_seq(&main, &["aload_1", "iconst_0", "caload", "invokestatic Main/p_print_char(C)V"]));
    }

    #[test]
    fn nested_arrays_load_their_rows() {
        let class = compile("begin int[] a = [1]; int[][] m = [a, a]; int x = m[1][0]; println x end");
        let main = body(&class, "main");
        assert!(main.contains(&"anewarray [I".to_string()));
        assert!(contains_seq(&main, &["aload_2", "iconst_1", "aaload", "iconst_0", "iaload"]));
    }

    #[test]
    fn helpers_are_emitted_once() {
        let class = compile("begin println 1; println 2; print 3 end");
        let names: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["main", "p_print_int", "p_print_ln"]);
    }

    #[test]
    fn reading_adds_the_scanner() {
        let class = compile("begin int x = 0; read x end");
        assert_eq!(class.fields.len(), 1);
        assert!(class.method("p_stdin").is_some());
        assert!(contains_seq(&body(&class, "main"), &["invokestatic Main/p_read_int()I", "istore_1"]));
    }

    #[test]
    fn short_circuit_keeps_one_value() {
        let class = compile("begin bool a = true; bool b = a || false; println b end");
        let main = body(&class, "main");
        assert!(contains_seq(&main, &["iload_1", "dup", "ifne L0", "pop", "iconst_0", "L0:", "istore_2"]));
        assert_eq!(class.method("main").unwrap().max_stack(), 2);
    }

    #[test]
    fn reference_equality_uses_acmp() {
        let class = compile("begin pair(int, int) p = null; bool b = p == null; println b end");
        assert!(body(&class, "main").contains(&"if_acmpeq L0".to_string()));
    }

    #[test]
    fn identical_literals_are_one_array() {
        let class = compile("begin bool b = \"a\" == \"a\"; println \"b\"; println \"a\" end");
        let main = body(&class, "main");
        assert!(contains_seq(
            &main,
            &["getstatic Main/str_0 [C", "getstatic Main/str_0 [C", "if_acmpeq L0"]
        ));
        let fields: Vec<&str> = class.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, ["str_0", "str_1"]);

        let init = body(&class, "<clinit>");
        assert_eq!(
            init,
            [
                "ldc \"a\"",
                "invokevirtual java/lang/String/toCharArray()[C",
                "putstatic Main/str_0 [C",
                "ldc \"b\"",
                "invokevirtual java/lang/String/toCharArray()[C",
                "putstatic Main/str_1 [C",
                "return",
            ]
        );
        assert_eq!(class.method("<clinit>").unwrap().max_stack(), 1);
    }

    #[test]
    fn strings_escape_nul() {
        assert_eq!(jasmin_string("a\\0b\\n"), "a\\u0000b\\n");
        assert_eq!(jasmin_string("\\\\0"), "\\\\0");
    }

    #[test]
    fn renders_a_class() {
        let text = compile("begin println \"hi\" end").to_string();
        assert!(text.starts_with(".class public Main\n.super java/lang/Object\n"));
        assert!(text.contains(".method public static main([Ljava/lang/String;)V\n"));
        assert!(text.contains(".method public static p_print_string([C)V\n"));
    }
}
