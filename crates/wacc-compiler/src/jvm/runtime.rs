//! Runtime helpers of the JVM backend.
//!
//! Helpers are static methods of the generated class, built on first use and
//! memoized like the ARM runtime library. Handing out a call also hands out
//! the helper's method (and, through its body, the helpers it calls), so the
//! method set of the final [`JvmAsm`] contains each helper once.

use rustc_hash::FxHashMap;

use super::asm::{JvmAsm, JvmField, JvmMethod};
use super::instr::{JvmInstr, JvmLabel};

const OUT: &str = "java/lang/System/out";
const PRINT_STREAM: &str = "Ljava/io/PrintStream;";
const SCANNER: &str = "java/util/Scanner";
const STDIN_FIELD: &str = "stdin";

/// Exit status of a program stopped by a runtime error.
const RUNTIME_ERROR_STATUS: i32 = 255;

const NULL_REFERENCE_MSG: &str = "NullReferenceError: dereference a null reference\\n";

/// A runtime helper method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JvmHelper {
    PrintInt,
    PrintBool,
    PrintChar,
    PrintString,
    PrintReference,
    PrintLn,
    ReadInt,
    ReadChar,
    /// The shared `Scanner` over standard input, created on first read.
    Stdin,
    Free,
    /// Flush standard output and exit with the given status.
    Exit,
    RuntimeError,
}

impl JvmHelper {
    pub fn name(self) -> &'static str {
        match self {
            JvmHelper::PrintInt => "p_print_int",
            JvmHelper::PrintBool => "p_print_bool",
            JvmHelper::PrintChar => "p_print_char",
            JvmHelper::PrintString => "p_print_string",
            JvmHelper::PrintReference => "p_print_reference",
            JvmHelper::PrintLn => "p_print_ln",
            JvmHelper::ReadInt => "p_read_int",
            JvmHelper::ReadChar => "p_read_char",
            JvmHelper::Stdin => "p_stdin",
            JvmHelper::Free => "p_free",
            JvmHelper::Exit => "p_exit",
            JvmHelper::RuntimeError => "p_throw_runtime_error",
        }
    }

    pub fn desc(self) -> &'static str {
        match self {
            JvmHelper::PrintInt => "(I)V",
            JvmHelper::PrintBool => "(Z)V",
            JvmHelper::PrintChar => "(C)V",
            JvmHelper::PrintString => "([C)V",
            JvmHelper::PrintReference | JvmHelper::Free => "(Ljava/lang/Object;)V",
            JvmHelper::PrintLn => "()V",
            JvmHelper::ReadInt => "()I",
            JvmHelper::ReadChar => "()C",
            JvmHelper::Stdin => "()Ljava/util/Scanner;",
            JvmHelper::Exit => "(I)V",
            JvmHelper::RuntimeError => "(Ljava/lang/String;)V",
        }
    }

    fn locals(self) -> u16 {
        match self {
            JvmHelper::PrintLn | JvmHelper::ReadInt | JvmHelper::ReadChar | JvmHelper::Stdin => 0,
            _ => 1,
        }
    }
}

/// The helper registry of one class.
#[derive(Debug)]
pub struct JvmRuntime {
    class: String,
    methods: FxHashMap<JvmHelper, JvmMethod>,
}

impl JvmRuntime {
    pub fn new(class: impl Into<String>) -> Self {
        JvmRuntime {
            class: class.into(),
            methods: FxHashMap::default(),
        }
    }

    /// A call to `helper`, carrying the helper's method.
    pub fn call(&mut self, helper: JvmHelper) -> JvmAsm {
        let method = self.require(helper).clone();
        JvmAsm::instr(self.invoke(helper)).with_method(method)
    }

    /// The method of `helper`, built on first use.
    pub fn require(&mut self, helper: JvmHelper) -> &JvmMethod {
        if !self.methods.contains_key(&helper) {
            let body = self.body(helper);
            tracing::trace!(helper = helper.name(), instrs = body.instrs().len(), "instantiated JVM helper");
            let method = JvmMethod {
                name: helper.name().to_string(),
                desc: helper.desc().to_string(),
                locals: helper.locals(),
                body,
            };
            self.methods.insert(helper, method);
        }
        &self.methods[&helper]
    }

    pub fn contains(&self, helper: JvmHelper) -> bool {
        self.methods.contains_key(&helper)
    }

    /// Static fields the instantiated helpers rely on.
    pub fn fields(&self) -> Vec<JvmField> {
        if self.contains(JvmHelper::Stdin) {
            vec![JvmField {
                name: STDIN_FIELD.to_string(),
                desc: format!("L{SCANNER};"),
            }]
        } else {
            Vec::new()
        }
    }

    fn invoke(&self, helper: JvmHelper) -> JvmInstr {
        JvmInstr::invoke_static(format!("{}/{}", self.class, helper.name()), helper.desc())
    }

    fn body(&mut self, helper: JvmHelper) -> JvmAsm {
        let out = || JvmInstr::get_static(OUT, PRINT_STREAM);
        let print = |desc: &str| JvmInstr::invoke_virtual("java/io/PrintStream/print", desc);
        match helper {
            JvmHelper::PrintInt => JvmAsm::from(vec![out(), JvmInstr::Iload(0), print("(I)V"), JvmInstr::Return]),
            JvmHelper::PrintBool => JvmAsm::from(vec![out(), JvmInstr::Iload(0), print("(Z)V"), JvmInstr::Return]),
            JvmHelper::PrintChar => JvmAsm::from(vec![out(), JvmInstr::Iload(0), print("(C)V"), JvmInstr::Return]),
            JvmHelper::PrintString => JvmAsm::from(vec![out(), JvmInstr::Aload(0), print("([C)V"), JvmInstr::Return]),
            JvmHelper::PrintReference => JvmAsm::from(vec![
                out(),
                JvmInstr::Ldc("0x".to_string()),
                print("(Ljava/lang/String;)V"),
                out(),
                JvmInstr::Aload(0),
                JvmInstr::invoke_static("java/lang/System/identityHashCode", "(Ljava/lang/Object;)I"),
                JvmInstr::invoke_static("java/lang/Integer/toHexString", "(I)Ljava/lang/String;"),
                print("(Ljava/lang/String;)V"),
                JvmInstr::Return,
            ]),
            JvmHelper::PrintLn => JvmAsm::from(vec![
                out(),
                JvmInstr::invoke_virtual("java/io/PrintStream/println", "()V"),
                JvmInstr::Return,
            ]),

            JvmHelper::ReadInt => {
                let mut body = self.call(JvmHelper::Stdin);
                body.extend([
                    JvmInstr::invoke_virtual(format!("{SCANNER}/nextInt"), "()I"),
                    JvmInstr::Ireturn,
                ]);
                body
            }
            JvmHelper::ReadChar => {
                let mut body = self.call(JvmHelper::Stdin);
                body.extend([
                    JvmInstr::invoke_virtual(format!("{SCANNER}/next"), "()Ljava/lang/String;"),
                    JvmInstr::Iconst(0),
                    JvmInstr::invoke_virtual("java/lang/String/charAt", "(I)C"),
                    JvmInstr::Ireturn,
                ]);
                body
            }
            JvmHelper::Stdin => {
                let field = format!("{}/{STDIN_FIELD}", self.class);
                let desc = format!("L{SCANNER};");
                let ready = JvmLabel::new("Ready");
                JvmAsm::from(vec![
                    JvmInstr::get_static(field.clone(), desc.clone()),
                    JvmInstr::Dup,
                    JvmInstr::IfNonNull(ready.clone()),
                    JvmInstr::Pop,
                    JvmInstr::New(SCANNER.to_string()),
                    JvmInstr::Dup,
                    JvmInstr::get_static("java/lang/System/in", "Ljava/io/InputStream;"),
                    JvmInstr::InvokeSpecial {
                        method: format!("{SCANNER}/<init>"),
                        desc: "(Ljava/io/InputStream;)V".to_string(),
                    },
                    JvmInstr::Dup,
                    JvmInstr::PutStatic { field, desc },
                    JvmInstr::Label(ready),
                    JvmInstr::Areturn,
                ])
            }

            JvmHelper::Free => {
                let ok = JvmLabel::new("Ok");
                let mut body = JvmAsm::from(vec![
                    JvmInstr::Aload(0),
                    JvmInstr::IfNonNull(ok.clone()),
                    JvmInstr::Ldc(NULL_REFERENCE_MSG.to_string()),
                ]);
                body.append(self.call(JvmHelper::RuntimeError));
                body.extend([JvmInstr::Label(ok), JvmInstr::Return]);
                body
            }
            JvmHelper::Exit => JvmAsm::from(vec![
                out(),
                JvmInstr::invoke_virtual("java/io/PrintStream/flush", "()V"),
                JvmInstr::Iload(0),
                JvmInstr::invoke_static("java/lang/System/exit", "(I)V"),
                JvmInstr::Return,
            ]),
            JvmHelper::RuntimeError => {
                let mut body = JvmAsm::from(vec![
                    out(),
                    JvmInstr::Aload(0),
                    print("(Ljava/lang/String;)V"),
                    JvmInstr::Iconst(RUNTIME_ERROR_STATUS),
                ]);
                body.append(self.call(JvmHelper::Exit));
                body.push(JvmInstr::Return);
                body
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_are_built_once() {
        let mut runtime = JvmRuntime::new("Main");
        let a = runtime.call(JvmHelper::PrintInt);
        let b = runtime.call(JvmHelper::PrintInt);
        assert_eq!(a, b);
        assert_eq!(a.instrs()[0].to_string(), "invokestatic Main/p_print_int(I)V");
        assert_eq!(a.combine(b).methods().count(), 1);
    }

    #[test]
    fn free_carries_its_dependencies() {
        let mut runtime = JvmRuntime::new("Main");
        let call = runtime.call(JvmHelper::Free);
        let names: Vec<&str> = call.methods().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["p_exit", "p_free", "p_throw_runtime_error"]);
    }

    #[test]
    fn reading_declares_the_scanner_field() {
        let mut runtime = JvmRuntime::new("Main");
        assert!(runtime.fields().is_empty());
        let call = runtime.call(JvmHelper::ReadChar);
        assert!(call.has_method("p_stdin"));
        assert_eq!(runtime.fields()[0].desc, "Ljava/util/Scanner;");
    }

    #[test]
    fn stdin_stack_depth() {
        let mut runtime = JvmRuntime::new("Main");
        assert_eq!(runtime.require(JvmHelper::Stdin).max_stack(), 3);
    }
}
