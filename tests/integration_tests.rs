//! End-to-end tests over the scripts in `test_scripts/`.
//!
//! - `valid/` must compile for both targets
//! - `syntax/` must fail in the parser (exit code 100)
//! - `semantic/` must fail in analysis (exit code 200), with the number of
//!   errors given by a leading `# errors: N` comment

use std::fs;
use std::path::{Path, PathBuf};

use wacc::{CompilationError, CompilerOptions, Output, Target, Unit, WaccError};

// ============================================================================
// Harness
// ============================================================================

fn scripts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_scripts")
}

fn scripts(category: &str) -> Vec<PathBuf> {
    let dir = scripts_dir().join(category);
    let mut paths: Vec<PathBuf> = fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", dir.display(), e))
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "wacc"))
        .collect();
    paths.sort();
    assert!(!paths.is_empty(), "no scripts in {}", dir.display());
    paths
}

fn load(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

fn script(name: &str) -> String {
    load(&scripts_dir().join(name))
}

fn compile(source: &str, target: Target) -> Result<Output, WaccError> {
    Unit::new(CompilerOptions::default().with_target(target)).compile(source)
}

/// The `N` of a `# errors: N` header line.
fn expected_errors(source: &str) -> Option<usize> {
    source
        .lines()
        .find_map(|line| line.trim().strip_prefix("# errors:"))
        .and_then(|n| n.trim().parse().ok())
}

// ============================================================================
// Script suites
// ============================================================================

#[test]
fn valid_scripts_compile_for_both_targets() {
    for path in scripts("valid") {
        let source = load(&path);
        for target in [Target::Arm, Target::Jvm] {
            match compile(&source, target) {
                Ok(output) => assert!(output.instruction_count() > 0),
                Err(err) => panic!("{} failed on {target}:\n{err}", path.display()),
            }
        }
    }
}

#[test]
fn syntax_errors_exit_with_100() {
    for path in scripts("syntax") {
        let err = compile(&load(&path), Target::Arm)
            .err()
            .unwrap_or_else(|| panic!("{} should not compile", path.display()));
        assert_eq!(err.exit_code(), 100, "{}: {err}", path.display());
    }
}

#[test]
fn semantic_errors_exit_with_200() {
    for path in scripts("semantic") {
        let source = load(&path);
        let err = compile(&source, Target::Arm)
            .err()
            .unwrap_or_else(|| panic!("{} should not compile", path.display()));
        assert_eq!(err.exit_code(), 200, "{}: {err}", path.display());

        if let (Some(expected), WaccError::Semantic(errors)) = (expected_errors(&source), &err) {
            assert_eq!(errors.len(), expected, "{}:\n{err}", path.display());
        }
    }
}

// ============================================================================
// Specific programs
// ============================================================================

#[test]
fn hello_world_arm() {
    let asm = Unit::default().render(&script("valid/hello_world.wacc")).unwrap();
    assert!(asm.starts_with(".data\n\nmsg_0:\n\t.word 13\n\t.ascii \"Hello, World!\"\n"));
    assert!(asm.contains("\n.global main\nmain:\n\tPUSH {lr}\n"));
    assert!(asm.contains("\tBL p_print_string\n\tBL p_print_ln\n"));
    assert!(asm.contains("p_print_ln:\n"));
}

#[test]
fn hello_world_jvm() {
    let class = Unit::new(CompilerOptions::jvm("Hello"))
        .render(&script("valid/hello_world.wacc"))
        .unwrap();
    assert!(class.starts_with(".class public Hello\n.super java/lang/Object\n"));
    assert!(class.contains("    ldc \"Hello, World!\"\n"));
    assert!(class.contains("    invokestatic Hello/p_print_string([C)V\n"));
    assert!(class.contains(".method public static p_print_ln()V\n"));
}

#[test]
fn recursion_calls_the_function_label() {
    let asm = Unit::default().render(&script("valid/fibonacci.wacc")).unwrap();
    assert!(asm.contains("f_fib:\n"));
    assert_eq!(asm.matches("\tBL f_fib\n").count(), 3);
}

#[test]
fn helpers_appear_once_however_often_used() {
    let asm = Unit::default().render(&script("valid/operators.wacc")).unwrap();
    assert_eq!(asm.matches("p_throw_overflow_error:\n").count(), 1);
    assert_eq!(asm.matches("p_throw_runtime_error:\n").count(), 1);
    assert_eq!(asm.matches("p_check_divide_by_zero:\n").count(), 1);
    assert!(asm.matches("BLVS p_throw_overflow_error").count() >= 3);
}

#[test]
fn identical_literals_share_a_label() {
    let source = "begin println \"same\"; println \"same\"; println \"other\" end";
    let Output::Arm(program) = compile(source, Target::Arm).unwrap() else {
        panic!("expected ARM output");
    };
    let user: Vec<&str> = program
        .data
        .iter()
        .map(|d| d.text.as_str())
        .filter(|t| *t == "same" || *t == "other")
        .collect();
    assert_eq!(user, ["same", "other"]);
}

#[test]
fn errors_are_reported_in_source_order() {
    let err = compile(&script("semantic/many_errors.wacc"), Target::Arm).unwrap_err();
    let WaccError::Semantic(errors) = err else {
        panic!("expected semantic errors");
    };
    let lines: Vec<u32> = errors.iter().map(|e| e.span().line).collect();
    let mut sorted = lines.clone();
    sorted.sort();
    assert_eq!(lines, sorted);
    assert!(matches!(errors.iter().next(), Some(CompilationError::DuplicateParam { .. })));
}

#[test]
fn check_returns_the_typed_program() {
    let prog = Unit::default().check(&script("valid/scopes.wacc")).unwrap();
    assert!(prog.funcs.is_empty());
    assert!(prog.scopes.len() > 2);
}
