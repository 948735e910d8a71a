//! Basic evaluation tests: literals, operators, display forms

use super::helpers::{run_program, Session};
use crate::interpreter::executor::Val;

/* ===================== Expressions ===================== */

#[test]
fn test_eval_arithmetic() {
    let mut session = Session::new();
    assert_eq!(session.eval("2 + 2").unwrap(), Val::Int(4));
    assert_eq!(session.eval("2 + 3 * 4").unwrap(), Val::Int(14));
    assert_eq!(session.eval("(2 + 3) * 4").unwrap(), Val::Int(20));
    assert_eq!(session.eval("2 ** 3 ** 2").unwrap(), Val::Int(512));
    assert_eq!(session.eval("-2 ** 2").unwrap(), Val::Int(-4));
}

#[test]
fn test_eval_true_division_is_float() {
    let mut session = Session::new();
    let value = session.eval("10 / 4").unwrap();
    assert!(matches!(value, Val::Float(f) if f == 2.5));
    assert_eq!(value.to_string(), "2.5");
    assert_eq!(session.eval("10 / 5").unwrap().to_string(), "2.0");
}

#[test]
fn test_eval_logical_operators_short_circuit() {
    let mut session = Session::new();
    // `missing` is never evaluated
    assert_eq!(session.eval("false && missing").unwrap(), Val::Bool(false));
    assert_eq!(session.eval("true || missing").unwrap(), Val::Bool(true));
    assert_eq!(session.eval("null || \"default\"").unwrap(), Val::from("default"));
}

#[test]
fn test_eval_ternary() {
    let mut session = Session::new();
    assert_eq!(session.eval("3 > 2 ? \"yes\" : \"no\"").unwrap(), Val::from("yes"));
}

#[test]
fn test_eval_index_and_member() {
    let mut session = Session::new();
    assert_eq!(session.eval("[10, 20, 30][-1]").unwrap(), Val::Int(30));
    assert_eq!(session.eval("\"hello\"[1]").unwrap(), Val::from("e"));
    assert_eq!(session.eval("{\"a\": {\"b\": 2}}.a.b").unwrap(), Val::Int(2));
    assert_eq!(session.eval("{\"k\": 1}[\"k\"]").unwrap(), Val::Int(1));
}

/* ===================== Display ===================== */

#[test]
fn test_print_display_forms() {
    let output = run_program(
        r#"
        print(1, 2.0, "three", true, null)
        print([1, "a", [2.5]])
        print({"k": "v", "n": 1})
        "#,
    );
    assert_eq!(
        output,
        "1 2.0 three true null\n[1, \"a\", [2.5]]\n{\"k\": \"v\", \"n\": 1}\n"
    );
}

#[test]
fn test_print_function_value() {
    let output = run_program("fn greet() { }\nprint(greet, len)");
    assert_eq!(output, "<fn greet> <builtin len>\n");
}

#[test]
fn test_eprint_goes_to_stderr() {
    let mut session = Session::new();
    session.exec("eprint(\"warn\")\nprint(\"out\")").unwrap();
    assert_eq!(session.host.stderr, "warn\n");
    assert_eq!(session.host.stdout, "out\n");
}

/* ===================== Namespace ===================== */

#[test]
fn test_bindings_persist_across_snippets() {
    let mut session = Session::new();
    session.exec("x = 5").unwrap();
    assert_eq!(session.eval("x * 2").unwrap(), Val::Int(10));

    session.exec("fn double(n) { return n * 2 }").unwrap();
    assert_eq!(session.eval("double(x)").unwrap(), Val::Int(10));
}

#[test]
fn test_user_binding_shadows_builtin() {
    let mut session = Session::new();
    session.exec("len = 3").unwrap();
    assert_eq!(session.eval("len").unwrap(), Val::Int(3));
}

#[test]
fn test_file_operations_are_namespace_values() {
    let mut session = Session::new();
    assert!(matches!(session.eval("read_file").unwrap(), Val::Builtin(_)));
    assert!(session.namespace.contains("list_files"));
    assert!(!session.namespace.contains("print"));
}
