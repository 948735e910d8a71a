//! Function definition and call tests

use super::helpers::{run_program, run_program_err, Session};
use crate::interpreter::errors::{NAME_ERROR, RECURSION_ERROR, TYPE_ERROR};
use crate::interpreter::executor::Val;

#[test]
fn test_recursive_function() {
    let source = r#"
        fn fact(n) {
            if n <= 1 { return 1 }
            return n * fact(n - 1)
        }
        print(fact(10))
    "#;
    assert_eq!(run_program(source), "3628800\n");
}

#[test]
fn test_function_without_return_yields_null() {
    let mut session = Session::new();
    session.exec("fn noop() { x = 1 }").unwrap();
    assert_eq!(session.eval("noop()").unwrap(), Val::Null);
}

#[test]
fn test_locals_do_not_leak_into_namespace() {
    let mut session = Session::new();
    session.exec("fn f(a) { b = a + 1; return b }\nr = f(1)").unwrap();
    assert_eq!(session.get("r"), Val::Int(2));
    assert!(!session.namespace.contains("a"));
    assert!(!session.namespace.contains("b"));
}

#[test]
fn test_functions_read_namespace() {
    let source = r#"
        base = 100
        fn offset(n) { return base + n }
        print(offset(5))
    "#;
    assert_eq!(run_program(source), "105\n");
}

#[test]
fn test_functions_are_first_class() {
    let source = r#"
        fn apply(f, v) { return f(v) }
        fn inc(n) { return n + 1 }
        print(apply(inc, 1), apply(upper, "a"))
    "#;
    assert_eq!(run_program(source), "2 A\n");
}

#[test]
fn test_wrong_argument_count() {
    let err = run_program_err("fn pair(a, b) { }\npair(1)");
    assert_eq!(err.kind(), TYPE_ERROR);
    assert_eq!(err.message(), "pair() takes 2 arguments but 1 was given");
}

#[test]
fn test_calling_non_function() {
    let err = run_program_err("x = 3\nx()");
    assert_eq!(err.kind(), TYPE_ERROR);
    assert!(err.message().contains("not callable"));
}

#[test]
fn test_unbounded_recursion_is_recursion_error() {
    let err = run_program_err("fn down(n) { return down(n + 1) }\ndown(0)");
    assert_eq!(err.kind(), RECURSION_ERROR);
}

#[test]
fn test_nested_function_cannot_see_outer_locals() {
    let source = r#"
        fn outer() {
            hidden = 1
            fn inner() { return hidden }
            return inner()
        }
        outer()
    "#;
    let err = run_program_err(source);
    assert_eq!(err.kind(), NAME_ERROR);
}
