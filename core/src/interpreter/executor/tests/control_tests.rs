//! Control flow tests: if, while, for, break, continue

use super::helpers::{run_program, Session};
use crate::interpreter::executor::Val;

#[test]
fn test_if_else_chain() {
    let source = r#"
        fn classify(n) {
            if n < 0 { return "negative" }
            else if n == 0 { return "zero" }
            else { return "positive" }
        }
        print(classify(-1), classify(0), classify(3))
    "#;
    assert_eq!(run_program(source), "negative zero positive\n");
}

#[test]
fn test_while_loop_with_compound_assignment() {
    let mut session = Session::new();
    session
        .exec("i = 0; total = 0\nwhile i < 5 { total += i; i += 1 }")
        .unwrap();
    assert_eq!(session.get("total"), Val::Int(10));
    assert_eq!(session.get("i"), Val::Int(5));
}

#[test]
fn test_for_over_list_string_and_dict() {
    let source = r#"
        for n in [1, 2] { print(n) }
        for c in "ab" { print(c) }
        for k in {"x": 1, "y": 2} { print(k) }
    "#;
    assert_eq!(run_program(source), "1\n2\na\nb\nx\ny\n");
}

#[test]
fn test_break_and_continue() {
    let source = r#"
        for n in range(10) {
            if n % 2 == 0 { continue }
            if n > 6 { break }
            print(n)
        }
    "#;
    assert_eq!(run_program(source), "1\n3\n5\n");
}

#[test]
fn test_break_only_exits_inner_loop() {
    let source = r#"
        for a in [1, 2] {
            while true { break }
            print(a)
        }
    "#;
    assert_eq!(run_program(source), "1\n2\n");
}

#[test]
fn test_loop_variable_survives_loop() {
    let mut session = Session::new();
    session.exec("for item in [1, 2, 3] { }").unwrap();
    assert_eq!(session.get("item"), Val::Int(3));
}
