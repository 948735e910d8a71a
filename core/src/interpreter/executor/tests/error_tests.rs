//! Tests for error raising, catching and location tracking

use super::helpers::{run_program, run_program_err, Session};
use crate::interpreter::errors::{
    ATTRIBUTE_ERROR, KEY_ERROR, NAME_ERROR, TOP_LEVEL, USER_ERROR, ZERO_DIVISION_ERROR,
};
use crate::interpreter::executor::Val;

/* ===================== Raising ===================== */

#[test]
fn test_undefined_name() {
    let err = run_program_err("y = undefined_thing + 1");
    assert_eq!(err.kind(), NAME_ERROR);
    assert_eq!(err.message(), "name 'undefined_thing' is not defined");
}

#[test]
fn test_division_by_zero_raises() {
    let mut session = Session::new();
    let err = session.eval("1/0").unwrap_err();
    assert_eq!(err.kind(), ZERO_DIVISION_ERROR);
}

#[test]
fn test_missing_key_and_attribute() {
    assert_eq!(run_program_err("d = {}\nd[\"k\"]").kind(), KEY_ERROR);
    assert_eq!(run_program_err("n = 1\nn.field").kind(), ATTRIBUTE_ERROR);
}

#[test]
fn test_throw_string_uses_error_kind() {
    let err = run_program_err("throw \"custom failure\"");
    assert_eq!(err.kind(), USER_ERROR);
    assert_eq!(err.message(), "custom failure");
}

/* ===================== Catching ===================== */

#[test]
fn test_try_catch_binds_error_value() {
    let source = r#"
        try {
            x = 1 / 0
        } catch err {
            print(err.kind, "-", err.message)
        }
    "#;
    assert_eq!(run_program(source), "ZeroDivisionError - division by zero\n");
}

#[test]
fn test_rethrow_preserves_kind() {
    let source = r#"
        try { missing_name } catch e { throw e }
    "#;
    let err = run_program_err(source);
    assert_eq!(err.kind(), NAME_ERROR);
}

#[test]
fn test_error_unwinds_through_functions_to_catch() {
    let mut session = Session::new();
    session
        .exec(
            r#"
            fn inner() { throw "deep" }
            fn outer() { inner(); return "unreached" }
            try { outer() } catch e { caught = e.message }
            "#,
        )
        .unwrap();
    assert_eq!(session.get("caught"), Val::from("deep"));
}

/* ===================== Locations ===================== */

#[test]
fn test_top_level_error_location() {
    let err = run_program_err("a = 1\nb = a + nope");
    assert_eq!(err.frames.len(), 1);
    assert_eq!(err.frames[0].function, TOP_LEVEL);
    assert_eq!(err.frames[0].line, 2);
    assert_eq!(err.frames[0].column, 9);
}

#[test]
fn test_error_frames_follow_call_stack() {
    let source = "fn inner() {\n  return 1 / 0\n}\nfn outer() {\n  return inner()\n}\nouter()";
    let err = run_program_err(source);

    let frames: Vec<(&str, usize)> = err
        .frames
        .iter()
        .map(|frame| (frame.function.as_str(), frame.line))
        .collect();
    // Innermost first
    assert_eq!(frames, vec![("inner", 2), ("outer", 5), (TOP_LEVEL, 7)]);
}
