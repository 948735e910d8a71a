//! Assignment tests: plain, compound, indexed and member targets

use super::helpers::{run_program_err, Session};
use crate::interpreter::errors::{INDEX_ERROR, NAME_ERROR, TYPE_ERROR};
use crate::interpreter::executor::Val;
use indexmap::IndexMap;

#[test]
fn test_index_assignment_on_list() {
    let mut session = Session::new();
    session.exec("items = [1, 2, 3]\nitems[0] = 10\nitems[-1] *= 2").unwrap();
    assert_eq!(
        session.get("items"),
        Val::List(vec![Val::Int(10), Val::Int(2), Val::Int(6)])
    );
}

#[test]
fn test_member_and_key_assignment_on_dict() {
    let mut session = Session::new();
    session
        .exec("cfg = {\"limits\": {}}\ncfg.limits.max = 5\ncfg[\"name\"] = \"x\"")
        .unwrap();

    let mut limits = IndexMap::new();
    limits.insert("max".to_string(), Val::Int(5));
    let mut expected = IndexMap::new();
    expected.insert("limits".to_string(), Val::Dict(limits));
    expected.insert("name".to_string(), Val::from("x"));

    assert_eq!(session.get("cfg"), Val::Dict(expected));
}

#[test]
fn test_containers_have_value_semantics() {
    let mut session = Session::new();
    session.exec("a = [1]\nb = a\nb[0] = 2\nc = append(a, 3)").unwrap();
    assert_eq!(session.get("a"), Val::List(vec![Val::Int(1)]));
    assert_eq!(session.get("b"), Val::List(vec![Val::Int(2)]));
    assert_eq!(session.get("c"), Val::List(vec![Val::Int(1), Val::Int(3)]));
}

#[test]
fn test_function_can_update_namespace_container() {
    let mut session = Session::new();
    session
        .exec("counts = {\"hits\": 0}\nfn hit() { counts[\"hits\"] += 1 }\nhit()\nhit()")
        .unwrap();
    assert_eq!(session.eval("counts.hits").unwrap(), Val::Int(2));
}

#[test]
fn test_compound_assignment_on_undefined_name() {
    let err = run_program_err("missing += 1");
    assert_eq!(err.kind(), NAME_ERROR);
}

#[test]
fn test_index_assignment_out_of_range() {
    let err = run_program_err("items = [1]\nitems[3] = 0");
    assert_eq!(err.kind(), INDEX_ERROR);
}

#[test]
fn test_string_item_assignment_is_rejected() {
    let err = run_program_err("s = \"abc\"\ns[0] = \"z\"");
    assert_eq!(err.kind(), TYPE_ERROR);
    assert!(err.message().contains("does not support item assignment"));
}
