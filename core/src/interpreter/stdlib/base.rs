//! Conversions, numeric helpers, collection and string builtins
//!
//! All of these are pure: they take evaluated arguments and never touch the host.

use std::cmp::Ordering;

use super::{check_arity, expect_str, wrong_type};
use crate::interpreter::ast::BinaryOp;
use crate::interpreter::errors::{GuestError, OVERFLOW_ERROR, TYPE_ERROR, VALUE_ERROR};
use crate::interpreter::executor::operators;
use crate::interpreter::executor::Val;

type BuiltinResult = Result<Val, GuestError>;

/* ===================== Conversions ===================== */

pub fn len(args: Vec<Val>) -> BuiltinResult {
    check_arity("len", &args, 1, 1)?;
    let n = match &args[0] {
        Val::Str(s) => s.chars().count(),
        Val::List(items) => items.len(),
        Val::Dict(map) => map.len(),
        other => {
            return Err(GuestError::new(
                TYPE_ERROR,
                format!("object of type '{}' has no len()", other.type_name()),
            ))
        }
    };
    Ok(Val::Int(n as i64))
}

pub fn str(args: Vec<Val>) -> BuiltinResult {
    check_arity("str", &args, 0, 1)?;
    Ok(Val::Str(
        args.first().map(Val::to_string).unwrap_or_default(),
    ))
}

pub fn int(args: Vec<Val>) -> BuiltinResult {
    check_arity("int", &args, 1, 1)?;
    match &args[0] {
        Val::Int(n) => Ok(Val::Int(*n)),
        Val::Bool(b) => Ok(Val::Int(*b as i64)),
        Val::Float(f) => {
            if !f.is_finite() {
                return Err(GuestError::new(
                    VALUE_ERROR,
                    format!("cannot convert float {} to integer", f),
                ));
            }
            let truncated = f.trunc();
            if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
                return Err(GuestError::new(OVERFLOW_ERROR, "float too large to convert to int"));
            }
            Ok(Val::Int(truncated as i64))
        }
        Val::Str(s) => s.trim().parse::<i64>().map(Val::Int).map_err(|_| {
            GuestError::new(
                VALUE_ERROR,
                format!("invalid literal for int() with base 10: {:?}", s),
            )
        }),
        other => Err(wrong_type("int", "a number or string", other)),
    }
}

pub fn float(args: Vec<Val>) -> BuiltinResult {
    check_arity("float", &args, 1, 1)?;
    match &args[0] {
        Val::Str(s) => s.trim().parse::<f64>().map(Val::Float).map_err(|_| {
            GuestError::new(
                VALUE_ERROR,
                format!("could not convert string to float: {:?}", s),
            )
        }),
        other => other
            .as_f64()
            .map(Val::Float)
            .ok_or_else(|| wrong_type("float", "a number or string", other)),
    }
}

pub fn bool(args: Vec<Val>) -> BuiltinResult {
    check_arity("bool", &args, 0, 1)?;
    Ok(Val::Bool(args.first().map(Val::is_truthy).unwrap_or(false)))
}

pub fn type_of(args: Vec<Val>) -> BuiltinResult {
    check_arity("type", &args, 1, 1)?;
    Ok(Val::Str(args[0].type_name().to_string()))
}

/* ===================== Numeric ===================== */

fn expect_int(name: &str, val: &Val) -> Result<i64, GuestError> {
    match val {
        Val::Int(n) => Ok(*n),
        other => Err(wrong_type(name, "int", other)),
    }
}

/// `range(stop)` or `range(start, stop[, step])` as a list
pub fn range(args: Vec<Val>) -> BuiltinResult {
    check_arity("range", &args, 1, 3)?;
    let ints = args
        .iter()
        .map(|arg| expect_int("range", arg))
        .collect::<Result<Vec<i64>, _>>()?;
    let (start, stop, step) = match ints.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step, ..] => (*start, *stop, *step),
        [] => (0, 0, 1),
    };
    if step == 0 {
        return Err(GuestError::new(VALUE_ERROR, "range() arg 3 must not be zero"));
    }

    let mut items = Vec::new();
    let mut current = start;
    while (step > 0 && current < stop) || (step < 0 && current > stop) {
        items.push(Val::Int(current));
        current = match current.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(Val::List(items))
}

pub fn abs(args: Vec<Val>) -> BuiltinResult {
    check_arity("abs", &args, 1, 1)?;
    match &args[0] {
        Val::Int(n) => n
            .checked_abs()
            .map(Val::Int)
            .ok_or_else(|| GuestError::new(OVERFLOW_ERROR, "integer overflow in abs()")),
        Val::Float(f) => Ok(Val::Float(f.abs())),
        Val::Bool(b) => Ok(Val::Int(*b as i64)),
        other => Err(GuestError::new(
            TYPE_ERROR,
            format!("bad operand type for abs(): '{}'", other.type_name()),
        )),
    }
}

pub fn min(args: Vec<Val>) -> BuiltinResult {
    extremum("min", args, Ordering::Less)
}

pub fn max(args: Vec<Val>) -> BuiltinResult {
    extremum("max", args, Ordering::Greater)
}

/// Shared body of `min`/`max`: one list argument or several values
fn extremum(name: &str, args: Vec<Val>, wanted: Ordering) -> BuiltinResult {
    if args.is_empty() {
        return Err(GuestError::new(
            TYPE_ERROR,
            format!("{}() expected at least 1 argument, got 0", name),
        ));
    }
    let candidates = if args.len() == 1 {
        match args.into_iter().next() {
            Some(Val::List(items)) => items,
            Some(single) => return Err(wrong_type(name, "a list", &single)),
            None => Vec::new(),
        }
    } else {
        args
    };

    let mut iter = candidates.into_iter();
    let mut best = iter.next().ok_or_else(|| {
        GuestError::new(VALUE_ERROR, format!("{}() arg is an empty sequence", name))
    })?;
    for candidate in iter {
        if compare_or_err(&candidate, &best)? == wanted {
            best = candidate;
        }
    }
    Ok(best)
}

fn compare_or_err(a: &Val, b: &Val) -> Result<Ordering, GuestError> {
    a.compare(b).ok_or_else(|| {
        GuestError::new(
            TYPE_ERROR,
            format!(
                "'<' not supported between instances of '{}' and '{}'",
                a.type_name(),
                b.type_name()
            ),
        )
    })
}

pub fn sum(args: Vec<Val>) -> BuiltinResult {
    check_arity("sum", &args, 1, 2)?;
    let mut args = args.into_iter();
    let items = match args.next() {
        Some(Val::List(items)) => items,
        Some(other) => return Err(wrong_type("sum", "a list", &other)),
        None => Vec::new(),
    };
    let start = args.next().unwrap_or(Val::Int(0));
    items
        .into_iter()
        .try_fold(start, |acc, item| operators::binary(BinaryOp::Add, acc, item))
}

/* ===================== Collections ===================== */

pub fn sorted(args: Vec<Val>) -> BuiltinResult {
    check_arity("sorted", &args, 1, 1)?;
    let mut items = match args.into_iter().next() {
        Some(Val::List(items)) => items,
        Some(Val::Dict(map)) => map.into_keys().map(Val::Str).collect(),
        Some(Val::Str(s)) => s.chars().map(|c| Val::Str(c.to_string())).collect(),
        Some(other) => return Err(wrong_type("sorted", "a list", &other)),
        None => Vec::new(),
    };

    // Validate comparability first; sort_by needs a total order
    for pair in items.windows(2) {
        compare_or_err(&pair[0], &pair[1])?;
    }
    items.sort_by(|a, b| a.compare(b).unwrap_or(Ordering::Equal));
    Ok(Val::List(items))
}

pub fn keys(args: Vec<Val>) -> BuiltinResult {
    check_arity("keys", &args, 1, 1)?;
    match &args[0] {
        Val::Dict(map) => Ok(Val::List(map.keys().cloned().map(Val::Str).collect())),
        other => Err(wrong_type("keys", "a dict", other)),
    }
}

pub fn values(args: Vec<Val>) -> BuiltinResult {
    check_arity("values", &args, 1, 1)?;
    match &args[0] {
        Val::Dict(map) => Ok(Val::List(map.values().cloned().collect())),
        other => Err(wrong_type("values", "a dict", other)),
    }
}

/// Returns a new list; the argument is not modified
pub fn append(args: Vec<Val>) -> BuiltinResult {
    check_arity("append", &args, 2, 2)?;
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(Val::List(mut items)), Some(item)) => {
            items.push(item);
            Ok(Val::List(items))
        }
        (Some(other), _) => Err(wrong_type("append", "a list", &other)),
        (None, _) => Ok(Val::List(Vec::new())),
    }
}

pub fn contains(args: Vec<Val>) -> BuiltinResult {
    check_arity("contains", &args, 2, 2)?;
    operators::contains(&args[0], &args[1]).map(Val::Bool)
}

/* ===================== Strings ===================== */

/// `join(items[, sep])`
pub fn join(args: Vec<Val>) -> BuiltinResult {
    check_arity("join", &args, 1, 2)?;
    let sep = match args.get(1) {
        Some(sep) => expect_str("join", sep)?,
        None => "",
    };
    let items = match &args[0] {
        Val::List(items) => items,
        other => return Err(wrong_type("join", "a list", other)),
    };
    let parts = items
        .iter()
        .map(|item| match item {
            Val::Str(s) => Ok(s.as_str()),
            other => Err(GuestError::new(
                TYPE_ERROR,
                format!("join() expected str items, found {}", other.type_name()),
            )),
        })
        .collect::<Result<Vec<&str>, _>>()?;
    Ok(Val::Str(parts.join(sep)))
}

/// `split(s[, sep])`; without a separator splits on runs of whitespace
pub fn split(args: Vec<Val>) -> BuiltinResult {
    check_arity("split", &args, 1, 2)?;
    let s = expect_str("split", &args[0])?;
    let parts: Vec<Val> = match args.get(1) {
        None | Some(Val::Null) => s.split_whitespace().map(Val::from).collect(),
        Some(sep) => {
            let sep = expect_str("split", sep)?;
            if sep.is_empty() {
                return Err(GuestError::new(VALUE_ERROR, "empty separator"));
            }
            s.split(sep).map(Val::from).collect()
        }
    };
    Ok(Val::List(parts))
}

pub fn upper(args: Vec<Val>) -> BuiltinResult {
    check_arity("upper", &args, 1, 1)?;
    Ok(Val::Str(expect_str("upper", &args[0])?.to_uppercase()))
}

pub fn lower(args: Vec<Val>) -> BuiltinResult {
    check_arity("lower", &args, 1, 1)?;
    Ok(Val::Str(expect_str("lower", &args[0])?.to_lowercase()))
}

pub fn strip(args: Vec<Val>) -> BuiltinResult {
    check_arity("strip", &args, 1, 1)?;
    Ok(Val::Str(expect_str("strip", &args[0])?.trim().to_string()))
}
