//! Runtime value types

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::interpreter::ast::Stmt;
use crate::interpreter::errors::ErrorInfo;
use crate::interpreter::stdlib::Builtin;

/// A user-defined function
#[derive(Debug)]
pub struct FuncDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

/// Runtime value type
///
/// Containers have value semantics: cloning a list or dict copies it.
#[derive(Debug, Clone)]
pub enum Val {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Val>),
    Dict(IndexMap<String, Val>),
    Func(Arc<FuncDef>),
    Builtin(Builtin),
    /// Error value bound by `catch`
    Error(ErrorInfo),
}

impl Val {
    /// Check if value is truthy (for conditionals)
    pub fn is_truthy(&self) -> bool {
        match self {
            Val::Null => false,
            Val::Bool(b) => *b,
            Val::Int(n) => *n != 0,
            Val::Float(f) => *f != 0.0,
            Val::Str(s) => !s.is_empty(),
            Val::List(items) => !items.is_empty(),
            Val::Dict(map) => !map.is_empty(),
            Val::Func(_) | Val::Builtin(_) | Val::Error(_) => true,
        }
    }

    /// Name reported by `type()` and in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Val::Null => "null",
            Val::Bool(_) => "bool",
            Val::Int(_) => "int",
            Val::Float(_) => "float",
            Val::Str(_) => "str",
            Val::List(_) => "list",
            Val::Dict(_) => "dict",
            Val::Func(_) | Val::Builtin(_) => "function",
            Val::Error(_) => "error",
        }
    }

    /// Numeric view used by mixed int/float arithmetic
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Val::Int(n) => Some(*n as f64),
            Val::Float(f) => Some(*f),
            Val::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Representation used inside containers: strings are quoted
    pub fn repr(&self) -> String {
        match self {
            Val::Str(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }

    /// Ordering for `<`, `sorted`, `min` and `max`; `None` when the types are not comparable
    pub fn compare(&self, other: &Val) -> Option<Ordering> {
        match (self, other) {
            (Val::Str(a), Val::Str(b)) => Some(a.cmp(b)),
            (Val::Int(a), Val::Int(b)) => Some(a.cmp(b)),
            (Val::List(a), Val::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        ord => return Some(ord),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            _ => self.as_f64()?.partial_cmp(&other.as_f64()?),
        }
    }
}

impl PartialEq for Val {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Val::Null, Val::Null) => true,
            (Val::Bool(a), Val::Bool(b)) => a == b,
            (Val::Int(a), Val::Int(b)) => a == b,
            (Val::Int(_), Val::Float(_)) | (Val::Float(_), Val::Int(_)) | (Val::Float(_), Val::Float(_)) => {
                self.as_f64() == other.as_f64()
            }
            (Val::Str(a), Val::Str(b)) => a == b,
            (Val::List(a), Val::List(b)) => a == b,
            (Val::Dict(a), Val::Dict(b)) => a == b,
            (Val::Func(a), Val::Func(b)) => Arc::ptr_eq(a, b),
            (Val::Builtin(a), Val::Builtin(b)) => a == b,
            (Val::Error(a), Val::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Val {
    fn from(b: bool) -> Self {
        Val::Bool(b)
    }
}

impl From<i64> for Val {
    fn from(n: i64) -> Self {
        Val::Int(n)
    }
}

impl From<f64> for Val {
    fn from(f: f64) -> Self {
        Val::Float(f)
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Self {
        Val::Str(s.to_string())
    }
}

impl From<String> for Val {
    fn from(s: String) -> Self {
        Val::Str(s)
    }
}

impl From<Vec<Val>> for Val {
    fn from(items: Vec<Val>) -> Self {
        Val::List(items)
    }
}

/// Display form used by `print`, `str` and the echoed expression result
impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Val::Null => write!(f, "null"),
            Val::Bool(b) => write!(f, "{}", b),
            Val::Int(n) => write!(f, "{}", n),
            Val::Float(x) => write!(f, "{}", format_float(*x)),
            Val::Str(s) => write!(f, "{}", s),
            Val::List(items) => {
                let parts: Vec<String> = items.iter().map(Val::repr).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Val::Dict(map) => {
                let parts: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{:?}: {}", k, v.repr()))
                    .collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Val::Func(def) => write!(f, "<fn {}>", def.name),
            Val::Builtin(builtin) => write!(f, "<builtin {}>", builtin.name()),
            Val::Error(info) => write!(f, "{}", info),
        }
    }
}

/// Floats always show a fractional part so they stay distinguishable from ints
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{:.1}", x)
    } else {
        format!("{}", x)
    }
}
