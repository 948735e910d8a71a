//! Standard library function implementations
//!
//! Builtins are resolved by name after locals and the namespace, so user
//! bindings shadow them. The file operations are also bound in the namespace
//! of every engine.

pub mod base;
pub mod io;


use crate::interpreter::errors::{GuestError, TYPE_ERROR};
use crate::interpreter::executor::{HostContext, Val};

/* ===================== Builtin Identifiers ===================== */

/// Builtin function identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Print,
    Eprint,
    Len,
    Str,
    Int,
    Float,
    Bool,
    Type,
    Range,
    Abs,
    Min,
    Max,
    Sum,
    Sorted,
    Keys,
    Values,
    Append,
    Join,
    Split,
    Upper,
    Lower,
    Strip,
    Contains,
    ReadFile,
    WriteFile,
    ListFiles,
}

impl Builtin {
    pub const ALL: [Builtin; 26] = [
        Builtin::Print,
        Builtin::Eprint,
        Builtin::Len,
        Builtin::Str,
        Builtin::Int,
        Builtin::Float,
        Builtin::Bool,
        Builtin::Type,
        Builtin::Range,
        Builtin::Abs,
        Builtin::Min,
        Builtin::Max,
        Builtin::Sum,
        Builtin::Sorted,
        Builtin::Keys,
        Builtin::Values,
        Builtin::Append,
        Builtin::Join,
        Builtin::Split,
        Builtin::Upper,
        Builtin::Lower,
        Builtin::Strip,
        Builtin::Contains,
        Builtin::ReadFile,
        Builtin::WriteFile,
        Builtin::ListFiles,
    ];

    /// Bound in every namespace at creation and after reset
    pub const FILE_OPERATIONS: [Builtin; 3] =
        [Builtin::ReadFile, Builtin::WriteFile, Builtin::ListFiles];

    pub fn lookup(name: &str) -> Option<Builtin> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Eprint => "eprint",
            Builtin::Len => "len",
            Builtin::Str => "str",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::Bool => "bool",
            Builtin::Type => "type",
            Builtin::Range => "range",
            Builtin::Abs => "abs",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Sum => "sum",
            Builtin::Sorted => "sorted",
            Builtin::Keys => "keys",
            Builtin::Values => "values",
            Builtin::Append => "append",
            Builtin::Join => "join",
            Builtin::Split => "split",
            Builtin::Upper => "upper",
            Builtin::Lower => "lower",
            Builtin::Strip => "strip",
            Builtin::Contains => "contains",
            Builtin::ReadFile => "read_file",
            Builtin::WriteFile => "write_file",
            Builtin::ListFiles => "list_files",
        }
    }
}

/* ===================== Builtin Dispatcher ===================== */

/// Call a builtin with evaluated arguments
pub fn call_builtin(
    builtin: Builtin,
    args: Vec<Val>,
    host: &mut dyn HostContext,
) -> Result<Val, GuestError> {
    match builtin {
        Builtin::Print => io::print(args, host),
        Builtin::Eprint => io::eprint(args, host),
        Builtin::ReadFile => io::read_file(args, host),
        Builtin::WriteFile => io::write_file(args, host),
        Builtin::ListFiles => io::list_files(args, host),
        Builtin::Len => base::len(args),
        Builtin::Str => base::str(args),
        Builtin::Int => base::int(args),
        Builtin::Float => base::float(args),
        Builtin::Bool => base::bool(args),
        Builtin::Type => base::type_of(args),
        Builtin::Range => base::range(args),
        Builtin::Abs => base::abs(args),
        Builtin::Min => base::min(args),
        Builtin::Max => base::max(args),
        Builtin::Sum => base::sum(args),
        Builtin::Sorted => base::sorted(args),
        Builtin::Keys => base::keys(args),
        Builtin::Values => base::values(args),
        Builtin::Append => base::append(args),
        Builtin::Join => base::join(args),
        Builtin::Split => base::split(args),
        Builtin::Upper => base::upper(args),
        Builtin::Lower => base::lower(args),
        Builtin::Strip => base::strip(args),
        Builtin::Contains => base::contains(args),
    }
}

/* ===================== Argument Helpers ===================== */

/// Check the argument count is within `min..=max`
pub(crate) fn check_arity(
    name: &str,
    args: &[Val],
    min: usize,
    max: usize,
) -> Result<(), GuestError> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let expected = if min == max {
        format!("exactly {}", min)
    } else if args.len() < min {
        format!("at least {}", min)
    } else {
        format!("at most {}", max)
    };
    let noun = if min == max && min == 1 { "argument" } else { "arguments" };
    Err(GuestError::new(
        TYPE_ERROR,
        format!("{}() takes {} {} ({} given)", name, expected, noun, args.len()),
    ))
}

pub(crate) fn wrong_type(name: &str, expected: &str, got: &Val) -> GuestError {
    GuestError::new(
        TYPE_ERROR,
        format!("{}() expected {}, got {}", name, expected, got.type_name()),
    )
}

pub(crate) fn expect_str<'v>(name: &str, val: &'v Val) -> Result<&'v str, GuestError> {
    match val {
        Val::Str(s) => Ok(s),
        other => Err(wrong_type(name, "str", other)),
    }
}
