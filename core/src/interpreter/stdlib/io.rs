//! Output and file builtins
//!
//! `print`/`eprint` write to the captured streams of the current execution.
//! The file operations forward to the VFS facade and turn its errors into
//! catchable guest errors.

use super::{check_arity, expect_str};
use crate::interpreter::errors::{
    GuestError, FILE_NOT_FOUND_ERROR, IO_ERROR, TIMEOUT_ERROR,
};
use crate::interpreter::executor::{HostContext, Val};
use crate::vfs::{VfsError, VfsFacade};

type BuiltinResult = Result<Val, GuestError>;

/* ===================== Output ===================== */

fn render_line(args: &[Val]) -> String {
    let mut line = args
        .iter()
        .map(Val::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    line.push('\n');
    line
}

pub fn print(args: Vec<Val>, host: &mut dyn HostContext) -> BuiltinResult {
    host.write_stdout(&render_line(&args));
    Ok(Val::Null)
}

pub fn eprint(args: Vec<Val>, host: &mut dyn HostContext) -> BuiltinResult {
    host.write_stderr(&render_line(&args));
    Ok(Val::Null)
}

/* ===================== Files ===================== */

impl From<VfsError> for GuestError {
    fn from(err: VfsError) -> Self {
        let kind = match &err {
            VfsError::NotFound { .. } => FILE_NOT_FOUND_ERROR,
            VfsError::Io { .. } => IO_ERROR,
            VfsError::Timeout { .. } => TIMEOUT_ERROR,
        };
        GuestError::new(kind, err.to_string())
    }
}

fn facade(host: &dyn HostContext) -> Result<&VfsFacade, GuestError> {
    host.vfs()
        .ok_or_else(|| GuestError::new(IO_ERROR, "no storage is attached to this engine"))
}

pub fn read_file(args: Vec<Val>, host: &mut dyn HostContext) -> BuiltinResult {
    check_arity("read_file", &args, 1, 1)?;
    let path = expect_str("read_file", &args[0])?;
    let content = facade(host)?.read_file(path)?;
    Ok(Val::Str(content))
}

pub fn write_file(args: Vec<Val>, host: &mut dyn HostContext) -> BuiltinResult {
    check_arity("write_file", &args, 2, 2)?;
    let path = expect_str("write_file", &args[0])?;
    let content = expect_str("write_file", &args[1])?;
    let written = facade(host)?.write_file(path, content)?;
    Ok(Val::Bool(written))
}

pub fn list_files(args: Vec<Val>, host: &mut dyn HostContext) -> BuiltinResult {
    check_arity("list_files", &args, 0, 0)?;
    let names = facade(host)?.list_files()?;
    Ok(Val::List(names.into_iter().map(Val::Str).collect()))
}
