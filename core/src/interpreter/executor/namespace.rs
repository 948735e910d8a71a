//! Persistent evaluation namespace

use indexmap::IndexMap;

use super::values::Val;
use crate::interpreter::stdlib::Builtin;

/// Names bound at top level, shared by every execution of one engine
///
/// The mapping lives as long as its engine and is mutated in place; it is
/// never swapped for a fresh one.
#[derive(Debug, Default)]
pub struct Namespace {
    bindings: IndexMap<String, Val>,
}

impl Namespace {
    /// Namespace pre-seeded with the file operations
    pub fn seeded() -> Self {
        let mut namespace = Self::default();
        namespace.seed();
        namespace
    }

    pub fn get(&self, name: &str) -> Option<&Val> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Bound names in binding order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Val) {
        self.bindings.insert(name.into(), value);
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Val> {
        self.bindings.get_mut(name)
    }

    /// Drop every binding and restore the file operations
    pub fn reset(&mut self) {
        self.bindings.clear();
        self.seed();
    }

    fn seed(&mut self) {
        for builtin in Builtin::FILE_OPERATIONS {
            self.set(builtin.name(), Val::Builtin(builtin));
        }
    }
}
