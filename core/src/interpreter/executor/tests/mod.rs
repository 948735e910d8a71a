//! Tests for the executor
//!
//! Organized by feature area

pub(crate) mod helpers;

mod assign_tests;
mod basic_tests;
mod control_tests;
mod error_tests;
mod function_tests;
