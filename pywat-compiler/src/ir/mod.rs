//! Compiler core: the AST, tree lowering from a concrete syntax tree, and the
//! definition check that gates code generation.

pub mod ast;
pub mod check;
pub mod error_utils;
pub mod lower;
pub mod symbol_table;
