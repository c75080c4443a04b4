//! WebAssembly text backend.
//!
//! Module layout:
//! - `instruction`: local slots, declarations and stack instructions
//! - `codegen`    : AST → instruction lowering
//! - `program`    : the compiled program and its text/module rendering

pub mod codegen;
pub mod instruction;
pub mod program;

pub use instruction::{Instr, LocalDecl, Slot};
pub use program::{CompiledProgram, ModuleOptions};
