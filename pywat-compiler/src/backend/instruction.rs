//! Stack-machine instruction types in WebAssembly text form.
//!
//! This module defines the local slots (`Slot`), their declarations
//! (`LocalDecl`) and the executable instruction set (`Instr`) produced by
//! code generation. Every type renders to one line of WAT via `Display`.

use crate::ir::ast::BinOp;
use serde::{Serialize, Serializer};
use std::fmt;

// ============================================================================
// Local slots
// ============================================================================

/// A named local holding one `i32`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Receives the discarded result of every expression statement. Its WAT
    /// name `$$last` cannot collide with a source identifier.
    Scratch,
    /// Storage for a variable bound by a definition.
    Named(String),
}

impl Slot {
    pub fn named(name: impl Into<String>) -> Self {
        Slot::Named(name.into())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Scratch => write!(f, "$$last"),
            Slot::Named(name) => write!(f, "${name}"),
        }
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `(local $name i32)`. WebAssembly zero-initializes locals on entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LocalDecl {
    pub slot: Slot,
}

impl LocalDecl {
    pub fn new(slot: Slot) -> Self {
        Self { slot }
    }
}

impl fmt::Display for LocalDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(local {} i32)", self.slot)
    }
}

// ============================================================================
// Instructions
// ============================================================================

/// One executable stack-machine instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Instr {
    /// `(i32.const value)`
    Const { value: i64 },
    /// `(local.get $slot)`
    LocalGet { slot: Slot },
    /// `(local.set $slot)`
    LocalSet { slot: Slot },
    /// `(i32.add)`, `(i32.sub)` or `(i32.mul)`
    Arith {
        #[serde(serialize_with = "serialize_op")]
        op: BinOp,
    },
    /// `(call $func)` with `arity` arguments already on the stack.
    Call { func: &'static str, arity: usize },
}

impl Instr {
    /// Net change in evaluation stack depth caused by this instruction.
    pub fn stack_effect(&self) -> isize {
        match self {
            Instr::Const { .. } | Instr::LocalGet { .. } => 1,
            Instr::LocalSet { .. } | Instr::Arith { .. } => -1,
            // Every builtin returns one i32.
            Instr::Call { arity, .. } => 1 - *arity as isize,
        }
    }
}

fn arith_mnemonic(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "i32.add",
        BinOp::Sub => "i32.sub",
        BinOp::Mul => "i32.mul",
    }
}

fn serialize_op<S: Serializer>(op: &BinOp, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(arith_mnemonic(*op))
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Const { value } => write!(f, "(i32.const {value})"),
            Instr::LocalGet { slot } => write!(f, "(local.get {slot})"),
            Instr::LocalSet { slot } => write!(f, "(local.set {slot})"),
            Instr::Arith { op } => write!(f, "({})", arith_mnemonic(*op)),
            Instr::Call { func, .. } => write!(f, "(call ${func})"),
        }
    }
}
