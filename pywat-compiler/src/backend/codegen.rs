//! AST → stack-machine code.
//!
//! Expressions are emitted in postfix order, so every statement starts and
//! ends with an empty evaluation stack: a definition stores its value into
//! the variable's slot and an expression statement stores into the scratch
//! slot.

use super::instruction::{Instr, LocalDecl, Slot};
use super::program::CompiledProgram;
use crate::ir::ast::{Expr, Stmt};
use std::collections::HashSet;

pub fn generate(program: &[Stmt]) -> CompiledProgram {
    let mut cg = Codegen::new();
    cg.declare_locals(program);
    for stmt in program {
        cg.emit_stmt(stmt);
    }
    cg.finish()
}

/// Instructions for a single statement, without any slot declarations.
pub fn generate_stmt(stmt: &Stmt) -> Vec<Instr> {
    let mut cg = Codegen::new();
    cg.emit_stmt(stmt);
    cg.instrs
}

struct Codegen {
    locals: Vec<LocalDecl>,
    declared: HashSet<String>,
    instrs: Vec<Instr>,
}

impl Codegen {
    fn new() -> Self {
        Self {
            locals: vec![LocalDecl::new(Slot::Scratch)],
            declared: HashSet::new(),
            instrs: Vec::new(),
        }
    }

    fn finish(self) -> CompiledProgram {
        CompiledProgram {
            locals: self.locals,
            instrs: self.instrs,
        }
    }

    /// One slot per distinct defined name, in order of first definition.
    fn declare_locals(&mut self, program: &[Stmt]) {
        for stmt in program {
            if let Stmt::Define { name, .. } = stmt {
                self.note_user_var(name);
            }
        }
    }

    fn note_user_var(&mut self, name: &str) {
        if !self.declared.contains(name) {
            self.declared.insert(name.to_string());
            self.locals.push(LocalDecl::new(Slot::named(name)));
        }
    }

    fn emit(&mut self, instr: Instr) {
        self.instrs.push(instr);
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Define { name, value } => {
                self.emit_expr(value);
                self.emit(Instr::LocalSet {
                    slot: Slot::named(name.as_str()),
                });
            }
            Stmt::ExprStmt { expr } => {
                self.emit_expr(expr);
                self.emit(Instr::LocalSet {
                    slot: Slot::Scratch,
                });
            }
        }
    }

    fn emit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Number(value) => self.emit(Instr::Const { value: *value }),
            Expr::Id { name, .. } => self.emit(Instr::LocalGet {
                slot: Slot::named(name.as_str()),
            }),
            Expr::Binary { op, left, right } => {
                self.emit_expr(left);
                self.emit_expr(right);
                self.emit(Instr::Arith { op: *op });
            }
            Expr::Builtin1 { name, arg } => {
                self.emit_expr(arg);
                self.emit(Instr::Call {
                    func: name.name(),
                    arity: 1,
                });
            }
            Expr::Builtin2 { name, arg1, arg2 } => {
                self.emit_expr(arg1);
                self.emit_expr(arg2);
                self.emit(Instr::Call {
                    func: name.name(),
                    arity: 2,
                });
            }
        }
    }
}
