//! Use-before-definition check.
//!
//! One forward pass over the statements. A `Define` makes its name visible
//! only after its value has been checked, so `x = x + 1` is rejected unless
//! `x` was defined earlier. Expressions are walked left to right, depth
//! first, and the first undefined reference aborts the pass.

use super::ast::{Expr, Stmt};
use super::error_utils::make_reference_error;
use super::symbol_table::SymbolTable;
use crate::CompileResult;

pub fn check_defined(program: &[Stmt]) -> CompileResult<()> {
    let mut symbols = SymbolTable::new();
    for stmt in program {
        match stmt {
            Stmt::Define { name, value } => {
                check_expr(value, &symbols)?;
                symbols.define(name);
            }
            Stmt::ExprStmt { expr } => check_expr(expr, &symbols)?,
        }
    }
    Ok(())
}

fn check_expr(expr: &Expr, symbols: &SymbolTable) -> CompileResult<()> {
    match expr {
        Expr::Number(_) => Ok(()),
        Expr::Id { name, span } => {
            if symbols.is_defined(name) {
                Ok(())
            } else {
                Err(make_reference_error(name, *span))
            }
        }
        Expr::Binary { left, right, .. } => {
            check_expr(left, symbols)?;
            check_expr(right, symbols)
        }
        Expr::Builtin1 { arg, .. } => check_expr(arg, symbols),
        Expr::Builtin2 { arg1, arg2, .. } => {
            check_expr(arg1, symbols)?;
            check_expr(arg2, symbols)
        }
    }
}
