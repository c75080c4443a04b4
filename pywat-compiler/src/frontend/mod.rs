//! Bundled concrete-syntax frontend.
//!
//! Turns source text into an untyped [`cst::SyntaxTree`] whose node kinds
//! follow a Python grammar (`Script`, `AssignStatement`, `CallExpression`,
//! ...). The tree accepts more than the compiler does; tree lowering
//! narrows it down.

pub mod cst;
pub mod lexer;
pub mod parser;

pub use cst::{SyntaxCursor, SyntaxKind, SyntaxTree};
pub use parser::parse_tree;
