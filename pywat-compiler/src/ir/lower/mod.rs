//! Tree lowering: concrete syntax tree → AST.
//!
//! Every `lower_*` function is entered with the cursor on the node to lower
//! and returns with the cursor back on that same node, on success and on
//! failure. Descending into children goes through [`within_children`], which
//! is the only place that moves the cursor back up.

mod expr;
mod stmt;

pub use expr::{lower_expr, lower_op};
pub use stmt::lower_stmt;

use super::ast::Stmt;
use super::error_utils::make_parse_error;
use crate::cursor::TreeCursor;
use crate::frontend::SyntaxKind;
use crate::{CompileError, CompileResult, ParseErrorKind, Span};
use tracing::trace;

/// Smallest accepted integer literal.
pub const I32_LITERAL_MIN: i64 = -2_147_483_648;
/// Largest accepted integer literal. This is the unsigned 32-bit maximum, not
/// `i32::MAX`: `i32.const` accepts the same range and wraps it.
pub const I32_LITERAL_MAX: i64 = 4_294_967_295;

/// Deepest expression tree accepted by the parser and by lowering. Every
/// later phase recurses once per level.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Lower a `Script` node into the program's statement list.
pub fn lower_program<C: TreeCursor>(cursor: &mut C, source: &str) -> CompileResult<Vec<Stmt>> {
    if classify(cursor) != Some(SyntaxKind::Script) {
        return Err(error_here(
            cursor,
            source,
            ParseErrorKind::UnsupportedConstruct,
            format!("could not parse {} as a program", cursor.kind()),
        ));
    }
    if !cursor.goto_first_child() {
        return Ok(Vec::new());
    }
    let result = lower_statements(cursor, source);
    cursor.goto_parent();

    let statements = result?;
    trace!(count = statements.len(), "lowered statements");
    Ok(statements)
}

fn lower_statements<C: TreeCursor>(cursor: &mut C, source: &str) -> CompileResult<Vec<Stmt>> {
    let mut statements = Vec::new();
    loop {
        statements.push(lower_stmt(cursor, source)?);
        if !cursor.goto_next_sibling() {
            return Ok(statements);
        }
    }
}

pub(crate) fn classify<C: TreeCursor>(cursor: &C) -> Option<SyntaxKind> {
    SyntaxKind::from_tag(cursor.kind())
}

pub(crate) fn span_of<C: TreeCursor>(cursor: &C) -> Span {
    cursor.byte_range().into()
}

pub(crate) fn text_of<'s, C: TreeCursor>(cursor: &C, source: &'s str) -> &'s str {
    span_of(cursor).slice(source)
}

pub(crate) fn error_here<C: TreeCursor>(
    cursor: &C,
    source: &str,
    kind: ParseErrorKind,
    message: impl Into<String>,
) -> CompileError {
    make_parse_error(kind, span_of(cursor), source, message)
}

/// Run `f` with the cursor on the first child of the current node, then
/// return to the current node whatever `f` produced.
pub(crate) fn within_children<C, R>(
    cursor: &mut C,
    source: &str,
    f: impl FnOnce(&mut C) -> CompileResult<R>,
) -> CompileResult<R>
where
    C: TreeCursor,
{
    if !cursor.goto_first_child() {
        return Err(error_here(
            cursor,
            source,
            ParseErrorKind::UnsupportedConstruct,
            format!("{} has no children", cursor.kind()),
        ));
    }
    let result = f(cursor);
    cursor.goto_parent();
    result
}

/// Step to the next sibling, failing with `kind` if there is none.
pub(crate) fn advance<C: TreeCursor>(
    cursor: &mut C,
    source: &str,
    kind: ParseErrorKind,
    expected: &str,
) -> CompileResult<()> {
    if cursor.goto_next_sibling() {
        Ok(())
    } else {
        Err(error_here(
            cursor,
            source,
            kind,
            format!("expected {expected} after {}", cursor.kind()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse_tree;
    use crate::ir::ast::{BinOp, Builtin1, Builtin2, Expr};
    use std::ops::Range;

    /// Lower the expression of the first statement, like a caller that has
    /// walked the cursor down to it.
    fn expr(source: &str) -> CompileResult<Expr> {
        let tree = parse_tree(source).unwrap();
        let mut cursor = tree.cursor();
        assert!(cursor.goto_first_child()); // statement
        assert!(cursor.goto_first_child()); // expression
        lower_expr(&mut cursor, source)
    }

    fn parse_error_kind(result: CompileResult<Expr>) -> ParseErrorKind {
        match result {
            Err(CompileError::Parse { kind, .. }) => kind,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    // ── Literals ─────────────────────────────────────────────────────────

    #[test]
    fn number_literal() {
        assert_eq!(expr("987").unwrap(), Expr::Number(987));
    }

    #[test]
    fn negative_number_literal() {
        assert_eq!(expr("-987").unwrap(), Expr::Number(-987));
        assert_eq!(expr("+12").unwrap(), Expr::Number(12));
    }

    #[test]
    fn leading_zeros_round_trip() {
        assert_eq!(expr("007").unwrap(), Expr::Number(7));
    }

    #[test]
    fn integral_decimal_text_is_accepted() {
        assert_eq!(expr("3.0").unwrap(), Expr::Number(3));
        assert_eq!(expr("-2.0").unwrap(), Expr::Number(-2));
        assert_eq!(expr("1.0e0").unwrap(), Expr::Number(1));
        assert_eq!(expr("5.").unwrap(), Expr::Number(5));
    }

    #[test]
    fn fractional_and_non_decimal_literals_are_rejected() {
        for source in ["3.14", "-3.14", "1e3", "10e-1", "0x1f", "1_000", ".5"] {
            assert_eq!(
                parse_error_kind(expr(source)),
                ParseErrorKind::InvalidLiteral,
                "lowering {source}"
            );
        }
    }

    #[test]
    fn literal_bounds() {
        assert_eq!(expr("-2147483648").unwrap(), Expr::Number(I32_LITERAL_MIN));
        assert_eq!(expr("4294967295").unwrap(), Expr::Number(I32_LITERAL_MAX));
        assert_eq!(
            parse_error_kind(expr("-2147483649")),
            ParseErrorKind::LiteralOutOfRange
        );
        assert_eq!(
            parse_error_kind(expr("4294967296")),
            ParseErrorKind::LiteralOutOfRange
        );
        assert_eq!(
            parse_error_kind(expr("99999999999999999999999")),
            ParseErrorKind::LiteralOutOfRange
        );
    }

    #[test]
    fn unary_needs_a_literal_operand() {
        assert_eq!(parse_error_kind(expr("-x")), ParseErrorKind::InvalidUnary);
        assert_eq!(parse_error_kind(expr("--1")), ParseErrorKind::InvalidUnary);
    }

    // ── Operators and calls ──────────────────────────────────────────────

    #[test]
    fn binary_expression() {
        assert_eq!(
            expr("1 + 2").unwrap(),
            Expr::binary(BinOp::Add, Expr::Number(1), Expr::Number(2))
        );
    }

    #[test]
    fn operators() {
        let source = "x - y * z";
        let Expr::Binary { op, right, .. } = expr(source).unwrap() else {
            panic!("expected binary expression");
        };
        assert_eq!(op, BinOp::Sub);
        assert!(matches!(*right, Expr::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn unsupported_operator_is_rejected() {
        assert_eq!(parse_error_kind(expr("4 / 2")), ParseErrorKind::UnknownOperator);
        assert_eq!(parse_error_kind(expr("4 % 2")), ParseErrorKind::UnknownOperator);
    }

    #[test]
    fn identifier_keeps_its_span() {
        assert_eq!(expr("  x").unwrap(), Expr::id("x", Span::new(2, 3)));
    }

    #[test]
    fn builtin1_calls() {
        assert_eq!(
            expr("print(1)").unwrap(),
            Expr::builtin1(Builtin1::Print, Expr::Number(1))
        );
        assert_eq!(
            expr("abs(-1)").unwrap(),
            Expr::builtin1(Builtin1::Abs, Expr::Number(-1))
        );
    }

    #[test]
    fn builtin2_calls() {
        assert_eq!(
            expr("max(1, 2)").unwrap(),
            Expr::builtin2(Builtin2::Max, Expr::Number(1), Expr::Number(2))
        );
        assert_eq!(
            expr("pow(2, 1 + 1)").unwrap(),
            Expr::builtin2(
                Builtin2::Pow,
                Expr::Number(2),
                Expr::binary(BinOp::Add, Expr::Number(1), Expr::Number(1))
            )
        );
    }

    #[test]
    fn unknown_builtins_are_rejected() {
        assert_eq!(parse_error_kind(expr("invalid(1)")), ParseErrorKind::UnknownBuiltin);
        assert_eq!(parse_error_kind(expr("invalid(1, 2)")), ParseErrorKind::UnknownBuiltin);
    }

    #[test]
    fn argument_count_is_enforced() {
        let sources = [
            "print()",
            "print(1, 2)",
            "abs(1,)",
            "min(1)",
            "min(1,)",
            "max(1, 2, 3)",
            "max()",
        ];
        for source in sources {
            assert_eq!(
                parse_error_kind(expr(source)),
                ParseErrorKind::InvalidArguments,
                "lowering {source}"
            );
        }
    }

    #[test]
    fn trailing_comma_after_single_argument_is_rejected() {
        assert_eq!(parse_error_kind(expr("print(1,)")), ParseErrorKind::InvalidArguments);
    }

    #[test]
    fn parenthesized_expression_is_unsupported() {
        assert_eq!(
            parse_error_kind(expr("(1 + 2)")),
            ParseErrorKind::UnsupportedConstruct
        );
    }

    #[test]
    fn error_carries_span_and_text() {
        match expr("min(1,)") {
            Err(CompileError::Parse { span, text, line, col, .. }) => {
                assert_eq!(text, ")");
                assert_eq!(span, Span::new(6, 7));
                assert_eq!((line, col), (1, 7));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    // ── Cursor discipline ────────────────────────────────────────────────

    #[test]
    fn cursor_returns_to_entry_node() {
        for source in ["max(1, 2)", "min(1,)", "-x", "1 + 2 * 3", "4 / 2", "print(y)"] {
            let tree = parse_tree(source).unwrap();
            let mut cursor = tree.cursor();
            cursor.goto_first_child();
            cursor.goto_first_child();
            let before = (cursor.kind().to_string(), cursor.byte_range());
            let _ = lower_expr(&mut cursor, source);
            assert_eq!((cursor.kind().to_string(), cursor.byte_range()), before, "{source}");
        }
    }

    #[test]
    fn sibling_statements_lower_after_a_failure() {
        let source = "min(1,)\nprint(2)";
        let tree = parse_tree(source).unwrap();
        let mut cursor = tree.cursor();
        cursor.goto_first_child();
        assert!(lower_stmt(&mut cursor, source).is_err());
        assert!(cursor.goto_next_sibling());
        assert_eq!(
            lower_stmt(&mut cursor, source).unwrap(),
            Stmt::ExprStmt {
                expr: Expr::builtin1(Builtin1::Print, Expr::Number(2))
            }
        );
    }

    // ── Programs ─────────────────────────────────────────────────────────

    #[test]
    fn program_statements_in_order() {
        let source = "1 + 5\n3 * 4";
        let tree = parse_tree(source).unwrap();
        let program = lower_program(&mut tree.cursor(), source).unwrap();
        assert_eq!(
            program,
            vec![
                Stmt::ExprStmt {
                    expr: Expr::binary(BinOp::Add, Expr::Number(1), Expr::Number(5))
                },
                Stmt::ExprStmt {
                    expr: Expr::binary(BinOp::Mul, Expr::Number(3), Expr::Number(4))
                },
            ]
        );
    }

    #[test]
    fn assignment_becomes_define() {
        let source = "x = 3";
        let tree = parse_tree(source).unwrap();
        let mut cursor = tree.cursor();
        cursor.goto_first_child();
        assert_eq!(
            lower_stmt(&mut cursor, source).unwrap(),
            Stmt::Define {
                name: "x".to_string(),
                value: Expr::Number(3)
            }
        );
    }

    #[test]
    fn comment_only_script_is_empty() {
        let source = "# nothing here\n";
        let tree = parse_tree(source).unwrap();
        assert_eq!(lower_program(&mut tree.cursor(), source).unwrap(), vec![]);
    }

    // ── Foreign trees ────────────────────────────────────────────────────

    /// Hand-built tree standing in for some other parser's output.
    struct MockNode {
        kind: &'static str,
        range: Range<usize>,
        children: Vec<MockNode>,
    }

    fn leaf(kind: &'static str, range: Range<usize>) -> MockNode {
        MockNode {
            kind,
            range,
            children: Vec::new(),
        }
    }

    /// Cursor over a `MockNode` as a path of child indices from the root.
    struct MockCursor<'t> {
        root: &'t MockNode,
        path: Vec<usize>,
    }

    impl MockCursor<'_> {
        fn node(&self) -> &MockNode {
            self.path
                .iter()
                .fold(self.root, |node, &i| &node.children[i])
        }
    }

    impl TreeCursor for MockCursor<'_> {
        fn kind(&self) -> &str {
            self.node().kind
        }

        fn byte_range(&self) -> Range<usize> {
            self.node().range.clone()
        }

        fn goto_first_child(&mut self) -> bool {
            if self.node().children.is_empty() {
                return false;
            }
            self.path.push(0);
            true
        }

        fn goto_next_sibling(&mut self) -> bool {
            let Some(&last) = self.path.last() else {
                return false;
            };
            self.path.pop();
            let has_next = last + 1 < self.node().children.len();
            self.path.push(if has_next { last + 1 } else { last });
            has_next
        }

        fn goto_parent(&mut self) -> bool {
            self.path.pop().is_some()
        }
    }

    #[test]
    fn lowers_any_conforming_cursor() {
        let source = "y = x";
        let root = MockNode {
            kind: "Script",
            range: 0..5,
            children: vec![MockNode {
                kind: "AssignStatement",
                range: 0..5,
                children: vec![
                    leaf("VariableName", 0..1),
                    leaf("AssignOp", 2..3),
                    leaf("VariableName", 4..5),
                ],
            }],
        };
        let mut cursor = MockCursor {
            root: &root,
            path: Vec::new(),
        };
        assert_eq!(
            lower_program(&mut cursor, source).unwrap(),
            vec![Stmt::Define {
                name: "y".to_string(),
                value: Expr::id("x", Span::new(4, 5))
            }]
        );
        assert!(cursor.path.is_empty());
    }

    #[test]
    fn unknown_statement_kind_is_rejected() {
        let source = "if x: y";
        let root = MockNode {
            kind: "Script",
            range: 0..7,
            children: vec![MockNode {
                kind: "IfStatement",
                range: 0..7,
                children: vec![leaf("if", 0..2)],
            }],
        };
        let mut cursor = MockCursor {
            root: &root,
            path: Vec::new(),
        };
        match lower_program(&mut cursor, source) {
            Err(CompileError::Parse { kind, message, text, .. }) => {
                assert_eq!(kind, ParseErrorKind::UnsupportedConstruct);
                assert!(message.contains("IfStatement"), "{message}");
                assert_eq!(text, "if x: y");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
        assert!(cursor.path.is_empty());
    }

    #[test]
    fn deep_foreign_tree_is_rejected_before_recursing() {
        let source = "1+1";
        let mut node = leaf("Number", 0..1);
        for _ in 0..MAX_NESTING_DEPTH + 10 {
            node = MockNode {
                kind: "BinaryExpression",
                range: 0..3,
                children: vec![node, leaf("ArithOp", 1..2), leaf("Number", 2..3)],
            };
        }
        let mut cursor = MockCursor {
            root: &node,
            path: Vec::new(),
        };
        assert_eq!(
            parse_error_kind(lower_expr(&mut cursor, source)),
            ParseErrorKind::NestingTooDeep
        );
        assert!(cursor.path.is_empty());
    }

    #[test]
    fn non_script_root_is_rejected() {
        let source = "1";
        let root = leaf("Number", 0..1);
        let mut cursor = MockCursor {
            root: &root,
            path: Vec::new(),
        };
        assert!(matches!(
            lower_program(&mut cursor, source),
            Err(CompileError::Parse {
                kind: ParseErrorKind::UnsupportedConstruct,
                ..
            })
        ));
    }
}
