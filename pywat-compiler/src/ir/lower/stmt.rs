use super::{advance, classify, error_here, lower_expr, text_of, within_children};
use crate::cursor::TreeCursor;
use crate::frontend::SyntaxKind;
use crate::ir::ast::Stmt;
use crate::{CompileResult, ParseErrorKind};

pub fn lower_stmt<C: TreeCursor>(cursor: &mut C, source: &str) -> CompileResult<Stmt> {
    match classify(cursor) {
        Some(SyntaxKind::AssignStatement) => within_children(cursor, source, |c| {
            if classify(c) != Some(SyntaxKind::VariableName) {
                return Err(error_here(
                    c,
                    source,
                    ParseErrorKind::UnsupportedConstruct,
                    format!("cannot assign to {}", c.kind()),
                ));
            }
            let name = text_of(c, source).to_string();
            // The `=` token is skipped by position, not inspected.
            advance(c, source, ParseErrorKind::UnsupportedConstruct, "'='")?;
            advance(c, source, ParseErrorKind::UnsupportedConstruct, "assigned value")?;
            let value = lower_expr(c, source)?;
            Ok(Stmt::Define { name, value })
        }),
        Some(SyntaxKind::ExpressionStatement) => within_children(cursor, source, |c| {
            let expr = lower_expr(c, source)?;
            Ok(Stmt::ExprStmt { expr })
        }),
        _ => Err(error_here(
            cursor,
            source,
            ParseErrorKind::UnsupportedConstruct,
            format!("could not parse {} as a statement", cursor.kind()),
        )),
    }
}
