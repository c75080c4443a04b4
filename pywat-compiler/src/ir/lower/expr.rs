use super::{
    advance, classify, error_here, span_of, text_of, within_children, I32_LITERAL_MAX,
    I32_LITERAL_MIN, MAX_NESTING_DEPTH,
};
use crate::cursor::TreeCursor;
use crate::frontend::SyntaxKind;
use crate::ir::ast::{BinOp, Builtin1, Builtin2, Expr};
use crate::ir::error_utils::make_parse_error;
use crate::{CompileError, CompileResult, ParseErrorKind, Span};

pub fn lower_expr<C: TreeCursor>(cursor: &mut C, source: &str) -> CompileResult<Expr> {
    lower_expr_at(cursor, source, 1)
}

fn lower_expr_at<C: TreeCursor>(cursor: &mut C, source: &str, depth: usize) -> CompileResult<Expr> {
    if depth > MAX_NESTING_DEPTH {
        return Err(error_here(
            cursor,
            source,
            ParseErrorKind::NestingTooDeep,
            format!("expression nested more than {MAX_NESTING_DEPTH} levels deep"),
        ));
    }
    match classify(cursor) {
        Some(SyntaxKind::Number) => {
            let value = parse_i32_literal(text_of(cursor, source), span_of(cursor), source)?;
            Ok(Expr::Number(value))
        }
        Some(SyntaxKind::UnaryExpression) => lower_signed_literal(cursor, source),
        Some(SyntaxKind::VariableName) => Ok(Expr::id(text_of(cursor, source), span_of(cursor))),
        Some(SyntaxKind::BinaryExpression) => lower_binary(cursor, source, depth),
        Some(SyntaxKind::CallExpression) => lower_call(cursor, source, depth),
        _ => Err(error_here(
            cursor,
            source,
            ParseErrorKind::UnsupportedConstruct,
            format!("could not parse {} as an expression", cursor.kind()),
        )),
    }
}

/// Lower the operator token of a binary expression.
pub fn lower_op<C: TreeCursor>(cursor: &mut C, source: &str) -> CompileResult<BinOp> {
    if classify(cursor) != Some(SyntaxKind::ArithOp) {
        return Err(error_here(
            cursor,
            source,
            ParseErrorKind::UnknownOperator,
            format!("could not parse {} as a binary operator", cursor.kind()),
        ));
    }
    match text_of(cursor, source) {
        "+" => Ok(BinOp::Add),
        "-" => Ok(BinOp::Sub),
        "*" => Ok(BinOp::Mul),
        other => Err(error_here(
            cursor,
            source,
            ParseErrorKind::UnknownOperator,
            format!("unsupported arithmetic operator '{other}'"),
        )),
    }
}

/// Accepts an optionally signed number whose value equals the integer read
/// from its leading decimal digits, so `3.0` is `3` while `3.14`, `1e3` and
/// `0x1f` are rejected. The value must lie in
/// `I32_LITERAL_MIN..=I32_LITERAL_MAX`.
fn parse_i32_literal(text: &str, span: Span, source: &str) -> CompileResult<i64> {
    let invalid = || {
        make_parse_error(
            ParseErrorKind::InvalidLiteral,
            span,
            source,
            format!("could not parse '{text}' as i32"),
        )
    };
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let prefix_len = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if prefix_len == 0 {
        return Err(invalid());
    }
    let value: f64 = unsigned.parse().map_err(|_| invalid())?;
    let integral: f64 = unsigned[..prefix_len].parse().map_err(|_| invalid())?;
    if value != integral {
        return Err(invalid());
    }

    let value = if negative { -value } else { value };
    if value < I32_LITERAL_MIN as f64 || value > I32_LITERAL_MAX as f64 {
        return Err(make_parse_error(
            ParseErrorKind::LiteralOutOfRange,
            span,
            source,
            format!("'{text}' is out of range for i32"),
        ));
    }
    // Integral and in range, so the conversion is exact.
    Ok(value as i64)
}

/// `UnaryExpression(ArithOp, Number)` with a `+` or `-` sign.
fn lower_signed_literal<C: TreeCursor>(cursor: &mut C, source: &str) -> CompileResult<Expr> {
    let span = span_of(cursor);
    let literal = within_children(cursor, source, |c| {
        let sign = text_of(c, source);
        if classify(c) != Some(SyntaxKind::ArithOp) || !(sign == "+" || sign == "-") {
            return Err(error_here(
                c,
                source,
                ParseErrorKind::InvalidUnary,
                format!("could not parse '{sign}' as the sign of an i32 literal"),
            ));
        }
        advance(c, source, ParseErrorKind::InvalidUnary, "operand")?;
        if classify(c) != Some(SyntaxKind::Number) {
            return Err(error_here(
                c,
                source,
                ParseErrorKind::InvalidUnary,
                "a sign can only be applied to an integer literal",
            ));
        }
        Ok(format!("{sign}{}", text_of(c, source)))
    })?;
    parse_i32_literal(&literal, span, source).map(Expr::Number)
}

fn lower_binary<C: TreeCursor>(cursor: &mut C, source: &str, depth: usize) -> CompileResult<Expr> {
    within_children(cursor, source, |c| {
        let left = lower_expr_at(c, source, depth + 1)?;
        advance(c, source, ParseErrorKind::UnsupportedConstruct, "operator")?;
        let op = lower_op(c, source)?;
        advance(c, source, ParseErrorKind::UnsupportedConstruct, "right operand")?;
        let right = lower_expr_at(c, source, depth + 1)?;
        Ok(Expr::binary(op, left, right))
    })
}

/// `CallExpression(callee, ArgList)`. The callee name picks the arity.
fn lower_call<C: TreeCursor>(cursor: &mut C, source: &str, depth: usize) -> CompileResult<Expr> {
    within_children(cursor, source, |c| {
        let callee = text_of(c, source);
        if let Some(name) = Builtin1::from_name(callee) {
            advance(c, source, ParseErrorKind::InvalidArguments, "argument list")?;
            let arg = within_arg_list(c, source, callee, |c| {
                let arg = first_argument(c, source, callee, depth)?;
                close_arguments(c, source, callee)?;
                Ok(arg)
            })?;
            Ok(Expr::builtin1(name, arg))
        } else if let Some(name) = Builtin2::from_name(callee) {
            advance(c, source, ParseErrorKind::InvalidArguments, "argument list")?;
            let (arg1, arg2) = within_arg_list(c, source, callee, |c| {
                let arg1 = first_argument(c, source, callee, depth)?;
                let arg2 = next_argument(c, source, callee, depth)?;
                close_arguments(c, source, callee)?;
                Ok((arg1, arg2))
            })?;
            Ok(Expr::builtin2(name, arg1, arg2))
        } else {
            Err(error_here(
                c,
                source,
                ParseErrorKind::UnknownBuiltin,
                format!("unknown builtin '{callee}'"),
            ))
        }
    })
}

/// Enter an `ArgList` and check that it opens with `(`.
fn within_arg_list<C, R>(
    cursor: &mut C,
    source: &str,
    callee: &str,
    f: impl FnOnce(&mut C) -> CompileResult<R>,
) -> CompileResult<R>
where
    C: TreeCursor,
{
    if classify(cursor) != Some(SyntaxKind::ArgList) {
        return Err(error_here(
            cursor,
            source,
            ParseErrorKind::InvalidArguments,
            format!("expected an argument list for {callee}"),
        ));
    }
    within_children(cursor, source, |c| {
        if classify(c) != Some(SyntaxKind::OpenParen) {
            return Err(error_here(
                c,
                source,
                ParseErrorKind::InvalidArguments,
                format!("expected '(' after {callee}"),
            ));
        }
        f(c)
    })
}

fn missing_argument<C: TreeCursor>(cursor: &C, source: &str, callee: &str) -> CompileError {
    error_here(
        cursor,
        source,
        ParseErrorKind::InvalidArguments,
        format!("missing argument to {callee}"),
    )
}

fn is_argument<C: TreeCursor>(cursor: &C) -> bool {
    !matches!(
        classify(cursor),
        Some(SyntaxKind::OpenParen | SyntaxKind::CloseParen | SyntaxKind::Comma)
    )
}

/// From the `(`, step to and lower the first argument.
fn first_argument<C: TreeCursor>(
    cursor: &mut C,
    source: &str,
    callee: &str,
    depth: usize,
) -> CompileResult<Expr> {
    if !cursor.goto_next_sibling() || !is_argument(cursor) {
        return Err(missing_argument(cursor, source, callee));
    }
    lower_expr_at(cursor, source, depth + 1)
}

/// From an argument, skip exactly one `,` and lower the argument after it.
fn next_argument<C: TreeCursor>(
    cursor: &mut C,
    source: &str,
    callee: &str,
    depth: usize,
) -> CompileResult<Expr> {
    if !cursor.goto_next_sibling() || classify(cursor) != Some(SyntaxKind::Comma) {
        return Err(error_here(
            cursor,
            source,
            ParseErrorKind::InvalidArguments,
            format!("expected ',' between arguments to {callee}"),
        ));
    }
    if !cursor.goto_next_sibling() || !is_argument(cursor) {
        return Err(missing_argument(cursor, source, callee));
    }
    lower_expr_at(cursor, source, depth + 1)
}

/// The token right after the last argument must be `)`.
fn close_arguments<C: TreeCursor>(
    cursor: &mut C,
    source: &str,
    callee: &str,
) -> CompileResult<()> {
    if cursor.goto_next_sibling() && classify(cursor) == Some(SyntaxKind::CloseParen) {
        Ok(())
    } else {
        Err(error_here(
            cursor,
            source,
            ParseErrorKind::InvalidArguments,
            format!("invalid arguments to {callee}"),
        ))
    }
}
