use crate::{CompileError, ParseErrorKind, Span};

/// Helper to create parse errors with line/col resolved from the span start
pub fn make_parse_error(
    kind: ParseErrorKind,
    span: Span,
    source: &str,
    message: impl Into<String>,
) -> CompileError {
    let (line, col) = position_to_line_col(source, span.start);
    CompileError::Parse {
        kind,
        span,
        line,
        col,
        text: span.slice(source).to_string(),
        message: message.into(),
    }
}

pub fn make_reference_error(name: &str, span: Span) -> CompileError {
    CompileError::Reference {
        name: name.to_string(),
        span,
    }
}

/// Convert a byte position to line and column numbers (1-based)
pub fn position_to_line_col(source: &str, position: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;

    for (i, ch) in source.char_indices() {
        if i >= position {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Get context around an error position (the line containing the error)
pub fn get_error_context(source: &str, position: usize) -> String {
    let position = position.min(source.len());
    let line_start = source
        .get(..position)
        .and_then(|head| head.rfind('\n'))
        .map(|pos| pos + 1)
        .unwrap_or(0);

    let line_end = source
        .get(position..)
        .and_then(|tail| tail.find('\n'))
        .map(|pos| position + pos)
        .unwrap_or(source.len());

    source
        .get(line_start..line_end)
        .unwrap_or("")
        .trim()
        .to_string()
}
