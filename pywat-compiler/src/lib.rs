pub mod backend;
pub mod cursor;
pub mod frontend;
pub mod ir;

pub use backend::codegen;
pub use backend::{CompiledProgram, Instr, LocalDecl, ModuleOptions, Slot};
pub use cursor::TreeCursor;
pub use ir::{ast, check, lower};

use std::fmt;
use std::ops::Range;
use thiserror::Error;
use tracing::{debug, trace};

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Lexical error: {0}")]
    Lexical(#[from] frontend::lexer::LexicalError),

    #[error("ParseError:{kind} ({line}:{col}) - {message} at {span}: '{text}'")]
    Parse {
        kind: ParseErrorKind,
        span: Span,
        line: usize,
        col: usize,
        text: String,
        message: String,
    },

    #[error("ReferenceError: undefined variable '{name}' at {span}")]
    Reference { name: String, span: Span },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The concrete parser could not build a tree for the text.
    Syntax,
    /// A numeric literal that is not a plain decimal integer.
    InvalidLiteral,
    LiteralOutOfRange,
    InvalidUnary,
    UnknownOperator,
    UnknownBuiltin,
    InvalidArguments,
    /// A concrete node kind outside the supported subset.
    UnsupportedConstruct,
    /// Expressions nested deeper than `lower::MAX_NESTING_DEPTH`.
    NestingTooDeep,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::Syntax => write!(f, "Syntax"),
            ParseErrorKind::InvalidLiteral => write!(f, "InvalidLiteral"),
            ParseErrorKind::LiteralOutOfRange => write!(f, "LiteralOutOfRange"),
            ParseErrorKind::InvalidUnary => write!(f, "InvalidUnary"),
            ParseErrorKind::UnknownOperator => write!(f, "UnknownOperator"),
            ParseErrorKind::UnknownBuiltin => write!(f, "UnknownBuiltin"),
            ParseErrorKind::InvalidArguments => write!(f, "InvalidArguments"),
            ParseErrorKind::UnsupportedConstruct => write!(f, "UnsupportedConstruct"),
            ParseErrorKind::NestingTooDeep => write!(f, "NestingTooDeep"),
        }
    }
}

/// Half-open byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The source text covered by this span, or `""` if it does not fall on
    /// character boundaries of `source`.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Parse source text into the AST. Whitespace-only input yields an empty
/// program without consulting the concrete parser.
pub fn parse(source: &str) -> CompileResult<Vec<ast::Stmt>> {
    if source.trim().is_empty() {
        return Ok(Vec::new());
    }
    let tree = frontend::parse_tree(source)?;
    let mut cursor = tree.cursor();
    lower::lower_program(&mut cursor, source)
}

pub fn compile(source: &str) -> CompileResult<CompiledProgram> {
    let program = parse(source)?;
    debug!(statements = program.len(), "lowered program");

    check::check_defined(&program)?;

    let compiled = codegen::generate(&program);
    debug!(
        locals = compiled.locals.len(),
        instructions = compiled.instrs.len(),
        "generated code"
    );
    trace!("generated:\n{}", compiled.wat_source());
    Ok(compiled)
}

/// Compile source text to the WAT function body: slot declarations followed
/// by instructions, one per line.
pub fn compile_to_wat(source: &str) -> CompileResult<String> {
    Ok(compile(source)?.wat_source())
}
