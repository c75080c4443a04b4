use crate::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `name = value`
    Define { name: String, value: Expr },
    /// Expression evaluated for its effect; the result is discarded.
    ExprStmt { expr: Expr },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Integer literal, already range-checked by lowering.
    Number(i64),
    /// Variable reference. `span` locates the reference in the source.
    Id { name: String, span: Span },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Builtin1 { name: Builtin1, arg: Box<Expr> },
    Builtin2 {
        name: Builtin2,
        arg1: Box<Expr>,
        arg2: Box<Expr>,
    },
}

impl Expr {
    pub fn id(name: impl Into<String>, span: Span) -> Self {
        Expr::Id {
            name: name.into(),
            span,
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn builtin1(name: Builtin1, arg: Expr) -> Self {
        Expr::Builtin1 {
            name,
            arg: Box::new(arg),
        }
    }

    pub fn builtin2(name: Builtin2, arg1: Expr, arg2: Expr) -> Self {
        Expr::Builtin2 {
            name,
            arg1: Box::new(arg1),
            arg2: Box::new(arg2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
}

/// Builtins called with exactly one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin1 {
    Print,
    Abs,
}

impl Builtin1 {
    pub const ALL: [Builtin1; 2] = [Builtin1::Print, Builtin1::Abs];

    pub fn name(self) -> &'static str {
        match self {
            Builtin1::Print => "print",
            Builtin1::Abs => "abs",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}

/// Builtins called with exactly two arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin2 {
    Min,
    Max,
    Pow,
}

impl Builtin2 {
    pub const ALL: [Builtin2; 3] = [Builtin2::Min, Builtin2::Max, Builtin2::Pow];

    pub fn name(self) -> &'static str {
        match self {
            Builtin2::Min => "min",
            Builtin2::Max => "max",
            Builtin2::Pow => "pow",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}
