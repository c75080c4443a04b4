//! Recursive-descent parser building a [`SyntaxTree`].
//!
//! Statements are separated by newlines or `;`. Newlines inside parentheses
//! are dropped before parsing so calls can span lines, as in Python.
//!
//! ```text
//! script     := sep* (stmt (sep+ stmt)*)? sep*
//! stmt       := NAME '=' expr | expr
//! expr       := term (('+' | '-') term)*
//! term       := factor (('*' | '/' | '//' | '%') factor)*
//! factor     := ('+' | '-') factor | postfix
//! postfix    := atom arglist*
//! atom       := NUMBER | NAME | '(' expr ')'
//! arglist    := '(' (expr (',' expr)* ','?)? ')'
//! ```

use super::cst::{NodeId, SyntaxKind, SyntaxTree, TreeBuilder};
use super::lexer::{self, Token};
use crate::ir::error_utils::make_parse_error;
use crate::ir::lower::MAX_NESTING_DEPTH;
use crate::{CompileError, CompileResult, ParseErrorKind, Span};

#[derive(Debug, Clone, Copy)]
struct Lexeme {
    token: Token,
    span: Span,
}

pub fn parse_tree(source: &str) -> CompileResult<SyntaxTree> {
    let tokens = significant_tokens(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        depth: 0,
        builder: TreeBuilder::new(),
    };
    let root = parser.script()?;
    Ok(parser.builder.finish(root))
}

fn significant_tokens(source: &str) -> CompileResult<Vec<Lexeme>> {
    let mut depth = 0usize;
    let mut out = Vec::new();
    for item in lexer::lex_adapter(source) {
        let (start, token, end) = item?;
        match token {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            Token::Newline if depth > 0 => continue,
            _ => {}
        }
        out.push(Lexeme {
            token,
            span: Span::new(start, end),
        });
    }
    Ok(out)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Lexeme>,
    pos: usize,
    /// Active `nested` calls.
    depth: usize,
    builder: TreeBuilder,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<Token> {
        self.tokens.get(self.pos + n).map(|l| l.token)
    }

    /// Turn the current token into a leaf of the given kind.
    fn bump(&mut self, kind: SyntaxKind) -> NodeId {
        let span = self.tokens[self.pos].span;
        self.pos += 1;
        self.builder.push(kind, span, Vec::new())
    }

    fn expect(&mut self, token: Token, kind: SyntaxKind) -> CompileResult<NodeId> {
        if self.peek() == Some(token) {
            Ok(self.bump(kind))
        } else {
            Err(self.error(format!("expected {token}, found {}", self.describe_current())))
        }
    }

    /// Build an interior node, rejecting expression trees taller than
    /// `MAX_NESTING_DEPTH`. Statements and the script sit above that limit.
    fn node(&mut self, kind: SyntaxKind, children: Vec<NodeId>) -> CompileResult<NodeId> {
        let id = self.builder.push_spanning(kind, children);
        let is_statement =
            matches!(kind, SyntaxKind::AssignStatement | SyntaxKind::ExpressionStatement);
        if !is_statement && self.builder.height(id) > MAX_NESTING_DEPTH {
            return Err(self.too_deep(self.builder.span(id)));
        }
        Ok(id)
    }

    /// Run a recursive grammar rule one nesting level deeper.
    fn nested(&mut self, rule: fn(&mut Self) -> CompileResult<NodeId>) -> CompileResult<NodeId> {
        if self.depth >= MAX_NESTING_DEPTH {
            let span = self.current_span();
            return Err(self.too_deep(span));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn too_deep(&self, span: Span) -> CompileError {
        make_parse_error(
            ParseErrorKind::NestingTooDeep,
            span,
            self.source,
            format!("expression nested more than {MAX_NESTING_DEPTH} levels deep"),
        )
    }

    fn is_separator(&self) -> bool {
        matches!(self.peek(), Some(Token::Newline | Token::Semicolon))
    }

    fn skip_separators(&mut self) {
        while self.is_separator() {
            self.pos += 1;
        }
    }

    fn describe_current(&self) -> String {
        match self.tokens.get(self.pos) {
            Some(Lexeme {
                token: Token::Newline,
                ..
            }) => "end of line".to_string(),
            Some(lexeme) => format!("'{}'", lexeme.span.slice(self.source)),
            None => "end of input".to_string(),
        }
    }

    fn current_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some(lexeme) => lexeme.span,
            None => Span::new(self.source.len(), self.source.len()),
        }
    }

    fn error(&self, message: String) -> CompileError {
        make_parse_error(ParseErrorKind::Syntax, self.current_span(), self.source, message)
    }

    fn script(&mut self) -> CompileResult<NodeId> {
        let mut statements = Vec::new();
        self.skip_separators();
        while self.peek().is_some() {
            statements.push(self.statement()?);
            if self.peek().is_some() && !self.is_separator() {
                return Err(self.error(format!(
                    "unexpected {} after statement",
                    self.describe_current()
                )));
            }
            self.skip_separators();
        }
        let span = Span::new(0, self.source.len());
        Ok(self.builder.push(SyntaxKind::Script, span, statements))
    }

    fn statement(&mut self) -> CompileResult<NodeId> {
        if self.peek() == Some(Token::Name) && self.peek_nth(1) == Some(Token::Assign) {
            let name = self.bump(SyntaxKind::VariableName);
            let eq = self.bump(SyntaxKind::AssignOp);
            let value = self.expression()?;
            return self.node(SyntaxKind::AssignStatement, vec![name, eq, value]);
        }
        let expr = self.expression()?;
        self.node(SyntaxKind::ExpressionStatement, vec![expr])
    }

    fn expression(&mut self) -> CompileResult<NodeId> {
        self.nested(Self::sum)
    }

    fn sum(&mut self) -> CompileResult<NodeId> {
        let mut lhs = self.term()?;
        while matches!(self.peek(), Some(Token::Plus | Token::Minus)) {
            let op = self.bump(SyntaxKind::ArithOp);
            let rhs = self.term()?;
            lhs = self.node(SyntaxKind::BinaryExpression, vec![lhs, op, rhs])?;
        }
        Ok(lhs)
    }

    fn term(&mut self) -> CompileResult<NodeId> {
        let mut lhs = self.factor()?;
        while matches!(
            self.peek(),
            Some(Token::Star | Token::Slash | Token::DoubleSlash | Token::Percent)
        ) {
            let op = self.bump(SyntaxKind::ArithOp);
            let rhs = self.factor()?;
            lhs = self.node(SyntaxKind::BinaryExpression, vec![lhs, op, rhs])?;
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> CompileResult<NodeId> {
        if matches!(self.peek(), Some(Token::Plus | Token::Minus)) {
            let op = self.bump(SyntaxKind::ArithOp);
            let operand = self.nested(Self::factor)?;
            return self.node(SyntaxKind::UnaryExpression, vec![op, operand]);
        }
        self.postfix()
    }

    fn postfix(&mut self) -> CompileResult<NodeId> {
        let mut callee = self.atom()?;
        while self.peek() == Some(Token::LParen) {
            let args = self.arg_list()?;
            callee = self.node(SyntaxKind::CallExpression, vec![callee, args])?;
        }
        Ok(callee)
    }

    fn atom(&mut self) -> CompileResult<NodeId> {
        match self.peek() {
            Some(Token::Number) => Ok(self.bump(SyntaxKind::Number)),
            Some(Token::Name) => Ok(self.bump(SyntaxKind::VariableName)),
            Some(Token::LParen) => {
                let open = self.bump(SyntaxKind::OpenParen);
                let inner = self.expression()?;
                let close = self.expect(Token::RParen, SyntaxKind::CloseParen)?;
                self.node(SyntaxKind::ParenthesizedExpression, vec![open, inner, close])
            }
            _ => Err(self.error(format!(
                "expected expression, found {}",
                self.describe_current()
            ))),
        }
    }

    fn arg_list(&mut self) -> CompileResult<NodeId> {
        let mut children = vec![self.bump(SyntaxKind::OpenParen)];
        while self.peek() != Some(Token::RParen) {
            children.push(self.expression()?);
            if self.peek() != Some(Token::Comma) {
                break;
            }
            children.push(self.bump(SyntaxKind::Comma));
        }
        children.push(self.expect(Token::RParen, SyntaxKind::CloseParen)?);
        self.node(SyntaxKind::ArgList, children)
    }
}
