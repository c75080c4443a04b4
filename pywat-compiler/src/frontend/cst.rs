//! Arena-backed concrete syntax tree and its cursor.

use crate::Span;
use crate::cursor::TreeCursor;
use std::ops::Range;

/// Node kinds produced by the bundled parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Script,
    AssignStatement,
    ExpressionStatement,
    BinaryExpression,
    UnaryExpression,
    CallExpression,
    ArgList,
    ParenthesizedExpression,
    Number,
    VariableName,
    ArithOp,
    AssignOp,
    OpenParen,
    CloseParen,
    Comma,
}

impl SyntaxKind {
    pub const ALL: [SyntaxKind; 15] = [
        SyntaxKind::Script,
        SyntaxKind::AssignStatement,
        SyntaxKind::ExpressionStatement,
        SyntaxKind::BinaryExpression,
        SyntaxKind::UnaryExpression,
        SyntaxKind::CallExpression,
        SyntaxKind::ArgList,
        SyntaxKind::ParenthesizedExpression,
        SyntaxKind::Number,
        SyntaxKind::VariableName,
        SyntaxKind::ArithOp,
        SyntaxKind::AssignOp,
        SyntaxKind::OpenParen,
        SyntaxKind::CloseParen,
        SyntaxKind::Comma,
    ];

    /// The textual tag a cursor reports for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            SyntaxKind::Script => "Script",
            SyntaxKind::AssignStatement => "AssignStatement",
            SyntaxKind::ExpressionStatement => "ExpressionStatement",
            SyntaxKind::BinaryExpression => "BinaryExpression",
            SyntaxKind::UnaryExpression => "UnaryExpression",
            SyntaxKind::CallExpression => "CallExpression",
            SyntaxKind::ArgList => "ArgList",
            SyntaxKind::ParenthesizedExpression => "ParenthesizedExpression",
            SyntaxKind::Number => "Number",
            SyntaxKind::VariableName => "VariableName",
            SyntaxKind::ArithOp => "ArithOp",
            SyntaxKind::AssignOp => "AssignOp",
            SyntaxKind::OpenParen => "(",
            SyntaxKind::CloseParen => ")",
            SyntaxKind::Comma => ",",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Punctuation kinds, whose tag is the token text itself.
    pub fn is_punctuation(self) -> bool {
        matches!(
            self,
            SyntaxKind::OpenParen | SyntaxKind::CloseParen | SyntaxKind::Comma
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub span: Span,
    parent: Option<NodeId>,
    index_in_parent: usize,
    children: Vec<NodeId>,
    /// Levels in the subtree rooted here; a leaf has height 1.
    height: usize,
}

impl SyntaxNode {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Bottom-up builder: children are pushed before the node that owns them.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    nodes: Vec<SyntaxNode>,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub(crate) fn push(&mut self, kind: SyntaxKind, span: Span, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut height = 1;
        for (index, child) in children.iter().enumerate() {
            let node = &mut self.nodes[child.0];
            node.parent = Some(id);
            node.index_in_parent = index;
            height = height.max(node.height + 1);
        }
        self.nodes.push(SyntaxNode {
            kind,
            span,
            parent: None,
            index_in_parent: 0,
            children,
            height,
        });
        id
    }

    pub(crate) fn height(&self, id: NodeId) -> usize {
        self.nodes[id.0].height
    }

    pub(crate) fn span(&self, id: NodeId) -> Span {
        self.nodes[id.0].span
    }

    /// Push an interior node whose span covers all of its children.
    pub(crate) fn push_spanning(&mut self, kind: SyntaxKind, children: Vec<NodeId>) -> NodeId {
        let start = children.first().map(|c| self.nodes[c.0].span.start).unwrap_or(0);
        let end = children.last().map(|c| self.nodes[c.0].span.end).unwrap_or(start);
        self.push(kind, Span::new(start, end), children)
    }

    pub(crate) fn finish(self, root: NodeId) -> SyntaxTree {
        SyntaxTree {
            nodes: self.nodes,
            root,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.0]
    }

    /// A cursor positioned on the root node.
    pub fn cursor(&self) -> SyntaxCursor<'_> {
        SyntaxCursor {
            tree: self,
            current: self.root,
        }
    }

    /// Compact rendering of the tree shape, e.g.
    /// `Script(ExpressionStatement(CallExpression(VariableName,ArgList("(",Number,")"))))`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(self.root, &mut out);
        out
    }

    fn render_node(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        if node.kind.is_punctuation() {
            out.push('"');
            out.push_str(node.kind.as_str());
            out.push('"');
        } else {
            out.push_str(node.kind.as_str());
        }
        if node.children.is_empty() {
            return;
        }
        out.push('(');
        for (i, &child) in node.children.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.render_node(child, out);
        }
        out.push(')');
    }
}

#[derive(Debug, Clone)]
pub struct SyntaxCursor<'t> {
    tree: &'t SyntaxTree,
    current: NodeId,
}

impl<'t> SyntaxCursor<'t> {
    pub fn node(&self) -> &'t SyntaxNode {
        self.tree.node(self.current)
    }
}

impl TreeCursor for SyntaxCursor<'_> {
    fn kind(&self) -> &str {
        self.node().kind.as_str()
    }

    fn byte_range(&self) -> Range<usize> {
        let span = self.node().span;
        span.start..span.end
    }

    fn goto_first_child(&mut self) -> bool {
        match self.node().children.first() {
            Some(&first) => {
                self.current = first;
                true
            }
            None => false,
        }
    }

    fn goto_next_sibling(&mut self) -> bool {
        let node = self.node();
        let Some(parent) = node.parent else {
            return false;
        };
        match self.tree.node(parent).children.get(node.index_in_parent + 1) {
            Some(&next) => {
                self.current = next;
                true
            }
            None => false,
        }
    }

    fn goto_parent(&mut self) -> bool {
        match self.node().parent {
            Some(parent) => {
                self.current = parent;
                true
            }
            None => false,
        }
    }
}
