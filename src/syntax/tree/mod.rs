//! Lossless concrete syntax tree for pre-0.7 Elvish scripts.
//!
//! Every byte of the source belongs to exactly one leaf, so concatenating
//! the leaves of any node in order reproduces that node's source text.
//! Keywords, punctuation and whitespace are kept as `Sep` leaves.

mod display;

use crate::span::Span;

/// A node in the syntax tree with the span of the area it covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// The structural slot this node occupies in its parent.
    pub role: Role,
    pub span: Span,
    pub children: Vec<Node>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A sequence of pipelines and separators: the program root, and every
    /// body or condition of a control construct.
    Chunk,
    Pipeline,
    /// A single command invocation, a control construct, or a set of
    /// variable assignments.
    Form,
    /// `lhs=rhs`
    Assignment,
    Control(ControlKind),
    /// `>file`, `2>&1`, ...
    Redir,
    /// `&key=value`, both as a command option and inside a map literal.
    MapPair,
    /// Whitespace-separated compounds: list bodies, indices, `for` lists.
    Array,
    /// Adjacent indexings without whitespace between them, e.g. `a$b'c'`.
    Compound,
    Indexing,
    Primary(PrimaryKind),
    /// Keywords, punctuation, whitespace, newlines and comments.
    Sep,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlKind {
    If,
    While,
    For,
    Try,
}

impl ControlKind {
    pub fn from_leader(word: &str) -> Option<ControlKind> {
        match word {
            "if" => Some(ControlKind::If),
            "while" => Some(ControlKind::While),
            "for" => Some(ControlKind::For),
            "try" => Some(ControlKind::Try),
            _ => None,
        }
    }

    pub fn leader(self) -> &'static str {
        match self {
            ControlKind::If => "if",
            ControlKind::While => "while",
            ControlKind::For => "for",
            ControlKind::Try => "try",
        }
    }

    /// The keyword that closes this construct in the old grammar.
    pub fn terminator(self) -> &'static str {
        match self {
            ControlKind::If => "fi",
            ControlKind::While | ControlKind::For => "done",
            ControlKind::Try => "tried",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimaryKind {
    Bareword,
    SingleQuoted,
    DoubleQuoted,
    Variable,
    Wildcard,
    Tilde,
    /// `?(chunk)`
    ExceptionCapture,
    /// `(chunk)`
    OutputCapture,
    List,
    Lambda,
    Map,
    /// `{a,b}`, also used as a destructuring assignment target.
    Braced,
}

/// The structural slot a child occupies in its parent.
///
/// Roles replace pointer comparisons against named fields: a control
/// node's condition is simply the child whose role is `Condition`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Plain,
    Pipeline,
    Form,
    /// Command head of a form.
    Head,
    Arg,
    /// `&key=value` option of a form.
    Opt,
    Redir,
    Assignment,
    Control,
    /// Left-hand side of an assignment.
    Target,
    /// Right-hand side of an assignment, or the value of a map pair.
    Value,
    /// Loop variable of `for`.
    Iterator,
    /// Iteration source of `for`.
    Array,
    Condition,
    Body,
    ElseBody,
    ExceptVar,
    ExceptBody,
    FinallyBody,
    /// Element of an array or braced list.
    Item,
    Index,
    /// Argument list of a lambda.
    Params,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span, children: Vec<Node>) -> Self {
        Self {
            kind,
            role: Role::Plain,
            span,
            children,
        }
    }

    pub fn leaf(kind: NodeKind, span: Span) -> Self {
        Self::new(kind, span, Vec::new())
    }

    pub fn sep(span: Span) -> Self {
        Self::leaf(NodeKind::Sep, span)
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        self.span.text(source)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_chunk(&self) -> bool {
        self.kind == NodeKind::Chunk
    }

    pub fn is_control(&self) -> bool {
        matches!(self.kind, NodeKind::Control(_))
    }

    /// First child occupying `role`.
    pub fn field(&self, role: Role) -> Option<&Node> {
        self.children.iter().find(|c| c.role == role)
    }

    /// All children occupying `role`, in source order.
    pub fn fields(&self, role: Role) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(move |c| c.role == role)
    }

    /// A form with no head, no arguments and no control construct, but at
    /// least one assignment: `a=1 b=2`.
    pub fn is_assignment_only(&self) -> bool {
        if self.kind != NodeKind::Form {
            return false;
        }
        let mut has_assignment = false;
        for child in &self.children {
            match child.role {
                Role::Assignment => has_assignment = true,
                Role::Head | Role::Arg | Role::Opt | Role::Redir | Role::Control => return false,
                _ => {}
            }
        }
        has_assignment
    }

    /// Sub-targets of a braced assignment target such as `{a,b}=...`,
    /// or `None` when the target is a plain reference.
    pub fn braced_targets(&self) -> Option<impl Iterator<Item = &Node>> {
        debug_assert_eq!(self.kind, NodeKind::Assignment);
        let target = self.field(Role::Target)?;
        let head = target.children.first()?;
        if head.kind == NodeKind::Primary(PrimaryKind::Braced) {
            Some(head.fields(Role::Item))
        } else {
            None
        }
    }

    /// Depth-first iterator over the leaves under this node.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }
}

pub struct Leaves<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        while let Some(node) = self.stack.pop() {
            if node.is_leaf() {
                return Some(node);
            }
            self.stack.extend(node.children.iter().rev());
        }
        None
    }
}

/// A parsed script: the root chunk plus the text its spans index into.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    pub name: String,
    pub source: String,
    pub root: Node,
}

impl SyntaxTree {
    pub fn text(&self, node: &Node) -> &str {
        node.text(&self.source)
    }
}
