//! Syntax trees.
//!
//! During a parse, nodes live in an `Arena` and refer to each other through
//! `NodeId` handles, which is what the memo table stores. Nodes built by
//! alternatives that later fail stay in the arena but are never linked from
//! the root. `Arena::commit` copies the reachable tree out into owned
//! `Node`s once the parse succeeds.

use std::fmt::{self, Display};

use crate::config::{RED_ZONE, STACK_SEGMENT};
use crate::cursor::Mark;
use crate::span::Span;
use crate::tokens::{Token, TokenKind};

/// Handle to a node in the parse arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a successful match produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Node(NodeId),
    /// The token at this mark.
    Token(Mark),
}

/// A value with an optional field label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'g> {
    pub label: Option<&'g str>,
    pub value: Value,
}

#[derive(Debug)]
struct NodeData<'g> {
    kind: &'g str,
    span: Span,
    children: Vec<Element<'g>>,
}

/// Parse-scoped node storage.
#[derive(Debug, Default)]
pub struct Arena<'g> {
    nodes: Vec<NodeData<'g>>,
}

impl<'g> Arena<'g> {
    pub fn new() -> Self {
        Arena { nodes: Vec::new() }
    }

    pub fn alloc(&mut self, kind: &'g str, span: Span, children: Vec<Element<'g>>) -> NodeId {
        self.nodes.push(NodeData {
            kind,
            span,
            children,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn kind(&self, id: NodeId) -> &'g str {
        self.nodes[id.0].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.0].span
    }

    pub fn children(&self, id: NodeId) -> &[Element<'g>] {
        &self.nodes[id.0].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Materialize the tree rooted at `root`. A handle reachable along two
    /// paths is copied twice.
    pub fn commit(&self, root: NodeId, tokens: &[Token]) -> Node {
        let data = &self.nodes[root.0];
        let children = data
            .children
            .iter()
            .map(|el| Child {
                label: el.label.map(str::to_owned),
                item: match el.value {
                    Value::Node(id) => Item::Node(stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || {
                        self.commit(id, tokens)
                    })),
                    Value::Token(mark) => Item::Leaf(Leaf {
                        token: tokens[mark.index()].clone(),
                        mark,
                    }),
                },
            })
            .collect();
        Node {
            kind: data.kind.to_owned(),
            span: data.span,
            children,
        }
    }
}

/// A token in the committed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub token: Token,
    pub mark: Mark,
}

impl Leaf {
    pub fn text(&self) -> &str {
        &self.token.text
    }

    pub fn kind(&self) -> TokenKind {
        self.token.kind
    }

    pub fn span(&self) -> Span {
        Span::new(self.mark, Mark::new(self.mark.index() + 1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Node(Node),
    Leaf(Leaf),
}

impl Item {
    pub fn span(&self) -> Span {
        match self {
            Item::Node(node) => node.span,
            Item::Leaf(leaf) => leaf.span(),
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Item::Node(node) => Some(node),
            Item::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Item::Leaf(leaf) => Some(leaf),
            Item::Node(_) => None,
        }
    }

    /// Token text, for leaves.
    pub fn text(&self) -> Option<&str> {
        self.as_leaf().map(Leaf::text)
    }

    /// Node kind, for nodes.
    pub fn kind(&self) -> Option<&str> {
        self.as_node().map(Node::kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub label: Option<String>,
    pub item: Item,
}

/// An owned syntax tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: String,
    span: Span,
    children: Vec<Child>,
}

impl Node {
    pub fn new(kind: impl Into<String>, span: Span, children: Vec<Child>) -> Self {
        Node {
            kind: kind.into(),
            span,
            children,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// The first child with this label.
    pub fn field(&self, label: &str) -> Option<&Item> {
        self.children
            .iter()
            .find(|child| child.label.as_deref() == Some(label))
            .map(|child| &child.item)
    }

    /// Every child with this label, in order.
    pub fn fields<'a, 'l>(&'a self, label: &'l str) -> impl Iterator<Item = &'a Item> + 'l
    where
        'a: 'l,
    {
        self.children
            .iter()
            .filter(move |child| child.label.as_deref() == Some(label))
            .map(|child| &child.item)
    }

    /// Direct child nodes, skipping leaves.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(|child| child.item.as_node())
    }

    /// Every token under this node, in source order.
    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut leaves = Vec::new();
        let mut stack: Vec<&Child> = self.children.iter().rev().collect();
        while let Some(child) = stack.pop() {
            match &child.item {
                Item::Leaf(leaf) => leaves.push(leaf),
                Item::Node(node) => stack.extend(node.children.iter().rev()),
            }
        }
        leaves
    }

    /// Depth-first, pre-order walk over this node and its descendants.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Iterator returned by `Node::walk`.
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.nodes().collect::<Vec<_>>().into_iter().rev());
        Some(node)
    }
}

/// Renders as an s-expression: `(Kind label=child ...)`.
impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}", self.kind)?;
        for child in self.children.iter() {
            write!(f, " ")?;
            if let Some(label) = &child.label {
                write!(f, "{}=", label)?;
            }
            match &child.item {
                Item::Node(node) => {
                    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || write!(f, "{}", node))?
                }
                Item::Leaf(leaf) if leaf.text().is_empty() => write!(f, "{}", leaf.kind())?,
                Item::Leaf(leaf) => write!(f, "{}", leaf.text())?,
            }
        }
        write!(f, ")")
    }
}
