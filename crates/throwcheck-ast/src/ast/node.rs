//! Resolved syntax tree arena.
//!
//! The host front-end hands the rule a tree whose nodes are already resolved:
//! invocations know the declaration they call, catch clauses know the type
//! they match. Nodes live in a flat arena and refer to each other by
//! [`NodeId`]. Every node records its parent, so the rule can walk outward
//! from a call site without re-traversing the tree.
//!
//! # Parent links
//!
//! Children are allocated before their parent. When a parent is allocated,
//! [`SyntaxTree::alloc`] sets the `parent` field of every child listed in its
//! kind. Trees deserialized from a host export may omit parents entirely;
//! [`SyntaxTree::link_parents`] rebuilds them from the kinds.

use crate::ast::decl::DeclId;
use crate::foundation::{Span, TypeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node in a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A single tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    /// Enclosing node; `None` for the root
    #[serde(default)]
    pub parent: Option<NodeId>,
}

/// The syntactic shape of a node.
///
/// Only the constructs the rule needs to tell apart are modelled. Anything
/// else a host encounters can be exported as the nearest structural
/// equivalent (`ExprStmt`, `Block`, `Parenthesized`) without changing a
/// verdict, since the rule only cares about ancestry and spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum NodeKind {
    /// Top-level container for one source file
    CompilationUnit { items: Vec<NodeId> },

    /// Body of a function, method, constructor or getter declaration
    Function {
        /// Declaration this body belongs to, if the host resolved it
        decl: Option<DeclId>,
        body: NodeId,
    },

    /// Anonymous function literal; not an enclosing declaration
    Closure { body: NodeId },

    Block { statements: Vec<NodeId> },

    ExprStmt { expr: NodeId },

    Return { value: Option<NodeId> },

    VarDecl { name: String, init: Option<NodeId> },

    /// Protected region: guarded body, ordered handlers, optional cleanup
    Try {
        body: NodeId,
        /// `Catch` nodes in declaration order
        handlers: Vec<NodeId>,
        finally: Option<NodeId>,
    },

    /// Handler clause; `on_type: None` catches everything
    Catch { on_type: Option<TypeId>, body: NodeId },

    Invocation(Invocation),

    Await { expr: NodeId },

    Parenthesized { expr: NodeId },

    Identifier { name: String },

    Literal { text: String },
}

/// The five call-site shapes the rule analyzes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallShape {
    /// `f()`, `obj.m()`
    MethodCall,
    /// `callback()` where `callback` is a function-typed value
    FunctionValueCall,
    /// `Foo()`, `Foo.named()`
    Construction,
    /// `obj.prop` resolving to a getter
    PropertyAccess,
    /// `prefix.prop` resolving to a getter through a qualified identifier
    PrefixedIdentifier,
}

/// One invocation of a declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    pub shape: CallShape,
    /// Resolved callee; `None` when the host could not resolve it
    #[serde(default)]
    pub target: Option<DeclId>,
    /// Receiver expression of a member access, if any
    #[serde(default)]
    pub receiver: Option<NodeId>,
    /// Member name at the call site (`catchError` in `x.catchError(..)`)
    #[serde(default)]
    pub member: Option<String>,
    #[serde(default)]
    pub args: Vec<Argument>,
}

/// Positional or named argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    /// Name of a named argument (`onError`), `None` when positional
    #[serde(default)]
    pub name: Option<String>,
    pub value: NodeId,
}

impl Argument {
    pub fn positional(value: NodeId) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: NodeId) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

impl Invocation {
    /// Returns true if a named argument with this name is supplied.
    pub fn has_named_arg(&self, name: &str) -> bool {
        self.args.iter().any(|a| a.name.as_deref() == Some(name))
    }
}

impl NodeKind {
    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::CompilationUnit { items } => items.clone(),
            NodeKind::Function { body, .. } | NodeKind::Closure { body } => vec![*body],
            NodeKind::Block { statements } => statements.clone(),
            NodeKind::ExprStmt { expr }
            | NodeKind::Await { expr }
            | NodeKind::Parenthesized { expr } => vec![*expr],
            NodeKind::Return { value } => value.iter().copied().collect(),
            NodeKind::VarDecl { init, .. } => init.iter().copied().collect(),
            NodeKind::Try {
                body,
                handlers,
                finally,
            } => {
                let mut children = vec![*body];
                children.extend(handlers.iter().copied());
                children.extend(finally.iter().copied());
                children
            }
            NodeKind::Catch { body, .. } => vec![*body],
            NodeKind::Invocation(inv) => {
                let mut children: Vec<NodeId> = inv.receiver.iter().copied().collect();
                children.extend(inv.args.iter().map(|a| a.value));
                children
            }
            NodeKind::Identifier { .. } | NodeKind::Literal { .. } => Vec::new(),
        }
    }
}

/// Arena of resolved nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    #[serde(default)]
    root: Option<NodeId>,
}

impl SyntaxTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a node and links its children to it.
    ///
    /// Children must already be allocated.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for child in kind.children() {
            if let Some(node) = self.nodes.get_mut(child.0 as usize) {
                node.parent = Some(id);
            }
        }
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
        });
        id
    }

    /// Recomputes every parent link from node kinds.
    ///
    /// Needed after deserializing a host export that omits parents.
    pub fn link_parents(&mut self) {
        for node in &mut self.nodes {
            node.parent = None;
        }
        for idx in 0..self.nodes.len() {
            for child in self.nodes[idx].kind.children() {
                if let Some(node) = self.nodes.get_mut(child.0 as usize) {
                    node.parent = Some(NodeId(idx as u32));
                }
            }
        }
    }

    /// Looks up a node.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Parent of a node, if any.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Sets the root node.
    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    /// Root node.
    ///
    /// Falls back to the single node without a parent when the export does
    /// not name one. Returns `None` when that node is not unique, so parent
    /// links must be current (see [`SyntaxTree::link_parents`]).
    pub fn root(&self) -> Option<NodeId> {
        if self.root.is_some() {
            return self.root;
        }
        match self.parentless().as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Every node without a parent, in allocation order.
    pub fn parentless(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Iterates all nodes with their ids, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx as u32), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
