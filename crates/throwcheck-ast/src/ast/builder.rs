//! Bottom-up tree construction with synthesized spans.
//!
//! Hosts that export real trees supply real spans. Tests and synthetic
//! programs use [`TreeBuilder`], which hands out spans from a cursor: every
//! node ends one token past everything allocated before it, and starts at its
//! earliest child. Subtrees built one after another therefore get disjoint
//! spans, and every parent's span covers its children, which is all the
//! containment test needs.
//!
//! # Examples
//!
//! ```
//! # use throwcheck_ast::ast::*;
//! # use throwcheck_ast::foundation::TypeId;
//! let mut b = TreeBuilder::new(0);
//! let call = b.call("f", Some(DeclId(0)));
//! let stmt = b.expr_stmt(call);
//! let body = b.block(vec![stmt]);
//! let handler_body = b.block(vec![]);
//! let handler = b.catch(Some(TypeId(2)), handler_body);
//! let region = b.try_stmt(body, vec![handler], None);
//! let tree = b.finish(region);
//!
//! let region_span = tree.get(region).unwrap().span;
//! assert!(region_span.contains(&tree.get(call).unwrap().span));
//! ```

use super::{Argument, CallShape, DeclId, Invocation, NodeId, NodeKind, SyntaxTree};
use crate::foundation::{Span, TypeId};

/// Builds a [`SyntaxTree`] children-first.
#[derive(Debug)]
pub struct TreeBuilder {
    tree: SyntaxTree,
    file_id: u16,
    cursor: u32,
}

impl TreeBuilder {
    pub fn new(file_id: u16) -> Self {
        Self {
            tree: SyntaxTree::new(),
            file_id,
            cursor: 0,
        }
    }

    /// Allocates a node whose own tokens are `token_len` bytes wide.
    pub fn node(&mut self, kind: NodeKind, token_len: u32) -> NodeId {
        let start = kind
            .children()
            .iter()
            .filter_map(|c| self.tree.get(*c))
            .map(|n| n.span.start)
            .min()
            .unwrap_or(self.cursor);
        let end = self.cursor + token_len.max(1);
        self.cursor = end + 1;
        self.tree.alloc(kind, Span::new(self.file_id, start, end, 1))
    }

    pub fn identifier(&mut self, name: &str) -> NodeId {
        self.node(
            NodeKind::Identifier {
                name: name.to_string(),
            },
            name.len() as u32,
        )
    }

    pub fn literal(&mut self, text: &str) -> NodeId {
        self.node(
            NodeKind::Literal {
                text: text.to_string(),
            },
            text.len() as u32,
        )
    }

    pub fn invocation(&mut self, invocation: Invocation) -> NodeId {
        let len = invocation.member.as_ref().map_or(1, |m| m.len()) as u32 + 2;
        self.node(NodeKind::Invocation(invocation), len)
    }

    /// Plain call `name()` resolving to `target`.
    pub fn call(&mut self, name: &str, target: Option<DeclId>) -> NodeId {
        self.invocation(Invocation {
            shape: CallShape::MethodCall,
            target,
            receiver: None,
            member: Some(name.to_string()),
            args: Vec::new(),
        })
    }

    /// `receiver.member(args)`.
    pub fn method_call(
        &mut self,
        receiver: NodeId,
        member: &str,
        target: Option<DeclId>,
        args: Vec<Argument>,
    ) -> NodeId {
        self.invocation(Invocation {
            shape: CallShape::MethodCall,
            target,
            receiver: Some(receiver),
            member: Some(member.to_string()),
            args,
        })
    }

    /// `callee(args)` where `callee` evaluates to a function value.
    pub fn function_value_call(
        &mut self,
        callee: NodeId,
        target: Option<DeclId>,
        args: Vec<Argument>,
    ) -> NodeId {
        self.invocation(Invocation {
            shape: CallShape::FunctionValueCall,
            target,
            receiver: Some(callee),
            member: None,
            args,
        })
    }

    /// `Type(args)`.
    pub fn construct(
        &mut self,
        type_name: &str,
        target: Option<DeclId>,
        args: Vec<Argument>,
    ) -> NodeId {
        self.invocation(Invocation {
            shape: CallShape::Construction,
            target,
            receiver: None,
            member: Some(type_name.to_string()),
            args,
        })
    }

    /// `receiver.member` resolving to a getter.
    pub fn property(&mut self, receiver: NodeId, member: &str, target: Option<DeclId>) -> NodeId {
        self.invocation(Invocation {
            shape: CallShape::PropertyAccess,
            target,
            receiver: Some(receiver),
            member: Some(member.to_string()),
            args: Vec::new(),
        })
    }

    /// `prefix.member` resolving to a getter through a qualified identifier.
    pub fn prefixed(&mut self, prefix: &str, member: &str, target: Option<DeclId>) -> NodeId {
        let prefix = self.identifier(prefix);
        self.invocation(Invocation {
            shape: CallShape::PrefixedIdentifier,
            target,
            receiver: Some(prefix),
            member: Some(member.to_string()),
            args: Vec::new(),
        })
    }

    pub fn expr_stmt(&mut self, expr: NodeId) -> NodeId {
        self.node(NodeKind::ExprStmt { expr }, 1)
    }

    pub fn ret(&mut self, value: Option<NodeId>) -> NodeId {
        self.node(NodeKind::Return { value }, 6)
    }

    pub fn var(&mut self, name: &str, init: Option<NodeId>) -> NodeId {
        self.node(
            NodeKind::VarDecl {
                name: name.to_string(),
                init,
            },
            name.len() as u32,
        )
    }

    pub fn await_expr(&mut self, expr: NodeId) -> NodeId {
        self.node(NodeKind::Await { expr }, 5)
    }

    pub fn paren(&mut self, expr: NodeId) -> NodeId {
        self.node(NodeKind::Parenthesized { expr }, 1)
    }

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.node(NodeKind::Block { statements }, 1)
    }

    pub fn catch(&mut self, on_type: Option<TypeId>, body: NodeId) -> NodeId {
        self.node(NodeKind::Catch { on_type, body }, 5)
    }

    pub fn try_stmt(
        &mut self,
        body: NodeId,
        handlers: Vec<NodeId>,
        finally: Option<NodeId>,
    ) -> NodeId {
        self.node(
            NodeKind::Try {
                body,
                handlers,
                finally,
            },
            1,
        )
    }

    pub fn function(&mut self, decl: Option<DeclId>, body: NodeId) -> NodeId {
        self.node(NodeKind::Function { decl, body }, 1)
    }

    pub fn closure(&mut self, body: NodeId) -> NodeId {
        self.node(NodeKind::Closure { body }, 1)
    }

    pub fn unit(&mut self, items: Vec<NodeId>) -> NodeId {
        self.node(NodeKind::CompilationUnit { items }, 1)
    }

    /// Finishes the tree with `root` as its root node.
    pub fn finish(mut self, root: NodeId) -> SyntaxTree {
        self.tree.set_root(root);
        self.tree
    }
}
