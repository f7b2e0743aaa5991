//! Tree walking utilities.
//!
//! Two directions are needed:
//!
//! - **Downward**, to find every call site in a file: [`walk`] is a pre-order
//!   traversal taking a closure, in the shape of a single `walk_expr`
//!   function rather than a visitor trait hierarchy.
//! - **Outward**, to find the constructs enclosing one call site:
//!   [`Ancestors`] follows parent links, nearest first.
//!
//! # Examples
//!
//! ```rust,ignore
//! use throwcheck_ast::ast::walk::walk;
//!
//! // Collect every invocation
//! let mut calls = Vec::new();
//! walk(&tree, root, &mut |id, node| {
//!     if matches!(node.kind, NodeKind::Invocation(_)) {
//!         calls.push(id);
//!     }
//! });
//! ```

use super::{Node, NodeId, SyntaxTree};

/// Walk the subtree at `root` in pre-order.
///
/// The visitor sees each node before its children; children are visited in
/// source order. Ids that do not exist in the tree are skipped. Uses an
/// explicit stack, so nesting depth is bounded by the heap, not the call stack.
pub fn walk<V>(tree: &SyntaxTree, root: NodeId, visitor: &mut V)
where
    V: FnMut(NodeId, &Node),
{
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };

        visitor(id, node);

        // Reversed so the first child is popped next
        stack.extend(node.kind.children().into_iter().rev());
    }
}

/// Iterator over the proper ancestors of a node, nearest first.
///
/// Yields `(child, ancestor)` pairs: `child` is the node on the path that
/// sits directly under `ancestor`. Callers use it to tell which slot of the
/// ancestor the walk came through (the guarded body of a `Try` versus one of
/// its handlers, the receiver of an invocation versus an argument).
pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    current: NodeId,
    steps: usize,
}

impl<'a> Ancestors<'a> {
    pub fn new(tree: &'a SyntaxTree, start: NodeId) -> Self {
        Self {
            tree,
            current: start,
            steps: 0,
        }
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = (NodeId, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        // A malformed parent cycle cannot loop forever
        if self.steps >= self.tree.len() {
            return None;
        }
        let parent = self.tree.parent(self.current)?;
        let child = self.current;
        self.current = parent;
        self.steps += 1;
        Some((child, parent))
    }
}

impl SyntaxTree {
    /// Proper ancestors of `id`, nearest first, paired with the child slot
    /// the walk came through.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors::new(self, id)
    }
}
