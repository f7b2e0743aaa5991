//! Resolved syntax tree consumed by the rule.

pub mod builder;
pub mod decl;
pub mod node;
pub mod program;
pub mod walk;

pub use builder::TreeBuilder;
pub use decl::{Annotation, ConstValue, DeclId, DeclKind, DeclTable, Declaration};
pub use node::{Argument, CallShape, Invocation, Node, NodeId, NodeKind, SyntaxTree};
pub use program::Program;
pub use walk::{walk, Ancestors};
