//! Foundation types shared by the tree model and the rule.

pub mod span;
pub mod types;

pub use span::{SourceFile, SourceMap, Span};
pub use types::{NominalType, TypeHierarchy, TypeId, TypeTable};
