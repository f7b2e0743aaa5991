// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Resolved syntax tree model for throwcheck
//!
//! This crate holds the data the host front-end exports for the rule: the
//! resolved syntax tree with parent links, declarations with their evaluated
//! annotations, the nominal type hierarchy, and source locations.

pub mod ast;
pub mod foundation;

pub use foundation::{SourceFile, SourceMap, Span, TypeHierarchy, TypeId, TypeTable};

pub use ast::*;
