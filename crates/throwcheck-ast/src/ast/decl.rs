//! Resolved declarations and their metadata.
//!
//! A declaration is anything an invocation can resolve to: a top-level
//! function, a method, a constructor or a property getter. Its annotations
//! are exported with their constant arguments already evaluated by the host
//! (or marked [`ConstValue::Unevaluated`] when evaluation failed).

use crate::foundation::{Span, TypeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a declaration in a [`DeclTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub u32);

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Function,
    Method,
    Constructor,
    Getter,
}

impl DeclKind {
    pub fn describe(self) -> &'static str {
        match self {
            DeclKind::Function => "function",
            DeclKind::Method => "method",
            DeclKind::Constructor => "constructor",
            DeclKind::Getter => "getter",
        }
    }
}

/// A resolved declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    /// Location of the declaration's name, when it is in the checked file
    #[serde(default)]
    pub span: Option<Span>,
}

impl Declaration {
    pub fn new(name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
            annotations: Vec::new(),
            span: None,
        }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// Metadata attached to a declaration (`@Throws({FormatException})`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Simple name of the annotation's type
    pub name: String,
    /// Library declaring the annotation's type, when resolved
    #[serde(default)]
    pub library: Option<String>,
    /// Sole constant argument; `None` when the annotation has no argument
    #[serde(default)]
    pub argument: Option<ConstValue>,
}

impl Annotation {
    pub fn new(name: impl Into<String>, argument: Option<ConstValue>) -> Self {
        Self {
            name: name.into(),
            library: None,
            argument,
        }
    }

    pub fn in_library(mut self, library: impl Into<String>) -> Self {
        self.library = Some(library.into());
        self
    }
}

/// Host-evaluated constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "const", content = "value", rename_all = "snake_case")]
pub enum ConstValue {
    Set(Vec<ConstValue>),
    List(Vec<ConstValue>),
    /// Type literal (`FormatException` used as a value)
    Type(TypeId),
    String(String),
    Int(i64),
    Bool(bool),
    Null,
    /// The host could not evaluate the expression to a constant
    Unevaluated,
}

impl ConstValue {
    /// Convenience for the common `{A, B}` shape.
    pub fn type_set(types: &[TypeId]) -> Self {
        ConstValue::Set(types.iter().copied().map(ConstValue::Type).collect())
    }
}

/// Declarations indexed by [`DeclId`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclTable {
    decls: Vec<Declaration>,
}

impl DeclTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, decl: Declaration) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.decls.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}
