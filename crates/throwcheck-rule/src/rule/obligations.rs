//! Failure-obligation extraction.
//!
//! Reads the `@Throws({...})` marker off a resolved declaration and turns its
//! constant argument into the set of failure kinds the declaration may raise.
//!
//! # Outcomes
//!
//! | Declaration                                   | Result            |
//! |-----------------------------------------------|-------------------|
//! | unresolved                                    | `None`            |
//! | no marker annotation                          | `None`            |
//! | marker, argument missing or not a constant    | `Some(empty set)` |
//! | marker, argument is an empty set              | `Some(empty set)` |
//! | marker, `{A, B}`                              | `Some({A, B})`    |
//!
//! An empty set still means "this declaration may fail"; the coverage
//! checker treats it with the conservative policy in
//! [`EmptyObligationPolicy`](super::coverage::EmptyObligationPolicy).
//!
//! # Marker identity
//!
//! The marker is recognised by simple name. When the config names the
//! marker's library *and* the host resolved the annotation's library, the two
//! must also agree. Without both, an unrelated annotation that happens to
//! share the marker's name is accepted as the marker; this is a known
//! limitation of name-based matching.

use crate::config::RuleConfig;
use indexmap::IndexSet;
use throwcheck_ast::{Annotation, ConstValue, Declaration, TypeId};

/// Deduplicated set of failure kinds, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObligationSet {
    kinds: IndexSet<TypeId>,
}

impl ObligationSet {
    /// The "marker present, kinds unknown" set.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn contains(&self, kind: TypeId) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.kinds.iter().copied()
    }
}

impl FromIterator<TypeId> for ObligationSet {
    fn from_iter<T: IntoIterator<Item = TypeId>>(iter: T) -> Self {
        Self {
            kinds: iter.into_iter().collect(),
        }
    }
}

/// Decides whether an annotation is the failure-obligation marker.
#[derive(Debug, Clone, Copy)]
pub struct MarkerMatcher<'a> {
    name: &'a str,
    library: Option<&'a str>,
}

impl<'a> MarkerMatcher<'a> {
    pub fn new(name: &'a str, library: Option<&'a str>) -> Self {
        Self { name, library }
    }

    pub fn from_config(config: &'a RuleConfig) -> Self {
        Self::new(&config.marker_name, config.marker_library.as_deref())
    }

    /// Qualified comparison when both libraries are known, simple-name
    /// comparison otherwise.
    pub fn matches(&self, annotation: &Annotation) -> bool {
        if annotation.name != self.name {
            return false;
        }
        match (self.library, annotation.library.as_deref()) {
            (Some(expected), Some(actual)) => expected == actual,
            _ => true,
        }
    }
}

/// Extracts the declared failure kinds of `decl`.
///
/// `None` means there is no obligation (or the call target is unresolved)
/// and the call site must be skipped.
pub fn extract(decl: Option<&Declaration>, matcher: &MarkerMatcher<'_>) -> Option<ObligationSet> {
    let decl = decl?;
    let marker = decl.annotations.iter().find(|a| matcher.matches(a))?;

    let kinds = match &marker.argument {
        Some(ConstValue::Set(elements)) | Some(ConstValue::List(elements)) => {
            type_literals(elements)
        }
        Some(ConstValue::Type(ty)) => std::iter::once(*ty).collect(),
        _ => ObligationSet::empty(),
    };

    tracing::trace!(
        declaration = %decl.name,
        kinds = kinds.len(),
        "failure obligation extracted"
    );

    Some(kinds)
}

/// Keeps the type literals of a collection constant; other elements are
/// ignored.
fn type_literals(elements: &[ConstValue]) -> ObligationSet {
    elements
        .iter()
        .filter_map(|e| match e {
            ConstValue::Type(ty) => Some(*ty),
            _ => None,
        })
        .collect()
}
