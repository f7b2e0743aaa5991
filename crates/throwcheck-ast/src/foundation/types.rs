//! Nominal types and the type-hierarchy oracle.
//!
//! The rule never inspects type structure. It needs two facts about a
//! nominal type: its simple name and the full set of its supertypes.
//! [`TypeHierarchy`] is the query surface the host front-end implements;
//! [`TypeTable`] is the in-crate implementation used by exported programs and
//! tests. It keeps the declaring library the host exported alongside each name.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Opaque identity of a nominal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only queries over the host's type hierarchy.
pub trait TypeHierarchy {
    /// Simple (unqualified) name of a type, or `None` for unknown ids.
    fn type_name(&self, ty: TypeId) -> Option<&str>;

    /// Every proper supertype of `ty`, transitively.
    fn all_supertypes(&self, ty: TypeId) -> Vec<TypeId>;
}

/// A declared nominal type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominalType {
    /// Simple name (`FormatException`)
    pub name: String,
    /// Declaring library URI (`dart:core`), when known
    #[serde(default)]
    pub library: Option<String>,
    /// Direct supertypes (superclass, interfaces, mixins)
    #[serde(default)]
    pub supertypes: Vec<TypeId>,
}

/// Registry of nominal types indexed by [`TypeId`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeTable {
    types: Vec<NominalType>,
}

impl TypeTable {
    /// Creates a new, empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type and returns its id.
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        library: Option<&str>,
        supertypes: &[TypeId],
    ) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(NominalType {
            name: name.into(),
            library: library.map(str::to_string),
            supertypes: supertypes.to_vec(),
        });
        id
    }

    /// Looks up a type by id.
    pub fn get(&self, ty: TypeId) -> Option<&NominalType> {
        self.types.get(ty.0 as usize)
    }

    /// Finds the first type registered under a simple name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.types
            .iter()
            .position(|t| t.name == name)
            .map(|idx| TypeId(idx as u32))
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeHierarchy for TypeTable {
    fn type_name(&self, ty: TypeId) -> Option<&str> {
        self.get(ty).map(|t| t.name.as_str())
    }

    /// Breadth-first closure over direct supertypes. Cycles in malformed
    /// input terminate because each id is visited once.
    fn all_supertypes(&self, ty: TypeId) -> Vec<TypeId> {
        let mut seen = HashSet::from([ty]);
        let mut result = Vec::new();
        let mut queue = match self.get(ty) {
            Some(t) => t.supertypes.clone(),
            None => return result,
        };

        while !queue.is_empty() {
            let next = std::mem::take(&mut queue);
            for sup in next {
                if !seen.insert(sup) {
                    continue;
                }
                result.push(sup);
                if let Some(t) = self.get(sup) {
                    queue.extend(t.supertypes.iter().copied());
                }
            }
        }

        result
    }
}
