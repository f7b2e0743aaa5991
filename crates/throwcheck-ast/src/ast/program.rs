//! A host export: one source file with its resolved tree, declarations and
//! type hierarchy.

use super::{DeclTable, SyntaxTree};
use crate::foundation::{SourceMap, TypeTable};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything the rule needs to check one file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub path: PathBuf,
    /// Source text, used only for rendering diagnostics
    #[serde(default)]
    pub source: String,
    pub tree: SyntaxTree,
    #[serde(default)]
    pub declarations: DeclTable,
    #[serde(default)]
    pub types: TypeTable,
}

impl Program {
    /// Restores parent links that a serialized export may have dropped.
    pub fn link_parents(&mut self) {
        self.tree.link_parents();
    }

    /// Source map holding this program's file as file 0.
    pub fn source_map(&self) -> SourceMap {
        let mut map = SourceMap::new();
        map.add_file(self.path.clone(), self.source.clone());
        map
    }
}
