// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Unhandled-failure rule for throwcheck
//!
//! Flags call sites that invoke a declaration marked `@Throws({...})` when
//! the call is neither inside a `try` with a matching handler, nor chained
//! into an error continuation, nor inside a declaration that re-declares the
//! failure.
//!
//! ```
//! use throwcheck_ast::*;
//! use throwcheck_rule::{check_tree, RuleConfig};
//!
//! let mut types = TypeTable::new();
//! let object = types.declare("Object", None, &[]);
//! let exception = types.declare("Exception", None, &[object]);
//! let format = types.declare("FormatException", None, &[exception]);
//!
//! let mut decls = DeclTable::new();
//! let parse = decls.add(
//!     Declaration::new("parse", DeclKind::Function)
//!         .with_annotation(Annotation::new("Throws", Some(ConstValue::type_set(&[format])))),
//! );
//!
//! let mut b = TreeBuilder::new(0);
//! let call = b.call("parse", Some(parse));
//! let stmt = b.expr_stmt(call);
//! let unit = b.unit(vec![stmt]);
//! let tree = b.finish(unit);
//!
//! let findings = check_tree(&tree, &decls, &types, &RuleConfig::default());
//! assert_eq!(findings.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod rule;

pub use config::{ConfigError, RuleConfig};
pub use error::{CompileError, DiagnosticFormatter, ErrorKind, Label, Severity};
pub use rule::{check_program, check_tree, Coverage, CoverageChecker, ObligationSet};
