//! Unhandled-failure lint pass
//!
//! Reports call sites that invoke a declaration marked with the failure
//! obligation (`@Throws({...})`) when nothing around the call discharges it.
//!
//! # What This Pass Does
//!
//! 1. **Walk the tree** in pre-order and visit every invocation
//! 2. **Resolve the target** and extract its obligation set
//! 3. **Check coverage** (continuation chain, protected regions, propagation)
//! 4. **Emit a finding** for every uncovered call site
//!
//! Unresolved targets and unmarked declarations produce nothing. Findings are
//! sorted by span so output does not depend on traversal details.
//!
//! # Examples
//!
//! ```dart
//! @Throws({FormatException})
//! int parse(String s) => int.parse(s);
//!
//! void main() {
//!     parse('1');            // FINDING - nothing handles FormatException
//!
//!     try {
//!         parse('2');        // OK - matching handler
//!     } on FormatException {}
//! }
//!
//! @Throws({FormatException})
//! int twice(String s) => parse(s) * 2;   // OK - propagated
//! ```

use crate::config::RuleConfig;
use crate::error::{CompileError, ErrorKind};
use crate::rule::coverage::{Coverage, CoverageChecker};
use crate::rule::obligations::{extract, MarkerMatcher, ObligationSet};
use throwcheck_ast::{
    walk, DeclTable, Declaration, NodeKind, Program, Span, SyntaxTree, TypeHierarchy,
};

const REMEDIATION_HINT: &str = "wrap the call in a try block with a matching handler, \
     or declare the failure on the enclosing declaration";

/// Runs the rule over a host-exported program.
pub fn check_program(program: &Program, config: &RuleConfig) -> Vec<CompileError> {
    check_tree(&program.tree, &program.declarations, &program.types, config)
}

/// Runs the rule over one resolved tree.
///
/// Entry point for hosts that keep their own tree and type oracle.
pub fn check_tree(
    tree: &SyntaxTree,
    declarations: &DeclTable,
    hierarchy: &dyn TypeHierarchy,
    config: &RuleConfig,
) -> Vec<CompileError> {
    if !config.enabled {
        tracing::debug!("unhandled-throws rule disabled");
        return Vec::new();
    }
    let Some(root) = tree.root() else {
        if !tree.is_empty() {
            tracing::warn!(
                parentless = tree.parentless().len(),
                "tree has no single root, nothing checked"
            );
        }
        return Vec::new();
    };

    let matcher = MarkerMatcher::from_config(config);
    let checker = CoverageChecker::new(tree, declarations, hierarchy, config);

    let mut errors = Vec::new();
    let mut call_sites = 0usize;
    let mut obligated = 0usize;

    walk(tree, root, &mut |id, node| {
        let NodeKind::Invocation(invocation) = &node.kind else {
            return;
        };
        call_sites += 1;

        let Some(target) = invocation.target else {
            tracing::trace!(call_site = %id, "unresolved call target, skipped");
            return;
        };
        let decl = declarations.get(target);
        let Some(obligations) = extract(decl, &matcher) else {
            return;
        };
        obligated += 1;

        match checker.coverage(id, &obligations) {
            Coverage::Unhandled => {
                if let Some(decl) = decl {
                    errors.push(unhandled_failure(
                        node.span,
                        decl,
                        &obligations,
                        hierarchy,
                        config,
                    ));
                }
            }
            covered => {
                tracing::trace!(call_site = %id, ?covered, "obligation discharged");
            }
        }
    });

    errors.sort_by(|a, b| a.span.cmp(&b.span));

    tracing::debug!(
        call_sites,
        obligated,
        findings = errors.len(),
        "unhandled-throws check complete"
    );

    errors
}

fn unhandled_failure(
    span: Span,
    decl: &Declaration,
    obligations: &ObligationSet,
    hierarchy: &dyn TypeHierarchy,
    config: &RuleConfig,
) -> CompileError {
    let message = if obligations.is_empty() {
        format!(
            "{} '{}' is marked @{} and may throw, but the call is not handled",
            decl.kind.describe(),
            decl.name,
            config.marker_name
        )
    } else {
        format!(
            "{} '{}' may throw {}, but the call is not handled",
            decl.kind.describe(),
            decl.name,
            kind_names(obligations, hierarchy)
        )
    };

    let mut error =
        CompileError::with_severity(ErrorKind::UnhandledFailure, config.severity, span, message)
            .with_note(REMEDIATION_HINT.to_string());

    if let Some(decl_span) = decl.span {
        error = error.with_label(decl_span, format!("'{}' declared here", decl.name));
    }

    error
}

fn kind_names(obligations: &ObligationSet, hierarchy: &dyn TypeHierarchy) -> String {
    obligations
        .iter()
        .map(|k| {
            hierarchy
                .type_name(k)
                .map_or_else(|| k.to_string(), str::to_string)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
