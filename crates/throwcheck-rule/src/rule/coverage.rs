//! Coverage checking for call sites with declared failure obligations.
//!
//! Given a call site and the failure kinds its target declares, decides
//! whether the surrounding code discharges the obligation.
//!
//! # Discharge Rules
//!
//! 1. **Chained continuation** - the call's result is the receiver of a
//!    member-access chain that reaches a recognised error continuation
//!    (`f().catchError(..)`, `f().then(g, onError: h)`).
//! 2. **Protected region** - walking outward, each `try` whose guarded body
//!    contains the call is tested against its handlers in order. A region
//!    that does not cover lets the walk continue outward.
//! 3. **Propagation** - at the nearest enclosing function-like declaration the
//!    walk stops. The call is covered iff that declaration carries the marker
//!    with kinds that cover the call's kinds.
//!
//! # Handler Matching
//!
//! Per handler, in declaration order:
//!
//! - untyped handler (`catch (e)`) covers
//! - handler type handles any obligation kind ([`CoverageChecker::can_handle`]) covers
//! - handler type is a configured broad kind (`Object`, `Exception`, ...) covers
//!
//! After all handlers, an empty obligation set is covered by any region with
//! at least one handler (see [`EmptyObligationPolicy`]).
//!
//! # What This Pass Does NOT Do
//!
//! - **No await analysis** - a deferred call inside a `try` that is never
//!   awaited is judged by the same region rule
//! - **No continuation reachability** - chained continuations are recognised
//!   by member name only
//! - **No indirect tracking** - function values passed as data are not followed

use crate::config::RuleConfig;
use crate::rule::obligations::{extract, MarkerMatcher, ObligationSet};
use throwcheck_ast::{
    CallShape, DeclId, DeclTable, Invocation, NodeId, NodeKind, SyntaxTree, TypeHierarchy, TypeId,
};

/// How an empty obligation set ("marker present, kinds unknown") is judged.
///
/// Broad handlers cover regardless of this policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyObligationPolicy {
    /// A protected region with any handler at all covers an empty set
    pub any_handler_covers: bool,
    /// Propagation is granted whenever either obligation set is empty
    pub propagation_always_granted: bool,
}

impl EmptyObligationPolicy {
    /// Cannot disprove coverage without known kinds, so assume it.
    pub const CONSERVATIVE: Self = Self {
        any_handler_covers: true,
        propagation_always_granted: true,
    };

    /// Literal set semantics: an empty set is handled only by untyped or
    /// broad handlers, and propagation compares kinds one by one.
    pub const STRICT: Self = Self {
        any_handler_covers: false,
        propagation_always_granted: false,
    };
}

impl Default for EmptyObligationPolicy {
    fn default() -> Self {
        Self::CONSERVATIVE
    }
}

/// Why a call site is (or is not) covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// Result chained into an error continuation
    Chained { continuation: NodeId },
    /// Guarded body of this `try` has a matching handler
    Handler { region: NodeId },
    /// Enclosing declaration re-declares the failures
    Propagated { declaration: DeclId },
    Unhandled,
}

impl Coverage {
    pub fn is_covered(&self) -> bool {
        !matches!(self, Coverage::Unhandled)
    }
}

/// Read-only coverage queries over one resolved tree.
pub struct CoverageChecker<'a> {
    tree: &'a SyntaxTree,
    declarations: &'a DeclTable,
    hierarchy: &'a dyn TypeHierarchy,
    config: &'a RuleConfig,
    policy: EmptyObligationPolicy,
}

impl<'a> CoverageChecker<'a> {
    pub fn new(
        tree: &'a SyntaxTree,
        declarations: &'a DeclTable,
        hierarchy: &'a dyn TypeHierarchy,
        config: &'a RuleConfig,
    ) -> Self {
        Self {
            tree,
            declarations,
            hierarchy,
            config,
            policy: EmptyObligationPolicy::CONSERVATIVE,
        }
    }

    pub fn with_policy(mut self, policy: EmptyObligationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns true iff the obligation of `call_site` is discharged.
    pub fn is_covered(&self, call_site: NodeId, obligations: &ObligationSet) -> bool {
        self.coverage(call_site, obligations).is_covered()
    }

    /// Decides coverage and reports what discharged it.
    pub fn coverage(&self, call_site: NodeId, obligations: &ObligationSet) -> Coverage {
        if let Some(continuation) = self.chained_continuation(call_site) {
            return Coverage::Chained { continuation };
        }

        let Some(call_span) = self.tree.get(call_site).map(|n| n.span) else {
            return Coverage::Unhandled;
        };

        for (_, ancestor) in self.tree.ancestors(call_site) {
            let Some(node) = self.tree.get(ancestor) else {
                break;
            };
            match &node.kind {
                NodeKind::Try { body, handlers, .. } => {
                    let guarded = self
                        .tree
                        .get(*body)
                        .is_some_and(|b| b.span.contains(&call_span));
                    if guarded && self.handlers_cover(handlers, obligations) {
                        return Coverage::Handler { region: ancestor };
                    }
                }
                NodeKind::Function { decl, .. } => {
                    return match decl {
                        Some(decl) if self.propagates(*decl, obligations) => {
                            Coverage::Propagated { declaration: *decl }
                        }
                        _ => Coverage::Unhandled,
                    };
                }
                _ => {}
            }
        }

        Coverage::Unhandled
    }

    /// Name-based subtype test: can a handler for `catch_kind` intercept a
    /// failure of `thrown_kind`?
    ///
    /// Identity, then simple-name equality, then a name match anywhere in
    /// the thrown kind's supertypes.
    pub fn can_handle(&self, catch_kind: TypeId, thrown_kind: TypeId) -> bool {
        if catch_kind == thrown_kind {
            return true;
        }
        let Some(catch_name) = self.hierarchy.type_name(catch_kind) else {
            return false;
        };
        if self.hierarchy.type_name(thrown_kind) == Some(catch_name) {
            return true;
        }
        self.hierarchy
            .all_supertypes(thrown_kind)
            .into_iter()
            .any(|sup| self.hierarchy.type_name(sup) == Some(catch_name))
    }

    /// Returns true if the handler type is one of the configured broad kinds.
    pub fn is_broad(&self, kind: TypeId) -> bool {
        self.hierarchy
            .type_name(kind)
            .is_some_and(|name| self.config.is_broad_kind(name))
    }

    fn handlers_cover(&self, handlers: &[NodeId], obligations: &ObligationSet) -> bool {
        for &handler in handlers {
            let Some(NodeKind::Catch { on_type, .. }) = self.tree.get(handler).map(|n| &n.kind)
            else {
                continue;
            };
            let Some(on_type) = *on_type else {
                return true;
            };
            if obligations.iter().any(|k| self.can_handle(on_type, k)) {
                return true;
            }
            if self.is_broad(on_type) {
                return true;
            }
        }

        obligations.is_empty() && self.policy.any_handler_covers && !handlers.is_empty()
    }

    fn propagates(&self, decl: DeclId, obligations: &ObligationSet) -> bool {
        let matcher = MarkerMatcher::from_config(self.config);
        let Some(declared) = extract(self.declarations.get(decl), &matcher) else {
            return false;
        };

        if (obligations.is_empty() || declared.is_empty()) && self.policy.propagation_always_granted
        {
            return true;
        }

        obligations
            .iter()
            .all(|k| declared.iter().any(|d| self.can_handle(d, k)))
    }

    /// Follows the receiver chain from `call_site` looking for an error
    /// continuation. Parentheses are transparent.
    fn chained_continuation(&self, call_site: NodeId) -> Option<NodeId> {
        for (child, ancestor) in self.tree.ancestors(call_site) {
            match &self.tree.get(ancestor)?.kind {
                NodeKind::Parenthesized { .. } => {}
                NodeKind::Invocation(inv) if inv.receiver == Some(child) => {
                    if self.is_error_continuation(inv) {
                        return Some(ancestor);
                    }
                }
                _ => return None,
            }
        }
        None
    }

    fn is_error_continuation(&self, inv: &Invocation) -> bool {
        if inv.shape != CallShape::MethodCall {
            return false;
        }
        let Some(member) = inv.member.as_deref() else {
            return false;
        };
        if self.config.error_continuations.iter().any(|m| m == member) {
            return true;
        }
        self.config
            .two_branch_continuations
            .get(member)
            .is_some_and(|arg| inv.has_named_arg(arg))
    }
}
