//! Rule-wide properties: contexts that always or never discharge an
//! obligation, independent of the particular call.

use throwcheck_ast::{Annotation, Argument, ConstValue, DeclKind, NodeId, TypeHierarchy, TypeId};
use throwcheck_rule::{check_tree, CoverageChecker, ObligationSet, RuleConfig};
use throwcheck_tests::TestHarness;

const OBLIGATION_SETS: &[&[&str]] = &[
    &[],
    &["FormatException"],
    &["StateError"],
    &["FormatException", "StateError"],
    &["FileSystemException", "ArgumentError"],
];

/// One call per shape, each wrapped by `wrap`, all targeting `decl`.
fn every_call_shape(
    h: &mut TestHarness,
    decl: throwcheck_ast::DeclId,
    wrap: impl Fn(&mut TestHarness, NodeId) -> NodeId,
) -> (Vec<NodeId>, Vec<NodeId>) {
    let b = &mut h.builder;
    let plain = b.call("f", Some(decl));
    let callee = b.identifier("callback");
    let value_call = b.function_value_call(callee, Some(decl), vec![]);
    let construct = b.construct("Parser", Some(decl), vec![]);
    let receiver = b.identifier("config");
    let property = b.property(receiver, "port", Some(decl));
    let prefixed = b.prefixed("settings", "port", Some(decl));

    let calls = vec![plain, value_call, construct, property, prefixed];
    let mut items = Vec::with_capacity(calls.len());
    for &call in &calls {
        let stmt = h.builder.expr_stmt(call);
        items.push(wrap(&mut *h, stmt));
    }
    (calls, items)
}

#[test]
fn test_unmarked_declarations_never_flagged() {
    let mut h = TestHarness::new();
    let plain = h.plain("f", DeclKind::Function);
    let other = h.annotated(
        "g",
        DeclKind::Method,
        Annotation::new("Deprecated", Some(ConstValue::String("use h".to_string()))),
    );

    let (calls, mut items) = every_call_shape(&mut h, plain, |_, stmt| stmt);
    let (other_calls, other_items) = every_call_shape(&mut h, other, |_, stmt| stmt);
    items.extend(other_items);

    let result = h.check(items);

    assert!(result.findings.is_empty());
    for call in calls.into_iter().chain(other_calls) {
        assert!(!result.is_flagged(call));
    }
}

#[test]
fn test_every_call_shape_flagged_at_top_level() {
    let mut h = TestHarness::new();
    let f = h.throwing("f", DeclKind::Getter, &["FormatException"]);
    let (calls, items) = every_call_shape(&mut h, f, |_, stmt| stmt);

    let result = h.check(items);

    assert_eq!(result.findings.len(), calls.len());
    assert!(calls.iter().all(|&c| result.is_flagged(c)));
}

#[test]
fn test_untyped_handler_covers_any_obligation() {
    for kinds in OBLIGATION_SETS {
        let mut h = TestHarness::new();
        let f = h.throwing("f", DeclKind::Function, kinds);
        let (calls, items) = every_call_shape(&mut h, f, |h, stmt| h.try_with(vec![stmt], &[None]));
        let obligations = h.kinds(kinds);

        let result = h.check(items);

        assert!(result.findings.is_empty(), "kinds {:?}", kinds);
        for call in calls {
            assert!(result.coverage(call, &obligations).is_covered());
        }
    }
}

#[test]
fn test_unrelated_handler_never_covers() {
    let cases: &[(&[&str], &str)] = &[
        (&["FormatException"], "StateError"),
        (&["StateError"], "FormatException"),
        (&["FileSystemException"], "ArgumentError"),
        (&["FormatException", "IOException"], "StateError"),
    ];

    for (kinds, handler) in cases {
        let mut h = TestHarness::new();
        let f = h.throwing("f", DeclKind::Function, kinds);
        let (calls, items) =
            every_call_shape(&mut h, f, |h, stmt| h.try_with(vec![stmt], &[Some(*handler)]));

        let result = h.check(items);

        assert_eq!(result.findings.len(), calls.len(), "{:?} vs {}", kinds, handler);
    }
}

#[test]
fn test_supertype_handler_covers() {
    let mut h = TestHarness::new();
    let f = h.throwing("f", DeclKind::Function, &["FileSystemException"]);
    let (call, stmt) = h.call_stmt("f", f);
    let region = h.try_with(vec![stmt], &[Some("IOException")]);

    let result = h.check(vec![region]);
    assert!(!result.is_flagged(call));
}

#[test]
fn test_broad_handlers_cover_anything() {
    for broad in ["Object", "Exception", "Error"] {
        for kinds in OBLIGATION_SETS {
            let mut h = TestHarness::new();
            let f = h.throwing("f", DeclKind::Function, kinds);
            let (call, stmt) = h.call_stmt("f", f);
            let region = h.try_with(vec![stmt], &[Some(broad)]);

            let result = h.check(vec![region]);
            assert!(!result.is_flagged(call), "on {} with {:?}", broad, kinds);
        }
    }
}

#[test]
fn test_broad_kinds_follow_config() {
    let mut h = TestHarness::new().with_config(RuleConfig {
        broad_kinds: vec!["Object".to_string()],
        ..RuleConfig::default()
    });
    let f = h.throwing("f", DeclKind::Function, &["StateError"]);
    let (call, stmt) = h.call_stmt("f", f);
    let region = h.try_with(vec![stmt], &[Some("Exception")]);

    let result = h.check(vec![region]);
    assert!(result.is_flagged(call));
}

#[test]
fn test_empty_obligation_covered_by_any_handler() {
    let mut h = TestHarness::new();
    let f = h.annotated(
        "f",
        DeclKind::Function,
        Annotation::new("Throws", Some(ConstValue::Unevaluated)),
    );
    let (covered, stmt) = h.call_stmt("f", f);
    let region = h.try_with(vec![stmt], &[Some("StateError")]);
    let (bare, bare_stmt) = h.call_stmt("f", f);

    let result = h.check(vec![region, bare_stmt]);

    assert!(!result.is_flagged(covered));
    assert!(result.is_flagged(bare));
}

#[test]
fn test_propagation_superset_covers_without_regions() {
    let mut h = TestHarness::new();
    let f = h.throwing("f", DeclKind::Function, &["FormatException", "FileSystemException"]);
    let g = h.throwing("g", DeclKind::Method, &["Exception"]);
    let (call, stmt) = h.call_stmt("f", f);
    let body = h.function(g, vec![stmt]);

    let result = h.check(vec![body]);
    assert!(!result.is_flagged(call));
}

#[test]
fn test_propagation_subset_does_not_cover() {
    let mut h = TestHarness::new();
    let f = h.throwing("f", DeclKind::Function, &["FormatException", "StateError"]);
    let g = h.throwing("g", DeclKind::Method, &["FormatException"]);
    let (call, stmt) = h.call_stmt("f", f);
    let body = h.function(g, vec![stmt]);

    let result = h.check(vec![body]);
    assert!(result.is_flagged(call));
}

#[test]
fn test_constructor_and_getter_bodies_propagate() {
    for kind in [DeclKind::Constructor, DeclKind::Getter] {
        let mut h = TestHarness::new();
        let f = h.throwing("f", DeclKind::Function, &["FormatException"]);
        let enclosing = h.throwing("enclosing", kind, &["FormatException"]);
        let (call, stmt) = h.call_stmt("f", f);
        let body = h.function(enclosing, vec![stmt]);

        let result = h.check(vec![body]);
        assert!(!result.is_flagged(call), "{:?}", kind);
    }
}

#[test]
fn test_nearest_declaration_decides_propagation() {
    // @Throws({FormatException}) void outer() { void inner() { f(); } }
    let mut h = TestHarness::new();
    let f = h.throwing("f", DeclKind::Function, &["FormatException"]);
    let outer = h.throwing("outer", DeclKind::Function, &["FormatException"]);
    let inner = h.plain("inner", DeclKind::Function);
    let (call, stmt) = h.call_stmt("f", f);
    let inner_body = h.function(inner, vec![stmt]);
    let outer_body = h.function(outer, vec![inner_body]);

    let result = h.check(vec![outer_body]);
    assert!(result.is_flagged(call));
}

#[test]
fn test_closure_inside_propagating_declaration() {
    // @Throws({FormatException}) void g() { items.forEach((x) { f(); }); }
    let mut h = TestHarness::new();
    let f = h.throwing("f", DeclKind::Function, &["FormatException"]);
    let g = h.throwing("g", DeclKind::Function, &["FormatException"]);
    let (call, stmt) = h.call_stmt("f", f);
    let closure_body = h.builder.block(vec![stmt]);
    let closure = h.builder.closure(closure_body);
    let items = h.builder.identifier("items");
    let for_each = h
        .builder
        .method_call(items, "forEach", None, vec![Argument::positional(closure)]);
    let for_each_stmt = h.builder.expr_stmt(for_each);
    let body = h.function(g, vec![for_each_stmt]);

    let result = h.check(vec![body]);
    assert!(!result.is_flagged(call));
}

#[test]
fn test_chained_continuations_cover_without_regions() {
    for member in ["catchError", "onError", "handleError"] {
        let mut h = TestHarness::new();
        let f = h.throwing("load", DeclKind::Function, &["FileSystemException"]);
        let call = h.builder.call("load", Some(f));
        let wrapped = h.builder.paren(call);
        let report = h.builder.identifier("report");
        let chained = h
            .builder
            .method_call(wrapped, member, None, vec![Argument::positional(report)]);
        let stmt = h.builder.expr_stmt(chained);

        let result = h.check(vec![stmt]);
        assert!(!result.is_flagged(call), "{}", member);
    }
}

#[test]
fn test_custom_continuation_config() {
    let mut h = TestHarness::new().with_config(RuleConfig {
        error_continuations: vec!["recover".to_string()],
        two_branch_continuations: Default::default(),
        ..RuleConfig::default()
    });
    let f = h.throwing("load", DeclKind::Function, &["FileSystemException"]);

    let recovered = h.builder.call("load", Some(f));
    let report = h.builder.identifier("report");
    let recover = h
        .builder
        .method_call(recovered, "recover", None, vec![Argument::positional(report)]);
    let s1 = h.builder.expr_stmt(recover);

    let caught = h.builder.call("load", Some(f));
    let report = h.builder.identifier("report");
    let catch_error = h
        .builder
        .method_call(caught, "catchError", None, vec![Argument::positional(report)]);
    let s2 = h.builder.expr_stmt(catch_error);

    let result = h.check(vec![s1, s2]);
    assert!(!result.is_flagged(recovered));
    assert!(result.is_flagged(caught));
}

#[test]
fn test_inner_region_does_not_block_outer() {
    let mut h = TestHarness::new();
    let f = h.throwing("f", DeclKind::Function, &["FormatException"]);
    let (call, stmt) = h.call_stmt("f", f);
    let inner = h.try_with(vec![stmt], &[Some("StateError"), Some("ArgumentError")]);
    let outer = h.try_with(vec![inner], &[Some("FormatException")]);

    let result = h.check(vec![outer]);
    assert!(!result.is_flagged(call));
}

#[test]
fn test_region_outside_declaration_does_not_reach_inside() {
    let mut h = TestHarness::new();
    let f = h.throwing("f", DeclKind::Function, &["FormatException"]);
    let g = h.plain("g", DeclKind::Function);
    let (call, stmt) = h.call_stmt("f", f);
    let body = h.function(g, vec![stmt]);
    let region = h.try_with(vec![body], &[None]);

    let result = h.check(vec![region]);
    assert!(result.is_flagged(call));
}

#[test]
fn test_unawaited_deferred_call_inside_region_is_covered() {
    // try { load(); } on IOException {}   -- no await before the region ends
    let mut h = TestHarness::new();
    let load = h.throwing("load", DeclKind::Function, &["FileSystemException"]);
    let (call, stmt) = h.call_stmt("load", load);
    let region = h.try_with(vec![stmt], &[Some("IOException")]);

    let result = h.check(vec![region]);
    assert!(!result.is_flagged(call));
}

#[test]
fn test_qualified_marker_ignores_foreign_annotation() {
    let mut h = TestHarness::new().with_config(RuleConfig {
        marker_library: Some("package:throws/throws.dart".to_string()),
        ..RuleConfig::default()
    });
    let format = h.kind("FormatException");
    let ours = h.annotated(
        "ours",
        DeclKind::Function,
        Annotation::new("Throws", Some(ConstValue::type_set(&[format])))
            .in_library("package:throws/throws.dart"),
    );
    let foreign = h.annotated(
        "foreign",
        DeclKind::Function,
        Annotation::new("Throws", Some(ConstValue::type_set(&[format])))
            .in_library("package:other/other.dart"),
    );
    let (ours_call, s1) = h.call_stmt("ours", ours);
    let (foreign_call, s2) = h.call_stmt("foreign", foreign);

    let result = h.check(vec![s1, s2]);
    assert!(result.is_flagged(ours_call));
    assert!(!result.is_flagged(foreign_call));
}

#[test]
fn test_verdicts_independent_of_evaluation_order() {
    let mut h = TestHarness::new();
    let f = h.throwing("f", DeclKind::Function, &["FormatException"]);
    let g = h.throwing("g", DeclKind::Function, &["StateError"]);
    let (c1, s1) = h.call_stmt("f", f);
    let (c2, s2) = h.call_stmt("g", g);
    let region = h.try_with(vec![s1, s2], &[Some("FormatException")]);
    let (c3, s3) = h.call_stmt("f", f);

    let result = h.check(vec![region, s3]);
    let obligations = [
        (c1, h_kinds(&result.types, &["FormatException"])),
        (c2, h_kinds(&result.types, &["StateError"])),
        (c3, h_kinds(&result.types, &["FormatException"])),
    ];

    let forward: Vec<bool> = obligations
        .iter()
        .map(|(c, k)| result.coverage(*c, k).is_covered())
        .collect();
    let mut backward: Vec<bool> = obligations
        .iter()
        .rev()
        .map(|(c, k)| result.coverage(*c, k).is_covered())
        .collect();
    backward.reverse();

    assert_eq!(forward, vec![true, false, false]);
    assert_eq!(forward, backward);

    let again = check_tree(&result.tree, &result.declarations, &result.types, &result.config);
    assert_eq!(again, result.findings);
}

/// Host oracle that only knows names and one flat supertype per type.
struct FlatHierarchy {
    names: Vec<&'static str>,
    parent: Vec<Option<u32>>,
}

impl TypeHierarchy for FlatHierarchy {
    fn type_name(&self, ty: TypeId) -> Option<&str> {
        self.names.get(ty.0 as usize).copied()
    }

    fn all_supertypes(&self, ty: TypeId) -> Vec<TypeId> {
        let mut out = Vec::new();
        let mut current = self.parent.get(ty.0 as usize).copied().flatten();
        while let Some(p) = current {
            if out.contains(&TypeId(p)) {
                break;
            }
            out.push(TypeId(p));
            current = self.parent.get(p as usize).copied().flatten();
        }
        out
    }
}

#[test]
fn test_host_oracle_name_based_matching() {
    // Two unrelated definitions named `ParseError`: matched by name.
    let oracle = FlatHierarchy {
        names: vec!["Object", "ParseError", "ParseError", "Timeout"],
        parent: vec![None, Some(0), Some(0), Some(0)],
    };
    let config = RuleConfig {
        broad_kinds: vec![],
        ..RuleConfig::default()
    };
    let empty = throwcheck_ast::SyntaxTree::new();
    let decls = throwcheck_ast::DeclTable::new();
    let checker = CoverageChecker::new(&empty, &decls, &oracle, &config);

    assert!(checker.can_handle(TypeId(2), TypeId(1)));
    assert!(checker.can_handle(TypeId(0), TypeId(3)));
    assert!(!checker.can_handle(TypeId(3), TypeId(1)));
    assert!(!checker.can_handle(TypeId(9), TypeId(1)));
}

fn h_kinds(types: &throwcheck_ast::TypeTable, names: &[&str]) -> ObligationSet {
    names.iter().filter_map(|n| types.lookup(n)).collect()
}
