extern crate irkit;

use irkit::dialect::CheckMode;
use irkit::dialect::Dialect;
use irkit::dialect::DialectChecker;
use irkit::dialect::Membership;
use irkit::ir::FieldKind;
use irkit::ir::Node;
use irkit::ir::Schema;
use irkit::tester::ExprDialect;
use irkit::visit::PathItem;
use std::sync::Arc;

fn alien_schema() -> Arc<Schema> {
    Schema::define("Alien")
        .field("child", FieldKind::OptionalNode)
        .finish()
        .unwrap()
}

fn alien(child: Option<Node>) -> Node {
    Node::builder(&alien_schema())
        .set("child", child)
        .build()
        .unwrap()
}

#[test]
fn conformant_tree() {
    let d = ExprDialect::new();
    let tree = d.program(vec![
        d.binary(d.literal(1), "+", d.literal(2)),
        d.call("f", vec![d.literal(3)]),
    ]);
    let report = DialectChecker::new(d.dialect()).check(&tree).unwrap();
    assert!(report.is_conformant());
    assert!(report.violations().is_empty());
}

#[test]
fn one_foreign_node_breaks_conformance() {
    let d = ExprDialect::new();
    let tree = d.program(vec![d.literal(1), alien(None)]);
    let report = DialectChecker::new(d.dialect()).check(&tree).unwrap();
    assert!(!report.is_conformant());
    assert_eq!(report.violations().len(), 1);
    assert_eq!(report.violations()[0].kind, "Alien");
}

#[test]
fn violating_subtrees_are_not_explored() {
    let d = ExprDialect::new();
    // An alien containing another alien: only the outer one is reported.
    let tree = d.program(vec![alien(Some(alien(None)))]);
    let report = DialectChecker::new(d.dialect()).check(&tree).unwrap();
    assert_eq!(report.violations().len(), 1);
}

#[test]
fn first_violation_mode_stops_the_check() {
    let d = ExprDialect::new();
    let tree = d.program(vec![alien(None), alien(None)]);
    let report = DialectChecker::new(d.dialect())
        .mode(CheckMode::FirstViolation)
        .check(&tree)
        .unwrap();
    assert_eq!(report.violations().len(), 1);
}

#[test]
fn all_violations_mode_enumerates_siblings() {
    let d = ExprDialect::new();
    let tree = d.program(vec![alien(None), d.literal(1), alien(None)]);
    let report = DialectChecker::new(d.dialect()).check(&tree).unwrap();
    assert_eq!(report.violations().len(), 2);
}

#[test]
fn violations_carry_the_path_to_the_node() {
    let d = ExprDialect::new();
    let tree = d.program(vec![
        d.literal(1),
        d.binary(alien(None), "+", d.literal(2)),
    ]);
    let report = DialectChecker::new(d.dialect()).check(&tree).unwrap();
    assert_eq!(report.violations().len(), 1);
    let violation = &report.violations()[0];
    assert_eq!(
        violation.path,
        vec![
            PathItem::Index("body".to_string(), 1),
            PathItem::Field("left".to_string()),
        ]
    );
    assert_eq!(violation.path_display(), "body[1].left");
}

#[test]
fn a_violating_root_has_an_empty_path() {
    let d = ExprDialect::new();
    let report = DialectChecker::new(d.dialect()).check(&alien(None)).unwrap();
    assert!(report.violations()[0].path.is_empty());
    assert_eq!(report.violations()[0].path_display(), "<root>");
}

#[test]
fn descendant_membership_accepts_the_whole_family() {
    let d = ExprDialect::new();
    let family = Dialect::new("expr-family")
        .with_member(&d.expr)
        .with_member(&d.program);
    let tree = d.program(vec![d.binary(d.literal(1), "+", d.literal(2))]);

    // Exact membership rejects the concrete variants.
    let report = DialectChecker::new(family.clone()).check(&tree).unwrap();
    assert!(!report.is_conformant());

    // Descendant-inclusive membership accepts them via the Expr ancestor.
    let report = DialectChecker::new(family)
        .membership(Membership::IncludeDescendants)
        .check(&tree)
        .unwrap();
    assert!(report.is_conformant());
}
