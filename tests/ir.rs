extern crate irkit;

use irkit::ir::FieldValue;
use irkit::ir::Node;
use irkit::ir::Scalar;
use irkit::ir::SourceLocation;
use irkit::tester::ExprDialect;
use irkit::IrError;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

fn hash_of(node: &Node) -> u64 {
    let mut hasher = DefaultHasher::new();
    node.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn equality_excludes_identity() {
    let d = ExprDialect::new();
    let a = d.binary(d.literal(3), "+", d.literal(5));
    let b = d.binary(d.literal(3), "+", d.literal(5));
    assert_eq!(a, b);
    assert_ne!(a.id(), b.id());
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn equality_requires_same_variant() {
    let d = ExprDialect::new();
    let literal = d.literal(1);
    let call = d.call("f", vec![]);
    assert_ne!(literal, call);
}

#[test]
fn kind_is_derived_from_the_schema() {
    let d = ExprDialect::new();
    let node = d.literal(7);
    assert_eq!(node.kind(), "Literal");
    assert_eq!(node.schema().name(), "Literal");
}

#[test]
fn missing_required_field() {
    let d = ExprDialect::new();
    let result = Node::builder(&d.binary_op)
        .set("left", d.literal(1))
        .set("right", d.literal(2))
        .build();
    match result {
        Err(IrError::Validation { variant, field, .. }) => {
            assert_eq!(variant, "BinaryOp");
            assert_eq!(field, "op");
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn undeclared_field_is_rejected() {
    let d = ExprDialect::new();
    let result = Node::builder(&d.literal)
        .set("value", 1)
        .set("extra", 2)
        .build();
    match result {
        Err(IrError::Validation { field, .. }) => assert_eq!(field, "extra"),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn duplicated_field_is_rejected() {
    let d = ExprDialect::new();
    let result = Node::builder(&d.literal)
        .set("value", 1)
        .set("value", 2)
        .build();
    match result {
        Err(IrError::Validation { field, message, .. }) => {
            assert_eq!(field, "value");
            assert!(message.contains("more than once"));
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn field_kind_is_checked() {
    let d = ExprDialect::new();
    // A scalar where a node is required.
    let result = Node::builder(&d.binary_op)
        .set("left", 1)
        .set("op", Scalar::Enum("+".to_string()))
        .set("right", d.literal(2))
        .build();
    match result {
        Err(IrError::Validation { field, .. }) => assert_eq!(field, "left"),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn optional_field_defaults_to_absent() {
    let d = ExprDialect::new();
    let var = Node::builder(&d.var).set("name", "x").build().unwrap();
    assert_eq!(var.field("init"), Some(&FieldValue::None));
    assert!(var.node("init").is_none());
}

#[test]
fn abstract_variant_cannot_be_constructed() {
    let d = ExprDialect::new();
    let result = Node::builder(&d.expr).build();
    assert!(matches!(result, Err(IrError::Dispatch(_))));
}

#[test]
fn mutable_variant_allows_reassignment() {
    let d = ExprDialect::new();
    let mut program = d.program(vec![d.literal(1)]);
    program.set_field("body", vec![d.literal(2)]).unwrap();
    assert_eq!(program.nodes("body").unwrap().len(), 1);
    assert_eq!(program.nodes("body").unwrap()[0], d.literal(2));
}

#[test]
fn immutable_variant_rejects_reassignment() {
    let d = ExprDialect::new();
    let mut literal = d.literal(1);
    let result = literal.set_field("value", 2);
    match result {
        Err(IrError::Validation { message, .. }) => assert!(message.contains("immutable")),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn set_field_checks_the_declared_kind() {
    let d = ExprDialect::new();
    let mut program = d.program(vec![]);
    let result = program.set_field("body", 42);
    assert!(matches!(result, Err(IrError::Validation { .. })));
}

#[test]
fn location_is_excluded_from_equality() {
    let d = ExprDialect::new();
    let plain = d.literal(3);
    let located = Node::builder(&d.literal)
        .set("value", 3)
        .location(SourceLocation::new("demo.dsl", 4, 2))
        .build()
        .unwrap();
    assert_eq!(plain, located);
    assert_eq!(located.location().unwrap().line(), 4);
}

#[test]
fn children_follow_declaration_order() {
    let d = ExprDialect::new();
    let node = d.binary(d.literal(1), "+", d.literal(2));
    let values: Vec<i64> = node
        .children()
        .iter()
        .map(|child| match child.scalar("value") {
            Some(Scalar::Int(i)) => *i,
            _ => panic!("expected literals"),
        })
        .collect();
    assert_eq!(values, vec![1, 2]);
}
