//! Shared fixtures for the integration tests.
//!
//! A small expression dialect that exercises every field kind and both
//! flavors: an abstract `Expr` family with immutable `Literal`, `BinaryOp`,
//! `Call`, and `Var` variants, plus a mutable `Program` root.

use crate::dialect::Dialect;
use crate::ir::FieldKind;
use crate::ir::Node;
use crate::ir::Scalar;
use crate::ir::Schema;
use std::sync::Arc;

pub struct ExprDialect {
    pub expr: Arc<Schema>,
    pub literal: Arc<Schema>,
    pub binary_op: Arc<Schema>,
    pub call: Arc<Schema>,
    pub var: Arc<Schema>,
    pub program: Arc<Schema>,
}

impl ExprDialect {
    pub fn new() -> Self {
        let expr = Schema::define("Expr").abstract_only().finish().unwrap();
        let literal = Schema::define("Literal")
            .parent(&expr)
            .field("value", FieldKind::Scalar)
            .immutable()
            .finish()
            .unwrap();
        let binary_op = Schema::define("BinaryOp")
            .parent(&expr)
            .field("left", FieldKind::Node)
            .field("op", FieldKind::Scalar)
            .field("right", FieldKind::Node)
            .immutable()
            .finish()
            .unwrap();
        let call = Schema::define("Call")
            .parent(&expr)
            .field("name", FieldKind::Scalar)
            .field("args", FieldKind::NodeSequence)
            .immutable()
            .finish()
            .unwrap();
        let var = Schema::define("Var")
            .parent(&expr)
            .field("name", FieldKind::Scalar)
            .field("init", FieldKind::OptionalNode)
            .immutable()
            .finish()
            .unwrap();
        let program = Schema::define("Program")
            .field("body", FieldKind::NodeSequence)
            .finish()
            .unwrap();
        Self {
            expr,
            literal,
            binary_op,
            call,
            var,
            program,
        }
    }
    /// The dialect containing every variant of the fixture.
    pub fn dialect(&self) -> Dialect {
        Dialect::new("expr")
            .with_member(&self.literal)
            .with_member(&self.binary_op)
            .with_member(&self.call)
            .with_member(&self.var)
            .with_member(&self.program)
    }
    pub fn literal(&self, value: i64) -> Node {
        Node::builder(&self.literal).set("value", value).build().unwrap()
    }
    pub fn binary(&self, left: Node, op: &str, right: Node) -> Node {
        Node::builder(&self.binary_op)
            .set("left", left)
            .set("op", Scalar::Enum(op.to_string()))
            .set("right", right)
            .build()
            .unwrap()
    }
    pub fn call(&self, name: &str, args: Vec<Node>) -> Node {
        Node::builder(&self.call)
            .set("name", name)
            .set("args", args)
            .build()
            .unwrap()
    }
    pub fn program(&self, body: Vec<Node>) -> Node {
        Node::builder(&self.program).set("body", body).build().unwrap()
    }
}

impl Default for ExprDialect {
    fn default() -> Self {
        Self::new()
    }
}
