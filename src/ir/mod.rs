//! The tree data model of the toolkit.
//!
//! A dialect author declares one [Schema] per variant and builds trees of
//! [Node]s from them. Everything else in the crate (visitors, rewriting,
//! dialect checking, code generation) consumes this model.

mod node;
mod schema;

pub use node::FieldValue;
pub use node::Node;
pub use node::NodeBuilder;
pub use node::NodeId;
pub use node::Scalar;
pub use node::SourceLocation;
pub use schema::Ancestors;
pub use schema::FieldDecl;
pub use schema::FieldKind;
pub use schema::Flavor;
pub use schema::Schema;
pub use schema::SchemaBuilder;
