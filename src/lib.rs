//! irkit is a set of tools to build the intermediate representation (IR) of
//! your own compiler.
//!
//! Say you want to write a compiler for a small domain-specific language.
//! Doing the later stages via string manipulation gets painful quickly, so
//! compilers work on an IR: a tree of typed nodes with common methods to
//! interact with the code. This crate supplies the reusable machinery that
//! such a toolchain is assembled from:
//!
//! - a tree data model ([ir]) with declared variants, keyword-style
//!   validated construction, and a strict separation between value equality
//!   and node identity,
//! - a read-only traversal engine ([visit]) that dispatches each node to the
//!   most specific handler registered along its declared ancestor chain,
//! - a rewriting engine ([rewrite]) whose default behavior clones a tree
//!   with rewritten children, so passes never mutate their input by
//!   accident,
//! - a dialect-membership checker ([dialect]) for verifying that a tree only
//!   uses a declared sub-language of the IR,
//! - a template-based code generator ([codegen]) that renders a tree to
//!   source text bottom-up and can hand the result to an external formatter.
//!
//! Concrete languages are built on top: declare a [ir::Schema] per variant,
//! build trees, and express your lowering steps as passes. The pipeline
//! helpers ([Passes], [run_passes]) give a downstream compiler binary the
//! usual `--my-pass` command-line surface.
//!
//! The engines are single-threaded and synchronous: traversal, rewriting,
//! checking, and rendering are ordinary call/return recursion over an
//! in-memory tree. Trees are handed between passes by value. Identity
//! allocation is atomic, so independent trees can be built concurrently.

pub mod codegen;
pub mod dialect;
mod error;
pub mod ir;
pub mod rewrite;
#[cfg(feature = "test-utils")]
pub mod tester;
mod transform;
pub mod visit;

pub use error::IrError;
pub use transform::init_subscriber;
pub use transform::pass_arguments;
pub use transform::run_passes;
pub use transform::PassDispatch;
pub use transform::Passes;
pub use transform::SinglePass;
