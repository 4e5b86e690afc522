//! Read-only traversal with ancestor-chain dispatch.
//!
//! A [Visitor] walks a tree and calls, for every node, the most specific
//! handler registered for the node's variant: the variant itself first, then
//! its declared ancestors in order. When nothing along the chain matches,
//! the built-in generic behavior recurses into every child field in
//! declaration order. Handlers thread a caller-supplied context value down
//! the recursion and may return a result, which `visit` forwards.

use crate::error::IrError;
use crate::ir::FieldValue;
use crate::ir::Node;
use crate::ir::Schema;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A registry keyed by variant name with ancestor-chain lookup.
///
/// All three engines (visitor, transformer, code generator) resolve entries
/// with the same rule, so they share this one implementation.
pub(crate) struct Registry<T> {
    entries: HashMap<String, T>,
}

impl<T> Registry<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
    pub(crate) fn insert(&mut self, schema: &Schema, what: &str, entry: T) -> Result<(), IrError> {
        if self.entries.contains_key(schema.name()) {
            return Err(IrError::dispatch(format!(
                "a {what} is already registered for variant `{}`",
                schema.name()
            )));
        }
        self.entries.insert(schema.name().to_string(), entry);
        Ok(())
    }
    /// The first registered entry along the ancestor chain of `schema`.
    pub(crate) fn resolve(&self, schema: &Schema) -> Option<&T> {
        schema
            .ancestors()
            .find_map(|ancestor| self.entries.get(ancestor.name()))
    }
}

/// One step from a node down to one of its children.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum PathItem {
    /// A single-node field.
    Field(String),
    /// An element of a node-sequence field.
    Index(String, usize),
}

impl fmt::Display for PathItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathItem::Field(name) => write!(f, "{name}"),
            PathItem::Index(name, index) => write!(f, "{name}[{index}]"),
        }
    }
}

/// The field path from a traversal root down to a node. Empty for the root
/// itself.
pub type Path = Vec<PathItem>;

/// The node-valued children of `node` together with the step leading to
/// each, in declaration order.
///
/// This is the primitive for path-tracking traversals: push the step,
/// recurse into the child, pop the step.
pub fn child_steps(node: &Node) -> Vec<(PathItem, &Node)> {
    let mut steps = vec![];
    for (name, value) in node.fields() {
        match value {
            FieldValue::Node(child) => {
                steps.push((PathItem::Field(name.to_string()), child.as_ref()));
            }
            FieldValue::Nodes(children) => {
                for (index, child) in children.iter().enumerate() {
                    steps.push((PathItem::Index(name.to_string(), index), child));
                }
            }
            FieldValue::Scalar(_) | FieldValue::None => {}
        }
    }
    steps
}

pub type VisitFn<C, R> = Box<dyn Fn(&Visitor<C, R>, &Node, &mut C) -> Result<R, IrError>>;

/// The read-only traversal engine.
///
/// `C` is the context threaded through the recursion (accumulators, scope
/// info); `R` is the handler result type and defaults to `()`.
///
/// Handlers receive the visitor itself so they can recurse explicitly via
/// [Visitor::visit] or [Visitor::visit_children]. A handler that does not
/// recurse prunes the subtree below its node.
pub struct Visitor<C, R = ()> {
    handlers: Registry<VisitFn<C, R>>,
    fallback: Option<VisitFn<C, R>>,
}

impl<C, R: Default> Visitor<C, R> {
    pub fn new() -> Self {
        Self {
            handlers: Registry::new(),
            fallback: None,
        }
    }
    /// Register a handler for `schema`. The handler also fires for any
    /// descendant variant without a more specific registration.
    ///
    /// Registering two handlers for the same variant is a dispatch error.
    pub fn on<F>(&mut self, schema: &Arc<Schema>, handler: F) -> Result<&mut Self, IrError>
    where
        F: Fn(&Visitor<C, R>, &Node, &mut C) -> Result<R, IrError> + 'static,
    {
        self.handlers
            .insert(schema.as_ref(), "handler", Box::new(handler))?;
        Ok(self)
    }
    /// Replace the generic behavior that runs when no registered handler
    /// matches. The default recurses into children and returns
    /// `R::default()`; a fallback sees every unhandled node instead, which
    /// is how specializations such as the dialect checker intercept the
    /// whole tree.
    pub fn fallback<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&Visitor<C, R>, &Node, &mut C) -> Result<R, IrError> + 'static,
    {
        self.fallback = Some(Box::new(handler));
        self
    }
    /// Visit `node`, dispatching to the most specific handler.
    ///
    /// Handler failures propagate to the caller unmodified; the engine never
    /// suppresses errors.
    pub fn visit(&self, node: &Node, ctx: &mut C) -> Result<R, IrError> {
        if let Some(handler) = self.handlers.resolve(node.schema()) {
            return handler(self, node, ctx);
        }
        if let Some(fallback) = &self.fallback {
            return fallback(self, node, ctx);
        }
        self.visit_children(node, ctx)?;
        Ok(R::default())
    }
    /// Pre-order recursion into every node-valued field, in declaration
    /// order; sequence elements in sequence order. Child results are
    /// discarded.
    pub fn visit_children(&self, node: &Node, ctx: &mut C) -> Result<(), IrError> {
        for (_, value) in node.fields() {
            match value {
                FieldValue::Node(child) => {
                    self.visit(child, ctx)?;
                }
                FieldValue::Nodes(children) => {
                    for child in children {
                        self.visit(child, ctx)?;
                    }
                }
                FieldValue::Scalar(_) | FieldValue::None => {}
            }
        }
        Ok(())
    }
}

impl<C, R: Default> Default for Visitor<C, R> {
    fn default() -> Self {
        Self::new()
    }
}
