//! Rewriting traversal built on the same dispatch rule as [crate::visit].
//!
//! A [Transformer] walks a tree and uses handler return values to replace
//! nodes in a new copy of the tree. The default behavior is always "rebuild
//! with rewritten children": an empty transformer applied to any tree yields
//! a value-equal tree in which every node carries a fresh identity.
//! Preserving identity for a subtree is an explicit opt-out via
//! [Rewrite::Keep], never the default.
//!
//! A [Modifier] is the in-place sibling for mutable-flavor trees: it rewrites
//! field slots of the visited nodes directly instead of reconstructing them.

use crate::error::IrError;
use crate::ir::FieldKind;
use crate::ir::FieldValue;
use crate::ir::Flavor;
use crate::ir::Node;
use crate::ir::Schema;
use crate::visit::Registry;
use std::sync::Arc;
use tracing::trace;

/// Outcome of rewriting a single node.
pub enum Rewrite {
    /// Replace the node with a new one.
    One(Node),
    /// Replace the node with zero or more nodes. Only honored inside
    /// node-sequence fields (and supports removal and flattening there).
    Many(Vec<Node>),
    /// Drop the node. Only honored for optional-node fields and sequence
    /// elements.
    Remove,
    /// Keep the original node, identity included.
    Keep,
}

pub type RewriteFn<C> = Box<dyn Fn(&Transformer<C>, &Node, &mut C) -> Result<Rewrite, IrError>>;

/// The rewriting engine. Produces new trees; never mutates its input.
pub struct Transformer<C> {
    handlers: Registry<RewriteFn<C>>,
}

impl<C> Transformer<C> {
    pub fn new() -> Self {
        Self {
            handlers: Registry::new(),
        }
    }
    /// Register a rewrite handler for `schema` and its descendants, under
    /// the ancestor-chain dispatch rule.
    pub fn on<F>(&mut self, schema: &Arc<Schema>, handler: F) -> Result<&mut Self, IrError>
    where
        F: Fn(&Transformer<C>, &Node, &mut C) -> Result<Rewrite, IrError> + 'static,
    {
        self.handlers
            .insert(schema.as_ref(), "rewrite handler", Box::new(handler))?;
        Ok(self)
    }
    /// Rewrite `node`, dispatching to the most specific handler or falling
    /// back to [Transformer::rebuild].
    pub fn rewrite(&self, node: &Node, ctx: &mut C) -> Result<Rewrite, IrError> {
        trace!("rewriting {}{}", node.kind(), node.id());
        if let Some(handler) = self.handlers.resolve(node.schema()) {
            return handler(self, node, ctx);
        }
        self.rebuild(node, ctx)
    }
    /// Reconstruct `node` with recursively rewritten children.
    ///
    /// The rebuilt node goes through regular construction, so it carries a
    /// fresh identity and is re-validated against the schema; a handler that
    /// produced a child of the wrong shape fails here. The source location
    /// is carried over so diagnostics survive rewrites.
    pub fn rebuild(&self, node: &Node, ctx: &mut C) -> Result<Rewrite, IrError> {
        let mut builder = Node::builder(node.schema());
        for (name, value) in node.fields() {
            match value {
                FieldValue::Scalar(scalar) => {
                    builder = builder.set(name, scalar.clone());
                }
                FieldValue::None => {}
                FieldValue::Node(child) => {
                    let kind = node
                        .schema()
                        .field(name)
                        .map(|decl| decl.kind())
                        .unwrap_or(FieldKind::Node);
                    match self.rewrite(child, ctx)? {
                        Rewrite::One(new) => builder = builder.set(name, new),
                        Rewrite::Keep => builder = builder.set(name, (**child).clone()),
                        Rewrite::Remove => {
                            if kind != FieldKind::OptionalNode {
                                return Err(IrError::dispatch(format!(
                                    "cannot remove required field `{name}` of `{}`",
                                    node.kind()
                                )));
                            }
                        }
                        Rewrite::Many(_) => {
                            return Err(IrError::dispatch(format!(
                                "handler returned multiple nodes for single-node \
                                 field `{name}` of `{}`",
                                node.kind()
                            )));
                        }
                    }
                }
                FieldValue::Nodes(children) => {
                    let mut out = Vec::with_capacity(children.len());
                    for child in children {
                        match self.rewrite(child, ctx)? {
                            Rewrite::One(new) => out.push(new),
                            Rewrite::Many(news) => out.extend(news),
                            Rewrite::Remove => {}
                            Rewrite::Keep => out.push(child.clone()),
                        }
                    }
                    builder = builder.set(name, out);
                }
            }
        }
        if let Some(location) = node.location() {
            builder = builder.location(location.clone());
        }
        Ok(Rewrite::One(builder.build()?))
    }
}

impl<C> Default for Transformer<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `transformer` to a whole tree and return the new root.
///
/// This is the uniform pass contract: the input tree is never mutated, and
/// the returned root carries a fresh identity unless every visited handler
/// explicitly chose [Rewrite::Keep] for its subtree. Value-equal trees with
/// different identities (a no-op pass) and the verbatim original (a
/// semantically null pass) are therefore distinct, observable outcomes.
pub fn apply<C>(transformer: &Transformer<C>, root: &Node, ctx: &mut C) -> Result<Node, IrError> {
    match transformer.rewrite(root, ctx)? {
        Rewrite::One(node) => Ok(node),
        Rewrite::Keep => Ok(root.clone()),
        Rewrite::Remove => Err(IrError::dispatch("the root of a tree cannot be removed")),
        Rewrite::Many(_) => Err(IrError::dispatch(
            "the root of a tree cannot be replaced by multiple nodes",
        )),
    }
}

/// A named tree-to-tree transformation.
///
/// Implementations wrap a [Transformer] (and whatever configuration the
/// rewrite needs) behind the uniform `apply` contract; the name is what the
/// pass pipeline dispatches on.
pub trait Pass {
    const NAME: &'static str;
    fn apply(&self, root: &Node) -> Result<Node, IrError>;
}

pub type ModifyFn<C> = Box<dyn Fn(&Modifier<C>, &mut Node, &mut C) -> Result<(), IrError>>;

/// The in-place rewriting engine for mutable-flavor trees.
///
/// Handlers mutate the visited node directly (or overwrite it wholesale via
/// `*node = replacement`) and recurse with [Modifier::modify_children].
/// Encountering an immutable variant under the default recursion is a
/// dispatch error: in-place mutation is only permitted when the flavor is
/// mutable, reconstruction is what [Transformer] is for.
pub struct Modifier<C> {
    handlers: Registry<ModifyFn<C>>,
}

impl<C> Modifier<C> {
    pub fn new() -> Self {
        Self {
            handlers: Registry::new(),
        }
    }
    pub fn on<F>(&mut self, schema: &Arc<Schema>, handler: F) -> Result<&mut Self, IrError>
    where
        F: Fn(&Modifier<C>, &mut Node, &mut C) -> Result<(), IrError> + 'static,
    {
        self.handlers
            .insert(schema.as_ref(), "modify handler", Box::new(handler))?;
        Ok(self)
    }
    pub fn modify(&self, node: &mut Node, ctx: &mut C) -> Result<(), IrError> {
        if let Some(handler) = self.handlers.resolve(node.schema()) {
            return handler(self, node, ctx);
        }
        self.modify_children(node, ctx)
    }
    /// Recurse into every child slot of a mutable node, in declaration
    /// order.
    pub fn modify_children(&self, node: &mut Node, ctx: &mut C) -> Result<(), IrError> {
        if node.flavor() == Flavor::Immutable {
            return Err(IrError::dispatch(format!(
                "cannot modify immutable variant `{}` in place",
                node.kind()
            )));
        }
        for value in node.values_mut() {
            match value {
                FieldValue::Node(child) => {
                    self.modify(child, ctx)?;
                }
                FieldValue::Nodes(children) => {
                    for child in children {
                        self.modify(child, ctx)?;
                    }
                }
                FieldValue::Scalar(_) | FieldValue::None => {}
            }
        }
        Ok(())
    }
}

impl<C> Default for Modifier<C> {
    fn default() -> Self {
        Self::new()
    }
}
