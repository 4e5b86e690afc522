use crate::error::IrError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

/// Whether fields of a variant may be reassigned after construction.
///
/// The flavor is a property of the variant, not of individual trees: every
/// instance of an immutable variant keeps its fields for life, and any
/// "modification" of such a node has to go through reconstruction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flavor {
    Mutable,
    Immutable,
}

/// The shape of a single declared field.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FieldKind {
    /// A required scalar value.
    Scalar,
    /// A scalar value that may be absent.
    OptionalScalar,
    /// A required child node.
    Node,
    /// A child node that may be absent.
    OptionalNode,
    /// An ordered sequence of child nodes (possibly empty).
    NodeSequence,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            FieldKind::Scalar => "scalar",
            FieldKind::OptionalScalar => "optional scalar",
            FieldKind::Node => "node",
            FieldKind::OptionalNode => "optional node",
            FieldKind::NodeSequence => "node sequence",
        };
        write!(f, "{text}")
    }
}

/// A single (name, kind) pair in a variant's declared field list.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FieldDecl {
    name: String,
    kind: FieldKind,
}

impl FieldDecl {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

/// The descriptor of a concrete variant: its name, flavor, ordered field
/// declarations, and an optional parent used for ancestor-chain dispatch.
///
/// Schemas are the declaration interface of the toolkit. A dialect author
/// defines one schema per variant and shares it behind an [Arc]; every node
/// of that variant points back to the schema, which is what keeps `kind`
/// derived instead of user-settable.
#[derive(Debug)]
pub struct Schema {
    name: String,
    flavor: Flavor,
    fields: Vec<FieldDecl>,
    parent: Option<Arc<Schema>>,
    abstract_only: bool,
}

impl Schema {
    /// Start declaring a new variant with the given name.
    pub fn define(name: &str) -> SchemaBuilder {
        SchemaBuilder {
            name: name.to_string(),
            flavor: Flavor::Mutable,
            fields: vec![],
            parent: None,
            abstract_only: false,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn flavor(&self) -> Flavor {
        self.flavor
    }
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }
    pub fn parent(&self) -> Option<&Arc<Schema>> {
        self.parent.as_ref()
    }
    /// Whether this variant exists only to anchor dispatch and cannot be
    /// constructed.
    pub fn is_abstract(&self) -> bool {
        self.abstract_only
    }
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|decl| decl.name == name)
    }
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|decl| decl.name == name)
    }
    /// The variant itself followed by its declared ancestors, in dispatch
    /// order. The first registered entry along this chain wins.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            current: Some(self),
        }
    }
    /// Whether `name` is this variant or one of its declared ancestors.
    pub fn has_ancestor(&self, name: &str) -> bool {
        self.ancestors().any(|schema| schema.name == name)
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Iterator over a variant and its declared ancestors.
pub struct Ancestors<'a> {
    current: Option<&'a Schema>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Schema;
    fn next(&mut self) -> Option<&'a Schema> {
        let current = self.current?;
        self.current = current.parent.as_deref();
        Some(current)
    }
}

/// Builder returned by [Schema::define].
pub struct SchemaBuilder {
    name: String,
    flavor: Flavor,
    fields: Vec<FieldDecl>,
    parent: Option<Arc<Schema>>,
    abstract_only: bool,
}

impl SchemaBuilder {
    /// Declare a field. Declaration order is the traversal order.
    pub fn field(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.push(FieldDecl {
            name: name.to_string(),
            kind,
        });
        self
    }
    /// Set the parent variant in the ancestor chain.
    pub fn parent(mut self, parent: &Arc<Schema>) -> Self {
        self.parent = Some(parent.clone());
        self
    }
    pub fn flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }
    pub fn immutable(mut self) -> Self {
        self.flavor = Flavor::Immutable;
        self
    }
    /// Mark the variant as non-instantiable. Abstract variants anchor
    /// handler registrations for whole families of variants.
    pub fn abstract_only(mut self) -> Self {
        self.abstract_only = true;
        self
    }
    pub fn finish(self) -> Result<Arc<Schema>, IrError> {
        for (index, decl) in self.fields.iter().enumerate() {
            let duplicate = self.fields[..index].iter().any(|d| d.name == decl.name);
            if duplicate {
                return Err(IrError::dispatch(format!(
                    "field `{}` declared twice on variant `{}`",
                    decl.name, self.name
                )));
            }
        }
        Ok(Arc::new(Schema {
            name: self.name,
            flavor: self.flavor,
            fields: self.fields,
            parent: self.parent,
            abstract_only: self.abstract_only,
        }))
    }
}
