use crate::error::IrError;
use crate::ir::FieldKind;
use crate::ir::Flavor;
use crate::ir::Schema;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Process-wide identity allocator. Monotonically increasing, never reset,
/// safe under concurrent construction of independent trees.
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// The unique identity of a node within the process lifetime.
///
/// Identities are assigned at construction and are never user-settable. They
/// are excluded from value equality and hashing: two nodes can be equal in
/// value while carrying different identities, which is exactly what a no-op
/// rewrite pass produces.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(u64);

impl NodeId {
    fn fresh() -> NodeId {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A leaf value of the tree.
///
/// `Enum` carries a symbolic token (e.g. an operator name) that code
/// generation maps to a source literal via the scalar stringification hook.
#[derive(Clone, Debug)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Enum(String),
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            // Bit equality keeps this consistent with hashing, NaN included.
            (Scalar::Float(a), Scalar::Float(b)) => a.to_bits() == b.to_bits(),
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            (Scalar::Enum(a), Scalar::Enum(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Scalar::Bool(b) => b.hash(state),
            Scalar::Int(i) => i.hash(state),
            Scalar::Float(x) => x.to_bits().hash(state),
            Scalar::Str(s) => s.hash(state),
            Scalar::Enum(s) => s.hash(state),
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x:?}"),
            Scalar::Str(s) => write!(f, "{s}"),
            Scalar::Enum(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Scalar {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Scalar {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Scalar {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Scalar {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Scalar {
        Scalar::Str(value)
    }
}

/// The value stored in one field slot of a node.
///
/// `None` stands for an absent optional field; validation maps it against
/// the declared [FieldKind] at construction time.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum FieldValue {
    Scalar(Scalar),
    Node(Box<Node>),
    Nodes(Vec<Node>),
    None,
}

impl From<Scalar> for FieldValue {
    fn from(value: Scalar) -> FieldValue {
        FieldValue::Scalar(value)
    }
}

impl From<Node> for FieldValue {
    fn from(value: Node) -> FieldValue {
        FieldValue::Node(Box::new(value))
    }
}

impl From<Option<Node>> for FieldValue {
    fn from(value: Option<Node>) -> FieldValue {
        match value {
            Some(node) => FieldValue::Node(Box::new(node)),
            None => FieldValue::None,
        }
    }
}

impl From<Vec<Node>> for FieldValue {
    fn from(value: Vec<Node>) -> FieldValue {
        FieldValue::Nodes(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> FieldValue {
        FieldValue::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> FieldValue {
        FieldValue::Scalar(Scalar::Int(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> FieldValue {
        FieldValue::Scalar(Scalar::Float(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> FieldValue {
        FieldValue::Scalar(Scalar::Str(value.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> FieldValue {
        FieldValue::Scalar(Scalar::Str(value))
    }
}

/// A position in the source text, carried for diagnostics.
///
/// Presence is per-node and never participates in value equality, so a
/// rewrite that only moves a node around does not make trees unequal.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct SourceLocation {
    source: String,
    line: u32,
    column: u32,
}

impl SourceLocation {
    pub fn new(source: &str, line: u32, column: u32) -> Self {
        Self {
            source: source.to_string(),
            line,
            column,
        }
    }
    pub fn source(&self) -> &str {
        &self.source
    }
    pub fn line(&self) -> u32 {
        self.line
    }
    pub fn column(&self) -> u32 {
        self.column
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)
    }
}

/// A typed, uniquely identified element of the IR tree.
///
/// A node stores its field values in the order its [Schema] declares them.
/// Two nodes are value-equal iff they have the same concrete variant and all
/// declared field values are pairwise equal, recursively; identity and the
/// source location are excluded. Cloning a node is a verbatim copy that
/// keeps the identity, which is how "the literal same instance" is expressed
/// with owned values. Fresh identities only come from construction.
#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    schema: Arc<Schema>,
    values: Vec<FieldValue>,
    location: Option<SourceLocation>,
}

impl Node {
    /// Start keyword-style construction of an instance of `schema`.
    pub fn builder(schema: &Arc<Schema>) -> NodeBuilder {
        NodeBuilder {
            schema: schema.clone(),
            supplied: vec![],
            location: None,
        }
    }
    pub fn id(&self) -> NodeId {
        self.id
    }
    /// The concrete variant name, derived from the schema.
    pub fn kind(&self) -> &str {
        self.schema.name()
    }
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
    pub fn flavor(&self) -> Flavor {
        self.schema.flavor()
    }
    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        let index = self.schema.field_index(name)?;
        Some(&self.values[index])
    }
    /// Declared fields with their values, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.schema
            .fields()
            .iter()
            .map(|decl| decl.name())
            .zip(self.values.iter())
    }
    /// Child nodes in field-declaration order, sequence elements in
    /// sequence order. This is the traversal order of the engines.
    pub fn children(&self) -> Vec<&Node> {
        let mut out = vec![];
        for value in &self.values {
            match value {
                FieldValue::Node(child) => out.push(child.as_ref()),
                FieldValue::Nodes(children) => out.extend(children.iter()),
                FieldValue::Scalar(_) | FieldValue::None => {}
            }
        }
        out
    }
    /// The scalar stored in `name`, if the field holds one.
    pub fn scalar(&self, name: &str) -> Option<&Scalar> {
        match self.field(name)? {
            FieldValue::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }
    /// The child node stored in `name`, if the field holds one.
    pub fn node(&self, name: &str) -> Option<&Node> {
        match self.field(name)? {
            FieldValue::Node(node) => Some(node),
            _ => None,
        }
    }
    /// The node sequence stored in `name`, if the field holds one.
    pub fn nodes(&self, name: &str) -> Option<&[Node]> {
        match self.field(name)? {
            FieldValue::Nodes(nodes) => Some(nodes),
            _ => None,
        }
    }
    /// Reassign a field in place. Only permitted for mutable-flavor
    /// variants; the new value must fit the declared field kind.
    pub fn set_field(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), IrError> {
        if self.schema.flavor() == Flavor::Immutable {
            return Err(IrError::validation(
                self.kind(),
                name,
                "variant is immutable, fields cannot be reassigned",
            ));
        }
        let index = match self.schema.field_index(name) {
            Some(index) => index,
            None => {
                return Err(IrError::validation(
                    self.kind(),
                    name,
                    "not a declared field",
                ));
            }
        };
        let value = value.into();
        let decl = &self.schema.fields()[index];
        if let Err(message) = check_field_value(decl.kind(), &value) {
            return Err(IrError::validation(self.kind(), name, message));
        }
        self.values[index] = value;
        Ok(())
    }
    pub fn set_location(&mut self, location: Option<SourceLocation>) {
        self.location = location;
    }
    /// Mutable access to the field slots for the in-place engine. Callers
    /// must have checked the flavor.
    pub(crate) fn values_mut(&mut self) -> &mut Vec<FieldValue> {
        &mut self.values
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        // Same variant means the same schema, or an equivalent declaration:
        // a shared name alone is not enough, the field lists must agree too.
        let same_variant = Arc::ptr_eq(&self.schema, &other.schema)
            || (self.schema.name() == other.schema.name()
                && self.schema.fields() == other.schema.fields());
        same_variant && self.values == other.values
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.schema.name().hash(state);
        self.values.hash(state);
    }
}

fn check_field_value(kind: FieldKind, value: &FieldValue) -> Result<(), String> {
    let fits = match kind {
        FieldKind::Scalar => matches!(value, FieldValue::Scalar(_)),
        FieldKind::OptionalScalar => {
            matches!(value, FieldValue::Scalar(_) | FieldValue::None)
        }
        FieldKind::Node => matches!(value, FieldValue::Node(_)),
        FieldKind::OptionalNode => matches!(value, FieldValue::Node(_) | FieldValue::None),
        FieldKind::NodeSequence => matches!(value, FieldValue::Nodes(_)),
    };
    if fits {
        Ok(())
    } else {
        Err(format!("value does not fit the declared {kind} field"))
    }
}

/// Keyword-style construction of a node.
///
/// Field assignment is by name only; positional construction does not exist,
/// so field order can never be confused. `build` validates the supplied
/// values against the schema exactly: unknown, duplicated, or ill-typed
/// fields and missing required fields all fail with
/// [IrError::Validation] naming the offending field, and no instance is
/// constructed.
pub struct NodeBuilder {
    schema: Arc<Schema>,
    supplied: Vec<(String, FieldValue)>,
    location: Option<SourceLocation>,
}

impl NodeBuilder {
    pub fn set(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.supplied.push((name.to_string(), value.into()));
        self
    }
    pub fn location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
    pub fn build(self) -> Result<Node, IrError> {
        let schema = self.schema;
        if schema.is_abstract() {
            return Err(IrError::dispatch(format!(
                "variant `{}` is abstract and cannot be constructed",
                schema.name()
            )));
        }
        for (index, (name, _)) in self.supplied.iter().enumerate() {
            if schema.field(name).is_none() {
                return Err(IrError::validation(
                    schema.name(),
                    name,
                    "not a declared field",
                ));
            }
            let duplicate = self.supplied[..index].iter().any(|(n, _)| n == name);
            if duplicate {
                return Err(IrError::validation(
                    schema.name(),
                    name,
                    "field supplied more than once",
                ));
            }
        }
        let mut supplied = self.supplied;
        let mut values = Vec::with_capacity(schema.fields().len());
        for decl in schema.fields() {
            let found = supplied.iter().position(|(name, _)| name == decl.name());
            let value = match found {
                Some(index) => supplied.remove(index).1,
                None => match decl.kind() {
                    FieldKind::OptionalScalar | FieldKind::OptionalNode => FieldValue::None,
                    _ => {
                        return Err(IrError::validation(
                            schema.name(),
                            decl.name(),
                            "required field is missing",
                        ));
                    }
                },
            };
            if let Err(message) = check_field_value(decl.kind(), &value) {
                return Err(IrError::validation(schema.name(), decl.name(), message));
            }
            values.push(value);
        }
        Ok(Node {
            id: NodeId::fresh(),
            schema,
            values,
            location: self.location,
        })
    }
}
