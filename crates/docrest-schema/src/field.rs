use crate::{kind::FieldKind, types::Decimal, value::Value};
use std::{fmt, sync::Arc};

///
/// FieldDescriptor
///
/// One declared attribute of a document schema.
/// Descriptors are shared by `Arc` once registered and never mutated, so a
/// subclass that inherits a field holds the very same descriptor object.
///

#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<FieldDefault>,
    pub constraints: Constraints,
    pub primary_key: bool,
    pub target: FieldTarget,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            constraints: Constraints::default(),
            primary_key: false,
            target: FieldTarget::None,
        }
    }

    //
    // shorthand constructors
    //

    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    #[must_use]
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Int)
    }

    #[must_use]
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float)
    }

    #[must_use]
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    #[must_use]
    pub fn object_id(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::ObjectId)
    }

    #[must_use]
    pub fn dynamic(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Dynamic)
    }

    #[must_use]
    pub fn dict(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Dict)
    }

    #[must_use]
    pub fn reference(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Reference).with_target(FieldTarget::Schema(schema.into()))
    }

    #[must_use]
    pub fn embedded(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self::new(name, FieldKind::EmbeddedDocument)
            .with_target(FieldTarget::Schema(schema.into()))
    }

    /// List of `element`; the element takes the list's name.
    #[must_use]
    pub fn list(name: impl Into<String>, element: Self) -> Self {
        Self::container(name.into(), FieldKind::List, element)
    }

    /// String-keyed map of `element`; the element takes the map's name.
    #[must_use]
    pub fn map(name: impl Into<String>, element: Self) -> Self {
        Self::container(name.into(), FieldKind::Map, element)
    }

    fn container(name: String, kind: FieldKind, mut element: Self) -> Self {
        element.name.clone_from(&name);

        Self::new(name, kind).with_target(FieldTarget::Element(Arc::new(element)))
    }

    //
    // modifiers
    //

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.required = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(FieldDefault::Static(value.into()));
        self
    }

    #[must_use]
    pub fn default_with(mut self, factory: fn() -> Value) -> Self {
        self.default = Some(FieldDefault::Factory(factory));
        self
    }

    #[must_use]
    pub const fn max_length(mut self, n: usize) -> Self {
        self.constraints.max_length = Some(n);
        self
    }

    #[must_use]
    pub const fn min_length(mut self, n: usize) -> Self {
        self.constraints.min_length = Some(n);
        self
    }

    #[must_use]
    pub fn min_value(mut self, n: impl Into<Decimal>) -> Self {
        self.constraints.min_value = Some(n.into());
        self
    }

    #[must_use]
    pub fn max_value(mut self, n: impl Into<Decimal>) -> Self {
        self.constraints.max_value = Some(n.into());
        self
    }

    #[must_use]
    pub const fn max_bytes(mut self, n: usize) -> Self {
        self.constraints.max_bytes = Some(n);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: FieldTarget) -> Self {
        self.target = target;
        self
    }

    //
    // accessors
    //

    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Materialise the default, if one is declared.
    #[must_use]
    pub fn default_value_now(&self) -> Option<Value> {
        self.default.as_ref().map(FieldDefault::value)
    }

    /// Target schema name for reference and embedded kinds.
    #[must_use]
    pub fn target_schema(&self) -> Option<&str> {
        match &self.target {
            FieldTarget::Schema(name) => Some(name),
            _ => None,
        }
    }

    /// Element descriptor for list and map kinds.
    #[must_use]
    pub const fn element(&self) -> Option<&Arc<Self>> {
        match &self.target {
            FieldTarget::Element(el) => Some(el),
            _ => None,
        }
    }
}

///
/// FieldDefault
///

#[derive(Clone)]
pub enum FieldDefault {
    Static(Value),
    Factory(fn() -> Value),
}

impl FieldDefault {
    #[must_use]
    pub fn value(&self) -> Value {
        match self {
            Self::Static(v) => v.clone(),
            Self::Factory(f) => f(),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(v) => f.debug_tuple("Static").field(v).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

///
/// Constraints
/// kind-specific limits, each only present when declared
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Constraints {
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    pub min_value: Option<Decimal>,
    pub max_value: Option<Decimal>,
    pub max_bytes: Option<usize>,
}

///
/// FieldTarget
///
/// Schema → the referenced or embedded document schema, by name.
/// Element → the single element descriptor of a list or map.
///

#[derive(Clone, Debug, Default)]
pub enum FieldTarget {
    #[default]
    None,
    Schema(String),
    Element(Arc<FieldDescriptor>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_element_takes_container_name() {
        let field = FieldDescriptor::list("tags", FieldDescriptor::string("ignored"));

        assert_eq!(field.kind, FieldKind::List);
        assert_eq!(field.element().map(|e| e.name.as_str()), Some("tags"));
    }

    #[test]
    fn primary_key_implies_required() {
        let pk = FieldDescriptor::object_id("id").primary_key();

        assert!(pk.primary_key);
        assert!(pk.required);
    }

    #[test]
    fn factory_default_runs_each_time() {
        fn now() -> Value {
            Value::Int(3)
        }

        let field = FieldDescriptor::int("n").default_with(now);

        assert!(field.has_default());
        assert_eq!(field.default_value_now(), Some(Value::Int(3)));
    }
}
