use crate::{schema::DocumentSchema, value::Value};
use indexmap::IndexMap;

///
/// Document
///
/// One record or embedded sub-document. Declared values are seeded from the
/// schema (default or null), so `values` always lists every declared field
/// in schema order; anything else lands in `dynamic`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    schema: String,
    primary_key: Option<String>,
    values: IndexMap<String, Value>,
    dynamic: IndexMap<String, Value>,
}

impl Document {
    #[must_use]
    pub fn new(schema: &DocumentSchema) -> Self {
        let values = schema
            .fields_and_pk()
            .map(|field| {
                let value = field.default_value_now().unwrap_or(Value::Null);
                (field.name.clone(), value)
            })
            .collect();

        Self {
            schema: schema.name.clone(),
            primary_key: schema.pk_name().map(ToString::to_string),
            values,
            dynamic: IndexMap::new(),
        }
    }

    /// Builder-style `set`.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    #[must_use]
    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    #[must_use]
    pub fn pk_name(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Primary key value, if assigned.
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.primary_key
            .as_deref()
            .and_then(|pk| self.values.get(pk))
            .filter(|v| !v.is_null())
    }

    pub fn set_id(&mut self, id: impl Into<Value>) {
        if let Some(pk) = self.primary_key.clone() {
            self.values.insert(pk, id.into());
        }
    }

    /// Declared value first, then dynamic.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).or_else(|| self.dynamic.get(name))
    }

    /// Write a declared value in place, or record an undeclared one as dynamic.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();

        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
        } else {
            self.dynamic.insert(name.to_string(), value);
        }
    }

    #[must_use]
    pub fn is_declared(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Declared values in schema order, primary key first.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Undeclared values in insertion order.
    pub fn dynamic_values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.dynamic.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn has_dynamic_values(&self) -> bool {
        !self.dynamic.is_empty()
    }
}

///
/// Reference
///
/// Lazy     → identity plus target schema, not yet fetched.
/// Resolved → the fully materialised target.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Reference {
    Lazy(DocumentRef),
    Resolved(Box<Document>),
}

impl Reference {
    #[must_use]
    pub fn lazy(schema: impl Into<String>, id: impl Into<Value>) -> Self {
        Self::Lazy(DocumentRef {
            schema: schema.into(),
            id: Box::new(id.into()),
        })
    }

    #[must_use]
    pub fn resolved(doc: Document) -> Self {
        Self::Resolved(Box::new(doc))
    }

    #[must_use]
    pub fn schema_name(&self) -> &str {
        match self {
            Self::Lazy(r) => &r.schema,
            Self::Resolved(doc) => doc.schema_name(),
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        match self {
            Self::Lazy(r) => Some(&r.id),
            Self::Resolved(doc) => doc.id(),
        }
    }

    /// Lower a resolved reference back to a lazy handle.
    #[must_use]
    pub fn to_lazy(&self) -> Option<DocumentRef> {
        match self {
            Self::Lazy(r) => Some(r.clone()),
            Self::Resolved(doc) => doc.id().map(|id| DocumentRef {
                schema: doc.schema_name().to_string(),
                id: Box::new(id.clone()),
            }),
        }
    }
}

///
/// DocumentRef
///

#[derive(Clone, Debug, PartialEq)]
pub struct DocumentRef {
    pub schema: String,
    pub id: Box<Value>,
}
