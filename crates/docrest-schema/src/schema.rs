use crate::{field::FieldDescriptor, kind::FieldKind};
use derive_more::Display;
use indexmap::IndexMap;
use std::sync::Arc;

/// Name of the implicit primary key given to top-level documents.
pub const DEFAULT_PK_NAME: &str = "id";

///
/// Flavour
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Flavour {
    Document,
    Embedded,
}

///
/// DocumentSchema
///
/// A document model type: ordered declared fields, an optional primary key
/// and an optional parent for polymorphic hierarchies.
/// `fields` never contains the primary key.
///

#[derive(Clone, Debug)]
pub struct DocumentSchema {
    pub name: String,
    pub flavour: Flavour,
    pub dynamic: bool,
    pub fields: IndexMap<String, Arc<FieldDescriptor>>,
    pub primary_key: Option<Arc<FieldDescriptor>>,
    pub parent: Option<String>,
}

impl DocumentSchema {
    /// Start a top-level document schema.
    #[must_use]
    pub fn document(name: impl Into<String>) -> DocumentSchemaBuilder {
        DocumentSchemaBuilder::new(name.into(), Flavour::Document)
    }

    /// Start an embedded document schema; it never has a primary key.
    #[must_use]
    pub fn embedded(name: impl Into<String>) -> DocumentSchemaBuilder {
        DocumentSchemaBuilder::new(name.into(), Flavour::Embedded)
    }

    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        matches!(self.flavour, Flavour::Embedded)
    }

    #[must_use]
    pub fn pk_name(&self) -> Option<&str> {
        self.primary_key.as_ref().map(|pk| pk.name.as_str())
    }

    /// Look up a declared field or the primary key by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Arc<FieldDescriptor>> {
        self.fields.get(name).or_else(|| {
            self.primary_key
                .as_ref()
                .filter(|pk| pk.name == name)
        })
    }

    /// Primary key first, then declared fields in order.
    pub fn fields_and_pk(&self) -> impl Iterator<Item = &Arc<FieldDescriptor>> {
        self.primary_key.iter().chain(self.fields.values())
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

///
/// DocumentSchemaBuilder
///

#[derive(Debug)]
pub struct DocumentSchemaBuilder {
    schema: DocumentSchema,
}

impl DocumentSchemaBuilder {
    fn new(name: String, flavour: Flavour) -> Self {
        Self {
            schema: DocumentSchema {
                name,
                flavour,
                dynamic: false,
                fields: IndexMap::new(),
                primary_key: None,
                parent: None,
            },
        }
    }

    /// Inherit every descriptor of `parent` by `Arc`.
    /// Fields added afterwards with an inherited name override it in place.
    #[must_use]
    pub fn extends(mut self, parent: &DocumentSchema) -> Self {
        self.schema.parent = Some(parent.name.clone());
        self.schema.dynamic |= parent.dynamic;
        self.schema.primary_key.clone_from(&parent.primary_key);
        for (name, field) in &parent.fields {
            self.schema.fields.insert(name.clone(), Arc::clone(field));
        }

        self
    }

    #[must_use]
    pub const fn dynamic(mut self) -> Self {
        self.schema.dynamic = true;
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        if field.primary_key {
            self.schema.fields.shift_remove(&field.name);
            self.schema.primary_key = Some(Arc::new(field));
        } else {
            self.schema.fields.insert(field.name.clone(), Arc::new(field));
        }

        self
    }

    #[must_use]
    pub fn build(mut self) -> DocumentSchema {
        if self.schema.flavour == Flavour::Embedded {
            self.schema.primary_key = None;
        } else if self.schema.primary_key.is_none() {
            let pk = FieldDescriptor::new(DEFAULT_PK_NAME, FieldKind::ObjectId).primary_key();
            self.schema.primary_key = Some(Arc::new(pk));
        }

        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle() -> DocumentSchema {
        DocumentSchema::document("Vehicle")
            .field(FieldDescriptor::string("name"))
            .field(FieldDescriptor::int("weight"))
            .build()
    }

    #[test]
    fn documents_get_implicit_object_id() {
        let schema = vehicle();

        assert_eq!(schema.pk_name(), Some(DEFAULT_PK_NAME));
        assert_eq!(schema.fields.len(), 2);
        assert!(!schema.fields.contains_key(DEFAULT_PK_NAME));
    }

    #[test]
    fn embedded_schemas_have_no_primary_key() {
        let schema = DocumentSchema::embedded("Mileage")
            .field(FieldDescriptor::int("loaded"))
            .build();

        assert!(schema.primary_key.is_none());
        assert!(schema.is_embedded());
    }

    #[test]
    fn extends_shares_parent_descriptors() {
        let parent = vehicle();
        let child = DocumentSchema::document("Car")
            .extends(&parent)
            .field(FieldDescriptor::int("mpg"))
            .build();

        assert!(Arc::ptr_eq(&parent.fields["name"], &child.fields["name"]));
        assert!(Arc::ptr_eq(
            parent.primary_key.as_ref().expect("parent pk"),
            child.primary_key.as_ref().expect("child pk"),
        ));
        assert_eq!(child.parent.as_deref(), Some("Vehicle"));
    }

    #[test]
    fn override_keeps_position_but_replaces_descriptor() {
        let parent = vehicle();
        let child = DocumentSchema::document("Car")
            .extends(&parent)
            .field(FieldDescriptor::string("weight"))
            .build();

        let names: Vec<_> = child.fields.keys().cloned().collect();
        assert_eq!(names, vec!["name", "weight"]);
        assert!(!Arc::ptr_eq(&parent.fields["weight"], &child.fields["weight"]));
    }
}
