use docrest_schema::{
    error::SchemaError, field::FieldDescriptor, registry::SchemaRegistry, schema::DocumentSchema,
};
use indexmap::IndexMap;
use std::sync::Arc;

/// Alias under which the primary key is always reachable.
pub const PK_ALIAS: &str = "pk";

///
/// FieldInfo
///
/// Ordered field metadata for one schema.
/// `fields_and_pk` lists the `pk` alias, the primary key under its own name,
/// then every declared field.
///

#[derive(Clone, Debug, Default)]
pub struct FieldInfo {
    pub pk: Option<Arc<FieldDescriptor>>,
    pub fields: IndexMap<String, Arc<FieldDescriptor>>,
    pub fields_and_pk: IndexMap<String, Arc<FieldDescriptor>>,
}

impl FieldInfo {
    fn from_parts(
        pk: Option<Arc<FieldDescriptor>>,
        fields: IndexMap<String, Arc<FieldDescriptor>>,
    ) -> Self {
        let mut fields_and_pk = IndexMap::new();
        if let Some(pk) = &pk {
            fields_and_pk.insert(PK_ALIAS.to_string(), Arc::clone(pk));
            fields_and_pk.insert(pk.name.clone(), Arc::clone(pk));
        }
        for (name, field) in &fields {
            fields_and_pk.insert(name.clone(), Arc::clone(field));
        }

        Self {
            pk,
            fields,
            fields_and_pk,
        }
    }

    #[must_use]
    pub fn pk_name(&self) -> Option<&str> {
        self.pk.as_ref().map(|pk| pk.name.as_str())
    }
}

/// Declared fields of `schema` in declaration order.
/// Embedded schemas carry no primary key.
#[must_use]
pub fn introspect(schema: &DocumentSchema) -> FieldInfo {
    let pk = if schema.is_embedded() {
        None
    } else {
        schema.primary_key.clone()
    };

    FieldInfo::from_parts(pk, schema.fields.clone())
}

/// `introspect`, then every subclass field not already present by name,
/// in subclass registration order.
pub fn introspect_polymorphic(
    registry: &SchemaRegistry,
    schema: &DocumentSchema,
) -> Result<FieldInfo, SchemaError> {
    registry.get(&schema.name)?;

    let base = introspect(schema);
    let mut fields = base.fields;
    for sub in registry.subclasses(&schema.name) {
        for (name, field) in &sub.fields {
            if !fields.contains_key(name) {
                fields.insert(name.clone(), Arc::clone(field));
            }
        }
    }

    Ok(FieldInfo::from_parts(base.pk, fields))
}
