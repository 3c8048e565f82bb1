use super::{DocumentStore, StoreError};
use docrest_schema::{
    instance::Document, kind::FieldKind, registry::SchemaRegistry, types::ObjectId, value::Value,
};
use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock},
};

// (root schema, identity)
type StoreKey = (String, String);

///
/// MemoryStore
///
/// Map-backed store. Documents of one hierarchy share a collection keyed by
/// the root schema, so lookups through a base schema see every subclass.
///

#[derive(Debug)]
pub struct MemoryStore {
    registry: Arc<SchemaRegistry>,
    docs: RwLock<BTreeMap<StoreKey, Document>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            docs: RwLock::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.docs.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn key(&self, schema: &str, id: &Value) -> Result<StoreKey, StoreError> {
        let root = self
            .registry
            .ancestors(schema)
            .map_err(|e| StoreError::Type(e.to_string()))?
            .first()
            .map(|s| s.name.clone())
            .unwrap_or_else(|| schema.to_string());
        let id = id
            .identity_string()
            .ok_or_else(|| StoreError::Type(format!("{} is not a valid identity", id.type_name())))?;

        Ok((root, id))
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, schema: &str, id: &Value) -> Result<Option<Document>, StoreError> {
        let key = self.key(schema, id)?;
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);

        Ok(docs
            .get(&key)
            .filter(|doc| self.registry.is_subclass(doc.schema_name(), schema))
            .cloned())
    }

    fn save(&self, doc: &mut Document) -> Result<(), StoreError> {
        let schema = self
            .registry
            .get(doc.schema_name())
            .map_err(|e| StoreError::Type(e.to_string()))?;

        if schema.is_embedded() {
            return Err(StoreError::Type(format!(
                "'{}' is an embedded document and is saved with its parent",
                schema.name
            )));
        }

        if !schema.dynamic
            && let Some((name, _)) = doc.dynamic_values().next()
        {
            return Err(StoreError::Type(format!(
                "'{name}' is not a field of '{}'",
                schema.name
            )));
        }

        let missing: Vec<&str> = schema
            .fields
            .values()
            .filter(|f| f.required && doc.get(&f.name).is_none_or(Value::is_null))
            .map(|f| f.name.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::Validation(format!(
                "ValidationError ({}) Field is required: {missing:?}",
                schema.name
            )));
        }

        if doc.id().is_none() {
            match schema.primary_key.as_ref().map(|pk| &pk.kind) {
                Some(FieldKind::ObjectId) | None => doc.set_id(ObjectId::generate()),
                Some(_) => {
                    return Err(StoreError::Validation(format!(
                        "ValidationError ({}) primary key is required",
                        schema.name
                    )));
                }
            }
        }

        let key = self.key(&schema.name, doc.id().unwrap_or(&Value::Null))?;
        tracing::debug!(schema = %schema.name, id = %key.1, "document saved");

        self.docs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, doc.clone());

        Ok(())
    }
}
