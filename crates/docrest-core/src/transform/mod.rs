//! Value transformer: instances to primitive JSON and back.
//!
//! `null` is handled exactly once, in `represent_slot` / `validate_slot`
//! and in the container loops; node handlers never see it.

mod internal;
mod primitive;
mod represent;

pub use internal::{document_from, extract_identity, to_internal, validate_mapping, validate_slot};
pub use represent::{lookup_source, represent_document, represent_slot, to_representation};
pub(crate) use represent::represent_dynamic_values;

use crate::{
    chain::PolymorphicChainMap, field::BuildContext, hyperlink::UriResolver, store::DocumentStore,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use docrest_schema::{
    registry::SchemaRegistry,
    value::{Coordinates, GeoValue, Value},
};
use serde_json::{Map as JsonMap, Number, Value as JsonValue};
use time::format_description::well_known::Rfc3339;

///
/// TransformContext
///
/// Collaborators shared by one representation or validation pass.
/// The store and URI resolver are optional; without a store references
/// stay lazy and are never fetched.
///

#[derive(Clone, Copy)]
pub struct TransformContext<'a> {
    pub registry: &'a SchemaRegistry,
    pub cache: &'a PolymorphicChainMap,
    pub build: BuildContext<'a>,
    pub store: Option<&'a dyn DocumentStore>,
    pub uris: Option<&'a dyn UriResolver>,
}

impl<'a> TransformContext<'a> {
    #[must_use]
    pub const fn new(registry: &'a SchemaRegistry, cache: &'a PolymorphicChainMap) -> Self {
        Self {
            registry,
            cache,
            build: BuildContext::new(registry),
            store: None,
            uris: None,
        }
    }

    #[must_use]
    pub const fn with_build(mut self, build: BuildContext<'a>) -> Self {
        self.build = build;
        self
    }

    #[must_use]
    pub const fn with_store(mut self, store: Option<&'a dyn DocumentStore>) -> Self {
        self.store = store;
        self
    }

    #[must_use]
    pub const fn with_uris(mut self, uris: Option<&'a dyn UriResolver>) -> Self {
        self.uris = uris;
        self
    }
}

/// Infer a raw value from schemaless JSON: objects become maps, arrays lists.
#[must_use]
pub fn infer_value(data: &JsonValue) -> Value {
    match data {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => n
            .as_i64()
            .map_or_else(|| Value::Float(n.as_f64().unwrap_or_default()), Value::Int),
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::List(items.iter().map(infer_value).collect()),
        JsonValue::Object(obj) => Value::Map(
            obj.iter()
                .map(|(k, v)| (k.clone(), infer_value(v)))
                .collect(),
        ),
    }
}

/// Plain JSON for a raw value, with no field tree involved.
#[must_use]
pub fn scalar_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::from(*i),
        Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::Decimal(d) => JsonValue::String(d.to_string()),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::DateTime(dt) => {
            JsonValue::String(dt.format(&Rfc3339).unwrap_or_else(|_| dt.to_string()))
        }
        Value::Uuid(u) => JsonValue::String(u.hyphenated().to_string()),
        Value::ObjectId(id) => JsonValue::String(id.to_hex()),
        Value::Binary(bytes) => JsonValue::String(BASE64.encode(bytes)),
        Value::Geo(geo) => geo_json(geo),
        Value::List(items) => JsonValue::Array(items.iter().map(scalar_json).collect()),
        Value::Map(map) => JsonValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), scalar_json(v)))
                .collect(),
        ),
        Value::Embedded(doc) => JsonValue::Object(
            doc.values()
                .chain(doc.dynamic_values())
                .map(|(k, v)| (k.to_string(), scalar_json(v)))
                .collect(),
        ),
        Value::Reference(r) => identity_json(r.id()),
    }
}

/// Identity surrogate: the primary key as a string, or `null` if unassigned.
#[must_use]
pub fn identity_json(id: Option<&Value>) -> JsonValue {
    id.and_then(Value::identity_string)
        .map_or(JsonValue::Null, JsonValue::String)
}

/// GeoJSON object, or a bare `[x, y]` pair for the legacy point kind.
#[must_use]
pub fn geo_json(geo: &GeoValue) -> JsonValue {
    let coordinates = coordinates_json(&geo.coordinates);

    match geo.kind.type_name() {
        None => coordinates,
        Some(type_name) => {
            let mut obj = JsonMap::new();
            obj.insert("type".to_string(), JsonValue::String(type_name.to_string()));
            obj.insert("coordinates".to_string(), coordinates);
            JsonValue::Object(obj)
        }
    }
}

fn coordinates_json(coords: &Coordinates) -> JsonValue {
    match coords {
        Coordinates::Position(x, y) => JsonValue::Array(vec![
            Number::from_f64(*x).map_or(JsonValue::Null, JsonValue::Number),
            Number::from_f64(*y).map_or(JsonValue::Null, JsonValue::Number),
        ]),
        Coordinates::Nested(items) => JsonValue::Array(items.iter().map(coordinates_json).collect()),
    }
}

#[cfg(test)]
mod tests;
