use super::{TransformContext, identity_json, scalar_json};
use crate::{
    chain::ChainScope,
    error::SerializerError,
    field::{
        FieldBuilder, FieldNode, FieldTree, ReferenceNode, SerializerField, ValueClass, classify,
    },
};
use docrest_schema::{
    instance::{Document, Reference},
    value::Value,
};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::{borrow::Cow, sync::Arc};

/// Walk a dotted source through embedded and resolved documents.
#[must_use]
pub fn lookup_source<'d>(doc: &'d Document, source: &str) -> Option<&'d Value> {
    let mut segments = source.split('.');
    let mut value = doc.get(segments.next()?)?;
    for seg in segments {
        value = value.as_document()?.get(seg)?;
    }

    Some(value)
}

/// The single null gate for output: absent or null values become `null`
/// without ever reaching the field's own logic.
pub fn represent_slot(
    field: &SerializerField,
    value: Option<&Value>,
    ctx: &TransformContext<'_>,
) -> Result<JsonValue, SerializerError> {
    match value {
        None | Some(Value::Null) => Ok(JsonValue::Null),
        Some(value) => to_representation(field, value, ctx),
    }
}

/// Ordered mapping of `doc` against `tree`; write-only fields are skipped.
pub fn represent_document(
    tree: &FieldTree,
    doc: &Document,
    ctx: &TransformContext<'_>,
) -> Result<JsonMap<String, JsonValue>, SerializerError> {
    let mut out = JsonMap::new();

    for (name, field) in tree {
        if field.is_write_only() {
            continue;
        }
        let json = match &field.node {
            FieldNode::ReadOnly(attr) => attr(doc),
            _ => represent_slot(field, lookup_source(doc, &field.source), ctx)?,
        };
        out.insert(name.clone(), json);
    }

    Ok(out)
}

/// Represent one non-null value. Callers go through `represent_slot`.
pub fn to_representation(
    field: &SerializerField,
    value: &Value,
    ctx: &TransformContext<'_>,
) -> Result<JsonValue, SerializerError> {
    tracing::trace!(field = %field.name, depth = field.depth, "to_representation");

    match &field.node {
        FieldNode::Binary
        | FieldNode::Geo(_)
        | FieldNode::ObjectId
        | FieldNode::Primitive(_)
        | FieldNode::ReadOnly(_) => Ok(scalar_json(value)),

        FieldNode::Reference(node) => represent_reference(node, value, ctx),

        // an exhausted placeholder has no identity to fall back on, so the
        // embedded values are emitted as plain data
        FieldNode::Embedded(node) => match (&node.children, value.as_document()) {
            (Some(children), Some(doc)) => {
                Ok(JsonValue::Object(represent_document(children, doc, ctx)?))
            }
            _ => Ok(scalar_json(value)),
        },

        FieldNode::List(child) => match value {
            Value::List(items) => items
                .iter()
                .map(|item| represent_slot(child, Some(item), ctx))
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            other => Ok(scalar_json(other)),
        },

        FieldNode::Map(child) => match value {
            Value::Map(map) => {
                let mut out = JsonMap::new();
                for (key, item) in map {
                    out.insert(key.clone(), represent_slot(child, Some(item), ctx)?);
                }
                Ok(JsonValue::Object(out))
            }
            other => Ok(scalar_json(other)),
        },

        FieldNode::Dict | FieldNode::Dynamic => represent_dynamic(field, value, ctx),

        FieldNode::Nested(nested) => {
            let doc = match value {
                Value::Reference(r) => resolve_reference(r, ctx)?,
                other => other.as_document().map(Cow::Borrowed),
            };

            match doc {
                Some(doc) => nested.serializer.represent_in(&doc, ctx),
                None => Ok(scalar_json(value)),
            }
        }
    }
}

fn represent_reference(
    node: &ReferenceNode,
    value: &Value,
    ctx: &TransformContext<'_>,
) -> Result<JsonValue, SerializerError> {
    let Value::Reference(reference) = value else {
        return Ok(identity_json(Some(value)));
    };

    if let Some(children) = &node.children {
        if let Some(doc) = resolve_reference(reference, ctx)? {
            return Ok(JsonValue::Object(represent_document(children, &doc, ctx)?));
        }
        return Ok(identity_json(reference.id()));
    }

    if node.hyperlink
        && let (Some(uris), Some(id)) = (ctx.uris, reference.id())
    {
        match uris.uri_for(reference.schema_name(), id) {
            Ok(uri) => return Ok(JsonValue::String(uri)),
            Err(e) => tracing::warn!(error = %e, "no URI for reference, falling back to identity"),
        }
    }

    Ok(identity_json(reference.id()))
}

/// Materialise a reference target, fetching lazy handles through the store.
pub(super) fn resolve_reference<'r>(
    reference: &'r Reference,
    ctx: &TransformContext<'_>,
) -> Result<Option<Cow<'r, Document>>, SerializerError> {
    match reference {
        Reference::Resolved(doc) => Ok(Some(Cow::Borrowed(&**doc))),
        Reference::Lazy(handle) => {
            let Some(store) = ctx.store else {
                return Ok(None);
            };

            match store.get(&handle.schema, &handle.id)? {
                Some(doc) => Ok(Some(Cow::Owned(doc))),
                None => {
                    tracing::warn!(
                        schema = %handle.schema,
                        id = ?handle.id,
                        "dangling reference, emitting identity"
                    );
                    Ok(None)
                }
            }
        }
    }
}

fn represent_dynamic(
    field: &SerializerField,
    value: &Value,
    ctx: &TransformContext<'_>,
) -> Result<JsonValue, SerializerError> {
    match classify(value) {
        ValueClass::Scalar => Ok(scalar_json(value)),

        ValueClass::List => match value {
            Value::List(items) => items
                .iter()
                .map(|item| represent_dynamic_slot(field, item, ctx))
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            _ => Ok(scalar_json(value)),
        },

        ValueClass::Map => match value {
            Value::Map(map) => {
                let mut out = JsonMap::new();
                for (key, item) in map {
                    out.insert(key.clone(), represent_dynamic_slot(field, item, ctx)?);
                }
                Ok(JsonValue::Object(out))
            }
            _ => Ok(scalar_json(value)),
        },

        ValueClass::Reference => {
            let Value::Reference(reference) = value else {
                return Ok(scalar_json(value));
            };
            if field.depth > 0
                && ctx.build.dereference
                && let Some(doc) = resolve_reference(reference, ctx)?
            {
                return represent_dynamic_document(&doc, field.depth - 1, ctx);
            }

            Ok(identity_json(reference.id()))
        }

        ValueClass::Document => {
            let Some(doc) = value.as_document() else {
                return Ok(scalar_json(value));
            };
            if field.depth == 0 {
                return Ok(match doc.id() {
                    Some(id) => identity_json(Some(id)),
                    None => scalar_json(value),
                });
            }

            represent_dynamic_document(doc, field.depth - 1, ctx)
        }
    }
}

fn represent_dynamic_slot(
    field: &SerializerField,
    value: &Value,
    ctx: &TransformContext<'_>,
) -> Result<JsonValue, SerializerError> {
    if value.is_null() {
        Ok(JsonValue::Null)
    } else {
        represent_dynamic(field, value, ctx)
    }
}

// Documents found inside dynamic values go through the per-class cache.
fn represent_dynamic_document(
    doc: &Document,
    depth: usize,
    ctx: &TransformContext<'_>,
) -> Result<JsonValue, SerializerError> {
    let builder = FieldBuilder::new(ctx.build);
    let scope = ChainScope::of(&ctx.build, depth);
    let link = ctx.cache.resolve(ctx.registry, doc.schema_name(), scope, |d| {
        builder.build_field(d, depth).map(Arc::new)
    })?;

    let mut out = JsonMap::new();
    for (name, value) in doc.values() {
        let json = match link.get(name) {
            Some(field) if field.is_write_only() => continue,
            Some(field) => represent_slot(field, Some(value), ctx)?,
            None => scalar_json(value),
        };
        out.insert(name.to_string(), json);
    }

    let loose = SerializerField::new("", FieldNode::Dynamic);
    let loose = SerializerField { depth, ..loose };
    for (name, value) in doc.dynamic_values() {
        out.insert(name.to_string(), represent_dynamic_slot(&loose, value, ctx)?);
    }

    Ok(JsonValue::Object(out))
}

/// Dynamic values of a document, represented with schemaless inference.
pub(crate) fn represent_dynamic_values(
    doc: &Document,
    depth: usize,
    ctx: &TransformContext<'_>,
) -> Result<JsonMap<String, JsonValue>, SerializerError> {
    let mut out = JsonMap::new();
    for (name, value) in doc.dynamic_values() {
        let field = SerializerField {
            depth,
            ..SerializerField::new(name, FieldNode::Dynamic)
        };
        out.insert(name.to_string(), represent_dynamic_slot(&field, value, ctx)?);
    }

    Ok(out)
}
