use super::{TransformContext, infer_value, primitive};
use crate::{
    error::SerializerError,
    field::{EmbeddedNode, FieldNode, FieldTree, ReferenceNode, SerializerField},
    validation::{FieldError, FieldErrorKind, Issues},
};
use docrest_schema::{
    instance::{Document, Reference},
    kind::FieldKind,
    schema::DocumentSchema,
    types::ObjectId,
    value::Value,
};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::sync::LazyLock;
use uuid::Uuid;

static HEX_IDENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[0-9a-fA-F]{24}").expect("static identity pattern"));

/// Validate one slot of an input mapping.
///
/// Missing values fall back to the default or record `Required`; `null`
/// is accepted only with `allow_null`. Everything else is dispatched to
/// `to_internal`. `Ok(None)` means "leave unset" or "error recorded".
pub fn validate_slot(
    field: &SerializerField,
    data: Option<&JsonValue>,
    ctx: &TransformContext<'_>,
    issues: &mut Issues,
) -> Result<Option<Value>, SerializerError> {
    match data {
        None => {
            if let Some(default) = &field.options.default {
                return Ok(Some(default.value()));
            }
            if field.options.required {
                issues.add(FieldErrorKind::Required);
            }
            Ok(None)
        }
        Some(JsonValue::Null) => {
            if field.options.allow_null {
                Ok(Some(Value::Null))
            } else {
                issues.add(FieldErrorKind::Null);
                Ok(None)
            }
        }
        Some(data) => to_internal(field, data, ctx, issues),
    }
}

/// Validate `obj` against every writable node of `tree`.
///
/// Values are keyed by each node's source. Errors are recorded under the
/// node name relative to the current path.
pub fn validate_mapping(
    tree: &FieldTree,
    obj: &JsonMap<String, JsonValue>,
    ctx: &TransformContext<'_>,
    issues: &mut Issues,
) -> Result<IndexMap<String, Value>, SerializerError> {
    let mut out = IndexMap::new();

    for (name, field) in tree {
        if field.is_read_only() {
            continue;
        }

        issues.push(name.as_str());
        let value = validate_slot(field, obj.get(name), ctx, issues);
        issues.pop();

        if let Some(value) = value? {
            out.insert(field.source.clone(), value);
        }
    }

    Ok(out)
}

/// Materialise validated values as an instance of `schema`.
#[must_use]
pub fn document_from(schema: &DocumentSchema, values: IndexMap<String, Value>) -> Document {
    let mut doc = Document::new(schema);
    for (name, value) in values {
        doc.set(&name, value);
    }

    doc
}

/// Pull the identity out of a raw reference value.
///
/// URI-like values (anything containing `/`) yield their last 24-hex run;
/// other values are returned as is.
#[must_use]
pub fn extract_identity(raw: &str) -> Option<&str> {
    if raw.contains('/') {
        HEX_IDENTITY.find_iter(raw).last().map(|m| m.as_str())
    } else {
        Some(raw)
    }
}

/// Parse one non-null input value for `field`.
pub fn to_internal(
    field: &SerializerField,
    data: &JsonValue,
    ctx: &TransformContext<'_>,
    issues: &mut Issues,
) -> Result<Option<Value>, SerializerError> {
    tracing::trace!(field = %field.name, depth = field.depth, "to_internal");

    let value = match &field.node {
        FieldNode::Primitive(class) => primitive::parse_primitive(*class, &field.options, data, issues),
        FieldNode::ObjectId => primitive::parse_object_id(data, issues),
        FieldNode::Binary => primitive::parse_binary(&field.options, data, issues),
        FieldNode::Geo(kind) => primitive::parse_geo(*kind, data, issues),
        FieldNode::ReadOnly(_) => None,

        FieldNode::Reference(node) => reference_input(field, node, data, ctx, issues)?,
        FieldNode::Embedded(node) => embedded_input(field, node, data, ctx, issues)?,

        FieldNode::List(child) => {
            let JsonValue::Array(items) = data else {
                issues.add(FieldErrorKind::NotAList);
                return Ok(None);
            };

            let before = issues.count();
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                issues.push(i);
                let value = validate_slot(child, Some(item), ctx, issues);
                issues.pop();
                if let Some(value) = value? {
                    out.push(value);
                }
            }

            (issues.count() == before).then_some(Value::List(out))
        }

        FieldNode::Map(child) => {
            let JsonValue::Object(obj) = data else {
                issues.add(FieldErrorKind::NotAMapping);
                return Ok(None);
            };

            let before = issues.count();
            let mut out = IndexMap::new();
            for (key, item) in obj {
                issues.push(key.as_str());
                let value = validate_slot(child, Some(item), ctx, issues);
                issues.pop();
                if let Some(value) = value? {
                    out.insert(key.clone(), value);
                }
            }

            (issues.count() == before).then_some(Value::Map(out))
        }

        FieldNode::Dict => match data {
            JsonValue::Object(_) => Some(infer_value(data)),
            _ => {
                issues.add(FieldErrorKind::NotAMapping);
                None
            }
        },

        FieldNode::Dynamic => Some(infer_value(data)),

        FieldNode::Nested(nested) => {
            let JsonValue::Object(obj) = data else {
                issues.add(FieldErrorKind::NotAMapping);
                return Ok(None);
            };

            let before = issues.count();
            let values = nested.serializer.validate_in(obj, ctx, issues)?;

            (issues.count() == before).then_some(Value::Map(values))
        }
    };

    Ok(value)
}

fn embedded_input(
    field: &SerializerField,
    node: &EmbeddedNode,
    data: &JsonValue,
    ctx: &TransformContext<'_>,
    issues: &mut Issues,
) -> Result<Option<Value>, SerializerError> {
    let Some(children) = &node.children else {
        return Err(SerializerError::depth_exhausted(issues.path()));
    };
    let JsonValue::Object(obj) = data else {
        issues.add(FieldErrorKind::NotAMapping);
        return Ok(None);
    };

    let schema = ctx.registry.get(&node.schema)?;
    let before = issues.count();
    let values = validate_mapping(children, obj, ctx, issues)?;
    if issues.count() > before {
        return Ok(None);
    }

    tracing::trace!(field = %field.name, schema = %schema.name, "embedded document validated");

    Ok(Some(Value::Embedded(Box::new(document_from(schema, values)))))
}

fn reference_input(
    field: &SerializerField,
    node: &ReferenceNode,
    data: &JsonValue,
    ctx: &TransformContext<'_>,
    issues: &mut Issues,
) -> Result<Option<Value>, SerializerError> {
    let target = ctx.registry.get(&node.schema)?;

    let raw = match data {
        JsonValue::Object(obj) => {
            let Some(children) = &node.children else {
                if field.depth == 0 {
                    return Err(SerializerError::depth_exhausted(issues.path()));
                }
                issues.add(FieldErrorKind::InvalidIdentity);
                return Ok(None);
            };

            let before = issues.count();
            let values = validate_mapping(children, obj, ctx, issues)?;
            if issues.count() > before {
                return Ok(None);
            }

            let doc = document_from(target, values);
            return Ok(Some(Value::Reference(Reference::resolved(doc))));
        }
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        _ => {
            issues.add(FieldErrorKind::InvalidIdentity);
            return Ok(None);
        }
    };

    let Some(id) = extract_identity(&raw).and_then(|s| parse_identity(target, s)) else {
        issues.add(FieldErrorKind::InvalidIdentity);
        return Ok(None);
    };

    let Some(store) = ctx.store else {
        return Ok(Some(Value::Reference(Reference::lazy(&target.name, id))));
    };

    match store.get(&target.name, &id)? {
        None => {
            issues.add(FieldError::new(
                FieldErrorKind::InvalidReference,
                format!("Invalid reference: '{raw}' does not exist."),
            ));
            Ok(None)
        }
        Some(doc) if ctx.build.dereference => {
            Ok(Some(Value::Reference(Reference::resolved(doc))))
        }
        Some(doc) => Ok(Some(Value::Reference(Reference::lazy(doc.schema_name(), id)))),
    }
}

// The identity type follows the target's primary key kind.
fn parse_identity(target: &DocumentSchema, raw: &str) -> Option<Value> {
    let raw = raw.trim();
    let kind = target
        .primary_key
        .as_ref()
        .map_or(FieldKind::ObjectId, |pk| pk.kind.clone());

    if kind == FieldKind::ObjectId {
        return raw.parse::<ObjectId>().ok().map(Value::ObjectId);
    }

    let lineage = kind.lineage();
    if lineage.contains(&FieldKind::Int) {
        raw.parse::<i64>().ok().map(Value::Int)
    } else if lineage.contains(&FieldKind::Uuid) {
        Uuid::parse_str(raw).ok().map(Value::Uuid)
    } else {
        (!raw.is_empty()).then(|| Value::String(raw.to_string()))
    }
}
