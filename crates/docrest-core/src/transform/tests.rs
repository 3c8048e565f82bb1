use super::*;
use crate::{
    error::SerializerError,
    field::{EmbeddedNode, FieldBuilder, FieldNode, FieldTree, SerializerField},
    hyperlink::{NamespaceResolver, PathResolver},
    store::{DocumentStore, MemoryStore},
    test_support::fixtures,
    validation::{FieldErrorKind, Issues},
};
use docrest_schema::{
    instance::{Document, Reference},
    types::ObjectId,
    value::{GeoValue, Value},
};
use rust_decimal::Decimal;
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;

fn tree(reg: &SchemaRegistry, schema: &str, depth: usize) -> FieldTree {
    FieldBuilder::new(BuildContext::new(reg))
        .build_schema_tree(reg.get(schema).expect("fixture schema"), depth)
        .expect("tree should build")
}

fn doc(reg: &SchemaRegistry, schema: &str) -> Document {
    Document::new(reg.get(schema).expect("fixture schema"))
}

fn validate(
    tree: &FieldTree,
    data: &JsonValue,
    ctx: &TransformContext<'_>,
) -> (Result<indexmap::IndexMap<String, Value>, SerializerError>, crate::validation::ValidationErrors) {
    let mut issues = Issues::new();
    let obj = data.as_object().expect("test input is an object");
    let values = validate_mapping(tree, obj, ctx, &mut issues);

    (values, issues.finish())
}

fn manufacturer(reg: &SchemaRegistry, id: ObjectId) -> Document {
    let mut m = doc(reg, "Manufacturer").with("name", "Acme");
    m.set_id(id);
    m
}

//
// representation
//

#[test]
fn unsaved_instance_renders_null_id() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);
    let vehicle = doc(&reg, "Vehicle").with("name", "DMC 12").with("weight", 4000);

    let out = represent_document(&tree(&reg, "Vehicle", 5), &vehicle, &ctx)
        .expect("representation should succeed");

    assert_eq!(
        JsonValue::Object(out),
        json!({ "id": null, "name": "DMC 12", "weight": 4000, "manufacturer": null })
    );
}

#[test]
fn reference_at_depth_zero_is_its_identity() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);
    let id = ObjectId::from_parts(7, 1);
    let car = doc(&reg, "Car").with("manufacturer", Reference::resolved(manufacturer(&reg, id)));

    let out = represent_document(&tree(&reg, "Car", 0), &car, &ctx)
        .expect("representation should succeed");

    assert_eq!(out["manufacturer"], json!(id.to_hex()));
}

#[test]
fn resolved_reference_expands_with_depth() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);
    let id = ObjectId::from_parts(7, 2);
    let car = doc(&reg, "Car").with("manufacturer", Reference::resolved(manufacturer(&reg, id)));

    let out = represent_document(&tree(&reg, "Car", 1), &car, &ctx)
        .expect("representation should succeed");

    assert_eq!(out["manufacturer"], json!({ "id": id.to_hex(), "name": "Acme" }));
}

#[test]
fn lazy_reference_is_fetched_through_the_store() {
    let reg = Arc::new(fixtures::registry());
    let store = MemoryStore::new(Arc::clone(&reg));
    let mut acme = doc(&reg, "Manufacturer").with("name", "Acme");
    store.save(&mut acme).expect("save should succeed");
    let id = acme.id().cloned().expect("assigned id");

    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache).with_store(Some(&store));
    let car = doc(&reg, "Car").with("manufacturer", Reference::lazy("Manufacturer", id.clone()));
    let out = represent_document(&tree(&reg, "Car", 1), &car, &ctx)
        .expect("representation should succeed");
    assert_eq!(out["manufacturer"]["name"], json!("Acme"));

    // a dangling handle degrades to its identity
    let missing = ObjectId::from_parts(1, 1);
    let car = doc(&reg, "Car").with("manufacturer", Reference::lazy("Manufacturer", missing));
    let out = represent_document(&tree(&reg, "Car", 1), &car, &ctx)
        .expect("representation should succeed");
    assert_eq!(out["manufacturer"], json!(missing.to_hex()));
}

#[test]
fn hyperlink_mode_renders_uris_and_falls_back_to_identity() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let build = BuildContext::new(&reg).hyperlink(true);
    let tree = FieldBuilder::new(build)
        .build_schema_tree(reg.get("Car").expect("fixture"), 0)
        .expect("tree should build");
    let id = ObjectId::from_parts(3, 3);
    let car = doc(&reg, "Car").with("manufacturer", Reference::lazy("Manufacturer", id));

    let ns = NamespaceResolver;
    let ctx = TransformContext::new(&reg, &cache).with_build(build).with_uris(Some(&ns));
    let out = represent_document(&tree, &car, &ctx).expect("representation should succeed");
    assert_eq!(out["manufacturer"], json!(format!("Manufacturer:{id}")));

    let unrouted = PathResolver::new("/api").route("Car");
    let ctx = TransformContext::new(&reg, &cache).with_build(build).with_uris(Some(&unrouted));
    let out = represent_document(&tree, &car, &ctx).expect("representation should succeed");
    assert_eq!(out["manufacturer"], json!(id.to_hex()));
}

#[test]
fn null_never_reaches_a_child() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);

    let tripwire: crate::field::AttributeFn =
        Arc::new(|_: &Document| -> JsonValue { panic!("child invoked with null") });
    let mut children = FieldTree::new();
    children.insert(
        "boom".to_string(),
        Arc::new(SerializerField::attribute("boom", tripwire)),
    );
    let embedded = Arc::new(SerializerField::new(
        "entries",
        FieldNode::Embedded(EmbeddedNode {
            schema: "Mileage".to_string(),
            children: Some(children),
        }),
    ));

    let list = SerializerField::new("entries", FieldNode::List(Arc::clone(&embedded)));
    let out = represent_slot(&list, Some(&Value::List(vec![Value::Null, Value::Null])), &ctx)
        .expect("representation should succeed");
    assert_eq!(out, json!([null, null]));

    for field in [&*embedded, &list] {
        assert_eq!(
            represent_slot(field, Some(&Value::Null), &ctx).expect("null short-circuits"),
            JsonValue::Null
        );
        assert_eq!(
            represent_slot(field, None, &ctx).expect("absent short-circuits"),
            JsonValue::Null
        );
    }
}

#[test]
fn exhausted_embedded_placeholder_emits_plain_values() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);
    let mileage = doc(&reg, "Mileage").with("loaded", 10).with("unloaded", 20);
    let truck = doc(&reg, "Truck").with("mpg", mileage);

    let out = represent_document(&tree(&reg, "Truck", 0), &truck, &ctx)
        .expect("read side never raises on depth");

    assert_eq!(out["mpg"], json!({ "loaded": 10, "unloaded": 20 }));
}

#[test]
fn scalar_kinds_render_as_primitives() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);
    let sample = doc(&reg, "Sample")
        .with("price", Decimal::new(150, 2))
        .with("blob", Value::Binary(vec![1, 2, 3]))
        .with("location", Value::Geo(GeoValue::point(1.5, 2.5)))
        .with("tags", vec!["a", "b"]);

    let out = represent_document(&tree(&reg, "Sample", 1), &sample, &ctx)
        .expect("representation should succeed");

    assert_eq!(out["price"], json!("1.50"));
    assert_eq!(out["blob"], json!("AQID"));
    assert_eq!(out["location"], json!({ "type": "Point", "coordinates": [1.5, 2.5] }));
    assert_eq!(out["tags"], json!(["a", "b"]));
    assert_eq!(out["count"], json!(0));
    assert_eq!(out["title"], json!("untitled"));
}

#[test]
fn dynamic_documents_use_identity_at_depth_zero_and_the_cache_above() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);
    let id = ObjectId::from_parts(4, 4);
    let mut car = doc(&reg, "Car").with("name", "Beetle");
    car.set_id(id);
    let value = Value::Embedded(Box::new(car));

    let shallow = SerializerField::new("misc", FieldNode::Dynamic);
    assert_eq!(
        represent_slot(&shallow, Some(&value), &ctx).expect("identity"),
        json!(id.to_hex())
    );

    let deep = SerializerField {
        depth: 1,
        ..SerializerField::new("misc", FieldNode::Dynamic)
    };
    let out = represent_slot(&deep, Some(&value), &ctx).expect("expanded");
    assert_eq!(out["name"], json!("Beetle"));
    assert!(cache.is_cached("Car", 0));
    assert!(cache.is_cached("Vehicle", 0));
}

//
// input
//

#[test]
fn list_of_embedded_round_trips() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);

    let (values, errors) = validate(
        &tree(&reg, "Log", 5),
        &json!({ "entries": [{ "loaded": 1, "unloaded": 2 }] }),
        &ctx,
    );
    let values = values.expect("validation should succeed");
    assert!(errors.is_empty());

    let Some(Value::List(items)) = values.get("entries") else {
        panic!("expected a list");
    };
    assert_eq!(items.len(), 1);
    let entry = items[0].as_document().expect("embedded entry");
    assert_eq!(entry.get("loaded"), Some(&Value::Int(1)));
    assert_eq!(entry.get("unloaded"), Some(&Value::Int(2)));
}

#[test]
fn malformed_identity_is_recoverable() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);

    let (values, errors) = validate(
        &tree(&reg, "Car", 0),
        &json!({ "manufacturer": "not-an-id" }),
        &ctx,
    );

    assert!(values.is_ok());
    assert!(errors.has("manufacturer", FieldErrorKind::InvalidIdentity));
}

#[test]
fn uri_values_yield_their_last_hex_run() {
    let a = ObjectId::from_parts(1, 1).to_hex();
    let b = ObjectId::from_parts(2, 2).to_hex();
    let uri = format!("https://api.example.com/{a}/manufacturer/{b}/");

    assert_eq!(extract_identity(&uri), Some(b.as_str()));
    assert_eq!(extract_identity("https://api.example.com/none/"), None);
    assert_eq!(extract_identity(&a), Some(a.as_str()));

    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);
    let (values, errors) = validate(&tree(&reg, "Car", 0), &json!({ "manufacturer": uri }), &ctx);
    assert!(errors.is_empty());

    let values = values.expect("validation should succeed");
    let Some(Value::Reference(Reference::Lazy(handle))) = values.get("manufacturer") else {
        panic!("expected a lazy reference");
    };
    assert_eq!(handle.id.identity_string(), Some(b));
}

#[test]
fn store_miss_is_an_invalid_reference_and_hit_resolves() {
    let reg = Arc::new(fixtures::registry());
    let store = MemoryStore::new(Arc::clone(&reg));
    let mut acme = doc(&reg, "Manufacturer").with("name", "Acme");
    store.save(&mut acme).expect("save should succeed");
    let hex = acme.id().and_then(Value::identity_string).expect("assigned id");

    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache).with_store(Some(&store));
    let tree = tree(&reg, "Car", 0);

    let missing = ObjectId::from_parts(9, 9).to_hex();
    let (_, errors) = validate(&tree, &json!({ "manufacturer": missing }), &ctx);
    assert!(errors.has("manufacturer", FieldErrorKind::InvalidReference));

    let (values, errors) = validate(&tree, &json!({ "manufacturer": hex }), &ctx);
    assert!(errors.is_empty());
    let values = values.expect("validation should succeed");
    assert!(matches!(
        values.get("manufacturer"),
        Some(Value::Reference(Reference::Resolved(_)))
    ));
}

#[test]
fn mapping_at_an_exhausted_reference_is_fatal() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);

    let (values, _) = validate(
        &tree(&reg, "Car", 0),
        &json!({ "manufacturer": { "name": "Acme" } }),
        &ctx,
    );

    assert!(matches!(values, Err(SerializerError::DepthExhausted { path }) if path == "manufacturer"));
}

#[test]
fn mapping_with_dereference_off_is_an_invalid_identity() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let build = BuildContext::new(&reg).dereference(false);
    let tree = FieldBuilder::new(build)
        .build_schema_tree(reg.get("Car").expect("fixture"), 2)
        .expect("tree should build");
    let ctx = TransformContext::new(&reg, &cache).with_build(build);

    let (values, errors) = validate(&tree, &json!({ "manufacturer": { "name": "Acme" } }), &ctx);

    assert!(values.is_ok());
    assert!(errors.has("manufacturer", FieldErrorKind::InvalidIdentity));
}

#[test]
fn nested_mapping_builds_a_resolved_reference() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);

    let (values, errors) = validate(
        &tree(&reg, "Car", 1),
        &json!({ "manufacturer": { "name": "Acme" } }),
        &ctx,
    );
    assert!(errors.is_empty());

    let values = values.expect("validation should succeed");
    let Some(Value::Reference(Reference::Resolved(target))) = values.get("manufacturer") else {
        panic!("expected a resolved reference");
    };
    assert_eq!(target.get("name"), Some(&Value::from("Acme")));
}

#[test]
fn container_errors_are_keyed_by_path() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);
    let sample = tree(&reg, "Sample", 1);

    let (_, errors) = validate(
        &sample,
        &json!({
            "tags": "solo",
            "scores": { "math": "x", "art": 3 },
            "extra": [1, 2],
        }),
        &ctx,
    );
    assert!(errors.has("tags", FieldErrorKind::NotAList));
    assert!(errors.has("scores.math", FieldErrorKind::Invalid));
    assert!(errors.get("scores.art").is_none());
    assert!(errors.has("extra", FieldErrorKind::NotAMapping));

    let log = tree(&reg, "Log", 3);
    let (_, errors) = validate(&log, &json!({ "entries": [{ "loaded": "x" }] }), &ctx);
    assert!(errors.has("entries[0].loaded", FieldErrorKind::Invalid));
}

#[test]
fn primitive_constraints_are_enforced() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);
    let tree = tree(&reg, "Sample", 1);

    let (_, errors) = validate(
        &tree,
        &json!({
            "count": -1,
            "title": "a title well over twenty characters",
            "email": "nobody",
            "url": "not a url",
            "uid": "1234",
            "created": "yesterday",
            "blob": "AAAAAAAAAAAAAAAAAAAA",
            "location": { "type": "LineString", "coordinates": [1, 2] },
            "oid": "xyz",
            "flag": "maybe",
        }),
        &ctx,
    );

    assert!(errors.has("count", FieldErrorKind::MinValue));
    assert!(errors.has("title", FieldErrorKind::MaxLength));
    for path in ["email", "url", "uid", "created", "location", "oid", "flag"] {
        assert!(errors.has(path, FieldErrorKind::Invalid), "{path} should be invalid");
    }
    assert!(errors.has("blob", FieldErrorKind::MaxBytes));
}

#[test]
fn primitive_values_are_coerced() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);

    let (values, errors) = validate(
        &tree(&reg, "Sample", 1),
        &json!({
            "flag": "yes",
            "count": "12",
            "price": "1.50",
            "title": "  padded  ",
            "location": { "type": "Point", "coordinates": [1.5, 2.5] },
            "extra": { "a": [1, "b"] },
        }),
        &ctx,
    );
    assert!(errors.is_empty(), "{errors}");

    let values = values.expect("validation should succeed");
    assert_eq!(values["flag"], Value::Bool(true));
    assert_eq!(values["count"], Value::Int(12));
    assert_eq!(values["price"], Value::Decimal(Decimal::new(150, 2)));
    assert_eq!(values["title"], Value::from("padded"));
    assert_eq!(values["location"], Value::Geo(GeoValue::point(1.5, 2.5)));
    assert_eq!(
        values["extra"],
        Value::Map([("a".to_string(), Value::List(vec![Value::Int(1), Value::from("b")]))].into_iter().collect())
    );
}

#[test]
fn missing_and_null_follow_field_options() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);

    let (_, errors) = validate(&tree(&reg, "Manufacturer", 1), &json!({}), &ctx);
    assert!(errors.has("name", FieldErrorKind::Required));

    let (_, errors) = validate(&tree(&reg, "Manufacturer", 1), &json!({ "name": null }), &ctx);
    assert!(errors.has("name", FieldErrorKind::Null));

    let (_, errors) = validate(&tree(&reg, "Manufacturer", 1), &json!({ "name": "" }), &ctx);
    assert!(errors.has("name", FieldErrorKind::Blank));

    let (values, errors) = validate(&tree(&reg, "Vehicle", 1), &json!({ "name": null }), &ctx);
    assert!(errors.is_empty());
    let values = values.expect("validation should succeed");
    assert_eq!(values["name"], Value::Null);
    assert!(!values.contains_key("weight"));

    let (values, _) = validate(&tree(&reg, "Sample", 1), &json!({}), &ctx);
    let values = values.expect("validation should succeed");
    assert_eq!(values["count"], Value::Int(0));
}

#[test]
fn embedded_placeholder_input_is_fatal() {
    let reg = fixtures::registry();
    let cache = PolymorphicChainMap::new();
    let ctx = TransformContext::new(&reg, &cache);

    let (values, _) = validate(&tree(&reg, "Truck", 0), &json!({ "mpg": { "loaded": 1 } }), &ctx);

    assert!(matches!(values, Err(SerializerError::DepthExhausted { .. })));
}

#[test]
fn infer_value_keeps_json_shape() {
    let value = infer_value(&json!({ "n": 1, "f": 1.5, "l": [true, null] }));

    let Value::Map(map) = value else {
        panic!("expected a map");
    };
    assert_eq!(map["n"], Value::Int(1));
    assert_eq!(map["f"], Value::Float(1.5));
    assert_eq!(map["l"], Value::List(vec![Value::Bool(true), Value::Null]));
}
