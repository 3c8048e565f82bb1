#![allow(dead_code)]

use docrest::prelude::*;
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// Route engine logs to the test harness; `RUST_LOG` is not consulted.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing_subscriber::filter::LevelFilter::WARN)
            .with_test_writer()
            .try_init();
    });
}

fn finish(schemas: Vec<DocumentSchema>) -> Arc<SchemaRegistry> {
    let mut reg = SchemaRegistry::new();
    for schema in schemas {
        reg.register(schema).expect("schema should register");
    }
    reg.validate().expect("registry should validate");

    Arc::new(reg)
}

/// Vehicles, their makers and mileage records, plus a self-referencing node.
pub fn garage() -> Arc<SchemaRegistry> {
    let manufacturer = DocumentSchema::document("Manufacturer")
        .field(FieldDescriptor::string("name").required())
        .build();
    let mileage = DocumentSchema::embedded("Mileage")
        .field(FieldDescriptor::int("loaded"))
        .field(FieldDescriptor::int("unloaded"))
        .build();
    let vehicle = DocumentSchema::document("Vehicle")
        .field(FieldDescriptor::string("name"))
        .field(FieldDescriptor::int("weight"))
        .build();
    let car = DocumentSchema::document("Car")
        .extends(&vehicle)
        .field(FieldDescriptor::reference("manufacturer", "Manufacturer"))
        .field(FieldDescriptor::list(
            "owners",
            FieldDescriptor::reference("owner", "Manufacturer"),
        ))
        .build();
    let truck = DocumentSchema::document("Truck")
        .extends(&vehicle)
        .field(FieldDescriptor::embedded("mpg", "Mileage"))
        .build();
    let log = DocumentSchema::document("Log")
        .field(FieldDescriptor::list(
            "entries",
            FieldDescriptor::embedded("entry", "Mileage"),
        ))
        .build();
    let node = DocumentSchema::document("Node")
        .field(FieldDescriptor::string("name"))
        .field(FieldDescriptor::reference("parent", "Node"))
        .build();

    finish(vec![manufacturer, mileage, vehicle, car, truck, log, node])
}

/// Every flat scalar kind, for round-trip checks.
pub fn flat() -> Arc<SchemaRegistry> {
    let flat = DocumentSchema::document("Flat")
        .field(FieldDescriptor::boolean("flag"))
        .field(FieldDescriptor::int("count"))
        .field(FieldDescriptor::float("ratio"))
        .field(FieldDescriptor::string("label"))
        .field(FieldDescriptor::new("price", FieldKind::Decimal))
        .field(FieldDescriptor::new("uid", FieldKind::Uuid))
        .field(FieldDescriptor::new("seen", FieldKind::DateTime))
        .field(FieldDescriptor::object_id("ref_id"))
        .build();

    finish(vec![flat])
}

/// Base → A (x), Base → B (y).
pub fn shapes() -> Arc<SchemaRegistry> {
    let base = DocumentSchema::document("Base")
        .field(FieldDescriptor::string("label"))
        .build();
    let a = DocumentSchema::document("A")
        .extends(&base)
        .field(FieldDescriptor::int("x"))
        .build();
    let b = DocumentSchema::document("B")
        .extends(&base)
        .field(FieldDescriptor::int("y"))
        .build();

    finish(vec![base, a, b])
}

pub fn doc(reg: &SchemaRegistry, schema: &str) -> Document {
    Document::new(reg.get(schema).expect("schema should exist"))
}
