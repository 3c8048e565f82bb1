use docrest_schema::{
    field::FieldDescriptor, kind::FieldKind, registry::SchemaRegistry, schema::DocumentSchema,
};

fn finish(schemas: Vec<DocumentSchema>) -> SchemaRegistry {
    let mut reg = SchemaRegistry::new();
    for schema in schemas {
        reg.register(schema).expect("fixture schema should register");
    }
    reg.validate().expect("fixture registry should validate");

    reg
}

/// Garage hierarchy plus one schema per field kind family.
pub(crate) fn registry() -> SchemaRegistry {
    let manufacturer = DocumentSchema::document("Manufacturer")
        .field(FieldDescriptor::string("name").required())
        .build();

    let mileage = DocumentSchema::embedded("Mileage")
        .field(FieldDescriptor::int("loaded"))
        .field(FieldDescriptor::int("unloaded"))
        .build();
    let fuel_mileage = DocumentSchema::embedded("FuelMileage")
        .extends(&mileage)
        .field(FieldDescriptor::int("e85"))
        .field(FieldDescriptor::int("unleaded"))
        .build();

    let vehicle = DocumentSchema::document("Vehicle")
        .field(FieldDescriptor::string("name"))
        .field(FieldDescriptor::int("weight"))
        .field(FieldDescriptor::string("manufacturer"))
        .build();
    let car = DocumentSchema::document("Car")
        .extends(&vehicle)
        .field(FieldDescriptor::reference("manufacturer", "Manufacturer"))
        .field(FieldDescriptor::int("mpg"))
        .build();
    let truck = DocumentSchema::document("Truck")
        .extends(&vehicle)
        .field(FieldDescriptor::embedded("mpg", "Mileage"))
        .build();

    let node = DocumentSchema::document("Node")
        .field(FieldDescriptor::string("name"))
        .field(FieldDescriptor::reference("parent", "Node"))
        .build();

    let log = DocumentSchema::document("Log")
        .field(FieldDescriptor::list(
            "entries",
            FieldDescriptor::embedded("entry", "Mileage"),
        ))
        .build();

    let profile = DocumentSchema::document("Profile")
        .dynamic()
        .field(FieldDescriptor::string("name"))
        .build();

    let sample = DocumentSchema::document("Sample")
        .field(FieldDescriptor::boolean("flag"))
        .field(FieldDescriptor::int("count").default_value(0).min_value(0))
        .field(FieldDescriptor::float("ratio"))
        .field(FieldDescriptor::new("price", FieldKind::Decimal))
        .field(FieldDescriptor::string("title").default_value("untitled").max_length(20))
        .field(FieldDescriptor::new("email", FieldKind::Email))
        .field(FieldDescriptor::new("url", FieldKind::Url))
        .field(FieldDescriptor::new("uid", FieldKind::Uuid))
        .field(FieldDescriptor::new("created", FieldKind::DateTime))
        .field(FieldDescriptor::new("blob", FieldKind::Binary).max_bytes(8))
        .field(FieldDescriptor::new("location", FieldKind::Point))
        .field(FieldDescriptor::object_id("oid"))
        .field(FieldDescriptor::list("tags", FieldDescriptor::string("tag")))
        .field(FieldDescriptor::map("scores", FieldDescriptor::int("score")))
        .field(FieldDescriptor::dict("extra"))
        .build();

    finish(vec![
        manufacturer,
        mileage,
        fuel_mileage,
        vehicle,
        car,
        truck,
        node,
        log,
        profile,
        sample,
    ])
}

/// Minimal diamond-free hierarchy: Base → A → AA, Base → B.
pub(crate) fn shapes() -> SchemaRegistry {
    let base = DocumentSchema::document("Base")
        .field(FieldDescriptor::string("label"))
        .build();
    let a = DocumentSchema::document("A")
        .extends(&base)
        .field(FieldDescriptor::int("x"))
        .build();
    let aa = DocumentSchema::document("AA")
        .extends(&a)
        .field(FieldDescriptor::int("z"))
        .build();
    let b = DocumentSchema::document("B")
        .extends(&base)
        .field(FieldDescriptor::int("y"))
        .build();

    finish(vec![base, a, aa, b])
}
