use docrest_schema::value::Value;

///
/// ValueClass
///
/// Runtime shape of a value held by a dynamic or dict field.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueClass {
    Document,
    List,
    Map,
    Reference,
    Scalar,
}

/// Classify a runtime value; every dynamic value maps to exactly one class.
#[must_use]
pub const fn classify(value: &Value) -> ValueClass {
    match value {
        Value::Reference(_) => ValueClass::Reference,
        Value::Embedded(_) => ValueClass::Document,
        Value::List(_) => ValueClass::List,
        Value::Map(_) => ValueClass::Map,
        _ => ValueClass::Scalar,
    }
}
