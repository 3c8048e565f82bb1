//! Scalar input parsing. Every function records its own errors and
//! returns `None` when the value is rejected.

use crate::{
    field::FieldOptions,
    mapping::PrimitiveClass,
    validation::{FieldError, FieldErrorKind, Issues},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use docrest_schema::{
    field::Constraints,
    kind::GeoKind,
    types::ObjectId,
    value::{Coordinates, GeoValue, Value},
};
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use std::sync::LazyLock;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern"));

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)(https?|ftp)://[^\s/$.?#][^\s]*$").expect("static url pattern")
});

const INVALID_INTEGER: &str = "A valid integer is required.";
const INVALID_NUMBER: &str = "A valid number is required.";
const INVALID_BOOLEAN: &str = "Must be a valid boolean.";
const INVALID_STRING: &str = "Not a valid string.";

fn invalid(issues: &mut Issues, message: impl Into<String>) -> Option<Value> {
    issues.add(FieldError::new(FieldErrorKind::Invalid, message));
    None
}

pub(super) fn parse_primitive(
    class: PrimitiveClass,
    opts: &FieldOptions,
    data: &JsonValue,
    issues: &mut Issues,
) -> Option<Value> {
    match class {
        PrimitiveClass::Boolean => parse_boolean(data, issues),
        PrimitiveClass::DateTime => parse_datetime(data, issues),
        PrimitiveClass::Decimal => {
            let Some(value) = parse_decimal(data) else {
                return invalid(issues, INVALID_NUMBER);
            };
            check_bounds(&opts.constraints, value, issues).then_some(Value::Decimal(value))
        }
        PrimitiveClass::Float => {
            let Some(value) = parse_float(data) else {
                return invalid(issues, INVALID_NUMBER);
            };
            let bounded = Decimal::try_from(value)
                .map_or(true, |d| check_bounds(&opts.constraints, d, issues));
            bounded.then_some(Value::Float(value))
        }
        PrimitiveClass::Integer => {
            let Some(value) = parse_integer(data) else {
                return invalid(issues, INVALID_INTEGER);
            };
            check_bounds(&opts.constraints, Decimal::from(value), issues).then_some(Value::Int(value))
        }
        PrimitiveClass::Uuid => match data.as_str().map(|s| Uuid::parse_str(s.trim())) {
            Some(Ok(uuid)) => Some(Value::Uuid(uuid)),
            _ => invalid(issues, "Must be a valid UUID."),
        },
        PrimitiveClass::Email | PrimitiveClass::File | PrimitiveClass::String | PrimitiveClass::Url => {
            parse_text(class, opts, data, issues)
        }
    }
}

fn parse_text(
    class: PrimitiveClass,
    opts: &FieldOptions,
    data: &JsonValue,
    issues: &mut Issues,
) -> Option<Value> {
    let text = match data {
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Number(n) => n.to_string(),
        _ => return invalid(issues, INVALID_STRING),
    };

    if text.is_empty() {
        if opts.allow_blank {
            return Some(Value::String(text));
        }
        issues.add(FieldErrorKind::Blank);
        return None;
    }

    let len = text.chars().count();
    let c = &opts.constraints;
    if let Some(max) = c.max_length
        && len > max
    {
        issues.add(FieldError::new(
            FieldErrorKind::MaxLength,
            format!("Ensure this field has no more than {max} characters."),
        ));
        return None;
    }
    if let Some(min) = c.min_length
        && len < min
    {
        issues.add(FieldError::new(
            FieldErrorKind::MinLength,
            format!("Ensure this field has at least {min} characters."),
        ));
        return None;
    }

    match class {
        PrimitiveClass::Email if !EMAIL.is_match(&text) => {
            invalid(issues, "Enter a valid email address.")
        }
        PrimitiveClass::Url if !URL.is_match(&text) => invalid(issues, "Enter a valid URL."),
        _ => Some(Value::String(text)),
    }
}

#[expect(clippy::cast_possible_truncation)]
fn parse_integer(data: &JsonValue) -> Option<i64> {
    match data {
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            (f.fract() == 0.0 && f.abs() < 9.0e18).then(|| f as i64)
        }),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_float(data: &JsonValue) -> Option<f64> {
    let value = match data {
        JsonValue::Number(n) => n.as_f64()?,
        JsonValue::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };

    value.is_finite().then_some(value)
}

fn parse_decimal(data: &JsonValue) -> Option<Decimal> {
    match data {
        JsonValue::Number(n) => n.to_string().parse().ok(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_boolean(data: &JsonValue, issues: &mut Issues) -> Option<Value> {
    let parsed = match data {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        JsonValue::String(s) => match s.trim() {
            "true" | "True" | "TRUE" | "1" | "yes" | "on" => Some(true),
            "false" | "False" | "FALSE" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    };

    match parsed {
        Some(b) => Some(Value::Bool(b)),
        None => invalid(issues, INVALID_BOOLEAN),
    }
}

fn parse_datetime(data: &JsonValue, issues: &mut Issues) -> Option<Value> {
    match data.as_str().map(|s| OffsetDateTime::parse(s.trim(), &Rfc3339)) {
        Some(Ok(dt)) => Some(Value::DateTime(dt)),
        _ => invalid(issues, "Datetime has wrong format. Use RFC 3339."),
    }
}

fn check_bounds(c: &Constraints, value: Decimal, issues: &mut Issues) -> bool {
    if let Some(min) = c.min_value
        && value < min
    {
        issues.add(FieldError::new(
            FieldErrorKind::MinValue,
            format!("Ensure this value is greater than or equal to {min}."),
        ));
        return false;
    }
    if let Some(max) = c.max_value
        && value > max
    {
        issues.add(FieldError::new(
            FieldErrorKind::MaxValue,
            format!("Ensure this value is less than or equal to {max}."),
        ));
        return false;
    }

    true
}

pub(super) fn parse_object_id(data: &JsonValue, issues: &mut Issues) -> Option<Value> {
    let text = match data {
        JsonValue::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };

    match text.parse::<ObjectId>() {
        Ok(id) => Some(Value::ObjectId(id)),
        Err(_) => invalid(issues, format!("'{text}' is not a valid ObjectId.")),
    }
}

pub(super) fn parse_binary(opts: &FieldOptions, data: &JsonValue, issues: &mut Issues) -> Option<Value> {
    let Some(bytes) = data.as_str().and_then(|s| BASE64.decode(s.trim()).ok()) else {
        return invalid(issues, "Must be valid base64 data.");
    };

    if let Some(max) = opts.constraints.max_bytes
        && bytes.len() > max
    {
        issues.add(FieldError::new(
            FieldErrorKind::MaxBytes,
            format!("Ensure this value has no more than {max} bytes."),
        ));
        return None;
    }

    Some(Value::Binary(bytes))
}

/// GeoJSON input: `{type, coordinates}`, or a bare `[x, y]` pair for the
/// legacy point kind.
pub(super) fn parse_geo(kind: GeoKind, data: &JsonValue, issues: &mut Issues) -> Option<Value> {
    let coordinates = match (kind.type_name(), data) {
        (None, JsonValue::Array(_)) => data,
        (Some(expected), JsonValue::Object(obj)) => {
            if obj.get("type").and_then(JsonValue::as_str) != Some(expected) {
                return invalid(issues, format!("Invalid GeoJSON: expected type '{expected}'."));
            }
            match obj.get("coordinates") {
                Some(coords) => coords,
                None => return invalid(issues, "Invalid GeoJSON: missing coordinates."),
            }
        }
        (None, _) => return invalid(issues, "Expected a [x, y] coordinate pair."),
        (Some(expected), _) => {
            return invalid(issues, format!("Invalid GeoJSON: expected a '{expected}' object."));
        }
    };

    match parse_coordinates(coordinates) {
        Some(coords) if coords.depth() == Some(kind.coordinate_depth()) => Some(Value::Geo(GeoValue {
            kind,
            coordinates: coords,
        })),
        _ => invalid(issues, "Invalid coordinates."),
    }
}

fn parse_coordinates(data: &JsonValue) -> Option<Coordinates> {
    let JsonValue::Array(items) = data else {
        return None;
    };

    if let [JsonValue::Number(x), JsonValue::Number(y)] = items.as_slice() {
        return Some(Coordinates::Position(x.as_f64()?, y.as_f64()?));
    }

    items
        .iter()
        .map(parse_coordinates)
        .collect::<Option<Vec<_>>>()
        .map(Coordinates::Nested)
}
