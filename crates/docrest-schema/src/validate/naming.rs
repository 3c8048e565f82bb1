use crate::{
    MAX_FIELD_NAME_LEN, MAX_SCHEMA_NAME_LEN, error::ErrorTree, field::FieldDescriptor,
    schema::DocumentSchema,
};

/// Field names the serializer layer keeps for itself.
const RESERVED_FIELD_NAMES: &[&str] = &["non_field_errors", "pk"];

pub fn validate_schema_naming(schema: &DocumentSchema, errs: &mut ErrorTree) {
    if let Err(msg) = validate_schema_name(&schema.name) {
        errs.add(msg);
    }
}

pub fn validate_field_naming(field: &FieldDescriptor, errs: &mut ErrorTree) {
    if let Err(msg) = validate_field_name(&field.name) {
        errs.add(msg);
    }
}

/// Schema names are non-empty, ASCII, bounded and dot-free.
pub(crate) fn validate_schema_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("schema name is empty".to_string());
    }
    if name.len() > MAX_SCHEMA_NAME_LEN {
        return Err(format!(
            "schema name '{name}' exceeds max length {MAX_SCHEMA_NAME_LEN}"
        ));
    }
    if !name.is_ascii() {
        return Err(format!("schema name '{name}' must be ASCII"));
    }
    if name.contains('.') {
        return Err(format!("schema name '{name}' must not contain '.'"));
    }

    Ok(())
}

/// Field names must render unambiguously inside error paths.
pub(crate) fn validate_field_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("field name is empty".to_string());
    }
    if name.len() > MAX_FIELD_NAME_LEN {
        return Err(format!(
            "field name '{name}' exceeds max length {MAX_FIELD_NAME_LEN}"
        ));
    }
    if name.contains(['.', '[', ']']) {
        return Err(format!("field name '{name}' must not contain '.', '[' or ']'"));
    }
    if RESERVED_FIELD_NAMES.contains(&name) {
        return Err(format!("the field name '{name}' is reserved"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_characters_in_field_names() {
        assert!(validate_field_name("a.b").is_err());
        assert!(validate_field_name("a[0]").is_err());
        assert!(validate_field_name("").is_err());
    }

    #[test]
    fn rejects_reserved_field_names() {
        assert!(validate_field_name("non_field_errors").is_err());
        assert!(validate_field_name("manufacturer").is_ok());
    }

    #[test]
    fn schema_names_must_be_dot_free() {
        assert!(validate_schema_name("Vehicle.Car").is_err());
        assert!(validate_schema_name("Vehicle").is_ok());
    }
}
