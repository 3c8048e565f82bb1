//! Registry validation orchestration.

pub mod inheritance;
pub mod naming;
pub mod target;

use crate::{error::ErrorTree, field::FieldDescriptor, registry::SchemaRegistry, schema::DocumentSchema};

/// Run full registry validation in a staged, deterministic order.
pub(crate) fn validate_registry(registry: &SchemaRegistry) -> Result<(), ErrorTree> {
    // Phase 1: validate each schema on its own.
    let mut errors = validate_schemas(registry);

    // Phase 2: cross-schema invariants.
    validate_global(registry, &mut errors);

    errors.result()
}

fn validate_schemas(registry: &SchemaRegistry) -> ErrorTree {
    let mut errors = ErrorTree::new();

    for schema in registry.iter() {
        let mut errs = ErrorTree::new();
        validate_schema(schema, &mut errs);
        errors.merge_for(schema.name.clone(), errs);
    }

    errors
}

fn validate_schema(schema: &DocumentSchema, errs: &mut ErrorTree) {
    naming::validate_schema_naming(schema, errs);

    for field in schema.fields_and_pk() {
        let mut field_errs = ErrorTree::new();
        validate_field(field, &mut field_errs);
        errs.merge_for(field.name.clone(), field_errs);
    }
}

// Local shape checks; cross-schema target checks run in phase 2.
pub(crate) fn validate_field(field: &FieldDescriptor, errs: &mut ErrorTree) {
    naming::validate_field_naming(field, errs);
    target::validate_target_shape(field, errs);

    let c = &field.constraints;
    if let (Some(min), Some(max)) = (c.min_length, c.max_length)
        && min > max
    {
        crate::err!(errs, "min_length {min} exceeds max_length {max}");
    }
    if let (Some(min), Some(max)) = (c.min_value, c.max_value)
        && min > max
    {
        crate::err!(errs, "min_value {min} exceeds max_value {max}");
    }
}

fn validate_global(registry: &SchemaRegistry, errors: &mut ErrorTree) {
    inheritance::validate_parents(registry, errors);
    target::validate_targets(registry, errors);
}
