use crate::{
    err,
    error::ErrorTree,
    field::{FieldDescriptor, FieldTarget},
    registry::SchemaRegistry,
    schema::Flavour,
};

/// Check that a descriptor's target matches its kind.
pub fn validate_target_shape(field: &FieldDescriptor, errs: &mut ErrorTree) {
    let kind = &field.kind;

    match &field.target {
        FieldTarget::Schema(_) if kind.targets_schema() => {}
        FieldTarget::Element(element) if kind.is_container() => {
            let mut element_errs = ErrorTree::new();
            super::validate_field(element, &mut element_errs);
            errs.merge_for("element", element_errs);
        }
        FieldTarget::None if !kind.targets_schema() && !kind.is_container() => {}
        FieldTarget::None => err!(errs, "{kind} '{}' is missing its target", field.name),
        _ => err!(errs, "{kind} '{}' has a target it cannot use", field.name),
    }
}

/// Every schema target must be registered with a compatible flavour.
pub fn validate_targets(registry: &SchemaRegistry, errors: &mut ErrorTree) {
    for schema in registry.iter() {
        let mut errs = ErrorTree::new();
        for field in schema.fields_and_pk() {
            check_field_target(registry, field, &mut errs);
        }
        errors.merge_for(schema.name.clone(), errs);
    }
}

fn check_field_target(registry: &SchemaRegistry, field: &FieldDescriptor, errs: &mut ErrorTree) {
    match &field.target {
        FieldTarget::Schema(target) => {
            let Ok(schema) = registry.get(target) else {
                errs.add_for(field.name.clone(), format!("target schema '{target}' not found"));
                return;
            };

            let expected = if field.kind.is_embedded() {
                Flavour::Embedded
            } else {
                Flavour::Document
            };
            if schema.flavour != expected {
                errs.add_for(
                    field.name.clone(),
                    format!(
                        "{} target '{target}' must be a {expected} schema",
                        field.kind
                    ),
                );
            }
        }
        FieldTarget::Element(element) => check_field_target(registry, element, errs),
        FieldTarget::None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{kind::FieldKind, schema::DocumentSchema};

    #[test]
    fn reference_without_target_is_reported() {
        let mut errs = ErrorTree::new();
        validate_target_shape(&FieldDescriptor::new("owner", FieldKind::Reference), &mut errs);

        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn embedded_target_must_be_embedded_flavour() {
        let person = DocumentSchema::document("Person").build();
        let team = DocumentSchema::document("Team")
            .field(FieldDescriptor::list(
                "members",
                FieldDescriptor::embedded("member", "Person"),
            ))
            .build();
        let reg = SchemaRegistry::new()
            .with(person)
            .and_then(|r| r.with(team))
            .expect("registration should succeed");

        let mut errs = ErrorTree::new();
        validate_targets(&reg, &mut errs);

        assert_eq!(errs.flatten()[0].0, "Team.members");
    }

    #[test]
    fn missing_reference_target_is_reported() {
        let car = DocumentSchema::document("Car")
            .field(FieldDescriptor::reference("maker", "Manufacturer"))
            .build();
        let reg = SchemaRegistry::new()
            .with(car)
            .expect("registration should succeed");

        let mut errs = ErrorTree::new();
        validate_targets(&reg, &mut errs);

        assert!(errs.to_string().contains("'Manufacturer' not found"));
    }
}
