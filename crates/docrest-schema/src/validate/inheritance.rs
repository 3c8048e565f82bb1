use crate::{err, error::ErrorTree, registry::SchemaRegistry};

/// Parents must exist, share the child's flavour and never loop.
pub fn validate_parents(registry: &SchemaRegistry, errors: &mut ErrorTree) {
    for schema in registry.iter() {
        let Some(parent) = &schema.parent else {
            continue;
        };
        let mut errs = ErrorTree::new();

        match registry.get(parent) {
            Ok(parent_schema) if parent_schema.flavour != schema.flavour => {
                err!(
                    errs,
                    "parent '{parent}' is {} but '{}' is {}",
                    parent_schema.flavour,
                    schema.name,
                    schema.flavour
                );
            }
            Ok(_) => {}
            Err(e) => errs.add(e),
        }

        if let Ok(chain) = registry.ancestors(&schema.name)
            && chain.len() > registry.len()
        {
            err!(errs, "inheritance cycle through '{parent}'");
        }

        errors.merge_for(schema.name.clone(), errs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DocumentSchema;

    #[test]
    fn missing_parent_is_reported() {
        let mut orphan = DocumentSchema::document("Orphan").build();
        orphan.parent = Some("Ghost".to_string());

        let reg = SchemaRegistry::new()
            .with(orphan)
            .expect("registration should succeed");
        let mut errs = ErrorTree::new();
        validate_parents(&reg, &mut errs);

        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let mut looped = DocumentSchema::document("Loop").build();
        looped.parent = Some("Loop".to_string());

        let reg = SchemaRegistry::new()
            .with(looped)
            .expect("registration should succeed");
        let mut errs = ErrorTree::new();
        validate_parents(&reg, &mut errs);

        assert!(errs.to_string().contains("cycle"));
    }
}
