use crate::{
    error::SchemaError,
    schema::DocumentSchema,
    validate::validate_registry,
};
use indexmap::IndexMap;
use std::sync::Arc;

///
/// SchemaRegistry
///
/// Arena of document schemas keyed by name, in registration order.
/// Parents must be registered before their subclasses.
///

#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, Arc<DocumentSchema>>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema: DocumentSchema) -> Result<Arc<DocumentSchema>, SchemaError> {
        if self.schemas.contains_key(&schema.name) {
            return Err(SchemaError::DuplicateSchema(schema.name));
        }

        let schema = Arc::new(schema);
        self.schemas
            .insert(schema.name.clone(), Arc::clone(&schema));

        Ok(schema)
    }

    /// Register and return `self`; convenient for fixtures.
    pub fn with(mut self, schema: DocumentSchema) -> Result<Self, SchemaError> {
        self.register(schema)?;

        Ok(self)
    }

    pub fn get(&self, name: &str) -> Result<&Arc<DocumentSchema>, SchemaError> {
        self.schemas
            .get(name)
            .ok_or_else(|| SchemaError::UnknownSchema(name.to_string()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<DocumentSchema>> {
        self.schemas.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Inheritance chain of `name`, root first, ending with `name` itself.
    pub fn ancestors(&self, name: &str) -> Result<Vec<Arc<DocumentSchema>>, SchemaError> {
        let mut chain = Vec::new();
        let mut cursor = Some(name.to_string());

        while let Some(current) = cursor {
            // a parent loop can never be longer than the arena
            if chain.len() > self.schemas.len() {
                break;
            }
            let schema = self.get(&current)?;
            cursor = schema.parent.clone();
            chain.push(Arc::clone(schema));
        }
        chain.reverse();

        Ok(chain)
    }

    /// True when `child` is `base` or descends from it.
    #[must_use]
    pub fn is_subclass(&self, child: &str, base: &str) -> bool {
        self.ancestors(child)
            .is_ok_and(|chain| chain.iter().any(|s| s.name == base))
    }

    /// Every strict descendant of `name`, in registration order.
    #[must_use]
    pub fn subclasses(&self, name: &str) -> Vec<Arc<DocumentSchema>> {
        self.schemas
            .values()
            .filter(|s| s.name != name && self.is_subclass(&s.name, name))
            .cloned()
            .collect()
    }

    /// Dotted inheritance path, e.g. `Vehicle.Car`.
    pub fn class_path(&self, name: &str) -> Result<String, SchemaError> {
        let names: Vec<_> = self
            .ancestors(name)?
            .iter()
            .map(|s| s.name.clone())
            .collect();

        Ok(names.join("."))
    }

    /// Resolve a model reference such as `app.Model`, `Vehicle.Car` or `Car`.
    pub fn resolve_model(&self, path: &str) -> Result<&Arc<DocumentSchema>, SchemaError> {
        let name = path.rsplit('.').next().unwrap_or(path);

        self.schemas
            .get(name)
            .ok_or_else(|| SchemaError::UnknownModel(path.to_string()))
    }

    /// Run staged validation over every registered schema.
    pub fn validate(&self) -> Result<(), SchemaError> {
        validate_registry(self).map_err(SchemaError::Validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDescriptor;

    fn hierarchy() -> SchemaRegistry {
        let vehicle = DocumentSchema::document("Vehicle")
            .field(FieldDescriptor::string("name"))
            .build();
        let car = DocumentSchema::document("Car")
            .extends(&vehicle)
            .field(FieldDescriptor::int("mpg"))
            .build();
        let sports = DocumentSchema::document("SportsCar")
            .extends(&car)
            .build();
        let truck = DocumentSchema::document("Truck")
            .extends(&vehicle)
            .build();

        SchemaRegistry::new()
            .with(vehicle)
            .and_then(|r| r.with(car))
            .and_then(|r| r.with(sports))
            .and_then(|r| r.with(truck))
            .expect("fixture registration should succeed")
    }

    #[test]
    fn ancestors_are_root_first() {
        let reg = hierarchy();
        let names: Vec<_> = reg
            .ancestors("SportsCar")
            .expect("known schema")
            .iter()
            .map(|s| s.name.clone())
            .collect();

        assert_eq!(names, vec!["Vehicle", "Car", "SportsCar"]);
        assert_eq!(reg.class_path("SportsCar").expect("path"), "Vehicle.Car.SportsCar");
    }

    #[test]
    fn subclasses_exclude_siblings() {
        let reg = hierarchy();
        let names: Vec<_> = reg.subclasses("Car").iter().map(|s| s.name.clone()).collect();

        assert_eq!(names, vec!["SportsCar"]);
        assert!(reg.is_subclass("Truck", "Vehicle"));
        assert!(!reg.is_subclass("Truck", "Car"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let reg = hierarchy();
        let err = reg
            .with(DocumentSchema::document("Car").build())
            .expect_err("duplicate should fail");

        assert!(matches!(err, SchemaError::DuplicateSchema(name) if name == "Car"));
    }

    #[test]
    fn resolve_model_takes_last_segment() {
        let reg = hierarchy();

        assert_eq!(reg.resolve_model("garage.Truck").expect("resolves").name, "Truck");
        assert!(matches!(
            reg.resolve_model("garage.Boat"),
            Err(SchemaError::UnknownModel(_))
        ));
    }
}
