use crate::{
    chain::{ChainScope, PolymorphicChainMap},
    error::SerializerError,
    field::{
        AttributeFn, BuildContext, FieldBuilder, FieldNode, FieldTree, NestedNode, SerializerField,
        build::apply_extra_kwargs,
    },
    hyperlink::UriResolver,
    introspect::{FieldInfo, PK_ALIAS, introspect, introspect_polymorphic},
    serializer::{
        FormData,
        config::SerializerConfig,
        nested::raise_errors_on_nested_writes,
    },
    store::{DocumentStore, StoreError},
    transform::{
        TransformContext, document_from, infer_value, represent_document,
        represent_dynamic_values, represent_slot, validate_mapping,
    },
    validation::{FieldError, FieldErrorKind, Issues, ValidationErrors},
};
use derive_more::Display;
use docrest_schema::{
    field::FieldDescriptor, instance::Document, registry::SchemaRegistry, schema::DocumentSchema,
    value::Value,
};
use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

/// Validated input, keyed by each field's source.
pub type ValidatedData = IndexMap<String, Value>;

/// Serializer-level validator; an `Err` message lands in `non_field_errors`.
pub type ValidatorFn = Arc<dyn Fn(&ValidatedData) -> Result<(), String> + Send + Sync>;

///
/// SerializerFlavour
///
/// Document    → top-level documents, saved through the store.
/// Embedded    → embedded documents; create builds without saving.
/// Dynamic     → also carries undeclared values in and out.
/// Polymorphic → fields merged from every subclass; output follows the
///               instance's concrete schema.
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum SerializerFlavour {
    #[default]
    Document,
    Dynamic,
    Embedded,
    Polymorphic,
}

///
/// DeclaredField
/// a field declared on the serializer rather than derived from the schema
///

#[derive(Clone)]
#[remain::sorted]
pub enum DeclaredField {
    Attribute(AttributeFn),
    Nested {
        serializer: Arc<DocumentSerializer>,
        source: Option<String>,
        read_only: bool,
    },
    Source {
        source: String,
        read_only: bool,
    },
}

impl fmt::Debug for DeclaredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(_) => f.write_str("Attribute(..)"),
            Self::Nested {
                serializer,
                source,
                read_only,
            } => f
                .debug_struct("Nested")
                .field("serializer", &serializer.name())
                .field("source", source)
                .field("read_only", read_only)
                .finish(),
            Self::Source { source, read_only } => f
                .debug_struct("Source")
                .field("source", source)
                .field("read_only", read_only)
                .finish(),
        }
    }
}

///
/// DocumentSerializerBuilder
///

pub struct DocumentSerializerBuilder {
    registry: Arc<SchemaRegistry>,
    config: SerializerConfig,
    flavour: SerializerFlavour,
    declared: IndexMap<String, DeclaredField>,
    validators: Vec<ValidatorFn>,
    store: Option<Arc<dyn DocumentStore>>,
    uris: Option<Arc<dyn UriResolver>>,
    cache: Option<Arc<PolymorphicChainMap>>,
}

impl DocumentSerializerBuilder {
    #[must_use]
    pub const fn flavour(mut self, flavour: SerializerFlavour) -> Self {
        self.flavour = flavour;
        self
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn uri_resolver(mut self, uris: Arc<dyn UriResolver>) -> Self {
        self.uris = Some(uris);
        self
    }

    #[must_use]
    pub fn declare(mut self, name: impl Into<String>, field: DeclaredField) -> Self {
        self.declared.insert(name.into(), field);
        self
    }

    /// Declare a read-only computed attribute.
    #[must_use]
    pub fn attribute<F>(self, name: impl Into<String>, attr: F) -> Self
    where
        F: Fn(&Document) -> JsonValue + Send + Sync + 'static,
    {
        self.declare(name, DeclaredField::Attribute(Arc::new(attr)))
    }

    /// Declare a writable nested serializer sourced from the field of the same name.
    #[must_use]
    pub fn nested(self, name: impl Into<String>, serializer: Arc<DocumentSerializer>) -> Self {
        self.declare(
            name,
            DeclaredField::Nested {
                serializer,
                source: None,
                read_only: false,
            },
        )
    }

    #[must_use]
    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&ValidatedData) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Share a dynamic-field cache with other serializers.
    #[must_use]
    pub fn cache(mut self, cache: Arc<PolymorphicChainMap>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> Result<DocumentSerializer, SerializerError> {
        self.config.validate()?;
        let name = self.config.display_name();

        let schema = self
            .registry
            .resolve_model(&self.config.model)
            .map_err(|e| SerializerError::misconfigured(&name, e.to_string()))?;
        let schema = Arc::clone(schema);

        self.check_flavour(&name, &schema)?;
        self.check_declared(&name, &schema)?;

        let serializer = DocumentSerializer {
            name,
            registry: self.registry,
            schema,
            config: self.config,
            flavour: self.flavour,
            declared: self.declared,
            validators: self.validators,
            store: self.store,
            uris: self.uris,
            cache: self.cache.unwrap_or_default(),
            fields: RwLock::new(None),
            chain: RwLock::new(None),
        };

        // unknown field names and unsupported kinds fail here, not on first use
        serializer.fields()?;

        Ok(serializer)
    }

    fn check_flavour(&self, name: &str, schema: &DocumentSchema) -> Result<(), SerializerError> {
        let message = match self.flavour {
            SerializerFlavour::Embedded if !schema.is_embedded() => {
                format!("'{}' is not an embedded document", schema.name)
            }
            SerializerFlavour::Document | SerializerFlavour::Polymorphic if schema.is_embedded() => {
                format!(
                    "'{}' is an embedded document; use the embedded flavour",
                    schema.name
                )
            }
            SerializerFlavour::Dynamic if !schema.dynamic => {
                format!("'{}' is not a dynamic document", schema.name)
            }
            _ => return Ok(()),
        };

        Err(SerializerError::misconfigured(name, message))
    }

    fn check_declared(&self, name: &str, schema: &DocumentSchema) -> Result<(), SerializerError> {
        for field in self.declared.keys() {
            if field.is_empty() || field.contains(['.', '[', ']']) {
                return Err(SerializerError::misconfigured(
                    name,
                    format!("'{field}' is not a valid field name"),
                ));
            }
        }

        if let Some(fields) = &self.config.fields
            && let Some(missing) = self.declared.keys().find(|d| !fields.contains(d))
        {
            return Err(SerializerError::misconfigured(
                name,
                format!("the field '{missing}' was declared on the serializer but is not in 'fields'"),
            ));
        }

        if let Some(exclude) = &self.config.exclude {
            for field in exclude {
                if self.declared.contains_key(field) {
                    return Err(SerializerError::misconfigured(
                        name,
                        format!("cannot exclude '{field}': it is declared on the serializer"),
                    ));
                }
                if field != PK_ALIAS && schema.field(field).is_none() {
                    return Err(SerializerError::misconfigured(
                        name,
                        format!("cannot exclude '{field}': it is not a field of '{}'", schema.name),
                    ));
                }
            }
        }

        Ok(())
    }
}

///
/// DocumentSerializer
///
/// Reusable, thread-safe serializer for one schema. The field tree is built
/// on first use and memoized; `reset` drops it after a schema reload.
///

pub struct DocumentSerializer {
    name: String,
    registry: Arc<SchemaRegistry>,
    schema: Arc<DocumentSchema>,
    config: SerializerConfig,
    flavour: SerializerFlavour,
    declared: IndexMap<String, DeclaredField>,
    validators: Vec<ValidatorFn>,
    store: Option<Arc<dyn DocumentStore>>,
    uris: Option<Arc<dyn UriResolver>>,
    cache: Arc<PolymorphicChainMap>,
    fields: RwLock<Option<Arc<FieldTree>>>,
    chain: RwLock<Option<Arc<PolymorphicChainMap>>>,
}

impl fmt::Debug for DocumentSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSerializer")
            .field("name", &self.name)
            .field("model", &self.schema.name)
            .field("flavour", &self.flavour)
            .field("depth", &self.config.depth)
            .field("declared", &self.declared)
            .finish_non_exhaustive()
    }
}

impl DocumentSerializer {
    #[must_use]
    pub fn builder(registry: Arc<SchemaRegistry>, config: SerializerConfig) -> DocumentSerializerBuilder {
        DocumentSerializerBuilder {
            registry,
            config,
            flavour: SerializerFlavour::default(),
            declared: IndexMap::new(),
            validators: Vec::new(),
            store: None,
            uris: None,
            cache: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn schema(&self) -> &Arc<DocumentSchema> {
        &self.schema
    }

    #[must_use]
    pub const fn config(&self) -> &SerializerConfig {
        &self.config
    }

    #[must_use]
    pub const fn flavour(&self) -> SerializerFlavour {
        self.flavour
    }

    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.flavour == SerializerFlavour::Embedded
    }

    /// Drop memoized trees and cached chain links.
    pub fn reset(&self) {
        *self.fields.write().unwrap_or_else(PoisonError::into_inner) = None;
        *self.chain.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.cache.clear();
    }

    ///
    /// FIELDS
    ///

    /// The root field tree, built on first use.
    pub fn fields(&self) -> Result<Arc<FieldTree>, SerializerError> {
        if let Some(tree) = self
            .fields
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(Arc::clone(tree));
        }

        let tree = Arc::new(self.build_fields()?);
        *self.fields.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&tree));

        Ok(tree)
    }

    fn build_context(&self) -> BuildContext<'_> {
        BuildContext::new(&self.registry)
            .dereference(self.config.dereference)
            .hyperlink(self.config.hyperlink)
    }

    fn field_info(&self) -> Result<FieldInfo, SerializerError> {
        Ok(match self.flavour {
            SerializerFlavour::Polymorphic => introspect_polymorphic(&self.registry, &self.schema)?,
            _ => introspect(&self.schema),
        })
    }

    // `fields` as configured, else pk + declared + schema fields minus `exclude`.
    fn field_names(&self, info: &FieldInfo) -> Vec<String> {
        if let Some(fields) = &self.config.fields {
            return fields.clone();
        }

        let mut names: Vec<String> = info.pk_name().map(ToString::to_string).into_iter().collect();
        for name in self.declared.keys().chain(info.fields.keys()) {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        if let Some(exclude) = &self.config.exclude {
            names.retain(|n| !exclude.contains(n));
        }

        names
    }

    fn build_fields(&self) -> Result<FieldTree, SerializerError> {
        let builder = FieldBuilder::new(self.build_context());
        let info = self.field_info()?;
        let depth = self.config.depth;

        tracing::debug!(serializer = %self.name, model = %self.schema.name, depth, "building serializer fields");

        let mut tree = FieldTree::new();
        for name in self.field_names(&info) {
            let field = if let Some(declared) = self.declared.get(&name) {
                self.declared_field(&name, declared, &builder)?
            } else if let Some(descriptor) = info.fields_and_pk.get(&name) {
                let mut field = builder.build_field(descriptor, depth)?;
                field.name.clone_from(&name);
                field
            } else {
                return Err(SerializerError::misconfigured(
                    &self.name,
                    format!("'{name}' is not a valid field for model '{}'", self.schema.name),
                ));
            };

            tree.insert(name, Arc::new(self.finish_field(field)));
        }

        Ok(tree)
    }

    fn finish_field(&self, mut field: SerializerField) -> SerializerField {
        if let Some(extras) = self.config.extra_kwargs.get(&field.name) {
            apply_extra_kwargs(&mut field, extras);
        }

        field
    }

    fn declared_field(
        &self,
        name: &str,
        declared: &DeclaredField,
        builder: &FieldBuilder<'_>,
    ) -> Result<SerializerField, SerializerError> {
        let field = match declared {
            DeclaredField::Attribute(attr) => SerializerField::attribute(name, Arc::clone(attr)),

            DeclaredField::Nested {
                serializer,
                source,
                read_only,
            } => {
                let mut field = SerializerField::new(
                    name,
                    FieldNode::Nested(NestedNode {
                        serializer: Arc::clone(serializer),
                    }),
                );
                if let Some(source) = source {
                    field.source.clone_from(source);
                }
                field.depth = self.config.depth;
                field.options.read_only = *read_only;
                field.options.allow_null = true;
                field
            }

            DeclaredField::Source { source, read_only } => {
                let descriptor = self.source_descriptor(source).ok_or_else(|| {
                    SerializerError::misconfigured(
                        &self.name,
                        format!("declared field '{name}' has unknown source '{source}'"),
                    )
                })?;
                let mut field = builder.build_field(&descriptor, self.config.depth)?;
                field.name = name.to_string();
                field.source.clone_from(source);
                if *read_only {
                    field.options.read_only = true;
                    field.options.required = false;
                }
                field
            }
        };

        Ok(field)
    }

    // Walk a dotted source through reference and embedded targets.
    fn source_descriptor(&self, source: &str) -> Option<Arc<FieldDescriptor>> {
        let mut schema = Arc::clone(&self.schema);
        let mut segments = source.split('.').peekable();

        while let Some(segment) = segments.next() {
            let descriptor = schema.field(segment)?;
            if segments.peek().is_none() {
                return Some(Arc::clone(descriptor));
            }
            schema = Arc::clone(self.registry.get(descriptor.target_schema()?).ok()?);
        }

        None
    }

    ///
    /// OUTPUT
    ///

    pub fn to_representation(&self, instance: &Document) -> Result<JsonValue, SerializerError> {
        let ctx = TransformContext::new(&self.registry, &self.cache)
            .with_build(self.build_context())
            .with_store(self.store.as_deref())
            .with_uris(self.uris.as_deref());

        self.represent_with(instance, &ctx)
    }

    pub fn to_representation_many(&self, instances: &[Document]) -> Result<Vec<JsonValue>, SerializerError> {
        instances
            .iter()
            .map(|doc| self.to_representation(doc))
            .collect()
    }

    /// Representation as a nested serializer inside another one; the
    /// outer pass's store and URI resolver take precedence.
    pub(crate) fn represent_in(
        &self,
        instance: &Document,
        outer: &TransformContext<'_>,
    ) -> Result<JsonValue, SerializerError> {
        let ctx = TransformContext::new(&self.registry, &self.cache)
            .with_build(self.build_context())
            .with_store(outer.store.or(self.store.as_deref()))
            .with_uris(outer.uris.or(self.uris.as_deref()));

        self.represent_with(instance, &ctx)
    }

    fn represent_with(
        &self,
        instance: &Document,
        ctx: &TransformContext<'_>,
    ) -> Result<JsonValue, SerializerError> {
        let tree = self.fields()?;

        let out = match self.flavour {
            SerializerFlavour::Polymorphic => self.represent_polymorphic(&tree, instance, ctx)?,
            SerializerFlavour::Dynamic => {
                let mut out = represent_document(&tree, instance, ctx)?;
                let dynamic = represent_dynamic_values(instance, self.config.depth, ctx)?;
                out.extend(dynamic);
                out
            }
            SerializerFlavour::Document | SerializerFlavour::Embedded => {
                represent_document(&tree, instance, ctx)?
            }
        };

        Ok(JsonValue::Object(out))
    }

    fn chain_map(&self, tree: &FieldTree) -> Arc<PolymorphicChainMap> {
        if let Some(map) = self
            .chain
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Arc::clone(map);
        }

        let map = Arc::new(PolymorphicChainMap::seeded(
            self.schema.name.clone(),
            ChainScope::of(&self.build_context(), self.config.depth),
            tree.clone(),
        ));
        *self.chain.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&map));

        map
    }

    // Iterate the instance's own values so each concrete subclass is
    // rendered with its most derived field definitions.
    fn represent_polymorphic(
        &self,
        tree: &FieldTree,
        instance: &Document,
        ctx: &TransformContext<'_>,
    ) -> Result<JsonMap<String, JsonValue>, SerializerError> {
        let depth = self.config.depth;
        let builder = FieldBuilder::new(self.build_context());
        let chain = self.chain_map(tree);
        let scope = ChainScope::of(&builder.context(), depth);
        let link = chain.resolve(&self.registry, instance.schema_name(), scope, |d| {
            builder
                .build_field(d, depth)
                .map(|f| Arc::new(self.finish_field(f)))
        })?;

        let mut out = JsonMap::new();
        for (name, value) in instance.values() {
            if !tree.contains_key(name) {
                continue;
            }
            let Some(field) = link.get(name) else {
                continue;
            };
            if field.is_write_only() {
                continue;
            }
            out.insert(name.to_string(), represent_slot(field, Some(value), ctx)?);
        }

        // declared fields and the pk alias are not instance values
        let extra = tree
            .iter()
            .filter(|(name, _)| !out.contains_key(name.as_str()))
            .filter(|(name, _)| self.declared.contains_key(name.as_str()) || name.as_str() == PK_ALIAS);
        let mut tail = FieldTree::new();
        for (name, field) in extra {
            tail.insert(name.clone(), Arc::clone(field));
        }
        out.extend(represent_document(&tail, instance, ctx)?);

        Ok(out)
    }

    ///
    /// INPUT
    ///

    /// Validate `data`; per-field problems come back as one
    /// `SerializerError::Validation`, fatal problems as their own variants.
    pub fn to_internal(&self, data: &JsonValue) -> Result<ValidatedData, SerializerError> {
        let ctx = TransformContext::new(&self.registry, &self.cache)
            .with_build(self.build_context())
            .with_store(self.store.as_deref())
            .with_uris(self.uris.as_deref());

        let mut issues = Issues::new();
        let JsonValue::Object(obj) = data else {
            issues.add(FieldError::new(
                FieldErrorKind::Invalid,
                format!("Invalid data. Expected a dictionary, but got {}.", json_type(data)),
            ));
            return Err(SerializerError::Validation(issues.finish()));
        };

        let values = self.validate_in(obj, &ctx, &mut issues)?;

        if issues.count() == 0 {
            for validator in &self.validators {
                if let Err(message) = validator(&values) {
                    issues.add(FieldError::new(FieldErrorKind::Custom, message));
                }
            }
        }

        let errors = issues.finish();
        if errors.is_empty() {
            Ok(values)
        } else {
            Err(SerializerError::Validation(errors))
        }
    }

    /// Field-level validation against this serializer's tree, recording
    /// errors relative to the caller's current path.
    pub(crate) fn validate_in(
        &self,
        obj: &JsonMap<String, JsonValue>,
        outer: &TransformContext<'_>,
        issues: &mut Issues,
    ) -> Result<ValidatedData, SerializerError> {
        let tree = self.fields()?;
        let ctx = TransformContext::new(&self.registry, &self.cache)
            .with_build(self.build_context())
            .with_store(outer.store.or(self.store.as_deref()))
            .with_uris(outer.uris.or(self.uris.as_deref()));

        let mut values = validate_mapping(&tree, obj, &ctx, issues)?;

        if self.flavour == SerializerFlavour::Dynamic {
            for (key, data) in obj {
                if !tree.contains_key(key) {
                    values.insert(key.clone(), infer_value(data));
                }
            }
        }

        Ok(values)
    }

    ///
    /// BINDING
    ///

    #[must_use]
    pub fn bind(&self, data: JsonValue) -> BoundSerializer<'_> {
        BoundSerializer::new(self, None, data)
    }

    #[must_use]
    pub fn bind_instance(&self, instance: Document, data: JsonValue) -> BoundSerializer<'_> {
        BoundSerializer::new(self, Some(instance), data)
    }

    /// Bind flat form input, expanded against the root field names.
    pub fn bind_form(&self, form: &FormData) -> Result<BoundSerializer<'_>, SerializerError> {
        let tree = self.fields()?;

        Ok(self.bind(form.to_json(&tree)))
    }

    ///
    /// PERSISTENCE
    ///

    /// Build a new instance from validated data and save it. Embedded
    /// sub-serializers build their documents first.
    #[tracing::instrument(skip_all, fields(serializer = %self.name))]
    pub fn create(&self, validated: &ValidatedData) -> Result<Document, SerializerError> {
        let tree = self.fields()?;
        raise_errors_on_nested_writes("create", &self.name, &tree, validated)?;
        let mut values = validated.clone();

        for (source, nested) in embedded_nested(&tree) {
            if let Some(Value::Map(sub)) = values.get(source) {
                let doc = nested.create(sub)?;
                values.insert(source.to_string(), Value::Embedded(Box::new(doc)));
            }
        }

        let mut doc = document_from(&self.schema, values);
        if self.is_embedded() {
            return Ok(doc);
        }

        self.persist(&mut doc)?;

        Ok(doc)
    }

    /// Apply validated data to a copy of `instance` and save it. Embedded
    /// sub-serializers update their documents first.
    #[tracing::instrument(skip_all, fields(serializer = %self.name))]
    pub fn update(&self, instance: &Document, validated: &ValidatedData) -> Result<Document, SerializerError> {
        let tree = self.fields()?;
        raise_errors_on_nested_writes("update", &self.name, &tree, validated)?;
        let mut doc = instance.clone();
        let mut handled = Vec::new();

        for (source, nested) in embedded_nested(&tree) {
            let Some(Value::Map(sub)) = validated.get(source) else {
                continue;
            };
            let updated = match doc.get(source) {
                Some(Value::Embedded(existing)) => nested.update(existing, sub)?,
                _ => nested.create(sub)?,
            };
            doc.set(source, Value::Embedded(Box::new(updated)));
            handled.push(source);
        }

        for (name, value) in validated {
            if !handled.contains(&name.as_str()) {
                doc.set(name, value.clone());
            }
        }

        if self.is_embedded() {
            return Ok(doc);
        }

        self.persist(&mut doc)?;

        Ok(doc)
    }

    fn persist(&self, doc: &mut Document) -> Result<(), SerializerError> {
        let store = self.store.as_ref().ok_or_else(|| {
            SerializerError::misconfigured(&self.name, "no document store is attached")
        })?;

        store.save(doc).map_err(|e| match e {
            StoreError::Validation(message) => SerializerError::PersistenceValidation {
                model: self.schema.name.clone(),
                serializer: self.name.clone(),
                message,
            },
            StoreError::Type(message) => SerializerError::PersistenceType {
                model: self.schema.name.clone(),
                serializer: self.name.clone(),
                message,
            },
            other @ StoreError::Backend(_) => SerializerError::Store(other),
        })
    }
}

// (source, serializer) for every writable embedded sub-serializer
fn embedded_nested(tree: &FieldTree) -> Vec<(&str, &DocumentSerializer)> {
    tree.values()
        .filter(|f| !f.is_read_only())
        .filter_map(|f| match &f.node {
            FieldNode::Nested(n) if n.is_embedded() => Some((f.source.as_str(), &*n.serializer)),
            _ => None,
        })
        .collect()
}

const fn json_type(data: &JsonValue) -> &'static str {
    match data {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "str",
        JsonValue::Array(_) => "list",
        JsonValue::Object(_) => "dict",
    }
}

///
/// BoundSerializer
///
/// A serializer bound to one input (and optionally one instance).
/// `is_valid` must succeed before `validated_data` or `save`.
///

#[derive(Debug)]
pub struct BoundSerializer<'s> {
    serializer: &'s DocumentSerializer,
    instance: Option<Document>,
    data: JsonValue,
    validated: Option<ValidatedData>,
    errors: ValidationErrors,
}

impl<'s> BoundSerializer<'s> {
    fn new(serializer: &'s DocumentSerializer, instance: Option<Document>, data: JsonValue) -> Self {
        Self {
            serializer,
            instance,
            data,
            validated: None,
            errors: ValidationErrors::new(),
        }
    }

    /// Validate the bound data. With `raise_on_error` the error mapping is
    /// returned as `Err`; otherwise it is kept for `errors()`.
    pub fn is_valid(&mut self, raise_on_error: bool) -> Result<bool, SerializerError> {
        self.validated = None;
        self.errors = ValidationErrors::new();

        match self.serializer.to_internal(&self.data) {
            Ok(values) => {
                self.validated = Some(values);
                Ok(true)
            }
            Err(SerializerError::Validation(errors)) if !raise_on_error => {
                self.errors = errors;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    #[must_use]
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn validated_data(&self) -> Result<&ValidatedData, SerializerError> {
        self.validated.as_ref().ok_or(SerializerError::NotValidated)
    }

    #[must_use]
    pub const fn instance(&self) -> Option<&Document> {
        self.instance.as_ref()
    }

    /// Create or update, depending on whether an instance is bound.
    pub fn save(&mut self) -> Result<&Document, SerializerError> {
        let validated = self.validated.as_ref().ok_or(SerializerError::NotValidated)?;

        let doc = match &self.instance {
            Some(instance) => self.serializer.update(instance, validated)?,
            None => self.serializer.create(validated)?,
        };

        Ok(self.instance.insert(doc))
    }

    /// The instance's representation when one is bound, else the raw input.
    pub fn data(&self) -> Result<JsonValue, SerializerError> {
        match &self.instance {
            Some(instance) => self.serializer.to_representation(instance),
            None => Ok(self.data.clone()),
        }
    }
}
