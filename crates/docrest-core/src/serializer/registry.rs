use crate::{
    chain::PolymorphicChainMap,
    error::SerializerError,
    serializer::{DocumentSerializer, DocumentSerializerBuilder, config::SerializerConfig},
};
use docrest_schema::registry::SchemaRegistry;
use indexmap::IndexMap;
use std::sync::{Arc, PoisonError, RwLock};

///
/// SerializerRegistry
///
/// Serializers for one schema registry, keyed by display name. Every
/// serializer built here shares one dynamic-field cache.
///

#[derive(Debug)]
pub struct SerializerRegistry {
    schemas: Arc<SchemaRegistry>,
    cache: Arc<PolymorphicChainMap>,
    serializers: RwLock<IndexMap<String, Arc<DocumentSerializer>>>,
}

impl SerializerRegistry {
    #[must_use]
    pub fn new(schemas: Arc<SchemaRegistry>) -> Self {
        Self {
            schemas,
            cache: Arc::new(PolymorphicChainMap::new()),
            serializers: RwLock::new(IndexMap::new()),
        }
    }

    #[must_use]
    pub const fn schemas(&self) -> &Arc<SchemaRegistry> {
        &self.schemas
    }

    #[must_use]
    pub const fn cache(&self) -> &Arc<PolymorphicChainMap> {
        &self.cache
    }

    /// A builder wired to this registry's schemas and cache.
    #[must_use]
    pub fn builder(&self, config: SerializerConfig) -> DocumentSerializerBuilder {
        DocumentSerializer::builder(Arc::clone(&self.schemas), config).cache(Arc::clone(&self.cache))
    }

    /// Build and register; the name must be unused.
    pub fn register(
        &self,
        builder: DocumentSerializerBuilder,
    ) -> Result<Arc<DocumentSerializer>, SerializerError> {
        let serializer = Arc::new(builder.build()?);
        let name = serializer.name().to_string();

        let mut serializers = self
            .serializers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if serializers.contains_key(&name) {
            return Err(SerializerError::misconfigured(&name, "a serializer with this name is already registered"));
        }
        serializers.insert(name, Arc::clone(&serializer));

        Ok(serializer)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<DocumentSerializer>> {
        self.serializers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.serializers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every memoized field tree and cached chain link.
    pub fn reload_schemas(&self) {
        tracing::debug!(serializers = self.len(), "reloading schemas");

        self.cache.clear();
        for serializer in self
            .serializers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
        {
            serializer.reset();
        }
    }
}
