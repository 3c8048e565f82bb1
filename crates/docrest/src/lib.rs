//! ## Crate layout
//! - `schema`: field kinds, descriptors, document schemas, the schema
//!   registry and document instances.
//! - `core`: field mapping, depth-bounded field trees, the value
//!   transformer, the polymorphic chain map and the serializer façade.
//! - `error`: the stable public error with a kind + origin taxonomy.
//!
//! The `prelude` module covers what an API layer needs to declare schemas,
//! build serializers and move data in and out of them.

pub use docrest_core as core;
pub use docrest_schema as schema;

pub mod error;

pub use error::Error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default nesting depth for serializers that do not configure one.
pub const DEFAULT_DEPTH: usize = crate::core::serializer::config::DEFAULT_DEPTH;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        core::{
            chain::{ChainScope, PolymorphicChainMap},
            hyperlink::{NamespaceResolver, PathResolver, UriResolver},
            prelude::*,
            serializer::{DocumentSerializerBuilder, SerializerRegistry},
            store::{DocumentStore, MemoryStore, StoreError},
        },
        error::{Error, ErrorKind, ErrorOrigin},
        schema::prelude::*,
    };
    pub use serde_json::{Value as JsonValue, json};
}
