//! Document-model side of docrest: field kinds, descriptors, schemas,
//! the schema registry and document instances.

pub mod error;
pub mod field;
pub mod instance;
pub mod kind;
pub mod registry;
pub mod schema;
pub mod types;
pub mod validate;
pub mod value;

/// Maximum length for document schema names.
pub const MAX_SCHEMA_NAME_LEN: usize = 64;

/// Maximum length for field names.
pub const MAX_FIELD_NAME_LEN: usize = 64;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        err,
        error::{ErrorTree, SchemaError},
        field::{Constraints, FieldDefault, FieldDescriptor, FieldTarget},
        instance::{Document, DocumentRef, Reference},
        kind::{FieldKind, GeoKind},
        registry::SchemaRegistry,
        schema::{DocumentSchema, Flavour},
        types::{Decimal, ObjectId, OffsetDateTime, Uuid},
        value::{Coordinates, GeoValue, Value},
    };
}
