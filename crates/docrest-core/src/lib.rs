//! Engine of docrest: maps document fields onto serializer fields, builds
//! depth-bounded field trees and walks them to produce and consume
//! primitive JSON.

pub mod chain;
pub mod error;
pub mod field;
pub mod hyperlink;
pub mod introspect;
pub mod mapping;
pub mod serializer;
pub mod store;
pub mod transform;
pub mod validation;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Serializer vocabulary only; stores and resolvers are imported by path.
///

pub mod prelude {
    pub use crate::{
        error::SerializerError,
        field::{FieldTree, SerializerField},
        serializer::{
            BoundSerializer, DeclaredField, DocumentSerializer, ExtraKwargs, FormData,
            SerializerConfig, SerializerFlavour, ValidatedData,
        },
        validation::{FieldErrorKind, ValidationErrors},
    };
}
