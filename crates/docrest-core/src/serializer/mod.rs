//! Serializer façade: configuration, binding, validation and persistence.

pub mod config;
mod document;
mod form;
mod nested;
mod registry;

pub use config::{ConfigError, ExtraKwargs, SerializerConfig};
pub use document::{
    BoundSerializer, DeclaredField, DocumentSerializer, DocumentSerializerBuilder,
    SerializerFlavour, ValidatedData, ValidatorFn,
};
pub use form::FormData;
pub use nested::raise_errors_on_nested_writes;
pub use registry::SerializerRegistry;
