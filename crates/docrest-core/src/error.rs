use crate::{
    serializer::config::ConfigError, store::StoreError, validation::ValidationErrors,
};
use docrest_schema::{error::SchemaError, kind::FieldKind};
use std::fmt;
use thiserror::Error as ThisError;

///
/// SerializerError
///
/// Fatal errors raised by the engine. Per-field input problems never land
/// here directly; they are collected into `ValidationErrors` and surface as
/// the single `Validation` variant.
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum SerializerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("depth exhausted at '{path}': cannot rebuild a nested object beyond the configured depth")]
    DepthExhausted { path: String },

    #[error("serializer '{serializer}' is misconfigured: {message}")]
    Misconfigured { serializer: String, message: String },

    #[error("schema '{schema}' is not a subclass of '{base}'")]
    NotASubclass { schema: String, base: String },

    #[error("validated data is unavailable until is_valid() has succeeded")]
    NotValidated,

    #[error(
        "type error while saving '{model}' through '{serializer}'; a writable serializer field may not be a valid model attribute: {message}"
    )]
    PersistenceType {
        model: String,
        serializer: String,
        message: String,
    },

    #[error(
        "'{model}' rejected data accepted by '{serializer}'; check the serializer against the model: {message}"
    )]
    PersistenceValidation {
        model: String,
        serializer: String,
        message: String,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("field '{field}' has kind {kind}, which has no serializer mapping")]
    UnsupportedFieldKind { field: String, kind: FieldKind },

    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
}

impl SerializerError {
    pub(crate) fn misconfigured(serializer: &str, message: impl Into<String>) -> Self {
        Self::Misconfigured {
            serializer: serializer.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn depth_exhausted(path: impl Into<String>) -> Self {
        Self::DepthExhausted { path: path.into() }
    }

    /// Stable classification for callers and the public façade.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Config(_) | Self::Misconfigured { .. } | Self::Schema(_) => {
                ErrorClass::Configuration
            }
            Self::DepthExhausted { .. } | Self::NotValidated => ErrorClass::InvariantViolation,
            Self::NotASubclass { .. } | Self::UnsupportedFieldKind { .. } => {
                ErrorClass::Unsupported
            }
            Self::PersistenceType { .. } | Self::PersistenceValidation { .. } | Self::Store(_) => {
                ErrorClass::Persistence
            }
            Self::Validation(_) => ErrorClass::Invalid,
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::Config(_) => ErrorOrigin::Config,
            Self::DepthExhausted { .. } | Self::Validation(_) => ErrorOrigin::Transform,
            Self::Misconfigured { .. } | Self::NotValidated => ErrorOrigin::Serializer,
            Self::NotASubclass { .. } => ErrorOrigin::Chain,
            Self::PersistenceType { .. } | Self::PersistenceValidation { .. } | Self::Store(_) => {
                ErrorOrigin::Store
            }
            Self::Schema(_) => ErrorOrigin::Schema,
            Self::UnsupportedFieldKind { .. } => ErrorOrigin::Mapping,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {self}", self.origin(), self.class())
    }
}

///
/// ErrorClass
/// Runtime classification of engine errors.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Configuration,
    Invalid,
    InvariantViolation,
    Persistence,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Configuration => "configuration",
            Self::Invalid => "invalid",
            Self::InvariantViolation => "invariant_violation",
            Self::Persistence => "persistence",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Engine layer an error was raised from.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Chain,
    Config,
    Mapping,
    Schema,
    Serializer,
    Store,
    Transform,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Chain => "chain",
            Self::Config => "config",
            Self::Mapping => "mapping",
            Self::Schema => "schema",
            Self::Serializer => "serializer",
            Self::Store => "store",
            Self::Transform => "transform",
        };
        write!(f, "{label}")
    }
}
