use derive_more::Display;
use docrest_core::{
    error::{ErrorOrigin as CoreErrorOrigin, SerializerError},
    serializer::ConfigError,
    store::StoreError,
};
use docrest_schema::error::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///
/// `details` carries the field-keyed error mapping for invalid input, in
/// the `{ path: [message, ..] }` shape web clients expect.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }

    /// True for input problems the caller can fix by sending different data.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self.kind, ErrorKind::Input(InputErrorKind::Invalid))
    }
}

impl From<SerializerError> for Error {
    fn from(err: SerializerError) -> Self {
        let origin = err.origin().into();
        let message = err.to_string();

        let kind = match &err {
            SerializerError::Validation(errors) => {
                return Self::new(ErrorKind::Input(InputErrorKind::Invalid), origin, message)
                    .with_details(errors.to_json());
            }
            SerializerError::DepthExhausted { .. } => {
                ErrorKind::Input(InputErrorKind::DepthExhausted)
            }
            SerializerError::NotValidated => ErrorKind::Input(InputErrorKind::NotValidated),

            SerializerError::Config(_) | SerializerError::Misconfigured { .. } => {
                ErrorKind::Config(ConfigErrorKind::Misconfigured)
            }
            SerializerError::Schema(_) => ErrorKind::Config(ConfigErrorKind::Schema),
            SerializerError::NotASubclass { .. } | SerializerError::UnsupportedFieldKind { .. } => {
                ErrorKind::Config(ConfigErrorKind::Unsupported)
            }

            SerializerError::PersistenceValidation { .. } => {
                ErrorKind::Persist(PersistErrorKind::Rejected)
            }
            SerializerError::PersistenceType { .. } => {
                ErrorKind::Persist(PersistErrorKind::TypeMismatch)
            }
            SerializerError::Store(StoreError::Backend(_)) => {
                ErrorKind::Persist(PersistErrorKind::Unavailable)
            }
            SerializerError::Store(StoreError::Validation(_)) => {
                ErrorKind::Persist(PersistErrorKind::Rejected)
            }
            SerializerError::Store(StoreError::Type(_)) => {
                ErrorKind::Persist(PersistErrorKind::TypeMismatch)
            }
        };

        Self::new(kind, origin, message)
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Self::new(
            ErrorKind::Config(ConfigErrorKind::Schema),
            ErrorOrigin::Schema,
            err.to_string(),
        )
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(
            ErrorKind::Config(ConfigErrorKind::Misconfigured),
            ErrorOrigin::Config,
            err.to_string(),
        )
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers and API layers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Config(ConfigErrorKind),
    Input(InputErrorKind),
    Persist(PersistErrorKind),
}

///
/// ConfigErrorKind
/// the serializer or schema set-up is wrong; fix the code, not the request
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ConfigErrorKind {
    Misconfigured,
    Schema,

    /// A field kind or subclass the engine cannot serialize.
    Unsupported,
}

///
/// InputErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum InputErrorKind {
    /// Nested input deeper than the configured depth.
    DepthExhausted,

    /// Field-level validation failed; see `Error::details`.
    Invalid,

    /// `is_valid` has not succeeded yet.
    NotValidated,
}

///
/// PersistErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum PersistErrorKind {
    /// The backend rejected the document's content.
    Rejected,

    /// The document does not fit the backend's model.
    TypeMismatch,

    Unavailable,
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers and API layers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ErrorOrigin {
    Chain,
    Config,
    Mapping,
    Schema,
    Serializer,
    Store,
    Transform,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Chain => Self::Chain,
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Mapping => Self::Mapping,
            CoreErrorOrigin::Schema => Self::Schema,
            CoreErrorOrigin::Serializer => Self::Serializer,
            CoreErrorOrigin::Store => Self::Store,
            CoreErrorOrigin::Transform => Self::Transform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrest_core::validation::{FieldErrorKind, ValidationErrors};

    #[test]
    fn validation_errors_carry_their_mapping() {
        let mut errors = ValidationErrors::new();
        errors.add("name", FieldErrorKind::Required);

        let err = Error::from(SerializerError::Validation(errors));

        assert!(err.is_invalid_input());
        assert_eq!(err.origin, ErrorOrigin::Transform);
        assert_eq!(
            err.details,
            Some(serde_json::json!({ "name": ["This field is required."] }))
        );
    }

    #[test]
    fn store_failures_map_to_persist_kinds() {
        let cases = [
            (StoreError::Backend("down".into()), PersistErrorKind::Unavailable),
            (StoreError::Validation("bad".into()), PersistErrorKind::Rejected),
            (StoreError::Type("odd".into()), PersistErrorKind::TypeMismatch),
        ];

        for (store, expected) in cases {
            let err = Error::from(SerializerError::Store(store));
            assert_eq!(err.kind, ErrorKind::Persist(expected));
            assert_eq!(err.origin, ErrorOrigin::Store);
        }
    }

    #[test]
    fn schema_errors_are_configuration() {
        let err = Error::from(SchemaError::UnknownSchema("Boat".into()));

        assert_eq!(err.kind, ErrorKind::Config(ConfigErrorKind::Schema));
        assert_eq!(err.message, "schema 'Boat' not found");
    }

    #[test]
    fn error_serializes_without_empty_details() {
        let err = Error::new(
            ErrorKind::Input(InputErrorKind::NotValidated),
            ErrorOrigin::Serializer,
            "call is_valid first",
        );

        let json = serde_json::to_value(&err).expect("error should serialize");

        assert_eq!(
            json,
            serde_json::json!({
                "kind": { "Input": "NotValidated" },
                "origin": "Serializer",
                "message": "call is_valid first",
            })
        );
    }
}
