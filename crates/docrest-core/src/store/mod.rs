//! Persistence boundary. The engine only ever looks documents up by identity
//! and hands finished instances back to be saved.

mod memory;

pub use memory::MemoryStore;

use docrest_schema::{instance::Document, value::Value};
use thiserror::Error as ThisError;

///
/// DocumentStore
///
/// Backend collaborator. Lookups are polymorphic: asking for a base schema
/// finds documents saved under any of its subclasses.
///

pub trait DocumentStore: Send + Sync {
    fn get(&self, schema: &str, id: &Value) -> Result<Option<Document>, StoreError>;

    /// Persist `doc`, assigning its primary key when the backend owns it.
    fn save(&self, doc: &mut Document) -> Result<(), StoreError>;
}

///
/// StoreError
///
/// Validation → the backend rejected the document's content.
/// Type       → the document does not fit the backend's model.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),

    #[error("{0}")]
    Type(String),

    #[error("{0}")]
    Validation(String),
}
