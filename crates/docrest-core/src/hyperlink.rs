//! Identity-to-URI collaborators used by hyperlinked reference output.

use docrest_schema::value::Value;
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

///
/// UriResolver
///

pub trait UriResolver: Send + Sync {
    fn uri_for(&self, schema: &str, id: &Value) -> Result<String, UriError>;
}

///
/// UriError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum UriError {
    #[error("no route is registered for '{schema}'")]
    NotFound { schema: String },
}

fn identity(schema: &str, id: &Value) -> Result<String, UriError> {
    id.identity_string().ok_or_else(|| UriError::NotFound {
        schema: schema.to_string(),
    })
}

///
/// NamespaceResolver
/// renders `Schema:id`
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NamespaceResolver;

impl UriResolver for NamespaceResolver {
    fn uri_for(&self, schema: &str, id: &Value) -> Result<String, UriError> {
        Ok(format!("{schema}:{}", identity(schema, id)?))
    }
}

///
/// PathResolver
///
/// Renders `{prefix}/{schema}/{id}/`. With an explicit route set, schemas
/// outside it report `NotFound`.
///

#[derive(Clone, Debug, Default)]
pub struct PathResolver {
    prefix: String,
    routes: Option<BTreeSet<String>>,
}

impl PathResolver {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().trim_end_matches('/').to_string(),
            routes: None,
        }
    }

    #[must_use]
    pub fn route(mut self, schema: impl Into<String>) -> Self {
        self.routes
            .get_or_insert_with(BTreeSet::new)
            .insert(schema.into());
        self
    }
}

impl UriResolver for PathResolver {
    fn uri_for(&self, schema: &str, id: &Value) -> Result<String, UriError> {
        if let Some(routes) = &self.routes
            && !routes.contains(schema)
        {
            return Err(UriError::NotFound {
                schema: schema.to_string(),
            });
        }

        let id = identity(schema, id)?;

        Ok(format!("{}/{schema}/{id}/", self.prefix))
    }
}
