use crate::{
    instance::{Document, Reference},
    kind::GeoKind,
    types::{Decimal, ObjectId, OffsetDateTime, Uuid},
};
use indexmap::IndexMap;

///
/// Value
///
/// Raw field value as held by a document instance.
///
/// Null      → the field is unset or explicitly null.
/// Reference → a lazy handle or a fully materialised target document.
///

#[derive(Clone, Debug, PartialEq)]
#[remain::sorted]
pub enum Value {
    Binary(Vec<u8>),
    Bool(bool),
    DateTime(OffsetDateTime),
    Decimal(Decimal),
    Embedded(Box<Document>),
    Float(f64),
    Geo(GeoValue),
    Int(i64),
    /// Ordered list; element order is preserved end to end.
    List(Vec<Self>),
    /// String-keyed map; insertion order is preserved end to end.
    Map(IndexMap<String, Self>),
    Null,
    ObjectId(ObjectId),
    Reference(Reference),
    String(String),
    Uuid(Uuid),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Embedded(doc) => Some(doc),
            Self::Reference(Reference::Resolved(doc)) => Some(doc),
            _ => None,
        }
    }

    /// Short label used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Binary(_) => "binary",
            Self::Bool(_) => "bool",
            Self::DateTime(_) => "datetime",
            Self::Decimal(_) => "decimal",
            Self::Embedded(_) => "embedded document",
            Self::Float(_) => "float",
            Self::Geo(_) => "geometry",
            Self::Int(_) => "int",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Null => "null",
            Self::ObjectId(_) => "object id",
            Self::Reference(_) => "reference",
            Self::String(_) => "string",
            Self::Uuid(_) => "uuid",
        }
    }

    /// Render a scalar identity value as text.
    ///
    /// Used when a reference or document collapses to its primary key.
    #[must_use]
    pub fn identity_string(&self) -> Option<String> {
        match self {
            Self::ObjectId(id) => Some(id.to_hex()),
            Self::String(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Uuid(u) => Some(u.hyphenated().to_string()),
            Self::Decimal(d) => Some(d.to_string()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<ObjectId> for Value {
    fn from(v: ObjectId) -> Self {
        Self::ObjectId(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(v: OffsetDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<Document> for Value {
    fn from(v: Document) -> Self {
        Self::Embedded(Box::new(v))
    }
}

impl From<Reference> for Value {
    fn from(v: Reference) -> Self {
        Self::Reference(v)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

///
/// GeoValue
///

#[derive(Clone, Debug, PartialEq)]
pub struct GeoValue {
    pub kind: GeoKind,
    pub coordinates: Coordinates,
}

impl GeoValue {
    #[must_use]
    pub const fn point(x: f64, y: f64) -> Self {
        Self {
            kind: GeoKind::Point,
            coordinates: Coordinates::Position(x, y),
        }
    }
}

///
/// Coordinates
///
/// Recursive GeoJSON coordinate array; a `Position` is the innermost pair.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Coordinates {
    Position(f64, f64),
    Nested(Vec<Self>),
}

impl Coordinates {
    /// Nesting depth, counting a position as 1.
    ///
    /// Returns `None` when siblings disagree on depth or a level is empty.
    #[must_use]
    pub fn depth(&self) -> Option<usize> {
        match self {
            Self::Position(..) => Some(1),
            Self::Nested(items) => {
                let mut iter = items.iter();
                let first = iter.next()?.depth()?;

                iter.all(|c| c.depth() == Some(first)).then_some(first + 1)
            }
        }
    }
}
