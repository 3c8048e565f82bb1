use serde::{Deserialize, Serialize};
use std::fmt;

///
/// FieldKind
///
/// Declared kind of one document-model field.
/// Specialised kinds point at the kind they refine through `supertype`.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum FieldKind {
    Binary,
    Boolean,
    ComplexDateTime,
    Custom(CustomKind),
    DateTime,
    Decimal,
    Dict,
    Dynamic,
    Email,
    EmbeddedDocument,
    File,
    Float,
    GeoPoint,
    Image,
    Int,
    LineString,
    List,
    Long,
    Map,
    MultiLineString,
    MultiPoint,
    MultiPolygon,
    ObjectId,
    Point,
    Polygon,
    Reference,
    Sequence,
    String,
    Url,
    Uuid,
}

impl FieldKind {
    /// Declare a user-defined kind refining `extends`.
    #[must_use]
    pub fn custom(name: impl Into<String>, extends: Option<Self>) -> Self {
        Self::Custom(CustomKind {
            name: name.into(),
            extends: extends.map(Box::new),
        })
    }

    /// The kind this kind specialises, if any.
    #[must_use]
    pub fn supertype(&self) -> Option<Self> {
        match self {
            Self::ComplexDateTime | Self::Email | Self::Url => Some(Self::String),
            Self::Long | Self::Sequence => Some(Self::Int),
            Self::Image => Some(Self::File),
            Self::Custom(custom) => custom.extends.as_deref().cloned(),
            _ => None,
        }
    }

    /// Walk this kind and then each of its supertypes, most specific first.
    #[must_use]
    pub fn lineage(&self) -> Vec<Self> {
        let mut out = vec![self.clone()];
        let mut cursor = self.supertype();

        while let Some(kind) = cursor {
            cursor = kind.supertype();
            out.push(kind);
        }

        out
    }

    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(self, Self::Reference)
    }

    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        matches!(self, Self::EmbeddedDocument)
    }

    /// Kinds that carry a single element descriptor.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::List | Self::Map)
    }

    /// Kinds whose target is another document schema.
    #[must_use]
    pub const fn targets_schema(&self) -> bool {
        matches!(self, Self::Reference | Self::EmbeddedDocument)
    }

    #[must_use]
    pub const fn geo_kind(&self) -> Option<GeoKind> {
        match self {
            Self::GeoPoint => Some(GeoKind::GeoPoint),
            Self::LineString => Some(GeoKind::LineString),
            Self::MultiLineString => Some(GeoKind::MultiLineString),
            Self::MultiPoint => Some(GeoKind::MultiPoint),
            Self::MultiPolygon => Some(GeoKind::MultiPolygon),
            Self::Point => Some(GeoKind::Point),
            Self::Polygon => Some(GeoKind::Polygon),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(custom) => write!(f, "{}", custom.name),
            other => write!(f, "{other:?}Field"),
        }
    }
}

///
/// CustomKind
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct CustomKind {
    pub name: String,
    pub extends: Option<Box<FieldKind>>,
}

///
/// GeoKind
///
/// GeoJSON geometry family. `GeoPoint` is the legacy bare `[x, y]` pair.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum GeoKind {
    GeoPoint,
    LineString,
    MultiLineString,
    MultiPoint,
    MultiPolygon,
    Point,
    Polygon,
}

impl GeoKind {
    /// GeoJSON `type` tag; `None` for the legacy pair.
    #[must_use]
    pub const fn type_name(self) -> Option<&'static str> {
        match self {
            Self::GeoPoint => None,
            Self::LineString => Some("LineString"),
            Self::MultiLineString => Some("MultiLineString"),
            Self::MultiPoint => Some("MultiPoint"),
            Self::MultiPolygon => Some("MultiPolygon"),
            Self::Point => Some("Point"),
            Self::Polygon => Some("Polygon"),
        }
    }

    /// Nesting depth of the coordinate arrays (a position is depth 1).
    #[must_use]
    pub const fn coordinate_depth(self) -> usize {
        match self {
            Self::GeoPoint | Self::Point => 1,
            Self::LineString | Self::MultiPoint => 2,
            Self::Polygon | Self::MultiLineString => 3,
            Self::MultiPolygon => 4,
        }
    }
}
