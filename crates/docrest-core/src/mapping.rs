//! Static mapping from document field kinds to serializer field constructors.

use docrest_schema::kind::{FieldKind, GeoKind};
use thiserror::Error as ThisError;

///
/// UnsupportedFieldKind
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("no serializer field is mapped for {0}")]
pub struct UnsupportedFieldKind(pub FieldKind);

///
/// FieldConstructor
///
/// Primitive → a plain scalar serializer field.
/// Compound  → needs the engine's own recursive handling.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldConstructor {
    Compound(CompoundClass),
    Primitive(PrimitiveClass),
}

///
/// PrimitiveClass
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum PrimitiveClass {
    Boolean,
    DateTime,
    Decimal,
    Email,
    File,
    Float,
    Integer,
    String,
    Url,
    Uuid,
}

impl PrimitiveClass {
    /// Classes that accept length limits.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::Email | Self::File | Self::String | Self::Url)
    }

    /// Classes that accept numeric bounds.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Decimal | Self::Float | Self::Integer)
    }
}

///
/// CompoundClass
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum CompoundClass {
    Binary,
    Dict,
    Dynamic,
    Embedded,
    Geo(GeoKind),
    List,
    Map,
    ObjectId,
    Reference,
}

/// Resolve the constructor for `kind`.
///
/// Compound kinds only match exactly; primitive kinds also match through
/// any ancestor in the kind's supertype chain.
pub fn field_constructor_for(kind: &FieldKind) -> Result<FieldConstructor, UnsupportedFieldKind> {
    if let Some(class) = compound_for(kind) {
        return Ok(FieldConstructor::Compound(class));
    }

    kind.lineage()
        .iter()
        .find_map(primitive_for)
        .map(FieldConstructor::Primitive)
        .ok_or_else(|| UnsupportedFieldKind(kind.clone()))
}

/// True when `kind` is handled by the engine's recursive machinery.
#[must_use]
pub fn is_compound(kind: &FieldKind) -> bool {
    compound_for(kind).is_some()
}

const fn compound_for(kind: &FieldKind) -> Option<CompoundClass> {
    let class = match kind {
        FieldKind::Binary => CompoundClass::Binary,
        FieldKind::Dict => CompoundClass::Dict,
        FieldKind::Dynamic => CompoundClass::Dynamic,
        FieldKind::EmbeddedDocument => CompoundClass::Embedded,
        FieldKind::List => CompoundClass::List,
        FieldKind::Map => CompoundClass::Map,
        FieldKind::ObjectId => CompoundClass::ObjectId,
        FieldKind::Reference => CompoundClass::Reference,
        other => match other.geo_kind() {
            Some(geo) => CompoundClass::Geo(geo),
            None => return None,
        },
    };

    Some(class)
}

const fn primitive_for(kind: &FieldKind) -> Option<PrimitiveClass> {
    let class = match kind {
        FieldKind::Boolean => PrimitiveClass::Boolean,
        FieldKind::DateTime => PrimitiveClass::DateTime,
        FieldKind::Decimal => PrimitiveClass::Decimal,
        FieldKind::Email => PrimitiveClass::Email,
        FieldKind::File | FieldKind::Image => PrimitiveClass::File,
        FieldKind::Float => PrimitiveClass::Float,
        FieldKind::Int => PrimitiveClass::Integer,
        FieldKind::String => PrimitiveClass::String,
        FieldKind::Url => PrimitiveClass::Url,
        FieldKind::Uuid => PrimitiveClass::Uuid,
        _ => return None,
    };

    Some(class)
}
