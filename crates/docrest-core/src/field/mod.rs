//! Serializer field nodes and the depth-bounded tree builder.

pub mod build;
pub mod dynamic;

pub use build::{BuildContext, FieldBuilder};
pub use dynamic::{ValueClass, classify};

use crate::{mapping::PrimitiveClass, serializer::DocumentSerializer};
use docrest_schema::{
    field::{Constraints, FieldDefault, FieldDescriptor},
    instance::Document,
    kind::GeoKind,
};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::{fmt, sync::Arc};

///
/// FieldTree
/// ordered name → node map for one schema at one depth
///

pub type FieldTree = IndexMap<String, Arc<SerializerField>>;

/// Computed read-only model attribute.
pub type AttributeFn = Arc<dyn Fn(&Document) -> JsonValue + Send + Sync>;

///
/// SerializerField
///
/// One node of a built field tree. Nodes are shared by `Arc` across trees
/// (the chain map hands the same inherited node to every subclass view) and
/// are never mutated after construction.
///

#[derive(Clone, Debug)]
pub struct SerializerField {
    pub name: String,
    pub source: String,
    pub descriptor: Option<Arc<FieldDescriptor>>,
    pub depth: usize,
    pub options: FieldOptions,
    pub node: FieldNode,
}

impl SerializerField {
    #[must_use]
    pub fn new(name: impl Into<String>, node: FieldNode) -> Self {
        let name = name.into();

        Self {
            source: name.clone(),
            name,
            descriptor: None,
            depth: 0,
            options: FieldOptions::default(),
            node,
        }
    }

    /// A read-only node backed by a computed model attribute.
    #[must_use]
    pub fn attribute(name: impl Into<String>, attr: AttributeFn) -> Self {
        let mut field = Self::new(name, FieldNode::ReadOnly(attr));
        field.options.read_only = true;

        field
    }

    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.options.read_only
    }

    #[must_use]
    pub const fn is_write_only(&self) -> bool {
        self.options.write_only
    }

    /// Source with a nested attribute lookup (`profile.address`).
    #[must_use]
    pub fn has_dotted_source(&self) -> bool {
        self.source.contains('.')
    }

    /// Child tree for reference, embedded and nested-serializer nodes.
    #[must_use]
    pub fn children(&self) -> Option<&FieldTree> {
        match &self.node {
            FieldNode::Reference(node) => node.children.as_ref(),
            FieldNode::Embedded(node) => node.children.as_ref(),
            _ => None,
        }
    }

    /// Shared element node of a list or map.
    #[must_use]
    pub const fn element(&self) -> Option<&Arc<Self>> {
        match &self.node {
            FieldNode::List(child) | FieldNode::Map(child) => Some(child),
            _ => None,
        }
    }

    /// Deepest expansion below this node, counting each nested mapping once.
    #[must_use]
    pub fn nesting_level(&self) -> usize {
        match &self.node {
            FieldNode::List(child) | FieldNode::Map(child) => child.nesting_level(),
            _ => self.children().map_or(0, |tree| {
                1 + tree.values().map(|f| f.nesting_level()).max().unwrap_or(0)
            }),
        }
    }
}

///
/// FieldOptions
///
/// Serializer-side flags derived from the descriptor and `extra_kwargs`.
///

#[derive(Clone, Debug, Default)]
pub struct FieldOptions {
    pub required: bool,
    pub default: Option<FieldDefault>,
    pub allow_null: bool,
    pub allow_blank: bool,
    pub read_only: bool,
    pub write_only: bool,
    pub constraints: Constraints,
}

///
/// FieldNode
///
/// Shape of a node. Reference and embedded nodes carry an optional child
/// tree: `None` on a reference means identity only, `None` on an embedded
/// node is the depth-exhausted placeholder.
///

#[derive(Clone)]
#[remain::sorted]
pub enum FieldNode {
    Binary,
    Dict,
    Dynamic,
    Embedded(EmbeddedNode),
    Geo(GeoKind),
    List(Arc<SerializerField>),
    Map(Arc<SerializerField>),
    Nested(NestedNode),
    ObjectId,
    Primitive(PrimitiveClass),
    ReadOnly(AttributeFn),
    Reference(ReferenceNode),
}

impl fmt::Debug for FieldNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => f.write_str("Binary"),
            Self::Dict => f.write_str("Dict"),
            Self::Dynamic => f.write_str("Dynamic"),
            Self::Embedded(node) => f.debug_tuple("Embedded").field(node).finish(),
            Self::Geo(kind) => f.debug_tuple("Geo").field(kind).finish(),
            Self::List(child) => f.debug_tuple("List").field(child).finish(),
            Self::Map(child) => f.debug_tuple("Map").field(child).finish(),
            Self::Nested(node) => f.debug_tuple("Nested").field(node).finish(),
            Self::ObjectId => f.write_str("ObjectId"),
            Self::Primitive(class) => f.debug_tuple("Primitive").field(class).finish(),
            Self::ReadOnly(_) => f.write_str("ReadOnly(..)"),
            Self::Reference(node) => f.debug_tuple("Reference").field(node).finish(),
        }
    }
}

///
/// ReferenceNode
///

#[derive(Clone, Debug)]
pub struct ReferenceNode {
    pub schema: String,
    pub children: Option<FieldTree>,
    pub hyperlink: bool,
}

///
/// EmbeddedNode
///

#[derive(Clone, Debug)]
pub struct EmbeddedNode {
    pub schema: String,
    pub children: Option<FieldTree>,
}

impl EmbeddedNode {
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.children.is_none()
    }
}

///
/// NestedNode
/// a declared sub-serializer
///

#[derive(Clone, Debug)]
pub struct NestedNode {
    pub serializer: Arc<DocumentSerializer>,
}

impl NestedNode {
    /// Only embedded-document serializers support nested writes.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.serializer.is_embedded()
    }
}
