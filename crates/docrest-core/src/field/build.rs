use crate::{
    error::SerializerError,
    field::{EmbeddedNode, FieldNode, FieldOptions, FieldTree, ReferenceNode, SerializerField},
    mapping::{CompoundClass, FieldConstructor, PrimitiveClass, field_constructor_for},
    serializer::config::ExtraKwargs,
};
use docrest_schema::{
    error::SchemaError,
    field::{Constraints, FieldDefault, FieldDescriptor},
    kind::FieldKind,
    registry::SchemaRegistry,
    schema::DocumentSchema,
};
use rust_decimal::Decimal;
use std::sync::Arc;

///
/// BuildContext
///
/// Immutable settings for one tree build. Passed by value into every
/// recursive call so sibling subtrees can never leak state into each other.
///

#[derive(Clone, Copy, Debug)]
pub struct BuildContext<'a> {
    pub registry: &'a SchemaRegistry,
    pub dereference: bool,
    pub hyperlink: bool,
}

impl<'a> BuildContext<'a> {
    #[must_use]
    pub const fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            dereference: true,
            hyperlink: false,
        }
    }

    #[must_use]
    pub const fn dereference(mut self, on: bool) -> Self {
        self.dereference = on;
        self
    }

    #[must_use]
    pub const fn hyperlink(mut self, on: bool) -> Self {
        self.hyperlink = on;
        self
    }
}

///
/// FieldBuilder
///

#[derive(Clone, Copy, Debug)]
pub struct FieldBuilder<'a> {
    ctx: BuildContext<'a>,
}

impl<'a> FieldBuilder<'a> {
    #[must_use]
    pub const fn new(ctx: BuildContext<'a>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub const fn context(&self) -> BuildContext<'a> {
        self.ctx
    }

    /// Build one node with `depth` levels of expansion left.
    pub fn build_field(
        &self,
        descriptor: &Arc<FieldDescriptor>,
        depth: usize,
    ) -> Result<SerializerField, SerializerError> {
        let constructor = field_constructor_for(&descriptor.kind).map_err(|e| {
            SerializerError::UnsupportedFieldKind {
                field: descriptor.name.clone(),
                kind: e.0,
            }
        })?;

        let node = match constructor {
            FieldConstructor::Primitive(class) => FieldNode::Primitive(class),
            FieldConstructor::Compound(class) => self.compound_node(descriptor, class, depth)?,
        };

        Ok(SerializerField {
            name: descriptor.name.clone(),
            source: descriptor.name.clone(),
            descriptor: Some(Arc::clone(descriptor)),
            depth,
            options: derive_options(descriptor, constructor),
            node,
        })
    }

    /// Primary key plus declared fields of `schema`, every node at `depth`.
    pub fn build_schema_tree(
        &self,
        schema: &DocumentSchema,
        depth: usize,
    ) -> Result<FieldTree, SerializerError> {
        tracing::debug!(schema = %schema.name, depth, "building field tree");

        schema
            .fields_and_pk()
            .map(|descriptor| {
                let field = self.build_field(descriptor, depth)?;
                Ok((descriptor.name.clone(), Arc::new(field)))
            })
            .collect()
    }

    fn compound_node(
        &self,
        descriptor: &Arc<FieldDescriptor>,
        class: CompoundClass,
        depth: usize,
    ) -> Result<FieldNode, SerializerError> {
        let node = match class {
            CompoundClass::Binary => FieldNode::Binary,
            CompoundClass::Dict => FieldNode::Dict,
            CompoundClass::Dynamic => FieldNode::Dynamic,
            CompoundClass::Geo(kind) => FieldNode::Geo(kind),
            CompoundClass::ObjectId => FieldNode::ObjectId,

            CompoundClass::Reference => {
                let target = self.target(descriptor)?;
                let children = if depth > 0 && self.ctx.dereference {
                    Some(self.build_schema_tree(target, depth - 1)?)
                } else {
                    None
                };

                FieldNode::Reference(ReferenceNode {
                    schema: target.name.clone(),
                    children,
                    hyperlink: self.ctx.hyperlink,
                })
            }

            CompoundClass::Embedded => {
                let target = self.target(descriptor)?;
                let children = if depth > 0 {
                    Some(self.build_schema_tree(target, depth - 1)?)
                } else {
                    tracing::trace!(field = %descriptor.name, "embedded field at depth 0");
                    None
                };

                FieldNode::Embedded(EmbeddedNode {
                    schema: target.name.clone(),
                    children,
                })
            }

            CompoundClass::List | CompoundClass::Map => {
                let element = descriptor.element().ok_or_else(|| {
                    SchemaError::UnknownSchema(format!("element of '{}'", descriptor.name))
                })?;
                let child = Arc::new(self.build_field(element, depth.saturating_sub(1))?);

                if class == CompoundClass::List {
                    FieldNode::List(child)
                } else {
                    FieldNode::Map(child)
                }
            }
        };

        Ok(node)
    }

    fn target(&self, descriptor: &FieldDescriptor) -> Result<&'a Arc<DocumentSchema>, SerializerError> {
        let name = descriptor.target_schema().ok_or_else(|| {
            SchemaError::UnknownSchema(format!("target of '{}'", descriptor.name))
        })?;

        Ok(self.ctx.registry.get(name)?)
    }
}

// required: declared flag, never for object ids, never with a default.
fn derive_options(descriptor: &FieldDescriptor, constructor: FieldConstructor) -> FieldOptions {
    let mut required = descriptor.required && descriptor.kind != FieldKind::ObjectId;
    let default = descriptor.default.clone();
    if default.is_some() {
        required = false;
    }

    let c = &descriptor.constraints;
    let constraints = match constructor {
        FieldConstructor::Primitive(class) if class.is_textual() => Constraints {
            max_length: c.max_length,
            min_length: c.min_length,
            ..Constraints::default()
        },
        FieldConstructor::Primitive(class) if class.is_numeric() => Constraints {
            min_value: c.min_value,
            max_value: c.max_value,
            ..Constraints::default()
        },
        FieldConstructor::Compound(CompoundClass::Binary) => Constraints {
            max_bytes: c.max_bytes,
            ..Constraints::default()
        },
        _ => Constraints::default(),
    };

    let plain_string = constructor == FieldConstructor::Primitive(PrimitiveClass::String)
        && descriptor.kind == FieldKind::String;

    FieldOptions {
        required,
        default,
        allow_null: !required,
        allow_blank: plain_string && !required,
        read_only: false,
        write_only: false,
        constraints,
    }
}

/// Layer `extra_kwargs` over the derived options.
///
/// `read_only` strips every input-side option first; an explicit default
/// drops an automatic `required = false`.
pub fn apply_extra_kwargs(field: &mut SerializerField, extras: &ExtraKwargs) {
    let opts = &mut field.options;

    if extras.read_only == Some(true) {
        opts.required = false;
        opts.default = None;
        opts.allow_blank = false;
        opts.allow_null = false;
        opts.constraints = Constraints::default();
    }

    if let Some(default) = &extras.default {
        opts.default = Some(FieldDefault::Static(crate::transform::infer_value(default)));
        opts.required = false;
    }

    if let Some(source) = &extras.source {
        field.source.clone_from(source);
    }
    if let Some(v) = extras.read_only {
        opts.read_only = v;
    }
    if let Some(v) = extras.write_only {
        opts.write_only = v;
    }
    if let Some(v) = extras.required {
        opts.required = v;
    }
    if let Some(v) = extras.allow_null {
        opts.allow_null = v;
    }
    if let Some(v) = extras.allow_blank {
        opts.allow_blank = v;
    }
    if let Some(v) = extras.max_length {
        opts.constraints.max_length = Some(v);
    }
    if let Some(v) = extras.min_length {
        opts.constraints.min_length = Some(v);
    }
    if let Some(v) = extras.min_value.and_then(|v| Decimal::try_from(v).ok()) {
        opts.constraints.min_value = Some(v);
    }
    if let Some(v) = extras.max_value.and_then(|v| Decimal::try_from(v).ok()) {
        opts.constraints.max_value = Some(v);
    }
}
