use crate::{
    error::SerializerError,
    field::{FieldNode, FieldTree},
    serializer::ValidatedData,
};

/// Refuse writes the default `create` / `update` cannot perform: writable
/// nested serializers other than embedded ones, and writable dotted sources.
pub fn raise_errors_on_nested_writes(
    method: &str,
    serializer: &str,
    tree: &FieldTree,
    validated: &ValidatedData,
) -> Result<(), SerializerError> {
    for (name, field) in tree {
        if field.is_read_only() || !validated.contains_key(&field.source) {
            continue;
        }

        if let FieldNode::Nested(nested) = &field.node
            && !nested.is_embedded()
        {
            return Err(SerializerError::misconfigured(
                serializer,
                format!(
                    "the `.{method}()` method does not support writable nested fields by default; \
                     write an explicit `.{method}()` or set `read_only` on nested field '{name}'"
                ),
            ));
        }

        if field.has_dotted_source() {
            return Err(SerializerError::misconfigured(
                serializer,
                format!(
                    "the `.{method}()` method does not support writable dotted-source fields by default; \
                     write an explicit `.{method}()` or set `read_only` on '{name}' (source '{}')",
                    field.source
                ),
            ));
        }
    }

    Ok(())
}
