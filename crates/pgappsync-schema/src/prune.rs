//! Removal of relay plumbing fields the AppSync schema should not expose.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::model::{Schema, TypeKind, TypeRef};

static DELETED_NODE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"deleted\w+NodeId").expect("valid regex"));

/// Options for [`prune_schema`].
#[derive(Debug, Clone)]
pub struct PruneOptions {
    /// Drop `query`, `clientMutationId` and `deleted*NodeId` fields.
    pub relay_fields: bool,
    /// Input fields that are forced to be nullable wherever they appear.
    pub force_nullable_inputs: Vec<String>,
}

impl Default for PruneOptions {
    fn default() -> Self {
        Self {
            relay_fields: true,
            force_nullable_inputs: vec!["id".to_string()],
        }
    }
}

fn is_relay_output_field(name: &str) -> bool {
    name == "query" || name == "clientMutationId" || DELETED_NODE_ID.is_match(name)
}

/// Prunes relay fields and relaxes forced-nullable input fields in place.
/// Returns the number of fields removed.
pub fn prune_schema(schema: &mut Schema, options: &PruneOptions) -> usize {
    let mut removed = 0;

    for definition in schema.types.values_mut() {
        match &mut definition.kind {
            TypeKind::Object { fields, .. } if options.relay_fields => {
                let before = fields.len();
                fields.retain(|name, _| !is_relay_output_field(name));
                removed += before - fields.len();
            }
            TypeKind::InputObject { fields } => {
                if options.relay_fields {
                    let before = fields.len();
                    fields.retain(|name, _| name != "clientMutationId");
                    removed += before - fields.len();
                }
                for name in &options.force_nullable_inputs {
                    if let Some(field) = fields.get_mut(name)
                        && let TypeRef::NonNull(inner) = &field.ty
                    {
                        field.ty = inner.as_ref().clone();
                    }
                }
            }
            _ => {}
        }
    }

    debug!(removed, "Pruned relay fields");
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, InputValue, TypeDefinition};

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema.insert(TypeDefinition::object(
            "Query",
            [
                Field::new("query", TypeRef::named_nn("Query")),
                Field::new("posts", TypeRef::list(TypeRef::named("Post"))),
            ],
        ));
        schema.insert(TypeDefinition::object(
            "DeletePostPayload",
            [
                Field::new("clientMutationId", TypeRef::named("String")),
                Field::new("post", TypeRef::named("Post")),
                Field::new("deletedPostNodeId", TypeRef::named("ID")),
            ],
        ));
        schema.insert(TypeDefinition::input(
            "PostInput",
            [
                InputValue::new("id", TypeRef::named_nn("UUID")),
                InputValue::new("title", TypeRef::named_nn("String")),
                InputValue::new("clientMutationId", TypeRef::named("String")),
            ],
        ));
        schema
    }

    #[test]
    fn test_prune_relay_fields() {
        let mut schema = schema();
        let removed = prune_schema(&mut schema, &PruneOptions::default());
        assert_eq!(removed, 4);

        let query: Vec<_> = schema.object_fields("Query").expect("Query").keys().collect();
        assert_eq!(query, ["posts"]);
        let payload: Vec<_> = schema
            .object_fields("DeletePostPayload")
            .expect("payload")
            .keys()
            .collect();
        assert_eq!(payload, ["post"]);
    }

    #[test]
    fn test_force_nullable_inputs() {
        let mut schema = schema();
        prune_schema(&mut schema, &PruneOptions::default());
        let TypeKind::InputObject { fields } = &schema.get("PostInput").expect("input").kind else {
            panic!("PostInput is an input object");
        };
        assert_eq!(fields["id"].ty.to_string(), "UUID");
        assert_eq!(fields["title"].ty.to_string(), "String!");
        assert!(!fields.contains_key("clientMutationId"));
    }

    #[test]
    fn test_prune_disabled() {
        let mut schema = schema();
        let options = PruneOptions {
            relay_fields: false,
            force_nullable_inputs: Vec::new(),
        };
        assert_eq!(prune_schema(&mut schema, &options), 0);
        assert_eq!(schema.object_fields("Query").expect("Query").len(), 2);
    }
}
