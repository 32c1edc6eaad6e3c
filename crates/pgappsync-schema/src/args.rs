//! Pre-rendered argument shapes for root fields.
//!
//! The request path turns a field invocation into an operation document.
//! For fields with arguments it needs both the variable declarations
//! (`$input: CreatePostInput!`) and the argument pass list (`input: $input`);
//! both are rendered once from the schema the execution engine serves.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Field, Schema};

/// Identifies a field on a root type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldKey {
    pub type_name: String,
    pub field_name: String,
}

impl FieldKey {
    #[must_use]
    pub fn new(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }
}

/// Variable declarations and pass list for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldArgSpec {
    /// `$a: T, $b: U`
    pub variables: String,
    /// `a: $a, b: $b`
    pub arguments: String,
}

impl FieldArgSpec {
    /// Renders the spec for a field; `None` when it takes no arguments.
    #[must_use]
    pub fn from_field(field: &Field) -> Option<Self> {
        if field.args.is_empty() {
            return None;
        }
        let variables = field
            .args
            .values()
            .map(|a| format!("${}: {}", a.name, a.ty))
            .collect::<Vec<_>>()
            .join(", ");
        let arguments = field
            .args
            .values()
            .map(|a| format!("{0}: ${0}", a.name))
            .collect::<Vec<_>>()
            .join(", ");
        Some(Self {
            variables,
            arguments,
        })
    }
}

/// Argument specs for every Query and Mutation field that takes arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldArgSpecs {
    specs: IndexMap<FieldKey, FieldArgSpec>,
}

impl FieldArgSpecs {
    /// Collects specs from the query and mutation roots.
    ///
    /// Build this from the schema the execution engine serves, before any
    /// scalar mapping, so declared variable types match what it expects.
    #[must_use]
    pub fn from_schema(schema: &Schema) -> Self {
        let mut specs = IndexMap::new();

        let roots = [schema.query_type.as_deref(), schema.mutation_type.as_deref()];
        for type_name in roots.into_iter().flatten() {
            let Some(fields) = schema.object_fields(type_name) else {
                continue;
            };
            for field in fields.values() {
                if let Some(spec) = FieldArgSpec::from_field(field) {
                    specs.insert(FieldKey::new(type_name, &field.name), spec);
                }
            }
        }

        debug!(fields = specs.len(), "Built field argument specs");
        Self { specs }
    }

    #[must_use]
    pub fn get(&self, type_name: &str, field_name: &str) -> Option<&FieldArgSpec> {
        self.specs.get(&FieldKey::new(type_name, field_name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &FieldArgSpec)> {
        self.specs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InputValue, TypeDefinition, TypeRef};

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema.mutation_type = Some("Mutation".into());
        schema.insert(TypeDefinition::object(
            "Query",
            [
                Field::new("allPosts", TypeRef::list(TypeRef::named("Post"))),
                Field::new("post", TypeRef::named("Post"))
                    .argument(InputValue::new("id", TypeRef::named_nn("UUID"))),
                Field::new("posts", TypeRef::list(TypeRef::named("Post")))
                    .argument(InputValue::new("first", TypeRef::named("Int")))
                    .argument(InputValue::new("after", TypeRef::named("Cursor"))),
            ],
        ));
        schema.insert(TypeDefinition::object(
            "Mutation",
            [Field::new("createPost", TypeRef::named("CreatePostPayload"))
                .argument(InputValue::new("input", TypeRef::named_nn("CreatePostInput")))],
        ));
        schema.insert(TypeDefinition::object(
            "Post",
            [Field::new("comments", TypeRef::list(TypeRef::named("Comment")))
                .argument(InputValue::new("first", TypeRef::named("Int")))],
        ));
        schema
    }

    #[test]
    fn test_only_root_fields_with_arguments() {
        let specs = FieldArgSpecs::from_schema(&schema());
        assert_eq!(specs.len(), 3);
        assert!(specs.get("Query", "allPosts").is_none());
        assert!(specs.get("Post", "comments").is_none());
    }

    #[test]
    fn test_rendered_spec() {
        let specs = FieldArgSpecs::from_schema(&schema());

        let create = specs.get("Mutation", "createPost").expect("createPost");
        assert_eq!(create.variables, "$input: CreatePostInput!");
        assert_eq!(create.arguments, "input: $input");

        let posts = specs.get("Query", "posts").expect("posts");
        assert_eq!(posts.variables, "$first: Int, $after: Cursor");
        assert_eq!(posts.arguments, "first: $first, after: $after");
    }

    #[test]
    fn test_unmapped_types_are_kept() {
        let specs = FieldArgSpecs::from_schema(&schema());
        assert_eq!(specs.get("Query", "post").expect("post").variables, "$id: UUID!");
    }
}
