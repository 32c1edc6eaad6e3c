//! Detection and removal of mutation payload wrapper types.
//!
//! The database schema returns mutation results as `XPayload` objects that
//! nest the record one level deeper, e.g. `CreatePostPayload { post: Post }`.
//! AppSync clients expect `createPost` to return the `Post` directly, so the
//! published schema retypes those fields and the request path re-wraps the
//! selection set at execution time.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Result, SchemaError};
use crate::model::{Schema, TypeKind, TypeRef};

const PAYLOAD_SUFFIX: &str = "Payload";

/// The field a payload type wraps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wrapper {
    /// Name of the wrapped field inside the payload type.
    pub field_name: String,
    /// Type of the wrapped field.
    pub field_type: TypeRef,
}

/// Payload type name → wrapped field.
pub type WrapperMap = IndexMap<String, Wrapper>;

/// Returns true when `type_name` matches `\w+<field_name>Payload`,
/// case-insensitively.
fn wraps_field(type_name: &str, field_name: &str) -> bool {
    let Some(stem) = type_name.strip_suffix(PAYLOAD_SUFFIX) else {
        return false;
    };
    let stem = stem.to_lowercase();
    let field = field_name.to_lowercase();
    stem.len() > field.len() && stem.ends_with(&field)
}

/// Finds every payload wrapper in the schema.
///
/// A type qualifies when it is an object type named `<Something>Payload`
/// holding a field whose name appears right before `Payload` in the type
/// name. When several fields qualify the longest name wins, since it is the
/// most specific match; two qualifying names that differ only in case are
/// reported as ambiguous.
///
/// # Errors
///
/// Returns `SchemaError::AmbiguousWrapper` for the ambiguous case above.
pub fn detect_wrappers(schema: &Schema) -> Result<WrapperMap> {
    let mut wrappers = WrapperMap::new();

    for definition in schema.types.values() {
        let TypeKind::Object { fields, .. } = &definition.kind else {
            continue;
        };
        if !definition.name.ends_with(PAYLOAD_SUFFIX) {
            continue;
        }

        let mut candidates: Vec<_> = fields
            .values()
            .filter(|f| wraps_field(&definition.name, &f.name))
            .collect();
        candidates.sort_by_key(|f| std::cmp::Reverse(f.name.len()));

        let Some(best) = candidates.first() else {
            trace!(type_name = %definition.name, "Payload type wraps no field");
            continue;
        };
        let ties: Vec<String> = candidates
            .iter()
            .filter(|f| f.name.len() == best.name.len())
            .map(|f| f.name.clone())
            .collect();
        if ties.len() > 1 {
            return Err(SchemaError::AmbiguousWrapper {
                type_name: definition.name.clone(),
                fields: ties,
            });
        }

        trace!(type_name = %definition.name, field = %best.name, "Found payload wrapper");
        wrappers.insert(
            definition.name.clone(),
            Wrapper {
                field_name: best.name.clone(),
                field_type: best.ty.clone(),
            },
        );
    }

    debug!(wrappers = wrappers.len(), "Detected payload wrappers");
    Ok(wrappers)
}

/// Returns the wrapper for a field type, when the type is `Payload` or
/// `Payload!`.
#[must_use]
pub fn wrapper_for<'a>(wrappers: &'a WrapperMap, ty: &TypeRef) -> Option<&'a Wrapper> {
    ty.direct_name().and_then(|name| wrappers.get(name))
}

/// Retypes every field returning a wrapper to the wrapped field's type, then
/// removes the wrapper types nothing references anymore.
///
/// Returns the names of the removed types.
pub fn unwrap_payloads(schema: &mut Schema, wrappers: &WrapperMap) -> Vec<String> {
    if wrappers.is_empty() {
        return Vec::new();
    }

    for definition in schema.types.values_mut() {
        let (TypeKind::Object { fields, .. } | TypeKind::Interface { fields, .. }) =
            &mut definition.kind
        else {
            continue;
        };
        for field in fields.values_mut() {
            if let Some(wrapper) = wrappers.get(field.ty.base_name()) {
                field.ty = field.ty.replace_named(&wrapper.field_type);
            }
        }
    }

    let mut removed = Vec::new();
    for name in wrappers.keys() {
        if !schema.is_referenced(name) && schema.types.shift_remove(name).is_some() {
            removed.push(name.clone());
        }
    }

    debug!(removed = removed.len(), "Removed unwrapped payload types");
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, TypeDefinition};

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema.mutation_type = Some("Mutation".into());
        schema.insert(TypeDefinition::object(
            "Mutation",
            [
                Field::new("createPost", TypeRef::named("CreatePostPayload")),
                Field::new("deletePost", TypeRef::named("DeletePostPayload")),
            ],
        ));
        schema.insert(TypeDefinition::object(
            "CreatePostPayload",
            [
                Field::new("post", TypeRef::named("Post")),
                Field::new("personByAuthorId", TypeRef::named("Person")),
                Field::new("postEdge", TypeRef::named("PostsEdge")),
            ],
        ));
        schema.insert(TypeDefinition::object(
            "DeletePostPayload",
            [Field::new("deletedPostId", TypeRef::named("ID"))],
        ));
        schema.insert(TypeDefinition::object(
            "Post",
            [Field::new("id", TypeRef::named_nn("ID"))],
        ));
        schema
    }

    #[test]
    fn test_wraps_field() {
        assert!(wraps_field("CreatePostPayload", "post"));
        assert!(wraps_field("UpdateUserPostPayload", "userPost"));
        assert!(!wraps_field("PostPayload", "post"));
        assert!(!wraps_field("CreatePostPayload", "postEdge"));
        assert!(!wraps_field("CreatePost", "post"));
    }

    #[test]
    fn test_detect_wrappers() {
        let wrappers = detect_wrappers(&schema()).expect("detect");
        assert_eq!(wrappers.len(), 1);
        let wrapper = &wrappers["CreatePostPayload"];
        assert_eq!(wrapper.field_name, "post");
        assert_eq!(wrapper.field_type.to_string(), "Post");
        assert!(!wrappers.contains_key("DeletePostPayload"));
    }

    #[test]
    fn test_longest_match_wins() {
        let mut schema = Schema::new();
        schema.insert(TypeDefinition::object(
            "UpdateUserPostPayload",
            [
                Field::new("post", TypeRef::named("Post")),
                Field::new("userPost", TypeRef::named("UserPost")),
            ],
        ));
        let wrappers = detect_wrappers(&schema).expect("detect");
        assert_eq!(wrappers["UpdateUserPostPayload"].field_name, "userPost");
    }

    #[test]
    fn test_case_only_difference_is_ambiguous() {
        let mut schema = Schema::new();
        schema.insert(TypeDefinition::object(
            "CreatePostPayload",
            [
                Field::new("post", TypeRef::named("Post")),
                Field::new("Post", TypeRef::named("Post")),
            ],
        ));
        let err = detect_wrappers(&schema).expect_err("ambiguous");
        assert!(matches!(err, SchemaError::AmbiguousWrapper { ref fields, .. } if fields.len() == 2));
    }

    #[test]
    fn test_unwrap_payloads() {
        let mut schema = schema();
        let wrappers = detect_wrappers(&schema).expect("detect");
        let removed = unwrap_payloads(&mut schema, &wrappers);

        assert_eq!(removed, ["CreatePostPayload"]);
        let mutation = schema.object_fields("Mutation").expect("Mutation");
        assert_eq!(mutation["createPost"].ty.to_string(), "Post");
        assert_eq!(mutation["deletePost"].ty.to_string(), "DeletePostPayload");
        assert!(schema.get("DeletePostPayload").is_some());
    }

    #[test]
    fn test_wrapper_for_ignores_lists() {
        let wrappers = detect_wrappers(&schema()).expect("detect");
        assert!(wrapper_for(&wrappers, &TypeRef::named_nn("CreatePostPayload")).is_some());
        assert!(wrapper_for(&wrappers, &TypeRef::list(TypeRef::named("CreatePostPayload"))).is_none());
    }
}
