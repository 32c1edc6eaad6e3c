//! Rewrites database-native scalar names to AppSync's scalar set.

use tracing::debug;

use crate::model::{Schema, TypeKind, TypeRef};

/// Scalar renames applied to every field, argument and input field.
pub const SCALAR_MAPPINGS: [(&str, &str); 8] = [
    ("UUID", "ID"),
    ("Cursor", "String"),
    ("BigInt", "Int"),
    ("BigFloat", "Float"),
    ("Date", "AWSDate"),
    ("Datetime", "AWSDateTime"),
    ("Time", "AWSTime"),
    ("JSON", "AWSJSON"),
];

/// Returns the AppSync scalar for a database scalar name, if it has one.
#[must_use]
pub fn appsync_scalar(name: &str) -> Option<&'static str> {
    SCALAR_MAPPINGS
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
}

/// Maps the named type inside `ty`, preserving list and non-null wrappers.
/// Returns true when a replacement happened.
fn map_type_ref(ty: &mut TypeRef) -> bool {
    match ty {
        TypeRef::Named(name) => match appsync_scalar(name) {
            Some(target) => {
                *name = target.to_string();
                true
            }
            None => false,
        },
        TypeRef::List(inner) | TypeRef::NonNull(inner) => map_type_ref(inner),
    }
}

/// Rewrites scalar references in place and returns how many were replaced.
///
/// Every field, field argument and input field of every object, interface
/// and input object type is visited exactly once. Scalar declarations are
/// left alone; the SDL printer drops them.
pub fn map_scalars(schema: &mut Schema) -> usize {
    let mut replaced = 0;

    for definition in schema.types.values_mut() {
        match &mut definition.kind {
            TypeKind::Object { fields, .. } | TypeKind::Interface { fields, .. } => {
                for field in fields.values_mut() {
                    replaced += usize::from(map_type_ref(&mut field.ty));
                    for arg in field.args.values_mut() {
                        replaced += usize::from(map_type_ref(&mut arg.ty));
                    }
                }
            }
            TypeKind::InputObject { fields } => {
                for field in fields.values_mut() {
                    replaced += usize::from(map_type_ref(&mut field.ty));
                }
            }
            TypeKind::Scalar | TypeKind::Union { .. } | TypeKind::Enum { .. } => {}
        }
    }

    debug!(replaced, "Mapped database scalars to AppSync scalars");
    replaced
}
