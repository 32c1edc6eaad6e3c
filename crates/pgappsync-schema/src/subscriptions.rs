//! Subscription fields derived from the mutation root.

use crate::error::{Result, SchemaError};
use crate::model::{Directive, Field, InputValue, Schema, TypeDefinition, TypeKind, TypeRef};

/// Name of the synthesized subscription root.
pub const SUBSCRIPTION_TYPE: &str = "Subscription";

/// Directive AppSync uses to fan mutation results out to subscribers.
pub const SUBSCRIBE_DIRECTIVE: &str = "aws_subscribe";

/// Name of the optional filter argument on every subscription field.
pub const FILTER_ARGUMENT: &str = "filter";

/// `createPost` → `onCreatePost`.
#[must_use]
pub fn subscription_field_name(mutation_field: &str) -> String {
    let mut chars = mutation_field.chars();
    match chars.next() {
        Some(first) => format!("on{}{}", first.to_uppercase(), chars.as_str()),
        None => "on".to_string(),
    }
}

/// Builds the subscription root: one field per mutation field, in mutation
/// order. Returns `None` when there is no mutation field to subscribe to.
#[must_use]
pub fn synthesize_subscriptions(schema: &Schema) -> Option<TypeDefinition> {
    let fields: Vec<Field> = schema
        .mutation_fields()
        .map(|mutation| {
            Field::new(subscription_field_name(&mutation.name), mutation.ty.clone())
                .argument(InputValue::new(FILTER_ARGUMENT, TypeRef::named("String")))
                .directive(
                    Directive::new(SUBSCRIBE_DIRECTIVE)
                        .argument("mutations", format!("[\"{}\"]", mutation.name)),
                )
        })
        .collect();

    if fields.is_empty() {
        return None;
    }
    Some(TypeDefinition::object(SUBSCRIPTION_TYPE, fields))
}

/// Adds the synthesized subscription root to the schema.
///
/// Returns the names of the subscription fields, empty when the schema has
/// no mutations.
///
/// # Errors
///
/// Returns `SchemaError::SubscriptionConflict` when the schema already has a
/// subscription root or a type named `Subscription`.
pub fn install_subscriptions(schema: &mut Schema) -> Result<Vec<String>> {
    let Some(subscription) = synthesize_subscriptions(schema) else {
        return Ok(Vec::new());
    };
    if let Some(existing) = schema.subscription_type.as_ref() {
        return Err(SchemaError::SubscriptionConflict(existing.clone()));
    }
    if schema.get(SUBSCRIPTION_TYPE).is_some() {
        return Err(SchemaError::SubscriptionConflict(SUBSCRIPTION_TYPE.to_string()));
    }

    let names = schema_field_names(&subscription);
    schema.insert(subscription);
    schema.subscription_type = Some(SUBSCRIPTION_TYPE.to_string());
    Ok(names)
}

fn schema_field_names(definition: &TypeDefinition) -> Vec<String> {
    match &definition.kind {
        TypeKind::Object { fields, .. } => fields.keys().cloned().collect(),
        _ => Vec::new(),
    }
}
