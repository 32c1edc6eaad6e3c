//! Everything a sync run pushes, computed before any remote call.

use pgappsync_schema::model::Schema;
use pgappsync_schema::{
    PrintOptions, PruneOptions, WrapperMap, detect_wrappers, install_subscriptions, map_scalars,
    prune_schema, to_appsync_sdl, unwrap_payloads,
};
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::resolvers::{ResolverConfig, desired_resolvers};

/// Inputs for [`build_sync_plan`].
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub api_id: String,
    /// Pipeline function that invokes the request handler.
    pub function_id: String,
    pub prune: PruneOptions,
    pub print: PrintOptions,
}

/// SDL to publish and resolvers to reconcile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPlan {
    pub api_id: String,
    pub sdl: String,
    pub resolvers: Vec<ResolverConfig>,
    pub wrappers: WrapperMap,
}

/// Transforms a copy of the introspected schema into the published one.
///
/// The input schema is left untouched; the request path keeps using it.
///
/// # Errors
///
/// Returns schema errors for ambiguous wrappers or a pre-existing
/// subscription root.
pub fn build_sync_plan(introspected: &Schema, options: &PlanOptions) -> Result<SyncPlan> {
    let mut schema = introspected.clone();

    let pruned = prune_schema(&mut schema, &options.prune);
    let mapped = map_scalars(&mut schema);
    let wrappers = detect_wrappers(&schema)?;
    let subscriptions = install_subscriptions(&mut schema)?;

    // Resolvers look wrappers up by the payload type names, so they are
    // computed before unwrapping.
    let resolvers = desired_resolvers(&schema, &wrappers, &options.api_id, &options.function_id);

    let removed = unwrap_payloads(&mut schema, &wrappers);
    let sdl = to_appsync_sdl(&schema, &options.print);

    info!(
        pruned,
        mapped,
        wrappers = wrappers.len(),
        subscriptions = subscriptions.len(),
        removed_payloads = removed.len(),
        resolvers = resolvers.len(),
        "Built sync plan"
    );

    Ok(SyncPlan {
        api_id: options.api_id.clone(),
        sdl,
        resolvers,
        wrappers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgappsync_schema::model::{Field, InputValue, TypeDefinition, TypeRef};

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema.mutation_type = Some("Mutation".into());
        schema.insert(TypeDefinition::object(
            "Query",
            [
                Field::new("query", TypeRef::named_nn("Query")),
                Field::new("post", TypeRef::named("Post"))
                    .argument(InputValue::new("id", TypeRef::named_nn("UUID"))),
            ],
        ));
        schema.insert(TypeDefinition::object(
            "Mutation",
            [Field::new("createPost", TypeRef::named("CreatePostPayload"))],
        ));
        schema.insert(TypeDefinition::object(
            "CreatePostPayload",
            [
                Field::new("clientMutationId", TypeRef::named("String")),
                Field::new("post", TypeRef::named("Post")),
            ],
        ));
        schema.insert(TypeDefinition::object(
            "Post",
            [Field::new("id", TypeRef::named_nn("UUID"))],
        ));
        schema.insert(TypeDefinition::scalar("UUID"));
        schema
    }

    fn options() -> PlanOptions {
        PlanOptions {
            api_id: "api-1".into(),
            function_id: "fn-1".into(),
            ..PlanOptions::default()
        }
    }

    #[test]
    fn test_plan() {
        let introspected = schema();
        let plan = build_sync_plan(&introspected, &options()).expect("plan");

        assert_eq!(plan.api_id, "api-1");
        assert_eq!(plan.wrappers["CreatePostPayload"].field_name, "post");
        assert!(plan.sdl.contains("createPost: Post\n"));
        assert!(plan.sdl.contains("onCreatePost(filter: String): Post @aws_subscribe"));
        assert!(plan.sdl.contains("post(id: ID!): Post"));
        assert!(!plan.sdl.contains("Payload"));
        assert!(!plan.sdl.contains("scalar"));

        let coordinates: Vec<_> = plan.resolvers.iter().map(ResolverConfig::coordinate).collect();
        assert_eq!(
            coordinates,
            ["Query.post", "Mutation.createPost", "Subscription.onCreatePost"]
        );
        assert!(plan.resolvers[1].request_template.contains("\"post\""));

        assert_eq!(introspected, schema());
    }

    #[test]
    fn test_existing_subscription_root_is_rejected() {
        let mut schema = schema();
        schema.subscription_type = Some("Subscription".into());
        let err = build_sync_plan(&schema, &options()).expect_err("conflict");
        assert!(err.to_string().contains("Subscription"));
    }
}
