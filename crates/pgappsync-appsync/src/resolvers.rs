//! Desired resolver configuration for every root field.
//!
//! Query and Mutation fields resolve through a one-function pipeline that
//! invokes the request handler. Subscription fields are local resolvers on
//! the `NONE` data source that only install the client's filter.

use pgappsync_schema::model::Schema;
use pgappsync_schema::{WrapperMap, wrapper_for};
use serde::Serialize;

/// Data source name AppSync uses for local resolvers.
pub const NONE_DATA_SOURCE: &str = "NONE";

pub const PIPELINE_RESPONSE_TEMPLATE: &str = "$util.toJson($ctx.result)";

pub const SUBSCRIPTION_REQUEST_TEMPLATE: &str = r#"{ "version": "2017-02-28", "payload": {} }"#;

pub const SUBSCRIPTION_RESPONSE_TEMPLATE: &str = "#if (!$util.isNullOrEmpty($ctx.args.filter))
$extensions.setSubscriptionFilter($util.transform.toSubscriptionFilter($util.parseJson($ctx.args.filter)))
#end
$util.toJson(null)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolverKind {
    Pipeline,
    Unit,
}

/// Desired state of one resolver; recomputed and pushed on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    pub api_id: String,
    pub type_name: String,
    pub field_name: String,
    pub kind: ResolverKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source_name: Option<String>,
    pub request_template: String,
    pub response_template: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pipeline_functions: Vec<String>,
}

impl ResolverConfig {
    /// `Type.field`
    #[must_use]
    pub fn coordinate(&self) -> String {
        format!("{}.{}", self.type_name, self.field_name)
    }
}

/// Request template for a pipeline field; stashes the wrapped field name so
/// the request handler can re-wrap and unwrap the mutation payload.
#[must_use]
pub fn pipeline_request_template(wrapper_field: Option<&str>) -> String {
    match wrapper_field {
        Some(field) => format!("$util.qr($ctx.stash.put(\"wrapper\", \"{field}\"))\n{{}}"),
        None => "{}".to_string(),
    }
}

#[must_use]
pub fn pipeline_resolver(
    api_id: &str,
    type_name: &str,
    field_name: &str,
    function_id: &str,
    wrapper_field: Option<&str>,
) -> ResolverConfig {
    ResolverConfig {
        api_id: api_id.to_string(),
        type_name: type_name.to_string(),
        field_name: field_name.to_string(),
        kind: ResolverKind::Pipeline,
        data_source_name: None,
        request_template: pipeline_request_template(wrapper_field),
        response_template: PIPELINE_RESPONSE_TEMPLATE.to_string(),
        pipeline_functions: vec![function_id.to_string()],
    }
}

#[must_use]
pub fn subscription_resolver(api_id: &str, type_name: &str, field_name: &str) -> ResolverConfig {
    ResolverConfig {
        api_id: api_id.to_string(),
        type_name: type_name.to_string(),
        field_name: field_name.to_string(),
        kind: ResolverKind::Unit,
        data_source_name: Some(NONE_DATA_SOURCE.to_string()),
        request_template: SUBSCRIPTION_REQUEST_TEMPLATE.to_string(),
        response_template: SUBSCRIPTION_RESPONSE_TEMPLATE.to_string(),
        pipeline_functions: Vec::new(),
    }
}

/// Every resolver the schema needs: all Query fields, then all Mutation
/// fields, then all Subscription fields.
///
/// Pass the schema before payload unwrapping so mutation fields still name
/// their payload types.
#[must_use]
pub fn desired_resolvers(
    schema: &Schema,
    wrappers: &WrapperMap,
    api_id: &str,
    function_id: &str,
) -> Vec<ResolverConfig> {
    let mut resolvers = Vec::new();

    for type_name in [schema.query_type.as_deref(), schema.mutation_type.as_deref()]
        .into_iter()
        .flatten()
    {
        let Some(fields) = schema.object_fields(type_name) else {
            continue;
        };
        for field in fields.values() {
            let wrapper = wrapper_for(wrappers, &field.ty).map(|w| w.field_name.as_str());
            resolvers.push(pipeline_resolver(
                api_id,
                type_name,
                &field.name,
                function_id,
                wrapper,
            ));
        }
    }

    if let Some(type_name) = schema.subscription_type.as_deref()
        && let Some(fields) = schema.object_fields(type_name)
    {
        resolvers.extend(
            fields
                .keys()
                .map(|field_name| subscription_resolver(api_id, type_name, field_name)),
        );
    }

    resolvers
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgappsync_schema::model::{Field, TypeDefinition, TypeRef};
    use pgappsync_schema::{detect_wrappers, install_subscriptions};

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema.mutation_type = Some("Mutation".into());
        schema.insert(TypeDefinition::object(
            "Query",
            [Field::new("allPosts", TypeRef::list(TypeRef::named("Post")))],
        ));
        schema.insert(TypeDefinition::object(
            "Mutation",
            [
                Field::new("createPost", TypeRef::named("CreatePostPayload")),
                Field::new("publish", TypeRef::named("Boolean")),
            ],
        ));
        schema.insert(TypeDefinition::object(
            "CreatePostPayload",
            [Field::new("post", TypeRef::named("Post"))],
        ));
        schema
    }

    #[test]
    fn test_pipeline_request_template() {
        assert_eq!(pipeline_request_template(None), "{}");
        assert_eq!(
            pipeline_request_template(Some("post")),
            "$util.qr($ctx.stash.put(\"wrapper\", \"post\"))\n{}"
        );
    }

    #[test]
    fn test_desired_resolvers_order_and_templates() {
        let mut schema = schema();
        let wrappers = detect_wrappers(&schema).expect("wrappers");
        install_subscriptions(&mut schema).expect("subscriptions");

        let resolvers = desired_resolvers(&schema, &wrappers, "api-1", "fn-1");
        let coordinates: Vec<_> = resolvers.iter().map(ResolverConfig::coordinate).collect();
        assert_eq!(
            coordinates,
            [
                "Query.allPosts",
                "Mutation.createPost",
                "Mutation.publish",
                "Subscription.onCreatePost",
                "Subscription.onPublish",
            ]
        );

        let create = &resolvers[1];
        assert_eq!(create.kind, ResolverKind::Pipeline);
        assert_eq!(create.pipeline_functions, ["fn-1"]);
        assert!(create.request_template.contains("\"wrapper\", \"post\""));
        assert_eq!(create.response_template, PIPELINE_RESPONSE_TEMPLATE);
        assert_eq!(resolvers[2].request_template, "{}");

        let subscription = &resolvers[3];
        assert_eq!(subscription.kind, ResolverKind::Unit);
        assert_eq!(subscription.data_source_name.as_deref(), Some("NONE"));
        assert!(subscription.pipeline_functions.is_empty());
        assert_eq!(subscription.response_template.lines().count(), 4);
    }

    #[test]
    fn test_serialized_shape() {
        let config = subscription_resolver("api-1", "Subscription", "onCreatePost");
        let json = serde_json::to_value(&config).expect("serialize");
        assert_eq!(json["kind"], "UNIT");
        assert_eq!(json["dataSourceName"], "NONE");
        assert!(json.get("pipelineFunctions").is_none());
    }
}
