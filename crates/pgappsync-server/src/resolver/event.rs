//! Field invocation as AppSync forwards it to the pipeline function.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parent type whose calls may carry a payload wrapper.
pub const MUTATION_TYPE: &str = "Mutation";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEvent {
    pub info: FieldInfo,
    #[serde(default)]
    pub arguments: Value,
    #[serde(default)]
    pub identity: Value,
    #[serde(default)]
    pub stash: Stash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub field_name: String,
    pub parent_type_name: String,
    /// Selection set of the client request, braces included. Absent for
    /// scalar fields.
    #[serde(default, rename = "selectionSetGraphQL")]
    pub selection_set_graphql: Option<String>,
}

/// Values put in the stash by the resolver's request template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stash {
    #[serde(default)]
    pub wrapper: Option<String>,
    #[serde(default)]
    pub pg_settings: Option<Value>,
}

impl InvocationEvent {
    /// `Type.field` of the invoked field.
    #[must_use]
    pub fn coordinate(&self) -> String {
        format!("{}.{}", self.info.parent_type_name, self.info.field_name)
    }

    /// Payload wrapper field, only honoured for mutations.
    #[must_use]
    pub fn wrapper(&self) -> Option<&str> {
        if self.info.parent_type_name != MUTATION_TYPE {
            return None;
        }
        self.stash.wrapper.as_deref().filter(|w| !w.is_empty())
    }

    /// Operation variables; a missing or null argument map is empty.
    #[must_use]
    pub fn variables(&self) -> Value {
        match &self.arguments {
            Value::Null => Value::Object(Map::new()),
            other => other.clone(),
        }
    }

    /// `{identity, ...pgSettings}`, the object flattened into request settings.
    #[must_use]
    pub fn settings_source(&self) -> Value {
        let mut source = Map::new();
        source.insert("identity".to_string(), self.identity.clone());
        if let Some(Value::Object(settings)) = &self.stash.pg_settings {
            for (key, value) in settings {
                source.insert(key.clone(), value.clone());
            }
        }
        Value::Object(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: Value) -> InvocationEvent {
        serde_json::from_value(value).expect("event")
    }

    #[test]
    fn test_decodes_appsync_event() {
        let e = event(json!({
            "info": {
                "fieldName": "createPost",
                "parentTypeName": "Mutation",
                "selectionSetGraphQL": "{ id }",
                "variables": {}
            },
            "arguments": { "input": { "title": "t" } },
            "identity": { "sub": "u-1" },
            "stash": { "wrapper": "post", "pgSettings": { "role": "editor" } },
            "source": null,
            "prev": { "result": {} }
        }));
        assert_eq!(e.coordinate(), "Mutation.createPost");
        assert_eq!(e.info.selection_set_graphql.as_deref(), Some("{ id }"));
        assert_eq!(e.wrapper(), Some("post"));
        assert_eq!(e.variables(), json!({ "input": { "title": "t" } }));
    }

    #[test]
    fn test_wrapper_ignored_outside_mutations() {
        let e = event(json!({
            "info": { "fieldName": "post", "parentTypeName": "Query" },
            "stash": { "wrapper": "post" }
        }));
        assert_eq!(e.wrapper(), None);
        assert_eq!(e.variables(), json!({}));
    }

    #[test]
    fn test_pg_settings_override_identity() {
        let e = event(json!({
            "info": { "fieldName": "post", "parentTypeName": "Query" },
            "identity": { "sub": "u-1" },
            "stash": { "pgSettings": { "identity": "override", "role": "r" } }
        }));
        assert_eq!(
            e.settings_source(),
            json!({ "identity": "override", "role": "r" })
        );
    }
}
