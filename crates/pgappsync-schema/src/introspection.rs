//! Decoding of GraphQL introspection results into the schema model.
//!
//! The database engine answers [`INTROSPECTION_QUERY`] with the usual
//! `{"__schema": {...}}` payload; [`Schema::from_introspection`] turns it into
//! a [`Schema`].

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::model::{EnumValue, Field, InputValue, Schema, TypeDefinition, TypeKind, TypeRef};

/// Full introspection document, including deprecated fields and enum values.
pub const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types { ...FullType }
  }
}

fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args { ...InputValue }
    type { ...TypeRef }
    isDeprecated
    deprecationReason
  }
  inputFields { ...InputValue }
  interfaces { ...TypeRef }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes { ...TypeRef }
}

fragment InputValue on __InputValue {
  name
  description
  type { ...TypeRef }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
              ofType {
                kind
                name
              }
            }
          }
        }
      }
    }
  }
}"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionSchema {
    query_type: Option<NamedRef>,
    mutation_type: Option<NamedRef>,
    subscription_type: Option<NamedRef>,
    types: Vec<FullType>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FullType {
    kind: String,
    name: String,
    description: Option<String>,
    fields: Option<Vec<IntrospectionField>>,
    input_fields: Option<Vec<IntrospectionInputValue>>,
    interfaces: Option<Vec<IntrospectionTypeRef>>,
    enum_values: Option<Vec<IntrospectionEnumValue>>,
    possible_types: Option<Vec<IntrospectionTypeRef>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionField {
    name: String,
    description: Option<String>,
    #[serde(default)]
    args: Vec<IntrospectionInputValue>,
    #[serde(rename = "type")]
    ty: IntrospectionTypeRef,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionInputValue {
    name: String,
    description: Option<String>,
    #[serde(rename = "type")]
    ty: IntrospectionTypeRef,
    default_value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionEnumValue {
    name: String,
    description: Option<String>,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionTypeRef {
    kind: String,
    name: Option<String>,
    of_type: Option<Box<IntrospectionTypeRef>>,
}

impl IntrospectionTypeRef {
    fn to_type_ref(&self) -> Result<TypeRef> {
        let inner = || {
            self.of_type
                .as_deref()
                .ok_or_else(|| SchemaError::Introspection(format!("{} without ofType", self.kind)))
                .and_then(IntrospectionTypeRef::to_type_ref)
        };
        match self.kind.as_str() {
            "NON_NULL" => Ok(TypeRef::non_null(inner()?)),
            "LIST" => Ok(TypeRef::list(inner()?)),
            _ => self
                .name
                .clone()
                .map(TypeRef::Named)
                .ok_or_else(|| SchemaError::Introspection(format!("unnamed {} type", self.kind))),
        }
    }

    fn name(&self) -> Result<String> {
        self.name
            .clone()
            .ok_or_else(|| SchemaError::Introspection("expected a named type".into()))
    }
}

fn deprecation(is_deprecated: bool, reason: Option<String>) -> Option<String> {
    // An empty reason still marks the element deprecated.
    is_deprecated.then(|| reason.unwrap_or_default())
}

fn convert_input(value: IntrospectionInputValue) -> Result<InputValue> {
    Ok(InputValue {
        ty: value.ty.to_type_ref()?,
        name: value.name,
        description: value.description,
        default_value: value.default_value,
    })
}

fn convert_field(field: IntrospectionField) -> Result<Field> {
    let args = field
        .args
        .into_iter()
        .map(|a| convert_input(a).map(|a| (a.name.clone(), a)))
        .collect::<Result<_>>()?;
    Ok(Field {
        ty: field.ty.to_type_ref()?,
        name: field.name,
        description: field.description,
        args,
        deprecation_reason: deprecation(field.is_deprecated, field.deprecation_reason),
        directives: Vec::new(),
    })
}

fn convert_type(full: FullType) -> Result<TypeDefinition> {
    let fields = |fields: Option<Vec<IntrospectionField>>| {
        fields
            .unwrap_or_default()
            .into_iter()
            .map(|f| convert_field(f).map(|f| (f.name.clone(), f)))
            .collect::<Result<_>>()
    };
    let names = |refs: Option<Vec<IntrospectionTypeRef>>| {
        refs.unwrap_or_default()
            .iter()
            .map(IntrospectionTypeRef::name)
            .collect::<Result<Vec<_>>>()
    };

    let kind = match full.kind.as_str() {
        "SCALAR" => TypeKind::Scalar,
        "OBJECT" => TypeKind::Object {
            fields: fields(full.fields)?,
            interfaces: names(full.interfaces)?,
        },
        "INTERFACE" => TypeKind::Interface {
            fields: fields(full.fields)?,
            interfaces: names(full.interfaces)?,
        },
        "UNION" => TypeKind::Union {
            members: names(full.possible_types)?,
        },
        "ENUM" => TypeKind::Enum {
            values: full
                .enum_values
                .unwrap_or_default()
                .into_iter()
                .map(|v| EnumValue {
                    name: v.name,
                    description: v.description,
                    deprecation_reason: deprecation(v.is_deprecated, v.deprecation_reason),
                })
                .collect(),
        },
        "INPUT_OBJECT" => TypeKind::InputObject {
            fields: full
                .input_fields
                .unwrap_or_default()
                .into_iter()
                .map(|f| convert_input(f).map(|f| (f.name.clone(), f)))
                .collect::<Result<_>>()?,
        },
        other => {
            return Err(SchemaError::Introspection(format!(
                "unknown kind {other} for type {}",
                full.name
            )));
        }
    };

    Ok(TypeDefinition {
        name: full.name,
        description: full.description,
        kind,
    })
}

impl Schema {
    /// Builds a schema from an introspection response.
    ///
    /// Accepts the `__schema` object itself, `{"__schema": ...}`, or a full
    /// GraphQL response `{"data": {"__schema": ...}}`. Introspection types
    /// (`__Type`, `__Field`, ...) are dropped.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Introspection` when the payload is not a valid
    /// introspection result.
    pub fn from_introspection(value: &Value) -> Result<Self> {
        let raw = value
            .pointer("/data/__schema")
            .or_else(|| value.get("__schema"))
            .unwrap_or(value);

        let decoded: IntrospectionSchema = serde_json::from_value(raw.clone())
            .map_err(|e| SchemaError::Introspection(e.to_string()))?;

        let mut schema = Schema {
            query_type: decoded.query_type.map(|t| t.name),
            mutation_type: decoded.mutation_type.map(|t| t.name),
            subscription_type: decoded.subscription_type.map(|t| t.name),
            types: Default::default(),
        };

        for full in decoded.types {
            if full.name.starts_with("__") {
                continue;
            }
            schema.insert(convert_type(full)?);
        }

        debug!(
            types = schema.types.len(),
            query = ?schema.query_type,
            mutation = ?schema.mutation_type,
            "Decoded introspection result"
        );

        Ok(schema)
    }
}
