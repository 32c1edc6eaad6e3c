//! In-memory GraphQL schema model.
//!
//! The model mirrors what GraphQL introspection exposes, keeps declaration
//! order for types, fields and arguments, and serializes to JSON so it can be
//! handed from the sync path to the request path as a cache artifact.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Scalars every GraphQL implementation provides; never printed.
pub const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// A complete GraphQL schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Name of the query root type.
    pub query_type: Option<String>,
    /// Name of the mutation root type.
    pub mutation_type: Option<String>,
    /// Name of the subscription root type.
    pub subscription_type: Option<String>,
    /// All named types, in declaration order.
    pub types: IndexMap<String, TypeDefinition>,
}

impl Schema {
    /// Creates an empty schema with the conventional `Query` root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            query_type: Some("Query".to_string()),
            mutation_type: None,
            subscription_type: None,
            types: IndexMap::new(),
        }
    }

    /// Adds or replaces a type definition.
    pub fn insert(&mut self, definition: TypeDefinition) {
        self.types.insert(definition.name.clone(), definition);
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    /// Returns the fields of an object type, if `name` is one.
    #[must_use]
    pub fn object_fields(&self, name: &str) -> Option<&IndexMap<String, Field>> {
        match self.types.get(name).map(|t| &t.kind) {
            Some(TypeKind::Object { fields, .. }) => Some(fields),
            _ => None,
        }
    }

    /// Fields of the mutation root, empty when there is none.
    pub fn mutation_fields(&self) -> impl Iterator<Item = &Field> {
        self.mutation_type
            .as_deref()
            .and_then(|name| self.object_fields(name))
            .into_iter()
            .flat_map(|fields| fields.values())
    }

    /// Returns true when any field, argument or input field refers to `name`.
    #[must_use]
    pub fn is_referenced(&self, name: &str) -> bool {
        let root = |n: &Option<String>| n.as_deref() == Some(name);
        if root(&self.query_type) || root(&self.mutation_type) || root(&self.subscription_type) {
            return true;
        }
        self.types.values().any(|def| match &def.kind {
            TypeKind::Object { fields, interfaces } | TypeKind::Interface { fields, interfaces } => {
                interfaces.iter().any(|i| i == name)
                    || fields.values().any(|f| {
                        f.ty.base_name() == name || f.args.values().any(|a| a.ty.base_name() == name)
                    })
            }
            TypeKind::InputObject { fields } => fields.values().any(|f| f.ty.base_name() == name),
            TypeKind::Union { members } => members.iter().any(|m| m == name),
            TypeKind::Scalar | TypeKind::Enum { .. } => false,
        })
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

/// A named type and its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: TypeKind,
}

impl TypeDefinition {
    #[must_use]
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind: TypeKind::Scalar,
        }
    }

    #[must_use]
    pub fn object(name: impl Into<String>, fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind: TypeKind::Object {
                fields: fields.into_iter().map(|f| (f.name.clone(), f)).collect(),
                interfaces: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn input(name: impl Into<String>, fields: impl IntoIterator<Item = InputValue>) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind: TypeKind::InputObject {
                fields: fields.into_iter().map(|f| (f.name.clone(), f)).collect(),
            },
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self.kind, TypeKind::Object { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object {
        fields: IndexMap<String, Field>,
        #[serde(default)]
        interfaces: Vec<String>,
    },
    Interface {
        fields: IndexMap<String, Field>,
        #[serde(default)]
        interfaces: Vec<String>,
    },
    Union {
        members: Vec<String>,
    },
    Enum {
        values: Vec<EnumValue>,
    },
    InputObject {
        fields: IndexMap<String, InputValue>,
    },
}

/// An output field of an object or interface type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub args: IndexMap<String, InputValue>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            args: IndexMap::new(),
            ty,
            deprecation_reason: None,
            directives: Vec::new(),
        }
    }

    #[must_use]
    pub fn argument(mut self, arg: InputValue) -> Self {
        self.args.insert(arg.name.clone(), arg);
        self
    }

    #[must_use]
    pub fn directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A field argument or an input object field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputValue {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Default value as GraphQL literal text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl InputValue {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            default_value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation_reason: Option<String>,
}

/// A directive applied to a field, with arguments kept as literal text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<(String, String)>,
}

impl Directive {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, literal: impl Into<String>) -> Self {
        self.arguments.push((name.into(), literal.into()));
        self
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if !self.arguments.is_empty() {
            let args: Vec<String> = self
                .arguments
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect();
            write!(f, "({})", args.join(", "))?;
        }
        Ok(())
    }
}

/// A reference to a type, possibly wrapped in list / non-null modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    #[must_use]
    pub fn named_nn(name: impl Into<String>) -> Self {
        Self::NonNull(Box::new(Self::named(name)))
    }

    #[must_use]
    pub fn list(inner: TypeRef) -> Self {
        Self::List(Box::new(inner))
    }

    #[must_use]
    pub fn non_null(inner: TypeRef) -> Self {
        match inner {
            nn @ Self::NonNull(_) => nn,
            other => Self::NonNull(Box::new(other)),
        }
    }

    /// Innermost named type.
    #[must_use]
    pub fn base_name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::List(inner) | Self::NonNull(inner) => inner.base_name(),
        }
    }

    /// Named type when the reference is `T` or `T!`, i.e. not a list.
    #[must_use]
    pub fn direct_name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::NonNull(inner) => match inner.as_ref() {
                Self::Named(name) => Some(name),
                _ => None,
            },
            Self::List(_) => None,
        }
    }

    #[must_use]
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    /// Strips one outer non-null modifier.
    #[must_use]
    pub fn nullable(&self) -> &TypeRef {
        match self {
            Self::NonNull(inner) => inner,
            other => other,
        }
    }

    /// Replaces the innermost named type with `replacement`, keeping the
    /// wrapping modifiers. A non-null replacement under a non-null wrapper
    /// collapses into a single non-null.
    #[must_use]
    pub fn replace_named(&self, replacement: &TypeRef) -> TypeRef {
        match self {
            Self::Named(_) => replacement.clone(),
            Self::List(inner) => Self::list(inner.replace_named(replacement)),
            Self::NonNull(inner) => Self::non_null(inner.replace_named(replacement)),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}
