//! Request-scoped settings from caller context.

use pgappsync_db_postgres::Settings;
use serde_json::Value;

use super::event::InvocationEvent;

/// Namespace of every request setting.
pub const SETTINGS_PREFIX: &str = "appsync";
/// Separator between nested keys below the namespace.
pub const SETTINGS_SEPARATOR: &str = "_";

/// Flattens nested objects and arrays into `prefix<sep>key` entries.
///
/// Arrays flatten by index, null leaves are dropped and other scalars are
/// rendered as text. Colliding keys are not resolved: the last write wins.
#[must_use]
pub fn flatten_settings(value: &Value, prefix: Option<&str>, separator: &str) -> Settings {
    let mut settings = Settings::new();
    flatten_into(value, prefix, separator, &mut settings);
    settings
}

fn flatten_into(value: &Value, prefix: Option<&str>, separator: &str, out: &mut Settings) {
    let key = |name: &str| match prefix {
        Some(prefix) => format!("{prefix}{separator}{name}"),
        None => name.to_string(),
    };

    match value {
        Value::Object(map) => {
            for (name, value) in map {
                flatten_into(value, Some(key(name).as_str()), separator, out);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                flatten_into(value, Some(key(&index.to_string()).as_str()), separator, out);
            }
        }
        Value::Null => {}
        Value::String(s) => {
            if let Some(prefix) = prefix {
                out.insert(prefix.to_string(), s.clone());
            }
        }
        scalar => {
            if let Some(prefix) = prefix {
                out.insert(prefix.to_string(), scalar.to_string());
            }
        }
    }
}

/// Turns a flattened key into a simple identifier PostgreSQL accepts as
/// the second part of a custom parameter name.
///
/// Characters outside `[A-Za-z0-9_$]` become `_`, and a leading digit or `$`
/// gets a `_` in front.
#[must_use]
pub fn identifier(key: &str) -> String {
    let mut ident: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if !ident.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        ident.insert(0, '_');
    }
    ident
}

/// Settings applied for the duration of one invocation, named
/// `appsync.<flattened_key>`.
#[must_use]
pub fn request_settings(event: &InvocationEvent) -> Settings {
    flatten_settings(&event.settings_source(), None, SETTINGS_SEPARATOR)
        .into_iter()
        .map(|(key, value)| (format!("{SETTINGS_PREFIX}.{}", identifier(&key)), value))
        .collect()
}
