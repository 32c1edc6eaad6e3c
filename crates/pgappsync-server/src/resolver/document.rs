//! Operation documents for a single field invocation and result extraction.

use pgappsync_db_postgres::first_error;
use pgappsync_schema::FieldArgSpecs;
use serde_json::Value;

use super::error::{AdapterError, Result};
use super::event::InvocationEvent;

/// Builds the operation that resolves exactly the invoked field.
///
/// Wrapped mutations select the payload field around the client's
/// selection set, matching the database schema's mutation shape. Fields with
/// arguments declare them as variables so the event arguments can be passed
/// through unchanged.
#[must_use]
pub fn build_document(event: &InvocationEvent, arg_specs: &FieldArgSpecs) -> String {
    let info = &event.info;
    let selection = info.selection_set_graphql.as_deref().unwrap_or_default();
    let selection = match event.wrapper() {
        Some(wrapper) => format!("{{{wrapper} {selection}}}"),
        None => selection.to_string(),
    };
    let operation = info.parent_type_name.to_lowercase();

    match arg_specs.get(&info.parent_type_name, &info.field_name) {
        Some(spec) => format!(
            "{operation}({}) {{\n {}({}) {selection}\n}}",
            spec.variables, info.field_name, spec.arguments
        ),
        None => format!("{operation} {{\n {} {selection}\n}}", info.field_name),
    }
}

/// Picks the invoked field out of a GraphQL response.
///
/// # Errors
///
/// Returns `AdapterError::Execution` with the first reported message when the
/// response carries errors.
pub fn extract_field(response: &Value, field_name: &str, wrapper: Option<&str>) -> Result<Value> {
    if let Some(message) = first_error(response) {
        return Err(AdapterError::execution(message));
    }

    let value = response
        .get("data")
        .and_then(|data| data.get(field_name))
        .cloned()
        .unwrap_or(Value::Null);

    Ok(match wrapper {
        Some(wrapper) => value.get(wrapper).cloned().unwrap_or(Value::Null),
        None => value,
    })
}
