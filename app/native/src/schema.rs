//! JSON Schema for the configuration file.

use schemars::schema_for;

use crate::config::CaravelConfig;

/// Identifier advertised in the generated schema.
const SCHEMA_ID: &str =
    "https://raw.githubusercontent.com/pierrotws/caravel/main/caravel.schema.json";

/// Generates the JSON Schema of [`CaravelConfig`].
#[must_use]
pub fn generate_schema() -> serde_json::Value {
    let schema = schema_for!(CaravelConfig);
    let mut value = serde_json::to_value(&schema).unwrap_or_default();

    if let Some(object) = value.as_object_mut() {
        object.insert("$id".to_string(), serde_json::Value::String(SCHEMA_ID.to_string()));
    }

    value
}

/// Returns the schema as pretty-printed JSON.
#[must_use]
pub fn print_schema() -> String {
    serde_json::to_string_pretty(&generate_schema()).unwrap_or_default()
}
