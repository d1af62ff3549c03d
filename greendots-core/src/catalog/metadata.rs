use serde_json::{Map, Number, Value};
use std::path::Path;

/// Decode a `metadata.toml` into JSON. Missing or undecodable files are `None`.
pub async fn load_metadata(path: &Path) -> Option<Value> {
    let raw = tokio::fs::read_to_string(path).await.ok()?;

    match toml::from_str::<toml::Table>(&raw) {
        Ok(table) => Some(toml_to_json(toml::Value::Table(table))),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "ignoring undecodable metadata");
            None
        }
    }
}

/// TOML datetimes become RFC 3339 strings; non-finite floats become `null`.
pub fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect::<Map<String, Value>>(),
        ),
    }
}
