use serde_json::{Map, Value};

/// Collects ordered `(name, value)` form fields into a JSON object.
///
/// A name seen twice keeps the last value but its first position.
pub fn form_object<I, K, V>(fields: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut data = Map::new();
    for (name, value) in fields {
        data.insert(name.into(), Value::String(value.into()));
    }
    data
}

/// Serializes form fields to the JSON text submitted to the API.
pub fn serialize_form<I, K, V>(fields: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    Value::Object(form_object(fields)).to_string()
}
