use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind-specific field snapshot. Opaque to the queue apart from being a JSON object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Value", into = "Value")]
pub struct MutationPayload(Map<String, Value>);

impl MutationPayload {
    pub fn new(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err("Mutation payload cannot be null".to_string()),
            other => Err(format!(
                "Mutation payload must be a JSON object, got {}",
                json_type_name(&other)
            )),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| format!("Invalid JSON payload: {e}"))?;
        Self::new(value)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Request body for the remote call: the payload with `id` set (overriding any stale one).
    pub fn with_id(&self, id: &str) -> Value {
        let mut body = self.0.clone();
        body.insert("id".to_string(), Value::String(id.to_string()));
        Value::Object(body)
    }

    pub fn into_inner(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<MutationPayload> for Value {
    fn from(payload: MutationPayload) -> Self {
        payload.into_inner()
    }
}

impl TryFrom<Value> for MutationPayload {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_objects() {
        assert!(MutationPayload::new(json!([1, 2])).is_err());
        assert!(MutationPayload::new(Value::Null).is_err());
        assert!(MutationPayload::from_json_str("42").is_err());
    }

    #[test]
    fn with_id_overrides_embedded_id() {
        let payload = MutationPayload::new(json!({"id": "stale", "total": 500000})).unwrap();
        assert_eq!(payload.with_id("A1"), json!({"id": "A1", "total": 500000}));
    }
}
