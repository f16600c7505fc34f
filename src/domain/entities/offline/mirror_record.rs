use crate::domain::value_objects::offline::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Server-authoritative snapshot cached for offline display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MirrorRecord {
    pub id: EntityId,
    pub fields: Map<String, Value>,
    pub is_from_server: bool,
    pub updated_at: i64,
}

/// A record as fetched from the server, before it is stamped and stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MirrorRecordDraft {
    pub id: EntityId,
    pub fields: Map<String, Value>,
}

impl MirrorRecordDraft {
    pub fn new(id: EntityId, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    /// Splits a server object into id and the remaining fields.
    pub fn from_server_value(value: Value) -> Result<Self, String> {
        let Value::Object(mut fields) = value else {
            return Err("Mirror record must be a JSON object".to_string());
        };
        let id = match fields.remove("id") {
            Some(Value::String(id)) => id,
            Some(Value::Number(id)) => id.to_string(),
            _ => return Err("Mirror record is missing a string or numeric id".to_string()),
        };
        Ok(Self::new(EntityId::new(id)?, fields))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MirrorReplaceReport {
    pub stored: usize,
    pub dropped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_value_id_is_split_out() {
        let draft =
            MirrorRecordDraft::from_server_value(json!({"id": 7, "destination": "Bogor"}))
                .unwrap();
        assert_eq!(draft.id.as_str(), "7");
        assert_eq!(draft.fields.get("destination"), Some(&json!("Bogor")));
        assert!(!draft.fields.contains_key("id"));
    }

    #[test]
    fn server_value_without_id_is_rejected() {
        assert!(MirrorRecordDraft::from_server_value(json!({"destination": "Bogor"})).is_err());
        assert!(MirrorRecordDraft::from_server_value(json!("A1")).is_err());
    }
}
