use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Form {
    pub id: i64,
    pub name: String,
    /// JSON-encoded array of [`FormElement`]s, stored as the builder sent it.
    pub elements: String,
    pub created_at: DateTime<Utc>,
}

impl Form {
    pub fn decode_elements(&self) -> Result<Vec<FormElement>, serde_json::Error> {
        FormElement::decode_list(&self.elements)
    }
}

/// One input of a form as laid out by the builder. Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: String,
}

impl FormElement {
    pub fn decode_list(raw: &str) -> Result<Vec<FormElement>, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
