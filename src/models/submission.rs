use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub form_id: i64,
    /// Field key to answer. Uploaded files appear as public URLs.
    pub answers: serde_json::Value,
    /// Names of the files this submission stored, in the upload directory.
    pub uploads: Vec<String>,
    pub created_at: DateTime<Utc>,
}
