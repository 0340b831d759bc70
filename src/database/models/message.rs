use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Message posted against a property by either party.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender: String,
    #[serde(rename = "message")]
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub property_id: Uuid,
}
