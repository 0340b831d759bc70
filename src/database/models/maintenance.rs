use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "maintenance_status", rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

/// Tenant-submitted maintenance request, managed by the owning landlord.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    pub id: Uuid,
    pub description: String,
    pub status: MaintenanceStatus,
    pub opened_on: DateTime<Utc>,
    pub property_id: Uuid,
}
