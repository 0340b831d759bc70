use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "property_status", rename_all = "snake_case")]
pub enum PropertyStatus {
    Vacant,
    // "Currently Renting" survives in older client payloads as a synonym
    // for Occupied.
    #[serde(alias = "Currently Renting")]
    Occupied,
    #[serde(rename = "Under Maintenance")]
    UnderMaintenance,
    #[serde(rename = "Upcoming Lease")]
    UpcomingLease,
}

/// A rental unit. Owned by exactly one landlord; the owner is set at
/// creation and is never optional.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub address: String,
    pub image_url: Option<String>,
    pub status: PropertyStatus,
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    pub rent_amount: Option<Decimal>,
    pub security_deposit: Option<Decimal>,
    pub overdue_rent: Decimal,
    pub landlord_id: Uuid,
    pub created_at: DateTime<Utc>,
}
