use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_kind", rename_all = "snake_case")]
pub enum PaymentKind {
    Rent,
    #[serde(rename = "Security Deposit")]
    SecurityDeposit,
    #[serde(rename = "Late Fee")]
    LateFee,
}

/// A recorded charge against a property. Created only after the card
/// processor confirms the charge; the processor intent id and date never
/// change afterwards. Corrections are limited to sender, amount and kind.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub sender: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: PaymentKind,
    pub paid_on: DateTime<Utc>,
    pub processor_intent_id: String,
    pub property_id: Uuid,
}
