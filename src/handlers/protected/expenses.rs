use axum::{extract::Path, Extension, Json};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access::{can_access, Operation, Resource};
use crate::database::models::expense::Expense;
use crate::database::service::{self, NewExpense};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub property_id: Uuid,
    pub description: String,
    pub cost: Decimal,
    #[serde(alias = "date")]
    pub incurred_on: Option<NaiveDate>,
}

/// GET /expenses/property/:id - expense ledger for a property.
pub async fn by_property(
    Extension(auth): Extension<AuthUser>,
    Path(property_id): Path<Uuid>,
) -> ApiResult<Vec<Expense>> {
    let scope = service::scope_for_property_id(property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    can_access(Some(&auth.actor()), Operation::Read, Resource::Expense(&scope)).require()?;

    let expenses = service::list_expenses_for_property(property_id).await?;
    Ok(ApiResponse::success(expenses))
}

/// POST /expenses - record a cost against a property.
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateExpenseRequest>,
) -> ApiResult<Expense> {
    if payload.description.trim().is_empty() {
        return Err(ApiError::validation_error("Description is required", None));
    }
    if payload.cost <= Decimal::ZERO {
        return Err(ApiError::validation_error("Cost must be positive", None));
    }

    let scope = service::scope_for_property_id(payload.property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    can_access(Some(&auth.actor()), Operation::Create, Resource::Expense(&scope)).require()?;

    let expense = service::insert_expense(NewExpense {
        property_id: payload.property_id,
        description: payload.description,
        cost: payload.cost,
        incurred_on: payload.incurred_on,
    })
    .await?;

    Ok(ApiResponse::created(expense))
}

/// DELETE /expenses/:id
pub async fn remove(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let expense = service::find_expense(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Expense not found"))?;

    let scope = service::scope_for_property_id(expense.property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    can_access(Some(&auth.actor()), Operation::Delete, Resource::Expense(&scope)).require()?;

    service::delete_expense(id).await?;
    Ok(ApiResponse::success(json!({ "message": "Expense removed successfully" })))
}
