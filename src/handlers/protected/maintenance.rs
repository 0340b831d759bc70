use axum::{extract::Path, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access::{can_access, Operation, Resource};
use crate::database::models::maintenance::{MaintenanceRequest, MaintenanceStatus};
use crate::database::service;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaintenanceRequest {
    pub property_id: Uuid,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMaintenanceRequest {
    pub status: MaintenanceStatus,
}

/// GET /maintenance/property/:id - open and past requests for a property
/// (owning landlord only).
pub async fn by_property(
    Extension(auth): Extension<AuthUser>,
    Path(property_id): Path<Uuid>,
) -> ApiResult<Vec<MaintenanceRequest>> {
    let scope = service::scope_for_property_id(property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    can_access(Some(&auth.actor()), Operation::Read, Resource::Maintenance(&scope)).require()?;

    let requests = service::list_maintenance_for_property(property_id).await?;
    Ok(ApiResponse::success(requests))
}

/// POST /maintenance - submit a request. Submission is tenant-initiated.
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateMaintenanceRequest>,
) -> ApiResult<MaintenanceRequest> {
    if payload.description.trim().is_empty() {
        return Err(ApiError::validation_error("Description is required", None));
    }

    let scope = service::scope_for_property_id(payload.property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    can_access(Some(&auth.actor()), Operation::Create, Resource::Maintenance(&scope)).require()?;

    let request = service::insert_maintenance(payload.property_id, &payload.description).await?;
    Ok(ApiResponse::created(request))
}

/// PUT /maintenance/:id - move a request through its status lifecycle.
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMaintenanceRequest>,
) -> ApiResult<MaintenanceRequest> {
    let request = service::find_maintenance(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Maintenance request not found"))?;

    let scope = service::scope_for_property_id(request.property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    can_access(Some(&auth.actor()), Operation::Update, Resource::Maintenance(&scope)).require()?;

    let updated = service::update_maintenance_status(id, payload.status).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /maintenance/:id
pub async fn remove(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let request = service::find_maintenance(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Maintenance request not found"))?;

    let scope = service::scope_for_property_id(request.property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    can_access(Some(&auth.actor()), Operation::Delete, Resource::Maintenance(&scope)).require()?;

    service::delete_maintenance(id).await?;
    Ok(ApiResponse::success(json!({ "message": "Maintenance request removed successfully" })))
}
