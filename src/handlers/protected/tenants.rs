use axum::{extract::Path, Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access::{can_access, Operation, Resource};
use crate::database::models::tenant::Tenant;
use crate::database::service::{self, NewTenant};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "property")]
    pub property_id: Uuid,
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    /// Authentication account this occupancy belongs to, if the person
    /// has one.
    pub user_id: Option<Uuid>,
}

/// GET /tenants - occupancy records visible to the actor.
pub async fn list(Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<Tenant>> {
    let tenants = service::list_tenants_for_actor(&auth.actor()).await?;
    Ok(ApiResponse::success(tenants))
}

/// GET /tenants/property/:id - tenants of one property, filtered per
/// record.
pub async fn by_property(
    Extension(auth): Extension<AuthUser>,
    Path(property_id): Path<Uuid>,
) -> ApiResult<Vec<Tenant>> {
    let scope = service::scope_for_property_id(property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    let actor = auth.actor();
    let tenants = service::list_tenants_for_property(property_id)
        .await?
        .into_iter()
        .filter(|t| {
            can_access(
                Some(&actor),
                Operation::Read,
                Resource::TenantRecord { scope: &scope, linked_user: t.user_id },
            )
            .is_allow()
        })
        .collect::<Vec<_>>();

    Ok(ApiResponse::success(tenants))
}

/// POST /tenants - assign a tenant to a property (owning landlord only).
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateTenantRequest>,
) -> ApiResult<Tenant> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation_error("Tenant name is required", None));
    }

    let scope = service::scope_for_property_id(payload.property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    can_access(
        Some(&auth.actor()),
        Operation::Create,
        Resource::TenantRecord { scope: &scope, linked_user: payload.user_id },
    )
    .require()?;

    let tenant = service::insert_tenant(NewTenant {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        lease_start: payload.lease_start,
        lease_end: payload.lease_end,
        property_id: payload.property_id,
        user_id: payload.user_id,
    })
    .await?;

    Ok(ApiResponse::created(tenant))
}

/// DELETE /tenants/:id - remove an occupancy record (owning landlord only).
pub async fn remove(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let tenant = service::find_tenant(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tenant not found"))?;

    let scope = service::scope_for_property_id(tenant.property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    can_access(
        Some(&auth.actor()),
        Operation::Delete,
        Resource::TenantRecord { scope: &scope, linked_user: tenant.user_id },
    )
    .require()?;

    service::delete_tenant(id).await?;
    Ok(ApiResponse::success(json!({ "message": "Tenant removed successfully" })))
}
