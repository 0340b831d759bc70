use axum::{extract::Path, Extension, Json};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::{can_access, Operation, PropertyScope, Resource};
use crate::database::models::expense::Expense;
use crate::database::models::maintenance::MaintenanceRequest;
use crate::database::models::message::Message;
use crate::database::models::payment::Payment;
use crate::database::models::property::{Property, PropertyStatus};
use crate::database::models::tenant::Tenant;
use crate::database::service::{self, NewProperty};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    pub address: String,
    pub image_url: Option<String>,
    pub status: Option<PropertyStatus>,
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    pub rent_amount: Option<Decimal>,
    pub security_deposit: Option<Decimal>,
}

/// A property with its nested record collections, each filtered down to
/// what the requesting actor may see.
#[derive(Debug, Serialize)]
pub struct PropertyDetail {
    #[serde(flatten)]
    pub property: Property,
    pub tenants: Vec<Tenant>,
    pub payments: Vec<Payment>,
    pub expenses: Vec<Expense>,
    pub messages: Vec<Message>,
    pub maintenance: Vec<MaintenanceRequest>,
}

/// GET /properties - properties visible to the actor.
pub async fn list(Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<Property>> {
    let properties = service::list_properties_for_actor(&auth.actor()).await?;
    Ok(ApiResponse::success(properties))
}

/// GET /properties/:id - one property plus sub-records.
pub async fn show(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<PropertyDetail> {
    let property = service::find_property(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;
    let scope = service::scope_for_property(&property).await?;

    let actor = auth.actor();
    can_access(Some(&actor), Operation::Read, Resource::Property(&scope)).require()?;

    // Sub-collections go through the same predicate: a tenant sees the
    // payment and message history but not the landlord's expense ledger,
    // and only their own occupancy record.
    let tenants = service::list_tenants_for_property(id)
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
        .collect();

    let payments = if can_access(Some(&actor), Operation::Read, Resource::Payment(&scope)).is_allow()
    {
        service::list_payments_for_property(id).await?
    } else {
        vec![]
    };
    let expenses = if can_access(Some(&actor), Operation::Read, Resource::Expense(&scope)).is_allow()
    {
        service::list_expenses_for_property(id).await?
    } else {
        vec![]
    };
    let messages = if can_access(Some(&actor), Operation::Read, Resource::Message(&scope)).is_allow()
    {
        service::list_messages_for_property(id).await?
    } else {
        vec![]
    };
    let maintenance =
        if can_access(Some(&actor), Operation::Read, Resource::Maintenance(&scope)).is_allow() {
            service::list_maintenance_for_property(id).await?
        } else {
            vec![]
        };

    Ok(ApiResponse::success(PropertyDetail {
        property,
        tenants,
        payments,
        expenses,
        messages,
        maintenance,
    }))
}

/// POST /properties - landlord-only; the new property is owned by the
/// caller no matter what the payload says.
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreatePropertyRequest>,
) -> ApiResult<Property> {
    if payload.address.trim().is_empty() {
        return Err(ApiError::validation_error("Address is required", None));
    }

    let scope = PropertyScope::new(auth.id);
    can_access(Some(&auth.actor()), Operation::Create, Resource::Property(&scope)).require()?;

    let property = service::insert_property(
        auth.id,
        NewProperty {
            address: payload.address,
            image_url: payload.image_url,
            status: payload.status.unwrap_or(PropertyStatus::Vacant),
            lease_start: payload.lease_start,
            lease_end: payload.lease_end,
            rent_amount: payload.rent_amount,
            security_deposit: payload.security_deposit,
        },
    )
    .await?;

    Ok(ApiResponse::created(property))
}
