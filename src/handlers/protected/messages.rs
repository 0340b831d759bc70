use axum::{extract::Path, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access::{can_access, Operation, Resource};
use crate::database::models::message::Message;
use crate::database::service;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub property_id: Uuid,
    #[serde(rename = "message")]
    pub body: String,
}

/// GET /messages/property/:id - message thread for a property.
pub async fn by_property(
    Extension(auth): Extension<AuthUser>,
    Path(property_id): Path<Uuid>,
) -> ApiResult<Vec<Message>> {
    let scope = service::scope_for_property_id(property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    can_access(Some(&auth.actor()), Operation::Read, Resource::Message(&scope)).require()?;

    let messages = service::list_messages_for_property(property_id).await?;
    Ok(ApiResponse::success(messages))
}

/// POST /messages - post to a property's thread. The sender is always the
/// authenticated actor, not a payload field.
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateMessageRequest>,
) -> ApiResult<Message> {
    if payload.body.trim().is_empty() {
        return Err(ApiError::validation_error("Message text is required", None));
    }

    let scope = service::scope_for_property_id(payload.property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    can_access(Some(&auth.actor()), Operation::Create, Resource::Message(&scope)).require()?;

    let message = service::insert_message(payload.property_id, &auth.email, &payload.body).await?;
    Ok(ApiResponse::created(message))
}

/// DELETE /messages/:id - landlord-only removal.
pub async fn remove(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let message = service::find_message(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Message not found"))?;

    let scope = service::scope_for_property_id(message.property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    can_access(Some(&auth.actor()), Operation::Delete, Resource::Message(&scope)).require()?;

    service::delete_message(id).await?;
    Ok(ApiResponse::success(json!({ "message": "Message removed successfully" })))
}
