use axum::{extract::Path, Extension, Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access::{can_access, Operation, Resource};
use crate::config;
use crate::database::models::payment::{Payment, PaymentKind};
use crate::database::service::{self, NewPayment};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::payments::flow;
use crate::payments::gateway::{self, ChargeRequest};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub property_id: Uuid,
    pub sender: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: PaymentKind,
    /// Tokenized card reference produced by the processor's browser SDK.
    pub payment_method_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    pub sender: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: PaymentKind,
}

/// GET /payments/property/:id - payment history for a property.
pub async fn by_property(
    Extension(auth): Extension<AuthUser>,
    Path(property_id): Path<Uuid>,
) -> ApiResult<Vec<Payment>> {
    let scope = service::scope_for_property_id(property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    can_access(Some(&auth.actor()), Operation::Read, Resource::Payment(&scope)).require()?;

    let payments = service::list_payments_for_property(property_id).await?;
    Ok(ApiResponse::success(payments))
}

/// POST /payments - charge the card, then record the payment. The charge
/// and the record commit run as a two-phase flow with a compensating
/// refund; see `payments::flow`.
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreatePaymentRequest>,
) -> ApiResult<Payment> {
    if payload.amount <= Decimal::ZERO {
        return Err(ApiError::validation_error("Amount must be positive", None));
    }
    if payload.payment_method_id.trim().is_empty() {
        return Err(ApiError::validation_error("A valid paymentMethodId is required", None));
    }
    if payload.sender.trim().is_empty() {
        return Err(ApiError::validation_error("Sender is required", None));
    }

    let property = service::find_property(payload.property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;
    let scope = service::scope_for_property(&property).await?;

    can_access(Some(&auth.actor()), Operation::Create, Resource::Payment(&scope)).require()?;

    let charge = ChargeRequest {
        amount: payload.amount,
        currency: config::config().payments.currency.clone(),
        payment_method_id: payload.payment_method_id,
        description: format!("Rent payment for {} by {}", property.address, payload.sender),
    };

    let property_id = payload.property_id;
    let sender = payload.sender;
    let amount = payload.amount;
    let kind = payload.kind;

    let payment = flow::execute(gateway::processor(), charge, |confirmation| async move {
        service::insert_payment(NewPayment {
            property_id,
            sender,
            amount,
            kind,
            processor_intent_id: confirmation.intent_id,
        })
        .await
    })
    .await?;

    Ok(ApiResponse::created(payment))
}

/// PUT /payments/:id - correct a recorded payment. No re-charge happens
/// here; the processor intent id and date are untouched.
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> ApiResult<Payment> {
    if payload.amount <= Decimal::ZERO {
        return Err(ApiError::validation_error("Amount must be positive", None));
    }

    let payment = service::find_payment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Payment not found"))?;

    let scope = service::scope_for_property_id(payment.property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    can_access(Some(&auth.actor()), Operation::Update, Resource::Payment(&scope)).require()?;

    let updated = service::update_payment(id, &payload.sender, payload.amount, payload.kind).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /payments/:id - drop a payment record. Deliberately does not
/// refund through the processor.
pub async fn remove(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let payment = service::find_payment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Payment not found"))?;

    let scope = service::scope_for_property_id(payment.property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    can_access(Some(&auth.actor()), Operation::Delete, Resource::Payment(&scope)).require()?;

    service::delete_payment(id).await?;
    Ok(ApiResponse::success(json!({ "message": "Payment removed successfully" })))
}
