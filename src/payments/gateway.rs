// Card processor client. The Stripe PaymentIntents API is the production
// backend; the trait exists so the payment flow can be driven against a
// test double.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use std::sync::OnceLock;

use crate::config::{self, PaymentConfig};

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount: Decimal,
    pub currency: String,
    pub payment_method_id: String,
    pub description: String,
}

/// Processor confirmation of a completed charge.
#[derive(Debug, Clone)]
pub struct ChargeConfirmation {
    pub intent_id: String,
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("payment processor unreachable: {0}")]
    Transport(String),
    #[error("payment processor rejected the charge: {0}")]
    Declined(String),
    #[error("invalid charge amount: {0}")]
    InvalidAmount(String),
}

#[async_trait]
pub trait ChargeGateway: Send + Sync {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeConfirmation, GatewayError>;
    async fn refund(&self, intent_id: &str) -> Result<(), GatewayError>;
}

/// Convert a decimal amount to the processor's integer minor units
/// (e.g. $100.00 -> 10000 cents).
pub fn minor_units(amount: Decimal) -> Result<i64, GatewayError> {
    if amount <= Decimal::ZERO {
        return Err(GatewayError::InvalidAmount(format!(
            "amount must be positive, got {amount}"
        )));
    }

    (amount * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| GatewayError::InvalidAmount(format!("amount out of range: {amount}")))
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

pub struct StripeGateway {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.processor_base_url.trim_end_matches('/').to_string(),
            secret_key: config.processor_secret_key.clone(),
        }
    }

    async fn processor_error(response: reqwest::Response) -> GatewayError {
        let message = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|body| body.error.message)
            .unwrap_or_else(|| "unknown processor error".to_string());
        GatewayError::Declined(message)
    }
}

#[async_trait]
impl ChargeGateway for StripeGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeConfirmation, GatewayError> {
        let cents = minor_units(request.amount)?;

        // Redirect-based payment methods are disabled: confirmation must
        // resolve synchronously within this request.
        let params = [
            ("amount", cents.to_string()),
            ("currency", request.currency.clone()),
            ("payment_method", request.payment_method_id.clone()),
            ("confirm", "true".to_string()),
            ("description", request.description.clone()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
            ("automatic_payment_methods[allow_redirects]", "never".to_string()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::processor_error(response).await);
        }

        let intent: IntentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("malformed processor response: {e}")))?;

        Ok(ChargeConfirmation {
            intent_id: intent.id,
            status: intent.status,
        })
    }

    async fn refund(&self, intent_id: &str) -> Result<(), GatewayError> {
        let params = [("payment_intent", intent_id.to_string())];

        let response = self
            .client
            .post(format!("{}/v1/refunds", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::processor_error(response).await);
        }

        Ok(())
    }
}

static PROCESSOR: OnceLock<StripeGateway> = OnceLock::new();

/// Shared processor client, built from config on first use.
pub fn processor() -> &'static StripeGateway {
    PROCESSOR.get_or_init(|| StripeGateway::new(&config::config().payments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_units_converts_dollars_to_cents() {
        assert_eq!(minor_units(Decimal::new(10000, 2)).unwrap(), 10000); // $100.00
        assert_eq!(minor_units(Decimal::new(999, 2)).unwrap(), 999); // $9.99
        assert_eq!(minor_units(Decimal::from(1)).unwrap(), 100);
    }

    #[test]
    fn minor_units_rounds_sub_cent_amounts() {
        assert_eq!(minor_units(Decimal::new(10005, 3)).unwrap(), 1001); // $10.005
    }

    #[test]
    fn minor_units_rejects_zero_and_negative() {
        assert!(matches!(
            minor_units(Decimal::ZERO),
            Err(GatewayError::InvalidAmount(_))
        ));
        assert!(matches!(
            minor_units(Decimal::from(-5)),
            Err(GatewayError::InvalidAmount(_))
        ));
    }
}
