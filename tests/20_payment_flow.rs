// The two-phase payment flow driven against a scriptable processor
// double, including how each terminal state surfaces at the HTTP
// boundary.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use rentfolio_api::access::DenyReason;
use rentfolio_api::database::manager::DatabaseError;
use rentfolio_api::database::models::payment::{Payment, PaymentKind};
use rentfolio_api::error::ApiError;
use rentfolio_api::payments::flow::{self, PaymentFlowError};
use rentfolio_api::payments::gateway::{
    ChargeConfirmation, ChargeGateway, ChargeRequest, GatewayError,
};

struct ScriptedGateway {
    charge_result: Result<(), String>,
    refund_ok: bool,
    refunds: AtomicUsize,
}

impl ScriptedGateway {
    fn succeeding() -> Self {
        Self { charge_result: Ok(()), refund_ok: true, refunds: AtomicUsize::new(0) }
    }

    fn declining(message: &str) -> Self {
        Self {
            charge_result: Err(message.to_string()),
            refund_ok: true,
            refunds: AtomicUsize::new(0),
        }
    }

    fn with_broken_refunds() -> Self {
        Self { charge_result: Ok(()), refund_ok: false, refunds: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl ChargeGateway for ScriptedGateway {
    async fn charge(&self, _request: &ChargeRequest) -> Result<ChargeConfirmation, GatewayError> {
        match &self.charge_result {
            Ok(()) => Ok(ChargeConfirmation {
                intent_id: "pi_scripted".to_string(),
                status: "succeeded".to_string(),
            }),
            Err(message) => Err(GatewayError::Declined(message.clone())),
        }
    }

    async fn refund(&self, _intent_id: &str) -> Result<(), GatewayError> {
        self.refunds.fetch_add(1, Ordering::SeqCst);
        if self.refund_ok {
            Ok(())
        } else {
            Err(GatewayError::Transport("timed out".to_string()))
        }
    }
}

fn charge_request() -> ChargeRequest {
    ChargeRequest {
        amount: Decimal::new(95000, 2),
        currency: "usd".to_string(),
        payment_method_id: "pm_card_visa".to_string(),
        description: "Rent payment for 44 Oak Ave by Sam Renter".to_string(),
    }
}

fn recorded_payment(intent_id: &str) -> Payment {
    Payment {
        id: Uuid::new_v4(),
        sender: "Sam Renter".to_string(),
        amount: Decimal::new(95000, 2),
        kind: PaymentKind::Rent,
        paid_on: Utc::now(),
        processor_intent_id: intent_id.to_string(),
        property_id: Uuid::new_v4(),
    }
}

#[tokio::test]
async fn happy_path_records_the_confirmed_charge() {
    let gateway = ScriptedGateway::succeeding();

    let payment = flow::execute(&gateway, charge_request(), |confirmation| async move {
        Ok(recorded_payment(&confirmation.intent_id))
    })
    .await
    .unwrap();

    assert_eq!(payment.processor_intent_id, "pi_scripted");
    assert_eq!(gateway.refunds.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn declined_charge_surfaces_the_processor_message_as_bad_gateway() {
    let gateway = ScriptedGateway::declining("insufficient funds");

    let err = flow::execute(&gateway, charge_request(), |confirmation| async move {
        Ok(recorded_payment(&confirmation.intent_id))
    })
    .await
    .unwrap_err();

    let api_error = ApiError::from(err);
    assert_eq!(api_error.status_code(), 502);
    assert!(api_error.message().contains("insufficient funds"));
    assert_eq!(gateway.refunds.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn record_failure_refunds_and_maps_to_server_error() {
    let gateway = ScriptedGateway::succeeding();

    let err = flow::execute(&gateway, charge_request(), |_| async move {
        Err(DatabaseError::NotFound("property vanished".to_string()))
    })
    .await
    .unwrap_err();

    assert!(matches!(err, PaymentFlowError::RolledBack { .. }));
    assert_eq!(gateway.refunds.load(Ordering::SeqCst), 1);

    let api_error = ApiError::from(err);
    assert_eq!(api_error.status_code(), 500);
    assert!(api_error.message().contains("refunded"));
}

#[tokio::test]
async fn unrefundable_charge_is_flagged_for_reconciliation() {
    let gateway = ScriptedGateway::with_broken_refunds();

    let err = flow::execute(&gateway, charge_request(), |_| async move {
        Err(DatabaseError::NotFound("property vanished".to_string()))
    })
    .await
    .unwrap_err();

    match &err {
        PaymentFlowError::ChargedButUnrecorded { intent_id } => {
            assert_eq!(intent_id, "pi_scripted");
        }
        other => panic!("expected ChargedButUnrecorded, got {other:?}"),
    }

    let api_error = ApiError::from(err);
    assert_eq!(api_error.status_code(), 500);
}

// Authorization outcomes map onto the documented status codes: missing
// credential is 401, every ownership or role refusal is 403.
#[test]
fn deny_reasons_map_to_the_documented_status_codes() {
    assert_eq!(ApiError::from(DenyReason::Unauthenticated).status_code(), 401);
    for reason in [DenyReason::WrongRole, DenyReason::NotOwner, DenyReason::NotAssociated] {
        assert_eq!(ApiError::from(reason).status_code(), 403);
    }
}
