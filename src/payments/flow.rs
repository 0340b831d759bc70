// Two-phase payment creation: charge the card first, then commit the
// record, with a compensating refund if the commit fails. Replaces the
// naive charge-then-save sequence where a failed save silently kept the
// customer's money.

use std::future::Future;

use tracing::{debug, error};

use crate::database::manager::DatabaseError;
use crate::database::models::payment::Payment;
use crate::payments::gateway::{ChargeConfirmation, ChargeGateway, ChargeRequest, GatewayError};

/// Lifecycle of one payment creation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargePhase {
    Initiated,
    Charged,
    Recorded,
    /// Terminal failure state: money moved, no record exists, refund
    /// failed. Requires manual reconciliation against the processor.
    ChargedButUnrecorded,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentFlowError {
    #[error(transparent)]
    ChargeFailed(GatewayError),

    #[error("payment record failed after charge {intent_id}; charge was refunded: {source}")]
    RolledBack {
        intent_id: String,
        #[source]
        source: DatabaseError,
    },

    #[error("charge {intent_id} completed but was never recorded; needs reconciliation")]
    ChargedButUnrecorded { intent_id: String },
}

/// Run one payment creation through the state machine. `record` persists
/// the payment once the processor confirms the charge; it runs exactly
/// once and only in the `Charged` phase.
pub async fn execute<F, Fut>(
    gateway: &dyn ChargeGateway,
    request: ChargeRequest,
    record: F,
) -> Result<Payment, PaymentFlowError>
where
    F: FnOnce(ChargeConfirmation) -> Fut,
    Fut: Future<Output = Result<Payment, DatabaseError>>,
{
    let mut phase = ChargePhase::Initiated;
    debug!(?phase, amount = %request.amount, "payment flow started");

    let confirmation = gateway
        .charge(&request)
        .await
        .map_err(PaymentFlowError::ChargeFailed)?;
    let intent_id = confirmation.intent_id.clone();
    phase = ChargePhase::Charged;
    debug!(?phase, intent_id = %intent_id, "processor confirmed charge");

    match record(confirmation).await {
        Ok(payment) => {
            phase = ChargePhase::Recorded;
            debug!(?phase, payment_id = %payment.id, "payment recorded");
            Ok(payment)
        }
        Err(db_err) => match gateway.refund(&intent_id).await {
            Ok(()) => Err(PaymentFlowError::RolledBack {
                intent_id,
                source: db_err,
            }),
            Err(refund_err) => {
                phase = ChargePhase::ChargedButUnrecorded;
                error!(
                    ?phase,
                    intent_id = %intent_id,
                    record_error = %db_err,
                    refund_error = %refund_err,
                    "charge succeeded, record and refund both failed"
                );
                Err(PaymentFlowError::ChargedButUnrecorded { intent_id })
            }
        },
    }
}
