use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::Booking;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentDetails {
    pub method: Option<String>,
    pub reference: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub error_code: Option<String>,
}

/// Charges the client for a booking. A declined charge is an ordinary
/// outcome with `success: false`; `Err` means the gateway itself failed.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn process_payment(
        &self,
        booking: &Booking,
        details: &PaymentDetails,
    ) -> anyhow::Result<PaymentOutcome>;
}

/// Gateway stand-in that approves every charge and issues a synthetic
/// transaction id.
pub struct SimulatedGateway;

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn process_payment(
        &self,
        booking: &Booking,
        _details: &PaymentDetails,
    ) -> anyhow::Result<PaymentOutcome> {
        let suffix = Uuid::new_v4().simple().to_string();
        let transaction_id = format!("TXN_{}_{}", Utc::now().timestamp_millis(), &suffix[..8]);

        tracing::info!(
            booking_id = %booking.id,
            transaction_id = %transaction_id,
            amount = %booking.gross_amount,
            "payment approved"
        );

        Ok(PaymentOutcome {
            success: true,
            transaction_id: Some(transaction_id),
            error_code: None,
        })
    }
}
