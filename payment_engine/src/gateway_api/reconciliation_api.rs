//! Applies processor webhook notifications to the stored records.
//!
//! Notifications may be redelivered, so every update here is safe to apply more than once. Transitions are not
//! checked against a state machine: a stale redelivery can move a transaction back to an earlier status.
use std::fmt::Debug;

use log::*;
use pgw_common::PaymentStatus;
use processor_tools::{BtcPayWebhookEvent, NowPaymentsIpn, PaymentProcessor};

use crate::{
    gateway_api::ReconciliationError,
    traits::{PaymentGatewayDatabase, StoreError},
};

#[derive(Debug, Clone, PartialEq)]
pub enum ReconciliationOutcome {
    /// The notification does not call for any change.
    Ignored,
    StatusUpdated(PaymentStatus),
    PaymentRecorded { amount_paid: f64, currency: String },
}

/// What a BTCPay webhook event type asks the gateway to do.
#[derive(Debug, Clone, PartialEq)]
pub enum BtcPayAction {
    Nothing,
    /// Refresh the amount received from the processor
    RecordPayment,
    SetStatus(PaymentStatus),
    /// The event type is not one the gateway handles
    Unknown,
}

impl BtcPayAction {
    pub fn for_event_type(event_type: &str) -> Self {
        match event_type {
            "InvoiceCreated" => Self::Nothing,
            "InvoiceReceivedPayment" => Self::RecordPayment,
            "InvoiceProcessing" => Self::SetStatus(PaymentStatus::Processing),
            "InvoiceSettled" | "InvoiceCompleted" => Self::SetStatus(PaymentStatus::Completed),
            "InvoiceExpired" | "InvoiceInvalid" => {
                let status = event_type.trim_start_matches("Invoice").to_lowercase();
                Self::SetStatus(PaymentStatus::from(status))
            },
            _ => Self::Unknown,
        }
    }
}

pub struct ReconciliationApi<B, P> {
    db: B,
    processor: P,
}

impl<B, P> Debug for ReconciliationApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<B, P> ReconciliationApi<B, P>
where
    B: PaymentGatewayDatabase,
    P: PaymentProcessor,
{
    pub fn new(db: B, processor: P) -> Self {
        Self { db, processor }
    }

    /// Handles a BTCPay Server webhook. The event type determines the change. Unknown event types are logged and
    /// ignored.
    pub async fn process_btcpay_event(
        &self,
        event: &BtcPayWebhookEvent,
    ) -> Result<ReconciliationOutcome, ReconciliationError> {
        let invoice_id = event.invoice_id.as_str();
        info!("🪝️ Received {} event for invoice {invoice_id} (delivery {})", event.event_type, event.delivery_id);
        if event.is_redelivery {
            debug!("🪝️ Delivery {} is a redelivery of {:?}", event.delivery_id, event.original_delivery_id);
        }
        match BtcPayAction::for_event_type(&event.event_type) {
            BtcPayAction::Nothing => Ok(ReconciliationOutcome::Ignored),
            BtcPayAction::RecordPayment => {
                let status = self.processor.invoice_status(invoice_id).await?;
                self.db.update_payment_info(invoice_id, status.amount_paid, &status.currency).await?;
                info!("🪝️ Recorded payment of {} {} for invoice {invoice_id}", status.amount_paid, status.currency);
                Ok(ReconciliationOutcome::PaymentRecorded { amount_paid: status.amount_paid, currency: status.currency })
            },
            BtcPayAction::SetStatus(status) => {
                let tx = self.db.update_status(invoice_id, &status).await?;
                info!("🪝️ Invoice {invoice_id} is now {}", tx.status);
                Ok(ReconciliationOutcome::StatusUpdated(status))
            },
            BtcPayAction::Unknown => {
                warn!("🪝️ Ignoring unknown webhook event type '{}' for invoice {invoice_id}", event.event_type);
                Ok(ReconciliationOutcome::Ignored)
            },
        }
    }

    /// Handles a NowPayments IPN. Only `finished` notifications change anything: every user payment for the invoice,
    /// and the matching transaction if there is one, are marked as finished.
    pub async fn process_nowpayments_ipn(&self, ipn: &NowPaymentsIpn) -> Result<ReconciliationOutcome, ReconciliationError> {
        let invoice_id = ipn.invoice_id.as_str();
        let status = PaymentStatus::from(ipn.payment_status.as_str());
        info!("🪝️ Received IPN for invoice {invoice_id} with status {status}");
        if status != PaymentStatus::Finished {
            debug!("🪝️ Ignoring IPN for invoice {invoice_id}. Status {status} is not actionable.");
            return Ok(ReconciliationOutcome::Ignored);
        }
        let updated = self.db.update_status_for_invoice(invoice_id, &status).await?;
        debug!("🪝️ {updated} user payments for invoice {invoice_id} marked as {status}");
        match self.db.update_status(invoice_id, &status).await {
            Ok(_) => debug!("🪝️ Transaction for invoice {invoice_id} marked as {status}"),
            Err(StoreError::NotFound(_)) => trace!("🪝️ No transaction is recorded for invoice {invoice_id}"),
            Err(e) => return Err(e.into()),
        }
        if ipn.actual_amount > 0.0 {
            match self.db.update_payment_info(invoice_id, ipn.actual_amount, &ipn.actual_currency).await {
                Ok(_) | Err(StoreError::NotFound(_)) => {},
                Err(e) => return Err(e.into()),
            }
        }
        info!("🪝️ Invoice {invoice_id} marked as {status}");
        Ok(ReconciliationOutcome::StatusUpdated(status))
    }
}
