use std::fmt::Debug;

use log::*;
use pgw_common::PaymentStatus;
use processor_tools::PaymentProcessor;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{NewUserPayment, UserPayment},
    gateway_api::{InvoiceCatalog, StatusPoller, UserPaymentsError},
    traits::UserPaymentStore,
};

/// The latest known state of a user's payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCheck {
    pub status: PaymentStatus,
    pub amount: f64,
    pub currency: String,
}

/// Assigns invoices from a fixed catalog to users, and reports on their payment status.
pub struct UserPaymentsApi<B, P> {
    db: B,
    poller: StatusPoller<P>,
    catalog: InvoiceCatalog,
}

impl<B, P> Debug for UserPaymentsApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserPaymentsApi ({} catalog entries)", self.catalog.len())
    }
}

impl<B, P> UserPaymentsApi<B, P>
where
    B: UserPaymentStore,
    P: PaymentProcessor,
{
    pub fn new(db: B, processor: P, catalog: InvoiceCatalog) -> Self {
        Self { db, poller: StatusPoller::new(processor), catalog }
    }

    pub fn catalog(&self) -> &InvoiceCatalog {
        &self.catalog
    }

    /// Assigns the catalog invoice to the user and returns the url of its checkout page.
    pub async fn assign_invoice(&self, user_id: &str, invoice_id: &str) -> Result<String, UserPaymentsError> {
        let entry = self.catalog.get(invoice_id).ok_or_else(|| {
            debug!("💳️ User {user_id} asked for unknown invoice {invoice_id}");
            UserPaymentsError::UnknownInvoice(invoice_id.to_string())
        })?;
        let payment = NewUserPayment {
            user_id: user_id.to_string(),
            invoice_id: invoice_id.to_string(),
            amount: entry.amount,
            currency: entry.currency.clone(),
        };
        let payment = self.db.insert_user_payment(payment).await?;
        info!("💳️ Invoice {invoice_id} ({} {}) assigned to user {user_id}", payment.amount, payment.currency);
        Ok(self.poller.processor().checkout_url(invoice_id))
    }

    /// Reports the status of the user's payment, refreshing it from the processor if it is not yet terminal.
    ///
    /// A processor failure is an error here. A failure to save the refreshed status is only logged.
    pub async fn check_payment(&self, user_id: &str, invoice_id: &str) -> Result<PaymentCheck, UserPaymentsError> {
        let payment =
            self.db.fetch_user_payment(user_id, invoice_id).await?.ok_or(UserPaymentsError::PaymentNotFound)?;
        let mut status = payment.status;
        if let Some(latest) = self.poller.refresh(invoice_id, &status).await? {
            if let Err(e) = self.db.update_user_payment_status(user_id, invoice_id, &latest).await {
                error!("💳️ Could not save new status {latest} for invoice {invoice_id} of user {user_id}. {e}");
            }
            status = latest;
        }
        Ok(PaymentCheck { status, amount: payment.amount, currency: payment.currency })
    }

    /// Lists the user's payments, most recent first. Non-terminal statuses are refreshed from the processor on the
    /// way out; any that cannot be refreshed are reported with their stored status.
    pub async fn user_payments(&self, user_id: &str) -> Result<Vec<UserPayment>, UserPaymentsError> {
        let mut payments = self.db.fetch_payments_for_user(user_id).await?;
        for payment in payments.iter_mut() {
            match self.poller.refresh(&payment.invoice_id, &payment.status).await {
                Ok(Some(latest)) => {
                    if let Err(e) = self.db.update_user_payment_status(user_id, &payment.invoice_id, &latest).await {
                        error!("💳️ Could not save new status {latest} for invoice {}. {e}", payment.invoice_id);
                    }
                    payment.status = latest;
                },
                Ok(None) => {},
                Err(e) => warn!("💳️ Could not refresh status of invoice {}. {e}", payment.invoice_id),
            }
        }
        Ok(payments)
    }
}
