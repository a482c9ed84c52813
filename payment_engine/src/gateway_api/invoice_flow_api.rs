use std::fmt::Debug;

use log::*;
use processor_tools::{InvoiceCreated, InvoiceStatus, NewInvoice, PaymentProcessor};

use crate::{db_types::NewTransaction, gateway_api::InvoiceFlowError, traits::TransactionStore};

/// `InvoiceFlowApi` issues invoices with the payment processor and keeps a local record of each one.
pub struct InvoiceFlowApi<B, P> {
    db: B,
    processor: P,
}

impl<B, P> Debug for InvoiceFlowApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InvoiceFlowApi")
    }
}

impl<B, P> InvoiceFlowApi<B, P> {
    pub fn new(db: B, processor: P) -> Self {
        Self { db, processor }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }
}

impl<B, P> InvoiceFlowApi<B, P>
where
    B: TransactionStore,
    P: PaymentProcessor,
{
    /// Creates a new invoice with the payment processor, then records it as a transaction.
    ///
    /// Invalid requests are rejected before the processor is contacted. Once the processor has issued the invoice, it
    /// is returned to the caller even if it cannot be recorded locally; the store failure is logged.
    pub async fn create_invoice(&self, invoice: NewInvoice) -> Result<InvoiceCreated, InvoiceFlowError> {
        validate_invoice(&invoice)?;
        let created = self.processor.create_invoice(invoice.clone()).await.map_err(|e| {
            warn!("🔄️🧾️ {} could not create invoice for order {}. {e}", self.processor.name(), invoice.order_id);
            e
        })?;
        let buyer_email = invoice.buyer_email().map(String::from);
        let transaction =
            NewTransaction::new(created.invoice_id.clone(), invoice.order_id.clone(), invoice.price_amount, invoice.price_currency)
                .with_status(created.status.clone())
                .with_buyer_email(buyer_email);
        match self.db.create_transaction(transaction).await {
            Ok(tx) => debug!("🔄️🧾️ Invoice {} for order {} recorded as transaction #{}", tx.invoice_id, tx.order_id, tx.id),
            Err(e) => error!(
                "🔄️🧾️ Invoice {} was created for order {}, but could not be recorded. {e}",
                created.invoice_id, invoice.order_id
            ),
        }
        Ok(created)
    }

    /// Fetches the current status of an invoice from the processor. An empty status means the processor does not know
    /// the invoice.
    pub async fn invoice_status(&self, invoice_id: &str) -> Result<InvoiceStatus, InvoiceFlowError> {
        let status = self.processor.invoice_status(invoice_id).await?;
        if status.status.is_empty() {
            debug!("🔄️🧾️ {} reported no status for invoice {invoice_id}", self.processor.name());
            return Err(InvoiceFlowError::NotFound(invoice_id.to_string()));
        }
        Ok(status)
    }
}

/// Checks an invoice request before anything is sent upstream.
pub fn validate_invoice(invoice: &NewInvoice) -> Result<(), InvoiceFlowError> {
    if !(invoice.price_amount.is_finite() && invoice.price_amount > 0.0) {
        return Err(InvoiceFlowError::ValidationError("price_amount must be greater than zero".into()));
    }
    if invoice.price_currency.trim().is_empty() {
        return Err(InvoiceFlowError::ValidationError("price_currency is required".into()));
    }
    if invoice.order_id.trim().is_empty() {
        return Err(InvoiceFlowError::ValidationError("order_id is required".into()));
    }
    Ok(())
}
