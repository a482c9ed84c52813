use crate::{
    data_objects::{InvoiceCreated, InvoiceStatus, NewInvoice},
    ProcessorError,
};

/// The behaviour the payment gateway needs from a payment processor.
///
/// Implementations are stateless wrappers around the processor's HTTP API. `invoice_status` is safe to retry.
/// `create_invoice` is NOT: a retry after a timeout may issue a second invoice upstream.
#[allow(async_fn_in_trait)]
pub trait PaymentProcessor {
    /// A short, human-readable name for the processor, used in logs.
    fn name(&self) -> &'static str;

    /// Issues a new invoice with the processor.
    async fn create_invoice(&self, invoice: NewInvoice) -> Result<InvoiceCreated, ProcessorError>;

    /// Fetches the latest status of the given invoice.
    async fn invoice_status(&self, invoice_id: &str) -> Result<InvoiceStatus, ProcessorError>;

    /// The url of the processor-hosted checkout page for the given invoice.
    fn checkout_url(&self, invoice_id: &str) -> String;
}
