use log::*;
use pgw_common::PaymentStatus;
use processor_tools::{PaymentProcessor, ProcessorError};

/// Looks up the latest status of invoices whose locally stored status is not yet terminal.
///
/// The poller does not write anything itself. Callers persist the refreshed status where it has changed.
pub struct StatusPoller<P> {
    processor: P,
}

impl<P> StatusPoller<P>
where P: PaymentProcessor
{
    pub fn new(processor: P) -> Self {
        Self { processor }
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// Returns `Some(new_status)` if the processor reports a different status from `current`, and `None` if the
    /// status is unchanged or `current` is terminal (in which case the processor is not queried at all).
    pub async fn refresh(&self, invoice_id: &str, current: &PaymentStatus) -> Result<Option<PaymentStatus>, ProcessorError> {
        if current.is_terminal() {
            trace!("🔍️ Invoice {invoice_id} is {current}. Not polling.");
            return Ok(None);
        }
        let latest = self.processor.invoice_status(invoice_id).await?.status;
        if latest.is_empty() || &latest == current {
            trace!("🔍️ Invoice {invoice_id} is still {current}");
            return Ok(None);
        }
        debug!("🔍️ Invoice {invoice_id} has moved from {current} to {latest}");
        Ok(Some(latest))
    }
}
