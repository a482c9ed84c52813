use processor_tools::ProcessorError;
use thiserror::Error;

use crate::traits::StoreError;

#[derive(Debug, Clone, Error)]
pub enum InvoiceFlowError {
    #[error("Invalid invoice request: {0}")]
    ValidationError(String),
    #[error("Invoice not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    ProcessorError(#[from] ProcessorError),
    #[error("{0}")]
    StoreError(#[from] StoreError),
}

#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("Could not refresh invoice from the payment processor. {0}")]
    ProcessorError(#[from] ProcessorError),
    #[error("Could not apply webhook notification. {0}")]
    StoreError(#[from] StoreError),
}

#[derive(Debug, Clone, Error)]
pub enum UserPaymentsError {
    #[error("Unknown invoice ID")]
    UnknownInvoice(String),
    #[error("Payment not found")]
    PaymentNotFound,
    #[error("{0}")]
    ProcessorError(#[from] ProcessorError),
    #[error("{0}")]
    StoreError(#[from] StoreError),
}
