use crate::{
    config::{BtcPayConfig, NowPaymentsConfig, ProcessorKind},
    data_objects::{InvoiceCreated, InvoiceStatus, NewInvoice},
    BtcPayApi,
    NowPaymentsApi,
    PaymentProcessor,
    ProcessorError,
};

/// The payment processor selected at startup. Delegates every call to the wrapped client.
#[derive(Clone)]
pub enum ProcessorClient {
    BtcPay(BtcPayApi),
    NowPayments(NowPaymentsApi),
}

impl ProcessorClient {
    pub fn new(kind: ProcessorKind, btcpay: BtcPayConfig, nowpayments: NowPaymentsConfig) -> Result<Self, ProcessorError> {
        match kind {
            ProcessorKind::BtcPay => Ok(Self::BtcPay(BtcPayApi::new(btcpay)?)),
            ProcessorKind::NowPayments => Ok(Self::NowPayments(NowPaymentsApi::new(nowpayments)?)),
        }
    }

    pub fn kind(&self) -> ProcessorKind {
        match self {
            Self::BtcPay(_) => ProcessorKind::BtcPay,
            Self::NowPayments(_) => ProcessorKind::NowPayments,
        }
    }
}

impl PaymentProcessor for ProcessorClient {
    fn name(&self) -> &'static str {
        match self {
            Self::BtcPay(api) => api.name(),
            Self::NowPayments(api) => api.name(),
        }
    }

    async fn create_invoice(&self, invoice: NewInvoice) -> Result<InvoiceCreated, ProcessorError> {
        match self {
            Self::BtcPay(api) => api.create_invoice(invoice).await,
            Self::NowPayments(api) => api.create_invoice(invoice).await,
        }
    }

    async fn invoice_status(&self, invoice_id: &str) -> Result<InvoiceStatus, ProcessorError> {
        match self {
            Self::BtcPay(api) => api.invoice_status(invoice_id).await,
            Self::NowPayments(api) => api.invoice_status(invoice_id).await,
        }
    }

    fn checkout_url(&self, invoice_id: &str) -> String {
        match self {
            Self::BtcPay(api) => api.checkout_url(invoice_id),
            Self::NowPayments(api) => api.checkout_url(invoice_id),
        }
    }
}
