use log::*;
use pgw_common::PaymentStatus;

use crate::{
    config::NowPaymentsConfig,
    data_objects::{InvoiceCreated, InvoiceStatus, NewInvoice},
    nowpayments_objects::{NowPaymentsInvoice, NowPaymentsInvoiceRequest, NowPaymentsPaymentList},
    rest::RestClient,
    PaymentProcessor,
    ProcessorError,
};

/// Client for the NowPayments REST API.
#[derive(Clone)]
pub struct NowPaymentsApi {
    checkout_url: String,
    client: RestClient,
}

impl NowPaymentsApi {
    pub fn new(config: NowPaymentsConfig) -> Result<Self, ProcessorError> {
        let client = RestClient::new(&config.base_url, "x-api-key", config.api_key.reveal())?;
        Ok(Self { checkout_url: config.checkout_url, client })
    }
}

impl PaymentProcessor for NowPaymentsApi {
    fn name(&self) -> &'static str {
        "NowPayments"
    }

    async fn create_invoice(&self, invoice: NewInvoice) -> Result<InvoiceCreated, ProcessorError> {
        let body = NowPaymentsInvoiceRequest {
            price_amount: invoice.price_amount,
            price_currency: invoice.price_currency.clone(),
            order_id: invoice.order_id.clone(),
            ipn_callback_url: invoice.webhook_url().map(String::from),
            success_url: invoice.redirect_url().map(String::from),
        };
        debug!("Creating NowPayments invoice for order {}", invoice.order_id);
        let result: NowPaymentsInvoice = self.client.post("/invoice", &body).await?;
        info!("Created NowPayments invoice {} for order {}", result.id, invoice.order_id);
        let checkout_url =
            if result.invoice_url.is_empty() { self.checkout_url(&result.id) } else { result.invoice_url };
        Ok(InvoiceCreated {
            invoice_id: result.id,
            checkout_url,
            status: PaymentStatus::Created,
            expiration_time: None,
        })
    }

    /// Reports the most recent payment made against the invoice. An invoice without payments is `pending`.
    async fn invoice_status(&self, invoice_id: &str) -> Result<InvoiceStatus, ProcessorError> {
        let path = format!("/payment/by-invoice-id/{invoice_id}");
        trace!("Fetching NowPayments payments for invoice {invoice_id}");
        let payments: NowPaymentsPaymentList = self.client.get(&path).await?;
        let Some(latest) = payments.data.last() else {
            return Ok(InvoiceStatus::unpaid(invoice_id, PaymentStatus::Pending));
        };
        let status = PaymentStatus::from(latest.payment_status.as_str());
        let paid_date = if status.is_paid() { latest.updated_at } else { None };
        Ok(InvoiceStatus {
            invoice_id: invoice_id.to_string(),
            status,
            amount_paid: latest.actually_paid,
            currency: latest.pay_currency.clone(),
            paid_date,
        })
    }

    fn checkout_url(&self, invoice_id: &str) -> String {
        format!("{}{invoice_id}", self.checkout_url)
    }
}
