use log::*;
use pgw_common::PaymentStatus;

use crate::{
    btcpay_objects::{
        BtcPayBuyer,
        BtcPayCheckoutOptions,
        BtcPayInvoice,
        BtcPayInvoiceDetails,
        BtcPayInvoiceMetadata,
        BtcPayInvoiceRequest,
        BtcPayReceiptOptions,
    },
    config::BtcPayConfig,
    data_objects::{InvoiceCreated, InvoiceStatus, NewInvoice},
    rest::RestClient,
    PaymentProcessor,
    ProcessorError,
};

/// Client for the BTCPay Server Greenfield API.
#[derive(Clone)]
pub struct BtcPayApi {
    store_id: String,
    client: RestClient,
}

impl BtcPayApi {
    pub fn new(config: BtcPayConfig) -> Result<Self, ProcessorError> {
        let auth = format!("token {}", config.api_key.reveal());
        let client = RestClient::new(&config.base_url, "authorization", &auth)?;
        Ok(Self { store_id: config.store_id, client })
    }

    fn invoices_path(&self) -> String {
        format!("/api/v1/stores/{}/invoices", self.store_id)
    }
}

impl PaymentProcessor for BtcPayApi {
    fn name(&self) -> &'static str {
        "BTCPay Server"
    }

    async fn create_invoice(&self, invoice: NewInvoice) -> Result<InvoiceCreated, ProcessorError> {
        let body = BtcPayInvoiceRequest {
            amount: invoice.price_amount,
            currency: invoice.price_currency.clone(),
            metadata: BtcPayInvoiceMetadata { order_id: invoice.order_id.clone() },
            checkout: BtcPayCheckoutOptions { redirect_url: invoice.redirect_url().map(String::from) },
            receipt: BtcPayReceiptOptions { enabled: true },
            buyer: invoice.buyer_email().map(|email| BtcPayBuyer { email: email.to_string() }),
            notification_url: invoice.webhook_url().map(String::from),
        };
        debug!("Creating BTCPay invoice for order {}", invoice.order_id);
        let result: BtcPayInvoice = self.client.post(&self.invoices_path(), &body).await?;
        info!("Created BTCPay invoice {} for order {}", result.id, invoice.order_id);
        let checkout_url =
            if result.checkout_link.is_empty() { self.checkout_url(&result.id) } else { result.checkout_link };
        Ok(InvoiceCreated {
            invoice_id: result.id,
            checkout_url,
            status: PaymentStatus::from(result.status),
            expiration_time: result.expiration_time,
        })
    }

    async fn invoice_status(&self, invoice_id: &str) -> Result<InvoiceStatus, ProcessorError> {
        let path = format!("{}/{invoice_id}", self.invoices_path());
        trace!("Fetching BTCPay invoice {invoice_id}");
        let details: BtcPayInvoiceDetails = self.client.get(&path).await?;
        let status = PaymentStatus::from(details.status);
        let mut result = InvoiceStatus::unpaid(invoice_id, status);
        if let Some(payment) = details.payments.first() {
            result.amount_paid = payment.value;
            result.currency = payment.currency.clone();
        }
        result.paid_date = details.paid_date;
        Ok(result)
    }

    fn checkout_url(&self, invoice_id: &str) -> String {
        format!("{}/i/{invoice_id}", self.client.base_url())
    }
}
