//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers stay thin. Validation and state changes belong in the `payment_engine` API objects.
//!
//! Route paths are relative to the scope they are mounted in (see [`crate::server::create_server_instance`]):
//! * `/api/v1`: invoices and the transaction listing,
//! * `/api/v1/webhooks`: BTCPay Server webhooks,
//! * `/webhook`: NowPayments IPNs,
//! * `/api`: the catalog payment flow.
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use payment_engine::{
    traits::{PaymentGatewayDatabase, TransactionStore, UserPaymentStore},
    InvoiceFlowApi,
    ReconciliationApi,
    TransactionsApi,
    UserPaymentsApi,
};
use processor_tools::{BtcPayWebhookEvent, NewInvoice, NowPaymentsIpn, PaymentProcessor};

use crate::{
    data_objects::{
        AssignInvoiceRequest,
        HealthResponse,
        JsonResponse,
        PaymentQuery,
        PaymentResponse,
        TransactionListParams,
        UserPaymentSummary,
        WebhookReceipt,
    },
    errors::{PaymentFlowError, ServerError},
    metrics::{record, GatewayMetrics, PROMETHEUS_CONTENT_TYPE},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().json(HealthResponse::ok())
}

#[get("/metrics")]
pub async fn metrics_report(metrics: web::Data<GatewayMetrics>) -> impl Responder {
    HttpResponse::Ok().content_type(PROMETHEUS_CONTENT_TYPE).body(metrics.to_prometheus())
}

//----------------------------------------------   Invoices  ----------------------------------------------------
route!(create_invoice => Post "/invoices" impl TransactionStore, PaymentProcessor);
/// Issues a new invoice with the payment processor and records it locally.
///
/// Responds with 201 and the invoice details (`invoice_id`, `checkout_url`, `status`, `expiration_time`). Invalid
/// requests are rejected with a 400 and never reach the processor.
pub async fn create_invoice<B, P>(
    req: HttpRequest,
    body: web::Json<NewInvoice>,
    api: web::Data<InvoiceFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: TransactionStore,
    P: PaymentProcessor,
{
    let invoice = body.into_inner();
    debug!("💻️ Received invoice request for order {}", invoice.order_id);
    match api.create_invoice(invoice).await {
        Ok(created) => {
            record(&req, |m| GatewayMetrics::inc(&m.invoices_created));
            info!("💻️ Invoice {} created. Checkout at {}", created.invoice_id, created.checkout_url);
            Ok(HttpResponse::Created().json(created))
        },
        Err(e) => {
            record(&req, |m| GatewayMetrics::inc(&m.invoice_failures));
            debug!("💻️ Invoice request failed. {e}");
            Err(e.into())
        },
    }
}

route!(invoice_status => Get "/invoices/{id}" impl TransactionStore, PaymentProcessor);
pub async fn invoice_status<B, P>(
    path: web::Path<String>,
    api: web::Data<InvoiceFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: TransactionStore,
    P: PaymentProcessor,
{
    let invoice_id = path.into_inner();
    trace!("💻️ Fetching status for invoice {invoice_id}");
    let status = api.invoice_status(&invoice_id).await?;
    Ok(HttpResponse::Ok().json(status))
}

//----------------------------------------------   Transactions  ----------------------------------------------------
route!(list_transactions => Get "/transactions" impl TransactionStore);
/// Lists local transaction records, newest first.
///
/// Query parameters: `status`, `date_from` and `date_to` (`YYYY-MM-DD`), `page` (default 1) and `per_page`
/// (default 20). Malformed values are ignored rather than rejected.
pub async fn list_transactions<B>(
    query: web::Query<TransactionListParams>,
    api: web::Data<TransactionsApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: TransactionStore,
{
    let params = query.into_inner();
    let filter = params.filter();
    let (page, per_page) = params.paging();
    debug!("💻️ Listing transactions. {filter:?}, page {page}, {per_page} per page");
    let result = api.list_transactions(filter, page, per_page).await?;
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(btcpay_webhook => Post "/btcpay" impl PaymentGatewayDatabase, PaymentProcessor);
/// Receives BTCPay Server webhooks. The signature has already been checked by the HMAC middleware.
///
/// Every delivery that parses is acknowledged with `{"status": "received"}`, even when it cannot be applied, so that
/// BTCPay does not keep redelivering it. Failures are logged.
pub async fn btcpay_webhook<B, P>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<ReconciliationApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    P: PaymentProcessor,
{
    let event = serde_json::from_slice::<BtcPayWebhookEvent>(&body).map_err(|e| {
        warn!("🪝️ Could not parse BTCPay webhook payload. {e}");
        ServerError::InvalidRequestBody("Invalid webhook payload".into())
    })?;
    record(&req, |m| GatewayMetrics::inc(&m.btcpay_webhooks));
    match api.process_btcpay_event(&event).await {
        Ok(outcome) => debug!("🪝️ Webhook {} for invoice {}: {outcome:?}", event.delivery_id, event.invoice_id),
        Err(e) => error!("🪝️ Could not apply {} webhook for invoice {}. {e}", event.event_type, event.invoice_id),
    }
    Ok(HttpResponse::Ok().json(WebhookReceipt::received()))
}

route!(nowpayments_webhook => Post "" impl PaymentGatewayDatabase, PaymentProcessor);
/// Receives NowPayments IPN notifications. The signature has already been checked by the HMAC middleware.
pub async fn nowpayments_webhook<B, P>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<ReconciliationApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    P: PaymentProcessor,
{
    let ipn = serde_json::from_slice::<NowPaymentsIpn>(&body).map_err(|e| {
        warn!("🪝️ Could not parse NowPayments IPN payload. {e}");
        ServerError::InvalidRequestBody("Invalid request payload".into())
    })?;
    record(&req, |m| GatewayMetrics::inc(&m.nowpayments_webhooks));
    api.process_nowpayments_ipn(&ipn).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("")))
}

//----------------------------------------------   Catalog payments  ----------------------------------------------------
route!(assign_invoice => Post "/assign-invoice" impl UserPaymentStore, PaymentProcessor);
/// Assigns a catalog invoice to a user. Body: `{"user_id": "..", "invoice_id": ".."}`. Responds with the url of the
/// processor's checkout page for the invoice.
pub async fn assign_invoice<B, P>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<UserPaymentsApi<B, P>>,
) -> Result<HttpResponse, PaymentFlowError>
where
    B: UserPaymentStore,
    P: PaymentProcessor,
{
    let request = serde_json::from_slice::<AssignInvoiceRequest>(&body).map_err(|e| {
        debug!("💳️ Could not parse invoice assignment request. {e}");
        PaymentFlowError::bad_request("Invalid request format")
    })?;
    let (user_id, invoice_id) = (request.user_id.trim(), request.invoice_id.trim());
    if user_id.is_empty() || invoice_id.is_empty() {
        return Err(PaymentFlowError::bad_request("Both user_id and invoice_id are required"));
    }
    let payment_url = api.assign_invoice(user_id, invoice_id).await?;
    record(&req, |m| GatewayMetrics::inc(&m.payments_assigned));
    Ok(HttpResponse::Ok().json(PaymentResponse::with_payment_url(payment_url)))
}

route!(check_payment => Get "/check-payment" impl UserPaymentStore, PaymentProcessor);
/// Reports the status of a user's payment for an invoice, refreshed from the processor if it is not yet final.
pub async fn check_payment<B, P>(
    query: web::Query<PaymentQuery>,
    api: web::Data<UserPaymentsApi<B, P>>,
) -> Result<HttpResponse, PaymentFlowError>
where
    B: UserPaymentStore,
    P: PaymentProcessor,
{
    let (user_id, invoice_id) = match (query.user_id(), query.invoice_id()) {
        (Some(u), Some(i)) => (u, i),
        _ => return Err(PaymentFlowError::bad_request("Both user_id and invoice_id parameters are required")),
    };
    let check = api.check_payment(user_id, invoice_id).await?;
    Ok(HttpResponse::Ok().json(PaymentResponse::with_data(check)))
}

route!(user_payments => Get "/user-payments" impl UserPaymentStore, PaymentProcessor);
/// Lists a user's payments, most recent first, with statuses refreshed from the processor where possible.
pub async fn user_payments<B, P>(
    query: web::Query<PaymentQuery>,
    api: web::Data<UserPaymentsApi<B, P>>,
) -> Result<HttpResponse, PaymentFlowError>
where
    B: UserPaymentStore,
    P: PaymentProcessor,
{
    let user_id = query.user_id().ok_or_else(|| PaymentFlowError::bad_request("user_id parameter is required"))?;
    let payments = api.user_payments(user_id).await?;
    let payments = payments.into_iter().map(UserPaymentSummary::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(PaymentResponse::with_data(payments)))
}
