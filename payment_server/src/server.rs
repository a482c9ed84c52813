use std::time::Duration;

use actix_web::{
    body::MessageBody,
    dev::{Server, Service, ServiceFactory, ServiceRequest, ServiceResponse},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpServer,
};
use futures::FutureExt;
use log::*;
use payment_engine::{
    helpers::SignatureScheme,
    traits::PaymentGatewayDatabase,
    InvoiceFlowApi,
    ReconciliationApi,
    SqliteDatabase,
    TransactionsApi,
    UserPaymentsApi,
};
use processor_tools::{PaymentProcessor, ProcessorClient, ProcessorKind};

use crate::{
    config::{ServerConfig, BTCPAY_SIGNATURE_HEADER, NOWPAYMENTS_SIGNATURE_HEADER},
    errors::ServerError,
    metrics::GatewayMetrics,
    middleware::{HmacMiddlewareFactory, PanicGuardFactory},
    routes::{
        health,
        metrics_report,
        AssignInvoiceRoute,
        BtcpayWebhookRoute,
        CheckPaymentRoute,
        CreateInvoiceRoute,
        InvoiceStatusRoute,
        ListTransactionsRoute,
        NowpaymentsWebhookRoute,
        UserPaymentsRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let processor = ProcessorClient::new(config.processor, config.btcpay.clone(), config.nowpayments.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🚀️ Issuing invoices with {}", processor.name());
    warn_about_unsigned_webhooks(&config);
    if config.processor != ProcessorKind::BtcPay {
        info!("🚀️ BTCPay Server webhooks are not mounted, since invoices are issued with {}", config.processor);
    }
    let srv = create_server_instance(config, db, processor)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    processor: ProcessorClient,
) -> Result<Server, ServerError> {
    let (host, port) = (config.host.clone(), config.port);
    let metrics = web::Data::new(GatewayMetrics::new());
    let srv = HttpServer::new(move || {
        let invoice_api = InvoiceFlowApi::new(db.clone(), processor.clone());
        let transactions_api = TransactionsApi::new(db.clone());
        let reconciliation_api = ReconciliationApi::new(db.clone(), processor.clone());
        let user_payments_api = UserPaymentsApi::new(db.clone(), processor.clone(), config.invoice_catalog.clone());
        let api_v1_scope = web::scope("/api/v1")
            .service(CreateInvoiceRoute::<SqliteDatabase, ProcessorClient>::new())
            .service(InvoiceStatusRoute::<SqliteDatabase, ProcessorClient>::new())
            .service(ListTransactionsRoute::<SqliteDatabase>::new());
        let catalog_scope = web::scope("/api")
            .service(AssignInvoiceRoute::<SqliteDatabase, ProcessorClient>::new())
            .service(CheckPaymentRoute::<SqliteDatabase, ProcessorClient>::new())
            .service(UserPaymentsRoute::<SqliteDatabase, ProcessorClient>::new());
        create_app(metrics.clone())
            .app_data(web::Data::new(invoice_api))
            .app_data(web::Data::new(transactions_api))
            .app_data(web::Data::new(reconciliation_api))
            .app_data(web::Data::new(user_payments_api))
            .service(health)
            .service(metrics_report)
            // Scopes are matched in the order they are registered, so the webhook prefixes must come first.
            .configure(|cfg| configure_webhooks::<SqliteDatabase, ProcessorClient>(cfg, &config))
            .service(api_v1_scope)
            .service(catalog_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}

/// The application shell shared by every worker: panic isolation, request counters, the access log, and JSON body
/// error handling. Routes and API objects are added by the caller.
pub fn create_app(
    metrics: web::Data<GatewayMetrics>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = actix_web::Error,
    >,
> {
    let counters = metrics.clone();
    App::new()
        .wrap(PanicGuardFactory)
        .wrap_fn(move |req, srv| {
            GatewayMetrics::inc(&counters.http_requests);
            let counters = counters.clone();
            srv.call(req).map(move |res| {
                let server_error = match &res {
                    Ok(r) => r.status().is_server_error(),
                    Err(e) => e.as_response_error().status_code().is_server_error(),
                };
                if server_error {
                    GatewayMetrics::inc(&counters.http_server_errors);
                }
                res
            })
        })
        .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("pgw::access_log"))
        .app_data(metrics)
        .app_data(web::JsonConfig::default().error_handler(|e, _| {
            debug!("💻️ Could not deserialize request body. {e}");
            ServerError::InvalidRequestBody(e.to_string()).into()
        }))
}

/// Mounts the signed webhook routes.
///
/// NowPayments IPNs are always accepted, since applying them never calls the processor. BTCPay webhooks can make the
/// gateway look the invoice up with the processor, so they are only mounted when BTCPay is the configured processor.
pub fn configure_webhooks<B, P>(cfg: &mut web::ServiceConfig, config: &ServerConfig)
where
    B: PaymentGatewayDatabase + 'static,
    P: PaymentProcessor + 'static,
{
    if config.processor == ProcessorKind::BtcPay {
        let btcpay_hmac = HmacMiddlewareFactory::new(
            BTCPAY_SIGNATURE_HEADER,
            SignatureScheme::HmacSha256,
            config.btcpay_webhook_secret(),
            config.allow_unsigned_webhooks,
        );
        cfg.service(web::scope("/api/v1/webhooks").wrap(btcpay_hmac).service(BtcpayWebhookRoute::<B, P>::new()));
    }
    let nowpayments_hmac = HmacMiddlewareFactory::new(
        NOWPAYMENTS_SIGNATURE_HEADER,
        SignatureScheme::HmacSha512,
        config.nowpayments_ipn_secret(),
        config.allow_unsigned_webhooks,
    );
    cfg.service(web::scope("/webhook").wrap(nowpayments_hmac).service(NowpaymentsWebhookRoute::<B, P>::new()));
}

fn warn_about_unsigned_webhooks(config: &ServerConfig) {
    let providers = config.unsigned_webhook_providers();
    if providers.is_empty() {
        return;
    }
    let providers = providers.join(", ");
    if config.allow_unsigned_webhooks {
        warn!(
            "🚨️ No webhook secret is configured for {providers}. PGW_ALLOW_UNSIGNED_WEBHOOKS is set, so their webhooks \
             will be accepted WITHOUT a signature check. Anyone who can reach this server can mark invoices as paid. \
             Do not run like this in production."
        );
    } else {
        warn!("🚨️ No webhook secret is configured for {providers}. Their webhooks will be rejected.");
    }
}
