use actix_web::{http::StatusCode, web, web::ServiceConfig};
use payment_engine::{helpers::SignatureScheme, traits::StoreError, ReconciliationApi};
use pgw_common::{PaymentStatus, Secret};
use processor_tools::{InvoiceStatus, ProcessorKind};

use super::{
    helpers::{json, post_request, sign},
    mocks::{named_processor, transaction, MockDatabase, MockProcessor},
};
use crate::{
    config::{ServerConfig, BTCPAY_SIGNATURE_HEADER, NOWPAYMENTS_SIGNATURE_HEADER},
    metrics::GatewayMetrics,
    server::configure_webhooks,
};

const BTCPAY_SECRET: &str = "btcpay-webhook-secret";
const NOWPAYMENTS_SECRET: &str = "nowpayments-ipn-secret";

fn configure(db: MockDatabase, processor: MockProcessor) -> impl FnOnce(&mut ServiceConfig) {
    configure_with_secrets(db, processor, BTCPAY_SECRET, NOWPAYMENTS_SECRET, false)
}

fn configure_with_secrets(
    db: MockDatabase,
    processor: MockProcessor,
    btcpay_secret: &'static str,
    nowpayments_secret: &'static str,
    allow_unsigned: bool,
) -> impl FnOnce(&mut ServiceConfig) {
    let config = webhook_config(ProcessorKind::BtcPay, btcpay_secret, nowpayments_secret, allow_unsigned);
    configure_for(config, db, processor)
}

fn webhook_config(
    kind: ProcessorKind,
    btcpay_secret: &str,
    nowpayments_secret: &str,
    allow_unsigned: bool,
) -> ServerConfig {
    let mut config = ServerConfig { processor: kind, allow_unsigned_webhooks: allow_unsigned, ..Default::default() };
    config.btcpay.webhook_secret = Secret::new(btcpay_secret.to_string());
    config.nowpayments.ipn_secret = Secret::new(nowpayments_secret.to_string());
    config
}

fn configure_for(
    config: ServerConfig,
    db: MockDatabase,
    processor: MockProcessor,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = ReconciliationApi::new(db, processor);
        configure_webhooks::<MockDatabase, MockProcessor>(cfg, &config);
        cfg.app_data(web::Data::new(api)).app_data(web::Data::new(GatewayMetrics::new()));
    }
}

fn btcpay_event(event_type: &str, invoice_id: &str) -> String {
    format!(
        r#"{{"deliveryId":"D1","webhookId":"W1","originalDeliveryId":"D1","isRedelivery":false,"type":"{event_type}","timestamp":1717243200,"storeId":"S1","invoiceId":"{invoice_id}"}}"#
    )
}

async fn post_btcpay(payload: &str, configure: impl FnOnce(&mut ServiceConfig)) -> (StatusCode, String) {
    let signature = format!("sha256={}", sign(SignatureScheme::HmacSha256, BTCPAY_SECRET, payload));
    post_request("/api/v1/webhooks/btcpay", payload, &[(BTCPAY_SIGNATURE_HEADER, signature.as_str())], configure).await
}

async fn post_ipn(payload: &str, configure: impl FnOnce(&mut ServiceConfig)) -> (StatusCode, String) {
    let signature = sign(SignatureScheme::HmacSha512, NOWPAYMENTS_SECRET, payload);
    post_request("/webhook", payload, &[(NOWPAYMENTS_SIGNATURE_HEADER, signature.as_str())], configure).await
}

//--------------------------------------------   BTCPay Server   -------------------------------------------------------

#[actix_web::test]
async fn settled_invoice_is_completed() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_update_status()
        .withf(|id, status| id == "INV1" && *status == PaymentStatus::Completed)
        .times(1)
        .returning(|id, status| Ok(transaction(id, status.clone())));
    let (status, body) = post_btcpay(&btcpay_event("InvoiceSettled", "INV1"), configure(db, named_processor())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({"status": "received"}));
}

#[actix_web::test]
async fn expired_invoice() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_update_status()
        .withf(|id, status| id == "INV1" && *status == PaymentStatus::Expired)
        .times(1)
        .returning(|id, status| Ok(transaction(id, status.clone())));
    let (status, _) = post_btcpay(&btcpay_event("InvoiceExpired", "INV1"), configure(db, named_processor())).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn received_payment_is_recorded() {
    let _ = env_logger::try_init().ok();
    let mut processor = named_processor();
    processor.expect_invoice_status().withf(|id| id == "INV1").times(1).returning(|id| {
        Ok(InvoiceStatus {
            invoice_id: id.to_string(),
            status: PaymentStatus::Processing,
            amount_paid: 0.00021,
            currency: "BTC".into(),
            paid_date: None,
        })
    });
    let mut db = MockDatabase::new();
    db.expect_update_payment_info()
        .withf(|id, amount, currency| id == "INV1" && *amount == 0.00021 && currency == "BTC")
        .times(1)
        .returning(|id, _, _| Ok(transaction(id, PaymentStatus::Processing)));
    db.expect_update_status().never();
    let (status, _) = post_btcpay(&btcpay_event("InvoiceReceivedPayment", "INV1"), configure(db, processor)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn unknown_event_changes_nothing() {
    let _ = env_logger::try_init().ok();
    for event_type in ["InvoicePaymentSettled", "InvoiceCreated", "SomethingNew"] {
        let mut db = MockDatabase::new();
        db.expect_update_status().never();
        db.expect_update_payment_info().never();
        let mut processor = named_processor();
        processor.expect_invoice_status().never();
        let (status, body) = post_btcpay(&btcpay_event(event_type, "INV1"), configure(db, processor)).await;
        assert_eq!(status, StatusCode::OK, "{event_type}");
        assert_eq!(json(&body)["status"], "received");
    }
}

#[actix_web::test]
async fn store_failure_is_still_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_update_status().times(1).returning(|id, _| Err(StoreError::NotFound(id.to_string())));
    let (status, body) = post_btcpay(&btcpay_event("InvoiceProcessing", "INV9"), configure(db, named_processor())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "received");
}

#[actix_web::test]
async fn invalid_btcpay_signature() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_update_status().never();
    let payload = btcpay_event("InvoiceSettled", "INV1");
    let signature = format!("sha256={}", sign(SignatureScheme::HmacSha256, "not-the-secret", &payload));
    let (status, body) = post_request(
        "/api/v1/webhooks/btcpay",
        &payload,
        &[(BTCPAY_SIGNATURE_HEADER, signature.as_str())],
        configure(db, named_processor()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("Invalid signature"), "{body}");
}

#[actix_web::test]
async fn tampered_btcpay_payload() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_update_status().never();
    let payload = btcpay_event("InvoiceSettled", "INV1");
    let signature = format!("sha256={}", sign(SignatureScheme::HmacSha256, BTCPAY_SECRET, &payload));
    let tampered = payload.replace("INV1", "INV2");
    let (status, _) = post_request(
        "/api/v1/webhooks/btcpay",
        &tampered,
        &[(BTCPAY_SIGNATURE_HEADER, signature.as_str())],
        configure(db, named_processor()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn missing_btcpay_signature() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_update_status().never();
    let payload = btcpay_event("InvoiceSettled", "INV1");
    let (status, body) = post_request("/api/v1/webhooks/btcpay", &payload, &[], configure(db, named_processor())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No signature provided"), "{body}");
}

#[actix_web::test]
async fn malformed_btcpay_payload() {
    let _ = env_logger::try_init().ok();
    let (status, _) = post_btcpay(r#"{"invoiceId": "INV1"}"#, configure(MockDatabase::new(), named_processor())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = post_btcpay("<xml/>", configure(MockDatabase::new(), named_processor())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

//--------------------------------------------   NowPayments   -------------------------------------------------------

#[actix_web::test]
async fn finished_ipn_marks_payments_finished() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_update_status_for_invoice()
        .withf(|id, status| id == "5524759814" && *status == PaymentStatus::Finished)
        .times(1)
        .returning(|_, _| Ok(2));
    db.expect_update_status().times(1).returning(|id, _| Err(StoreError::NotFound(id.to_string())));
    db.expect_update_payment_info().never();
    let payload = r#"{"invoice_id": 5524759814, "payment_status": "finished"}"#;
    let (status, body) = post_ipn(payload, configure(db, named_processor())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({"success": true}));
}

#[actix_web::test]
async fn unfinished_ipn_is_ignored() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_update_status_for_invoice().never();
    db.expect_update_status().never();
    let payload = r#"{"invoice_id": "5524759814", "payment_status": "confirming"}"#;
    let (status, body) = post_ipn(payload, configure(db, named_processor())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["success"], true);
}

#[actix_web::test]
async fn ipn_store_failure_is_a_server_error() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_update_status_for_invoice()
        .times(1)
        .returning(|_, _| Err(StoreError::DatabaseError("database is locked".into())));
    let payload = r#"{"invoice_id": "5524759814", "payment_status": "finished"}"#;
    let (status, body) = post_ipn(payload, configure(db, named_processor())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("locked"), "{body}");
}

#[actix_web::test]
async fn missing_or_invalid_ipn_signature() {
    let _ = env_logger::try_init().ok();
    let payload = r#"{"invoice_id": "5524759814", "payment_status": "finished"}"#;
    let mut db = MockDatabase::new();
    db.expect_update_status_for_invoice().never();
    let (status, _) = post_request("/webhook", payload, &[], configure(db, named_processor())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    // A SHA-256 signature is not accepted where SHA-512 is expected
    let signature = sign(SignatureScheme::HmacSha256, NOWPAYMENTS_SECRET, payload);
    let mut db = MockDatabase::new();
    db.expect_update_status_for_invoice().never();
    let (status, _) = post_request(
        "/webhook",
        payload,
        &[(NOWPAYMENTS_SIGNATURE_HEADER, signature.as_str())],
        configure(db, named_processor()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn malformed_ipn() {
    let _ = env_logger::try_init().ok();
    let (status, _) = post_ipn(r#"{"payment_status": "finished"}"#, configure(MockDatabase::new(), named_processor())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

//--------------------------------------------   Unsigned webhooks   -------------------------------------------------

#[actix_web::test]
async fn webhooks_without_a_secret_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_update_status_for_invoice().never();
    let payload = r#"{"invoice_id": "5524759814", "payment_status": "finished"}"#;
    let (status, _) =
        post_request("/webhook", payload, &[], configure_with_secrets(db, named_processor(), "", "", false)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn unsigned_webhooks_can_be_allowed_explicitly() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_update_status_for_invoice().times(1).returning(|_, _| Ok(1));
    db.expect_update_status().times(1).returning(|id, s| Ok(transaction(id, s.clone())));
    let payload = r#"{"invoice_id": "5524759814", "payment_status": "finished"}"#;
    let (status, _) =
        post_request("/webhook", payload, &[], configure_with_secrets(db, named_processor(), "", "", true)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn a_configured_secret_cannot_be_skipped() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_update_status().never();
    let payload = btcpay_event("InvoiceSettled", "INV1");
    let (status, _) = post_request(
        "/api/v1/webhooks/btcpay",
        &payload,
        &[],
        configure_with_secrets(db, named_processor(), BTCPAY_SECRET, "", true),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

//--------------------------------------------   Mounted routes   -----------------------------------------------------

#[actix_web::test]
async fn btcpay_webhooks_are_not_mounted_for_nowpayments() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_update_status().never();
    let config = webhook_config(ProcessorKind::NowPayments, BTCPAY_SECRET, NOWPAYMENTS_SECRET, false);
    let (status, _) =
        post_btcpay(&btcpay_event("InvoiceSettled", "INV1"), configure_for(config, db, named_processor())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn ipns_are_mounted_for_either_processor() {
    let _ = env_logger::try_init().ok();
    for kind in [ProcessorKind::BtcPay, ProcessorKind::NowPayments] {
        let mut db = MockDatabase::new();
        db.expect_update_status_for_invoice()
            .withf(|id, status| id == "5524759814" && *status == PaymentStatus::Finished)
            .times(1)
            .returning(|_, _| Ok(1));
        db.expect_update_status().times(1).returning(|id, status| Ok(transaction(id, status.clone())));
        let config = webhook_config(kind, BTCPAY_SECRET, NOWPAYMENTS_SECRET, false);
        let payload = r#"{"invoice_id": "5524759814", "payment_status": "finished"}"#;
        let (status, body) = post_ipn(payload, configure_for(config, db, named_processor())).await;
        assert_eq!(status, StatusCode::OK, "{kind}");
        assert_eq!(json(&body)["success"], true);
    }
}
