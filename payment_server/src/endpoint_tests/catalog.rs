use actix_web::{http::StatusCode, web, web::ServiceConfig};
use payment_engine::{traits::StoreError, InvoiceCatalog, UserPaymentsApi};
use pgw_common::PaymentStatus;
use processor_tools::{InvoiceStatus, ProcessorError};

use super::{
    helpers::{get_request, json, post_request},
    mocks::{named_processor, user_payment, MockDatabase, MockProcessor},
};
use crate::routes::{AssignInvoiceRoute, CheckPaymentRoute, UserPaymentsRoute};

fn configure(db: MockDatabase, processor: MockProcessor) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let catalog = InvoiceCatalog::from_spec("6428428501=13.9:USD,5611069835=64.9:USD").expect("Invalid catalog");
        let api = UserPaymentsApi::new(db, processor, catalog);
        cfg.service(
            web::scope("/api")
                .service(AssignInvoiceRoute::<MockDatabase, MockProcessor>::new())
                .service(CheckPaymentRoute::<MockDatabase, MockProcessor>::new())
                .service(UserPaymentsRoute::<MockDatabase, MockProcessor>::new()),
        )
        .app_data(web::Data::new(api));
    }
}

fn reports(status: PaymentStatus) -> impl Fn(&str) -> Result<InvoiceStatus, ProcessorError> + Send + 'static {
    move |id| {
        Ok(InvoiceStatus {
            invoice_id: id.to_string(),
            status: status.clone(),
            amount_paid: 0.0,
            currency: "USD".into(),
            paid_date: None,
        })
    }
}

//--------------------------------------------   assign-invoice   -------------------------------------------------------

#[actix_web::test]
async fn assign_catalog_invoice() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_insert_user_payment()
        .withf(|p| p.user_id == "alice" && p.invoice_id == "6428428501" && p.amount == 13.9 && p.currency == "USD")
        .times(1)
        .returning(|p| Ok(user_payment(&p.user_id, &p.invoice_id, PaymentStatus::Pending)));
    let mut processor = named_processor();
    processor
        .expect_checkout_url()
        .withf(|id| id == "6428428501")
        .times(1)
        .returning(|id| format!("https://nowpayments.io/payment/?iid={id}"));
    let request = r#"{"user_id": "alice", "invoice_id": "6428428501"}"#;
    let (status, body) = post_request("/api/assign-invoice", request, &[], configure(db, processor)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json(&body),
        serde_json::json!({"status": true, "payment_url": "https://nowpayments.io/payment/?iid=6428428501"})
    );
}

#[actix_web::test]
async fn assign_unknown_invoice() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_insert_user_payment().never();
    let request = r#"{"user_id": "alice", "invoice_id": "1111111111"}"#;
    let (status, body) = post_request("/api/assign-invoice", request, &[], configure(db, named_processor())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), serde_json::json!({"status": false, "message": "Unknown invoice ID"}));
}

#[actix_web::test]
async fn assign_with_missing_fields() {
    let _ = env_logger::try_init().ok();
    for request in [r#"{"user_id": "alice"}"#, r#"{"user_id": " ", "invoice_id": "6428428501"}"#, "{}"] {
        let mut db = MockDatabase::new();
        db.expect_insert_user_payment().never();
        let (status, body) = post_request("/api/assign-invoice", request, &[], configure(db, named_processor())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{request}");
        assert_eq!(json(&body)["message"], "Both user_id and invoice_id are required");
    }
    let (status, body) =
        post_request("/api/assign-invoice", "user_id=alice", &[], configure(MockDatabase::new(), named_processor())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), serde_json::json!({"status": false, "message": "Invalid request format"}));
}

#[actix_web::test]
async fn assign_store_failure() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_insert_user_payment()
        .times(1)
        .returning(|_| Err(StoreError::DatabaseError("no such table: user_payments".into())));
    let mut processor = named_processor();
    processor.expect_checkout_url().never();
    let request = r#"{"user_id": "alice", "invoice_id": "5611069835"}"#;
    let (status, body) = post_request("/api/assign-invoice", request, &[], configure(db, processor)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json(&body), serde_json::json!({"status": false, "message": "Database error"}));
}

//--------------------------------------------   check-payment   -------------------------------------------------------

#[actix_web::test]
async fn check_unknown_payment() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_user_payment().times(1).returning(|_, _| Ok(None));
    let mut processor = named_processor();
    processor.expect_invoice_status().never();
    let (status, body) =
        get_request("/api/check-payment?user_id=alice&invoice_id=6428428501", configure(db, processor)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body), serde_json::json!({"status": false, "message": "Payment not found"}));
}

#[actix_web::test]
async fn check_payment_requires_both_parameters() {
    let _ = env_logger::try_init().ok();
    for uri in ["/api/check-payment?user_id=alice", "/api/check-payment?invoice_id=6428428501", "/api/check-payment"] {
        let mut db = MockDatabase::new();
        db.expect_fetch_user_payment().never();
        let (status, body) = get_request(uri, configure(db, named_processor())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json(&body)["message"], "Both user_id and invoice_id parameters are required");
    }
}

#[actix_web::test]
async fn pending_payment_is_refreshed() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_user_payment()
        .withf(|user, invoice| user == "alice" && invoice == "6428428501")
        .times(1)
        .returning(|user, invoice| Ok(Some(user_payment(user, invoice, PaymentStatus::Pending))));
    db.expect_update_user_payment_status()
        .withf(|user, invoice, status| user == "alice" && invoice == "6428428501" && *status == PaymentStatus::Finished)
        .times(1)
        .returning(|_, _, _| Ok(()));
    let mut processor = named_processor();
    processor.expect_invoice_status().times(1).returning(reports(PaymentStatus::Finished));
    let (status, body) =
        get_request("/api/check-payment?user_id=alice&invoice_id=6428428501", configure(db, processor)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json(&body),
        serde_json::json!({"status": true, "data": {"status": "finished", "amount": 13.9, "currency": "USD"}})
    );
}

#[actix_web::test]
async fn finished_payment_is_not_refreshed() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_user_payment()
        .times(1)
        .returning(|user, invoice| Ok(Some(user_payment(user, invoice, PaymentStatus::Finished))));
    db.expect_update_user_payment_status().never();
    let mut processor = named_processor();
    processor.expect_invoice_status().never();
    let (status, body) =
        get_request("/api/check-payment?user_id=alice&invoice_id=6428428501", configure(db, processor)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["data"]["status"], "finished");
}

#[actix_web::test]
async fn check_payment_processor_failure() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_user_payment()
        .times(1)
        .returning(|user, invoice| Ok(Some(user_payment(user, invoice, PaymentStatus::Pending))));
    db.expect_update_user_payment_status().never();
    let mut processor = named_processor();
    processor
        .expect_invoice_status()
        .times(1)
        .returning(|_| Err(ProcessorError::NetworkError("timed out".into())));
    let (status, body) =
        get_request("/api/check-payment?user_id=alice&invoice_id=6428428501", configure(db, processor)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json(&body), serde_json::json!({"status": false, "message": "Could not fetch payment status"}));
}

//--------------------------------------------   user-payments   -------------------------------------------------------

#[actix_web::test]
async fn list_user_payments() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_payments_for_user().withf(|user| user == "alice").times(1).returning(|user| {
        Ok(vec![
            user_payment(user, "6428428501", PaymentStatus::Pending),
            user_payment(user, "5611069835", PaymentStatus::Finished),
        ])
    });
    db.expect_update_user_payment_status()
        .withf(|_, invoice, status| invoice == "6428428501" && *status == PaymentStatus::Processing)
        .times(1)
        .returning(|_, _, _| Ok(()));
    let mut processor = named_processor();
    processor
        .expect_invoice_status()
        .withf(|id| id == "6428428501")
        .times(1)
        .returning(reports(PaymentStatus::Processing));
    let (status, body) = get_request("/api/user-payments?user_id=alice", configure(db, processor)).await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["status"], true);
    let payments = body["data"].as_array().unwrap();
    assert_eq!(payments.len(), 2);
    assert_eq!(payments[0]["invoice_id"], "6428428501");
    assert_eq!(payments[0]["status"], "processing");
    assert_eq!(payments[1]["status"], "finished");
}

#[actix_web::test]
async fn refresh_failures_keep_the_stored_status() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_payments_for_user()
        .times(1)
        .returning(|user| Ok(vec![user_payment(user, "6428428501", PaymentStatus::Pending)]));
    db.expect_update_user_payment_status().never();
    let mut processor = named_processor();
    processor
        .expect_invoice_status()
        .times(1)
        .returning(|_| Err(ProcessorError::NetworkError("timed out".into())));
    let (status, body) = get_request("/api/user-payments?user_id=alice", configure(db, processor)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["data"][0]["status"], "pending");
}

#[actix_web::test]
async fn user_payments_requires_a_user() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_payments_for_user().never();
    let (status, body) = get_request("/api/user-payments?user_id=", configure(db, named_processor())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body), serde_json::json!({"status": false, "message": "user_id parameter is required"}));
}
