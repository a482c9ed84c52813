use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{Duration, TimeZone, Utc};
use payment_engine::{db_types::TransactionQueryFilter, traits::StoreError, TransactionsApi};
use pgw_common::PaymentStatus;

use super::{
    helpers::{get_request, json},
    mocks::{transaction, MockDatabase},
};
use crate::routes::ListTransactionsRoute;

fn configure(db: MockDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = TransactionsApi::new(db);
        cfg.service(web::scope("/api/v1").service(ListTransactionsRoute::<MockDatabase>::new()))
            .app_data(web::Data::new(api));
    }
}

#[actix_web::test]
async fn list_with_filters() {
    let _ = env_logger::try_init().ok();
    let end_of_day = Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap() + Duration::nanoseconds(999_999_999);
    let mut db = MockDatabase::new();
    db.expect_list_transactions()
        .withf(move |filter, page, per_page| {
            filter.status == Some(PaymentStatus::Completed) &&
                filter.date_from == Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()) &&
                filter.date_to == Some(end_of_day) &&
                *page == 2 &&
                *per_page == 5
        })
        .times(1)
        .returning(|_, _, _| Ok((vec![transaction("INV6", PaymentStatus::Completed)], 6)));
    let (status, body) = get_request(
        "/api/v1/transactions?status=completed&date_from=2024-06-01&date_to=2024-06-30&page=2&per_page=5",
        configure(db),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["total"], 6);
    assert_eq!(body["page"], 2);
    assert_eq!(body["per_page"], 5);
    assert_eq!(body["transactions"][0]["invoice_id"], "INV6");
    assert_eq!(body["transactions"][0]["status"], "completed");
}

#[actix_web::test]
async fn list_defaults() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_list_transactions()
        .withf(|filter, page, per_page| *filter == TransactionQueryFilter::default() && *page == 1 && *per_page == 20)
        .times(1)
        .returning(|_, _, _| Ok((vec![], 0)));
    let (status, body) = get_request("/api/v1/transactions", configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["total"], 0);
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 20);
    assert!(body["transactions"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn bad_parameters_are_ignored() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_list_transactions()
        .withf(|filter, page, per_page| filter.date_from.is_none() && filter.date_to.is_none() && *page == 1 && *per_page == 20)
        .times(1)
        .returning(|_, _, _| Ok((vec![], 0)));
    let (status, _) =
        get_request("/api/v1/transactions?date_from=June&date_to=2024-13-01&page=-1&per_page=lots", configure(db)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn store_failure() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_list_transactions()
        .times(1)
        .returning(|_, _, _| Err(StoreError::Timeout("list_transactions".into())));
    let (status, body) = get_request("/api/v1/transactions", configure(db)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("list_transactions"), "{body}");
}
