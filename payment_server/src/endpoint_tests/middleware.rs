use actix_web::{http::StatusCode, test, test::TestRequest, web, HttpResponse};

use super::helpers::{call_app, get_request, json};
use crate::{
    metrics::GatewayMetrics,
    routes::{health, metrics_report},
    server::create_app,
};

async fn boom() -> HttpResponse {
    panic!("the flux capacitor is out of flux");
}

#[actix_web::test]
async fn health_check() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/health", |cfg| {
        cfg.service(health);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["status"], "ok");
    assert!(body["time"].is_string());
}

#[actix_web::test]
async fn requests_pass_through_the_server_middleware() {
    let _ = env_logger::try_init().ok();
    let app = create_app(web::Data::new(GatewayMetrics::new())).service(health);
    let service = test::init_service(app).await;
    for _ in 0..3 {
        let (status, body) = call_app(&service, TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(json(&body)["status"], "ok");
    }
}

#[actix_web::test]
async fn panics_become_server_errors() {
    let _ = env_logger::try_init().ok();
    let app = create_app(web::Data::new(GatewayMetrics::new()))
        .route("/boom", web::get().to(boom))
        .service(health)
        .service(metrics_report);
    let service = test::init_service(app).await;

    let (status, body) = call_app(&service, TestRequest::get().uri("/boom").to_request()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("flux"), "{body}");

    // The worker survives, and the panic is counted
    let (status, _) = call_app(&service, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call_app(&service, TestRequest::get().uri("/metrics").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("pgw_handler_panics_total 1"), "{body}");
    assert!(body.contains("pgw_http_server_errors_total 1"), "{body}");
    assert!(body.contains("pgw_http_requests_total 3"), "{body}");
}

#[actix_web::test]
async fn metrics_report_lists_counters() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/metrics", |cfg| {
        let metrics = GatewayMetrics::new();
        GatewayMetrics::inc(&metrics.invoices_created);
        GatewayMetrics::inc(&metrics.invoices_created);
        cfg.service(metrics_report).app_data(web::Data::new(metrics));
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("# TYPE pgw_uptime_seconds gauge"), "{body}");
    assert!(body.contains("pgw_invoices_created_total 2"), "{body}");
    assert!(body.contains("pgw_webhook_signature_failures_total 0"), "{body}");
}
