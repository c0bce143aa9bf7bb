//! Route-level tests driving the router with `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use regdesk_audit::MemoryAuditStore;
use regdesk_desk::EventDesk;
use regdesk_nullables::{NullClock, NullMailer};
use regdesk_rpc::{router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    mailer: Arc<NullMailer>,
}

fn app() -> TestApp {
    let mailer = Arc::new(NullMailer::new());
    let desk = Arc::new(EventDesk::new(
        Arc::new(MemoryAuditStore::new()),
        Arc::new(NullClock::new(5_000)),
        mailer.clone(),
    ));
    TestApp {
        router: router(AppState::new(desk, "desk-admin"), true, false),
        mailer,
    }
}

async fn call(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

fn hackathon(capacity: u32, price: u64) -> Value {
    json!({
        "id": "hack",
        "capacity": capacity,
        "registrationType": "Solo",
        "autoCloseOnCapacity": true,
        "enableWaitlist": true,
        "price": price,
    })
}

fn solo(email: &str) -> Value {
    json!({ "members": [{ "name": "P", "email": email }] })
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_confirms_then_waitlists() {
    let app = app();
    let (status, body) = call(&app, Method::PUT, "/events/hack", Some(hackathon(1, 500))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["summary"]["capacity"], 1);

    let (status, body) = call(&app, Method::POST, "/events/hack/register", Some(solo("a@x.io"))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["registrationIndex"], 1);
    assert_eq!(body["fee"]["total"], 500);

    let (status, body) = call(&app, Method::POST, "/events/hack/register", Some(solo("b@x.io"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "waitlisted", "rank": 1 }));

    let (_, waitlist) = call(&app, Method::GET, "/events/hack/waitlist", None).await;
    assert_eq!(waitlist.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn errors_use_documented_status_codes() {
    let app = app();

    let (status, body) = call(&app, Method::GET, "/events/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().is_some());

    let mut closed = hackathon(0, 0);
    closed["registrationCloses"] = json!(10);
    call(&app, Method::PUT, "/events/hack", Some(closed)).await;
    let (status, body) = call(&app, Method::POST, "/events/hack/register", Some(solo("a@x.io"))).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, _) = call(
        &app,
        Method::POST,
        "/events/hack/register",
        Some(json!({ "members": [] })),
    )
    .await;
    // Window check runs first.
    assert_eq!(status, StatusCode::CONFLICT);

    call(&app, Method::PUT, "/events/hack", Some(hackathon(0, 0))).await;
    let (status, _) = call(
        &app,
        Method::POST,
        "/events/hack/register",
        Some(json!({ "members": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, Method::POST, "/events/hack/register", Some(json!("junk"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some());

    let (status, _) = call(&app, Method::PUT, "/events/other", Some(hackathon(1, 0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn payment_review_flow_over_http() {
    let app = app();
    call(&app, Method::PUT, "/events/hack", Some(hackathon(5, 300))).await;
    call(&app, Method::POST, "/events/hack/register", Some(solo("a@x.io"))).await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/events/hack/verify-payment/1",
        Some(json!({ "action": "approve" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(
        &app,
        Method::POST,
        "/events/hack/registrations/1/payment-proof",
        Some(json!({ "utrNumber": "  ", "amountPaid": 300 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = call(
        &app,
        Method::POST,
        "/events/hack/registrations/1/payment-proof",
        Some(json!({ "utrNumber": "UTR42", "amountPaid": 300 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["logEntry"]["action"], "submitted");
    assert_eq!(body["logEntry"]["performedBy"], "a@x.io");

    let (status, body) = call(
        &app,
        Method::POST,
        "/events/hack/verify-payment/1",
        Some(json!({ "action": "reject", "rejectionReason": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["registration"]["rejectionReason"],
        "Payment verification failed"
    );
    assert_eq!(body["logEntry"]["performedBy"], "desk-admin");

    let (_, pending) = call(&app, Method::GET, "/events/hack/pending-payments", None).await;
    assert_eq!(pending["pendingPayments"].as_array().map(Vec::len), Some(1));

    let (_, logs) = call(&app, Method::GET, "/events/hack/payment-logs", None).await;
    let actions: Vec<&str> = logs
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["submitted", "rejected"]);

    let (status, _) = call(
        &app,
        Method::POST,
        "/events/hack/verify-payment/99",
        Some(json!({ "action": "approve" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_promotes_and_second_cancel_conflicts() {
    let app = app();
    call(&app, Method::PUT, "/events/hack", Some(hackathon(1, 0))).await;
    call(&app, Method::POST, "/events/hack/register", Some(solo("a@x.io"))).await;
    call(&app, Method::POST, "/events/hack/register", Some(solo("b@x.io"))).await;

    let (status, body) = call(&app, Method::POST, "/events/hack/registrations/1/cancel", None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["promoted"]["registrationIndex"], 2);
    assert!(body["cancelled"]["cancelledAt"].is_number());

    let (status, _) = call(&app, Method::POST, "/events/hack/registrations/1/cancel", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = call(&app, Method::POST, "/events/hack/promote", None).await;
    assert!(body["promoted"].is_null());
}

#[tokio::test]
async fn remind_reports_sent_and_failed() {
    let app = app();
    call(&app, Method::PUT, "/events/hack", Some(hackathon(0, 0))).await;
    call(&app, Method::POST, "/events/hack/register", Some(solo("a@x.io"))).await;
    call(&app, Method::POST, "/events/hack/register", Some(solo("b@x.io"))).await;
    app.mailer.fail_for("b@x.io");

    let (status, body) = call(
        &app,
        Method::POST,
        "/events/hack/remind",
        Some(json!({ "subject": "Soon", "message": "See you" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "sent": 1, "failed": 1 }));
}

#[tokio::test]
async fn metrics_endpoint_exposes_counters() {
    let app = app();
    call(&app, Method::PUT, "/events/hack", Some(hackathon(0, 0))).await;
    call(&app, Method::POST, "/events/hack/register", Some(solo("a@x.io"))).await;

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("regdesk_registrations_confirmed_total 1"));
}
