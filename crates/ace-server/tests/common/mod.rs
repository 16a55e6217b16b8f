#![allow(dead_code)]

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use std::sync::Arc;

use ace_ai::MockSummarizer;
use ace_notify::channels::mock::MockChannel;
use ace_notify::PassthroughRenderer;
use ace_storage::{MemoryStore, NewAlert, RecordStore};
use ace_server::app;
use ace_server::config::ServerConfig;
use ace_server::state::AppState;
use serde_json::{json, Value};
use tower::util::ServiceExt;

pub struct TestContext {
    pub state: AppState,
    pub app: axum::Router,
    /// The mock delivery channel, for inspecting recorded mails.
    pub mailbox: Arc<MockChannel>,
}

pub fn build_test_context() -> Result<TestContext> {
    ace_common::id::init(1, 1);

    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    let mailbox = Arc::new(MockChannel::new());

    let config = ServerConfig {
        database: ace_server::config::DatabaseConfig {
            backend: "memory".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };

    let state = AppState {
        store,
        notifier: mailbox.clone(),
        summarizer: Arc::new(MockSummarizer::new()),
        renderer: Arc::new(PassthroughRenderer),
        start_time: Utc::now(),
        config: Arc::new(config),
    };

    let app = app::build_http_app(state.clone());

    Ok(TestContext {
        state,
        app,
        mailbox,
    })
}

pub async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.unwrap_or(Value::Null).to_string()))
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

pub async fn request_no_body(
    app: &axum::Router,
    method: &str,
    uri: &str,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");
    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

/// Raw request for non-JSON responses (e.g., CSV export).
pub async fn request_raw(
    app: &axum::Router,
    method: &str,
    uri: &str,
) -> (StatusCode, axum::http::HeaderMap, String) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");

    (status, headers, String::from_utf8_lossy(&bytes).to_string())
}

pub fn assert_ok_envelope(json: &Value) {
    assert_eq!(json["err_code"], 0);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
}

pub fn assert_err_envelope(json: &Value, err_code: i32) {
    assert_eq!(json["err_code"], err_code);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
    assert!(json.get("data").is_some());
    assert!(json["data"].is_null());
}

pub async fn create_department(app: &axum::Router, name: &str) -> String {
    let (status, body, _) = request_json(
        app,
        "POST",
        "/v1/departments",
        Some(json!({"name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ok_envelope(&body);
    body["data"]["id"]
        .as_str()
        .expect("department id should exist")
        .to_string()
}

pub async fn create_kpi(app: &axum::Router, name: &str, department_id: Option<&str>) -> Value {
    let (status, body, _) = request_json(
        app,
        "POST",
        "/v1/kpis",
        Some(json!({
            "name": name,
            "domain": "treasury",
            "alert_table_name": "alerts_test",
            "default_email_to": ["risk-team@bank.example"],
            "default_subject": "KPI alert",
            "default_body": "The following alerts require review.",
            "default_footer": "Automated notice.",
            "owner_department_id": department_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ok_envelope(&body);
    body["data"].clone()
}

/// Inserts a pending alert directly into the store, `days_ago` days back.
pub async fn seed_alert(
    ctx: &TestContext,
    kpi_id: Option<&str>,
    department_id: Option<&str>,
    detail: &str,
    days_ago: i64,
) -> String {
    let row = ctx
        .state
        .store
        .insert_alert(NewAlert {
            alert_id: ace_common::id::next_id(),
            alert_date: Utc::now() - Duration::days(days_ago),
            alert_detail: detail.to_string(),
            comment: None,
            department_id: department_id.map(str::to_string),
            kpi_id: kpi_id.map(str::to_string),
            severity: Some("high".to_string()),
            status: Some("open".to_string()),
        })
        .await
        .expect("insert alert should succeed");
    row.id
}
