mod common;

use axum::http::StatusCode;
use common::{
    assert_err_envelope, assert_ok_envelope, build_test_context, create_department, create_kpi,
    request_json, request_no_body, request_raw, seed_alert,
};
use serde_json::json;

#[tokio::test]
async fn health_should_return_ok_envelope() {
    let ctx = build_test_context().expect("test context should build");
    let (status, body, trace) = request_no_body(&ctx.app, "GET", "/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    assert!(body["data"]["version"].is_string());
    assert_eq!(body["data"]["storage_status"], "ok");
    assert!(trace.is_some());
}

#[tokio::test]
async fn departments_crud_and_validation() {
    let ctx = build_test_context().expect("test context should build");

    // Empty name rejected before any storage call
    let (status, body, _) =
        request_json(&ctx.app, "POST", "/v1/departments", Some(json!({"name": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);

    let ops = create_department(&ctx.app, "Operations").await;
    let _risk = create_department(&ctx.app, "Risk Management").await;
    let finance = create_department(&ctx.app, "Finance").await;

    // Listed in name ascending order
    let (status, body, _) = request_no_body(&ctx.app, "GET", "/v1/departments").await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    let items = body["data"]["items"].as_array().expect("items should be array");
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["name"], "Finance");
    assert_eq!(items[1]["name"], "Operations");
    assert_eq!(items[2]["name"], "Risk Management");
    assert_eq!(body["data"]["total"], 3);

    // Update
    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        &format!("/v1/departments/{ops}"),
        Some(json!({"description": "Branch operations"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "Branch operations");

    // Update of a missing id is 404
    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        "/v1/departments/nonexistent",
        Some(json!({"name": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);

    // Delete succeeds when no KPI references the department
    let (status, body, _) =
        request_no_body(&ctx.app, "DELETE", &format!("/v1/departments/{finance}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
}

#[tokio::test]
async fn department_delete_blocked_while_kpis_reference_it() {
    let ctx = build_test_context().expect("test context should build");
    let dept = create_department(&ctx.app, "Risk Management").await;
    create_kpi(&ctx.app, "VaR Breaches", Some(&dept)).await;

    let (status, body, _) =
        request_no_body(&ctx.app, "DELETE", &format!("/v1/departments/{dept}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_err_envelope(&body, 1005);
}

#[tokio::test]
async fn kpi_identifier_is_derived_and_must_be_unique() {
    let ctx = build_test_context().expect("test context should build");

    let kpi = create_kpi(&ctx.app, "Branch Wait Time", None).await;
    assert_eq!(kpi["identifier"], "branch-wait-time");
    assert_eq!(kpi["is_active"], true);

    // Same name derives the same identifier
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/kpis",
        Some(json!({
            "name": "Branch  Wait   Time",
            "domain": "operations",
            "alert_table_name": "alerts_wait",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_err_envelope(&body, 1005);
}

#[tokio::test]
async fn kpi_list_filters_combine_with_and() {
    let ctx = build_test_context().expect("test context should build");
    let ops = create_department(&ctx.app, "Operations").await;
    let risk = create_department(&ctx.app, "Risk Management").await;
    create_kpi(&ctx.app, "Branch Wait Time", Some(&ops)).await;
    create_kpi(&ctx.app, "Branch Errors", Some(&risk)).await;
    create_kpi(&ctx.app, "FX Exposure", Some(&risk)).await;

    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/v1/kpis?department_id__eq={risk}&name__contains=branch"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().expect("items should be array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Branch Errors");
}

#[tokio::test]
async fn alerts_list_sorted_and_filtered_by_inclusive_range() {
    let ctx = build_test_context().expect("test context should build");
    let kpi = create_kpi(&ctx.app, "FX Exposure", None).await;
    let kpi_id = kpi["id"].as_str().expect("kpi id");

    seed_alert(&ctx, Some(kpi_id), None, "oldest breach", 5).await;
    seed_alert(&ctx, Some(kpi_id), None, "middle breach", 2).await;
    seed_alert(&ctx, Some(kpi_id), None, "latest breach", 0).await;

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/v1/alerts").await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    let items = body["data"]["items"].as_array().expect("items should be array");
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["alert_detail"], "latest breach");
    assert_eq!(items[2]["alert_detail"], "oldest breach");
    assert_eq!(items[0]["state"], "pending");

    // A YYYY-MM-DD bound includes the whole day on both ends
    let from = (chrono::Utc::now() - chrono::Duration::days(2))
        .format("%Y-%m-%d")
        .to_string();
    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/v1/alerts?alert_date__gte={from}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().expect("items should be array");
    assert_eq!(items.len(), 2);

    // Garbage date parameter is a 400
    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/v1/alerts?alert_date__gte=not-a-date").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);
}

#[tokio::test]
async fn curate_alert_stamps_curated_date_and_rejects_sent() {
    let ctx = build_test_context().expect("test context should build");
    let kpi = create_kpi(&ctx.app, "FX Exposure", None).await;
    let kpi_id = kpi["id"].as_str().expect("kpi id");
    let alert_id = seed_alert(&ctx, Some(kpi_id), None, "limit breach", 0).await;

    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        &format!("/v1/alerts/{alert_id}"),
        Some(json!({"comment": "confirmed with desk", "severity": "medium"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["comment"], "confirmed with desk");
    assert!(body["data"]["curated_date"].is_string());
    assert_eq!(body["data"]["state"], "curated");

    // Empty update body is a 400
    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        &format!("/v1/alerts/{alert_id}"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);

    // Unknown id is a 404
    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        "/v1/alerts/nonexistent",
        Some(json!({"comment": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);

    // Send it, then curation must be refused
    let (status, _, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/alerts/send",
        Some(json!({"alert_ids": [alert_id]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        &format!("/v1/alerts/{alert_id}"),
        Some(json!({"comment": "too late"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_err_envelope(&body, 1005);
}

#[tokio::test]
async fn send_alerts_delivers_mail_stamps_rows_and_records_history() {
    let ctx = build_test_context().expect("test context should build");
    let kpi = create_kpi(&ctx.app, "FX Exposure", None).await;
    let kpi_id = kpi["id"].as_str().expect("kpi id");

    let a1 = seed_alert(&ctx, Some(kpi_id), None, "USD exposure over limit", 1).await;
    let a2 = seed_alert(&ctx, Some(kpi_id), None, "EUR exposure over limit", 0).await;

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/alerts/send",
        Some(json!({
            "alert_ids": [a1, a2, "nonexistent"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    assert_eq!(body["data"]["requested"], 3);
    assert_eq!(body["data"]["updated"], 2);
    assert_eq!(body["data"]["skipped"], 1);

    // The mock channel recorded one mail for the KPI group with its defaults
    let sent = ctx.mailbox.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["risk-team@bank.example".to_string()]);
    assert_eq!(sent[0].subject, "KPI alert");
    assert!(sent[0].body.contains("USD exposure over limit"));
    assert!(sent[0].body.contains("EUR exposure over limit"));

    // Both alerts are now stamped sent
    let (_, body, _) = request_no_body(&ctx.app, "GET", "/v1/alerts?status__eq=sent").await;
    let items = body["data"]["items"].as_array().expect("items should be array");
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|a| a["sent_date"].is_string()));
    assert!(items.iter().all(|a| a["state"] == "sent"));

    // One history row per mail
    let (status, body, _) = request_no_body(&ctx.app, "GET", "/v1/history").await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().expect("items should be array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["status"], "sent");
    assert_eq!(items[0]["kpi_id"], kpi_id);

    // Re-sending already-sent ids updates nothing and dispatches no mail
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/alerts/send",
        Some(json!({"alert_ids": [items[0]["alert_id"]]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 0);
    assert_eq!(ctx.mailbox.sent().len(), 1);
}

#[tokio::test]
async fn send_alerts_with_overrides_and_empty_batch() {
    let ctx = build_test_context().expect("test context should build");
    let kpi = create_kpi(&ctx.app, "FX Exposure", None).await;
    let kpi_id = kpi["id"].as_str().expect("kpi id");
    let alert_id = seed_alert(&ctx, Some(kpi_id), None, "limit breach", 0).await;

    // Empty id list is a 400 with the batch error code
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/alerts/send",
        Some(json!({"alert_ids": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1104);

    // Free-text recipient overrides are tokenized
    let (status, _, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/alerts/send",
        Some(json!({
            "alert_ids": [alert_id],
            "email_to": "cfo@bank.example, treasurer@bank.example\nnot-an-address",
            "subject": "Urgent: FX limits",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let sent = ctx.mailbox.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].to,
        vec![
            "cfo@bank.example".to_string(),
            "treasurer@bank.example".to_string()
        ]
    );
    assert_eq!(sent[0].subject, "Urgent: FX limits");
}

#[tokio::test]
async fn history_export_produces_csv_attachment() {
    let ctx = build_test_context().expect("test context should build");
    let kpi = create_kpi(&ctx.app, "FX Exposure", None).await;
    let kpi_id = kpi["id"].as_str().expect("kpi id");
    let sent_id = seed_alert(&ctx, Some(kpi_id), None, "USD breach", 0).await;
    seed_alert(&ctx, Some(kpi_id), None, "pending breach", 0).await;

    let (status, _, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/alerts/send",
        Some(json!({"alert_ids": [sent_id]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let (status, headers, csv) = request_raw(
        &ctx.app,
        "GET",
        &format!("/v1/history/export?from={today}&to={today}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get("content-type").and_then(|v| v.to_str().ok()),
        Some("text/csv")
    );
    let disposition = headers
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .expect("content-disposition should exist");
    assert_eq!(
        disposition,
        format!("attachment; filename=alert_history_{today}_to_{today}.csv")
    );

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Alert Date,KPI Name,Alert Message");
    // Only the sent alert is exported
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], format!("{today},FX Exposure,USD breach"));
}

#[tokio::test(start_paused = true)]
async fn summarize_returns_markdown_report() {
    let ctx = build_test_context().expect("test context should build");
    let kpi = create_kpi(&ctx.app, "FX Exposure", None).await;
    let kpi_id = kpi["id"].as_str().expect("kpi id");
    let alert_id = seed_alert(&ctx, Some(kpi_id), None, "USD breach", 0).await;

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/summarize",
        Some(json!({"alert_ids": [], "prompt": null})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1104);

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/summarize",
        Some(json!({"alert_ids": [alert_id], "prompt": "focus on treasury"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    assert_eq!(body["data"]["provider"], "mock");
    let content = body["data"]["content"].as_str().expect("content");
    assert!(content.contains("## Alert Summary Report"));
    assert!(content.contains("FX Exposure"));
    assert!(content.contains("focus on treasury"));
}

#[tokio::test]
async fn every_response_carries_a_trace_id_header() {
    let ctx = build_test_context().expect("test context should build");
    let (_, body, trace) = request_no_body(&ctx.app, "GET", "/v1/departments").await;
    let header_trace = trace.expect("x-trace-id header should be set");
    assert_eq!(header_trace.len(), 16);
    assert_eq!(body["trace_id"], header_trace);
}
