use std::collections::BTreeMap;

use crate::api::pagination::PaginationParams;
use crate::api::{
    error_response, storage_error_response, success_paginated_response, success_response,
};
use crate::logging::TraceId;
use crate::state::AppState;
use ace_common::types::DateRange;
use ace_notify::utils::parse_email_tokens;
use ace_notify::{compose_mail, AlertLine, MailDefaults, MailOverrides};
use ace_storage::{AlertFilter, AlertRow, AlertUpdate, NewAlertHistory};
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

/// 告警视图：行数据加推导的生命周期状态。
#[derive(Serialize, ToSchema)]
pub struct AlertView {
    #[serde(flatten)]
    #[schema(inline)]
    pub row: AlertRow,
    /// pending / curated / sent
    pub state: String,
}

impl From<AlertRow> for AlertView {
    fn from(row: AlertRow) -> Self {
        let state = row.state().as_str().to_string();
        Self { row, state }
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AlertListQuery {
    /// 起始日期（RFC3339 或 YYYY-MM-DD，含当天）
    #[serde(default, rename = "alert_date__gte")]
    pub alert_date_gte: Option<String>,
    /// 截止日期（RFC3339 或 YYYY-MM-DD，含当天）
    #[serde(default, rename = "alert_date__lte")]
    pub alert_date_lte: Option<String>,
    #[serde(default, rename = "kpi_id__eq")]
    pub kpi_id_eq: Option<String>,
    #[serde(default, rename = "department_id__eq")]
    pub department_id_eq: Option<String>,
    #[serde(default, rename = "status__eq")]
    pub status_eq: Option<String>,
    #[serde(default, rename = "severity__eq")]
    pub severity_eq: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CurateAlertRequest {
    /// 策展备注；提供时同时盖 curated_date 章
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SendAlertsRequest {
    /// 待发送的告警 ID 列表（不得为空）
    pub alert_ids: Vec<String>,
    /// 收件人覆盖（逗号/换行分隔的自由文本）
    #[serde(default)]
    pub email_to: Option<String>,
    /// 抄送覆盖
    #[serde(default)]
    pub email_cc: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// 批量发送结果。
#[derive(Serialize, ToSchema)]
pub struct SendAlertsResponse {
    /// 请求的 ID 数
    pub requested: usize,
    /// 实际盖章发送的条数
    pub updated: usize,
    /// 跳过的条数（不存在或已发送）
    pub skipped: usize,
}

/// 解析日期参数：先按 RFC3339，再退回 YYYY-MM-DD（按当天起止补齐时间）。
pub(crate) fn parse_date_param(raw: &str, end_of_day: bool) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)?
    } else {
        date.and_hms_opt(0, 0, 0)?
    };
    Some(Utc.from_utc_datetime(&time))
}

/// 由可选的 gte/lte 参数构造闭区间，缺失的一端取极值。
pub(crate) fn range_from_params(
    gte: Option<&str>,
    lte: Option<&str>,
) -> Result<Option<DateRange>, String> {
    if gte.is_none() && lte.is_none() {
        return Ok(None);
    }
    let from = match gte {
        Some(raw) => parse_date_param(raw, false)
            .ok_or_else(|| format!("Invalid date parameter: {raw}"))?,
        None => DateTime::<Utc>::MIN_UTC,
    };
    let to = match lte {
        Some(raw) => {
            parse_date_param(raw, true).ok_or_else(|| format!("Invalid date parameter: {raw}"))?
        }
        None => DateTime::<Utc>::MAX_UTC,
    };
    Ok(Some(DateRange::new(from, to)))
}

/// 获取告警列表（按 alert_date 倒序，过滤条件按 AND 组合）。
#[utoipa::path(
    get,
    path = "/v1/alerts",
    tag = "Alerts",
    params(AlertListQuery, PaginationParams),
    responses(
        (status = 200, description = "告警列表", body = Vec<AlertView>),
        (status = 400, description = "日期参数无效", body = crate::api::ApiError)
    )
)]
async fn list_alerts(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(query): Query<AlertListQuery>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    let date_range = match range_from_params(
        query.alert_date_gte.as_deref(),
        query.alert_date_lte.as_deref(),
    ) {
        Ok(range) => range,
        Err(msg) => {
            return error_response(StatusCode::BAD_REQUEST, &trace_id, "bad_request", &msg)
        }
    };
    let filter = AlertFilter {
        date_range,
        kpi_id_eq: query.kpi_id_eq,
        department_id_eq: query.department_id_eq,
        status_eq: query.status_eq,
        severity_eq: query.severity_eq,
    };
    match state.store.list_alerts(&filter).await {
        Ok(rows) => {
            let (items, total) = pagination.slice(&rows);
            let views: Vec<AlertView> = items.into_iter().map(AlertView::from).collect();
            success_paginated_response(
                StatusCode::OK,
                &trace_id,
                views,
                total,
                pagination.limit(),
                pagination.offset(),
            )
        }
        Err(e) => storage_error_response(&trace_id, e),
    }
}

/// 策展告警：写备注并盖 curated_date 章。已发送的告警返回 409。
#[utoipa::path(
    put,
    path = "/v1/alerts/{id}",
    tag = "Alerts",
    params(("id" = String, Path, description = "告警 ID")),
    request_body = CurateAlertRequest,
    responses(
        (status = 200, description = "告警已更新", body = AlertView),
        (status = 404, description = "告警不存在", body = crate::api::ApiError),
        (status = 409, description = "告警已发送，不可修改", body = crate::api::ApiError)
    )
)]
async fn curate_alert(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CurateAlertRequest>,
) -> impl IntoResponse {
    let curated_date = req.comment.as_ref().map(|_| Utc::now());
    let update = AlertUpdate {
        comment: req.comment,
        curated_date,
        sent_date: None,
        severity: req.severity,
        status: req.status,
    };
    if update.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "bad_request",
            "Update must set at least one field",
        );
    }
    match state.store.update_alert(&id, update).await {
        Ok(row) => success_response(StatusCode::OK, &trace_id, AlertView::from(row)),
        Err(e) => storage_error_response(&trace_id, e),
    }
}

/// 批量发送告警邮件。
///
/// 按 KPI 分组合成邮件，经通知渠道投递后为成功组盖 sent_date 章并
/// 追加一条发送历史。缺失或已发送的 ID 跳过，不算错误。
#[utoipa::path(
    post,
    path = "/v1/alerts/send",
    tag = "Alerts",
    request_body = SendAlertsRequest,
    responses(
        (status = 200, description = "发送完成", body = SendAlertsResponse),
        (status = 400, description = "ID 列表为空", body = crate::api::ApiError)
    )
)]
async fn send_alerts(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<SendAlertsRequest>,
) -> impl IntoResponse {
    if req.alert_ids.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "empty_batch",
            "alert_ids must not be empty",
        );
    }
    let requested = req.alert_ids.len();

    // 逐条取回，丢弃缺失与已发送的
    let mut sendable: Vec<AlertRow> = Vec::new();
    for id in &req.alert_ids {
        match state.store.get_alert(id).await {
            Ok(Some(alert)) if alert.sent_date.is_none() => sendable.push(alert),
            Ok(_) => {}
            Err(e) => return storage_error_response(&trace_id, e),
        }
    }

    let overrides = MailOverrides {
        to: req.email_to.as_deref().map(parse_email_tokens),
        cc: req.email_cc.as_deref().map(parse_email_tokens),
        subject: req.subject.clone(),
        body: req.body.clone(),
    };

    // 按 KPI 分组，一组一封邮件
    let mut groups: BTreeMap<Option<String>, Vec<AlertRow>> = BTreeMap::new();
    for alert in sendable {
        groups.entry(alert.kpi_id.clone()).or_default().push(alert);
    }

    let mut updated = 0usize;
    for (kpi_id, alerts) in groups {
        let kpi = match kpi_id.as_deref() {
            Some(id) => match state.store.get_kpi(id).await {
                Ok(kpi) => kpi,
                Err(e) => return storage_error_response(&trace_id, e),
            },
            None => None,
        };

        let defaults = match &kpi {
            Some(k) => MailDefaults {
                to: k.default_email_to.clone(),
                cc: k.default_email_cc.clone(),
                subject: k.default_subject.clone(),
                body: k.default_body.clone(),
                footer: k.default_footer.clone(),
            },
            None => MailDefaults::default(),
        };

        let lines: Vec<AlertLine> = alerts
            .iter()
            .map(|a| AlertLine {
                alert_date: a.alert_date,
                detail: a.alert_detail.clone(),
                severity: a.severity.clone(),
                comment: a.comment.clone(),
            })
            .collect();

        let mail = compose_mail(state.renderer.as_ref(), &defaults, &lines, &overrides);
        let sent_date = Utc::now();

        let (delivered, status) = match state.notifier.send(&mail).await {
            Ok(response) if response.all_succeeded() => (true, "sent"),
            Ok(_) => (false, "partial_failure"),
            Err(e) => {
                tracing::error!(error = %e, kpi_id = ?kpi_id, "Mail dispatch failed");
                (false, "failed")
            }
        };

        if delivered {
            let ids: Vec<String> = alerts.iter().map(|a| a.id.clone()).collect();
            let stamp = AlertUpdate {
                sent_date: Some(sent_date),
                status: Some("sent".to_string()),
                ..AlertUpdate::default()
            };
            match state.store.bulk_update_alerts(&ids, stamp).await {
                Ok(rows) => updated += rows.len(),
                Err(e) => return storage_error_response(&trace_id, e),
            }
        }

        let history = NewAlertHistory {
            alert_id: alerts.first().map(|a| a.id.clone()),
            kpi_id: kpi_id.clone(),
            subject: mail.subject.clone(),
            body: mail.body.clone(),
            recipient_emails: mail.to.clone(),
            sent_date,
            status: status.to_string(),
        };
        if let Err(e) = state.store.insert_history(history).await {
            return storage_error_response(&trace_id, e);
        }
    }

    success_response(
        StatusCode::OK,
        &trace_id,
        SendAlertsResponse {
            requested,
            updated,
            skipped: requested - updated,
        },
    )
}

pub fn alert_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_alerts))
        .routes(routes!(curate_alert))
        .routes(routes!(send_alerts))
}
