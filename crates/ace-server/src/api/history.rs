use std::collections::HashMap;

use crate::api::alerts::range_from_params;
use crate::api::pagination::PaginationParams;
use crate::api::{error_response, storage_error_response, success_paginated_response};
use crate::logging::TraceId;
use crate::state::AppState;
use ace_storage::{AlertFilter, HistoryFilter, KpiFilter};
use axum::extract::{Extension, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryListQuery {
    /// 起始发送日期（RFC3339 或 YYYY-MM-DD，含当天）
    #[serde(default, rename = "sent_date__gte")]
    pub sent_date_gte: Option<String>,
    /// 截止发送日期（RFC3339 或 YYYY-MM-DD，含当天）
    #[serde(default, rename = "sent_date__lte")]
    pub sent_date_lte: Option<String>,
    #[serde(default, rename = "kpi_id__eq")]
    pub kpi_id_eq: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// 起始日期（YYYY-MM-DD，含当天）
    #[serde(default)]
    pub from: Option<String>,
    /// 截止日期（YYYY-MM-DD，含当天）
    #[serde(default)]
    pub to: Option<String>,
}

/// 获取发送历史（按 sent_date 倒序）。
#[utoipa::path(
    get,
    path = "/v1/history",
    tag = "History",
    params(HistoryListQuery, PaginationParams),
    responses(
        (status = 200, description = "发送历史列表", body = Vec<ace_storage::AlertHistoryRow>),
        (status = 400, description = "日期参数无效", body = crate::api::ApiError)
    )
)]
async fn list_history(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(query): Query<HistoryListQuery>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    let sent_range = match range_from_params(
        query.sent_date_gte.as_deref(),
        query.sent_date_lte.as_deref(),
    ) {
        Ok(range) => range,
        Err(msg) => {
            return error_response(StatusCode::BAD_REQUEST, &trace_id, "bad_request", &msg)
        }
    };
    let filter = HistoryFilter {
        sent_range,
        kpi_id_eq: query.kpi_id_eq,
    };
    match state.store.list_history(&filter).await {
        Ok(rows) => {
            let (items, total) = pagination.slice(&rows);
            success_paginated_response(
                StatusCode::OK,
                &trace_id,
                items,
                total,
                pagination.limit(),
                pagination.offset(),
            )
        }
        Err(e) => storage_error_response(&trace_id, e),
    }
}

/// 导出指定日期区间内已发送告警的 CSV。
///
/// 列固定为 Alert Date / KPI Name / Alert Message，字段按原样逗号
/// 拼接，与既有下游解析保持一致。
#[utoipa::path(
    get,
    path = "/v1/history/export",
    tag = "History",
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV 文件", content_type = "text/csv"),
        (status = 400, description = "日期参数无效", body = crate::api::ApiError)
    )
)]
async fn export_history(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> impl IntoResponse {
    let date_range = match range_from_params(query.from.as_deref(), query.to.as_deref()) {
        Ok(range) => range,
        Err(msg) => {
            return error_response(StatusCode::BAD_REQUEST, &trace_id, "bad_request", &msg)
        }
    };

    let filter = AlertFilter {
        date_range,
        ..AlertFilter::default()
    };
    let alerts = match state.store.list_alerts(&filter).await {
        Ok(rows) => rows,
        Err(e) => return storage_error_response(&trace_id, e),
    };

    // KPI 名称查找表
    let kpis = match state.store.list_kpis(&KpiFilter::default()).await {
        Ok(rows) => rows,
        Err(e) => return storage_error_response(&trace_id, e),
    };
    let kpi_names: HashMap<&str, &str> = kpis
        .iter()
        .map(|k| (k.id.as_str(), k.name.as_str()))
        .collect();

    let mut csv = String::from("Alert Date,KPI Name,Alert Message\n");
    for alert in alerts.iter().filter(|a| a.sent_date.is_some()) {
        let kpi_name = alert
            .kpi_id
            .as_deref()
            .and_then(|id| kpi_names.get(id).copied())
            .unwrap_or("Unknown");
        csv.push_str(&format!(
            "{},{},{}\n",
            alert.alert_date.format("%Y-%m-%d"),
            kpi_name,
            alert.alert_detail,
        ));
    }

    let from_label = query.from.as_deref().unwrap_or("all");
    let to_label = query.to.as_deref().unwrap_or("all");
    let filename = format!("alert_history_{from_label}_to_{to_label}.csv");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={filename}"),
        )
        .body(axum::body::Body::from(csv))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

pub fn history_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_history))
        .routes(routes!(export_history))
}
