use std::collections::HashMap;

use crate::api::{error_response, storage_error_response, success_response};
use crate::logging::TraceId;
use crate::state::AppState;
use ace_ai::{AlertDigestLine, SummaryInput};
use ace_storage::KpiFilter;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Deserialize, ToSchema)]
pub struct SummarizeRequest {
    /// 待汇总的告警 ID 列表（不得为空）
    pub alert_ids: Vec<String>,
    /// 附加提示词（可选）
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SummarizeResponse {
    /// Markdown 格式报告
    pub content: String,
    /// 提供商名称（当前为 mock）
    pub provider: String,
}

/// 汇总选中的告警，生成 Markdown 报告。
#[utoipa::path(
    post,
    path = "/v1/summarize",
    tag = "Summarize",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "汇总报告", body = SummarizeResponse),
        (status = 400, description = "ID 列表为空", body = crate::api::ApiError)
    )
)]
async fn summarize(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> impl IntoResponse {
    if req.alert_ids.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "empty_batch",
            "alert_ids must not be empty",
        );
    }

    let kpis = match state.store.list_kpis(&KpiFilter::default()).await {
        Ok(rows) => rows,
        Err(e) => return storage_error_response(&trace_id, e),
    };
    let kpi_names: HashMap<String, String> = kpis
        .into_iter()
        .map(|k| (k.id, k.name))
        .collect();

    let mut lines = Vec::new();
    for id in &req.alert_ids {
        match state.store.get_alert(id).await {
            Ok(Some(alert)) => lines.push(AlertDigestLine {
                alert_date: alert.alert_date,
                kpi_name: alert
                    .kpi_id
                    .as_deref()
                    .and_then(|id| kpi_names.get(id).cloned())
                    .unwrap_or_else(|| "Unknown".to_string()),
                detail: alert.alert_detail,
                severity: alert.severity,
                comment: alert.comment,
            }),
            Ok(None) => {}
            Err(e) => return storage_error_response(&trace_id, e),
        }
    }

    let input = SummaryInput {
        alerts: lines,
        prompt: req.prompt,
    };
    match state.summarizer.summarize(input).await {
        Ok(result) => success_response(
            StatusCode::OK,
            &trace_id,
            SummarizeResponse {
                content: result.content,
                provider: state.summarizer.provider().to_string(),
            },
        ),
        Err(e) => {
            tracing::error!(error = %e, "Summarizer failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "internal_error",
                "Summarization failed",
            )
        }
    }
}

pub fn summarize_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(summarize))
}
