use crate::api::pagination::PaginationParams;
use crate::api::{
    error_response, storage_error_response, success_paginated_response, success_response,
};
use crate::logging::TraceId;
use crate::state::AppState;
use ace_storage::{KpiFilter, KpiUpdate, NewKpi};
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KpiListQuery {
    /// 按归属部门过滤
    #[serde(default, rename = "department_id__eq")]
    pub department_id_eq: Option<String>,
    /// 按启用状态过滤
    #[serde(default, rename = "is_active__eq")]
    pub is_active_eq: Option<bool>,
    /// 按名称子串过滤（不区分大小写）
    #[serde(default, rename = "name__contains")]
    pub name_contains: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateKpiRequest {
    /// KPI 名称（必填，不得为空）
    pub name: String,
    pub domain: String,
    #[serde(default)]
    pub description: Option<String>,
    pub alert_table_name: String,
    #[serde(default)]
    pub default_email_to: Vec<String>,
    #[serde(default)]
    pub default_email_cc: Vec<String>,
    #[serde(default)]
    pub default_subject: String,
    #[serde(default)]
    pub default_body: String,
    #[serde(default)]
    pub default_footer: String,
    #[serde(default)]
    pub is_favorite: bool,
    /// 省略或留空时按名称派生
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub severity_tagging: bool,
    #[serde(default)]
    pub owner_department_id: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_automation_enabled: Option<bool>,
    #[serde(default)]
    pub automation_time: Option<String>,
    #[serde(default)]
    pub ai_prompt: Option<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

#[derive(Deserialize, Default, ToSchema)]
pub struct UpdateKpiRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub alert_table_name: Option<String>,
    #[serde(default)]
    pub default_email_to: Option<Vec<String>>,
    #[serde(default)]
    pub default_email_cc: Option<Vec<String>>,
    #[serde(default)]
    pub default_subject: Option<String>,
    #[serde(default)]
    pub default_body: Option<String>,
    #[serde(default)]
    pub default_footer: Option<String>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
    #[serde(default)]
    pub severity_tagging: Option<bool>,
    #[serde(default)]
    pub owner_department_id: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_automation_enabled: Option<bool>,
    #[serde(default)]
    pub automation_time: Option<String>,
    #[serde(default)]
    pub ai_prompt: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// 获取 KPI 列表（按名称升序，过滤条件按 AND 组合）。
#[utoipa::path(
    get,
    path = "/v1/kpis",
    tag = "Kpis",
    params(KpiListQuery, PaginationParams),
    responses(
        (status = 200, description = "KPI 列表", body = Vec<ace_storage::KpiRow>)
    )
)]
async fn list_kpis(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(query): Query<KpiListQuery>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    let filter = KpiFilter {
        department_id_eq: query.department_id_eq,
        is_active_eq: query.is_active_eq,
        name_contains: query.name_contains,
    };
    match state.store.list_kpis(&filter).await {
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

/// 创建 KPI。identifier 留空时按名称派生；重复返回 409。
#[utoipa::path(
    post,
    path = "/v1/kpis",
    tag = "Kpis",
    request_body = CreateKpiRequest,
    responses(
        (status = 201, description = "KPI 已创建", body = ace_storage::KpiRow),
        (status = 400, description = "名称为空", body = crate::api::ApiError),
        (status = 409, description = "identifier 重复", body = crate::api::ApiError)
    )
)]
async fn create_kpi(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<CreateKpiRequest>,
) -> impl IntoResponse {
    if req.name.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "bad_request",
            "KPI name must not be empty",
        );
    }
    let new = NewKpi {
        name: req.name.trim().to_string(),
        domain: req.domain,
        description: req.description,
        alert_table_name: req.alert_table_name,
        default_email_to: req.default_email_to,
        default_email_cc: req.default_email_cc,
        default_subject: req.default_subject,
        default_body: req.default_body,
        default_footer: req.default_footer,
        is_favorite: req.is_favorite,
        identifier: req.identifier,
        severity_tagging: req.severity_tagging,
        owner_department_id: req.owner_department_id,
        icon: req.icon,
        severity: req.severity,
        status: req.status,
        is_automation_enabled: req.is_automation_enabled,
        automation_time: req.automation_time,
        ai_prompt: req.ai_prompt,
        is_active: req.is_active,
    };
    match state.store.create_kpi(new).await {
        Ok(row) => success_response(StatusCode::CREATED, &trace_id, row),
        Err(e) => storage_error_response(&trace_id, e),
    }
}

/// 更新 KPI。
#[utoipa::path(
    put,
    path = "/v1/kpis/{id}",
    tag = "Kpis",
    params(("id" = String, Path, description = "KPI ID")),
    request_body = UpdateKpiRequest,
    responses(
        (status = 200, description = "KPI 已更新", body = ace_storage::KpiRow),
        (status = 404, description = "KPI 不存在", body = crate::api::ApiError)
    )
)]
async fn update_kpi(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateKpiRequest>,
) -> impl IntoResponse {
    if let Some(ref name) = req.name {
        if name.trim().is_empty() {
            return error_response(
                StatusCode::BAD_REQUEST,
                &trace_id,
                "bad_request",
                "KPI name must not be empty",
            );
        }
    }
    let update = KpiUpdate {
        name: req.name.map(|n| n.trim().to_string()),
        domain: req.domain,
        description: req.description,
        alert_table_name: req.alert_table_name,
        default_email_to: req.default_email_to,
        default_email_cc: req.default_email_cc,
        default_subject: req.default_subject,
        default_body: req.default_body,
        default_footer: req.default_footer,
        is_favorite: req.is_favorite,
        severity_tagging: req.severity_tagging,
        owner_department_id: req.owner_department_id,
        icon: req.icon,
        severity: req.severity,
        status: req.status,
        is_automation_enabled: req.is_automation_enabled,
        automation_time: req.automation_time,
        ai_prompt: req.ai_prompt,
        is_active: req.is_active,
    };
    match state.store.update_kpi(&id, update).await {
        Ok(row) => success_response(StatusCode::OK, &trace_id, row),
        Err(e) => storage_error_response(&trace_id, e),
    }
}

pub fn kpi_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_kpis, create_kpi))
        .routes(routes!(update_kpi))
}
