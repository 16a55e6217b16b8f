use crate::api::pagination::PaginationParams;
use crate::api::{
    error_response, storage_error_response, success_empty_response, success_paginated_response,
    success_response,
};
use crate::logging::TraceId;
use crate::state::AppState;
use ace_storage::{DepartmentUpdate, NewDepartment};
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Deserialize, ToSchema)]
pub struct CreateDepartmentRequest {
    /// 部门名称（必填，不得为空）
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateDepartmentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// 获取部门列表（按名称升序）。
#[utoipa::path(
    get,
    path = "/v1/departments",
    tag = "Departments",
    params(PaginationParams),
    responses(
        (status = 200, description = "部门列表", body = Vec<ace_storage::DepartmentRow>)
    )
)]
async fn list_departments(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    match state.store.list_departments().await {
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

/// 创建部门。
#[utoipa::path(
    post,
    path = "/v1/departments",
    tag = "Departments",
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "部门已创建", body = ace_storage::DepartmentRow),
        (status = 400, description = "名称为空", body = crate::api::ApiError)
    )
)]
async fn create_department(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<CreateDepartmentRequest>,
) -> impl IntoResponse {
    // 校验先于任何存储调用
    if req.name.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "bad_request",
            "Department name must not be empty",
        );
    }
    let new = NewDepartment {
        name: req.name.trim().to_string(),
        description: req.description,
        icon: req.icon,
    };
    match state.store.create_department(new).await {
        Ok(row) => success_response(StatusCode::CREATED, &trace_id, row),
        Err(e) => storage_error_response(&trace_id, e),
    }
}

/// 更新部门。
#[utoipa::path(
    put,
    path = "/v1/departments/{id}",
    tag = "Departments",
    params(("id" = String, Path, description = "部门 ID")),
    request_body = UpdateDepartmentRequest,
    responses(
        (status = 200, description = "部门已更新", body = ace_storage::DepartmentRow),
        (status = 404, description = "部门不存在", body = crate::api::ApiError)
    )
)]
async fn update_department(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateDepartmentRequest>,
) -> impl IntoResponse {
    if let Some(ref name) = req.name {
        if name.trim().is_empty() {
            return error_response(
                StatusCode::BAD_REQUEST,
                &trace_id,
                "bad_request",
                "Department name must not be empty",
            );
        }
    }
    let update = DepartmentUpdate {
        name: req.name.map(|n| n.trim().to_string()),
        description: req.description,
        icon: req.icon,
    };
    match state.store.update_department(&id, update).await {
        Ok(row) => success_response(StatusCode::OK, &trace_id, row),
        Err(e) => storage_error_response(&trace_id, e),
    }
}

/// 删除部门。仍有 KPI 归属时返回 409。
#[utoipa::path(
    delete,
    path = "/v1/departments/{id}",
    tag = "Departments",
    params(("id" = String, Path, description = "部门 ID")),
    responses(
        (status = 200, description = "部门已删除"),
        (status = 404, description = "部门不存在", body = crate::api::ApiError),
        (status = 409, description = "仍有 KPI 引用该部门", body = crate::api::ApiError)
    )
)]
async fn delete_department(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.delete_department(&id).await {
        Ok(()) => success_empty_response(StatusCode::OK, &trace_id, "Department deleted"),
        Err(e) => storage_error_response(&trace_id, e),
    }
}

pub fn department_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_departments, create_department))
        .routes(routes!(update_department, delete_department))
}
