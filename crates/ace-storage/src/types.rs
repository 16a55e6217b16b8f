use ace_common::types::{AlertState, DateRange};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---- 部门 ----

/// 部门行（departments 表）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DepartmentRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 新建部门入参。`name` 不得为空，由调用方校验。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDepartment {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// 部门更新入参，`None` 字段保持原值。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartmentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

// ---- KPI ----

/// KPI 行（kpis 表）。邮件列表列在数据库中以 JSON 数组字符串存储。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct KpiRow {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub description: Option<String>,
    pub alert_table_name: String,
    pub default_email_to: Vec<String>,
    pub default_email_cc: Vec<String>,
    pub default_subject: String,
    pub default_body: String,
    pub default_footer: String,
    pub is_favorite: bool,
    pub identifier: Option<String>,
    pub severity_tagging: bool,
    pub owner_department_id: Option<String>,
    pub icon: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub is_automation_enabled: Option<bool>,
    pub automation_time: Option<String>,
    pub ai_prompt: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 新建 KPI 入参。`identifier` 为空时由存储层按名称派生。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewKpi {
    pub name: String,
    pub domain: String,
    pub description: Option<String>,
    pub alert_table_name: String,
    pub default_email_to: Vec<String>,
    pub default_email_cc: Vec<String>,
    pub default_subject: String,
    pub default_body: String,
    pub default_footer: String,
    pub is_favorite: bool,
    pub identifier: Option<String>,
    pub severity_tagging: bool,
    pub owner_department_id: Option<String>,
    pub icon: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub is_automation_enabled: Option<bool>,
    pub automation_time: Option<String>,
    pub ai_prompt: Option<String>,
    pub is_active: bool,
}

/// KPI 更新入参，`None` 字段保持原值。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KpiUpdate {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub description: Option<String>,
    pub alert_table_name: Option<String>,
    pub default_email_to: Option<Vec<String>>,
    pub default_email_cc: Option<Vec<String>>,
    pub default_subject: Option<String>,
    pub default_body: Option<String>,
    pub default_footer: Option<String>,
    pub is_favorite: Option<bool>,
    pub severity_tagging: Option<bool>,
    pub owner_department_id: Option<String>,
    pub icon: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub is_automation_enabled: Option<bool>,
    pub automation_time: Option<String>,
    pub ai_prompt: Option<String>,
    pub is_active: Option<bool>,
}

/// KPI 过滤条件，多个条件按 AND 组合。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiFilter {
    pub department_id_eq: Option<String>,
    pub is_active_eq: Option<bool>,
    pub name_contains: Option<String>,
}

// ---- 告警 ----

/// 告警行（alerts 表）。生命周期状态不落库，由时间戳推导。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AlertRow {
    pub id: String,
    pub alert_id: String,
    pub alert_date: DateTime<Utc>,
    pub alert_detail: String,
    pub comment: Option<String>,
    pub curated_date: Option<DateTime<Utc>>,
    pub department_id: Option<String>,
    pub kpi_id: Option<String>,
    pub sent_date: Option<DateTime<Utc>>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AlertRow {
    /// pending / curated / sent，sent 优先。
    pub fn state(&self) -> AlertState {
        AlertState::from_dates(self.curated_date, self.sent_date)
    }
}

/// 新建告警入参（检测作业或演示种子写入）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAlert {
    pub alert_id: String,
    pub alert_date: DateTime<Utc>,
    pub alert_detail: String,
    pub comment: Option<String>,
    pub department_id: Option<String>,
    pub kpi_id: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
}

/// 告警更新入参（策展或发送盖章）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertUpdate {
    pub comment: Option<String>,
    pub curated_date: Option<DateTime<Utc>>,
    pub sent_date: Option<DateTime<Utc>>,
    pub severity: Option<String>,
    pub status: Option<String>,
}

impl AlertUpdate {
    pub fn is_empty(&self) -> bool {
        self.comment.is_none()
            && self.curated_date.is_none()
            && self.sent_date.is_none()
            && self.severity.is_none()
            && self.status.is_none()
    }
}

/// 告警过滤条件，多个条件按 AND 组合；日期区间两端均含。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertFilter {
    pub date_range: Option<DateRange>,
    pub kpi_id_eq: Option<String>,
    pub department_id_eq: Option<String>,
    pub status_eq: Option<String>,
    pub severity_eq: Option<String>,
}

// ---- 发送历史 ----

/// 发送历史行（alert_history 表），只追加。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AlertHistoryRow {
    pub id: String,
    pub alert_id: Option<String>,
    pub kpi_id: Option<String>,
    pub subject: String,
    pub body: String,
    pub recipient_emails: Vec<String>,
    pub sent_date: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// 新建发送历史入参。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAlertHistory {
    pub alert_id: Option<String>,
    pub kpi_id: Option<String>,
    pub subject: String,
    pub body: String,
    pub recipient_emails: Vec<String>,
    pub sent_date: DateTime<Utc>,
    pub status: String,
}

/// 发送历史过滤条件。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub sent_range: Option<DateRange>,
    pub kpi_id_eq: Option<String>,
}
