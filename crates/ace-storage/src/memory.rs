//! In-memory record store.
//!
//! Backs the server when `backend = "memory"` is configured and every
//! storage-level test. Same ordering and conflict semantics as the
//! database adapter, without a database.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Result, StorageError};
use crate::types::*;
use crate::RecordStore;

#[derive(Default)]
struct Inner {
    departments: Vec<DepartmentRow>,
    kpis: Vec<KpiRow>,
    alerts: Vec<AlertRow>,
    history: Vec<AlertHistoryRow>,
}

/// Mutex-guarded vectors behind the [`RecordStore`] port.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_alert_update(row: &mut AlertRow, update: &AlertUpdate) {
    if let Some(ref comment) = update.comment {
        row.comment = Some(comment.clone());
    }
    if let Some(curated) = update.curated_date {
        row.curated_date = Some(curated);
    }
    if let Some(sent) = update.sent_date {
        row.sent_date = Some(sent);
    }
    if let Some(ref severity) = update.severity {
        row.severity = Some(severity.clone());
    }
    if let Some(ref status) = update.status {
        row.status = Some(status.clone());
    }
}

fn matches_alert(row: &AlertRow, filter: &AlertFilter) -> bool {
    if let Some(range) = filter.date_range {
        if !range.contains(row.alert_date) {
            return false;
        }
    }
    if let Some(ref kpi) = filter.kpi_id_eq {
        if row.kpi_id.as_deref() != Some(kpi.as_str()) {
            return false;
        }
    }
    if let Some(ref dept) = filter.department_id_eq {
        if row.department_id.as_deref() != Some(dept.as_str()) {
            return false;
        }
    }
    if let Some(ref status) = filter.status_eq {
        if row.status.as_deref() != Some(status.as_str()) {
            return false;
        }
    }
    if let Some(ref severity) = filter.severity_eq {
        if row.severity.as_deref() != Some(severity.as_str()) {
            return false;
        }
    }
    true
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_departments(&self) -> Result<Vec<DepartmentRow>> {
        let inner = self.inner.lock().unwrap();
        let mut rows = inner.departments.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_department(&self, id: &str) -> Result<Option<DepartmentRow>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.departments.iter().find(|d| d.id == id).cloned())
    }

    async fn create_department(&self, new: NewDepartment) -> Result<DepartmentRow> {
        let now = Utc::now();
        let row = DepartmentRow {
            id: ace_common::id::next_id(),
            name: new.name,
            description: new.description,
            icon: new.icon,
            created_at: now,
            updated_at: now,
        };
        let mut inner = self.inner.lock().unwrap();
        inner.departments.push(row.clone());
        Ok(row)
    }

    async fn update_department(
        &self,
        id: &str,
        update: DepartmentUpdate,
    ) -> Result<DepartmentRow> {
        let mut inner = self.inner.lock().unwrap();
        let row = inner
            .departments
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StorageError::NotFound {
                entity: "department",
                id: id.to_string(),
            })?;
        if let Some(name) = update.name {
            row.name = name;
        }
        if let Some(desc) = update.description {
            row.description = Some(desc);
        }
        if let Some(icon) = update.icon {
            row.icon = Some(icon);
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_department(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.departments.iter().any(|d| d.id == id) {
            return Err(StorageError::NotFound {
                entity: "department",
                id: id.to_string(),
            });
        }
        let referencing = inner
            .kpis
            .iter()
            .filter(|k| k.owner_department_id.as_deref() == Some(id))
            .count();
        if referencing > 0 {
            return Err(StorageError::Conflict {
                entity: "department",
                reason: format!("{referencing} KPI(s) still reference department {id}"),
            });
        }
        inner.departments.retain(|d| d.id != id);
        Ok(())
    }

    async fn list_kpis(&self, filter: &KpiFilter) -> Result<Vec<KpiRow>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<KpiRow> = inner
            .kpis
            .iter()
            .filter(|k| {
                if let Some(ref dept) = filter.department_id_eq {
                    if k.owner_department_id.as_deref() != Some(dept.as_str()) {
                        return false;
                    }
                }
                if let Some(active) = filter.is_active_eq {
                    if k.is_active != active {
                        return false;
                    }
                }
                if let Some(ref name) = filter.name_contains {
                    if !k.name.to_lowercase().contains(&name.to_lowercase()) {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_kpi(&self, id: &str) -> Result<Option<KpiRow>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.kpis.iter().find(|k| k.id == id).cloned())
    }

    async fn create_kpi(&self, new: NewKpi) -> Result<KpiRow> {
        let identifier = match new.identifier.as_deref() {
            Some(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => ace_common::slug::derive_identifier(&new.name),
        };
        let now = Utc::now();
        let mut inner = self.inner.lock().unwrap();
        if inner
            .kpis
            .iter()
            .any(|k| k.identifier.as_deref() == Some(identifier.as_str()))
        {
            return Err(StorageError::Conflict {
                entity: "kpi",
                reason: format!("identifier '{identifier}' already in use"),
            });
        }
        let row = KpiRow {
            id: ace_common::id::next_id(),
            name: new.name,
            domain: new.domain,
            description: new.description,
            alert_table_name: new.alert_table_name,
            default_email_to: new.default_email_to,
            default_email_cc: new.default_email_cc,
            default_subject: new.default_subject,
            default_body: new.default_body,
            default_footer: new.default_footer,
            is_favorite: new.is_favorite,
            identifier: Some(identifier),
            severity_tagging: new.severity_tagging,
            owner_department_id: new.owner_department_id,
            icon: new.icon,
            severity: new.severity,
            status: new.status,
            is_automation_enabled: new.is_automation_enabled,
            automation_time: new.automation_time,
            ai_prompt: new.ai_prompt,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        };
        inner.kpis.push(row.clone());
        Ok(row)
    }

    async fn update_kpi(&self, id: &str, update: KpiUpdate) -> Result<KpiRow> {
        let mut inner = self.inner.lock().unwrap();
        let row = inner
            .kpis
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or_else(|| StorageError::NotFound {
                entity: "kpi",
                id: id.to_string(),
            })?;
        if let Some(name) = update.name {
            row.name = name;
        }
        if let Some(domain) = update.domain {
            row.domain = domain;
        }
        if let Some(desc) = update.description {
            row.description = Some(desc);
        }
        if let Some(table) = update.alert_table_name {
            row.alert_table_name = table;
        }
        if let Some(to) = update.default_email_to {
            row.default_email_to = to;
        }
        if let Some(cc) = update.default_email_cc {
            row.default_email_cc = cc;
        }
        if let Some(subject) = update.default_subject {
            row.default_subject = subject;
        }
        if let Some(body) = update.default_body {
            row.default_body = body;
        }
        if let Some(footer) = update.default_footer {
            row.default_footer = footer;
        }
        if let Some(fav) = update.is_favorite {
            row.is_favorite = fav;
        }
        if let Some(tagging) = update.severity_tagging {
            row.severity_tagging = tagging;
        }
        if let Some(dept) = update.owner_department_id {
            row.owner_department_id = Some(dept);
        }
        if let Some(icon) = update.icon {
            row.icon = Some(icon);
        }
        if let Some(severity) = update.severity {
            row.severity = Some(severity);
        }
        if let Some(status) = update.status {
            row.status = Some(status);
        }
        if let Some(auto) = update.is_automation_enabled {
            row.is_automation_enabled = Some(auto);
        }
        if let Some(time) = update.automation_time {
            row.automation_time = Some(time);
        }
        if let Some(prompt) = update.ai_prompt {
            row.ai_prompt = Some(prompt);
        }
        if let Some(active) = update.is_active {
            row.is_active = active;
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<AlertRow>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<AlertRow> = inner
            .alerts
            .iter()
            .filter(|a| matches_alert(a, filter))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.alert_date.cmp(&a.alert_date));
        Ok(rows)
    }

    async fn get_alert(&self, id: &str) -> Result<Option<AlertRow>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.alerts.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_alert(&self, new: NewAlert) -> Result<AlertRow> {
        let row = AlertRow {
            id: ace_common::id::next_id(),
            alert_id: new.alert_id,
            alert_date: new.alert_date,
            alert_detail: new.alert_detail,
            comment: new.comment,
            curated_date: None,
            department_id: new.department_id,
            kpi_id: new.kpi_id,
            sent_date: None,
            severity: new.severity,
            status: new.status,
            created_at: Utc::now(),
        };
        let mut inner = self.inner.lock().unwrap();
        inner.alerts.push(row.clone());
        Ok(row)
    }

    async fn update_alert(&self, id: &str, update: AlertUpdate) -> Result<AlertRow> {
        let mut inner = self.inner.lock().unwrap();
        let row = inner
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StorageError::NotFound {
                entity: "alert",
                id: id.to_string(),
            })?;
        if row.sent_date.is_some() {
            return Err(StorageError::Conflict {
                entity: "alert",
                reason: format!("alert {id} was already sent"),
            });
        }
        apply_alert_update(row, &update);
        Ok(row.clone())
    }

    async fn bulk_update_alerts(
        &self,
        ids: &[String],
        update: AlertUpdate,
    ) -> Result<Vec<AlertRow>> {
        let mut inner = self.inner.lock().unwrap();
        let mut updated = Vec::new();
        for row in inner.alerts.iter_mut() {
            if !ids.contains(&row.id) || row.sent_date.is_some() {
                continue;
            }
            apply_alert_update(row, &update);
            updated.push(row.clone());
        }
        updated.sort_by(|a, b| b.alert_date.cmp(&a.alert_date));
        Ok(updated)
    }

    async fn list_history(&self, filter: &HistoryFilter) -> Result<Vec<AlertHistoryRow>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<AlertHistoryRow> = inner
            .history
            .iter()
            .filter(|h| {
                if let Some(range) = filter.sent_range {
                    if !range.contains(h.sent_date) {
                        return false;
                    }
                }
                if let Some(ref kpi) = filter.kpi_id_eq {
                    if h.kpi_id.as_deref() != Some(kpi.as_str()) {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.sent_date.cmp(&a.sent_date));
        Ok(rows)
    }

    async fn insert_history(&self, new: NewAlertHistory) -> Result<AlertHistoryRow> {
        let row = AlertHistoryRow {
            id: ace_common::id::next_id(),
            alert_id: new.alert_id,
            kpi_id: new.kpi_id,
            subject: new.subject,
            body: new.body,
            recipient_emails: new.recipient_emails,
            sent_date: new.sent_date,
            status: new.status,
            created_at: Utc::now(),
        };
        let mut inner = self.inner.lock().unwrap();
        inner.history.push(row.clone());
        Ok(row)
    }
}
