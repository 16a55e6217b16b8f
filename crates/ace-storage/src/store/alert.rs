use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder,
};

use crate::entities::alert::{self, Column as AlertCol, Entity as AlertEntity};
use crate::error::{Result, StorageError};
use crate::store::DbStore;
use crate::types::{AlertFilter, AlertRow, AlertUpdate, NewAlert};

fn model_to_row(m: alert::Model) -> AlertRow {
    AlertRow {
        id: m.id,
        alert_id: m.alert_id,
        alert_date: m.alert_date.with_timezone(&Utc),
        alert_detail: m.alert_detail,
        comment: m.comment,
        curated_date: m.curated_date.map(|d| d.with_timezone(&Utc)),
        department_id: m.department_id,
        kpi_id: m.kpi_id,
        sent_date: m.sent_date.map(|d| d.with_timezone(&Utc)),
        severity: m.severity,
        status: m.status,
        created_at: m.created_at.with_timezone(&Utc),
    }
}

fn apply_update(am: &mut alert::ActiveModel, update: &AlertUpdate) {
    if let Some(ref comment) = update.comment {
        am.comment = Set(Some(comment.clone()));
    }
    if let Some(curated) = update.curated_date {
        am.curated_date = Set(Some(curated.fixed_offset()));
    }
    if let Some(sent) = update.sent_date {
        am.sent_date = Set(Some(sent.fixed_offset()));
    }
    if let Some(ref severity) = update.severity {
        am.severity = Set(Some(severity.clone()));
    }
    if let Some(ref status) = update.status {
        am.status = Set(Some(status.clone()));
    }
}

impl DbStore {
    pub(crate) async fn list_alerts_impl(&self, filter: &AlertFilter) -> Result<Vec<AlertRow>> {
        let mut q = AlertEntity::find();
        if let Some(range) = filter.date_range {
            q = q
                .filter(AlertCol::AlertDate.gte(range.from.fixed_offset()))
                .filter(AlertCol::AlertDate.lte(range.to.fixed_offset()));
        }
        if let Some(ref kpi) = filter.kpi_id_eq {
            q = q.filter(AlertCol::KpiId.eq(kpi.as_str()));
        }
        if let Some(ref dept) = filter.department_id_eq {
            q = q.filter(AlertCol::DepartmentId.eq(dept.as_str()));
        }
        if let Some(ref status) = filter.status_eq {
            q = q.filter(AlertCol::Status.eq(status.as_str()));
        }
        if let Some(ref severity) = filter.severity_eq {
            q = q.filter(AlertCol::Severity.eq(severity.as_str()));
        }
        let rows = q
            .order_by(AlertCol::AlertDate, Order::Desc)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(model_to_row).collect())
    }

    pub(crate) async fn get_alert_impl(&self, id: &str) -> Result<Option<AlertRow>> {
        let model = AlertEntity::find_by_id(id).one(self.db()).await?;
        Ok(model.map(model_to_row))
    }

    pub(crate) async fn insert_alert_impl(&self, new: NewAlert) -> Result<AlertRow> {
        let id = ace_common::id::next_id();
        let now = Utc::now().fixed_offset();
        let am = alert::ActiveModel {
            id: Set(id),
            alert_id: Set(new.alert_id),
            alert_date: Set(new.alert_date.fixed_offset()),
            alert_detail: Set(new.alert_detail),
            comment: Set(new.comment),
            curated_date: Set(None),
            department_id: Set(new.department_id),
            kpi_id: Set(new.kpi_id),
            sent_date: Set(None),
            severity: Set(new.severity),
            status: Set(new.status),
            created_at: Set(now),
        };
        let inserted = am.insert(self.db()).await?;
        Ok(model_to_row(inserted))
    }

    pub(crate) async fn update_alert_impl(
        &self,
        id: &str,
        update: AlertUpdate,
    ) -> Result<AlertRow> {
        let model = AlertEntity::find_by_id(id)
            .one(self.db())
            .await?
            .ok_or_else(|| StorageError::NotFound {
                entity: "alert",
                id: id.to_string(),
            })?;
        // 已发送的告警不可变
        if model.sent_date.is_some() {
            return Err(StorageError::Conflict {
                entity: "alert",
                reason: format!("alert {id} was already sent"),
            });
        }
        let mut am: alert::ActiveModel = model.into();
        apply_update(&mut am, &update);
        let updated = am.update(self.db()).await?;
        Ok(model_to_row(updated))
    }

    pub(crate) async fn bulk_update_alerts_impl(
        &self,
        ids: &[String],
        update: AlertUpdate,
    ) -> Result<Vec<AlertRow>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let models = AlertEntity::find()
            .filter(AlertCol::Id.is_in(ids.iter().map(String::as_str)))
            .all(self.db())
            .await?;
        let mut updated = Vec::with_capacity(models.len());
        for model in models {
            // 缺失的 id 自然不在结果集中；已发送的跳过
            if model.sent_date.is_some() {
                continue;
            }
            let mut am: alert::ActiveModel = model.into();
            apply_update(&mut am, &update);
            updated.push(model_to_row(am.update(self.db()).await?));
        }
        // 保持 alert_date 倒序的列表契约
        updated.sort_by(|a, b| b.alert_date.cmp(&a.alert_date));
        Ok(updated)
    }
}
