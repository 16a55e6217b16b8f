use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder,
};

use crate::entities::kpi::{self, Column as KpiCol, Entity as KpiEntity};
use crate::error::{Result, StorageError};
use crate::store::{emails_from_json, emails_to_json, DbStore};
use crate::types::{KpiFilter, KpiRow, KpiUpdate, NewKpi};

fn model_to_row(m: kpi::Model) -> KpiRow {
    KpiRow {
        id: m.id,
        name: m.name,
        domain: m.domain,
        description: m.description,
        alert_table_name: m.alert_table_name,
        default_email_to: emails_from_json(&m.default_email_to),
        default_email_cc: emails_from_json(&m.default_email_cc),
        default_subject: m.default_subject,
        default_body: m.default_body,
        default_footer: m.default_footer,
        is_favorite: m.is_favorite,
        identifier: m.identifier,
        severity_tagging: m.severity_tagging,
        owner_department_id: m.owner_department_id,
        icon: m.icon,
        severity: m.severity,
        status: m.status,
        is_automation_enabled: m.is_automation_enabled,
        automation_time: m.automation_time,
        ai_prompt: m.ai_prompt,
        is_active: m.is_active,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

impl DbStore {
    pub(crate) async fn list_kpis_impl(&self, filter: &KpiFilter) -> Result<Vec<KpiRow>> {
        let mut q = KpiEntity::find();
        if let Some(ref dept) = filter.department_id_eq {
            q = q.filter(KpiCol::OwnerDepartmentId.eq(dept.as_str()));
        }
        if let Some(active) = filter.is_active_eq {
            q = q.filter(KpiCol::IsActive.eq(active));
        }
        if let Some(ref name) = filter.name_contains {
            q = q.filter(KpiCol::Name.contains(name));
        }
        let rows = q
            .order_by(KpiCol::Name, Order::Asc)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(model_to_row).collect())
    }

    pub(crate) async fn get_kpi_impl(&self, id: &str) -> Result<Option<KpiRow>> {
        let model = KpiEntity::find_by_id(id).one(self.db()).await?;
        Ok(model.map(model_to_row))
    }

    pub(crate) async fn create_kpi_impl(&self, new: NewKpi) -> Result<KpiRow> {
        // 空 identifier 按名称派生；重复即冲突
        let identifier = match new.identifier.as_deref() {
            Some(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => ace_common::slug::derive_identifier(&new.name),
        };
        let duplicate = KpiEntity::find()
            .filter(KpiCol::Identifier.eq(identifier.as_str()))
            .one(self.db())
            .await?;
        if duplicate.is_some() {
            return Err(StorageError::Conflict {
                entity: "kpi",
                reason: format!("identifier '{identifier}' already in use"),
            });
        }

        let id = ace_common::id::next_id();
        let now = Utc::now().fixed_offset();
        let am = kpi::ActiveModel {
            id: Set(id),
            name: Set(new.name),
            domain: Set(new.domain),
            description: Set(new.description),
            alert_table_name: Set(new.alert_table_name),
            default_email_to: Set(emails_to_json(&new.default_email_to)),
            default_email_cc: Set(emails_to_json(&new.default_email_cc)),
            default_subject: Set(new.default_subject),
            default_body: Set(new.default_body),
            default_footer: Set(new.default_footer),
            is_favorite: Set(new.is_favorite),
            identifier: Set(Some(identifier)),
            severity_tagging: Set(new.severity_tagging),
            owner_department_id: Set(new.owner_department_id),
            icon: Set(new.icon),
            severity: Set(new.severity),
            status: Set(new.status),
            is_automation_enabled: Set(new.is_automation_enabled),
            automation_time: Set(new.automation_time),
            ai_prompt: Set(new.ai_prompt),
            is_active: Set(new.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = am.insert(self.db()).await?;
        Ok(model_to_row(inserted))
    }

    pub(crate) async fn update_kpi_impl(&self, id: &str, update: KpiUpdate) -> Result<KpiRow> {
        let model = KpiEntity::find_by_id(id)
            .one(self.db())
            .await?
            .ok_or_else(|| StorageError::NotFound {
                entity: "kpi",
                id: id.to_string(),
            })?;
        let mut am: kpi::ActiveModel = model.into();
        if let Some(name) = update.name {
            am.name = Set(name);
        }
        if let Some(domain) = update.domain {
            am.domain = Set(domain);
        }
        if let Some(desc) = update.description {
            am.description = Set(Some(desc));
        }
        if let Some(table) = update.alert_table_name {
            am.alert_table_name = Set(table);
        }
        if let Some(ref to) = update.default_email_to {
            am.default_email_to = Set(emails_to_json(to));
        }
        if let Some(ref cc) = update.default_email_cc {
            am.default_email_cc = Set(emails_to_json(cc));
        }
        if let Some(subject) = update.default_subject {
            am.default_subject = Set(subject);
        }
        if let Some(body) = update.default_body {
            am.default_body = Set(body);
        }
        if let Some(footer) = update.default_footer {
            am.default_footer = Set(footer);
        }
        if let Some(fav) = update.is_favorite {
            am.is_favorite = Set(fav);
        }
        if let Some(tagging) = update.severity_tagging {
            am.severity_tagging = Set(tagging);
        }
        if let Some(dept) = update.owner_department_id {
            am.owner_department_id = Set(Some(dept));
        }
        if let Some(icon) = update.icon {
            am.icon = Set(Some(icon));
        }
        if let Some(severity) = update.severity {
            am.severity = Set(Some(severity));
        }
        if let Some(status) = update.status {
            am.status = Set(Some(status));
        }
        if let Some(auto) = update.is_automation_enabled {
            am.is_automation_enabled = Set(Some(auto));
        }
        if let Some(time) = update.automation_time {
            am.automation_time = Set(Some(time));
        }
        if let Some(prompt) = update.ai_prompt {
            am.ai_prompt = Set(Some(prompt));
        }
        if let Some(active) = update.is_active {
            am.is_active = Set(active);
        }
        am.updated_at = Set(Utc::now().fixed_offset());
        let updated = am.update(self.db()).await?;
        Ok(model_to_row(updated))
    }
}
