use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder,
};

use crate::entities::alert_history::{self, Column as HistCol, Entity as HistEntity};
use crate::error::Result;
use crate::store::{emails_from_json, emails_to_json, DbStore};
use crate::types::{AlertHistoryRow, HistoryFilter, NewAlertHistory};

fn model_to_row(m: alert_history::Model) -> AlertHistoryRow {
    AlertHistoryRow {
        id: m.id,
        alert_id: m.alert_id,
        kpi_id: m.kpi_id,
        subject: m.subject,
        body: m.body,
        recipient_emails: emails_from_json(&m.recipient_emails),
        sent_date: m.sent_date.with_timezone(&Utc),
        status: m.status,
        created_at: m.created_at.with_timezone(&Utc),
    }
}

impl DbStore {
    pub(crate) async fn list_history_impl(
        &self,
        filter: &HistoryFilter,
    ) -> Result<Vec<AlertHistoryRow>> {
        let mut q = HistEntity::find();
        if let Some(range) = filter.sent_range {
            q = q
                .filter(HistCol::SentDate.gte(range.from.fixed_offset()))
                .filter(HistCol::SentDate.lte(range.to.fixed_offset()));
        }
        if let Some(ref kpi) = filter.kpi_id_eq {
            q = q.filter(HistCol::KpiId.eq(kpi.as_str()));
        }
        let rows = q
            .order_by(HistCol::SentDate, Order::Desc)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(model_to_row).collect())
    }

    pub(crate) async fn insert_history_impl(
        &self,
        new: NewAlertHistory,
    ) -> Result<AlertHistoryRow> {
        let id = ace_common::id::next_id();
        let now = Utc::now().fixed_offset();
        let am = alert_history::ActiveModel {
            id: Set(id),
            alert_id: Set(new.alert_id),
            kpi_id: Set(new.kpi_id),
            body: Set(new.body),
            subject: Set(new.subject),
            recipient_emails: Set(emails_to_json(&new.recipient_emails)),
            sent_date: Set(new.sent_date.fixed_offset()),
            status: Set(new.status),
            created_at: Set(now),
        };
        let inserted = am.insert(self.db()).await?;
        Ok(model_to_row(inserted))
    }
}
