use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder,
};

use crate::entities::department::{self, Column as DeptCol, Entity as DeptEntity};
use crate::entities::kpi::{Column as KpiCol, Entity as KpiEntity};
use crate::error::{Result, StorageError};
use crate::store::DbStore;
use crate::types::{DepartmentRow, DepartmentUpdate, NewDepartment};

fn model_to_row(m: department::Model) -> DepartmentRow {
    DepartmentRow {
        id: m.id,
        name: m.name,
        description: m.description,
        icon: m.icon,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

impl DbStore {
    pub(crate) async fn list_departments_impl(&self) -> Result<Vec<DepartmentRow>> {
        let rows = DeptEntity::find()
            .order_by(DeptCol::Name, Order::Asc)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(model_to_row).collect())
    }

    pub(crate) async fn get_department_impl(&self, id: &str) -> Result<Option<DepartmentRow>> {
        let model = DeptEntity::find_by_id(id).one(self.db()).await?;
        Ok(model.map(model_to_row))
    }

    pub(crate) async fn create_department_impl(
        &self,
        new: NewDepartment,
    ) -> Result<DepartmentRow> {
        let id = ace_common::id::next_id();
        let now = Utc::now().fixed_offset();
        let am = department::ActiveModel {
            id: Set(id),
            name: Set(new.name),
            description: Set(new.description),
            icon: Set(new.icon),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = am.insert(self.db()).await?;
        Ok(model_to_row(inserted))
    }

    pub(crate) async fn update_department_impl(
        &self,
        id: &str,
        update: DepartmentUpdate,
    ) -> Result<DepartmentRow> {
        let model = DeptEntity::find_by_id(id)
            .one(self.db())
            .await?
            .ok_or_else(|| StorageError::NotFound {
                entity: "department",
                id: id.to_string(),
            })?;
        let mut am: department::ActiveModel = model.into();
        if let Some(name) = update.name {
            am.name = Set(name);
        }
        if let Some(desc) = update.description {
            am.description = Set(Some(desc));
        }
        if let Some(icon) = update.icon {
            am.icon = Set(Some(icon));
        }
        am.updated_at = Set(Utc::now().fixed_offset());
        let updated = am.update(self.db()).await?;
        Ok(model_to_row(updated))
    }

    pub(crate) async fn delete_department_impl(&self, id: &str) -> Result<()> {
        let exists = DeptEntity::find_by_id(id).one(self.db()).await?.is_some();
        if !exists {
            return Err(StorageError::NotFound {
                entity: "department",
                id: id.to_string(),
            });
        }
        // 仍有 KPI 归属时禁止删除，不做级联
        let referencing = KpiEntity::find()
            .filter(KpiCol::OwnerDepartmentId.eq(id))
            .count(self.db())
            .await?;
        if referencing > 0 {
            return Err(StorageError::Conflict {
                entity: "department",
                reason: format!("{referencing} KPI(s) still reference department {id}"),
            });
        }
        DeptEntity::delete_by_id(id).exec(self.db()).await?;
        Ok(())
    }
}
