//! List-result cache decorator.
//!
//! Wraps any [`RecordStore`] and memoizes list results keyed by entity and
//! serialized filter. Every successful mutation bumps the entity's
//! generation counter and clears its cache; a list result that was fetched
//! before the bump is discarded instead of being stored, so a reader can
//! never install a snapshot that predates a mutation it raced with.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::*;
use crate::RecordStore;

struct EntityCache<T> {
    map: Mutex<HashMap<String, Vec<T>>>,
    generation: AtomicU64,
}

impl<T: Clone> EntityCache<T> {
    fn new() -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    fn lookup(&self, key: &str) -> Option<Vec<T>> {
        self.map.lock().unwrap().get(key).cloned()
    }

    fn begin(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// 仅当查询期间代数未变时写入缓存，过期结果直接丢弃。
    fn store(&self, started_at: u64, key: String, rows: Vec<T>) {
        if self.generation.load(Ordering::Acquire) == started_at {
            self.map.lock().unwrap().insert(key, rows);
        }
    }

    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.map.lock().unwrap().clear();
    }
}

fn cache_key<F: serde::Serialize>(filter: &F) -> String {
    serde_json::to_string(filter).unwrap_or_default()
}

/// [`RecordStore`] decorator caching list queries per entity.
pub struct CachedStore<S> {
    inner: S,
    departments: EntityCache<DepartmentRow>,
    kpis: EntityCache<KpiRow>,
    alerts: EntityCache<AlertRow>,
    history: EntityCache<AlertHistoryRow>,
}

impl<S: RecordStore> CachedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            departments: EntityCache::new(),
            kpis: EntityCache::new(),
            alerts: EntityCache::new(),
            history: EntityCache::new(),
        }
    }

    /// 当前各实体缓存代数，测试用。
    pub fn generations(&self) -> (u64, u64, u64, u64) {
        (
            self.departments.begin(),
            self.kpis.begin(),
            self.alerts.begin(),
            self.history.begin(),
        )
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for CachedStore<S> {
    async fn list_departments(&self) -> Result<Vec<DepartmentRow>> {
        let key = "all".to_string();
        if let Some(rows) = self.departments.lookup(&key) {
            return Ok(rows);
        }
        let started = self.departments.begin();
        let rows = self.inner.list_departments().await?;
        self.departments.store(started, key, rows.clone());
        Ok(rows)
    }

    async fn get_department(&self, id: &str) -> Result<Option<DepartmentRow>> {
        self.inner.get_department(id).await
    }

    async fn create_department(&self, new: NewDepartment) -> Result<DepartmentRow> {
        let row = self.inner.create_department(new).await?;
        self.departments.invalidate();
        Ok(row)
    }

    async fn update_department(
        &self,
        id: &str,
        update: DepartmentUpdate,
    ) -> Result<DepartmentRow> {
        let row = self.inner.update_department(id, update).await?;
        self.departments.invalidate();
        Ok(row)
    }

    async fn delete_department(&self, id: &str) -> Result<()> {
        self.inner.delete_department(id).await?;
        self.departments.invalidate();
        Ok(())
    }

    async fn list_kpis(&self, filter: &KpiFilter) -> Result<Vec<KpiRow>> {
        let key = cache_key(filter);
        if let Some(rows) = self.kpis.lookup(&key) {
            return Ok(rows);
        }
        let started = self.kpis.begin();
        let rows = self.inner.list_kpis(filter).await?;
        self.kpis.store(started, key, rows.clone());
        Ok(rows)
    }

    async fn get_kpi(&self, id: &str) -> Result<Option<KpiRow>> {
        self.inner.get_kpi(id).await
    }

    async fn create_kpi(&self, new: NewKpi) -> Result<KpiRow> {
        let row = self.inner.create_kpi(new).await?;
        self.kpis.invalidate();
        Ok(row)
    }

    async fn update_kpi(&self, id: &str, update: KpiUpdate) -> Result<KpiRow> {
        let row = self.inner.update_kpi(id, update).await?;
        self.kpis.invalidate();
        Ok(row)
    }

    async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<AlertRow>> {
        let key = cache_key(filter);
        if let Some(rows) = self.alerts.lookup(&key) {
            return Ok(rows);
        }
        let started = self.alerts.begin();
        let rows = self.inner.list_alerts(filter).await?;
        self.alerts.store(started, key, rows.clone());
        Ok(rows)
    }

    async fn get_alert(&self, id: &str) -> Result<Option<AlertRow>> {
        self.inner.get_alert(id).await
    }

    async fn insert_alert(&self, new: NewAlert) -> Result<AlertRow> {
        let row = self.inner.insert_alert(new).await?;
        self.alerts.invalidate();
        Ok(row)
    }

    async fn update_alert(&self, id: &str, update: AlertUpdate) -> Result<AlertRow> {
        let row = self.inner.update_alert(id, update).await?;
        self.alerts.invalidate();
        Ok(row)
    }

    async fn bulk_update_alerts(
        &self,
        ids: &[String],
        update: AlertUpdate,
    ) -> Result<Vec<AlertRow>> {
        let rows = self.inner.bulk_update_alerts(ids, update).await?;
        if !rows.is_empty() {
            self.alerts.invalidate();
        }
        Ok(rows)
    }

    async fn list_history(&self, filter: &HistoryFilter) -> Result<Vec<AlertHistoryRow>> {
        let key = cache_key(filter);
        if let Some(rows) = self.history.lookup(&key) {
            return Ok(rows);
        }
        let started = self.history.begin();
        let rows = self.inner.list_history(filter).await?;
        self.history.store(started, key, rows.clone());
        Ok(rows)
    }

    async fn insert_history(&self, new: NewAlertHistory) -> Result<AlertHistoryRow> {
        let row = self.inner.insert_history(new).await?;
        self.history.invalidate();
        Ok(row)
    }
}
