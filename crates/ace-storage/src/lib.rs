//! Record-store layer for the alerting platform.
//!
//! The [`RecordStore`] trait is the single data-access port the API layer
//! talks to. Two adapters implement it: [`store::DbStore`] (SeaORM over
//! SQLite or PostgreSQL, migrations run on connect) and
//! [`memory::MemoryStore`] (mutex-guarded vectors, used in tests and when
//! the server is configured with `backend = "memory"`). The
//! [`cache::CachedStore`] decorator adds list-result caching with
//! generation-guarded invalidation on top of either adapter.

pub mod cache;
pub mod entities;
pub mod error;
pub mod memory;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

use async_trait::async_trait;

pub use cache::CachedStore;
pub use error::{Result, StorageError};
pub use memory::MemoryStore;
pub use store::DbStore;
pub use types::{
    AlertFilter, AlertHistoryRow, AlertRow, AlertUpdate, DepartmentRow, DepartmentUpdate,
    HistoryFilter, KpiFilter, KpiRow, KpiUpdate, NewAlert, NewAlertHistory, NewDepartment, NewKpi,
};

/// Data-access port for departments, KPIs, alerts and send history.
///
/// Implementations must be safe to share across threads (`Send + Sync`)
/// because the store is accessed concurrently from every request handler.
///
/// Ordering contracts: department and KPI lists are sorted by name
/// ascending, alert lists by `alert_date` descending, history by
/// `sent_date` descending. Filters combine with AND; date ranges are
/// inclusive on both ends.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // ---- departments ----

    async fn list_departments(&self) -> Result<Vec<DepartmentRow>>;

    async fn get_department(&self, id: &str) -> Result<Option<DepartmentRow>>;

    async fn create_department(&self, new: NewDepartment) -> Result<DepartmentRow>;

    /// `NotFound` when the id does not exist.
    async fn update_department(&self, id: &str, update: DepartmentUpdate)
        -> Result<DepartmentRow>;

    /// `Conflict` while any KPI still references the department.
    async fn delete_department(&self, id: &str) -> Result<()>;

    // ---- KPIs ----

    async fn list_kpis(&self, filter: &KpiFilter) -> Result<Vec<KpiRow>>;

    async fn get_kpi(&self, id: &str) -> Result<Option<KpiRow>>;

    /// A blank `identifier` is derived from the name; a duplicate
    /// identifier is a `Conflict`.
    async fn create_kpi(&self, new: NewKpi) -> Result<KpiRow>;

    async fn update_kpi(&self, id: &str, update: KpiUpdate) -> Result<KpiRow>;

    // ---- alerts ----

    async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<AlertRow>>;

    async fn get_alert(&self, id: &str) -> Result<Option<AlertRow>>;

    async fn insert_alert(&self, new: NewAlert) -> Result<AlertRow>;

    /// `NotFound` on a missing id, `Conflict` when the alert was already
    /// sent (sent alerts are immutable).
    async fn update_alert(&self, id: &str, update: AlertUpdate) -> Result<AlertRow>;

    /// Applies the update to every id that exists and is not yet sent.
    /// Missing and already-sent ids are skipped, not errors; the rows
    /// actually updated are returned.
    async fn bulk_update_alerts(
        &self,
        ids: &[String],
        update: AlertUpdate,
    ) -> Result<Vec<AlertRow>>;

    // ---- send history (append-only) ----

    async fn list_history(&self, filter: &HistoryFilter) -> Result<Vec<AlertHistoryRow>>;

    async fn insert_history(&self, new: NewAlertHistory) -> Result<AlertHistoryRow>;
}
