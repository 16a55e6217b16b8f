//! Pure list-view helpers: filter, sort and paginate in-memory record
//! arrays the way the dashboard panels present them.
//!
//! [`apply_view`] is deterministic by construction: it reads nothing but
//! its arguments, so the same records and the same [`ListView`] always
//! produce the same membership in the same order.

use crate::types::DateRange;
use chrono::{DateTime, Utc};

/// 面板可过滤/排序的记录视图。
///
/// 默认实现让不适用的维度成为空操作：告警行没有 `last_sent` 排序键，
/// KPI 行没有部门多选过滤，各自只覆盖相关方法。
pub trait Viewable {
    /// 搜索匹配的显示名称。
    fn display_name(&self) -> &str;

    /// 活跃状态（KPI 管理表的 active/inactive 过滤）。
    fn is_active(&self) -> bool {
        true
    }

    /// 日期范围过滤所用的记录日期。
    fn record_date(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// `lastSent` 排序键（可缺失，缺失值排最前）。
    fn last_sent(&self) -> Option<&str> {
        None
    }

    /// `alertCount` 排序键。
    fn alert_count(&self) -> i64 {
        0
    }

    /// 部门多选过滤所用的归属部门。
    fn department_id(&self) -> Option<&str> {
        None
    }
}

/// KPI 管理表的状态过滤器。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    fn matches(&self, active: bool) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => active,
            StatusFilter::Inactive => !active,
        }
    }
}

/// 排序键。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// 名称字典序升序。
    #[default]
    Name,
    /// `last_sent` 字符串字典序升序，缺失值排最前。
    LastSent,
    /// 告警数量降序。
    AlertCount,
}

/// 面板本地视图状态。所有过滤条件按 AND 组合；空条件是空操作。
#[derive(Debug, Clone, Default)]
pub struct ListView {
    pub search_text: String,
    pub status: StatusFilter,
    /// 部门多选；空列表不过滤。
    pub departments: Vec<String>,
    pub date_range: Option<DateRange>,
    pub sort_key: SortKey,
}

/// Applies search, status, department and date-range filters, then sorts.
///
/// Membership: a record survives only if it matches every supplied
/// condition. Search is a case-insensitive substring match on the display
/// name; the empty string matches everything.
pub fn apply_view<T: Viewable + Clone>(records: &[T], view: &ListView) -> Vec<T> {
    let needle = view.search_text.to_lowercase();
    let mut out: Vec<T> = records
        .iter()
        .filter(|r| {
            if !needle.is_empty() && !r.display_name().to_lowercase().contains(&needle) {
                return false;
            }
            if !view.status.matches(r.is_active()) {
                return false;
            }
            if !view.departments.is_empty() {
                match r.department_id() {
                    Some(dep) if view.departments.iter().any(|d| d == dep) => {}
                    _ => return false,
                }
            }
            if let Some(range) = &view.date_range {
                match r.record_date() {
                    Some(d) if range.contains(d) => {}
                    _ => return false,
                }
            }
            true
        })
        .cloned()
        .collect();

    match view.sort_key {
        SortKey::Name => out.sort_by(|a, b| a.display_name().cmp(b.display_name())),
        // Option's ordering puts None first, which is exactly the
        // missing-values-sort-first contract.
        SortKey::LastSent => out.sort_by(|a, b| a.last_sent().cmp(&b.last_sent())),
        SortKey::AlertCount => out.sort_by(|a, b| b.alert_count().cmp(&a.alert_count())),
    }
    out
}

/// 一页数据及总页数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
}

/// Slices a page out of `records`.
///
/// `total_pages = ceil(len / page_size)`, minimum 1 even for an empty
/// input; `page_number` is clamped into `[1, total_pages]`. A zero
/// `page_size` is treated as 1.
pub fn paginate<T: Clone>(records: &[T], page_number: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = records.len().div_ceil(page_size).max(1);
    let page = page_number.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let items = records
        .iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();
    Page { items, total_pages }
}
