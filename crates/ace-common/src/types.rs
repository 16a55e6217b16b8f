use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert lifecycle state, derived from the timestamp columns rather than
/// stored separately: `sent_date` wins over `curated_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
    Pending,
    Curated,
    Sent,
}

impl AlertState {
    /// 根据时间戳推导告警生命周期状态。
    pub fn from_dates(
        curated_date: Option<DateTime<Utc>>,
        sent_date: Option<DateTime<Utc>>,
    ) -> Self {
        if sent_date.is_some() {
            AlertState::Sent
        } else if curated_date.is_some() {
            AlertState::Curated
        } else {
            AlertState::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertState::Pending => "pending",
            AlertState::Curated => "curated",
            AlertState::Sent => "sent",
        }
    }
}

impl std::fmt::Display for AlertState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive date range: a record with date `d` matches iff
/// `from <= d <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Both endpoints are inclusive.
    pub fn contains(&self, d: DateTime<Utc>) -> bool {
        self.from <= d && d <= self.to
    }
}
