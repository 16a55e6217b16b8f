use std::sync::Arc;

use ace_ai::Summarizer;
use ace_notify::{NotificationChannel, TemplateRenderer};
use ace_storage::RecordStore;
use chrono::{DateTime, Utc};

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub notifier: Arc<dyn NotificationChannel>,
    pub summarizer: Arc<dyn Summarizer>,
    pub renderer: Arc<dyn TemplateRenderer>,
    pub start_time: DateTime<Utc>,
    pub config: Arc<ServerConfig>,
}
