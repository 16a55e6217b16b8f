use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m001_initial_schema"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按依赖顺序建表
        manager.get_connection().execute_unprepared(UP_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.get_connection().execute_unprepared(DOWN_SQL).await?;
        Ok(())
    }
}

// text[] 列（default_email_to / default_email_cc / recipient_emails）
// 在 SQLite 上以 JSON 数组字符串存储。
const UP_SQL: &str = "
CREATE TABLE IF NOT EXISTS departments (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    icon TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_departments_name ON departments(name);

CREATE TABLE IF NOT EXISTS kpis (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    domain TEXT NOT NULL,
    description TEXT,
    alert_table_name TEXT NOT NULL,
    default_email_to TEXT NOT NULL DEFAULT '[]',
    default_email_cc TEXT NOT NULL DEFAULT '[]',
    default_subject TEXT NOT NULL DEFAULT '',
    default_body TEXT NOT NULL DEFAULT '',
    default_footer TEXT NOT NULL DEFAULT '',
    is_favorite INTEGER NOT NULL DEFAULT 0,
    identifier TEXT,
    severity_tagging INTEGER NOT NULL DEFAULT 0,
    owner_department_id TEXT REFERENCES departments(id),
    icon TEXT,
    severity TEXT,
    status TEXT,
    is_automation_enabled INTEGER,
    automation_time TEXT,
    ai_prompt TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_kpis_owner_department ON kpis(owner_department_id);
CREATE INDEX IF NOT EXISTS idx_kpis_identifier ON kpis(identifier);
CREATE INDEX IF NOT EXISTS idx_kpis_name ON kpis(name);

CREATE TABLE IF NOT EXISTS alerts (
    id TEXT PRIMARY KEY NOT NULL,
    alert_id TEXT NOT NULL,
    alert_date TEXT NOT NULL,
    alert_detail TEXT NOT NULL,
    comment TEXT,
    curated_date TEXT,
    department_id TEXT REFERENCES departments(id),
    kpi_id TEXT REFERENCES kpis(id),
    sent_date TEXT,
    severity TEXT,
    status TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_alerts_alert_date ON alerts(alert_date DESC);
CREATE INDEX IF NOT EXISTS idx_alerts_kpi ON alerts(kpi_id);
CREATE INDEX IF NOT EXISTS idx_alerts_department ON alerts(department_id);
CREATE INDEX IF NOT EXISTS idx_alerts_sent_date ON alerts(sent_date);

CREATE TABLE IF NOT EXISTS alert_history (
    id TEXT PRIMARY KEY NOT NULL,
    alert_id TEXT REFERENCES alerts(id),
    kpi_id TEXT REFERENCES kpis(id),
    body TEXT NOT NULL,
    subject TEXT NOT NULL,
    recipient_emails TEXT NOT NULL DEFAULT '[]',
    sent_date TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_alert_history_sent_date ON alert_history(sent_date DESC);
CREATE INDEX IF NOT EXISTS idx_alert_history_kpi ON alert_history(kpi_id);
";

const DOWN_SQL: &str = "
DROP TABLE IF EXISTS alert_history;
DROP TABLE IF EXISTS alerts;
DROP TABLE IF EXISTS kpis;
DROP TABLE IF EXISTS departments;
";
