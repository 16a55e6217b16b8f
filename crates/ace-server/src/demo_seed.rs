//! Demo data seeding.
//!
//! Populates an empty store with a handful of banking departments,
//! KPIs and pending alerts so the platform is browsable right after
//! first start. Skipped entirely when any department already exists.

use ace_storage::{NewAlert, NewDepartment, NewKpi, RecordStore};
use anyhow::Result;
use chrono::{Duration, Utc};

pub async fn seed_demo_data(store: &dyn RecordStore) -> Result<()> {
    if !store.list_departments().await?.is_empty() {
        tracing::info!("Demo seed skipped: departments already present");
        return Ok(());
    }

    let departments = [
        ("Risk Management", "Market, credit and operational risk"),
        ("Operations", "Branch and back-office operations"),
        ("Finance", "Treasury, liquidity and reporting"),
        ("IT Security", "Infrastructure and access monitoring"),
    ];
    let mut dept_ids = Vec::new();
    for (name, description) in departments {
        let row = store
            .create_department(NewDepartment {
                name: name.to_string(),
                description: Some(description.to_string()),
                icon: None,
            })
            .await?;
        dept_ids.push(row.id);
    }

    let kpis = [
        (
            "FX Exposure",
            "treasury",
            "alerts_fx_exposure",
            2usize, // Finance
            "FX Exposure alert",
            "The following FX exposure breaches require review.",
        ),
        (
            "Branch Wait Time",
            "operations",
            "alerts_branch_wait_time",
            1, // Operations
            "Branch wait time alert",
            "Average branch wait time exceeded the service target.",
        ),
        (
            "VaR Breaches",
            "risk",
            "alerts_var_breaches",
            0, // Risk Management
            "VaR breach alert",
            "Value-at-risk limits were breached on the trading book.",
        ),
        (
            "Failed Login Spike",
            "security",
            "alerts_failed_logins",
            3, // IT Security
            "Failed login spike alert",
            "An unusual number of failed logins was detected.",
        ),
    ];
    let mut kpi_ids = Vec::new();
    for (name, domain, table, dept_idx, subject, body) in kpis {
        let row = store
            .create_kpi(NewKpi {
                name: name.to_string(),
                domain: domain.to_string(),
                description: None,
                alert_table_name: table.to_string(),
                default_email_to: vec![format!(
                    "{}-team@bank.example",
                    domain.replace(' ', "-")
                )],
                default_email_cc: vec![],
                default_subject: subject.to_string(),
                default_body: body.to_string(),
                default_footer: "Generated by the alerting platform.".to_string(),
                is_favorite: false,
                identifier: None,
                severity_tagging: false,
                owner_department_id: Some(dept_ids[dept_idx].clone()),
                icon: None,
                severity: None,
                status: None,
                is_automation_enabled: None,
                automation_time: None,
                ai_prompt: None,
                is_active: true,
            })
            .await?;
        kpi_ids.push((row.id, dept_ids[dept_idx].clone()));
    }

    let alerts = [
        (0usize, "USD/EUR net exposure 12% above limit", "high", 0i64),
        (0, "GBP overnight exposure above limit", "medium", 1),
        (1, "Average wait time 14 minutes at downtown branch", "medium", 0),
        (2, "99% VaR exceeded on rates desk", "high", 2),
        (3, "430 failed logins from a single subnet", "high", 0),
    ];
    for (kpi_idx, detail, severity, days_ago) in alerts {
        let (kpi_id, dept_id) = &kpi_ids[kpi_idx];
        store
            .insert_alert(NewAlert {
                alert_id: ace_common::id::next_id(),
                alert_date: Utc::now() - Duration::days(days_ago),
                alert_detail: detail.to_string(),
                comment: None,
                department_id: Some(dept_id.clone()),
                kpi_id: Some(kpi_id.clone()),
                severity: Some(severity.to_string()),
                status: Some("open".to_string()),
            })
            .await?;
    }

    tracing::info!(
        departments = dept_ids.len(),
        kpis = kpi_ids.len(),
        "Demo data seeded"
    );
    Ok(())
}
