use ace_common::types::DateRange;
use chrono::{Duration, TimeZone, Utc};

use crate::memory::MemoryStore;
use crate::types::*;
use crate::{CachedStore, RecordStore, StorageError};

fn setup() -> MemoryStore {
    ace_common::id::init(1, 1);
    MemoryStore::new()
}

fn new_kpi(name: &str, department_id: Option<&str>) -> NewKpi {
    NewKpi {
        name: name.to_string(),
        domain: "treasury".to_string(),
        owner_department_id: department_id.map(str::to_string),
        alert_table_name: format!("alerts_{}", name.to_lowercase().replace(' ', "_")),
        default_email_to: vec!["treasury-desk@bank.example".to_string()],
        default_subject: format!("{name} alert"),
        default_body: "Please review the attached breaches.".to_string(),
        is_active: true,
        ..NewKpi::default()
    }
}

fn new_alert(kpi_id: &str, detail: &str, days_ago: i64) -> NewAlert {
    NewAlert {
        alert_id: ace_common::id::next_id(),
        alert_date: Utc::now() - Duration::days(days_ago),
        alert_detail: detail.to_string(),
        comment: None,
        department_id: None,
        kpi_id: Some(kpi_id.to_string()),
        severity: Some("high".to_string()),
        status: Some("open".to_string()),
    }
}

#[tokio::test]
async fn departments_sorted_by_name() {
    let store = setup();
    for name in ["Operations", "Finance", "Risk Management"] {
        store
            .create_department(NewDepartment {
                name: name.to_string(),
                ..NewDepartment::default()
            })
            .await
            .unwrap();
    }
    let rows = store.list_departments().await.unwrap();
    let names: Vec<&str> = rows.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Finance", "Operations", "Risk Management"]);
}

#[tokio::test]
async fn update_missing_department_is_not_found() {
    let store = setup();
    let err = store
        .update_department("no-such-id", DepartmentUpdate::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_department_with_kpis_is_conflict() {
    let store = setup();
    let dept = store
        .create_department(NewDepartment {
            name: "Risk Management".to_string(),
            ..NewDepartment::default()
        })
        .await
        .unwrap();
    store
        .create_kpi(NewKpi {
            owner_department_id: Some(dept.id.clone()),
            ..new_kpi("VaR Breaches", None)
        })
        .await
        .unwrap();

    let err = store.delete_department(&dept.id).await.unwrap_err();
    assert!(err.is_conflict());

    // 部门移除 KPI 归属后可删除
    let kpis = store.list_kpis(&KpiFilter::default()).await.unwrap();
    assert_eq!(kpis.len(), 1);
}

#[tokio::test]
async fn kpi_identifier_derived_and_unique() {
    let store = setup();
    let kpi = store
        .create_kpi(new_kpi("Branch Wait Time", None))
        .await
        .unwrap();
    assert_eq!(kpi.identifier.as_deref(), Some("branch-wait-time"));

    let err = store
        .create_kpi(NewKpi {
            identifier: Some("branch-wait-time".to_string()),
            ..new_kpi("Another KPI", None)
        })
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn kpi_filters_combine_with_and() {
    let store = setup();
    let dept = store
        .create_department(NewDepartment {
            name: "Finance".to_string(),
            ..NewDepartment::default()
        })
        .await
        .unwrap();
    store
        .create_kpi(NewKpi {
            owner_department_id: Some(dept.id.clone()),
            ..new_kpi("FX Exposure", None)
        })
        .await
        .unwrap();
    store
        .create_kpi(NewKpi {
            owner_department_id: Some(dept.id.clone()),
            is_active: false,
            ..new_kpi("FX Settlement Lag", None)
        })
        .await
        .unwrap();
    store.create_kpi(new_kpi("ATM Uptime", None)).await.unwrap();

    let filter = KpiFilter {
        department_id_eq: Some(dept.id.clone()),
        is_active_eq: Some(true),
        name_contains: Some("fx".to_string()),
    };
    let rows = store.list_kpis(&filter).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "FX Exposure");
}

#[tokio::test]
async fn alerts_sorted_by_date_descending() {
    let store = setup();
    let kpi = store.create_kpi(new_kpi("FX Exposure", None)).await.unwrap();
    for (detail, days) in [("oldest", 3), ("newest", 0), ("middle", 1)] {
        store
            .insert_alert(new_alert(&kpi.id, detail, days))
            .await
            .unwrap();
    }
    let rows = store.list_alerts(&AlertFilter::default()).await.unwrap();
    let details: Vec<&str> = rows.iter().map(|a| a.alert_detail.as_str()).collect();
    assert_eq!(details, vec!["newest", "middle", "oldest"]);
}

#[tokio::test]
async fn alert_date_range_is_inclusive() {
    let store = setup();
    let kpi = store.create_kpi(new_kpi("FX Exposure", None)).await.unwrap();
    let base = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
    for day in [9, 10, 15, 20, 21] {
        store
            .insert_alert(NewAlert {
                alert_date: Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap(),
                ..new_alert(&kpi.id, &format!("day {day}"), 0)
            })
            .await
            .unwrap();
    }
    let filter = AlertFilter {
        date_range: Some(DateRange::new(
            base,
            Utc.with_ymd_and_hms(2024, 6, 20, 12, 0, 0).unwrap(),
        )),
        ..AlertFilter::default()
    };
    let rows = store.list_alerts(&filter).await.unwrap();
    assert_eq!(rows.len(), 3);
}

#[tokio::test]
async fn sent_alert_is_immutable() {
    let store = setup();
    let kpi = store.create_kpi(new_kpi("FX Exposure", None)).await.unwrap();
    let alert = store
        .insert_alert(new_alert(&kpi.id, "limit breach", 0))
        .await
        .unwrap();
    store
        .update_alert(
            &alert.id,
            AlertUpdate {
                sent_date: Some(Utc::now()),
                ..AlertUpdate::default()
            },
        )
        .await
        .unwrap();

    let err = store
        .update_alert(
            &alert.id,
            AlertUpdate {
                comment: Some("late note".to_string()),
                ..AlertUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict { .. }));
}

#[tokio::test]
async fn bulk_update_skips_missing_and_sent() {
    // 批次 5 条：3 条待处理、2 条已发送，外加一个不存在的 id。
    let store = setup();
    let kpi = store.create_kpi(new_kpi("FX Exposure", None)).await.unwrap();
    let mut ids = Vec::new();
    for i in 0..5i64 {
        let alert = store
            .insert_alert(new_alert(&kpi.id, &format!("breach {i}"), i))
            .await
            .unwrap();
        ids.push(alert.id);
    }
    // 先把两条标记为已发送
    store
        .bulk_update_alerts(
            &ids[3..5],
            AlertUpdate {
                sent_date: Some(Utc::now()),
                ..AlertUpdate::default()
            },
        )
        .await
        .unwrap();

    let mut requested = ids.clone();
    requested.push("no-such-id".to_string());
    let updated = store
        .bulk_update_alerts(
            &requested,
            AlertUpdate {
                sent_date: Some(Utc::now()),
                ..AlertUpdate::default()
            },
        )
        .await
        .unwrap();

    // 只有 3 条待处理的被盖章，其余跳过
    assert_eq!(updated.len(), 3);
    assert!(updated.iter().all(|a| a.sent_date.is_some()));
}

#[tokio::test]
async fn alert_lifecycle_pending_curated_sent() {
    let store = setup();
    let kpi = store.create_kpi(new_kpi("FX Exposure", None)).await.unwrap();
    let alert = store
        .insert_alert(new_alert(&kpi.id, "exposure over limit", 0))
        .await
        .unwrap();
    assert_eq!(alert.state().as_str(), "pending");

    let curated = store
        .update_alert(
            &alert.id,
            AlertUpdate {
                comment: Some("confirmed with desk".to_string()),
                curated_date: Some(Utc::now()),
                ..AlertUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(curated.state().as_str(), "curated");

    let sent = store
        .update_alert(
            &alert.id,
            AlertUpdate {
                sent_date: Some(Utc::now()),
                ..AlertUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(sent.state().as_str(), "sent");
}

#[tokio::test]
async fn history_is_append_only_and_sorted() {
    let store = setup();
    let kpi = store.create_kpi(new_kpi("FX Exposure", None)).await.unwrap();
    for days in [2, 0, 1] {
        store
            .insert_history(NewAlertHistory {
                alert_id: None,
                kpi_id: Some(kpi.id.clone()),
                subject: "FX Exposure alert".to_string(),
                body: "body".to_string(),
                recipient_emails: vec!["treasury-desk@bank.example".to_string()],
                sent_date: Utc::now() - Duration::days(days),
                status: "sent".to_string(),
            })
            .await
            .unwrap();
    }
    let rows = store.list_history(&HistoryFilter::default()).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].sent_date >= rows[1].sent_date);
    assert!(rows[1].sent_date >= rows[2].sent_date);
}

#[tokio::test]
async fn cached_store_invalidates_on_mutation() {
    let store = CachedStore::new(setup());
    assert!(store.list_departments().await.unwrap().is_empty());
    let (gen_before, ..) = store.generations();

    store
        .create_department(NewDepartment {
            name: "Operations".to_string(),
            ..NewDepartment::default()
        })
        .await
        .unwrap();

    let (gen_after, ..) = store.generations();
    assert!(gen_after > gen_before);
    // 失效后重新读到新数据，而不是缓存的空列表
    assert_eq!(store.list_departments().await.unwrap().len(), 1);
}

#[tokio::test]
async fn cached_store_serves_repeated_query_from_cache() {
    let store = CachedStore::new(setup());
    let kpi = store.create_kpi(new_kpi("FX Exposure", None)).await.unwrap();
    let filter = KpiFilter {
        name_contains: Some("fx".to_string()),
        ..KpiFilter::default()
    };
    let first = store.list_kpis(&filter).await.unwrap();
    let second = store.list_kpis(&filter).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0].id, kpi.id);
}

#[tokio::test]
async fn treasury_fx_exposure_scenario() {
    // 端到端：建部门、建 KPI、进告警、策展、盖发送章、写历史。
    let store = setup();
    let dept = store
        .create_department(NewDepartment {
            name: "Treasury".to_string(),
            description: Some("Liquidity and market risk".to_string()),
            ..NewDepartment::default()
        })
        .await
        .unwrap();
    let kpi = store
        .create_kpi(NewKpi {
            owner_department_id: Some(dept.id.clone()),
            ..new_kpi("FX Exposure", None)
        })
        .await
        .unwrap();
    let alert = store
        .insert_alert(new_alert(&kpi.id, "USD/EUR exposure above limit", 0))
        .await
        .unwrap();

    store
        .update_alert(
            &alert.id,
            AlertUpdate {
                comment: Some("verified against EOD positions".to_string()),
                curated_date: Some(Utc::now()),
                ..AlertUpdate::default()
            },
        )
        .await
        .unwrap();

    let sent_date = Utc::now();
    let sent = store
        .bulk_update_alerts(
            &[alert.id.clone()],
            AlertUpdate {
                sent_date: Some(sent_date),
                ..AlertUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(sent.len(), 1);

    store
        .insert_history(NewAlertHistory {
            alert_id: Some(alert.id.clone()),
            kpi_id: Some(kpi.id.clone()),
            subject: "FX Exposure alert".to_string(),
            body: "USD/EUR exposure above limit".to_string(),
            recipient_emails: vec!["treasury-desk@bank.example".to_string()],
            sent_date,
            status: "sent".to_string(),
        })
        .await
        .unwrap();

    let history = store.list_history(&HistoryFilter::default()).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kpi_id.as_deref(), Some(kpi.id.as_str()));

    let stored = store.get_alert(&alert.id).await.unwrap().unwrap();
    assert_eq!(stored.state().as_str(), "sent");
}
