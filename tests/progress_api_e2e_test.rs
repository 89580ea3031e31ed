// ==========================================
// ProgressApi end-to-end tests
// ==========================================
// Full query cycles against a temporary database: snapshot rows in,
// reconciled reports and chart datasets out.
// ==========================================

mod test_helpers;

use chrono::NaiveDate;
use garment_progress::api::progress_api::{OrderProgressRequest, ProgressApi, WindowQuery};
use garment_progress::domain::phase::Phase;
use garment_progress::domain::plan::{PlanPhase, PlanRecord, PlanWindow};
use garment_progress::domain::schedule::ExtraDayOffsets;
use garment_progress::engine::progress::PlanProgressEngine;
use garment_progress::repository::plan_repo::PlanRecordRepository;
use garment_progress::repository::progress_repo::OrderProgressRepository;
use garment_progress::ApiError;
use rusqlite::params;
use std::sync::Arc;
use test_helpers::{create_test_db, insert_snapshot_row, SnapshotRow};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn build_api(conn: &std::sync::Arc<std::sync::Mutex<rusqlite::Connection>>) -> ProgressApi {
    ProgressApi::new(
        Arc::new(OrderProgressRepository::new(conn.clone())),
        Arc::new(PlanRecordRepository::new(conn.clone())),
        PlanProgressEngine::default(),
    )
}

#[tokio::test]
async fn test_order_progress_derives_reference_schedule() {
    let (_file, conn) = create_test_db().unwrap();
    let mut row = SnapshotRow::new("1160");
    row.assembly_pct = "73%".to_string();
    row.assembly_min = Some("2025-01-05 08:30:00".to_string());
    row.assembly_max = Some("2025-01-18 16:00:00".to_string());
    insert_snapshot_row(&conn, &row).unwrap();

    let api = build_api(&conn);
    let report = api
        .order_progress(&OrderProgressRequest::for_order("1160"), date(2025, 2, 1))
        .await
        .unwrap();

    // phases come out in production order
    let phases: Vec<Phase> = report.rows.iter().map(|r| r.phase).collect();
    assert_eq!(phases, Phase::ALL.to_vec());

    // 60-day lead time, no offsets: assembly runs Jan 4 .. Jan 16
    assert_eq!(report.rows[0].planned_start, date(2025, 1, 4));
    assert_eq!(report.rows[0].planned_finish, date(2025, 1, 16));
    assert_eq!(report.rows[0].completion_fraction, 0.73);
    assert_eq!(
        report.rows[0].actual_start.map(|d| d.date()),
        Some(date(2025, 1, 5))
    );

    // untouched phases keep their nulls all the way to the chart JSON
    assert!(report.rows[3].actual_start.is_none());
    let json = report.gantt.to_json().unwrap();
    assert!(json.contains(r#""_start_real": null"#));
}

#[tokio::test]
async fn test_order_progress_no_rows_is_a_warning_not_a_crash() {
    let (_file, conn) = create_test_db().unwrap();
    let api = build_api(&conn);

    let err = api
        .order_progress(&OrderProgressRequest::for_order("9999"), date(2025, 2, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NoDataFound(_)));
    assert!(err.user_message().contains("9999"));
}

#[tokio::test]
async fn test_delivery_override_recomputes_lead_time() {
    let (_file, conn) = create_test_db().unwrap();
    insert_snapshot_row(&conn, &SnapshotRow::new("1161")).unwrap();

    let api = build_api(&conn);
    let mut request = OrderProgressRequest::for_order("1161");
    // push delivery out to a 90-day lead time
    request.delivery_override = Some(date(2025, 4, 1));
    let report = api.order_progress(&request, date(2025, 2, 1)).await.unwrap();

    assert_eq!(report.order.lead_time_days, 90);
    // 0.06 * 90 = 5.4 -> Jan 6
    assert_eq!(report.rows[0].planned_start, date(2025, 1, 6));
}

#[tokio::test]
async fn test_offsets_flow_through_the_pipeline() {
    let (_file, conn) = create_test_db().unwrap();
    let mut row = SnapshotRow::new("1162");
    row.lead_time_days = 70;
    insert_snapshot_row(&conn, &row).unwrap();

    let api = build_api(&conn);
    let mut request = OrderProgressRequest::for_order("1162");
    request.offsets = ExtraDayOffsets::new(10, 0, 0);
    let report = api.order_progress(&request, date(2025, 2, 1)).await.unwrap();

    // core shrinks to 60; sewing carries the full 10 fabric days:
    // 6*0.06*60 = 21.6 -> Jan 22, plus 10 -> Feb 1
    let sewing = &report.rows[4];
    assert_eq!(sewing.planned_start, date(2025, 2, 1));
}

#[tokio::test]
async fn test_mixed_storage_classes_normalize() {
    let (_file, conn) = create_test_db().unwrap();
    // an upstream job wrote epochs and numerics instead of text
    {
        let guard = conn.lock().unwrap();
        guard
            .execute(
                r#"INSERT INTO order_progress (
                    order_code, emission_date, delivery_date, lead_time_days,
                    client_name, requested_kg, requested_units,
                    assembly_pct, dyeing_pct, fabric_approval_pct, cutting_pct, sewing_pct,
                    assembly_min
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
                params![
                    "1163",
                    1735689600i64, // 2025-01-01 UTC
                    "2025-03-02",
                    60i64,
                    "RAGMAN",
                    1000.0,
                    4000.0,
                    55.5f64, // numeric percent, no '%' suffix
                    "48,5%", // comma decimal
                    "garbage",
                    rusqlite::types::Null,
                    "7%",
                    1736065800i64, // 2025-01-05 08:30 UTC
                ],
            )
            .unwrap();
    }

    let api = build_api(&conn);
    let report = api
        .order_progress(&OrderProgressRequest::for_order("1163"), date(2025, 2, 1))
        .await
        .unwrap();

    assert_eq!(report.order.emission_date, Some(date(2025, 1, 1)));
    assert_eq!(report.rows[0].completion_fraction, 0.555);
    assert_eq!(report.rows[1].completion_fraction, 0.485);
    // garbage and null both default to zero
    assert_eq!(report.rows[2].completion_fraction, 0.0);
    assert_eq!(report.rows[3].completion_fraction, 0.0);
    assert_eq!(
        report.rows[0].actual_start.map(|d| d.date()),
        Some(date(2025, 1, 5))
    );
}

#[tokio::test]
async fn test_window_summary_weights_by_quantity_basis() {
    let (_file, conn) = create_test_db().unwrap();

    let mut a = SnapshotRow::new("2001");
    a.requested_kg = 100.0;
    a.requested_units = 10.0;
    a.assembly_pct = "50%".to_string();
    a.cutting_pct = "20%".to_string();
    insert_snapshot_row(&conn, &a).unwrap();

    let mut b = SnapshotRow::new("2002");
    b.requested_kg = 300.0;
    b.requested_units = 30.0;
    b.assembly_pct = "90%".to_string();
    b.cutting_pct = "60%".to_string();
    insert_snapshot_row(&conn, &b).unwrap();

    let api = build_api(&conn);
    let query = WindowQuery {
        from: date(2024, 12, 1),
        to: date(2025, 4, 1),
        clients: vec![],
    };
    let report = api.window_progress(&query, date(2025, 2, 1)).await.unwrap();

    assert_eq!(report.orders.len(), 2);
    // assembly weighted by kg: (100*50 + 300*90) / 400 = 80%
    assert_eq!(report.summary[0].completion_fraction, 0.8);
    // cutting weighted by units: (10*20 + 30*60) / 40 = 50%
    assert_eq!(report.summary[3].completion_fraction, 0.5);
}

#[tokio::test]
async fn test_window_client_filter_and_cache() {
    let (_file, conn) = create_test_db().unwrap();

    let mut a = SnapshotRow::new("2003");
    a.client_name = "RAGMAN TEXTILHA".to_string();
    insert_snapshot_row(&conn, &a).unwrap();
    let mut b = SnapshotRow::new("2004");
    b.client_name = "OTRO CLIENTE".to_string();
    insert_snapshot_row(&conn, &b).unwrap();

    let api = build_api(&conn);
    let query = WindowQuery {
        from: date(2024, 12, 1),
        to: date(2025, 4, 1),
        clients: vec!["RAGMAN".to_string()],
    };
    let first = api.window_progress(&query, date(2025, 2, 1)).await.unwrap();
    assert_eq!(first.orders.len(), 1);
    assert_eq!(first.orders[0].order.order_code, "2003");

    // same arguments hit the memo cache: the Arc is literally shared
    let second = api.window_progress(&query, date(2025, 2, 1)).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_window_joins_plan_records_for_lagging_table() {
    let (_file, conn) = create_test_db().unwrap();

    let mut row = SnapshotRow::new("2005");
    row.assembly_pct = "95%".to_string(); // below the 110 floor
    row.fabric_approval_pct = "120%".to_string(); // above the 100 floor
    insert_snapshot_row(&conn, &row).unwrap();

    let plan_repo = PlanRecordRepository::new(conn.clone());
    let mut record = PlanRecord::new("2005");
    record.placement_date = Some(date(2025, 1, 1));
    record.delivery_date = Some(date(2025, 3, 2));
    record.set_window(
        PlanPhase::Assembly,
        PlanWindow {
            start: date(2025, 1, 4).and_hms_opt(0, 0, 0),
            finish: date(2025, 1, 16).and_hms_opt(0, 0, 0),
        },
    );
    record.set_window(
        PlanPhase::FabricApproval,
        PlanWindow {
            start: date(2025, 1, 20).and_hms_opt(0, 0, 0),
            finish: date(2025, 2, 5).and_hms_opt(0, 0, 0),
        },
    );
    plan_repo.create(&record).unwrap();

    let api = build_api(&conn);
    let query = WindowQuery {
        from: date(2024, 12, 1),
        to: date(2025, 4, 1),
        clients: vec![],
    };
    let report = api.window_progress(&query, date(2025, 2, 1)).await.unwrap();

    assert_eq!(report.plans.len(), 1);
    assert_eq!(report.assessments.len(), 2);
    assert_eq!(report.lagging.len(), 1);
    assert_eq!(report.lagging[0].phase, PlanPhase::Assembly);
    assert_eq!(report.lagging[0].completion_pct, Some(95.0));
}
