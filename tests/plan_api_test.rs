// ==========================================
// PlanApi integration tests
// ==========================================
// CRUD round trips for the planning store, including boundary
// validation.
// ==========================================

mod test_helpers;

use chrono::NaiveDate;
use garment_progress::api::plan_api::PlanApi;
use garment_progress::domain::plan::{PlanPhase, PlanRecord, PlanWindow};
use garment_progress::repository::plan_repo::PlanRecordRepository;
use garment_progress::ApiError;
use std::sync::Arc;
use test_helpers::create_test_db;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_record(order_id: &str) -> PlanRecord {
    let mut record = PlanRecord::new(order_id);
    record.placement_date = Some(date(2024, 5, 3));
    record.delivery_date = Some(date(2024, 7, 8));
    record.set_window(
        PlanPhase::Assembly,
        PlanWindow {
            start: date(2024, 5, 6).and_hms_opt(0, 0, 0),
            finish: date(2024, 5, 16).and_hms_opt(0, 0, 0),
        },
    );
    record.set_window(
        PlanPhase::GarmentProcessing,
        PlanWindow {
            start: date(2024, 6, 25).and_hms_opt(8, 0, 0),
            finish: None,
        },
    );
    record
}

fn build_api(conn: &std::sync::Arc<std::sync::Mutex<rusqlite::Connection>>) -> PlanApi {
    PlanApi::new(Arc::new(PlanRecordRepository::new(conn.clone())))
}

#[test]
fn test_create_and_read_round_trip() {
    let (_file, conn) = create_test_db().unwrap();
    let api = build_api(&conn);

    api.create(&sample_record("1160")).unwrap();
    let loaded = api.get("1160").unwrap().expect("record should exist");

    assert_eq!(loaded.placement_date, Some(date(2024, 5, 3)));
    assert_eq!(loaded.delivery_date, Some(date(2024, 7, 8)));
    let assembly = loaded.window(PlanPhase::Assembly);
    assert_eq!(assembly.start, date(2024, 5, 6).and_hms_opt(0, 0, 0));
    assert_eq!(assembly.finish, date(2024, 5, 16).and_hms_opt(0, 0, 0));
    // half-filled window survives as-is
    let processing = loaded.window(PlanPhase::GarmentProcessing);
    assert_eq!(processing.start, date(2024, 6, 25).and_hms_opt(8, 0, 0));
    assert_eq!(processing.finish, None);
    // untouched phases stay empty
    assert_eq!(loaded.window(PlanPhase::Dyeing), PlanWindow::default());
}

#[test]
fn test_duplicate_create_rejected() {
    let (_file, conn) = create_test_db().unwrap();
    let api = build_api(&conn);

    api.create(&sample_record("1160")).unwrap();
    let err = api.create(&sample_record("1160")).unwrap_err();
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
}

#[test]
fn test_update_and_delete() {
    let (_file, conn) = create_test_db().unwrap();
    let api = build_api(&conn);

    api.create(&sample_record("1160")).unwrap();

    let mut updated = sample_record("1160");
    updated.set_window(
        PlanPhase::Sewing,
        PlanWindow {
            start: date(2024, 6, 10).and_hms_opt(0, 0, 0),
            finish: date(2024, 7, 1).and_hms_opt(0, 0, 0),
        },
    );
    api.update(&updated).unwrap();
    let loaded = api.get("1160").unwrap().unwrap();
    assert!(loaded.window(PlanPhase::Sewing).start.is_some());

    api.delete("1160").unwrap();
    assert!(api.get("1160").unwrap().is_none());
    // deleting a missing record stays quiet
    api.delete("1160").unwrap();
}

#[test]
fn test_update_missing_record_reports_not_found() {
    let (_file, conn) = create_test_db().unwrap();
    let api = build_api(&conn);

    let err = api.update(&sample_record("9999")).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_validation_rejects_bad_input() {
    let (_file, conn) = create_test_db().unwrap();
    let api = build_api(&conn);

    let err = api.create(&sample_record("   ")).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let mut backwards = sample_record("1161");
    backwards.delivery_date = Some(date(2024, 1, 1));
    let err = api.create(&backwards).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[test]
fn test_list_window() {
    let (_file, conn) = create_test_db().unwrap();
    let api = build_api(&conn);

    api.create(&sample_record("1160")).unwrap();
    let mut late = sample_record("1200");
    late.placement_date = Some(date(2024, 9, 1));
    late.delivery_date = Some(date(2024, 11, 1));
    api.create(&late).unwrap();

    let inside = api.list_window(date(2024, 4, 1), date(2024, 8, 1)).unwrap();
    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].order_id, "1160");

    let all = api.list().unwrap();
    assert_eq!(all.len(), 2);
}
