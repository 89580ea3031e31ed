// ==========================================
// Test helpers
// ==========================================
// Database bootstrap and snapshot-row builders shared by the
// integration tests.
// ==========================================

use garment_progress::db::{configure_sqlite_connection, ensure_schema};
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// Create a temporary database with the full schema.
///
/// The NamedTempFile must stay alive for the duration of the test.
pub fn create_test_db() -> Result<(NamedTempFile, Arc<Mutex<Connection>>), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = Connection::open(&db_path)?;
    configure_sqlite_connection(&conn)?;
    ensure_schema(&conn)?;

    Ok((temp_file, Arc::new(Mutex::new(conn))))
}

/// One ERP snapshot row with sensible defaults; override per test.
pub struct SnapshotRow {
    pub order_code: String,
    pub emission_date: String,
    pub delivery_date: String,
    pub lead_time_days: i64,
    pub client_name: String,
    pub requested_kg: f64,
    pub requested_units: f64,
    pub assembly_pct: String,
    pub dyeing_pct: String,
    pub fabric_approval_pct: String,
    pub cutting_pct: String,
    pub sewing_pct: String,
    pub assembly_min: Option<String>,
    pub assembly_max: Option<String>,
}

impl SnapshotRow {
    pub fn new(order_code: &str) -> Self {
        Self {
            order_code: order_code.to_string(),
            emission_date: "2025-01-01".to_string(),
            delivery_date: "2025-03-02".to_string(),
            lead_time_days: 60,
            client_name: "RAGMAN TEXTILHA".to_string(),
            requested_kg: 1000.0,
            requested_units: 4000.0,
            assembly_pct: "0%".to_string(),
            dyeing_pct: "0%".to_string(),
            fabric_approval_pct: "0%".to_string(),
            cutting_pct: "0%".to_string(),
            sewing_pct: "0%".to_string(),
            assembly_min: None,
            assembly_max: None,
        }
    }
}

/// Insert a snapshot row.
pub fn insert_snapshot_row(
    conn: &Arc<Mutex<Connection>>,
    row: &SnapshotRow,
) -> Result<(), Box<dyn Error>> {
    let guard = conn.lock().unwrap();
    guard.execute(
        r#"INSERT INTO order_progress (
            order_code, emission_date, delivery_date, lead_time_days,
            client_name, purchase_order, requested_kg, requested_units,
            assembly_pct, dyeing_pct, fabric_approval_pct, cutting_pct, sewing_pct,
            assembly_min, assembly_max
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        params![
            row.order_code,
            row.emission_date,
            row.delivery_date,
            row.lead_time_days,
            row.client_name,
            Option::<String>::None,
            row.requested_kg,
            row.requested_units,
            row.assembly_pct,
            row.dyeing_pct,
            row.fabric_approval_pct,
            row.cutting_pct,
            row.sewing_pct,
            row.assembly_min,
            row.assembly_max,
        ],
    )?;
    Ok(())
}
