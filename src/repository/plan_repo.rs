// ==========================================
// Seguimiento de pedidos - planning record repository
// ==========================================
// CRUD over the manually-maintained planning store, one row per
// order with a start/finish pair for each of the seven tracked
// phases. No business logic here; validation lives in the API.
// ==========================================

use crate::domain::plan::{PlanPhase, PlanRecord, PlanWindow};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const DATE_FMT: &str = "%Y-%m-%d";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

// Column order everywhere: key, the two order dates, then the seven
// start/finish pairs in PlanPhase::ALL order.
const RECORD_COLUMNS: &str = r#"order_id, placement_date, delivery_date,
       armado_start, armado_finish, tenido_start, tenido_finish,
       proc_tela_start, proc_tela_finish, telaprob_start, telaprob_finish,
       corte_start, corte_finish, costura_start, costura_finish,
       proc_prenda_start, proc_prenda_finish"#;

// ==========================================
// PlanRecordRepository
// ==========================================
pub struct PlanRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlanRecordRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert a new planning record.
    ///
    /// # Returns
    /// - `Ok(order_id)` on success
    /// - `Err(UniqueConstraintViolation)` when the order already has one
    pub fn create(&self, record: &PlanRecord) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let sql = format!(
            "INSERT INTO plan_record ({RECORD_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        conn.execute(&sql, rusqlite::params_from_iter(record_params(record)))?;
        Ok(record.order_id.clone())
    }

    /// Point read by order id.
    pub fn find_by_order(&self, order_id: &str) -> RepositoryResult<Option<PlanRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {RECORD_COLUMNS} FROM plan_record WHERE order_id = ?");
        match conn.query_row(&sql, params![order_id], map_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Full read, ordered by order id.
    pub fn list_all(&self) -> RepositoryResult<Vec<PlanRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {RECORD_COLUMNS} FROM plan_record ORDER BY order_id");
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map([], map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Records whose placement/delivery dates fall inside `[from, to]`.
    pub fn list_window(&self, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Vec<PlanRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"SELECT {RECORD_COLUMNS} FROM plan_record
               WHERE placement_date >= ?1 AND delivery_date <= ?2
               ORDER BY order_id"#
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(
                params![
                    from.format(DATE_FMT).to_string(),
                    to.format(DATE_FMT).to_string()
                ],
                map_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Update an existing record in full.
    ///
    /// # Returns
    /// - `Err(NotFound)` when no record exists for the order
    pub fn update(&self, record: &PlanRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"UPDATE plan_record SET
                   placement_date = ?2, delivery_date = ?3,
                   armado_start = ?4, armado_finish = ?5,
                   tenido_start = ?6, tenido_finish = ?7,
                   proc_tela_start = ?8, proc_tela_finish = ?9,
                   telaprob_start = ?10, telaprob_finish = ?11,
                   corte_start = ?12, corte_finish = ?13,
                   costura_start = ?14, costura_finish = ?15,
                   proc_prenda_start = ?16, proc_prenda_finish = ?17,
                   updated_at = datetime('now')
               WHERE order_id = ?1"#,
            rusqlite::params_from_iter(record_params(record)),
        )?;

        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "PlanRecord".to_string(),
                id: record.order_id.clone(),
            });
        }
        Ok(())
    }

    /// Delete by order id. Deleting a missing record is a no-op.
    pub fn delete(&self, order_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM plan_record WHERE order_id = ?", params![order_id])?;
        Ok(())
    }
}

/// Bind values in column order: key, order dates, seven window pairs.
fn record_params(record: &PlanRecord) -> Vec<Option<String>> {
    let mut values: Vec<Option<String>> = Vec::with_capacity(17);
    values.push(Some(record.order_id.clone()));
    values.push(record.placement_date.map(|d| d.format(DATE_FMT).to_string()));
    values.push(record.delivery_date.map(|d| d.format(DATE_FMT).to_string()));
    for phase in PlanPhase::ALL {
        let window = record.window(phase);
        values.push(window.start.map(|dt| dt.format(DATETIME_FMT).to_string()));
        values.push(window.finish.map(|dt| dt.format(DATETIME_FMT).to_string()));
    }
    values
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<PlanRecord> {
    let mut record = PlanRecord::new(row.get::<_, String>(0)?);
    record.placement_date = get_date(row, 1)?;
    record.delivery_date = get_date(row, 2)?;

    for (i, phase) in PlanPhase::ALL.iter().enumerate() {
        let start = get_datetime(row, 3 + 2 * i)?;
        let finish = get_datetime(row, 4 + 2 * i)?;
        record.set_window(*phase, PlanWindow { start, finish });
    }
    Ok(record)
}

fn get_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let text: Option<String> = row.get(idx)?;
    Ok(text.and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FMT).ok()))
}

fn get_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDateTime>> {
    let text: Option<String> = row.get(idx)?;
    Ok(text.and_then(|s| {
        let trimmed = s.trim();
        NaiveDateTime::parse_from_str(trimmed, DATETIME_FMT)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, DATE_FMT)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }))
}
