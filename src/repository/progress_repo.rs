// ==========================================
// Seguimiento de pedidos - order progress source
// ==========================================
// The Actuals Fetcher boundary. OrderProgressSource abstracts over
// wherever the ERP result actually comes from; the bundled
// implementation reads the local snapshot table, whose cells may
// carry any storage class (the sync jobs are not consistent).
// Repositories return raw records; the normalizer types them.
// ==========================================

use crate::domain::order::{RawOrderRecord, RawValue};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ==========================================
// OrderProgressSource - fetch boundary
// ==========================================
#[async_trait]
pub trait OrderProgressSource: Send + Sync {
    /// One order's snapshot row, or None when the ERP has nothing.
    async fn fetch_order(&self, order_code: &str) -> RepositoryResult<Option<RawOrderRecord>>;

    /// All orders emitted in `[from, to]`, optionally narrowed to
    /// client-name substrings.
    async fn fetch_window(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        client_filters: &[String],
    ) -> RepositoryResult<Vec<RawOrderRecord>>;
}

// ==========================================
// OrderProgressRepository - SQLite snapshot impl
// ==========================================
pub struct OrderProgressRepository {
    conn: Arc<Mutex<Connection>>,
}

const SELECT_COLUMNS: &str = r#"order_code, emission_date, delivery_date, lead_time_days,
       client_name, purchase_order, requested_kg, requested_units,
       assembly_pct, dyeing_pct, fabric_approval_pct, cutting_pct, sewing_pct,
       assembly_min, assembly_max, dyeing_min, dyeing_max,
       fabric_approval_min, fabric_approval_max,
       cutting_min, cutting_max, sewing_min, sewing_max"#;

impl OrderProgressRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RawOrderRecord> {
        Ok(RawOrderRecord {
            order_code: row.get(0)?,
            emission_date: raw_value(row, 1)?,
            delivery_date: raw_value(row, 2)?,
            lead_time_days: raw_value(row, 3)?,
            client_name: row.get(4)?,
            purchase_order: row.get(5)?,
            requested_kg: raw_value(row, 6)?,
            requested_units: raw_value(row, 7)?,
            assembly_pct: raw_value(row, 8)?,
            dyeing_pct: raw_value(row, 9)?,
            fabric_approval_pct: raw_value(row, 10)?,
            cutting_pct: raw_value(row, 11)?,
            sewing_pct: raw_value(row, 12)?,
            assembly_min: raw_value(row, 13)?,
            assembly_max: raw_value(row, 14)?,
            dyeing_min: raw_value(row, 15)?,
            dyeing_max: raw_value(row, 16)?,
            fabric_approval_min: raw_value(row, 17)?,
            fabric_approval_max: raw_value(row, 18)?,
            cutting_min: raw_value(row, 19)?,
            cutting_max: raw_value(row, 20)?,
            sewing_min: raw_value(row, 21)?,
            sewing_max: raw_value(row, 22)?,
        })
    }

    fn query_window(
        conn: &Connection,
        from: NaiveDate,
        to: NaiveDate,
        client_pattern: Option<&str>,
    ) -> RepositoryResult<Vec<RawOrderRecord>> {
        // emission/delivery cells may hold text dates or unix epochs;
        // coerce before comparing so neither kind silently drops out
        let sql = format!(
            r#"SELECT {SELECT_COLUMNS}
               FROM order_progress
               WHERE date(CASE WHEN typeof(emission_date) IN ('integer', 'real')
                               THEN datetime(emission_date, 'unixepoch')
                               ELSE emission_date END) >= date(?1)
                 AND date(CASE WHEN typeof(delivery_date) IN ('integer', 'real')
                               THEN datetime(delivery_date, 'unixepoch')
                               ELSE delivery_date END) <= date(?2)
                 AND (?3 IS NULL OR client_name LIKE ?3)
               ORDER BY order_code"#
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(
                params![
                    from.format("%Y-%m-%d").to_string(),
                    to.format("%Y-%m-%d").to_string(),
                    client_pattern,
                ],
                Self::map_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

#[async_trait]
impl OrderProgressSource for OrderProgressRepository {
    async fn fetch_order(&self, order_code: &str) -> RepositoryResult<Option<RawOrderRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {SELECT_COLUMNS} FROM order_progress WHERE order_code = ?");
        match conn.query_row(&sql, params![order_code], Self::map_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch_window(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        client_filters: &[String],
    ) -> RepositoryResult<Vec<RawOrderRecord>> {
        let conn = self.get_conn()?;

        if client_filters.is_empty() {
            return Self::query_window(&conn, from, to, None);
        }

        // One pass per filter, like the reports run it; an order
        // matching several filters still appears once.
        let mut seen: HashSet<String> = HashSet::new();
        let mut records = Vec::new();
        for client in client_filters {
            let pattern = format!("%{}%", client.trim());
            for record in Self::query_window(&conn, from, to, Some(&pattern))? {
                if seen.insert(record.order_code.clone()) {
                    records.push(record);
                }
            }
        }
        Ok(records)
    }
}

/// Read one cell preserving its storage class.
fn raw_value(row: &Row<'_>, idx: usize) -> rusqlite::Result<RawValue> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => RawValue::Null,
        ValueRef::Integer(i) => RawValue::Integer(i),
        ValueRef::Real(f) => RawValue::Real(f),
        ValueRef::Text(t) => RawValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => RawValue::Text(String::from_utf8_lossy(b).into_owned()),
    })
}
