// ==========================================
// Seguimiento de pedidos - SQLite infrastructure
// ==========================================
// Single place for Connection::open PRAGMA behavior, so no module
// ends up with foreign keys half-enabled or its own busy_timeout.
// Also owns the local schema: the ERP snapshot table, the planning
// store and the config table.
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Schema version the code expects. Bump together with `ensure_schema`.
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Apply the uniform PRAGMAs to a connection.
///
/// foreign_keys and busy_timeout are per-connection settings and must
/// be re-applied on every open.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a connection with the uniform configuration applied.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create the local tables when missing and stamp the schema version.
///
/// The snapshot columns holding dates and percentages are declared
/// without a type name on purpose: the upstream sync jobs write
/// whatever storage class they hold (TEXT in several formats, epoch
/// INTEGER, REAL) and an affinity would silently coerce them. The
/// normalizer is the one place that interprets these cells.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS order_progress (
            order_code TEXT PRIMARY KEY,
            emission_date,
            delivery_date,
            lead_time_days,
            client_name TEXT,
            purchase_order TEXT,
            requested_kg,
            requested_units,
            assembly_pct,
            dyeing_pct,
            fabric_approval_pct,
            cutting_pct,
            sewing_pct,
            assembly_min,
            assembly_max,
            dyeing_min,
            dyeing_max,
            fabric_approval_min,
            fabric_approval_max,
            cutting_min,
            cutting_max,
            sewing_min,
            sewing_max,
            imported_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS plan_record (
            order_id TEXT PRIMARY KEY,
            placement_date TEXT,
            delivery_date TEXT,
            armado_start TEXT,
            armado_finish TEXT,
            tenido_start TEXT,
            tenido_finish TEXT,
            proc_tela_start TEXT,
            proc_tela_finish TEXT,
            telaprob_start TEXT,
            telaprob_finish TEXT,
            corte_start TEXT,
            corte_finish TEXT,
            costura_start TEXT,
            costura_finish TEXT,
            proc_prenda_start TEXT,
            proc_prenda_finish TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL DEFAULT 'global',
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// Read the stored schema_version (None when the table is missing).
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_snapshot_columns_keep_storage_class() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO order_progress (order_code, emission_date, assembly_min) VALUES (?, ?, ?)",
            rusqlite::params!["1160", 1714953600i64, "2024-05-10"],
        )
        .unwrap();
        let stored: i64 = conn
            .query_row(
                "SELECT emission_date FROM order_progress WHERE order_code='1160'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stored, 1714953600);
    }
}
