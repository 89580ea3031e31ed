// ==========================================
// Seguimiento de pedidos - configuration manager
// ==========================================
// Key-value configuration over the config_kv table (global scope),
// with compiled defaults for every key so a fresh database works
// untouched.
// ==========================================

use crate::db::configure_sqlite_connection;
use crate::engine::progress::LaggingThresholds;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// Configuration keys
pub mod config_keys {
    /// Per-phase completion floors for the lagging filter, JSON object
    pub const LAGGING_THRESHOLDS: &str = "progress/lagging_thresholds";
    /// Half-span in days of the default query window around today
    pub const DEFAULT_WINDOW_DAYS: &str = "query/default_window_days";
    /// UI language for user-facing messages ("es" / "en")
    pub const LOCALE: &str = "ui/locale";
}

/// Default half-span of the query window: three months either side.
const DEFAULT_WINDOW_DAYS: i64 = 90;

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Wrap an existing connection.
    ///
    /// Re-applies the uniform PRAGMAs; doing so twice is harmless.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let guard = conn
                .lock()
                .map_err(|e| format!("lock acquisition failed: {}", e))?;
            configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("lock acquisition failed: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// Write a configuration value (global scope, upsert).
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("lock acquisition failed: {}", e))?;

        conn.execute(
            r#"INSERT INTO config_kv (scope_id, key, value, updated_at)
               VALUES ('global', ?1, ?2, datetime('now'))
               ON CONFLICT(scope_id, key)
               DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
            params![key, value],
        )?;
        Ok(())
    }

    // ==========================================
    // Typed getters
    // ==========================================

    /// Completion floors for the lagging filter.
    ///
    /// Stored as a JSON object; absent or unparseable values fall back
    /// to the plant's agreed defaults.
    pub fn get_lagging_thresholds(&self) -> Result<LaggingThresholds, Box<dyn Error>> {
        match self.get_config_value(config_keys::LAGGING_THRESHOLDS)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(thresholds) => Ok(thresholds),
                Err(e) => {
                    tracing::warn!(error = %e, "malformed lagging thresholds in config, using defaults");
                    Ok(LaggingThresholds::default())
                }
            },
            None => Ok(LaggingThresholds::default()),
        }
    }

    pub fn set_lagging_thresholds(
        &self,
        thresholds: &LaggingThresholds,
    ) -> Result<(), Box<dyn Error>> {
        let raw = serde_json::to_string(thresholds)?;
        self.set_config_value(config_keys::LAGGING_THRESHOLDS, &raw)
    }

    /// Half-span in days of the default query window around today.
    pub fn get_default_window_days(&self) -> Result<i64, Box<dyn Error>> {
        match self.get_config_value(config_keys::DEFAULT_WINDOW_DAYS)? {
            Some(raw) => Ok(raw.trim().parse::<i64>().unwrap_or(DEFAULT_WINDOW_DAYS)),
            None => Ok(DEFAULT_WINDOW_DAYS),
        }
    }

    /// Locale for user-facing messages.
    pub fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(config_keys::LOCALE)?
            .unwrap_or_else(|| "es".to_string()))
    }
}
