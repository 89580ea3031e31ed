// ==========================================
// Seguimiento de pedidos - application state
// ==========================================
// Wires the shared connection, configuration, repositories, engines
// and API instances together. One instance per process.
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{PlanApi, ProgressApi};
use crate::config::ConfigManager;
use crate::db::{configure_sqlite_connection, ensure_schema};
use crate::engine::PlanProgressEngine;
use crate::repository::{OrderProgressRepository, PlanRecordRepository};
use rusqlite::Connection;

// ==========================================
// AppState
// ==========================================
pub struct AppState {
    pub db_path: String,

    pub progress_api: Arc<ProgressApi>,
    pub plan_api: Arc<PlanApi>,
    pub config: Arc<ConfigManager>,
}

impl AppState {
    /// Open the database, bootstrap the schema and build the API stack.
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("initializing AppState, database: {}", db_path);

        let mut conn =
            Connection::open(&db_path).map_err(|e| format!("cannot open database: {}", e))?;
        configure_sqlite_connection(&conn)
            .map_err(|e| format!("cannot configure connection: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("cannot initialize schema: {}", e))?;
        crate::perf::install_sqlite_tracing(&mut conn);
        let conn = Arc::new(Mutex::new(conn));

        let config = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("cannot create ConfigManager: {}", e))?,
        );

        let progress_repo = Arc::new(OrderProgressRepository::new(conn.clone()));
        let plan_repo = Arc::new(PlanRecordRepository::new(conn.clone()));

        let thresholds = config
            .get_lagging_thresholds()
            .map_err(|e| format!("cannot read lagging thresholds: {}", e))?;
        let progress_engine = PlanProgressEngine::new(thresholds);

        let progress_api = Arc::new(ProgressApi::new(
            progress_repo,
            plan_repo.clone(),
            progress_engine,
        ));
        let plan_api = Arc::new(PlanApi::new(plan_repo));

        tracing::info!("AppState ready");
        Ok(Self {
            db_path,
            progress_api,
            plan_api,
            config,
        })
    }
}

/// Default database location.
///
/// `GARMENT_PROGRESS_DB` wins when set (debugging, tests, CI); the
/// user data directory otherwise, with a dev-suffixed folder in debug
/// builds so development never pollutes production data.
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("GARMENT_PROGRESS_DB") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./garment_progress.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("garment-progress-dev");
        }
        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("garment-progress");
        }
        if let Err(e) = std::fs::create_dir_all(&path) {
            tracing::warn!("cannot create data dir {:?}: {}", path, e);
            path = PathBuf::from(".");
        }
        path = path.join("garment_progress.db");
    }

    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }
}
