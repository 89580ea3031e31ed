// ==========================================
// Seguimiento de pedidos - core library
// ==========================================
// Production-progress tracking for garment orders: derives planned
// phase windows from lead time, reconciles them against observed
// production dates, and serves the table/chart datasets the
// dashboards render. Decision support only - it never writes back
// to the ERP.
// ==========================================

// i18n initialization
rust_i18n::i18n!("locales", fallback = "es");

// ==========================================
// Modules
// ==========================================

// domain layer - entities and types
pub mod domain;

// repository layer - data access
pub mod repository;

// engine layer - business rules
pub mod engine;

// import layer - spreadsheet utilities
pub mod importer;

// configuration layer
pub mod config;

// database infrastructure (connection init / PRAGMA / schema)
pub mod db;

// query-cycle performance instrumentation
pub mod perf;

// logging
pub mod logging;

// i18n helpers
pub mod i18n;

// API layer - business interfaces
pub mod api;

// application layer - wiring and session state
pub mod app;

// ==========================================
// Re-exports
// ==========================================

// domain types
pub use domain::{
    ActualWindow, ExtraDayOffsets, OrderProgress, Phase, PlanPhase, PlanRecord, PlanWindow,
    PlannedWindow, QuantityBasis, RawOrderRecord, RawValue, ScheduleRow, BASE_FACTOR,
};

// engines
pub use engine::{LaggingThresholds, PlanProgressEngine, Reconciler, ScheduleDeriver};

// API
pub use api::{
    ApiError, ApiResult, GanttChart, OrderProgressRequest, PlanApi, ProgressApi, WindowQuery,
};

// ==========================================
// Constants
// ==========================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "Seguimiento de Progreso de Pedidos";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
