// ==========================================
// Seguimiento de pedidos - API layer
// ==========================================
// Business interfaces consumed by the CLI and any future UI shell.
// All failures are converted to user-facing messages here.
// ==========================================

pub mod error;
pub mod gantt;
pub mod plan_api;
pub mod progress_api;

pub use error::{ApiError, ApiResult};
pub use gantt::{GanttChart, GanttTask};
pub use plan_api::PlanApi;
pub use progress_api::{
    OrderProgressReport, OrderProgressRequest, ProgressApi, WindowProgressReport, WindowQuery,
};
