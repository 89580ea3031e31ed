// ==========================================
// Seguimiento de pedidos - engine layer
// ==========================================
// Business rules: schedule derivation, plan/actual reconciliation,
// plan-vs-today assessment, input normalization.
// Engines never touch SQL; repositories feed them typed data.
// ==========================================

pub mod deriver;
pub mod normalize;
pub mod progress;
pub mod reconciler;

pub use deriver::ScheduleDeriver;
pub use progress::{LaggingThresholds, PhaseProgress, PlanProgressEngine};
pub use reconciler::Reconciler;
