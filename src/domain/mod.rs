// ==========================================
// Seguimiento de pedidos - domain layer
// ==========================================
// Entities, value types and the fixed production-phase model.
// No data access, no engine logic.
// ==========================================

pub mod order;
pub mod phase;
pub mod plan;
pub mod schedule;

pub use order::{phase_index, ActualWindow, OrderProgress, RawOrderRecord, RawValue};
pub use phase::{Phase, QuantityBasis, BASE_FACTOR};
pub use plan::{PlanPhase, PlanRecord, PlanWindow};
pub use schedule::{ExtraDayOffsets, PlannedWindow, ScheduleRow};
