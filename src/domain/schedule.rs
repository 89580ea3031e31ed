// ==========================================
// Seguimiento de pedidos - schedule domain model
// ==========================================
// ExtraDayOffsets: the optional per-order extra processing days the
// planner may key in. PlannedWindow / ScheduleRow: the derived
// view-model rows, recomputed on every query and never persisted.
// ==========================================

use crate::domain::phase::Phase;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// ExtraDayOffsets - planner-supplied extra days
// ==========================================
// Each category models an external processing stage (printing,
// embroidery, washes) that inserts real calendar days into the
// timeline. A category is "active" only when it has days assigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraDayOffsets {
    /// Días proceso en tela - extra days while goods are still fabric
    pub fabric_days: i64,
    /// Días proceso en pieza - extra days at the dyed-piece stage
    pub piece_days: i64,
    /// Días proceso en prenda - extra days at the finished-garment stage
    pub garment_days: i64,
}

impl ExtraDayOffsets {
    pub fn new(fabric_days: i64, piece_days: i64, garment_days: i64) -> Self {
        Self {
            fabric_days,
            piece_days,
            garment_days,
        }
    }

    pub fn piece_active(&self) -> bool {
        self.piece_days > 0
    }

    pub fn garment_active(&self) -> bool {
        self.garment_days > 0
    }

    /// Sum of all three categories.
    pub fn total(&self) -> i64 {
        self.fabric_days + self.piece_days + self.garment_days
    }
}

// ==========================================
// PlannedWindow - derived phase window
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedWindow {
    pub phase: Phase,
    pub start: NaiveDate,
    pub finish: NaiveDate,
}

// ==========================================
// ScheduleRow - reconciled plan vs actual
// ==========================================
// One row per phase, in production order. Missing actual dates stay
// None; the renderer draws an absent marker, never a sentinel date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub phase: Phase,
    pub planned_start: NaiveDate,
    pub planned_finish: NaiveDate,
    pub actual_start: Option<NaiveDateTime>,
    pub actual_finish: Option<NaiveDateTime>,
    /// Completion clamped into [0, 1].
    pub completion_fraction: f64,
}
