// ==========================================
// Seguimiento de pedidos - schedule deriver
// ==========================================
// Derives the planned start/finish window for each of the five
// phases from an order's total lead time, using the fixed
// proportional-allocation constants plus the planner's extra-day
// offsets. Pure date arithmetic: no I/O, no error paths.
// ==========================================
// The constants and the offset accrual (including the switch terms
// that cancel algebraically) are kept exactly as the historical
// reports computed them.
// ==========================================

use crate::domain::phase::{Phase, BASE_FACTOR};
use crate::domain::schedule::{ExtraDayOffsets, PlannedWindow};
use crate::engine::normalize::add_fractional_days;
use chrono::NaiveDate;

// ==========================================
// ScheduleDeriver
// ==========================================
pub struct ScheduleDeriver;

impl ScheduleDeriver {
    pub fn new() -> Self {
        Self
    }

    /// Derive the five planned windows.
    ///
    /// # Parameters
    /// - `emission_date`: date the order was placed
    /// - `days_total`: total lead time in days (delivery − emission
    ///   when the caller holds an explicit delivery date)
    /// - `offsets`: extra processing days; offsets exceeding the lead
    ///   time drive `core_days` negative and the windows simply run
    ///   backwards; callers are expected to supply sane values
    ///
    /// # Returns
    /// One window per phase, in production order.
    pub fn derive(
        &self,
        emission_date: NaiveDate,
        days_total: i64,
        offsets: &ExtraDayOffsets,
    ) -> Vec<PlannedWindow> {
        let core_days = (days_total - offsets.total()) as f64;

        Phase::ALL
            .iter()
            .map(|&phase| {
                let accrued = Self::accrued_offset_days(phase, offsets);
                let start_days = phase.start_multiple() * BASE_FACTOR * core_days + accrued;
                let finish_days = (phase.start_multiple() * BASE_FACTOR
                    + phase.duration_fraction())
                    * core_days
                    + accrued;

                PlannedWindow {
                    phase,
                    start: add_fractional_days(emission_date, start_days),
                    finish: add_fractional_days(emission_date, finish_days),
                }
            })
            .collect()
    }

    /// Convenience wrapper taking an explicit delivery date.
    pub fn derive_between(
        &self,
        emission_date: NaiveDate,
        delivery_date: NaiveDate,
        offsets: &ExtraDayOffsets,
    ) -> Vec<PlannedWindow> {
        let days_total = (delivery_date - emission_date).num_days();
        self.derive(emission_date, days_total, offsets)
    }

    /// Extra days accrued at a phase's position in the timeline.
    ///
    /// Fabric days push everything from fabric approval onwards. Piece
    /// and garment days are added with the full total and subtracted
    /// back once their stage is crossed, gated on the category being
    /// active. The gating leaves the subtraction a no-op for inactive
    /// categories (their day count is zero), but the rule is written
    /// out rather than simplified because it is the business rule the
    /// plant signed off on. Sewing always carries the full total: it is
    /// scheduled after fabric, piece and garment processing alike.
    fn accrued_offset_days(phase: Phase, offsets: &ExtraDayOffsets) -> f64 {
        let total = offsets.total() as f64;
        let piece = offsets.piece_days as f64;
        let garment = offsets.garment_days as f64;

        let piece_switch = if offsets.piece_active() { 1.0 } else { 0.0 };
        let garment_switch = if offsets.garment_active() { 1.0 } else { 0.0 };

        match phase {
            Phase::Assembly | Phase::Dyeing => 0.0,
            Phase::FabricApproval => total - piece * piece_switch - garment * garment_switch,
            Phase::Cutting => total - garment * garment_switch,
            Phase::Sewing => total,
        }
    }
}

impl Default for ScheduleDeriver {
    fn default() -> Self {
        Self::new()
    }
}
