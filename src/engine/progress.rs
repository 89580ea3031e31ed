// ==========================================
// Seguimiento de pedidos - plan progress assessment
// ==========================================
// Compares a planning record's phase windows against today's date:
// how far along each window should be by now, how many days remain,
// and which phases are lagging behind their ERP completion
// percentage. Feeds the "Situación de procesos" table.
// ==========================================

use crate::domain::order::OrderProgress;
use crate::domain::plan::{PlanPhase, PlanRecord};
use crate::engine::normalize::clamp;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// LaggingThresholds - per-phase completion floors
// ==========================================
// A phase whose ERP completion percent is below its floor is flagged.
// Floors above 100 are deliberate: fabric phases over-produce to
// cover shrinkage and seconds, so anything under 110% of the order
// quantity still needs chasing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaggingThresholds {
    pub assembly: f64,
    pub dyeing: f64,
    pub fabric_approval: f64,
    pub cutting: f64,
    pub sewing: f64,
}

impl Default for LaggingThresholds {
    fn default() -> Self {
        Self {
            assembly: 110.0,
            dyeing: 110.0,
            fabric_approval: 100.0,
            cutting: 105.0,
            sewing: 105.0,
        }
    }
}

impl LaggingThresholds {
    fn for_phase(&self, phase: crate::domain::phase::Phase) -> f64 {
        use crate::domain::phase::Phase;
        match phase {
            Phase::Assembly => self.assembly,
            Phase::Dyeing => self.dyeing,
            Phase::FabricApproval => self.fabric_approval,
            Phase::Cutting => self.cutting,
            Phase::Sewing => self.sewing,
        }
    }
}

// ==========================================
// PhaseProgress - one assessed plan window
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseProgress {
    pub order_id: String,
    pub phase: PlanPhase,
    /// ERP completion percent, when the phase has one (core phases only)
    pub completion_pct: Option<f64>,
    /// How far along the planned window should be today, [0, 100]
    pub elapsed_pct: f64,
    /// Days until the planned finish; negative once overdue
    pub days_remaining: i64,
    /// Below the completion floor for this phase
    pub lagging: bool,
}

// ==========================================
// PlanProgressEngine
// ==========================================
pub struct PlanProgressEngine {
    thresholds: LaggingThresholds,
}

impl PlanProgressEngine {
    pub fn new(thresholds: LaggingThresholds) -> Self {
        Self { thresholds }
    }

    /// Assess every plan-record phase that has both window dates.
    ///
    /// `erp` supplies the completion percentages for the five core
    /// phases; the two processing-only phases are assessed on dates
    /// alone. Phases with an incomplete window are skipped, matching
    /// how the planning sheet treats half-filled rows.
    pub fn assess(
        &self,
        record: &PlanRecord,
        erp: Option<&OrderProgress>,
        today: NaiveDate,
    ) -> Vec<PhaseProgress> {
        PlanPhase::ALL
            .iter()
            .filter_map(|&phase| {
                let window = record.window(phase);
                let (start, finish) = match (window.start, window.finish) {
                    (Some(s), Some(f)) => (s.date(), f.date()),
                    _ => return None,
                };

                let span_days = (finish - start).num_days();
                let elapsed_pct = if span_days > 0 {
                    let gone = (today - start).num_days() as f64;
                    clamp(gone / span_days as f64 * 100.0, 0.0, 100.0)
                } else if today >= finish {
                    // degenerate zero-length window
                    100.0
                } else {
                    0.0
                };

                let completion_pct = phase
                    .core_phase()
                    .and_then(|core| erp.map(|o| o.completion_for(core)));

                let lagging = match (phase.core_phase(), completion_pct) {
                    (Some(core), Some(pct)) => pct < self.thresholds.for_phase(core),
                    _ => false,
                };

                Some(PhaseProgress {
                    order_id: record.order_id.clone(),
                    phase,
                    completion_pct,
                    elapsed_pct,
                    days_remaining: (finish - today).num_days(),
                    lagging,
                })
            })
            .collect()
    }

    /// Just the lagging rows, across a batch of assessments.
    pub fn lagging<'a>(&self, assessed: &'a [PhaseProgress]) -> Vec<&'a PhaseProgress> {
        assessed.iter().filter(|p| p.lagging).collect()
    }
}

impl Default for PlanProgressEngine {
    fn default() -> Self {
        Self::new(LaggingThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::ActualWindow;
    use crate::domain::plan::PlanWindow;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record_with_window(phase: PlanPhase, from: NaiveDate, to: NaiveDate) -> PlanRecord {
        let mut record = PlanRecord::new("1160");
        record.set_window(
            phase,
            PlanWindow {
                start: from.and_hms_opt(0, 0, 0),
                finish: to.and_hms_opt(0, 0, 0),
            },
        );
        record
    }

    fn erp_with(completion_pct: [f64; 5]) -> OrderProgress {
        OrderProgress {
            order_code: "1160".to_string(),
            emission_date: None,
            delivery_date: None,
            lead_time_days: 0,
            client_name: None,
            purchase_order: None,
            requested_kg: 0.0,
            requested_units: 0.0,
            completion_pct,
            actual: [ActualWindow::default(); 5],
        }
    }

    #[test]
    fn test_elapsed_midway() {
        let engine = PlanProgressEngine::default();
        let record = record_with_window(PlanPhase::Cutting, date(2025, 3, 1), date(2025, 3, 11));
        let rows = engine.assess(&record, None, date(2025, 3, 6));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].elapsed_pct, 50.0);
        assert_eq!(rows[0].days_remaining, 5);
        assert!(!rows[0].lagging);
    }

    #[test]
    fn test_elapsed_clamps_before_and_after() {
        let engine = PlanProgressEngine::default();
        let record = record_with_window(PlanPhase::Sewing, date(2025, 3, 1), date(2025, 3, 11));
        let before = engine.assess(&record, None, date(2025, 2, 1));
        assert_eq!(before[0].elapsed_pct, 0.0);
        let after = engine.assess(&record, None, date(2025, 4, 1));
        assert_eq!(after[0].elapsed_pct, 100.0);
        assert_eq!(after[0].days_remaining, -21);
    }

    #[test]
    fn test_zero_length_window() {
        let engine = PlanProgressEngine::default();
        let day = date(2025, 3, 5);
        let record = record_with_window(PlanPhase::Assembly, day, day);
        assert_eq!(engine.assess(&record, None, date(2025, 3, 4))[0].elapsed_pct, 0.0);
        assert_eq!(engine.assess(&record, None, day)[0].elapsed_pct, 100.0);
    }

    #[test]
    fn test_half_filled_window_skipped() {
        let engine = PlanProgressEngine::default();
        let mut record = PlanRecord::new("1160");
        record.set_window(
            PlanPhase::Dyeing,
            PlanWindow {
                start: date(2025, 3, 1).and_hms_opt(0, 0, 0),
                finish: None,
            },
        );
        assert!(engine.assess(&record, None, date(2025, 3, 6)).is_empty());
    }

    #[test]
    fn test_lagging_thresholds() {
        let engine = PlanProgressEngine::default();
        let mut record = record_with_window(PlanPhase::Assembly, date(2025, 3, 1), date(2025, 3, 11));
        record.set_window(
            PlanPhase::FabricApproval,
            PlanWindow {
                start: date(2025, 3, 5).and_hms_opt(0, 0, 0),
                finish: date(2025, 3, 15).and_hms_opt(0, 0, 0),
            },
        );
        // assembly floor is 110 -> 109 lags; telaprob floor is 100 -> 100 does not
        let erp = erp_with([109.0, 0.0, 100.0, 0.0, 0.0]);
        let rows = engine.assess(&record, Some(&erp), date(2025, 3, 6));
        let lagging = engine.lagging(&rows);
        assert_eq!(lagging.len(), 1);
        assert_eq!(lagging[0].phase, PlanPhase::Assembly);
    }

    #[test]
    fn test_processing_phases_never_lag() {
        let engine = PlanProgressEngine::default();
        let record =
            record_with_window(PlanPhase::GarmentProcessing, date(2025, 3, 1), date(2025, 3, 11));
        let erp = erp_with([0.0; 5]);
        let rows = engine.assess(&record, Some(&erp), date(2025, 3, 6));
        assert_eq!(rows[0].completion_pct, None);
        assert!(!rows[0].lagging);
    }
}
