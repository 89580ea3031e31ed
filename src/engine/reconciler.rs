// ==========================================
// Seguimiento de pedidos - plan/actual reconciler
// ==========================================
// Merges the derived windows with the observed production dates and
// completion percentages into one row per phase, and folds a batch
// of orders into the consolidated RESUMEN row set.
// Row order is the production sequence and is preserved no matter
// how the inputs arrive.
// ==========================================

use crate::domain::order::{phase_index, OrderProgress};
use crate::domain::phase::Phase;
use crate::domain::schedule::{PlannedWindow, ScheduleRow};
use crate::engine::normalize::{percent_to_fraction, ratio_or_zero};

// ==========================================
// Reconciler
// ==========================================
pub struct Reconciler;

impl Reconciler {
    pub fn new() -> Self {
        Self
    }

    /// Merge one order's planned windows with its observed progress.
    ///
    /// `planned` may arrive in any order; the output is always the five
    /// phases in production sequence. Missing actual dates pass through
    /// as `None` and never fail the merge.
    pub fn reconcile(
        &self,
        order: &OrderProgress,
        planned: &[PlannedWindow],
    ) -> Vec<ScheduleRow> {
        Phase::ALL
            .iter()
            .filter_map(|&phase| {
                let window = planned.iter().find(|w| w.phase == phase)?;
                let actual = order.actual_for(phase);
                Some(ScheduleRow {
                    phase,
                    planned_start: window.start,
                    planned_finish: window.finish,
                    actual_start: actual.start,
                    actual_finish: actual.finish,
                    completion_fraction: percent_to_fraction(order.completion_for(phase)),
                })
            })
            .collect()
    }

    /// Fold several orders' reconciled rows into one summary row set.
    ///
    /// Completion is a weighted average: kilogram phases weighted by
    /// each order's requested kilograms, unit phases by its unit count;
    /// a batch with zero total weight for a phase reports 0. Planned
    /// and actual dates aggregate as min(start) / max(finish) across
    /// the batch.
    pub fn summarize(&self, orders: &[(OrderProgress, Vec<ScheduleRow>)]) -> Vec<ScheduleRow> {
        Phase::ALL
            .iter()
            .filter_map(|&phase| {
                let idx = phase_index(phase);

                let mut weighted_sum = 0.0;
                let mut weight_total = 0.0;
                let mut planned_start = None;
                let mut planned_finish = None;
                let mut actual_start = None;
                let mut actual_finish = None;

                for (order, rows) in orders {
                    let row = rows.get(idx)?;
                    debug_assert_eq!(row.phase, phase);

                    let weight = order.weight_for(phase);
                    weighted_sum += weight * order.completion_for(phase);
                    weight_total += weight;

                    planned_start = min_date(planned_start, Some(row.planned_start));
                    planned_finish = max_date(planned_finish, Some(row.planned_finish));
                    actual_start = min_datetime(actual_start, row.actual_start);
                    actual_finish = max_datetime(actual_finish, row.actual_finish);
                }

                let percent = ratio_or_zero(weighted_sum, weight_total);

                Some(ScheduleRow {
                    phase,
                    planned_start: planned_start?,
                    planned_finish: planned_finish?,
                    actual_start,
                    actual_finish,
                    completion_fraction: percent_to_fraction(percent),
                })
            })
            .collect()
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

fn min_date(
    current: Option<chrono::NaiveDate>,
    candidate: Option<chrono::NaiveDate>,
) -> Option<chrono::NaiveDate> {
    match (current, candidate) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn max_date(
    current: Option<chrono::NaiveDate>,
    candidate: Option<chrono::NaiveDate>,
) -> Option<chrono::NaiveDate> {
    match (current, candidate) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn min_datetime(
    current: Option<chrono::NaiveDateTime>,
    candidate: Option<chrono::NaiveDateTime>,
) -> Option<chrono::NaiveDateTime> {
    match (current, candidate) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn max_datetime(
    current: Option<chrono::NaiveDateTime>,
    candidate: Option<chrono::NaiveDateTime>,
) -> Option<chrono::NaiveDateTime> {
    match (current, candidate) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}
