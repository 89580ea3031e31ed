// ==========================================
// Seguimiento de pedidos - order domain model
// ==========================================
// RawOrderRecord is the tabular row exactly as the ERP-shaped
// source yields it (loosely typed, percentages still carry their
// '%' suffix). OrderProgress is the typed form after the
// parse-validate boundary. Nothing downstream of that boundary
// touches a raw string again.
// ==========================================

use crate::domain::phase::Phase;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// RawValue - one loosely-typed source cell
// ==========================================
// The snapshot tables are written by several upstream jobs and the
// same column arrives as TEXT, INTEGER epoch or REAL depending on
// which job wrote the row.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Text(String),
    Integer(i64),
    Real(f64),
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }
}

impl From<Option<String>> for RawValue {
    fn from(v: Option<String>) -> Self {
        match v {
            Some(s) => RawValue::Text(s),
            None => RawValue::Null,
        }
    }
}

// ==========================================
// RawOrderRecord - untyped source row
// ==========================================
#[derive(Debug, Clone)]
pub struct RawOrderRecord {
    pub order_code: String,          // PEDIDO
    pub emission_date: RawValue,     // F_EMISION
    pub delivery_date: RawValue,     // F_ENTREGA
    pub lead_time_days: RawValue,    // DIAS
    pub client_name: Option<String>, // CLIENTE
    pub purchase_order: Option<String>, // PO
    pub requested_kg: RawValue,      // KG_REQ
    pub requested_units: RawValue,   // UNID

    // Completion percentages, formatted upstream ("73%", "0%", junk)
    pub assembly_pct: RawValue,        // KG_ARMP
    pub dyeing_pct: RawValue,          // KG_TENIDP
    pub fabric_approval_pct: RawValue, // KG_TELAPROBP
    pub cutting_pct: RawValue,         // CORTADOP
    pub sewing_pct: RawValue,          // COSIDOP

    // Observed min/max production dates per phase
    pub assembly_min: RawValue,        // FMINARM
    pub assembly_max: RawValue,        // FMAXARM
    pub dyeing_min: RawValue,          // FMINTENID
    pub dyeing_max: RawValue,          // FMAXTENID
    pub fabric_approval_min: RawValue, // FMINTELAPROB
    pub fabric_approval_max: RawValue, // FMAXTELAPROB
    pub cutting_min: RawValue,         // FMINCORTE
    pub cutting_max: RawValue,         // FMAXCORTE
    pub sewing_min: RawValue,          // FMINCOSIDO
    pub sewing_max: RawValue,          // FMAXCOSIDO
}

// ==========================================
// ActualWindow - observed phase window
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActualWindow {
    pub start: Option<NaiveDateTime>,
    pub finish: Option<NaiveDateTime>,
}

impl ActualWindow {
    pub fn new(start: Option<NaiveDateTime>, finish: Option<NaiveDateTime>) -> Self {
        Self { start, finish }
    }
}

// ==========================================
// OrderProgress - typed order snapshot
// ==========================================
// Invariants established by the normalizer:
// - completion percents are parsed and floored at 0 (values above
//   100 survive: fabric phases over-produce to cover shrinkage)
// - lead_time_days falls back to delivery - emission when the
//   source DIAS column is unusable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderProgress {
    pub order_code: String,
    pub emission_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub lead_time_days: i64,
    pub client_name: Option<String>,
    pub purchase_order: Option<String>,
    pub requested_kg: f64,
    pub requested_units: f64,

    /// Completion percent per phase, production order, floored at 0.
    pub completion_pct: [f64; 5],

    /// Observed window per phase, production order.
    pub actual: [ActualWindow; 5],
}

impl OrderProgress {
    /// Completion percent for one phase.
    pub fn completion_for(&self, phase: Phase) -> f64 {
        self.completion_pct[phase_index(phase)]
    }

    /// Observed window for one phase.
    pub fn actual_for(&self, phase: Phase) -> ActualWindow {
        self.actual[phase_index(phase)]
    }

    /// Weight used when aggregating this order's percentage for `phase`.
    pub fn weight_for(&self, phase: Phase) -> f64 {
        match phase.quantity_basis() {
            crate::domain::phase::QuantityBasis::Kilograms => self.requested_kg,
            crate::domain::phase::QuantityBasis::Units => self.requested_units,
        }
    }
}

/// Index of a phase within the production-ordered arrays.
pub fn phase_index(phase: Phase) -> usize {
    match phase {
        Phase::Assembly => 0,
        Phase::Dyeing => 1,
        Phase::FabricApproval => 2,
        Phase::Cutting => 3,
        Phase::Sewing => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_index_matches_all_order() {
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase_index(*phase), i);
        }
    }
}
