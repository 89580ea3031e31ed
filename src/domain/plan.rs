// ==========================================
// Seguimiento de pedidos - planning record
// ==========================================
// One manually-maintained planning row per order in the local
// planning store. Richer than the derived five-phase model: it also
// tracks the fabric-processing and garment-processing stages, so a
// record carries sixteen date-valued fields plus the key.
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// PlanPhase - phases tracked by the planning store
// ==========================================
// Superset of the derived model's five phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanPhase {
    Assembly,
    Dyeing,
    FabricProcessing,
    FabricApproval,
    Cutting,
    Sewing,
    GarmentProcessing,
}

impl PlanPhase {
    /// All tracked phases in timeline order.
    pub const ALL: [PlanPhase; 7] = [
        PlanPhase::Assembly,
        PlanPhase::Dyeing,
        PlanPhase::FabricProcessing,
        PlanPhase::FabricApproval,
        PlanPhase::Cutting,
        PlanPhase::Sewing,
        PlanPhase::GarmentProcessing,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PlanPhase::Assembly => "armado",
            PlanPhase::Dyeing => "tenido",
            PlanPhase::FabricProcessing => "proc_tela",
            PlanPhase::FabricApproval => "telaprob",
            PlanPhase::Cutting => "corte",
            PlanPhase::Sewing => "costura",
            PlanPhase::GarmentProcessing => "proc_prenda",
        }
    }

    /// The corresponding derived-model phase, if any.
    ///
    /// FabricProcessing / GarmentProcessing exist only in the planning
    /// store; they have no derived window and no ERP completion field.
    pub fn core_phase(self) -> Option<crate::domain::phase::Phase> {
        use crate::domain::phase::Phase;
        match self {
            PlanPhase::Assembly => Some(Phase::Assembly),
            PlanPhase::Dyeing => Some(Phase::Dyeing),
            PlanPhase::FabricApproval => Some(Phase::FabricApproval),
            PlanPhase::Cutting => Some(Phase::Cutting),
            PlanPhase::Sewing => Some(Phase::Sewing),
            PlanPhase::FabricProcessing | PlanPhase::GarmentProcessing => None,
        }
    }
}

// ==========================================
// PlanWindow - one start/finish pair
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanWindow {
    pub start: Option<NaiveDateTime>,
    pub finish: Option<NaiveDateTime>,
}

// ==========================================
// PlanRecord - planning store entity
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanRecord {
    /// Order identifier, same key as the ERP side
    pub order_id: String,
    /// Fecha_Colocacion - date the order was placed
    pub placement_date: Option<NaiveDate>,
    /// Fecha_Entrega - committed delivery date
    pub delivery_date: Option<NaiveDate>,
    /// Windows in PlanPhase::ALL order
    pub windows: [PlanWindow; 7],
}

impl PlanRecord {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            ..Default::default()
        }
    }

    pub fn window(&self, phase: PlanPhase) -> PlanWindow {
        self.windows[Self::index(phase)]
    }

    pub fn set_window(&mut self, phase: PlanPhase, window: PlanWindow) {
        self.windows[Self::index(phase)] = window;
    }

    fn index(phase: PlanPhase) -> usize {
        match phase {
            PlanPhase::Assembly => 0,
            PlanPhase::Dyeing => 1,
            PlanPhase::FabricProcessing => 2,
            PlanPhase::FabricApproval => 3,
            PlanPhase::Cutting => 4,
            PlanPhase::Sewing => 5,
            PlanPhase::GarmentProcessing => 6,
        }
    }

    /// `delivery >= placement` whenever both dates are present.
    pub fn dates_consistent(&self) -> bool {
        match (self.placement_date, self.delivery_date) {
            (Some(placed), Some(due)) => due >= placed,
            _ => true,
        }
    }
}
