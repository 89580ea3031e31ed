// ==========================================
// Seguimiento de pedidos - Gantt view-model
// ==========================================
// The chart-ready dataset handed to the external renderer as JSON:
// one task bar per phase with the planned window, real-date markers
// and a progress label, plus the three vertical reference lines
// (emission, delivery, today). Rendering itself happens elsewhere;
// this module only shapes data.
// ==========================================

use crate::domain::order::OrderProgress;
use crate::domain::schedule::ScheduleRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// GanttTask - one bar
// ==========================================
// Field names follow what the timeline widget expects; the
// underscore-prefixed extras ride along into its popup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GanttTask {
    pub id: String,
    pub name: String,
    /// Planned start, ISO date
    pub start: String,
    /// Planned finish, ISO date
    pub end: String,
    /// Completion in [0, 1]
    pub progress: f64,
    /// Observed start marker, ISO date; absent when nothing recorded
    #[serde(rename = "_start_real")]
    pub start_real: Option<String>,
    /// Observed finish marker
    #[serde(rename = "_end_real")]
    pub end_real: Option<String>,
    /// Text label drawn on the bar, e.g. "73.00%"
    #[serde(rename = "_avance")]
    pub progress_label: String,
}

// ==========================================
// GanttChart - full chart dataset
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GanttChart {
    pub order_code: String,
    pub client_name: Option<String>,
    pub tasks: Vec<GanttTask>,
    /// Vertical reference lines
    pub emission_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub today: NaiveDate,
}

impl GanttChart {
    /// Shape one order's reconciled rows into the chart dataset.
    pub fn build(order: &OrderProgress, rows: &[ScheduleRow], today: NaiveDate) -> Self {
        let tasks = rows
            .iter()
            .map(|row| GanttTask {
                id: row.phase.label().to_string(),
                name: row.phase.label().to_string(),
                start: row.planned_start.format("%Y-%m-%d").to_string(),
                end: row.planned_finish.format("%Y-%m-%d").to_string(),
                progress: row.completion_fraction,
                start_real: row
                    .actual_start
                    .map(|dt| dt.date().format("%Y-%m-%d").to_string()),
                end_real: row
                    .actual_finish
                    .map(|dt| dt.date().format("%Y-%m-%d").to_string()),
                progress_label: format!("{:.2}%", row.completion_fraction * 100.0),
            })
            .collect();

        Self {
            order_code: order.order_code.clone(),
            client_name: order.client_name.clone(),
            tasks,
            emission_date: order.emission_date,
            delivery_date: order.delivery_date,
            today,
        }
    }

    /// The JSON the renderer consumes.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
