// ==========================================
// Seguimiento de pedidos - progress API
// ==========================================
// The one query pipeline behind every dashboard variant:
// fetch -> normalize -> derive -> reconcile -> view-model,
// parameterized by single order / order window / consolidated
// summary. Each call is a single-shot, synchronous cycle; the only
// shared state is the memo cache, which is never invalidated (the
// underlying data moves slowly relative to refresh cadence).
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::gantt::GanttChart;
use crate::domain::order::OrderProgress;
use crate::domain::plan::PlanRecord;
use crate::domain::schedule::{ExtraDayOffsets, ScheduleRow};
use crate::engine::deriver::ScheduleDeriver;
use crate::engine::normalize::normalize_order;
use crate::engine::progress::{PhaseProgress, PlanProgressEngine};
use crate::engine::reconciler::Reconciler;
use crate::repository::plan_repo::PlanRecordRepository;
use crate::repository::progress_repo::OrderProgressSource;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// Requests
// ==========================================

#[derive(Debug, Clone, Deserialize)]
pub struct OrderProgressRequest {
    pub order_code: String,
    /// Overrides the ERP emission date when the planner knows better
    pub placement_override: Option<NaiveDate>,
    /// Overrides the delivery date; also recomputes the lead time
    pub delivery_override: Option<NaiveDate>,
    pub offsets: ExtraDayOffsets,
}

impl OrderProgressRequest {
    pub fn for_order(order_code: impl Into<String>) -> Self {
        Self {
            order_code: order_code.into(),
            placement_override: None,
            delivery_override: None,
            offsets: ExtraDayOffsets::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WindowQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Client-name substrings; empty means every client
    pub clients: Vec<String>,
}

// ==========================================
// Reports
// ==========================================

#[derive(Debug, Clone, Serialize)]
pub struct OrderProgressReport {
    pub order: OrderProgress,
    pub rows: Vec<ScheduleRow>,
    pub gantt: GanttChart,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowProgressReport {
    pub orders: Vec<OrderProgressReport>,
    /// Orders skipped for lacking a usable emission date
    pub skipped: Vec<String>,
    /// Planning-store records found inside the window
    pub plans: Vec<PlanRecord>,
    /// Plan-vs-today assessment, one row per assessable plan phase
    pub assessments: Vec<PhaseProgress>,
    /// The subset of assessments below their completion floor
    pub lagging: Vec<PhaseProgress>,
    /// Consolidated RESUMEN row set across the batch
    pub summary: Vec<ScheduleRow>,
}

// ==========================================
// ProgressApi
// ==========================================
pub struct ProgressApi {
    source: Arc<dyn OrderProgressSource>,
    plan_repo: Arc<PlanRecordRepository>,
    deriver: ScheduleDeriver,
    reconciler: Reconciler,
    progress_engine: PlanProgressEngine,
    window_cache: Mutex<HashMap<String, Arc<WindowProgressReport>>>,
}

impl ProgressApi {
    pub fn new(
        source: Arc<dyn OrderProgressSource>,
        plan_repo: Arc<PlanRecordRepository>,
        progress_engine: PlanProgressEngine,
    ) -> Self {
        Self {
            source,
            plan_repo,
            deriver: ScheduleDeriver::new(),
            reconciler: Reconciler::new(),
            progress_engine,
            window_cache: Mutex::new(HashMap::new()),
        }
    }

    // ==========================================
    // Single order
    // ==========================================

    /// Progress of one order: derived schedule, reconciled actuals and
    /// the chart dataset.
    ///
    /// # Errors
    /// - `NoDataFound` when the ERP has no row for the code
    /// - `InvalidInput` when no usable emission date can be established
    pub async fn order_progress(
        &self,
        request: &OrderProgressRequest,
        today: NaiveDate,
    ) -> ApiResult<OrderProgressReport> {
        let _perf = crate::perf::PerfGuard::new("order_progress");
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, order = %request.order_code, "order progress query");

        let raw = self
            .source
            .fetch_order(&request.order_code)
            .await?
            .ok_or_else(|| ApiError::NoDataFound(request.order_code.clone()))?;

        let mut order = normalize_order(&raw);
        let (emission, days_total) = Self::effective_inputs(&order, request)?;
        // reflect the overrides in the report so table and chart agree
        order.emission_date = Some(emission);
        order.delivery_date = request.delivery_override.or(order.delivery_date);
        order.lead_time_days = days_total;

        let planned = self.deriver.derive(emission, days_total, &request.offsets);
        let rows = self.reconciler.reconcile(&order, &planned);
        let gantt = GanttChart::build(&order, &rows, today);

        tracing::debug!(%run_id, rows = rows.len(), "order progress done");
        Ok(OrderProgressReport { order, rows, gantt })
    }

    /// Emission date and lead time after applying the overrides.
    ///
    /// The lead time is only recomputed when a delivery override is
    /// supplied; otherwise the ERP's precomputed day count stands, even
    /// under an emission override.
    fn effective_inputs(
        order: &OrderProgress,
        request: &OrderProgressRequest,
    ) -> ApiResult<(NaiveDate, i64)> {
        let emission = request
            .placement_override
            .or(order.emission_date)
            .or_else(|| {
                // last resort: walk back from delivery by the lead time
                order
                    .delivery_date
                    .filter(|_| order.lead_time_days > 0)
                    .map(|d| d - Duration::days(order.lead_time_days))
            })
            .ok_or_else(|| {
                ApiError::InvalidInput(format!(
                    "order {} has no usable emission date",
                    order.order_code
                ))
            })?;

        let days_total = match request.delivery_override {
            Some(delivery) => (delivery - emission).num_days(),
            None => order.lead_time_days,
        };
        Ok((emission, days_total))
    }

    // ==========================================
    // Order window
    // ==========================================

    /// Every order in the window: per-order reconciliation, the
    /// plan-vs-today assessment, the lagging table and the RESUMEN
    /// summary. Memoized by input arguments.
    pub async fn window_progress(
        &self,
        query: &WindowQuery,
        today: NaiveDate,
    ) -> ApiResult<Arc<WindowProgressReport>> {
        let cache_key = Self::cache_key(query, today);
        if let Some(report) = self.cached(&cache_key) {
            tracing::debug!(key = %cache_key, "window progress served from cache");
            return Ok(report);
        }

        let _perf = crate::perf::PerfGuard::new("window_progress");
        let run_id = Uuid::new_v4();
        tracing::info!(
            %run_id,
            from = %query.from,
            to = %query.to,
            clients = query.clients.len(),
            "window progress query"
        );

        // ERP snapshot and planning store are independent sources;
        // fetch them side by side.
        let (raw_orders, plans) = futures::try_join!(
            async {
                self.source
                    .fetch_window(query.from, query.to, &query.clients)
                    .await
                    .map_err(ApiError::from)
            },
            async {
                self.plan_repo
                    .list_window(query.from, query.to)
                    .map_err(ApiError::from)
            },
        )?;

        let mut orders = Vec::new();
        let mut skipped = Vec::new();
        for raw in &raw_orders {
            let order = normalize_order(raw);
            let Some(emission) = order.emission_date else {
                tracing::warn!(order = %order.order_code, "skipping order without emission date");
                skipped.push(order.order_code);
                continue;
            };
            let planned =
                self.deriver
                    .derive(emission, order.lead_time_days, &ExtraDayOffsets::default());
            let rows = self.reconciler.reconcile(&order, &planned);
            let gantt = GanttChart::build(&order, &rows, today);
            orders.push(OrderProgressReport { order, rows, gantt });
        }

        // Plan assessment joins each planning record with its ERP row,
        // when the window produced one.
        let erp_by_code: HashMap<&str, &OrderProgress> = orders
            .iter()
            .map(|r| (r.order.order_code.as_str(), &r.order))
            .collect();
        let mut assessments = Vec::new();
        for plan in &plans {
            let erp = erp_by_code.get(plan.order_id.as_str()).copied();
            assessments.extend(self.progress_engine.assess(plan, erp, today));
        }
        let lagging: Vec<PhaseProgress> = self
            .progress_engine
            .lagging(&assessments)
            .into_iter()
            .cloned()
            .collect();

        let batch: Vec<(OrderProgress, Vec<ScheduleRow>)> = orders
            .iter()
            .map(|r| (r.order.clone(), r.rows.clone()))
            .collect();
        let summary = self.reconciler.summarize(&batch);

        let report = Arc::new(WindowProgressReport {
            orders,
            skipped,
            plans,
            assessments,
            lagging,
            summary,
        });

        if let Ok(mut cache) = self.window_cache.lock() {
            cache.insert(cache_key, Arc::clone(&report));
        }

        tracing::debug!(%run_id, orders = report.orders.len(), "window progress done");
        Ok(report)
    }

    fn cache_key(query: &WindowQuery, today: NaiveDate) -> String {
        format!(
            "{}|{}|{}|{}",
            query.from,
            query.to,
            query.clients.join(","),
            today
        )
    }

    fn cached(&self, key: &str) -> Option<Arc<WindowProgressReport>> {
        self.window_cache.lock().ok()?.get(key).map(Arc::clone)
    }
}
