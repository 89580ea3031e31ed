// ==========================================
// Seguimiento de pedidos - planning record API
// ==========================================
// Thin CRUD surface over the planning store. Validation happens
// here, at the boundary, so the repository stays logic-free.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::plan::PlanRecord;
use crate::repository::plan_repo::PlanRecordRepository;
use chrono::NaiveDate;
use std::sync::Arc;

// ==========================================
// PlanApi
// ==========================================
pub struct PlanApi {
    plan_repo: Arc<PlanRecordRepository>,
}

impl PlanApi {
    pub fn new(plan_repo: Arc<PlanRecordRepository>) -> Self {
        Self { plan_repo }
    }

    /// Create a planning record for an order.
    ///
    /// # Errors
    /// - `InvalidInput` on an empty order id or inconsistent dates
    /// - `BusinessRuleViolation` when the order already has a record
    pub fn create(&self, record: &PlanRecord) -> ApiResult<String> {
        Self::validate(record)?;
        tracing::info!(order = %record.order_id, "creating plan record");
        Ok(self.plan_repo.create(record)?)
    }

    /// Point read by order id.
    pub fn get(&self, order_id: &str) -> ApiResult<Option<PlanRecord>> {
        Ok(self.plan_repo.find_by_order(order_id.trim())?)
    }

    /// Full read.
    pub fn list(&self) -> ApiResult<Vec<PlanRecord>> {
        Ok(self.plan_repo.list_all()?)
    }

    /// Records inside a placement/delivery window.
    pub fn list_window(&self, from: NaiveDate, to: NaiveDate) -> ApiResult<Vec<PlanRecord>> {
        Ok(self.plan_repo.list_window(from, to)?)
    }

    /// Full update of an existing record.
    ///
    /// # Errors
    /// - `NotFound` when the order has no record yet
    pub fn update(&self, record: &PlanRecord) -> ApiResult<()> {
        Self::validate(record)?;
        tracing::info!(order = %record.order_id, "updating plan record");
        Ok(self.plan_repo.update(record)?)
    }

    /// Delete by order id.
    pub fn delete(&self, order_id: &str) -> ApiResult<()> {
        let trimmed = order_id.trim();
        if trimmed.is_empty() {
            return Err(ApiError::InvalidInput("order id is empty".to_string()));
        }
        tracing::info!(order = %trimmed, "deleting plan record");
        Ok(self.plan_repo.delete(trimmed)?)
    }

    fn validate(record: &PlanRecord) -> ApiResult<()> {
        if record.order_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("order id is empty".to_string()));
        }
        if !record.dates_consistent() {
            return Err(ApiError::InvalidInput(format!(
                "order {}: delivery date precedes placement date",
                record.order_id
            )));
        }
        Ok(())
    }
}
