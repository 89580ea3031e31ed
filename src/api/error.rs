// ==========================================
// Seguimiento de pedidos - API layer errors
// ==========================================
// Converts repository-layer failures into the user-facing taxonomy.
// Every failure a query cycle can hit ends up here; nothing below
// panics and nothing above sees a raw database error. The localized
// message for the UI comes from `user_message`.
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API-layer error type
#[derive(Error, Debug)]
pub enum ApiError {
    /// The ERP has no rows for the requested identifier. A warning in
    /// the UI, never a fatal condition.
    #[error("no data found: {0}")]
    NoDataFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("business rule violated: {0}")]
    BusinessRuleViolation(String),

    /// Connectivity/lock trouble talking to a data source. Aborts the
    /// current render cycle only.
    #[error("data source unavailable: {0}")]
    ConnectivityError(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// Localized message for the UI boundary.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NoDataFound(id) => {
                crate::i18n::t_with_args("errors.no_data_found", &[("order", id)])
            }
            ApiError::InvalidInput(msg) => {
                crate::i18n::t_with_args("errors.invalid_input", &[("detail", msg)])
            }
            ApiError::NotFound(msg) => {
                crate::i18n::t_with_args("errors.not_found", &[("detail", msg)])
            }
            ApiError::BusinessRuleViolation(msg) => {
                crate::i18n::t_with_args("errors.business_rule", &[("detail", msg)])
            }
            ApiError::ConnectivityError(_) => crate::i18n::t("errors.connectivity"),
            ApiError::DatabaseError(_) | ApiError::InternalError(_) | ApiError::Other(_) => {
                crate::i18n::t("errors.internal")
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::ConnectivityError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::ConnectivityError(format!("database lock: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("already exists: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("field {}: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result alias for the API layer
pub type ApiResult<T> = Result<T, ApiError>;
