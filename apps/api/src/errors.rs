use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Which plan allowance was exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Total,
    Daily,
}

impl LimitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitKind::Total => "total",
            LimitKind::Daily => "daily",
        }
    }
}

/// Application-level error type.
///
/// Every business-rule violation from the eligibility guards is a distinct
/// variant so the HTTP layer can keep the status codes clients depend on:
/// 423 for subscription/plan gating, 429 for submission throttling,
/// 409 for an in-progress duplicate, 400 for validation failures.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Requires active subscription")]
    NoActiveSubscription,

    #[error("You already have exceeded the {} job submissions limit for this plan", .0.as_str())]
    PlanLimitExceeded(LimitKind),

    #[error("This job has already been tried for apply")]
    DuplicateApply,

    #[error("This job already exists with status created")]
    AlreadyPendingJob,

    #[error("Application should be powered by Linkedin, Greenhouse or Lever for LinkedIn jobs, got '{0}'")]
    InvalidPoweredBy(String),

    #[error("Applying to excluded company '{0}' job")]
    ExcludedCompany(String),

    #[error("Job submissions are too frequent, please wait before retrying")]
    SubmissionTooFrequent,

    #[error("Unknown job search platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Billing error: {0}")]
    Billing(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NoActiveSubscription => (
                StatusCode::LOCKED,
                "active_subscription_required",
                self.to_string(),
            ),
            AppError::PlanLimitExceeded(_) => {
                (StatusCode::LOCKED, "limit_exceeded", self.to_string())
            }
            AppError::DuplicateApply => {
                (StatusCode::BAD_REQUEST, "duplicate_apply", self.to_string())
            }
            AppError::AlreadyPendingJob => (
                StatusCode::CONFLICT,
                "already_exists_pending_job",
                self.to_string(),
            ),
            AppError::InvalidPoweredBy(_) => (
                StatusCode::BAD_REQUEST,
                "invalid_powered_by",
                self.to_string(),
            ),
            AppError::ExcludedCompany(_) => (
                StatusCode::BAD_REQUEST,
                "applying_excluded_company_job",
                self.to_string(),
            ),
            AppError::SubmissionTooFrequent => (
                StatusCode::TOO_MANY_REQUESTS,
                "job_submissions_delay",
                self.to_string(),
            ),
            AppError::UnsupportedPlatform(_) => (
                StatusCode::BAD_REQUEST,
                "unsupported_platform",
                self.to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Billing(msg) => {
                tracing::error!("Billing error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "billing_error",
                    "The billing provider rejected the request".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_gating_errors_are_locked() {
        assert_eq!(status_of(AppError::NoActiveSubscription), StatusCode::LOCKED);
        assert_eq!(
            status_of(AppError::PlanLimitExceeded(LimitKind::Total)),
            StatusCode::LOCKED
        );
        assert_eq!(
            status_of(AppError::PlanLimitExceeded(LimitKind::Daily)),
            StatusCode::LOCKED
        );
    }

    #[test]
    fn test_throttle_is_429() {
        assert_eq!(
            status_of(AppError::SubmissionTooFrequent),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_pending_duplicate_is_conflict() {
        assert_eq!(status_of(AppError::AlreadyPendingJob), StatusCode::CONFLICT);
    }

    #[test]
    fn test_guard_validation_errors_are_400() {
        assert_eq!(status_of(AppError::DuplicateApply), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(AppError::InvalidPoweredBy("workday".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::ExcludedCompany("acme".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::UnsupportedPlatform("indeed".into())),
            StatusCode::BAD_REQUEST
        );
    }
}
