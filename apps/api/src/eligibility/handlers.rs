//! Axum route handlers for the job-application API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{AppliedJob, JobStatus, Platform};
use crate::state::AppState;

use super::orchestrator::{
    self, ApplicationInput, ApplyAttempt,
};

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub user_id: Uuid,
    pub job_id: String,
    pub platform: String,
    pub title: String,
    pub job_url: String,
    pub company: Option<String>,
    pub powered_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CanApplyQuery {
    pub user_id: Uuid,
    pub platform: String,
    pub powered_by: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PendingJobQuery {
    pub user_id: Uuid,
    pub platform: String,
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct CanApplyResponse {
    pub can_apply: bool,
}

/// POST /api/v1/jobs
///
/// Records a new application attempt as a pending row after the full guard
/// sequence passes. 201 with the row on success.
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<AppliedJob>), AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if request.job_id.trim().is_empty() {
        return Err(AppError::Validation("job_id cannot be empty".to_string()));
    }

    let platform = Platform::parse(&request.platform)?;
    let attempt = ApplyAttempt {
        user_id: request.user_id,
        job_id: &request.job_id,
        platform,
        powered_by: request.powered_by.as_deref(),
        company: request.company.as_deref(),
    };

    let job = orchestrator::record_application(
        state.store.as_ref(),
        &attempt,
        ApplicationInput {
            title: request.title,
            job_url: request.job_url,
        },
        Utc::now(),
        Duration::seconds(state.config.job_submission_interval_secs),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<Vec<AppliedJob>>, AppError> {
    let jobs = state.store.list_applications(query.user_id).await?;
    Ok(Json(jobs))
}

/// GET /api/v1/jobs/:job_id/can-apply
///
/// Read-only probe running the identical guard sequence as job creation,
/// plus the already-pending check. 200 means every guard passed.
pub async fn handle_can_apply(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Query(query): Query<CanApplyQuery>,
) -> Result<Json<CanApplyResponse>, AppError> {
    let platform = Platform::parse(&query.platform)?;
    let attempt = ApplyAttempt {
        user_id: query.user_id,
        job_id: &job_id,
        platform,
        powered_by: query.powered_by.as_deref(),
        company: query.company.as_deref(),
    };

    orchestrator::check_can_apply(
        state.store.as_ref(),
        &attempt,
        Utc::now(),
        Duration::seconds(state.config.job_submission_interval_secs),
    )
    .await?;

    Ok(Json(CanApplyResponse { can_apply: true }))
}

/// GET /api/v1/jobs/:job_id/pending
///
/// Returns the in-progress (`created`) row for the key, or 404.
pub async fn handle_get_pending_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Query(query): Query<PendingJobQuery>,
) -> Result<Json<AppliedJob>, AppError> {
    let platform = Platform::parse(&query.platform)?;
    let job = state
        .store
        .pending_application(query.user_id, &job_id, platform)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No pending application for job {job_id}")))?;

    Ok(Json(job))
}

/// PATCH /api/v1/jobs/:id/status
///
/// Advances a pending application to its terminal outcome.
pub async fn handle_update_job_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<AppliedJob>, AppError> {
    let next = JobStatus::parse(&request.status)?;
    let job = orchestrator::advance_application_status(state.store.as_ref(), id, next).await?;
    Ok(Json(job))
}
