//! Eligibility Orchestrator — the single pass/fail decision in front of every
//! job-application attempt.
//!
//! Two entry points run the identical guard sequence:
//! - `check_can_apply` is the read-only probe; it additionally reports an
//!   existing pending (`created`) row for the same key as `AlreadyPendingJob`.
//! - `record_application` ends in the INSERT instead; it deliberately skips
//!   the pending probe and lets the unique constraint catch true duplicates
//!   (the probe catches "still in progress", the insert failure catches
//!   "already finished").
//!
//! Guard order is fixed and short-circuiting: active subscription → total
//! budget → daily budget → company exclusion → duplicate → powered-by →
//! submission cooldown. The caller only ever sees the first violation.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{AppliedJob, JobStatus, NewAppliedJob, Platform};
use crate::models::subscription::Subscription;

use super::guards;
use super::ledger::UsageLedger;
use super::store::EligibilityStore;

/// Parameters of one application attempt, threaded explicitly — no ambient
/// request context reaches the guards.
#[derive(Debug, Clone)]
pub struct ApplyAttempt<'a> {
    pub user_id: Uuid,
    pub job_id: &'a str,
    pub platform: Platform,
    pub powered_by: Option<&'a str>,
    pub company: Option<&'a str>,
}

/// Asserts an active subscription with budget left, returning it together
/// with its usage ledger for the caller's own use. Read-only.
pub async fn validate_plan_limits(
    store: &dyn EligibilityStore,
    user_id: Uuid,
) -> Result<(Subscription, UsageLedger), AppError> {
    let subscription = store
        .active_subscription(user_id)
        .await?
        .ok_or(AppError::NoActiveSubscription)?;

    let options = store.plan_options(subscription.plan_id).await?;
    let counts = store.usage_counts(subscription.id, user_id).await?;
    let ledger = UsageLedger::new(options, counts);

    guards::check_plan_limits(&ledger)?;

    Ok((subscription, ledger))
}

/// The duplicate / attribution / rate guard sequence of one attempt.
/// Shared verbatim by the probe and the recording path.
async fn verify_can_apply(
    store: &dyn EligibilityStore,
    attempt: &ApplyAttempt<'_>,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Result<(), AppError> {
    if attempt.company.is_some() {
        let excluded = store.excluded_companies(attempt.user_id).await?;
        guards::check_excluded_company(&excluded, attempt.company)?;
    }

    let blocked = store
        .has_blocking_application(attempt.user_id, attempt.job_id, attempt.platform)
        .await?;
    guards::check_duplicate(blocked)?;

    guards::check_powered_by(attempt.platform, attempt.powered_by)?;

    let last = store.last_submission_at(attempt.user_id).await?;
    guards::check_submission_cooldown(last, now, cooldown)?;

    Ok(())
}

/// Read-only probe: can this user apply to this job right now?
///
/// Runs the full guard sequence and then reports an in-progress application
/// for the same key as `AlreadyPendingJob`. No state is touched, so calling
/// this twice with unchanged state yields the same outcome both times.
pub async fn check_can_apply(
    store: &dyn EligibilityStore,
    attempt: &ApplyAttempt<'_>,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Result<(), AppError> {
    validate_plan_limits(store, attempt.user_id).await?;
    verify_can_apply(store, attempt, now, cooldown).await?;

    if store
        .pending_application(attempt.user_id, attempt.job_id, attempt.platform)
        .await?
        .is_some()
    {
        return Err(AppError::AlreadyPendingJob);
    }

    Ok(())
}

/// Job metadata recorded alongside an accepted attempt.
#[derive(Debug, Clone)]
pub struct ApplicationInput {
    pub title: String,
    pub job_url: String,
}

/// Runs the guard sequence and records the application as a pending
/// (`created`) row under the user's active subscription.
///
/// The check-then-insert sequence is racy between two concurrent requests for
/// the same key; the unique constraint settles the race and the store maps
/// that violation to `DuplicateApply`.
pub async fn record_application(
    store: &dyn EligibilityStore,
    attempt: &ApplyAttempt<'_>,
    input: ApplicationInput,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Result<AppliedJob, AppError> {
    let (subscription, _ledger) = validate_plan_limits(store, attempt.user_id).await?;
    verify_can_apply(store, attempt, now, cooldown).await?;

    let new_job = NewAppliedJob {
        user_id: attempt.user_id,
        title: input.title,
        job_url: input.job_url,
        used_subscription_id: subscription.id,
        job_id: attempt.job_id.to_string(),
        platform: attempt.platform,
        company: attempt.company.map(str::to_string),
        powered_by: attempt.powered_by.map(str::to_string),
    };

    let job = store.insert_application(&new_job).await?;
    tracing::info!(
        user_id = %attempt.user_id,
        job_id = %attempt.job_id,
        platform = %attempt.platform.as_str(),
        "Recorded application attempt {}",
        job.id
    );

    Ok(job)
}

/// Advances an application through the `created → applied|failed|canceled`
/// machine. Transitions out of a terminal status are rejected.
///
/// An `applied` outcome may spend the last of the plan's budget; when it
/// does, the subscription is retired here rather than at the next gate.
pub async fn advance_application_status(
    store: &dyn EligibilityStore,
    id: Uuid,
    next: JobStatus,
) -> Result<AppliedJob, AppError> {
    let job = store
        .application(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Applied job {id} not found")))?;

    let current = JobStatus::parse(&job.status)?;
    if !current.can_transition_to(next) {
        return Err(AppError::Validation(format!(
            "Cannot change job status from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    }

    let updated = store.set_application_status(id, next).await?;

    if next.counts_against_allowance() {
        expire_exhausted_subscription(store, updated.user_id).await?;
    }

    Ok(updated)
}

/// Deactivates the user's active subscription once its total allowance is
/// used up. A user with no active subscription is left alone.
async fn expire_exhausted_subscription(
    store: &dyn EligibilityStore,
    user_id: Uuid,
) -> Result<(), AppError> {
    let Some(subscription) = store.active_subscription(user_id).await? else {
        return Ok(());
    };

    let options = store.plan_options(subscription.plan_id).await?;
    let counts = store.usage_counts(subscription.id, user_id).await?;
    let ledger = UsageLedger::new(options, counts);

    if ledger.remaining_count() <= 0 {
        store.deactivate_subscription(subscription.id).await?;
        tracing::info!(
            user_id = %user_id,
            subscription = %subscription.id,
            "Plan budget exhausted, subscription deactivated"
        );
    }

    Ok(())
}
