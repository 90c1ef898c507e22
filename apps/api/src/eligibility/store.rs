//! Persistence reads and the single write the eligibility engine performs.
//!
//! The engine only sees this trait, so every decision path can be exercised
//! in tests with an in-memory implementation; `PgEligibilityStore` is the
//! production backend. The one write — `insert_application` — leans on the
//! `(job_id, user_id, platform)` unique constraint as the real concurrency
//! guard and re-signals a uniqueness violation as `DuplicateApply`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::filters::FILTER_SLUG_EXCLUDED_COMPANIES;
use crate::models::job::{AppliedJob, JobStatus, NewAppliedJob, Platform};
use crate::models::plan::{PlanOption, PlanOptionSet};
use crate::models::subscription::Subscription;

use super::ledger::UsageCounts;

#[async_trait]
pub trait EligibilityStore: Send + Sync {
    /// The user's currently active subscription, if any: `active` flag set
    /// and either a paid plan or an unset/future end date.
    async fn active_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>, AppError>;

    async fn plan_options(&self, plan_id: Uuid) -> Result<PlanOptionSet, AppError>;

    /// Counts backing the usage ledger for one subscription.
    async fn usage_counts(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
    ) -> Result<UsageCounts, AppError>;

    /// Whether an `applied` or `failed` row exists for the key.
    async fn has_blocking_application(
        &self,
        user_id: Uuid,
        job_id: &str,
        platform: Platform,
    ) -> Result<bool, AppError>;

    /// Creation time of the user's most recent application row, any job,
    /// any platform, any status.
    async fn last_submission_at(&self, user_id: Uuid) -> Result<Option<DateTime<Utc>>, AppError>;

    /// The `created`-status row for the key, if one exists.
    async fn pending_application(
        &self,
        user_id: Uuid,
        job_id: &str,
        platform: Platform,
    ) -> Result<Option<AppliedJob>, AppError>;

    /// The user's excluded-companies filter values.
    async fn excluded_companies(&self, user_id: Uuid) -> Result<Vec<String>, AppError>;

    async fn insert_application(&self, new_job: &NewAppliedJob) -> Result<AppliedJob, AppError>;

    /// Retires a subscription whose budget is spent. The row is kept for
    /// historical usage accounting; only the active flag drops.
    async fn deactivate_subscription(&self, subscription_id: Uuid) -> Result<(), AppError>;

    async fn application(&self, id: Uuid) -> Result<Option<AppliedJob>, AppError>;

    async fn set_application_status(
        &self,
        id: Uuid,
        status: JobStatus,
    ) -> Result<AppliedJob, AppError>;

    async fn list_applications(&self, user_id: Uuid) -> Result<Vec<AppliedJob>, AppError>;
}

#[derive(Clone)]
pub struct PgEligibilityStore {
    pool: PgPool,
}

impl PgEligibilityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EligibilityStore for PgEligibilityStore {
    async fn active_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>, AppError> {
        let sub = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT s.id, s.user_id, s.plan_id, s.active, s.end_date,
                   s.billing_event_id, s.billing_event_at, s.created_at
            FROM subscriptions s
            JOIN plans p ON p.id = s.plan_id
            WHERE s.user_id = $1
              AND s.active
              AND (p.amount_cents > 0 OR s.end_date IS NULL OR s.end_date >= CURRENT_DATE)
            ORDER BY s.created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn plan_options(&self, plan_id: Uuid) -> Result<PlanOptionSet, AppError> {
        let rows = sqlx::query_as::<_, PlanOption>(
            "SELECT id, plan_id, option_type, value, text FROM plan_options WHERE plan_id = $1 ORDER BY id",
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(PlanOptionSet::from_rows(&rows))
    }

    async fn usage_counts(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
    ) -> Result<UsageCounts, AppError> {
        let applied_total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM applied_jobs WHERE used_subscription_id = $1 AND status = 'applied'",
        )
        .bind(subscription_id)
        .fetch_one(&self.pool)
        .await?;

        // "today" is the server's calendar day
        let applied_today: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM applied_jobs
            WHERE used_subscription_id = $1
              AND status = 'applied'
              AND created_at >= date_trunc('day', now())
            "#,
        )
        .bind(subscription_id)
        .fetch_one(&self.pool)
        .await?;

        let active_titles: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_job_titles WHERE user_id = $1 AND is_active",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(UsageCounts {
            applied_total,
            applied_today,
            active_titles,
        })
    }

    async fn has_blocking_application(
        &self,
        user_id: Uuid,
        job_id: &str,
        platform: Platform,
    ) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM applied_jobs
                WHERE user_id = $1 AND job_id = $2 AND platform = $3
                  AND status IN ('applied', 'failed')
            )
            "#,
        )
        .bind(user_id)
        .bind(job_id)
        .bind(platform.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn last_submission_at(&self, user_id: Uuid) -> Result<Option<DateTime<Utc>>, AppError> {
        let last: Option<DateTime<Utc>> = sqlx::query_scalar(
            "SELECT MAX(created_at) FROM applied_jobs WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(last)
    }

    async fn pending_application(
        &self,
        user_id: Uuid,
        job_id: &str,
        platform: Platform,
    ) -> Result<Option<AppliedJob>, AppError> {
        let job = sqlx::query_as::<_, AppliedJob>(
            r#"
            SELECT * FROM applied_jobs
            WHERE user_id = $1 AND job_id = $2 AND platform = $3 AND status = 'created'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(job_id)
        .bind(platform.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    async fn excluded_companies(&self, user_id: Uuid) -> Result<Vec<String>, AppError> {
        let values: Option<Vec<String>> = sqlx::query_scalar(
            r#"
            SELECT ufs.values
            FROM user_filter_selections ufs
            JOIN search_filters sf ON sf.id = ufs.filter_id
            WHERE ufs.user_id = $1 AND sf.slug = $2
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(FILTER_SLUG_EXCLUDED_COMPANIES)
        .fetch_optional(&self.pool)
        .await?;

        Ok(values.unwrap_or_default())
    }

    async fn insert_application(&self, new_job: &NewAppliedJob) -> Result<AppliedJob, AppError> {
        let result = sqlx::query_as::<_, AppliedJob>(
            r#"
            INSERT INTO applied_jobs
                (id, user_id, title, job_url, used_subscription_id, job_id,
                 platform, status, company, powered_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'created', $8, $9, now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_job.user_id)
        .bind(&new_job.title)
        .bind(&new_job.job_url)
        .bind(new_job.used_subscription_id)
        .bind(&new_job.job_id)
        .bind(new_job.platform.as_str())
        .bind(&new_job.company)
        .bind(&new_job.powered_by)
        .fetch_one(&self.pool)
        .await;

        // Two racing inserts for the same (job_id, user, platform) key: the
        // database rejects the loser, which callers must see as a duplicate.
        match result {
            Ok(job) => Ok(job),
            Err(sqlx::Error::Database(db_err))
                if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
            {
                Err(AppError::DuplicateApply)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn deactivate_subscription(&self, subscription_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE subscriptions SET active = false WHERE id = $1")
            .bind(subscription_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn application(&self, id: Uuid) -> Result<Option<AppliedJob>, AppError> {
        let job = sqlx::query_as::<_, AppliedJob>("SELECT * FROM applied_jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(job)
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: JobStatus,
    ) -> Result<AppliedJob, AppError> {
        let job = sqlx::query_as::<_, AppliedJob>(
            "UPDATE applied_jobs SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    async fn list_applications(&self, user_id: Uuid) -> Result<Vec<AppliedJob>, AppError> {
        let jobs = sqlx::query_as::<_, AppliedJob>(
            "SELECT * FROM applied_jobs WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }
}
