//! Subscription lifecycle transitions.
//!
//! The one invariant everything here protects: at most one subscription per
//! user is active at a time. Every activation is therefore a single atomic
//! deactivate-all-then-activate transaction — a concurrent reader never sees
//! two active rows or a partially-applied plan change. Rows are deactivated,
//! never deleted, so historical usage accounting keeps its subscription.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::filters::{UserFilterSelection, FILTER_SLUG_JOB_TITLE};
use crate::models::plan::Plan;
use crate::models::subscription::Subscription;

/// Free/trial subscriptions expire this many days after activation.
const FREE_TRIAL_DAYS: i64 = 2;

/// Subscribes the user to a plan immediately: deactivates every other
/// subscription and inserts the new one active, with a trial end date when
/// the plan is free.
pub async fn subscribe_to_plan(
    pool: &PgPool,
    user_id: Uuid,
    plan: &Plan,
) -> Result<Subscription, AppError> {
    let end_date = if plan.is_chargeable() {
        None
    } else {
        Some(Utc::now().date_naive() + Duration::days(FREE_TRIAL_DAYS))
    };

    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE subscriptions SET active = false WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let subscription = sqlx::query_as::<_, Subscription>(
        r#"
        INSERT INTO subscriptions (id, user_id, plan_id, active, end_date, created_at)
        VALUES ($1, $2, $3, true, $4, now())
        RETURNING id, user_id, plan_id, active, end_date,
                  billing_event_id, billing_event_at, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(plan.id)
    .bind(end_date)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        user_id = %user_id,
        plan = %plan.slug,
        "Subscribed user to plan (subscription {})",
        subscription.id
    );
    Ok(subscription)
}

/// Whether the user has ever held a subscription on a zero-amount plan,
/// active or not. The free tier is a one-time trial; deactivated rows still
/// consume it.
pub async fn has_used_free_plan(pool: &PgPool, user_id: Uuid) -> Result<bool, AppError> {
    let used: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM subscriptions s
            JOIN plans p ON p.id = s.plan_id
            WHERE s.user_id = $1 AND p.amount_cents = 0
        )
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(used)
}

/// Rejects a second free-tier subscription.
pub fn check_free_plan_reuse(has_used_free_plan: bool) -> Result<(), AppError> {
    if has_used_free_plan {
        return Err(AppError::Validation(
            "The free plan can only be used once".to_string(),
        ));
    }
    Ok(())
}

/// Creates an inactive subscription for a paid checkout in flight. It stays
/// pending until the billing confirmation arrives and activates it.
pub async fn create_pending_subscription(
    pool: &PgPool,
    user_id: Uuid,
    plan_id: Uuid,
) -> Result<Subscription, AppError> {
    let subscription = sqlx::query_as::<_, Subscription>(
        r#"
        INSERT INTO subscriptions (id, user_id, plan_id, active, end_date, created_at)
        VALUES ($1, $2, $3, false, NULL, now())
        RETURNING id, user_id, plan_id, active, end_date,
                  billing_event_id, billing_event_at, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(plan_id)
    .fetch_one(pool)
    .await?;

    Ok(subscription)
}

/// Activates a pending subscription on billing confirmation, recording the
/// confirmation event for correlation. Deactivate-all-then-activate runs in
/// one transaction.
pub async fn activate_subscription(
    pool: &PgPool,
    subscription_id: Uuid,
    billing_event_id: &str,
    billing_event_at: DateTime<Utc>,
) -> Result<Subscription, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE subscriptions SET active = false
        WHERE user_id = (SELECT user_id FROM subscriptions WHERE id = $1)
        "#,
    )
    .bind(subscription_id)
    .execute(&mut *tx)
    .await?;

    let subscription = sqlx::query_as::<_, Subscription>(
        r#"
        UPDATE subscriptions
        SET active = true, billing_event_id = $2, billing_event_at = $3
        WHERE id = $1
        RETURNING id, user_id, plan_id, active, end_date,
                  billing_event_id, billing_event_at, created_at
        "#,
    )
    .bind(subscription_id)
    .bind(billing_event_id)
    .bind(billing_event_at)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Subscription {subscription_id} not found")))?;

    tx.commit().await?;

    info!(
        subscription = %subscription_id,
        billing_event = billing_event_id,
        "Activated subscription"
    );
    Ok(subscription)
}

/// After a plan change, user data tied to plan options must shrink to the
/// new limits: extra job titles beyond the title allowance are dropped.
pub async fn sync_user_data_with_plan_limits(
    pool: &PgPool,
    user_id: Uuid,
    title_allowance: i64,
) -> Result<(), AppError> {
    let selection = sqlx::query_as::<_, UserFilterSelection>(
        r#"
        SELECT ufs.*
        FROM user_filter_selections ufs
        JOIN search_filters sf ON sf.id = ufs.filter_id
        WHERE ufs.user_id = $1 AND sf.slug = $2
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(FILTER_SLUG_JOB_TITLE)
    .fetch_optional(pool)
    .await?;

    let Some(selection) = selection else {
        return Ok(());
    };

    let trimmed = truncate_to_allowance(selection.values, title_allowance);
    sqlx::query("UPDATE user_filter_selections SET values = $2 WHERE id = $1")
        .bind(selection.id)
        .bind(&trimmed)
        .execute(pool)
        .await?;

    Ok(())
}

fn truncate_to_allowance(mut values: Vec<String>, allowance: i64) -> Vec<String> {
    let keep = usize::try_from(allowance).unwrap_or(0);
    values.truncate(keep);
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_truncate_drops_titles_beyond_allowance() {
        let trimmed = truncate_to_allowance(titles(&["a", "b", "c", "d"]), 2);
        assert_eq!(trimmed, titles(&["a", "b"]));
    }

    #[test]
    fn test_truncate_keeps_all_within_allowance() {
        let trimmed = truncate_to_allowance(titles(&["a", "b"]), 5);
        assert_eq!(trimmed, titles(&["a", "b"]));
    }

    #[test]
    fn test_zero_allowance_clears_titles() {
        assert!(truncate_to_allowance(titles(&["a"]), 0).is_empty());
    }

    #[test]
    fn test_negative_allowance_treated_as_zero() {
        assert!(truncate_to_allowance(titles(&["a"]), -3).is_empty());
    }

    #[test]
    fn test_free_plan_reuse_rejected() {
        let err = check_free_plan_reuse(true).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_first_free_plan_use_allowed() {
        assert!(check_free_plan_reuse(false).is_ok());
    }
}
