//! Subscription rows and the "currently active" predicate.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One subscription of a user to a plan. Rows are never deleted — a plan
/// change deactivates the old row so historical usage accounting survives.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub active: bool,
    /// Trial/free expiry. Paid subscriptions carry no end date and stay
    /// active until deactivated explicitly.
    pub end_date: Option<NaiveDate>,
    /// Correlation id of the billing confirmation event that activated this
    /// subscription, absent for free-tier rows.
    pub billing_event_id: Option<String>,
    pub billing_event_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Whether a subscription counts as active right now: the flag must be set,
/// and either the plan is paid (amount > 0) or the expiry is unset or still
/// in the future.
pub fn is_active_now(
    active: bool,
    plan_amount_cents: i64,
    end_date: Option<NaiveDate>,
    today: NaiveDate,
) -> bool {
    if !active {
        return false;
    }
    if plan_amount_cents > 0 {
        return true;
    }
    match end_date {
        None => true,
        Some(d) => d >= today,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_inactive_flag_wins() {
        assert!(!is_active_now(false, 999, None, day(2024, 6, 1)));
    }

    #[test]
    fn test_paid_plan_ignores_expiry() {
        assert!(is_active_now(true, 1999, Some(day(2020, 1, 1)), day(2024, 6, 1)));
    }

    #[test]
    fn test_free_plan_without_expiry_is_active() {
        assert!(is_active_now(true, 0, None, day(2024, 6, 1)));
    }

    #[test]
    fn test_free_trial_active_until_end_date_inclusive() {
        let today = day(2024, 6, 1);
        assert!(is_active_now(true, 0, Some(today), today));
        assert!(is_active_now(true, 0, Some(day(2024, 6, 2)), today));
        assert!(!is_active_now(true, 0, Some(day(2024, 5, 31)), today));
    }
}
