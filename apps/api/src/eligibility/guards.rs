//! Pure eligibility guards.
//!
//! Each guard is a precondition check over plain data that fails fast with
//! the specific error its HTTP status depends on. No guard touches storage;
//! the orchestrator loads whatever snapshot a guard needs and threads it in
//! explicitly — there is no ambient user or request context here.

use chrono::{DateTime, Duration, Utc};

use crate::errors::{AppError, LimitKind};
use crate::models::job::{powered_by_is_allowed, Platform};

use super::ledger::UsageLedger;

/// Plan budget checks, evaluated in fixed order after the active-subscription
/// lookup: total allowance first, then the daily cap.
pub fn check_plan_limits(ledger: &UsageLedger) -> Result<(), AppError> {
    if ledger.remaining_count() <= 0 {
        return Err(AppError::PlanLimitExceeded(LimitKind::Total));
    }
    if ledger.today_used_count() >= ledger.daily_allowance() {
        return Err(AppError::PlanLimitExceeded(LimitKind::Daily));
    }
    Ok(())
}

/// LinkedIn postings must be hosted by an allow-listed application backend.
/// Other platforms carry no powered-by requirement.
pub fn check_powered_by(platform: Platform, powered_by: Option<&str>) -> Result<(), AppError> {
    match platform {
        Platform::Linkedin => match powered_by {
            Some(p) if powered_by_is_allowed(p) => Ok(()),
            Some(p) => Err(AppError::InvalidPoweredBy(p.to_string())),
            None => Err(AppError::InvalidPoweredBy(String::new())),
        },
    }
}

/// Global submission cooldown: any submission by the user within the
/// configured interval before `now` blocks the next one, regardless of job
/// or platform. The window is closed — a submission at exactly
/// `now - interval` still blocks.
pub fn check_submission_cooldown(
    last_submission_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    interval: Duration,
) -> Result<(), AppError> {
    match last_submission_at {
        Some(last) if last >= now - interval => Err(AppError::SubmissionTooFrequent),
        _ => Ok(()),
    }
}

/// No-op when no company is given; otherwise the user's excluded-companies
/// list is matched case-insensitively.
pub fn check_excluded_company(excluded: &[String], company: Option<&str>) -> Result<(), AppError> {
    let Some(company) = company.filter(|c| !c.is_empty()) else {
        return Ok(());
    };
    if excluded.iter().any(|e| e.eq_ignore_ascii_case(company)) {
        return Err(AppError::ExcludedCompany(company.to_string()));
    }
    Ok(())
}

/// A terminal outcome other than cancel blocks re-submission of the job.
pub fn check_duplicate(has_blocking_outcome: bool) -> Result<(), AppError> {
    if has_blocking_outcome {
        return Err(AppError::DuplicateApply);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::ledger::UsageCounts;
    use crate::models::plan::{PlanOptionSet, PlanOptionType};

    fn ledger(total: i64, daily: i64, used: i64, used_today: i64) -> UsageLedger {
        let options = PlanOptionSet::default()
            .with(PlanOptionType::JobApplications, Some(total))
            .with(PlanOptionType::JobApplicationsPerDay, Some(daily));
        UsageLedger::new(
            options,
            UsageCounts {
                applied_total: used,
                applied_today: used_today,
                active_titles: 0,
            },
        )
    }

    #[test]
    fn test_total_limit_checked_before_daily() {
        // Both limits violated: total must surface, not daily.
        let err = check_plan_limits(&ledger(2, 1, 2, 1)).unwrap_err();
        assert!(matches!(err, AppError::PlanLimitExceeded(LimitKind::Total)));
    }

    #[test]
    fn test_daily_limit_blocks_even_with_total_budget_left() {
        // total=2, daily=1, one applied today: second same-day attempt fails
        // on the daily cap although one total submission remains.
        let err = check_plan_limits(&ledger(2, 1, 1, 1)).unwrap_err();
        assert!(matches!(err, AppError::PlanLimitExceeded(LimitKind::Daily)));
    }

    #[test]
    fn test_within_both_limits_passes() {
        assert!(check_plan_limits(&ledger(2, 1, 1, 0)).is_ok());
    }

    #[test]
    fn test_zero_configured_plan_fails_on_total() {
        let err = check_plan_limits(&ledger(0, 0, 0, 0)).unwrap_err();
        assert!(matches!(err, AppError::PlanLimitExceeded(LimitKind::Total)));
    }

    #[test]
    fn test_powered_by_any_case_passes() {
        for p in ["greenhouse", "GREENHOUSE", "Greenhouse", "lever", "Linkedin"] {
            assert!(check_powered_by(Platform::Linkedin, Some(p)).is_ok(), "{p}");
        }
    }

    #[test]
    fn test_powered_by_rejects_unknown_and_missing() {
        assert!(matches!(
            check_powered_by(Platform::Linkedin, Some("workday")),
            Err(AppError::InvalidPoweredBy(_))
        ));
        assert!(matches!(
            check_powered_by(Platform::Linkedin, None),
            Err(AppError::InvalidPoweredBy(_))
        ));
    }

    #[test]
    fn test_cooldown_blocks_recent_submission() {
        let now = Utc::now();
        let err = check_submission_cooldown(
            Some(now - Duration::seconds(5)),
            now,
            Duration::seconds(10),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::SubmissionTooFrequent));
    }

    #[test]
    fn test_cooldown_blocks_at_exact_interval_boundary() {
        let now = Utc::now();
        let err = check_submission_cooldown(
            Some(now - Duration::seconds(10)),
            now,
            Duration::seconds(10),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::SubmissionTooFrequent));
    }

    #[test]
    fn test_cooldown_passes_after_interval() {
        let now = Utc::now();
        assert!(check_submission_cooldown(
            Some(now - Duration::seconds(11)),
            now,
            Duration::seconds(10)
        )
        .is_ok());
        assert!(check_submission_cooldown(None, now, Duration::seconds(10)).is_ok());
    }

    #[test]
    fn test_excluded_company_case_insensitive() {
        let excluded = vec!["Acme".to_string(), "Globex".to_string()];
        assert!(matches!(
            check_excluded_company(&excluded, Some("acme")),
            Err(AppError::ExcludedCompany(_))
        ));
        assert!(matches!(
            check_excluded_company(&excluded, Some("ACME")),
            Err(AppError::ExcludedCompany(_))
        ));
        assert!(check_excluded_company(&excluded, Some("Initech")).is_ok());
    }

    #[test]
    fn test_missing_company_is_noop() {
        let excluded = vec!["Acme".to_string()];
        assert!(check_excluded_company(&excluded, None).is_ok());
        assert!(check_excluded_company(&excluded, Some("")).is_ok());
    }

    #[test]
    fn test_duplicate_guard() {
        assert!(matches!(check_duplicate(true), Err(AppError::DuplicateApply)));
        assert!(check_duplicate(false).is_ok());
    }
}
