//! Subscription plans and their option sets.
//!
//! A plan is a named tier; its options carry the numeric limits the
//! eligibility engine reads (total applications, daily applications,
//! job-title slots) plus feature flags. Each option type appears at most
//! once per plan — `PlanOptionSet` keeps the first occurrence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    /// Price in minor currency units (cents). Zero means free tier.
    pub amount_cents: i64,
    pub currency: String,
    pub interval: String,
    pub billing_price_id: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    pub fn is_chargeable(&self) -> bool {
        self.amount_cents > 0
    }
}

/// The kinds of limits and feature flags a plan option can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanOptionType {
    JobApplications,
    JobApplicationsPerDay,
    JobTitle,
    ResumesCount,
    FreeAccess,
    SubmissionTracker,
    FilterCompanies,
}

impl PlanOptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanOptionType::JobApplications => "job_applications",
            PlanOptionType::JobApplicationsPerDay => "job_applies_per_day",
            PlanOptionType::JobTitle => "job_title",
            PlanOptionType::ResumesCount => "resumes_count",
            PlanOptionType::FreeAccess => "free_access",
            PlanOptionType::SubmissionTracker => "submission_tracker",
            PlanOptionType::FilterCompanies => "filter_companies",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "job_applications" => Some(PlanOptionType::JobApplications),
            "job_applies_per_day" => Some(PlanOptionType::JobApplicationsPerDay),
            "job_title" => Some(PlanOptionType::JobTitle),
            "resumes_count" => Some(PlanOptionType::ResumesCount),
            "free_access" => Some(PlanOptionType::FreeAccess),
            "submission_tracker" => Some(PlanOptionType::SubmissionTracker),
            "filter_companies" => Some(PlanOptionType::FilterCompanies),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlanOption {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub option_type: String,
    pub value: Option<i64>,
    pub text: String,
}

/// A plan's options keyed by type, as read by the subscription ledger.
///
/// Unknown option type strings are dropped on construction; duplicate types
/// keep the first row, matching the "at most one per type" invariant.
#[derive(Debug, Clone, Default)]
pub struct PlanOptionSet {
    options: Vec<(PlanOptionType, Option<i64>)>,
}

impl PlanOptionSet {
    pub fn from_rows(rows: &[PlanOption]) -> Self {
        let mut options: Vec<(PlanOptionType, Option<i64>)> = Vec::new();
        for row in rows {
            let Some(ty) = PlanOptionType::parse(&row.option_type) else {
                continue;
            };
            if options.iter().any(|(existing, _)| *existing == ty) {
                continue;
            }
            options.push((ty, row.value));
        }
        Self { options }
    }

    pub fn with(mut self, ty: PlanOptionType, value: Option<i64>) -> Self {
        if !self.options.iter().any(|(existing, _)| *existing == ty) {
            self.options.push((ty, value));
        }
        self
    }

    /// The numeric limit for an option type, or 0 when the option is absent
    /// or carries no value. Missing configuration never fails.
    pub fn limit(&self, ty: PlanOptionType) -> i64 {
        self.options
            .iter()
            .find(|(existing, _)| *existing == ty)
            .and_then(|(_, value)| *value)
            .unwrap_or(0)
    }

    pub fn has(&self, ty: PlanOptionType) -> bool {
        self.options.iter().any(|(existing, _)| *existing == ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option_row(option_type: &str, value: Option<i64>) -> PlanOption {
        PlanOption {
            id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            option_type: option_type.to_string(),
            value,
            text: String::new(),
        }
    }

    #[test]
    fn test_missing_option_defaults_to_zero() {
        let set = PlanOptionSet::default();
        assert_eq!(set.limit(PlanOptionType::JobApplications), 0);
        assert_eq!(set.limit(PlanOptionType::JobApplicationsPerDay), 0);
    }

    #[test]
    fn test_option_without_value_defaults_to_zero() {
        let set = PlanOptionSet::from_rows(&[option_row("job_applications", None)]);
        assert_eq!(set.limit(PlanOptionType::JobApplications), 0);
        assert!(set.has(PlanOptionType::JobApplications));
    }

    #[test]
    fn test_duplicate_type_keeps_first() {
        let set = PlanOptionSet::from_rows(&[
            option_row("job_applications", Some(100)),
            option_row("job_applications", Some(5)),
        ]);
        assert_eq!(set.limit(PlanOptionType::JobApplications), 100);
    }

    #[test]
    fn test_unknown_type_is_dropped() {
        let set = PlanOptionSet::from_rows(&[option_row("time_travel", Some(1))]);
        assert!(!set.has(PlanOptionType::JobApplications));
    }

    #[test]
    fn test_option_type_round_trip() {
        for ty in [
            PlanOptionType::JobApplications,
            PlanOptionType::JobApplicationsPerDay,
            PlanOptionType::JobTitle,
            PlanOptionType::ResumesCount,
            PlanOptionType::FreeAccess,
            PlanOptionType::SubmissionTracker,
            PlanOptionType::FilterCompanies,
        ] {
            assert_eq!(PlanOptionType::parse(ty.as_str()), Some(ty));
        }
    }
}
