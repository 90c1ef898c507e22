//! Applied jobs: the per-attempt record the eligibility engine gates on.
//!
//! Lifecycle: `created → applied | failed | canceled`. All three outcomes are
//! terminal; `applied` and `failed` block resubmission of the same job,
//! `canceled` does not; only `applied` counts against plan allowances.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Created,
    Applied,
    Failed,
    Canceled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Created => "created",
            JobStatus::Applied => "applied",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "created" => Ok(JobStatus::Created),
            "applied" => Ok(JobStatus::Applied),
            "failed" => Ok(JobStatus::Failed),
            "canceled" => Ok(JobStatus::Canceled),
            other => Err(AppError::Validation(format!("Unknown job status: {other}"))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Created)
    }

    /// Terminal outcomes other than cancel block re-submission of the job.
    pub fn blocks_resubmission(&self) -> bool {
        matches!(self, JobStatus::Applied | JobStatus::Failed)
    }

    /// Only successfully applied jobs consume plan allowance.
    pub fn counts_against_allowance(&self) -> bool {
        matches!(self, JobStatus::Applied)
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match self {
            JobStatus::Created => next.is_terminal(),
            // no transition out of a terminal status
            JobStatus::Applied | JobStatus::Failed | JobStatus::Canceled => false,
        }
    }
}

/// Job-search platforms the product automates. Closed set: dispatch on this
/// enum everywhere instead of matching raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linkedin,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linkedin => "linkedin",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s.to_ascii_lowercase().as_str() {
            "linkedin" => Ok(Platform::Linkedin),
            other => Err(AppError::UnsupportedPlatform(other.to_string())),
        }
    }
}

/// Third-party application backends accepted for LinkedIn postings.
pub const LINKEDIN_POWERED_BY: &[&str] = &["Linkedin", "Greenhouse", "Lever"];

pub fn powered_by_is_allowed(powered_by: &str) -> bool {
    LINKEDIN_POWERED_BY
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(powered_by))
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppliedJob {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub job_url: String,
    pub used_subscription_id: Uuid,
    /// Platform-side job identifier; unique together with user and platform.
    pub job_id: String,
    pub platform: String,
    pub status: String,
    pub company: Option<String>,
    pub powered_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new application attempt (always status `created`).
#[derive(Debug, Clone)]
pub struct NewAppliedJob {
    pub user_id: Uuid,
    pub title: String,
    pub job_url: String,
    pub used_subscription_id: Uuid,
    pub job_id: String,
    pub platform: Platform,
    pub company: Option<String>,
    pub powered_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_advances_to_any_terminal() {
        assert!(JobStatus::Created.can_transition_to(JobStatus::Applied));
        assert!(JobStatus::Created.can_transition_to(JobStatus::Failed));
        assert!(JobStatus::Created.can_transition_to(JobStatus::Canceled));
        assert!(!JobStatus::Created.can_transition_to(JobStatus::Created));
    }

    #[test]
    fn test_terminal_statuses_never_advance() {
        for terminal in [JobStatus::Applied, JobStatus::Failed, JobStatus::Canceled] {
            for next in [
                JobStatus::Created,
                JobStatus::Applied,
                JobStatus::Failed,
                JobStatus::Canceled,
            ] {
                assert!(
                    !terminal.can_transition_to(next),
                    "{terminal:?} must not advance to {next:?}"
                );
            }
        }
    }

    #[test]
    fn test_canceled_does_not_block_resubmission() {
        assert!(JobStatus::Applied.blocks_resubmission());
        assert!(JobStatus::Failed.blocks_resubmission());
        assert!(!JobStatus::Canceled.blocks_resubmission());
        assert!(!JobStatus::Created.blocks_resubmission());
    }

    #[test]
    fn test_only_applied_counts() {
        assert!(JobStatus::Applied.counts_against_allowance());
        assert!(!JobStatus::Failed.counts_against_allowance());
        assert!(!JobStatus::Canceled.counts_against_allowance());
        assert!(!JobStatus::Created.counts_against_allowance());
    }

    #[test]
    fn test_powered_by_matching_is_case_insensitive() {
        assert!(powered_by_is_allowed("greenhouse"));
        assert!(powered_by_is_allowed("GREENHOUSE"));
        assert!(powered_by_is_allowed("Lever"));
        assert!(powered_by_is_allowed("linkedin"));
        assert!(!powered_by_is_allowed("workday"));
        assert!(!powered_by_is_allowed(""));
    }

    #[test]
    fn test_platform_parse() {
        assert_eq!(Platform::parse("linkedin").unwrap(), Platform::Linkedin);
        assert_eq!(Platform::parse("LinkedIn").unwrap(), Platform::Linkedin);
        assert!(matches!(
            Platform::parse("indeed"),
            Err(AppError::UnsupportedPlatform(_))
        ));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            JobStatus::Created,
            JobStatus::Applied,
            JobStatus::Failed,
            JobStatus::Canceled,
        ] {
            assert_eq!(JobStatus::parse(status.as_str()).unwrap(), status);
        }
    }
}
