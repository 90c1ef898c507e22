//! Subscription Ledger — derived usage figures for one subscription.
//!
//! Pure read-side arithmetic over a plan's option set and three counts.
//! Every figure is total: missing plan configuration yields 0, never an error.

use crate::models::plan::{PlanOptionSet, PlanOptionType};

/// Raw counts backing the ledger, loaded in one pass by the store:
/// `applied`-status rows for the subscription (all time and since the start
/// of the current day), plus the user's active job-title slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageCounts {
    pub applied_total: i64,
    pub applied_today: i64,
    pub active_titles: i64,
}

/// Usage figures derived from a subscription's plan options and counts.
/// Never mutates state; build it fresh per decision.
#[derive(Debug, Clone)]
pub struct UsageLedger {
    options: PlanOptionSet,
    counts: UsageCounts,
}

impl UsageLedger {
    pub fn new(options: PlanOptionSet, counts: UsageCounts) -> Self {
        Self { options, counts }
    }

    pub fn total_allowance(&self) -> i64 {
        self.options.limit(PlanOptionType::JobApplications)
    }

    pub fn used_count(&self) -> i64 {
        self.counts.applied_total
    }

    pub fn remaining_count(&self) -> i64 {
        (self.total_allowance() - self.used_count()).max(0)
    }

    pub fn daily_allowance(&self) -> i64 {
        self.options.limit(PlanOptionType::JobApplicationsPerDay)
    }

    pub fn today_used_count(&self) -> i64 {
        self.counts.applied_today
    }

    pub fn title_allowance(&self) -> i64 {
        self.options.limit(PlanOptionType::JobTitle)
    }

    pub fn used_title_count(&self) -> i64 {
        self.counts.active_titles
    }

    pub fn remaining_title_count(&self) -> i64 {
        (self.title_allowance() - self.used_title_count()).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(total: i64, daily: i64, counts: UsageCounts) -> UsageLedger {
        let options = PlanOptionSet::default()
            .with(PlanOptionType::JobApplications, Some(total))
            .with(PlanOptionType::JobApplicationsPerDay, Some(daily));
        UsageLedger::new(options, counts)
    }

    #[test]
    fn test_empty_plan_yields_zeroes() {
        let l = UsageLedger::new(PlanOptionSet::default(), UsageCounts::default());
        assert_eq!(l.total_allowance(), 0);
        assert_eq!(l.remaining_count(), 0);
        assert_eq!(l.daily_allowance(), 0);
        assert_eq!(l.title_allowance(), 0);
        assert_eq!(l.remaining_title_count(), 0);
    }

    #[test]
    fn test_used_plus_remaining_equals_total() {
        // holds whenever used <= total
        for used in 0..=50 {
            let l = ledger(
                50,
                5,
                UsageCounts {
                    applied_total: used,
                    ..Default::default()
                },
            );
            assert_eq!(l.used_count() + l.remaining_count(), l.total_allowance());
        }
    }

    #[test]
    fn test_overuse_clamps_remaining_to_zero() {
        let l = ledger(
            10,
            5,
            UsageCounts {
                applied_total: 14,
                ..Default::default()
            },
        );
        assert_eq!(l.remaining_count(), 0);
    }

    #[test]
    fn test_today_count_is_independent_of_total() {
        let l = ledger(
            100,
            3,
            UsageCounts {
                applied_total: 40,
                applied_today: 2,
                active_titles: 0,
            },
        );
        assert_eq!(l.today_used_count(), 2);
        assert_eq!(l.remaining_count(), 60);
    }

    #[test]
    fn test_title_accounting() {
        let options = PlanOptionSet::default().with(PlanOptionType::JobTitle, Some(3));
        let l = UsageLedger::new(
            options,
            UsageCounts {
                active_titles: 2,
                ..Default::default()
            },
        );
        assert_eq!(l.title_allowance(), 3);
        assert_eq!(l.used_title_count(), 2);
        assert_eq!(l.remaining_title_count(), 1);
    }
}
