//! Plan-limit and eligibility gating: decides, for every job-application
//! attempt, whether the user may proceed.

pub mod guards;
pub mod handlers;
pub mod ledger;
pub mod orchestrator;
pub mod store;
