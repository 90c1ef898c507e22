//! Per-user job-search filter selections.
//!
//! Filter definitions live in the `search_filters` table (query parameter,
//! URL eligibility, fillability); the core reads them by slug and joins them
//! where needed. A `UserFilterSelection` holds the user's chosen scalar value
//! or list of values for one filter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Well-known filter slugs the core reads directly.
pub const FILTER_SLUG_JOB_TITLE: &str = "job_title";
pub const FILTER_SLUG_EXCLUDED_COMPANIES: &str = "excluded_companies";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserFilterSelection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filter_id: Uuid,
    pub value: Option<String>,
    pub values: Vec<String>,
    pub created_at: DateTime<Utc>,
}
