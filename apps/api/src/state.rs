use std::sync::Arc;

use sqlx::PgPool;

use crate::billing::BillingClient;
use crate::config::Config;
use crate::eligibility::store::EligibilityStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Persistence seam of the eligibility engine. Production backend is
    /// `PgEligibilityStore`; tests swap an in-memory implementation.
    pub store: Arc<dyn EligibilityStore>,
    pub billing: BillingClient,
    pub config: Config,
}
