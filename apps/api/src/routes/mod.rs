pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::eligibility::handlers as job_handlers;
use crate::search::handlers as search_handlers;
use crate::state::AppState;
use crate::subscriptions::handlers as subscription_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job application API
        .route("/api/v1/jobs", get(job_handlers::handle_list_jobs))
        .route("/api/v1/jobs", post(job_handlers::handle_create_job))
        .route(
            "/api/v1/jobs/:job_id/can-apply",
            get(job_handlers::handle_can_apply),
        )
        .route(
            "/api/v1/jobs/:job_id/pending",
            get(job_handlers::handle_get_pending_job),
        )
        .route(
            "/api/v1/jobs/:id/status",
            patch(job_handlers::handle_update_job_status),
        )
        // Job search API
        .route(
            "/api/v1/search/:platform/url",
            get(search_handlers::handle_search_url),
        )
        // Plans and subscriptions
        .route("/api/v1/plans", get(subscription_handlers::handle_list_plans))
        .route(
            "/api/v1/subscriptions",
            post(subscription_handlers::handle_subscribe),
        )
        .route(
            "/api/v1/subscriptions/usage",
            get(subscription_handlers::handle_usage),
        )
        .route(
            "/api/v1/webhooks/billing",
            post(subscription_handlers::handle_billing_webhook),
        )
        .with_state(state)
}
