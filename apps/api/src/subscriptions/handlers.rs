//! Axum route handlers for plans, subscriptions and the billing webhook.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::billing::{BillingEvent, CHECKOUT_COMPLETED_EVENT};
use crate::eligibility::ledger::UsageLedger;
use crate::errors::AppError;
use crate::models::plan::{Plan, PlanOption, PlanOptionType};
use crate::state::AppState;

use super::lifecycle;

#[derive(Debug, Serialize)]
pub struct PlanWithOptions {
    #[serde(flatten)]
    pub plan: Plan,
    pub options: Vec<PlanOption>,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub user_id: Uuid,
    pub plan_slug: String,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub status: &'static str,
    pub subscription_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub total_allowance: i64,
    pub used_count: i64,
    pub remaining_count: i64,
    pub daily_allowance: i64,
    pub today_used_count: i64,
    pub title_allowance: i64,
    pub used_title_count: i64,
    pub remaining_title_count: i64,
}

/// GET /api/v1/plans
pub async fn handle_list_plans(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlanWithOptions>>, AppError> {
    let plans = sqlx::query_as::<_, Plan>(
        "SELECT * FROM plans WHERE active ORDER BY amount_cents",
    )
    .fetch_all(&state.db)
    .await?;

    let mut result = Vec::with_capacity(plans.len());
    for plan in plans {
        let options = sqlx::query_as::<_, PlanOption>(
            "SELECT id, plan_id, option_type, value, text FROM plan_options WHERE plan_id = $1 ORDER BY id",
        )
        .bind(plan.id)
        .fetch_all(&state.db)
        .await?;
        result.push(PlanWithOptions { plan, options });
    }

    Ok(Json(result))
}

/// POST /api/v1/subscriptions
///
/// Free plans activate immediately. Paid plans create a pending (inactive)
/// subscription and hand back a hosted checkout URL; the billing webhook
/// finishes the activation.
pub async fn handle_subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<SubscribeResponse>), AppError> {
    let plan = sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE slug = $1 AND active")
        .bind(&request.plan_slug)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Plan '{}' not found", request.plan_slug)))?;

    if !plan.is_chargeable() {
        // One free trial per user; a deactivated free subscription counts.
        let used = lifecycle::has_used_free_plan(&state.db, request.user_id).await?;
        lifecycle::check_free_plan_reuse(used)?;

        let subscription = lifecycle::subscribe_to_plan(&state.db, request.user_id, &plan).await?;
        let options = state.store.plan_options(plan.id).await?;
        lifecycle::sync_user_data_with_plan_limits(
            &state.db,
            request.user_id,
            options.limit(PlanOptionType::JobTitle),
        )
        .await?;

        return Ok((
            StatusCode::CREATED,
            Json(SubscribeResponse {
                status: "active",
                subscription_id: subscription.id,
                checkout_url: None,
            }),
        ));
    }

    let price_id = plan.billing_price_id.as_deref().ok_or_else(|| {
        AppError::Billing(format!("Plan '{}' has no billing price configured", plan.slug))
    })?;

    let subscription =
        lifecycle::create_pending_subscription(&state.db, request.user_id, plan.id).await?;
    let session = state
        .billing
        .create_checkout_session(
            price_id,
            subscription.id,
            &state.config.checkout_success_url,
            &state.config.checkout_cancel_url,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubscribeResponse {
            status: "pending_checkout",
            subscription_id: subscription.id,
            checkout_url: Some(session.url),
        }),
    ))
}

/// GET /api/v1/subscriptions/usage
///
/// The ledger figures for the user's active subscription. Unlike the apply
/// gate this never fails on an exhausted budget — clients render the zeroes.
pub async fn handle_usage(
    State(state): State<AppState>,
    Query(query): Query<UsageQuery>,
) -> Result<Json<UsageResponse>, AppError> {
    let subscription = state
        .store
        .active_subscription(query.user_id)
        .await?
        .ok_or(AppError::NoActiveSubscription)?;

    let options = state.store.plan_options(subscription.plan_id).await?;
    let counts = state
        .store
        .usage_counts(subscription.id, query.user_id)
        .await?;
    let ledger = UsageLedger::new(options, counts);

    Ok(Json(UsageResponse {
        total_allowance: ledger.total_allowance(),
        used_count: ledger.used_count(),
        remaining_count: ledger.remaining_count(),
        daily_allowance: ledger.daily_allowance(),
        today_used_count: ledger.today_used_count(),
        title_allowance: ledger.title_allowance(),
        used_title_count: ledger.used_title_count(),
        remaining_title_count: ledger.remaining_title_count(),
    }))
}

/// POST /api/v1/webhooks/billing
///
/// Applies billing events. A completed checkout activates the pending
/// subscription named in the session metadata and re-syncs user data to the
/// new plan's limits. Unrelated events are acknowledged and dropped.
pub async fn handle_billing_webhook(
    State(state): State<AppState>,
    Json(event): Json<BillingEvent>,
) -> Result<Json<serde_json::Value>, AppError> {
    if event.event_type != CHECKOUT_COMPLETED_EVENT {
        return Ok(Json(serde_json::json!({ "received": true })));
    }

    let Some(subscription_id) = event.data.object.metadata.subscription_id else {
        warn!(event = %event.id, "Checkout completion without subscription metadata");
        return Ok(Json(serde_json::json!({ "received": true })));
    };

    let event_at = DateTime::<Utc>::from_timestamp(event.created, 0)
        .ok_or_else(|| AppError::Validation("Invalid event timestamp".to_string()))?;

    let subscription =
        lifecycle::activate_subscription(&state.db, subscription_id, &event.id, event_at).await?;

    let options = state.store.plan_options(subscription.plan_id).await?;
    lifecycle::sync_user_data_with_plan_limits(
        &state.db,
        subscription.user_id,
        options.limit(PlanOptionType::JobTitle),
    )
    .await?;

    info!(subscription = %subscription_id, "Checkout completed, subscription active");
    Ok(Json(serde_json::json!({ "received": true })))
}
