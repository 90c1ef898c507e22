//! Axum route handlers for search URL generation.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::eligibility::orchestrator::validate_plan_limits;
use crate::errors::AppError;
use crate::models::job::Platform;
use crate::state::AppState;

use super::url_builder::build_search_url;

#[derive(Debug, Deserialize)]
pub struct SearchUrlQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SearchUrlResponse {
    pub url: String,
    pub job_titles: Vec<String>,
}

/// GET /api/v1/search/:platform/url
///
/// Builds the platform search URL from the user's stored filter selections.
/// Gated on an active subscription with budget left, like every other
/// automation entry point.
pub async fn handle_search_url(
    State(state): State<AppState>,
    Path(platform): Path<String>,
    Query(query): Query<SearchUrlQuery>,
) -> Result<Json<SearchUrlResponse>, AppError> {
    let platform = Platform::parse(&platform)?;

    validate_plan_limits(state.store.as_ref(), query.user_id).await?;

    let user_filters = super::url_filter_params(&state.db, query.user_id, platform).await?;
    let defaults = super::default_filter_params(&state.db, platform).await?;
    let url = build_search_url(platform, &user_filters, &defaults)?;

    let job_titles = super::user_job_titles(&state.db, query.user_id, platform).await?;

    Ok(Json(SearchUrlResponse { url, job_titles }))
}
