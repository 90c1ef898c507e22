//! Job-search URL generation from stored per-user filter selections.

pub mod handlers;
pub mod url_builder;

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::filters::FILTER_SLUG_JOB_TITLE;
use crate::models::job::Platform;

use self::url_builder::UrlFilterParam;

/// The user's selections eligible for URL inclusion on a platform, joined
/// with their filter definitions' query parameter keys.
pub async fn url_filter_params(
    pool: &PgPool,
    user_id: Uuid,
    platform: Platform,
) -> Result<Vec<UrlFilterParam>, AppError> {
    let rows: Vec<(String, Option<String>, Vec<String>)> = sqlx::query_as(
        r#"
        SELECT sf.query_param, ufs.value, ufs.values
        FROM user_filter_selections ufs
        JOIN search_filters sf ON sf.id = ufs.filter_id
        WHERE ufs.user_id = $1
          AND sf.platform = $2
          AND sf.can_be_added_in_search_url
          AND sf.query_param IS NOT NULL
        ORDER BY ufs.created_at
        "#,
    )
    .bind(user_id)
    .bind(platform.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(query_param, value, values)| UrlFilterParam {
            query_param,
            value,
            values,
        })
        .collect())
}

/// Query parameter keys of the platform's non-fillable default filters,
/// always sent as fixed `true` values.
pub async fn default_filter_params(
    pool: &PgPool,
    platform: Platform,
) -> Result<Vec<String>, AppError> {
    let keys: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT query_param FROM search_filters
        WHERE platform = $1 AND NOT fillable AND query_param IS NOT NULL
        ORDER BY id
        "#,
    )
    .bind(platform.as_str())
    .fetch_all(pool)
    .await?;

    Ok(keys)
}

/// The user's configured job titles for a platform, empty when unset.
pub async fn user_job_titles(
    pool: &PgPool,
    user_id: Uuid,
    platform: Platform,
) -> Result<Vec<String>, AppError> {
    let values: Option<Vec<String>> = sqlx::query_scalar(
        r#"
        SELECT ufs.values
        FROM user_filter_selections ufs
        JOIN search_filters sf ON sf.id = ufs.filter_id
        WHERE ufs.user_id = $1 AND sf.platform = $2 AND sf.slug = $3
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(platform.as_str())
    .bind(FILTER_SLUG_JOB_TITLE)
    .fetch_optional(pool)
    .await?;

    Ok(values.unwrap_or_default())
}
