mod billing;
mod config;
mod db;
mod eligibility;
mod errors;
mod models;
mod routes;
mod search;
mod state;
mod subscriptions;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::billing::BillingClient;
use crate::config::Config;
use crate::db::create_pool;
use crate::eligibility::store::PgEligibilityStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("autosubmit_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AutoSubmit API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Eligibility store over the shared pool
    let store = Arc::new(PgEligibilityStore::new(db.clone()));

    // Billing client
    let billing = BillingClient::new(
        config.billing_secret_key.clone(),
        config.billing_api_base.clone(),
    );
    info!("Billing client initialized ({})", config.billing_api_base);

    info!(
        "Submission cooldown: {}s between applications per user",
        config.job_submission_interval_secs
    );

    // Build app state
    let state = AppState {
        db,
        store,
        billing,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
