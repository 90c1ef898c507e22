use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub billing_secret_key: String,
    pub billing_api_base: String,
    pub checkout_success_url: String,
    pub checkout_cancel_url: String,
    /// Minimum seconds between any two job submissions by the same user.
    pub job_submission_interval_secs: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            billing_secret_key: require_env("BILLING_SECRET_KEY")?,
            billing_api_base: std::env::var("BILLING_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            checkout_success_url: require_env("CHECKOUT_SUCCESS_URL")?,
            checkout_cancel_url: require_env("CHECKOUT_CANCEL_URL")?,
            job_submission_interval_secs: std::env::var("JOB_SUBMISSION_INTERVAL_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<i64>()
                .context("JOB_SUBMISSION_INTERVAL_SECS must be a whole number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
