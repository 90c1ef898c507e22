//! Billing client — the single point of contact with the payment processor.
//!
//! Wraps the processor's checkout-session API over `reqwest`; no other module
//! talks to the billing HTTP surface directly. Webhook signature verification
//! is handled upstream of this service and is intentionally absent here.

use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;

/// Webhook event type that confirms a completed paid checkout.
pub const CHECKOUT_COMPLETED_EVENT: &str = "checkout.session.completed";

#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Incoming webhook event, trimmed to the fields the service consumes.
#[derive(Debug, Deserialize)]
pub struct BillingEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub created: i64,
    pub data: BillingEventData,
}

#[derive(Debug, Deserialize)]
pub struct BillingEventData {
    pub object: BillingEventObject,
}

#[derive(Debug, Deserialize)]
pub struct BillingEventObject {
    #[serde(default)]
    pub metadata: BillingMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub struct BillingMetadata {
    pub subscription_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct BillingErrorEnvelope {
    error: BillingErrorBody,
}

#[derive(Debug, Deserialize)]
struct BillingErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct BillingClient {
    client: Client,
    secret_key: String,
    api_base: String,
}

impl BillingClient {
    pub fn new(secret_key: String, api_base: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            secret_key,
            api_base,
        }
    }

    /// Creates a hosted checkout session for a paid plan. The pending
    /// subscription's id travels in the session metadata so the completion
    /// webhook can find and activate it.
    pub async fn create_checkout_session(
        &self,
        price_id: &str,
        subscription_id: Uuid,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, AppError> {
        let subscription_id = subscription_id.to_string();
        let params: Vec<(&str, &str)> = vec![
            ("mode", "subscription"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
            ("metadata[subscription_id]", &subscription_id),
        ];

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::Billing(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<BillingErrorEnvelope>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("checkout session request failed ({status})"));
            return Err(AppError::Billing(message));
        }

        response
            .json::<CheckoutSession>()
            .await
            .map_err(|e| AppError::Billing(e.to_string()))
    }
}
