//! Stripe Checkout client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::application::ports::{CheckoutRequest, CheckoutSession, GatewayError, PaymentGateway};
use crate::shared::errors::InfraError;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub api_base: String,
    pub secret_key: String,
    pub publishable_key: String,
}

/// Hosted checkout via `POST /v1/checkout/sessions`
#[derive(Clone)]
pub struct StripeGateway {
    http_client: Client,
    config: StripeConfig,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl From<InfraError> for GatewayError {
    fn from(e: InfraError) -> Self {
        match e {
            InfraError::Serialization(e) => GatewayError::InvalidResponse(e.to_string()),
            other => GatewayError::Request(other.to_string()),
        }
    }
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            http_client: Client::new(),
            config,
        }
    }
}

/// Form fields for a one-item, card-only payment session
pub fn checkout_form(request: &CheckoutRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        (
            "line_items[0][price_data][currency]".to_string(),
            request.currency.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            request.amount_minor.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            request.line_item_name.clone(),
        ),
        ("client_reference_id".to_string(), request.booking_id.to_string()),
        ("metadata[booking_id]".to_string(), request.booking_id.to_string()),
        ("metadata[payment_id]".to_string(), request.payment_id.to_string()),
    ];
    if let Some(email) = &request.customer_email {
        form.push(("customer_email".to_string(), email.clone()));
    }
    form
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let url = format!(
            "{}/v1/checkout/sessions",
            self.config.api_base.trim_end_matches('/')
        );
        debug!(booking_id = request.booking_id, "POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .form(&checkout_form(&request))
            .send()
            .await
            .map_err(InfraError::from)?;

        let status = response.status();
        let body = response.text().await.map_err(InfraError::from)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(body);
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = serde_json::from_str(&body).map_err(InfraError::from)?;
        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }

    fn publishable_key(&self) -> &str {
        &self.config.publishable_key
    }
}
