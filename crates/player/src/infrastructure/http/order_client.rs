//! HTTP client for the order API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use topup_domain::OrderFormData;
use topup_shared::{ApiErrorBody, CreateOrderRequest, CreateOrderResponse};

use crate::ports::outbound::{OrderSubmissionPort, OrderSubmitError};

/// Default order API base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

const ORDERS_PATH: &str = "/api/orders";

/// Posts orders to `<base_url>/api/orders`.
#[derive(Clone)]
pub struct HttpOrderGateway {
    client: Client,
    base_url: String,
}

impl HttpOrderGateway {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for HttpOrderGateway {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl std::fmt::Debug for HttpOrderGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpOrderGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl OrderSubmissionPort for HttpOrderGateway {
    async fn submit_order(&self, order: &OrderFormData) -> Result<(), OrderSubmitError> {
        let request = CreateOrderRequest::from(order);

        let response = self
            .client
            .post(format!("{}{}", self.base_url, ORDERS_PATH))
            .json(&request)
            .send()
            .await
            .map_err(|e| OrderSubmitError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| OrderSubmitError::Network(e.to_string()))?;
            // The API answers with {"error": "..."}; anything else is passed through.
            let message = serde_json::from_str::<ApiErrorBody>(&error_text)
                .map(|body| body.error)
                .unwrap_or(error_text);
            return Err(OrderSubmitError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let created: CreateOrderResponse = response
            .json()
            .await
            .map_err(|e| OrderSubmitError::InvalidResponse(e.to_string()))?;

        tracing::info!(order_id = created.order_id, "Order created");
        Ok(())
    }
}
